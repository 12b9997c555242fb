//! Command-line flags shared by both binaries.

use crate::config::Config;
use std::path::PathBuf;

#[derive(clap::Args, Debug, Default, Clone)]
pub struct ConfigOverrides {
    /// Folder receiving the CSV files
    #[arg(short = 'o', long = "output", value_name = "DIR")]
    pub output: Option<PathBuf>,

    /// Seconds to wait between lookups
    #[arg(short = 'd', long = "delay", value_name = "SECS")]
    pub delay: Option<f64>,

    /// Query this whois server instead of discovering one per TLD
    #[arg(short = 's', long = "server", value_name = "HOST")]
    pub server: Option<String>,

    /// Whois connect/read timeout in seconds
    #[arg(short = 't', long = "timeout", value_name = "SECS")]
    pub timeout: Option<u64>,
}

impl ConfigOverrides {
    /// Flags win over whatever the config file and environment said.
    pub fn apply(self, mut config: Config) -> Result<Config, config::ConfigError> {
        if let Some(output) = self.output {
            config.output_folder = output;
        }
        if let Some(delay) = self.delay {
            if delay < 0.0 || !delay.is_finite() {
                return Err(config::ConfigError::Message(
                    "--delay must be a non-negative number of seconds".to_string(),
                ));
            }
            config.request_delay_seconds = delay;
        }
        if let Some(server) = self.server.filter(|s| !s.trim().is_empty()) {
            config.whois_server = Some(server);
        }
        if let Some(timeout) = self.timeout {
            config.whois_timeout_seconds = timeout;
        }
        Ok(config)
    }
}
