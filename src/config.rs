use serde::{Deserialize, Serialize};
use std::{path::PathBuf, time::Duration};

/// Environment variable naming an optional config file (toml, yaml, json, ...).
pub const CONFIG_FILE_ENV: &str = "BULK_WHOIS_CONFIG";

#[derive(Debug, Clone)]
pub struct Config {
    pub output_folder: PathBuf,
    pub request_delay_seconds: f64,
    pub whois_timeout_seconds: u64,
    pub max_response_size: usize,
    pub max_referrals: usize,
    pub discovery_timeout_seconds: u64,
    pub whois_server: Option<String>, // Skips server discovery when set
    pub whois_port: u16,
    pub log_file: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ConfigData {
    pub output_folder: String,
    pub request_delay_seconds: f64,
    pub whois_timeout_seconds: u64,
    pub max_response_size: usize,
    pub max_referrals: usize,
    pub discovery_timeout_seconds: u64,
    #[serde(default)]
    pub whois_server: Option<String>,
    pub whois_port: u16,
    pub log_file: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            output_folder: PathBuf::from("output/individual_results/"),
            request_delay_seconds: 2.0,
            whois_timeout_seconds: 15,
            max_response_size: 1024 * 1024,
            max_referrals: 5,
            discovery_timeout_seconds: 10,
            whois_server: None,
            whois_port: 43,
            log_file: PathBuf::from("output/bulk-whois.log"),
        }
    }
}

impl Config {
    /// Defaults, then the optional config file, then environment variables.
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::load_with(|key| std::env::var(key).ok())
    }

    /// Same as [`Config::load`] with a custom variable lookup.
    pub fn load_with<F>(lookup: F) -> Result<Self, config::ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Config::default();

        let mut settings = config::Config::builder()
            .set_default("output_folder", defaults.output_folder.to_string_lossy().to_string())?
            .set_default("request_delay_seconds", defaults.request_delay_seconds)?
            .set_default("whois_timeout_seconds", defaults.whois_timeout_seconds)?
            .set_default("max_response_size", defaults.max_response_size as i64)?
            .set_default("max_referrals", defaults.max_referrals as i64)?
            .set_default("discovery_timeout_seconds", defaults.discovery_timeout_seconds)?
            .set_default("whois_port", defaults.whois_port as i64)?
            .set_default("log_file", defaults.log_file.to_string_lossy().to_string())?;

        if let Some(path) = lookup(CONFIG_FILE_ENV) {
            settings = settings.add_source(config::File::with_name(&path));
        }

        settings = Self::apply_env_overrides(settings, &lookup)?;

        let config_data: ConfigData = settings.build()?.try_deserialize()?;

        if config_data.request_delay_seconds < 0.0 || !config_data.request_delay_seconds.is_finite() {
            return Err(config::ConfigError::Message(format!(
                "request_delay_seconds must be a non-negative number, got {}",
                config_data.request_delay_seconds
            )));
        }

        Ok(Config {
            output_folder: PathBuf::from(config_data.output_folder),
            request_delay_seconds: config_data.request_delay_seconds,
            whois_timeout_seconds: config_data.whois_timeout_seconds,
            max_response_size: config_data.max_response_size,
            max_referrals: config_data.max_referrals,
            discovery_timeout_seconds: config_data.discovery_timeout_seconds,
            whois_server: config_data.whois_server.filter(|s| !s.trim().is_empty()),
            whois_port: config_data.whois_port,
            log_file: PathBuf::from(config_data.log_file),
        })
    }

    pub fn request_delay(&self) -> Duration {
        Duration::from_secs_f64(self.request_delay_seconds)
    }

    pub fn whois_timeout(&self) -> Duration {
        Duration::from_secs(self.whois_timeout_seconds)
    }

    pub fn discovery_timeout(&self) -> Duration {
        Duration::from_secs(self.discovery_timeout_seconds)
    }

    fn apply_env_overrides<F>(
        mut settings: config::ConfigBuilder<config::builder::DefaultState>,
        lookup: &F,
    ) -> Result<config::ConfigBuilder<config::builder::DefaultState>, config::ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env_mappings = [
            ("OUTPUT_FOLDER", "output_folder"),
            ("REQUEST_DELAY_SECONDS", "request_delay_seconds"),
            ("WHOIS_TIMEOUT_SECONDS", "whois_timeout_seconds"),
            ("WHOIS_TIMEOUT", "whois_timeout_seconds"),
            ("MAX_RESPONSE_SIZE", "max_response_size"),
            ("MAX_REFERRALS", "max_referrals"),
            ("DISCOVERY_TIMEOUT_SECONDS", "discovery_timeout_seconds"),
            ("DISCOVERY_TIMEOUT", "discovery_timeout_seconds"),
            ("WHOIS_SERVER", "whois_server"),
            ("WHOIS_PORT", "whois_port"),
            ("LOG_FILE", "log_file"),
        ];

        for (env_var, config_key) in env_mappings {
            if let Some(value) = lookup(env_var) {
                settings = settings.set_override(config_key, value)?;
            }
        }

        Ok(settings)
    }
}
