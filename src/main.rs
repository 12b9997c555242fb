//! Bulk WHOIS Domain Lookup, interactive terminal front end.
//!
//! Paste or type domains (one per line), start the run and watch each
//! domain's status arrive in the results log. Every domain is saved to its
//! own CSV file in the output folder. Diagnostics go to the configured log
//! file so they never draw over the screen.

mod tui;

use std::{
    fs::OpenOptions,
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
};

use anyhow::{Context, Result};
use bulk_whois::{cli::ConfigOverrides, BulkFetcher, Config, ResultWriter, WhoisService};
use clap::Parser;
use tracing::info;

use tui::{backend::Backend, model::App, terminal};

const DEFAULT_INPUT: &str = "google.com\nexample.org\nopenai.com";

#[derive(Parser, Debug)]
#[command(name = "bulk-whois")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Interactive bulk whois lookup, one CSV per domain")]
struct Args {
    /// File whose lines prefill the input box
    #[arg(value_name = "FILE")]
    domains_file: Option<PathBuf>,

    #[command(flatten)]
    overrides: ConfigOverrides,
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let args = Args::parse();
    let config = args.overrides.apply(Config::load().context("Failed to load configuration")?)?;
    let config = Arc::new(config);

    init_tracing(&config.log_file)?;
    info!("Configuration loaded, output folder {}", config.output_folder.display());

    let initial_input = match &args.domains_file {
        Some(path) => std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?,
        None => DEFAULT_INPUT.to_string(),
    };

    let runtime = tokio::runtime::Runtime::new().context("Failed to start async runtime")?;
    let fetcher = BulkFetcher::new(
        Arc::new(WhoisService::new(config.clone())),
        ResultWriter::new(&config.output_folder),
        config.request_delay(),
    );
    let mut backend = Backend::new(runtime.handle().clone(), fetcher);
    let mut app = App::new(&initial_input);

    let mut term = terminal::init_terminal()?;
    let result = tui::run(&mut term, &mut app, &mut backend);
    terminal::restore_terminal(&mut term)?;

    info!("Exiting");
    result
}

fn init_tracing(log_file: &Path) -> Result<()> {
    if let Some(parent) = log_file.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_file)
        .with_context(|| format!("Failed to open log file {}", log_file.display()))?;

    tracing_subscriber::fmt()
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_env_filter(std::env::var("RUST_LOG").unwrap_or_else(|_| "bulk_whois=info".into()))
        .init();
    Ok(())
}
