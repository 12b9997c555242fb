//! Headless bulk whois fetcher.
//!
//! Reads domains from arguments, `--file` or stdin, writes one CSV per domain
//! and logs progress to stderr. With `--json` each record is also printed to
//! stdout as one JSON object per line.

use anyhow::{bail, Context, Result};
use bulk_whois::cli::ConfigOverrides;
use bulk_whois::{parse_domain_list, BulkFetcher, Config, FetchEvent, LogTag, ResultWriter, WhoisService};
use clap::Parser;
use std::{io::Read, path::PathBuf, sync::Arc};
use tokio::sync::mpsc;
use tracing::{debug, error, info};

#[derive(Parser, Debug)]
#[command(name = "bulk-whois-batch")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Look up whois data for a list of domains and save one CSV per domain")]
struct Args {
    /// Domains to look up (reads --file or stdin when empty)
    #[arg(value_name = "DOMAINS")]
    domains: Vec<String>,

    /// File with one domain per line
    #[arg(short = 'f', long = "file", value_name = "FILE")]
    file: Option<PathBuf>,

    /// Print every record as a JSON line on stdout
    #[arg(short = 'j', long = "json")]
    json: bool,

    #[command(flatten)]
    overrides: ConfigOverrides,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(std::env::var("RUST_LOG").unwrap_or_else(|_| "bulk_whois=info,bulk_whois_batch=info".into()))
        .init();

    let args = Args::parse();
    let config = args.overrides.apply(Config::load().context("Failed to load configuration")?)?;
    let config = Arc::new(config);

    let domains = if !args.domains.is_empty() {
        parse_domain_list(&args.domains.join("\n"))
    } else if let Some(file) = &args.file {
        let contents = std::fs::read_to_string(file).with_context(|| format!("Failed to read {}", file.display()))?;
        parse_domain_list(&contents)
    } else {
        let mut contents = String::new();
        std::io::stdin().read_to_string(&mut contents).context("Failed to read stdin")?;
        parse_domain_list(&contents)
    };

    if domains.is_empty() {
        bail!("No input: provide at least one domain name");
    }

    let fetcher = BulkFetcher::new(
        Arc::new(WhoisService::new(config.clone())),
        ResultWriter::new(&config.output_folder),
        config.request_delay(),
    );

    let (tx, mut rx) = mpsc::unbounded_channel();
    let handle = fetcher.spawn(domains, tx);

    while let Some(event) = rx.recv().await {
        if let Some((line, tag)) = event.log_line() {
            match tag {
                LogTag::Error => error!("{}", line),
                LogTag::Info | LogTag::Success => info!("{}", line),
            }
        }
        if let FetchEvent::Completed { record, .. } = &event {
            if args.json {
                println!("{}", serde_json::to_string(record)?);
            }
        }
        if let Some(status) = event.status_text() {
            info!("{}", status);
        }
    }

    let summary = handle.await.context("Fetch task failed")?;
    debug!("Saved {} of {} records", summary.saved, summary.total);

    Ok(())
}
