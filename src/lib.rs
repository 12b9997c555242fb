//! # Bulk Whois
//!
//! Looks up whois data for a list of domains, one after another, and saves
//! each domain's record to its own CSV file.
//!
//! ## Features
//!
//! - Port-43 whois client with IANA server discovery and referral following
//! - Key/value parser covering gTLD and common ccTLD answer layouts
//! - One CSV file per domain, named after the domain
//! - Sequential fetch loop with a fixed delay, reporting progress over a channel
//! - Per-domain failures end up in that domain's record instead of stopping the run
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use bulk_whois::{BulkFetcher, Config, ResultWriter, WhoisService};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Arc::new(Config::load()?);
//!     let resolver = Arc::new(WhoisService::new(config.clone()));
//!     let writer = ResultWriter::new(&config.output_folder);
//!     let fetcher = BulkFetcher::new(resolver, writer, config.request_delay());
//!
//!     let (events, _rx) = tokio::sync::mpsc::unbounded_channel();
//!     let domains = bulk_whois::parse_domain_list("google.com\nexample.org\n");
//!     let summary = fetcher.run(domains, events).await;
//!
//!     println!("Saved {} of {} records", summary.saved, summary.total);
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod config;
pub mod errors;
pub mod fetcher;
pub mod opener;
pub mod output;
pub mod parser;
pub mod record;
pub mod tld_mappings;
pub mod whois;

// Re-export main types for easy access
pub use config::Config;
pub use errors::WhoisError;
pub use fetcher::{parse_domain_list, BulkFetcher, FetchEvent, FetchSummary};
pub use opener::{open_output_folder, OpenOutcome};
pub use output::ResultWriter;
pub use record::{LogTag, WhoisRecord, FIELDNAMES};
pub use whois::{WhoisResolver, WhoisResult, WhoisService};

/// Parsed whois data structure
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ParsedWhoisData {
    pub domain_name: Option<String>,
    pub registrar: Option<String>,
    pub creation_date: Option<String>,
    pub expiration_date: Option<String>,
    pub updated_date: Option<String>,
    pub name_servers: Vec<String>,
    pub status: Vec<String>,
}

impl ParsedWhoisData {
    /// True when the answer names a registrar, a creation date or a name server.
    pub fn has_registration_data(&self) -> bool {
        self.registrar.is_some() || self.creation_date.is_some() || !self.name_servers.is_empty()
    }
}
