use crate::{
    output::ResultWriter,
    record::{LogTag, WhoisRecord},
    whois::WhoisResolver,
};
use std::{path::PathBuf, sync::Arc, time::Duration};
use tokio::{sync::mpsc::UnboundedSender, task::JoinHandle};
use tracing::{debug, warn};

/// Progress reported by a running fetch, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchEvent {
    Started {
        total: usize,
        output_folder: PathBuf,
    },
    Processing {
        index: usize, // 1-based
        total: usize,
        domain: String,
    },
    Completed {
        index: usize,
        total: usize,
        record: WhoisRecord,
    },
    SaveFailed {
        domain: String,
        error: String,
    },
    Finished {
        total: usize,
        saved: usize,
        output_folder: PathBuf,
    },
}

impl FetchEvent {
    /// Results-log line for this event, if it produces one.
    pub fn log_line(&self) -> Option<(String, LogTag)> {
        match self {
            FetchEvent::Started { total, output_folder } => Some((
                format!(
                    "Starting lookup for {} domains. Output folder: {}",
                    total,
                    output_folder.display()
                ),
                LogTag::Info,
            )),
            FetchEvent::Completed { index, total, record } => Some((
                format!(
                    "[{}/{}] {:<30} -> Status: {}",
                    index, total, record.domain, record.status
                ),
                record.log_tag(),
            )),
            FetchEvent::SaveFailed { domain, error } => Some((
                format!("Error saving {} to CSV: {}", domain, error),
                LogTag::Error,
            )),
            FetchEvent::Processing { .. } | FetchEvent::Finished { .. } => None,
        }
    }

    /// Status-line text for this event, if it changes the status line.
    pub fn status_text(&self) -> Option<String> {
        match self {
            FetchEvent::Processing { index, total, domain } => {
                Some(format!("Processing: {} ({}/{})", domain, index, total))
            }
            FetchEvent::Finished { saved, output_folder, .. } => Some(format!(
                "Process Complete! Saved {} files to {}",
                saved,
                output_folder.display()
            )),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchSummary {
    pub total: usize,
    pub saved: usize,
    pub output_folder: PathBuf,
}

/// Sequential lookup loop: resolve, save, report, wait, next.
#[derive(Clone)]
pub struct BulkFetcher {
    resolver: Arc<dyn WhoisResolver>,
    writer: ResultWriter,
    delay: Duration,
}

impl BulkFetcher {
    pub fn new(resolver: Arc<dyn WhoisResolver>, writer: ResultWriter, delay: Duration) -> Self {
        Self { resolver, writer, delay }
    }

    pub fn output_folder(&self) -> PathBuf {
        self.writer.output_folder().to_path_buf()
    }

    /// Run the loop on the current tokio runtime.
    pub fn spawn(self, domains: Vec<String>, events: UnboundedSender<FetchEvent>) -> JoinHandle<FetchSummary> {
        tokio::spawn(async move { self.run(domains, events).await })
    }

    /// Look up every domain in order. Exactly one record is produced and one
    /// save attempted per domain; failures never stop the loop.
    pub async fn run(&self, domains: Vec<String>, events: UnboundedSender<FetchEvent>) -> FetchSummary {
        let total = domains.len();
        let output_folder = self.output_folder();
        let mut saved = 0;

        debug!("Starting lookup for {} domains into {}", total, output_folder.display());
        emit(&events, FetchEvent::Started { total, output_folder: output_folder.clone() });

        for (i, domain) in domains.into_iter().enumerate() {
            let index = i + 1;
            emit(&events, FetchEvent::Processing { index, total, domain: domain.clone() });

            let lookup = self.resolver.lookup(&domain).await;
            match &lookup {
                Err(e) if e.is_not_found() => debug!("{} is not registered", domain),
                Err(e) => warn!("Lookup failed for {}: {}", domain, e),
                Ok(result) => debug!("{} answered by {}", domain, result.server),
            }
            let record = WhoisRecord::from_lookup(&domain, lookup);

            match self.writer.save(&record) {
                Ok(_) => saved += 1,
                Err(e) => {
                    warn!("Error saving {} to CSV: {}", domain, e);
                    emit(&events, FetchEvent::SaveFailed { domain: domain.clone(), error: e.to_string() });
                }
            }

            debug!("[{}/{}] {} -> Status: {}", index, total, record.domain, record.status);
            emit(&events, FetchEvent::Completed { index, total, record });

            if index < total && !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
        }

        debug!("Process complete, saved {} of {} files to {}", saved, total, output_folder.display());
        emit(&events, FetchEvent::Finished { total, saved, output_folder: output_folder.clone() });

        FetchSummary { total, saved, output_folder }
    }
}

fn emit(events: &UnboundedSender<FetchEvent>, event: FetchEvent) {
    if events.send(event).is_err() {
        debug!("Progress receiver dropped, continuing without updates");
    }
}

/// One domain per non-blank line, trimmed.
pub fn parse_domain_list(input: &str) -> Vec<String> {
    input
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}
