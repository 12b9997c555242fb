//! Bridges the synchronous UI loop to async work on the tokio runtime.

use std::path::PathBuf;

use bulk_whois::{open_output_folder, BulkFetcher, FetchEvent, OpenOutcome};
use tokio::runtime::Handle;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{error, info};

/// Results coming back from background tasks.
#[derive(Debug)]
pub enum BackendEvent {
    Fetch(FetchEvent),
    FolderOpened(Result<OpenOutcome, String>),
}

pub struct Backend {
    runtime: Handle,
    fetcher: BulkFetcher,
    fetch_tx: UnboundedSender<FetchEvent>,
    fetch_rx: UnboundedReceiver<FetchEvent>,
    open_tx: UnboundedSender<Result<OpenOutcome, String>>,
    open_rx: UnboundedReceiver<Result<OpenOutcome, String>>,
}

impl Backend {
    pub fn new(runtime: Handle, fetcher: BulkFetcher) -> Self {
        let (fetch_tx, fetch_rx) = mpsc::unbounded_channel();
        let (open_tx, open_rx) = mpsc::unbounded_channel();
        Self {
            runtime,
            fetcher,
            fetch_tx,
            fetch_rx,
            open_tx,
            open_rx,
        }
    }

    pub fn output_folder(&self) -> PathBuf {
        self.fetcher.output_folder()
    }

    pub fn start_fetch(&self, domains: Vec<String>) {
        info!("Starting lookup for {} domains", domains.len());
        let fetcher = self.fetcher.clone();
        let events = self.fetch_tx.clone();
        self.runtime.spawn(async move {
            let summary = fetcher.run(domains, events).await;
            info!("Saved {} of {} records to {}", summary.saved, summary.total, summary.output_folder.display());
        });
    }

    pub fn open_folder(&self) {
        let folder = self.output_folder();
        let results = self.open_tx.clone();
        self.runtime.spawn(async move {
            let result = open_output_folder(&folder).await.map_err(|e| {
                error!("Failed to open {}: {}", folder.display(), e);
                e.to_string()
            });
            let _ = results.send(result);
        });
    }

    /// Everything that arrived since the last call, without blocking.
    pub fn drain(&mut self) -> Vec<BackendEvent> {
        let mut events = Vec::new();
        while let Ok(event) = self.fetch_rx.try_recv() {
            events.push(BackendEvent::Fetch(event));
        }
        while let Ok(result) = self.open_rx.try_recv() {
            events.push(BackendEvent::FolderOpened(result));
        }
        events
    }
}
