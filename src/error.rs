use std::path::PathBuf;

use thiserror::Error;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Failure talking to the page host.
#[derive(Debug, Error)]
pub enum HostError {
    #[error("failed to launch browser: {0}")]
    Launch(#[source] BoxError),
    #[error("failed to open {url}: {source}")]
    Navigation {
        url: String,
        #[source]
        source: BoxError,
    },
    #[error("page script failed ({action}): {source}")]
    Script {
        action: &'static str,
        #[source]
        source: BoxError,
    },
    #[error("failed to read page content: {0}")]
    Snapshot(#[source] BoxError),
}

/// Failure of a collection run.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error(transparent)]
    Host(#[from] HostError),
    #[error("failed to read confirmation: {0}")]
    Prompt(#[source] std::io::Error),
    #[error("failed to write report to {path}: {source}")]
    Delivery {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
