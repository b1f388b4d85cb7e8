//! Delivery of the finished report to the user.

use std::io::Write as _;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::info;

use crate::error::ExportError;

/// Accepts a finished report after a yes/no confirmation.
#[async_trait]
pub trait DeliverySink: Send + Sync {
    /// Ask whether `collected` items should be exported.
    async fn confirm(&self, collected: usize) -> Result<bool, ExportError>;

    /// Deliver the document under the suggested file name.
    async fn deliver(&self, filename: &str, document: &str) -> Result<PathBuf, ExportError>;
}

/// Writes reports into a directory, asking on stdin first.
#[derive(Debug, Clone)]
pub struct FileSink {
    output_dir: PathBuf,
    assume_yes: bool,
}

impl FileSink {
    #[must_use]
    pub fn new(output_dir: impl Into<PathBuf>, assume_yes: bool) -> Self {
        Self {
            output_dir: output_dir.into(),
            assume_yes,
        }
    }

    #[must_use]
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }
}

#[async_trait]
impl DeliverySink for FileSink {
    async fn confirm(&self, collected: usize) -> Result<bool, ExportError> {
        if self.assume_yes {
            return Ok(true);
        }

        let answer = tokio::task::spawn_blocking(move || -> std::io::Result<String> {
            let mut stdout = std::io::stdout();
            write!(stdout, "V2 收集完成：{collected} 条\n导出 Markdown? [y/N] ")?;
            stdout.flush()?;
            let mut line = String::new();
            std::io::stdin().read_line(&mut line)?;
            Ok(line)
        })
        .await
        .map_err(|e| ExportError::Prompt(std::io::Error::other(e)))?
        .map_err(ExportError::Prompt)?;

        Ok(is_yes(&answer))
    }

    async fn deliver(&self, filename: &str, document: &str) -> Result<PathBuf, ExportError> {
        let path = self.output_dir.join(filename);
        let delivery_error = |source| ExportError::Delivery {
            path: path.clone(),
            source,
        };

        tokio::fs::create_dir_all(&self.output_dir)
            .await
            .map_err(delivery_error)?;
        tokio::fs::write(&path, document)
            .await
            .map_err(delivery_error)?;

        info!(path = %path.display(), bytes = document.len(), "Report written");
        Ok(path)
    }
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}
