//! Seams to the environment that renders the feed.
//!
//! The collector only ever sees serialized HTML, and the scroll loop only
//! needs "scroll to bottom" plus a way to wait, so both can be replaced by
//! scripted doubles in tests.

use std::time::Duration;

use async_trait::async_trait;

pub use crate::error::HostError;

pub mod chromium;

pub use chromium::{ChromiumHost, ChromiumHostConfig};

/// Live page the feed is rendered in.
#[async_trait]
pub trait FeedHost: Send + Sync {
    /// Serialized HTML of the page as currently rendered.
    async fn page_html(&self) -> Result<String, HostError>;

    /// Scroll the page to the bottom of its content.
    async fn scroll_to_bottom(&self) -> Result<(), HostError>;
}

/// Suspend primitive used for settle delays.
#[async_trait]
pub trait Clock: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Real clock backed by the tokio timer.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioClock;

#[async_trait]
impl Clock for TokioClock {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}
