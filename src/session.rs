//! One user-triggered "collect yesterday" run.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{NaiveDate, Utc};
use tracing::{info, warn};

use crate::error::ExportError;
use crate::feed::{collect, CollectMode, FeedItem, FeedSnapshot};
use crate::host::{Clock, FeedHost};
use crate::report::{render, suggested_filename, DebugTrace};
use crate::scroll::{converge_on_yesterday, ScrollSettings};
use crate::sink::DeliverySink;

/// Owner of the in-flight flag; at most one run per session at a time.
#[derive(Debug, Default)]
pub struct Session {
    running: AtomicBool,
}

impl Session {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim the session, or `None` if a run is already in flight.
    #[must_use]
    pub fn try_begin(&self) -> Option<RunGuard<'_>> {
        self.running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| RunGuard { session: self })
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }
}

/// Marks a run in flight. The session is released when dropped, including
/// on early error returns.
#[derive(Debug)]
pub struct RunGuard<'a> {
    session: &'a Session,
}

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        self.session.running.store(false, Ordering::Release);
    }
}

/// Result of [`collect_yesterday`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// Another run held the session; nothing was done.
    AlreadyRunning,
    /// The user declined the export; collected items were discarded.
    Declined { collected: usize },
    Delivered { collected: usize, path: PathBuf },
}

/// Everything a run needs from its environment.
pub struct RunContext<'a> {
    pub host: &'a dyn FeedHost,
    pub clock: &'a dyn Clock,
    pub sink: &'a dyn DeliverySink,
    pub settings: &'a ScrollSettings,
    /// Local calendar date the run started on.
    pub today: NaiveDate,
}

/// Scroll until yesterday is loaded, collect it, and hand the rendered
/// report to the sink after confirmation.
///
/// # Errors
///
/// Returns an error if the host, the confirmation prompt or delivery fails.
pub async fn collect_yesterday(
    session: &Session,
    ctx: &RunContext<'_>,
) -> Result<RunOutcome, ExportError> {
    let Some(_guard) = session.try_begin() else {
        warn!("Collection already running, ignoring trigger");
        return Ok(RunOutcome::AlreadyRunning);
    };

    let mut trace = DebugTrace::new(CollectMode::Yesterday, Utc::now());

    let outcome = converge_on_yesterday(ctx.host, ctx.clock, ctx.settings).await?;
    trace.record_scroll(&outcome);

    let html = ctx.host.page_html().await?;
    let items = collect_html(&html, CollectMode::Yesterday);
    trace.total_collected = Some(items.len());

    info!(
        collected = items.len(),
        rounds = outcome.rounds_run,
        converged = outcome.converged_at.is_some(),
        "Collection finished"
    );

    if !ctx.sink.confirm(items.len()).await? {
        info!(collected = items.len(), "Export declined");
        return Ok(RunOutcome::Declined {
            collected: items.len(),
        });
    }

    let document = render(&items, &trace);
    let path = ctx
        .sink
        .deliver(&suggested_filename(ctx.today), &document)
        .await?;

    Ok(RunOutcome::Delivered {
        collected: items.len(),
        path,
    })
}

fn collect_html(html: &str, mode: CollectMode) -> Vec<FeedItem> {
    collect(&FeedSnapshot::parse(html), mode)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guard_is_exclusive() {
        let session = Session::new();
        let guard = session.try_begin();
        assert!(guard.is_some());
        assert!(session.is_running());
        assert!(session.try_begin().is_none());
        drop(guard);
        assert!(!session.is_running());
        assert!(session.try_begin().is_some());
    }

    #[test]
    fn test_guard_released_on_unwind() {
        let session = Session::new();
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _guard = session.try_begin().unwrap();
            panic!("run failed");
        }));
        assert!(result.is_err());
        assert!(!session.is_running());
    }
}
