//! Incremental scrolling until yesterday's items are fully rendered.
//!
//! The feed has no cursor, so loading is judged by what is on the page:
//! two-days-ago content only appears once yesterday has been scrolled past,
//! and after that the yesterday count has to hold still for a few rounds
//! because lazy mount/unmount can make it flicker.

use std::time::Duration;

use tracing::{debug, info};

use crate::feed::{tally, FeedSnapshot, RoundTally};
use crate::host::{Clock, FeedHost, HostError};

/// Reason recorded in the debug trace when the loop converges.
pub const STOP_REASON: &str = "昨天数量稳定 + 已出现 2天前";

/// Loop tuning.
#[derive(Debug, Clone)]
pub struct ScrollSettings {
    /// Pause after each scroll before the page is read.
    pub settle_delay: Duration,
    /// Pause after the loop ends, for items still mounting.
    pub final_settle: Duration,
    /// Hard ceiling on rounds. Reaching it is not an error.
    pub max_rounds: u32,
    /// Consecutive unchanged yesterday counts needed to converge.
    pub stable_rounds: u32,
}

impl Default for ScrollSettings {
    fn default() -> Self {
        Self {
            settle_delay: Duration::from_millis(1500),
            final_settle: Duration::from_millis(2000),
            max_rounds: 60,
            stable_rounds: 3,
        }
    }
}

/// State of the scroll loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollPhase {
    /// Issue the scroll command for `round`.
    Scrolling { round: u32 },
    /// Wait for the page to render after scrolling.
    Settling { round: u32 },
    /// Read the page and update the stability count.
    Stabilizing { round: u32 },
    Converged { round: u32 },
    Exhausted { rounds: u32 },
}

impl ScrollPhase {
    #[must_use]
    pub fn is_terminal(self) -> bool {
        self.outcome().is_some()
    }

    /// Final result, for terminal phases only.
    #[must_use]
    pub fn outcome(self) -> Option<ScrollOutcome> {
        match self {
            Self::Converged { round } => Some(ScrollOutcome {
                rounds_run: round,
                converged_at: Some(round),
            }),
            Self::Exhausted { rounds } => Some(ScrollOutcome {
                rounds_run: rounds,
                converged_at: None,
            }),
            _ => None,
        }
    }
}

/// Stability bookkeeping across rounds.
#[derive(Debug, Clone)]
pub struct ConvergenceTracker {
    required: u32,
    stable_rounds: u32,
    last_yesterday: usize,
    saw_two_days_ago: bool,
}

impl ConvergenceTracker {
    #[must_use]
    pub fn new(required: u32) -> Self {
        Self {
            required,
            stable_rounds: 0,
            last_yesterday: 0,
            saw_two_days_ago: false,
        }
    }

    /// Feed one round's tally. Returns `true` once converged.
    ///
    /// Stability is only counted after two-days-ago content has shown up;
    /// that flag is sticky.
    pub fn observe(&mut self, tally: RoundTally) -> bool {
        self.saw_two_days_ago |= tally.saw_two_days_ago;

        if self.saw_two_days_ago {
            if tally.yesterday == self.last_yesterday {
                self.stable_rounds += 1;
            } else {
                self.stable_rounds = 0;
            }
        }
        self.last_yesterday = tally.yesterday;

        self.saw_two_days_ago && self.stable_rounds >= self.required
    }

    #[must_use]
    pub fn stable_rounds(&self) -> u32 {
        self.stable_rounds
    }

    #[must_use]
    pub fn saw_two_days_ago(&self) -> bool {
        self.saw_two_days_ago
    }
}

/// How the loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrollOutcome {
    pub rounds_run: u32,
    /// Round at which convergence triggered; `None` if the ceiling was hit.
    pub converged_at: Option<u32>,
}

/// Scroll until yesterday's items are stable or the round ceiling is hit.
///
/// # Errors
///
/// Returns an error only if the host fails to scroll or serve the page.
pub async fn converge_on_yesterday(
    host: &dyn FeedHost,
    clock: &dyn Clock,
    settings: &ScrollSettings,
) -> Result<ScrollOutcome, HostError> {
    let mut tracker = ConvergenceTracker::new(settings.stable_rounds);
    let mut phase = ScrollPhase::Scrolling { round: 1 };

    let outcome = loop {
        if let Some(outcome) = phase.outcome() {
            break outcome;
        }

        phase = match phase {
            ScrollPhase::Scrolling { round } => {
                host.scroll_to_bottom().await?;
                ScrollPhase::Settling { round }
            }
            ScrollPhase::Settling { round } => {
                clock.sleep(settings.settle_delay).await;
                ScrollPhase::Stabilizing { round }
            }
            ScrollPhase::Stabilizing { round } => {
                let html = host.page_html().await?;
                let round_tally = tally_html(&html);
                let converged = tracker.observe(round_tally);

                debug!(
                    round,
                    yesterday = round_tally.yesterday,
                    saw_two_days_ago = tracker.saw_two_days_ago(),
                    stable_rounds = tracker.stable_rounds(),
                    "Scroll round"
                );

                if converged {
                    info!(round, "Yesterday count stable after two-days-ago content");
                    ScrollPhase::Converged { round }
                } else if round >= settings.max_rounds {
                    info!(round, "Scroll round ceiling reached without convergence");
                    ScrollPhase::Exhausted { rounds: round }
                } else {
                    ScrollPhase::Scrolling { round: round + 1 }
                }
            }
            terminal => terminal,
        };
    };

    clock.sleep(settings.final_settle).await;

    Ok(outcome)
}

fn tally_html(html: &str) -> RoundTally {
    tally(&FeedSnapshot::parse(html))
}
