//! Run observer: the poll loop and claim sequencer report what they do as
//! [`RunEvent`]s to an injected [`RunObserver`]. [`TracingObserver`] renders
//! them as log lines.

use crate::filter::Verdict;
use crate::model::{BookingTarget, CandidateItem, ItemId, Outcome};

/// States of a run, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Scheduling,
    Polling,
    Matched,
    Claiming,
    Terminal,
}

/// Summary of one candidate that was looked at but not selected.
#[derive(Debug, Clone, PartialEq)]
pub struct SampledCandidate {
    pub id: ItemId,
    pub title: String,
    pub free_spots: i64,
    pub capacity: i64,
    pub bookable: bool,
    pub verdict: Verdict,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RunEvent {
    PhaseChanged { from: Phase, to: Phase },
    TargetComputed(BookingTarget),
    FiltersActive(String),
    PollAttempt { attempt: u32 },
    /// The listing had no eligible item; `sample` holds the first few.
    NoMatch {
        attempt: u32,
        candidates: usize,
        sample: Vec<SampledCandidate>,
    },
    /// The attempt's search failed after its retry budget.
    AttemptFailed { attempt: u32, error: String },
    Waiting { seconds: u64 },
    Matched { attempt: u32, item: CandidateItem },
    Authenticated,
    AuthFailed { error: String },
    ClaimRejected { error: String },
    Finished(Outcome),
}

pub trait RunObserver: Send + Sync {
    fn on_event(&self, event: &RunEvent);
}

/// Logs each event through `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl RunObserver for TracingObserver {
    fn on_event(&self, event: &RunEvent) {
        match event {
            RunEvent::PhaseChanged { from, to } => {
                tracing::debug!(?from, ?to, "phase change");
            }
            RunEvent::TargetComputed(t) => {
                tracing::info!(
                    target_date = %t.target_date,
                    location_id = t.location_id,
                    deadline = %t.deadline,
                    "booking target computed"
                );
            }
            RunEvent::FiltersActive(desc) => tracing::info!(filters = %desc, "active filters"),
            RunEvent::PollAttempt { attempt } => {
                tracing::info!(attempt, "searching for classes");
            }
            RunEvent::NoMatch {
                attempt,
                candidates,
                sample,
            } => {
                tracing::info!(attempt, candidates, "no bookable class matching filters");
                for s in sample {
                    tracing::debug!(
                        id = %s.id,
                        title = %s.title,
                        spots = format_args!("{}/{}", s.free_spots, s.capacity),
                        bookable = s.bookable,
                        verdict = s.verdict.as_str(),
                        "sample candidate"
                    );
                }
            }
            RunEvent::AttemptFailed { attempt, error } => {
                tracing::warn!(attempt, error = %error, "search attempt failed");
            }
            RunEvent::Waiting { seconds } => tracing::info!(seconds, "waiting before next check"),
            RunEvent::Matched { attempt, item } => {
                tracing::info!(
                    attempt,
                    id = %item.id,
                    title = %item.title,
                    start = %item.start_time,
                    spots = format_args!("{}/{}", item.free_spots, item.capacity),
                    "found bookable class"
                );
            }
            RunEvent::Authenticated => tracing::info!("login successful"),
            RunEvent::AuthFailed { error } => tracing::error!(error = %error, "login failed"),
            RunEvent::ClaimRejected { error } => tracing::error!(error = %error, "booking failed"),
            RunEvent::Finished(outcome) => {
                if outcome.is_success() {
                    tracing::info!(%outcome, "run finished");
                } else {
                    tracing::warn!(%outcome, "run finished");
                }
            }
        }
    }
}
