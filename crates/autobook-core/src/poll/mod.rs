//! Poll loop: Scheduling → Polling → Matched → Claiming → Terminal.
//!
//! Owns every timing and termination decision. A failed search attempt never
//! ends the run; only the deadline, a cancel, or the claim's outcome do.

use crate::api::ApiClient;
use crate::claim::ClaimSequencer;
use crate::clock::{Clock, Wake};
use crate::config::Settings;
use crate::control::CancelToken;
use crate::events::{Phase, RunEvent, RunObserver, SampledCandidate};
use crate::filter::{evaluate, select};
use crate::model::{BookingTarget, CandidateItem, Outcome};
use crate::retry::{run_with_retry, ApiError};
use crate::schedule::compute_target;

/// How many non-selected candidates are reported per empty attempt.
const SAMPLE_SIZE: usize = 3;

/// Collaborators shared by the poll loop and the claim sequencer.
#[derive(Clone, Copy)]
pub struct RunContext<'a> {
    pub client: &'a ApiClient,
    pub clock: &'a dyn Clock,
    pub cancel: &'a CancelToken,
    pub observer: &'a dyn RunObserver,
}

enum Polled {
    Matched(CandidateItem),
    Done(Outcome),
}

pub struct Poller<'a> {
    ctx: RunContext<'a>,
    settings: &'a Settings,
}

impl<'a> Poller<'a> {
    pub fn new(ctx: RunContext<'a>, settings: &'a Settings) -> Self {
        Self { ctx, settings }
    }

    /// Target date and deadline for a run started now.
    pub fn target(&self) -> BookingTarget {
        compute_target(
            self.ctx.clock.now(),
            &self.settings.run.schedule,
            self.settings.criteria.utc_offset,
        )
    }

    /// Drive the run to a terminal outcome.
    pub fn run(&self) -> Outcome {
        let mut phase = Phase::Scheduling;
        let target = self.target();
        self.emit(RunEvent::TargetComputed(target));
        self.emit(RunEvent::FiltersActive(self.settings.criteria.describe()));

        self.enter(&mut phase, Phase::Polling);
        let outcome = match self.poll(&target) {
            Polled::Matched(item) => {
                self.enter(&mut phase, Phase::Matched);
                self.enter(&mut phase, Phase::Claiming);
                ClaimSequencer::new(self.ctx, self.settings).claim(&item)
            }
            Polled::Done(outcome) => outcome,
        };
        self.enter(&mut phase, Phase::Terminal);
        self.emit(RunEvent::Finished(outcome.clone()));
        outcome
    }

    fn poll(&self, target: &BookingTarget) -> Polled {
        let RunContext {
            client,
            clock,
            cancel,
            ..
        } = self.ctx;
        let run = &self.settings.run;
        let criteria = &self.settings.criteria;
        let mut attempt = 0u32;

        loop {
            if cancel.is_cancelled() {
                return Polled::Done(Outcome::Interrupted);
            }
            if clock.now() >= target.deadline {
                return Polled::Done(Outcome::NoMatchFound);
            }

            attempt += 1;
            self.emit(RunEvent::PollAttempt { attempt });
            let searched = run_with_retry(&self.settings.read_retry, "search", clock, cancel, || {
                client.search(target.location_id, target.target_date, run.page_size)
            });
            match searched {
                Ok(items) => {
                    if let Some(item) = select(&items, criteria) {
                        self.emit(RunEvent::Matched {
                            attempt,
                            item: item.clone(),
                        });
                        return Polled::Matched(item.clone());
                    }
                    self.emit(RunEvent::NoMatch {
                        attempt,
                        candidates: items.len(),
                        sample: sample(&items, criteria),
                    });
                }
                Err(ApiError::Interrupted) => return Polled::Done(Outcome::Interrupted),
                Err(e) => self.emit(RunEvent::AttemptFailed {
                    attempt,
                    error: e.to_string(),
                }),
            }

            if clock.now() >= target.deadline {
                return Polled::Done(Outcome::NoMatchFound);
            }
            self.emit(RunEvent::Waiting {
                seconds: run.poll_interval.as_secs(),
            });
            if clock.sleep(run.poll_interval, cancel) == Wake::Cancelled {
                return Polled::Done(Outcome::Interrupted);
            }
        }
    }

    fn enter(&self, phase: &mut Phase, to: Phase) {
        let from = std::mem::replace(phase, to);
        self.emit(RunEvent::PhaseChanged { from, to });
    }

    fn emit(&self, event: RunEvent) {
        self.ctx.observer.on_event(&event);
    }
}

fn sample(items: &[CandidateItem], criteria: &crate::filter::FilterCriteria) -> Vec<SampledCandidate> {
    items
        .iter()
        .take(SAMPLE_SIZE)
        .map(|item| SampledCandidate {
            id: item.id.clone(),
            title: item.title.clone(),
            free_spots: item.free_spots,
            capacity: item.capacity,
            bookable: item.bookable,
            verdict: evaluate(item, criteria),
        })
        .collect()
}
