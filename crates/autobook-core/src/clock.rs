//! Wall clock and cancellable sleep, behind a trait so the poll loop and the
//! retry runner can be driven by a manual clock in tests.

use chrono::{DateTime, Utc};
use std::time::Duration;

use crate::control::CancelToken;

/// How a sleep ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wake {
    Elapsed,
    Cancelled,
}

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;

    /// Block for `duration` or until `cancel` fires, whichever comes first.
    fn sleep(&self, duration: Duration, cancel: &CancelToken) -> Wake;
}

/// Real time, real sleeps.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn sleep(&self, duration: Duration, cancel: &CancelToken) -> Wake {
        if cancel.wait_timeout(duration) {
            Wake::Cancelled
        } else {
            Wake::Elapsed
        }
    }
}
