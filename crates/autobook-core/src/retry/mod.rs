//! Retry and backoff policy.
//!
//! Encapsulates error classification (timeouts, throttling, connection
//! failures, definite rejections) and exponential backoff so the poll loop and
//! the claim sequencer apply one consistent policy. Two profiles exist:
//! `read` for search and authenticate, `write` for the claim, which gets a
//! smaller budget because a duplicate claim has side effects.

mod classify;
mod error;
mod policy;
mod run;

pub use classify::{classify, classify_http_status};
pub use error::{ApiError, Rejection};
pub use policy::{ErrorKind, RetryDecision, RetryPolicy};
pub use run::run_with_retry;
