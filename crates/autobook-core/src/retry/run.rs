//! Retry loop: run a closure until success or the policy says stop.

use crate::clock::{Clock, Wake};
use crate::control::CancelToken;

use super::classify::classify;
use super::error::ApiError;
use super::policy::{RetryDecision, RetryPolicy};

/// Runs `f` until it succeeds or the retry policy says to stop.
///
/// On a transient failure, logs a warning, sleeps for the backoff through
/// `clock` and tries again. Non-transient failures are returned immediately
/// without sleeping. Cancellation before an attempt or during a backoff
/// yields `ApiError::Interrupted`.
pub fn run_with_retry<T, F>(
    policy: &RetryPolicy,
    op: &str,
    clock: &dyn Clock,
    cancel: &CancelToken,
    mut f: F,
) -> Result<T, ApiError>
where
    F: FnMut() -> Result<T, ApiError>,
{
    let mut retries = 0u32;
    loop {
        if cancel.is_cancelled() {
            return Err(ApiError::Interrupted);
        }
        let err = match f() {
            Ok(v) => return Ok(v),
            Err(e) => e,
        };
        let kind = classify(&err);
        match policy.decide(retries, kind) {
            RetryDecision::NoRetry => {
                if kind.is_transient() {
                    tracing::error!(op, retries, error = %err, "{} failed after {} retries", op, retries);
                }
                return Err(err);
            }
            RetryDecision::RetryAfter(delay) => {
                tracing::warn!(
                    op,
                    attempt = retries + 1,
                    max_attempts = policy.max_retries + 1,
                    error = %err,
                    "{} failed, retrying in {:?}",
                    op,
                    delay
                );
                if clock.sleep(delay, cancel) == Wake::Cancelled {
                    return Err(ApiError::Interrupted);
                }
                retries += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::{TransportError, TransportErrorKind};
    use crate::retry::Rejection;
    use crate::testkit::ManualClock;
    use std::cell::Cell;
    use std::time::Duration;

    fn timeout() -> ApiError {
        ApiError::from(TransportError::new(TransportErrorKind::Timeout, "timed out"))
    }

    #[test]
    fn success_on_first_attempt_never_sleeps() {
        let clock = ManualClock::default();
        let cancel = CancelToken::new();
        let out = run_with_retry(&RetryPolicy::read(), "search", &clock, &cancel, || {
            Ok::<_, ApiError>(7)
        });
        assert_eq!(out.unwrap(), 7);
        assert!(clock.sleeps().is_empty());
    }

    #[test]
    fn retries_exactly_max_then_propagates() {
        let clock = ManualClock::default();
        let cancel = CancelToken::new();
        let calls = Cell::new(0u32);
        let policy = RetryPolicy::read();
        let out: Result<(), _> = run_with_retry(&policy, "search", &clock, &cancel, || {
            calls.set(calls.get() + 1);
            Err(timeout())
        });
        assert!(matches!(out, Err(ApiError::Transport(_))));
        assert_eq!(calls.get(), policy.max_retries + 1);
        assert_eq!(
            clock.sleeps(),
            vec![
                Duration::from_secs(1),
                Duration::from_secs(2),
                Duration::from_secs(4)
            ]
        );
    }

    #[test]
    fn write_profile_makes_three_attempts() {
        let clock = ManualClock::default();
        let cancel = CancelToken::new();
        let calls = Cell::new(0u32);
        let _: Result<(), _> = run_with_retry(&RetryPolicy::write(), "claim", &clock, &cancel, || {
            calls.set(calls.get() + 1);
            Err(ApiError::Status { status: 503 })
        });
        assert_eq!(calls.get(), 3);
        assert_eq!(clock.sleeps().len(), 2);
    }

    #[test]
    fn definite_rejection_is_never_retried() {
        let clock = ManualClock::default();
        let cancel = CancelToken::new();
        let calls = Cell::new(0u32);
        let out: Result<(), _> = run_with_retry(&RetryPolicy::write(), "claim", &clock, &cancel, || {
            calls.set(calls.get() + 1);
            Err(ApiError::Rejected {
                status: 409,
                reason: Rejection::Conflict,
            })
        });
        assert_eq!(out.unwrap_err().rejection(), Some(Rejection::Conflict));
        assert_eq!(calls.get(), 1);
        assert!(clock.sleeps().is_empty());
    }

    #[test]
    fn recovers_after_transient_failures() {
        let clock = ManualClock::default();
        let cancel = CancelToken::new();
        let calls = Cell::new(0u32);
        let out = run_with_retry(&RetryPolicy::read(), "search", &clock, &cancel, || {
            calls.set(calls.get() + 1);
            if calls.get() < 3 {
                Err(ApiError::Malformed("truncated".into()))
            } else {
                Ok("ok")
            }
        });
        assert_eq!(out.unwrap(), "ok");
        assert_eq!(clock.sleeps().len(), 2);
    }

    #[test]
    fn cancel_during_backoff_interrupts() {
        let clock = ManualClock::default().cancel_on_sleep(1);
        let cancel = CancelToken::new();
        let calls = Cell::new(0u32);
        let out: Result<(), _> = run_with_retry(&RetryPolicy::read(), "search", &clock, &cancel, || {
            calls.set(calls.get() + 1);
            Err(timeout())
        });
        assert!(matches!(out, Err(ApiError::Interrupted)));
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn already_cancelled_makes_no_attempt() {
        let clock = ManualClock::default();
        let cancel = CancelToken::new();
        cancel.cancel();
        let calls = Cell::new(0u32);
        let out: Result<(), _> = run_with_retry(&RetryPolicy::read(), "search", &clock, &cancel, || {
            calls.set(calls.get() + 1);
            Ok(())
        });
        assert!(matches!(out, Err(ApiError::Interrupted)));
        assert_eq!(calls.get(), 0);
    }
}
