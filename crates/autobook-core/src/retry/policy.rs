use std::time::Duration;

/// High-level classification of an error for retry purposes.
///
/// Callers map transport failures, HTTP statuses, and parse failures into
/// these kinds; only the policy decides what is retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Operation timed out (connect/read).
    Timeout,
    /// Network-level failure (connection reset, DNS, etc.).
    Connection,
    /// Server asked us to slow down (429).
    Throttled,
    /// Non-2xx status without a final meaning (5xx, unexpected 4xx).
    HttpStatus(u16),
    /// Response body could not be parsed.
    Malformed,
    /// Definite rejection (invalid credentials, conflict, forbidden).
    Rejected,
    /// The run was cancelled.
    Cancelled,
    /// Anything else (local misuse, unconfirmed claim); not retried.
    Other,
}

impl ErrorKind {
    pub fn is_transient(self) -> bool {
        matches!(
            self,
            ErrorKind::Timeout
                | ErrorKind::Connection
                | ErrorKind::Throttled
                | ErrorKind::HttpStatus(_)
                | ErrorKind::Malformed
        )
    }
}

/// Decision returned by the retry policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Do not retry this error.
    NoRetry,
    /// Retry after the given delay.
    RetryAfter(Duration),
}

/// Exponential backoff: retry `n` (0-based) waits `backoff_unit * backoff_base^n`,
/// capped at `max_delay`. With the defaults that is 1 s, 2 s, 4 s.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    /// Retries allowed after the first attempt.
    pub max_retries: u32,
    pub backoff_base: f64,
    pub backoff_unit: Duration,
    pub max_delay: Duration,
}

impl RetryPolicy {
    /// Profile for idempotent calls: search and authenticate.
    pub fn read() -> Self {
        Self {
            max_retries: 3,
            backoff_base: 2.0,
            backoff_unit: Duration::from_secs(1),
            max_delay: Duration::from_secs(60),
        }
    }

    /// Profile for the claim. Fewer retries to limit duplicate side effects.
    pub fn write() -> Self {
        Self {
            max_retries: 2,
            ..Self::read()
        }
    }

    /// Backoff before retry number `retry` (0-based).
    pub fn backoff(&self, retry: u32) -> Duration {
        let exponent = i32::try_from(retry).unwrap_or(i32::MAX);
        let nanos = self.backoff_unit.as_nanos() as f64 * self.backoff_base.powi(exponent);
        if !nanos.is_finite() || nanos >= self.max_delay.as_nanos() as f64 {
            return self.max_delay;
        }
        Duration::from_nanos(nanos.max(0.0).round() as u64)
    }

    /// `retries_done` counts retries already performed (0 after the first
    /// failed attempt). Returns `NoRetry` for non-transient kinds and once the
    /// budget is spent.
    pub fn decide(&self, retries_done: u32, kind: ErrorKind) -> RetryDecision {
        if !kind.is_transient() || retries_done >= self.max_retries {
            return RetryDecision::NoRetry;
        }
        RetryDecision::RetryAfter(self.backoff(retries_done))
    }
}
