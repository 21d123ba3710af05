//! Error type shared by every API call, classified before retry decisions.

use std::fmt;

use crate::http::TransportError;

/// A semantically final refusal from the provider. Never retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// Wrong email/password or client credentials.
    InvalidCredentials,
    /// Account or client not allowed to perform the operation.
    Forbidden,
    /// Slot already full or already claimed.
    Conflict,
    /// Bearer token refused by the claim endpoint.
    TokenExpired,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Rejection::InvalidCredentials => "invalid credentials",
            Rejection::Forbidden => "forbidden",
            Rejection::Conflict => "conflict",
            Rejection::TokenExpired => "token expired",
        };
        f.write_str(s)
    }
}

/// Failure of one API call (catalog, authenticate, or claim).
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// No HTTP status: timeout, refused connection, and so on.
    #[error("transport: {0}")]
    Transport(#[from] TransportError),
    /// Non-2xx status with no final meaning for this endpoint.
    #[error("unexpected HTTP status {status}")]
    Status { status: u16 },
    /// Body did not have the expected shape.
    #[error("malformed response: {0}")]
    Malformed(String),
    #[error("rejected with HTTP {status}: {reason}")]
    Rejected { status: u16, reason: Rejection },
    /// 2xx claim response without a confirmation id. The claim may or may
    /// not have gone through, so it must not be repeated.
    #[error("HTTP {status} without a confirmation id")]
    Unconfirmed { status: u16 },
    /// The run was cancelled before or while waiting to retry.
    #[error("interrupted")]
    Interrupted,
}

impl ApiError {
    pub fn rejection(&self) -> Option<Rejection> {
        match self {
            ApiError::Rejected { reason, .. } => Some(*reason),
            _ => None,
        }
    }
}
