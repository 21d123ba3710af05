//! Classify API errors and HTTP statuses into retry policy error kinds.

use crate::http::TransportErrorKind;

use super::error::ApiError;
use super::policy::ErrorKind;

/// Classify a non-2xx HTTP status that an endpoint did not map to a rejection.
pub fn classify_http_status(code: u16) -> ErrorKind {
    match code {
        429 => ErrorKind::Throttled,
        _ => ErrorKind::HttpStatus(code),
    }
}

pub fn classify(e: &ApiError) -> ErrorKind {
    match e {
        ApiError::Transport(t) => match t.kind {
            TransportErrorKind::Timeout => ErrorKind::Timeout,
            TransportErrorKind::Connection => ErrorKind::Connection,
            TransportErrorKind::Other => ErrorKind::Other,
        },
        ApiError::Status { status } => classify_http_status(*status),
        ApiError::Malformed(_) => ErrorKind::Malformed,
        ApiError::Rejected { .. } => ErrorKind::Rejected,
        ApiError::Unconfirmed { .. } => ErrorKind::Other,
        ApiError::Interrupted => ErrorKind::Cancelled,
    }
}
