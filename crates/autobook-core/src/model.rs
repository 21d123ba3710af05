//! Domain types shared across the poll/claim pipeline.

use chrono::{DateTime, NaiveDate, Utc};
use std::fmt;

/// Provider-assigned identifier of a class slot. Opaque: numeric ids are kept
/// as their decimal text.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ItemId(pub String);

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Start time as normalized at the catalog boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StartTime {
    At(DateTime<Utc>),
    /// Present in the payload but not parseable; raw text kept for logs.
    Unparsed(String),
    Missing,
}

impl StartTime {
    pub fn instant(&self) -> Option<DateTime<Utc>> {
        match self {
            StartTime::At(t) => Some(*t),
            _ => None,
        }
    }
}

impl fmt::Display for StartTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StartTime::At(t) => write!(f, "{}", t.format("%Y-%m-%d %H:%MZ")),
            StartTime::Unparsed(raw) => write!(f, "{:?} (unparsed)", raw),
            StartTime::Missing => f.write_str("n/a"),
        }
    }
}

/// One bookable (or not) class in a catalog listing. Rebuilt on every poll.
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateItem {
    pub id: ItemId,
    /// Empty when the payload had no title.
    pub title: String,
    pub instructor_name: Option<String>,
    pub start_time: StartTime,
    pub capacity: i64,
    pub free_spots: i64,
    pub bookable: bool,
}

impl CandidateItem {
    /// Claimable right now: has free spots and the provider says bookable.
    pub fn is_available(&self) -> bool {
        self.free_spots > 0 && self.bookable
    }
}

/// What to look for and until when. Computed once per run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BookingTarget {
    pub target_date: NaiveDate,
    pub location_id: u64,
    pub deadline: DateTime<Utc>,
}

/// Bearer token for exactly one claim attempt.
#[derive(Clone)]
pub struct Session {
    pub bearer_token: String,
    pub obtained_at: DateTime<Utc>,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("bearer_token", &"<redacted>")
            .field("obtained_at", &self.obtained_at)
            .finish()
    }
}

/// Why a claim did not produce a booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClaimFailure {
    /// Slot already full or already claimed (409).
    Conflict,
    /// Token refused by the claim endpoint (401).
    TokenExpired,
    /// Account not allowed to book this slot (403).
    Forbidden,
    /// Retries exhausted, transport failure, or an unconfirmed 2xx.
    Unknown,
}

impl fmt::Display for ClaimFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ClaimFailure::Conflict => "slot already full or claimed",
            ClaimFailure::TokenExpired => "authentication token rejected",
            ClaimFailure::Forbidden => "access forbidden",
            ClaimFailure::Unknown => "unknown failure",
        };
        f.write_str(s)
    }
}

/// Final result of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Booked {
        item_id: ItemId,
        confirmation_id: String,
    },
    NoMatchFound,
    AuthFailed,
    ClaimFailed(ClaimFailure),
    Interrupted,
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Booked { .. })
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Booked {
                item_id,
                confirmation_id,
            } => write!(f, "booked class {} (booking {})", item_id, confirmation_id),
            Outcome::NoMatchFound => f.write_str("deadline reached without a matching class"),
            Outcome::AuthFailed => f.write_str("login failed"),
            Outcome::ClaimFailed(reason) => write!(f, "booking failed: {}", reason),
            Outcome::Interrupted => f.write_str("interrupted by user"),
        }
    }
}
