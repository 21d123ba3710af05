//! Wire shapes of the v5 API and their normalization into domain types.
//!
//! Payloads name the same attribute differently across API versions
//! (`instructor` vs `instructorName`, `startDateTimeUTC` vs `startDateTime`)
//! and encode flags as bool or 0/1. All of that is resolved here, once.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Deserialize;

use crate::model::{CandidateItem, ItemId, StartTime};
use crate::retry::ApiError;

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    data: T,
}

#[derive(Debug, Deserialize)]
struct ListingData {
    #[serde(default)]
    classes: Vec<WireClass>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireClass {
    id: WireId,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    instructor: Option<String>,
    #[serde(default)]
    instructor_name: Option<String>,
    #[serde(default, rename = "startDateTimeUTC")]
    start_date_time_utc: Option<String>,
    #[serde(default)]
    start_date_time: Option<String>,
    #[serde(default)]
    maximum_number: Option<i64>,
    #[serde(default)]
    free_spots: Option<i64>,
    #[serde(default)]
    bookable: Option<WireFlag>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum WireId {
    Number(i64),
    Text(String),
}

impl From<WireId> for ItemId {
    fn from(id: WireId) -> Self {
        match id {
            WireId::Number(n) => ItemId(n.to_string()),
            WireId::Text(s) => ItemId(s),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum WireFlag {
    Bool(bool),
    Int(i64),
}

impl WireFlag {
    fn is_set(&self) -> bool {
        match self {
            WireFlag::Bool(b) => *b,
            WireFlag::Int(n) => *n != 0,
        }
    }
}

impl From<WireClass> for CandidateItem {
    fn from(w: WireClass) -> Self {
        let start = w.start_date_time_utc.or(w.start_date_time);
        CandidateItem {
            id: w.id.into(),
            title: w.title.unwrap_or_default(),
            instructor_name: w.instructor.or(w.instructor_name),
            start_time: match start {
                Some(raw) => parse_start_time(&raw),
                None => StartTime::Missing,
            },
            capacity: w.maximum_number.unwrap_or(0),
            free_spots: w.free_spots.unwrap_or(0),
            bookable: w.bookable.map(|f| f.is_set()).unwrap_or(false),
        }
    }
}

/// Parse an ISO 8601 start time. Values without an offset are UTC, so
/// `2026-03-16T18:00:00` and `2026-03-16T18:00:00Z` are the same instant.
pub fn parse_start_time(raw: &str) -> StartTime {
    let s = raw.trim();
    if let Ok(t) = DateTime::parse_from_rfc3339(s) {
        return StartTime::At(t.with_timezone(&Utc));
    }
    if let Ok(t) = DateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f%z") {
        return StartTime::At(t.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return StartTime::At(naive.and_utc());
        }
    }
    StartTime::Unparsed(raw.to_string())
}

/// Parse a catalog listing body into candidates, in listing order.
pub(super) fn parse_listing(body: &[u8]) -> Result<Vec<CandidateItem>, ApiError> {
    let envelope: Envelope<ListingData> = serde_json::from_slice(body)
        .map_err(|e| ApiError::Malformed(format!("course listing: {}", e)))?;
    Ok(envelope
        .data
        .classes
        .into_iter()
        .map(CandidateItem::from)
        .collect())
}

#[derive(Debug, Deserialize)]
struct TokenData {
    access_token: String,
}

pub(super) fn parse_token(body: &[u8]) -> Result<String, ApiError> {
    let envelope: Envelope<TokenData> = serde_json::from_slice(body)
        .map_err(|e| ApiError::Malformed(format!("token response: {}", e)))?;
    if envelope.data.access_token.is_empty() {
        return Err(ApiError::Malformed("token response: empty access_token".into()));
    }
    Ok(envelope.data.access_token)
}

#[derive(Debug, Deserialize)]
struct BookingData {
    id: WireId,
}

/// Confirmation id from a booking response, or None if the body lacks one.
pub(super) fn parse_confirmation(body: &[u8]) -> Option<String> {
    serde_json::from_slice::<Envelope<BookingData>>(body)
        .ok()
        .map(|e| ItemId::from(e.data.id).0)
}

/// Best-effort human message from a structured error body.
pub(super) fn error_message(body: &[u8]) -> Option<String> {
    const POINTERS: [&str; 4] = ["/errors/0/message", "/error_description", "/message", "/error"];
    let v: serde_json::Value = serde_json::from_slice(body).ok()?;
    for pointer in POINTERS {
        if let Some(message) = v.pointer(pointer).and_then(|m| m.as_str()) {
            return Some(message.to_string());
        }
    }
    None
}
