//! Eligibility filter and selector.
//!
//! An item is eligible when it is available (free spots and bookable flag)
//! and passes every configured criterion: title substring, instructor
//! substring, and time-of-day window. Unset criteria always pass.

mod select;

pub use select::select;

use chrono::{FixedOffset, NaiveTime, Offset, Timelike, Utc};

use crate::model::{CandidateItem, StartTime};

/// User-supplied match criteria, immutable for the run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterCriteria {
    /// Case-insensitive substring of the title.
    pub title: Option<String>,
    /// Case-insensitive substring of the instructor name.
    pub instructor: Option<String>,
    /// Earliest accepted start time of day (inclusive).
    pub window_start: Option<NaiveTime>,
    /// Latest accepted start time of day (inclusive).
    pub window_end: Option<NaiveTime>,
    /// Offset used to turn start instants into a local time of day.
    pub utc_offset: FixedOffset,
}

impl Default for FilterCriteria {
    fn default() -> Self {
        Self {
            title: None,
            instructor: None,
            window_start: None,
            window_end: None,
            utc_offset: Utc.fix(),
        }
    }
}

impl FilterCriteria {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.instructor.is_none()
            && self.window_start.is_none()
            && self.window_end.is_none()
    }

    /// Human-readable list of active criteria, e.g. `title='yoga', after=18:00`.
    pub fn describe(&self) -> String {
        let mut parts = Vec::new();
        if let Some(t) = &self.title {
            parts.push(format!("title='{}'", t));
        }
        if let Some(i) = &self.instructor {
            parts.push(format!("instructor='{}'", i));
        }
        if let Some(s) = self.window_start {
            parts.push(format!("after={}", s.format("%H:%M")));
        }
        if let Some(e) = self.window_end {
            parts.push(format!("before={}", e.format("%H:%M")));
        }
        if parts.is_empty() {
            "none".to_string()
        } else {
            parts.join(", ")
        }
    }
}

/// Which step decided the item's fate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Eligible,
    /// No free spots or not bookable.
    Unavailable,
    TitleMismatch,
    InstructorMismatch,
    BeforeWindow,
    AfterWindow,
}

impl Verdict {
    pub fn is_eligible(self) -> bool {
        self == Verdict::Eligible
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Verdict::Eligible => "eligible",
            Verdict::Unavailable => "unavailable",
            Verdict::TitleMismatch => "title mismatch",
            Verdict::InstructorMismatch => "instructor mismatch",
            Verdict::BeforeWindow => "before time window",
            Verdict::AfterWindow => "after time window",
        }
    }
}

pub fn is_eligible(item: &CandidateItem, criteria: &FilterCriteria) -> bool {
    evaluate(item, criteria).is_eligible()
}

/// Run the four filter steps in order and report the first failing one.
pub fn evaluate(item: &CandidateItem, criteria: &FilterCriteria) -> Verdict {
    if !item.is_available() {
        return Verdict::Unavailable;
    }
    if let Some(needle) = &criteria.title {
        if !contains_ignore_case(&item.title, needle) {
            return Verdict::TitleMismatch;
        }
    }
    if let Some(needle) = &criteria.instructor {
        let name = item.instructor_name.as_deref().unwrap_or("");
        if !contains_ignore_case(name, needle) {
            return Verdict::InstructorMismatch;
        }
    }
    if criteria.window_start.is_some() || criteria.window_end.is_some() {
        return check_window(item, criteria);
    }
    Verdict::Eligible
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Items whose start time cannot be determined pass this step.
fn check_window(item: &CandidateItem, criteria: &FilterCriteria) -> Verdict {
    let start = match &item.start_time {
        StartTime::At(t) => *t,
        StartTime::Unparsed(raw) => {
            tracing::warn!(id = %item.id, raw = %raw, "could not parse start time for filtering; not filtering out");
            return Verdict::Eligible;
        }
        StartTime::Missing => {
            tracing::warn!(id = %item.id, "no start time for filtering; not filtering out");
            return Verdict::Eligible;
        }
    };
    let local = start.with_timezone(&criteria.utc_offset).time();
    // Minute resolution: a 09:30:45 start is inside a window ending at 09:30.
    let time_of_day = local.with_second(0).and_then(|t| t.with_nanosecond(0)).unwrap_or(local);

    if let Some(from) = criteria.window_start {
        if time_of_day < from {
            return Verdict::BeforeWindow;
        }
    }
    if let Some(until) = criteria.window_end {
        if time_of_day > until {
            return Verdict::AfterWindow;
        }
    }
    Verdict::Eligible
}
