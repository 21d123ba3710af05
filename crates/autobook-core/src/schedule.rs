//! Target date and deadline computation.

use chrono::{DateTime, Datelike, Days, FixedOffset, NaiveDate, NaiveTime, TimeZone, Utc};

use crate::model::BookingTarget;

/// Inputs from the `[booking]` config section that drive scheduling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduleSpec {
    pub location_id: u64,
    pub advance_days: u32,
    /// Move the target back to the Monday on or before `today + advance_days`.
    pub align_to_monday: bool,
}

/// Target date is the local date of `now` plus `advance_days` (optionally
/// aligned back to Monday). The deadline is one day after the target date at
/// the run's local time of day, so an unaligned run polls for exactly
/// `advance_days + 1` days.
pub fn compute_target(now: DateTime<Utc>, spec: &ScheduleSpec, offset: FixedOffset) -> BookingTarget {
    let local_now = now.with_timezone(&offset).naive_local();
    let mut target_date = local_now
        .date()
        .checked_add_days(Days::new(u64::from(spec.advance_days)))
        .unwrap_or(NaiveDate::MAX);
    if spec.align_to_monday {
        target_date = monday_on_or_before(target_date);
    }
    BookingTarget {
        target_date,
        location_id: spec.location_id,
        deadline: deadline_for(target_date, local_now.time(), offset),
    }
}

fn monday_on_or_before(date: NaiveDate) -> NaiveDate {
    let back = u64::from(date.weekday().num_days_from_monday());
    date.checked_sub_days(Days::new(back)).unwrap_or(date)
}

fn deadline_for(target_date: NaiveDate, time_of_day: NaiveTime, offset: FixedOffset) -> DateTime<Utc> {
    let next_day = target_date.succ_opt().unwrap_or(target_date);
    let local = next_day.and_time(time_of_day);
    offset
        .from_local_datetime(&local)
        .single()
        .map(|t| t.with_timezone(&Utc))
        .unwrap_or_else(|| Utc.from_utc_datetime(&local))
}
