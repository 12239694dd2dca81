//! Calendar primitives over local dates.
//!
//! Weeks of the month are fixed day buckets, not ISO weeks: days 1-7 are the
//! first week, 8-14 the second, 15-21 the third and 22-28 the fourth. The last
//! week is every day on or after `days_in_month - 7`, which always overlaps the
//! fourth bucket.

use chrono::{Datelike, NaiveDate, Weekday};

pub fn is_weekday(date: NaiveDate) -> bool {
    !is_weekend(date)
}

pub fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

pub fn is_day(date: NaiveDate, weekday: Weekday) -> bool {
    date.weekday() == weekday
}

pub fn is_monday(date: NaiveDate) -> bool {
    is_day(date, Weekday::Mon)
}

pub fn is_tuesday(date: NaiveDate) -> bool {
    is_day(date, Weekday::Tue)
}

pub fn is_wednesday(date: NaiveDate) -> bool {
    is_day(date, Weekday::Wed)
}

pub fn is_thursday(date: NaiveDate) -> bool {
    is_day(date, Weekday::Thu)
}

pub fn is_friday(date: NaiveDate) -> bool {
    is_day(date, Weekday::Fri)
}

pub fn is_saturday(date: NaiveDate) -> bool {
    is_day(date, Weekday::Sat)
}

pub fn is_sunday(date: NaiveDate) -> bool {
    is_day(date, Weekday::Sun)
}

pub fn is_first_week_of_month(date: NaiveDate) -> bool {
    (1..=7).contains(&date.day())
}

pub fn is_second_week_of_month(date: NaiveDate) -> bool {
    (8..=14).contains(&date.day())
}

pub fn is_third_week_of_month(date: NaiveDate) -> bool {
    (15..=21).contains(&date.day())
}

pub fn is_fourth_week_of_month(date: NaiveDate) -> bool {
    (22..=28).contains(&date.day())
}

pub fn is_last_week_of_month(date: NaiveDate) -> bool {
    date.day() >= days_in_month(date) - 7
}

/// Number of days in `date`'s month: the day before the 1st of the next month.
pub fn days_in_month(date: NaiveDate) -> u32 {
    let (year, month) = if date.month() == 12 {
        (date.year() + 1, 1)
    } else {
        (date.year(), date.month() + 1)
    };
    NaiveDate::from_ymd_opt(year, month, 1)
        .and_then(|first| first.pred_opt())
        .map(|last| last.day())
        // Only reachable at the edge of chrono's representable range.
        .unwrap_or(31)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
