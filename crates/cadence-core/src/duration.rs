//! Exact, millisecond-denominated time spans.
//!
//! A [`Duration`] stores a single signed millisecond count. Every other unit is
//! a floor-divided projection of that count, so two durations built from
//! different units compare equal exactly when their millisecond values match.

use crate::error::{CadenceError, Result};
use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const MS_PER_SECOND: i64 = 1_000;
pub const MS_PER_MINUTE: i64 = 60 * MS_PER_SECOND;
pub const MS_PER_HOUR: i64 = 60 * MS_PER_MINUTE;
pub const MS_PER_DAY: i64 = 24 * MS_PER_HOUR;
pub const MS_PER_WEEK: i64 = 7 * MS_PER_DAY;
/// Calendar-agnostic year: always 365 days.
pub const MS_PER_YEAR: i64 = 365 * MS_PER_DAY;

// ---------------------------------------------------------------------------
// Duration
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[derive(Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Duration {
    milliseconds: i64,
}

impl Duration {
    pub const ZERO: Duration = Duration { milliseconds: 0 };

    pub const fn of_milliseconds(ms: i64) -> Self {
        Self { milliseconds: ms }
    }

    pub const fn of_seconds(s: i64) -> Self {
        Self::of_milliseconds(s * MS_PER_SECOND)
    }

    pub const fn of_minutes(m: i64) -> Self {
        Self::of_milliseconds(m * MS_PER_MINUTE)
    }

    pub const fn of_hours(h: i64) -> Self {
        Self::of_milliseconds(h * MS_PER_HOUR)
    }

    pub const fn of_days(d: i64) -> Self {
        Self::of_milliseconds(d * MS_PER_DAY)
    }

    pub const fn of_weeks(w: i64) -> Self {
        Self::of_milliseconds(w * MS_PER_WEEK)
    }

    pub const fn of_years(y: i64) -> Self {
        Self::of_milliseconds(y * MS_PER_YEAR)
    }

    /// `end - start`; negative when `end` precedes `start`.
    pub fn between(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self::of_milliseconds(end.timestamp_millis() - start.timestamp_millis())
    }

    /// Like [`Duration::between`] for RFC 3339 timestamps.
    pub fn between_rfc3339(start: &str, end: &str) -> Result<Self> {
        Ok(Self::between(parse_instant(start)?, parse_instant(end)?))
    }

    pub const fn milliseconds(self) -> i64 {
        self.milliseconds
    }

    pub const fn seconds(self) -> i64 {
        self.milliseconds.div_euclid(MS_PER_SECOND)
    }

    pub const fn minutes(self) -> i64 {
        self.milliseconds.div_euclid(MS_PER_MINUTE)
    }

    pub const fn hours(self) -> i64 {
        self.milliseconds.div_euclid(MS_PER_HOUR)
    }

    pub const fn days(self) -> i64 {
        self.milliseconds.div_euclid(MS_PER_DAY)
    }

    pub const fn weeks(self) -> i64 {
        self.milliseconds.div_euclid(MS_PER_WEEK)
    }

    pub const fn years(self) -> i64 {
        self.milliseconds.div_euclid(MS_PER_YEAR)
    }

    pub const fn less_than(self, other: Duration) -> bool {
        self.milliseconds < other.milliseconds
    }

    pub const fn greater_than(self, other: Duration) -> bool {
        self.milliseconds > other.milliseconds
    }

    pub const fn equals(self, other: Duration) -> bool {
        self.milliseconds == other.milliseconds
    }

    pub const fn is_negative(self) -> bool {
        self.milliseconds < 0
    }

    pub fn to_time_delta(self) -> TimeDelta {
        TimeDelta::milliseconds(self.milliseconds)
    }
}

fn parse_instant(value: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| CadenceError::InvalidTimestamp {
            value: value.to_string(),
            reason: e.to_string(),
        })
}

impl From<Duration> for TimeDelta {
    fn from(d: Duration) -> Self {
        d.to_time_delta()
    }
}

// ---------------------------------------------------------------------------
// Text form: "2d", "36h", "1d12h", "-90m"
// ---------------------------------------------------------------------------

const UNITS: &[(&str, i64)] = &[
    ("y", MS_PER_YEAR),
    ("w", MS_PER_WEEK),
    ("d", MS_PER_DAY),
    ("h", MS_PER_HOUR),
    ("m", MS_PER_MINUTE),
    ("s", MS_PER_SECOND),
    ("ms", 1),
];

fn unit_scale(suffix: &str) -> Option<i64> {
    UNITS.iter().find(|(u, _)| *u == suffix).map(|(_, ms)| *ms)
}

impl FromStr for Duration {
    type Err = CadenceError;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || CadenceError::InvalidDuration(s.to_string());
        let trimmed = s.trim();
        let (negative, body) = match trimmed.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, trimmed),
        };
        if body.is_empty() {
            return Err(invalid());
        }

        let mut total: i64 = 0;
        let mut rest = body;
        while !rest.is_empty() {
            let digits = rest.find(|c: char| !c.is_ascii_digit()).unwrap_or(rest.len());
            if digits == 0 {
                return Err(invalid());
            }
            let count: i64 = rest[..digits].parse().map_err(|_| invalid())?;
            rest = &rest[digits..];

            let unit_len = rest.find(|c: char| c.is_ascii_digit()).unwrap_or(rest.len());
            let scale = unit_scale(rest[..unit_len].trim()).ok_or_else(invalid)?;
            rest = &rest[unit_len..];

            let part = count.checked_mul(scale).ok_or_else(invalid)?;
            total = total.checked_add(part).ok_or_else(invalid)?;
        }

        Ok(Self::of_milliseconds(if negative { -total } else { total }))
    }
}

impl TryFrom<String> for Duration {
    type Error = CadenceError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<Duration> for String {
    fn from(d: Duration) -> Self {
        d.to_string()
    }
}

impl fmt::Display for Duration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.milliseconds == 0 {
            return f.write_str("0ms");
        }
        if self.milliseconds < 0 {
            f.write_str("-")?;
        }
        let mut remaining = self.milliseconds.unsigned_abs();
        let mut first = true;
        for (suffix, scale) in UNITS {
            let scale = *scale as u64;
            let count = remaining / scale;
            if count == 0 {
                continue;
            }
            remaining %= scale;
            if !first {
                f.write_str(" ")?;
            }
            write!(f, "{count}{suffix}")?;
            first = false;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use proptest::prelude::*;

    #[test]
    fn factories_are_exact() {
        assert_eq!(Duration::of_milliseconds(1).milliseconds(), 1);
        assert_eq!(Duration::of_seconds(3).milliseconds(), 3_000);
        assert_eq!(Duration::of_minutes(2).milliseconds(), 120_000);
        assert_eq!(Duration::of_hours(1).milliseconds(), 3_600_000);
        assert_eq!(Duration::of_days(2).milliseconds(), 172_800_000);
        assert_eq!(Duration::of_weeks(1).milliseconds(), 604_800_000);
        assert_eq!(Duration::of_years(1).milliseconds(), 31_536_000_000);
    }

    #[test]
    fn projections_floor() {
        let d = Duration::of_hours(47);
        assert_eq!(d.days(), 1);
        assert_eq!(d.hours(), 47);
        assert_eq!(d.minutes(), 47 * 60);
        assert_eq!(Duration::of_days(13).weeks(), 1);
        assert_eq!(Duration::of_days(364).years(), 0);
        assert_eq!(Duration::of_years(1).weeks(), 52);
        assert_eq!(Duration::of_milliseconds(-1).seconds(), -1);
    }

    #[test]
    fn units_compare_by_milliseconds() {
        assert!(Duration::of_days(7).equals(Duration::of_weeks(1)));
        assert!(Duration::of_hours(49).greater_than(Duration::of_days(2)));
        assert!(Duration::of_minutes(59).less_than(Duration::of_hours(1)));
    }

    #[test]
    fn between_same_instant_is_zero() {
        let t = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        assert!(Duration::between(t, t).equals(Duration::of_milliseconds(0)));
    }

    #[test]
    fn between_reversed_is_negative() {
        let a = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
        let b = Utc.with_ymd_and_hms(2024, 3, 3, 0, 0, 0).unwrap();
        assert_eq!(Duration::between(a, b), Duration::of_days(2));
        assert_eq!(Duration::between(b, a), Duration::of_days(-2));
        assert!(Duration::between(b, a).is_negative());
    }

    #[test]
    fn between_rfc3339_uses_end() {
        let d = Duration::between_rfc3339("2024-01-01T00:00:00Z", "2024-01-01T06:00:00Z").unwrap();
        assert_eq!(d, Duration::of_hours(6));
    }

    #[test]
    fn between_rfc3339_rejects_garbage() {
        let err = Duration::between_rfc3339("yesterday", "2024-01-01T00:00:00Z").unwrap_err();
        assert!(matches!(err, CadenceError::InvalidTimestamp { .. }));
    }

    #[test]
    fn parse_text_form() {
        assert_eq!("2d".parse::<Duration>().unwrap(), Duration::of_days(2));
        assert_eq!("36h".parse::<Duration>().unwrap(), Duration::of_hours(36));
        assert_eq!("250ms".parse::<Duration>().unwrap(), Duration::of_milliseconds(250));
        assert_eq!(
            "1d12h".parse::<Duration>().unwrap(),
            Duration::of_hours(36)
        );
        assert_eq!("-90m".parse::<Duration>().unwrap(), Duration::of_minutes(-90));
        assert!("".parse::<Duration>().is_err());
        assert!("2".parse::<Duration>().is_err());
        assert!("d2".parse::<Duration>().is_err());
        assert!("2 fortnights".parse::<Duration>().is_err());
    }

    #[test]
    fn display_largest_units_first() {
        assert_eq!(Duration::of_hours(36).to_string(), "1d 12h");
        assert_eq!(Duration::ZERO.to_string(), "0ms");
        assert_eq!(Duration::of_minutes(-90).to_string(), "-1h 30m");
        assert_eq!(Duration::of_weeks(1).to_string(), "1w");
    }

    #[test]
    fn yaml_uses_text_form() {
        let d: Duration = serde_yaml::from_str("7d").unwrap();
        assert_eq!(d, Duration::of_days(7));
        assert!(serde_yaml::from_str::<Duration>("soon").is_err());
    }

    #[test]
    fn converts_to_time_delta() {
        assert_eq!(Duration::of_days(3).to_time_delta(), TimeDelta::days(3));
    }

    proptest! {
        #[test]
        fn construction_is_exact(n in 0i64..10_000) {
            prop_assert_eq!(Duration::of_seconds(n).milliseconds(), n * MS_PER_SECOND);
            prop_assert_eq!(Duration::of_minutes(n).milliseconds(), n * MS_PER_MINUTE);
            prop_assert_eq!(Duration::of_hours(n).milliseconds(), n * MS_PER_HOUR);
            prop_assert_eq!(Duration::of_days(n).milliseconds(), n * MS_PER_DAY);
            prop_assert_eq!(Duration::of_weeks(n).milliseconds(), n * MS_PER_WEEK);
            prop_assert_eq!(Duration::of_years(n).milliseconds(), n * MS_PER_YEAR);
        }

        #[test]
        fn comparison_is_total(a in any::<i64>(), b in any::<i64>()) {
            let (a, b) = (Duration::of_milliseconds(a), Duration::of_milliseconds(b));
            let holds = [a.less_than(b), a.equals(b), a.greater_than(b)];
            prop_assert_eq!(holds.iter().filter(|h| **h).count(), 1);
            prop_assert_eq!(a.equals(b), a.milliseconds() == b.milliseconds());
        }

        #[test]
        fn text_form_roundtrips(ms in -1_000_000_000_000i64..1_000_000_000_000) {
            let d = Duration::of_milliseconds(ms);
            let text = d.to_string().replace(' ', "");
            prop_assert_eq!(text.parse::<Duration>().unwrap(), d);
        }
    }
}
