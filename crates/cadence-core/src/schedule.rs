//! Named recurrence rules.
//!
//! A [`Schedule`] is a pure predicate over a local calendar date. Rules are
//! plain enum values with one evaluator ([`Schedule::fires_on`]); there is no
//! state between calls, so evaluating the same rule twice on the same day is
//! always safe.

use crate::calendar;
use crate::error::CadenceError;
use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

const WEEKDAYS: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

fn weekday_name(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "monday",
        Weekday::Tue => "tuesday",
        Weekday::Wed => "wednesday",
        Weekday::Thu => "thursday",
        Weekday::Fri => "friday",
        Weekday::Sat => "saturday",
        Weekday::Sun => "sunday",
    }
}

// ---------------------------------------------------------------------------
// WeekOfMonth
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WeekOfMonth {
    First,
    Second,
    Third,
    Fourth,
    Last,
}

impl WeekOfMonth {
    pub fn all() -> &'static [WeekOfMonth] {
        &[
            WeekOfMonth::First,
            WeekOfMonth::Second,
            WeekOfMonth::Third,
            WeekOfMonth::Fourth,
            WeekOfMonth::Last,
        ]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            WeekOfMonth::First => "first",
            WeekOfMonth::Second => "second",
            WeekOfMonth::Third => "third",
            WeekOfMonth::Fourth => "fourth",
            WeekOfMonth::Last => "last",
        }
    }

    pub fn contains(self, date: NaiveDate) -> bool {
        match self {
            WeekOfMonth::First => calendar::is_first_week_of_month(date),
            WeekOfMonth::Second => calendar::is_second_week_of_month(date),
            WeekOfMonth::Third => calendar::is_third_week_of_month(date),
            WeekOfMonth::Fourth => calendar::is_fourth_week_of_month(date),
            WeekOfMonth::Last => calendar::is_last_week_of_month(date),
        }
    }
}

// ---------------------------------------------------------------------------
// Schedule
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Schedule {
    EveryDay,
    EveryWeekday,
    EveryWeekendDay,
    Every(Weekday),
    /// The given weekday falling inside the given week bucket.
    NthOfMonth { week: WeekOfMonth, weekday: Weekday },
    FirstOfTheMonth,
}

const fn nth(week: WeekOfMonth, weekday: Weekday) -> Schedule {
    Schedule::NthOfMonth { week, weekday }
}

pub const EVERY_DAY: Schedule = Schedule::EveryDay;
pub const EVERY_WEEKDAY: Schedule = Schedule::EveryWeekday;
pub const EVERY_WEEKEND_DAY: Schedule = Schedule::EveryWeekendDay;

pub const EVERY_MONDAY: Schedule = Schedule::Every(Weekday::Mon);
pub const EVERY_TUESDAY: Schedule = Schedule::Every(Weekday::Tue);
pub const EVERY_WEDNESDAY: Schedule = Schedule::Every(Weekday::Wed);
pub const EVERY_THURSDAY: Schedule = Schedule::Every(Weekday::Thu);
pub const EVERY_FRIDAY: Schedule = Schedule::Every(Weekday::Fri);
pub const EVERY_SATURDAY: Schedule = Schedule::Every(Weekday::Sat);
pub const EVERY_SUNDAY: Schedule = Schedule::Every(Weekday::Sun);

pub const FIRST_MONDAY_OF_THE_MONTH: Schedule = nth(WeekOfMonth::First, Weekday::Mon);
pub const FIRST_TUESDAY_OF_THE_MONTH: Schedule = nth(WeekOfMonth::First, Weekday::Tue);
pub const FIRST_WEDNESDAY_OF_THE_MONTH: Schedule = nth(WeekOfMonth::First, Weekday::Wed);
pub const FIRST_THURSDAY_OF_THE_MONTH: Schedule = nth(WeekOfMonth::First, Weekday::Thu);
pub const FIRST_FRIDAY_OF_THE_MONTH: Schedule = nth(WeekOfMonth::First, Weekday::Fri);
pub const FIRST_SATURDAY_OF_THE_MONTH: Schedule = nth(WeekOfMonth::First, Weekday::Sat);
pub const FIRST_SUNDAY_OF_THE_MONTH: Schedule = nth(WeekOfMonth::First, Weekday::Sun);

pub const SECOND_MONDAY_OF_THE_MONTH: Schedule = nth(WeekOfMonth::Second, Weekday::Mon);
pub const SECOND_TUESDAY_OF_THE_MONTH: Schedule = nth(WeekOfMonth::Second, Weekday::Tue);
pub const SECOND_WEDNESDAY_OF_THE_MONTH: Schedule = nth(WeekOfMonth::Second, Weekday::Wed);
pub const SECOND_THURSDAY_OF_THE_MONTH: Schedule = nth(WeekOfMonth::Second, Weekday::Thu);
pub const SECOND_FRIDAY_OF_THE_MONTH: Schedule = nth(WeekOfMonth::Second, Weekday::Fri);
pub const SECOND_SATURDAY_OF_THE_MONTH: Schedule = nth(WeekOfMonth::Second, Weekday::Sat);
pub const SECOND_SUNDAY_OF_THE_MONTH: Schedule = nth(WeekOfMonth::Second, Weekday::Sun);

pub const THIRD_MONDAY_OF_THE_MONTH: Schedule = nth(WeekOfMonth::Third, Weekday::Mon);
pub const THIRD_TUESDAY_OF_THE_MONTH: Schedule = nth(WeekOfMonth::Third, Weekday::Tue);
pub const THIRD_WEDNESDAY_OF_THE_MONTH: Schedule = nth(WeekOfMonth::Third, Weekday::Wed);
pub const THIRD_THURSDAY_OF_THE_MONTH: Schedule = nth(WeekOfMonth::Third, Weekday::Thu);
pub const THIRD_FRIDAY_OF_THE_MONTH: Schedule = nth(WeekOfMonth::Third, Weekday::Fri);
pub const THIRD_SATURDAY_OF_THE_MONTH: Schedule = nth(WeekOfMonth::Third, Weekday::Sat);
pub const THIRD_SUNDAY_OF_THE_MONTH: Schedule = nth(WeekOfMonth::Third, Weekday::Sun);

pub const FOURTH_MONDAY_OF_THE_MONTH: Schedule = nth(WeekOfMonth::Fourth, Weekday::Mon);
pub const FOURTH_TUESDAY_OF_THE_MONTH: Schedule = nth(WeekOfMonth::Fourth, Weekday::Tue);
pub const FOURTH_WEDNESDAY_OF_THE_MONTH: Schedule = nth(WeekOfMonth::Fourth, Weekday::Wed);
pub const FOURTH_THURSDAY_OF_THE_MONTH: Schedule = nth(WeekOfMonth::Fourth, Weekday::Thu);
pub const FOURTH_FRIDAY_OF_THE_MONTH: Schedule = nth(WeekOfMonth::Fourth, Weekday::Fri);
pub const FOURTH_SATURDAY_OF_THE_MONTH: Schedule = nth(WeekOfMonth::Fourth, Weekday::Sat);
pub const FOURTH_SUNDAY_OF_THE_MONTH: Schedule = nth(WeekOfMonth::Fourth, Weekday::Sun);

pub const LAST_MONDAY_OF_THE_MONTH: Schedule = nth(WeekOfMonth::Last, Weekday::Mon);
pub const LAST_TUESDAY_OF_THE_MONTH: Schedule = nth(WeekOfMonth::Last, Weekday::Tue);
pub const LAST_WEDNESDAY_OF_THE_MONTH: Schedule = nth(WeekOfMonth::Last, Weekday::Wed);
pub const LAST_THURSDAY_OF_THE_MONTH: Schedule = nth(WeekOfMonth::Last, Weekday::Thu);
pub const LAST_FRIDAY_OF_THE_MONTH: Schedule = nth(WeekOfMonth::Last, Weekday::Fri);
pub const LAST_SATURDAY_OF_THE_MONTH: Schedule = nth(WeekOfMonth::Last, Weekday::Sat);
pub const LAST_SUNDAY_OF_THE_MONTH: Schedule = nth(WeekOfMonth::Last, Weekday::Sun);

pub const FIRST_OF_THE_MONTH: Schedule = Schedule::FirstOfTheMonth;

impl Schedule {
    pub fn fires_on(self, date: NaiveDate) -> bool {
        match self {
            Schedule::EveryDay => true,
            Schedule::EveryWeekday => calendar::is_weekday(date),
            Schedule::EveryWeekendDay => calendar::is_weekend(date),
            Schedule::Every(weekday) => calendar::is_day(date, weekday),
            Schedule::NthOfMonth { week, weekday } => {
                calendar::is_day(date, weekday) && week.contains(date)
            }
            Schedule::FirstOfTheMonth => date.day() == 1,
        }
    }

    /// Every named schedule, in a stable order.
    pub fn all_named() -> Vec<Schedule> {
        let mut all = vec![EVERY_DAY, EVERY_WEEKDAY, EVERY_WEEKEND_DAY];
        all.extend(WEEKDAYS.iter().map(|w| Schedule::Every(*w)));
        for week in WeekOfMonth::all() {
            all.extend(WEEKDAYS.iter().map(|w| nth(*week, *w)));
        }
        all.push(FIRST_OF_THE_MONTH);
        all
    }

    pub fn name(self) -> String {
        match self {
            Schedule::EveryDay => "every_day".to_string(),
            Schedule::EveryWeekday => "every_weekday".to_string(),
            Schedule::EveryWeekendDay => "every_weekend_day".to_string(),
            Schedule::Every(weekday) => format!("every_{}", weekday_name(weekday)),
            Schedule::NthOfMonth { week, weekday } => {
                format!("{}_{}_of_the_month", week.as_str(), weekday_name(weekday))
            }
            Schedule::FirstOfTheMonth => "first_of_the_month".to_string(),
        }
    }
}

impl fmt::Display for Schedule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

impl FromStr for Schedule {
    type Err = CadenceError;

    /// Accepts the snake_case name in any case, with `-` or spaces as separators.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace(['-', ' '], "_");
        Schedule::all_named()
            .into_iter()
            .find(|schedule| schedule.name() == normalized)
            .ok_or_else(|| CadenceError::InvalidSchedule(s.to_string()))
    }
}

impl TryFrom<String> for Schedule {
    type Error = CadenceError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Schedule> for String {
    fn from(schedule: Schedule) -> Self {
        schedule.name()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn first_monday_of_the_month() {
        assert!(FIRST_MONDAY_OF_THE_MONTH.fires_on(d(2024, 1, 1)));
        assert!(!FIRST_MONDAY_OF_THE_MONTH.fires_on(d(2024, 1, 8)));
        assert!(!FIRST_MONDAY_OF_THE_MONTH.fires_on(d(2024, 1, 2)));
    }

    #[test]
    fn every_day_fires_on_leap_day() {
        assert!(EVERY_DAY.fires_on(d(2024, 2, 29)));
        let mut date = d(2023, 12, 25);
        for _ in 0..400 {
            assert!(EVERY_DAY.fires_on(date));
            date = date.succ_opt().unwrap();
        }
    }

    #[test]
    fn weekday_and_weekend_schedules() {
        assert!(EVERY_WEEKDAY.fires_on(d(2024, 1, 3)));
        assert!(!EVERY_WEEKDAY.fires_on(d(2024, 1, 6)));
        assert!(EVERY_WEEKEND_DAY.fires_on(d(2024, 1, 7)));
        assert!(EVERY_FRIDAY.fires_on(d(2024, 1, 5)));
        assert!(!EVERY_FRIDAY.fires_on(d(2024, 1, 4)));
    }

    #[test]
    fn nth_weekday_buckets() {
        // January 2024: Wednesdays fall on 3, 10, 17, 24, 31.
        assert!(FIRST_WEDNESDAY_OF_THE_MONTH.fires_on(d(2024, 1, 3)));
        assert!(SECOND_WEDNESDAY_OF_THE_MONTH.fires_on(d(2024, 1, 10)));
        assert!(THIRD_WEDNESDAY_OF_THE_MONTH.fires_on(d(2024, 1, 17)));
        assert!(FOURTH_WEDNESDAY_OF_THE_MONTH.fires_on(d(2024, 1, 24)));
        assert!(!FOURTH_WEDNESDAY_OF_THE_MONTH.fires_on(d(2024, 1, 31)));
        assert!(LAST_WEDNESDAY_OF_THE_MONTH.fires_on(d(2024, 1, 31)));
    }

    #[test]
    fn last_and_fourth_friday_can_coincide() {
        // February 2023 has four Fridays: 3, 10, 17, 24.
        let date = d(2023, 2, 24);
        assert!(FOURTH_FRIDAY_OF_THE_MONTH.fires_on(date));
        assert!(LAST_FRIDAY_OF_THE_MONTH.fires_on(date));
    }

    #[test]
    fn last_week_can_fire_twice_in_a_month() {
        // January 2024: last week spans the 24th through the 31st, so both
        // Wednesdays 24 and 31 qualify.
        assert!(LAST_WEDNESDAY_OF_THE_MONTH.fires_on(d(2024, 1, 24)));
        assert!(LAST_WEDNESDAY_OF_THE_MONTH.fires_on(d(2024, 1, 31)));
    }

    #[test]
    fn first_of_the_month() {
        assert!(FIRST_OF_THE_MONTH.fires_on(d(2024, 3, 1)));
        assert!(!FIRST_OF_THE_MONTH.fires_on(d(2024, 3, 2)));
    }

    #[test]
    fn evaluation_is_repeatable() {
        let date = d(2024, 1, 1);
        let first = FIRST_MONDAY_OF_THE_MONTH.fires_on(date);
        for _ in 0..5 {
            assert_eq!(FIRST_MONDAY_OF_THE_MONTH.fires_on(date), first);
        }
    }

    #[test]
    fn all_named_is_complete_and_unique() {
        let all = Schedule::all_named();
        assert_eq!(all.len(), 3 + 7 + 35 + 1);
        let names: std::collections::HashSet<String> = all.iter().map(|s| s.name()).collect();
        assert_eq!(names.len(), all.len());
    }

    #[test]
    fn names_roundtrip() {
        for schedule in Schedule::all_named() {
            assert_eq!(schedule.name().parse::<Schedule>().unwrap(), schedule);
        }
    }

    #[test]
    fn parse_is_lenient_about_case_and_separators() {
        assert_eq!(
            "Last-Friday of the month".parse::<Schedule>().unwrap(),
            LAST_FRIDAY_OF_THE_MONTH
        );
        assert_eq!("EVERY_DAY".parse::<Schedule>().unwrap(), EVERY_DAY);
        assert!("every_blue_moon".parse::<Schedule>().is_err());
    }

    #[test]
    fn yaml_uses_names() {
        let schedule: Schedule = serde_yaml::from_str("second_tuesday_of_the_month").unwrap();
        assert_eq!(schedule, SECOND_TUESDAY_OF_THE_MONTH);
        let yaml = serde_yaml::to_string(&EVERY_SUNDAY).unwrap();
        assert_eq!(yaml.trim(), "every_sunday");
    }
}
