//! ISO week bucketing

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::fmt;

/// ISO-8601 week, Monday through Sunday
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Week {
    /// ISO week number (1-53)
    pub number: u32,
    /// ISO week-numbering year, which can differ from the calendar year
    pub year: i32,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl Week {
    /// The week a date falls in
    pub fn containing(date: NaiveDate) -> Self {
        let iso = date.iso_week();
        let start_date = date - Duration::days(i64::from(date.weekday().num_days_from_monday()));

        Self {
            number: iso.week(),
            year: iso.year(),
            start_date,
            end_date: start_date + Duration::days(6),
        }
    }

    /// Week `number` of ISO year `year`, if it exists
    pub fn from_iso(year: i32, number: u32) -> Option<Self> {
        NaiveDate::from_isoywd_opt(year, number, Weekday::Mon).map(Self::containing)
    }

    /// Whether a date falls inside the week
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start_date <= date && date <= self.end_date
    }

    /// The following week
    pub fn next(&self) -> Self {
        Self::containing(self.end_date + Duration::days(1))
    }
}

impl fmt::Display for Week {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-W{:02}", self.year, self.number)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_week_containing_midweek_date() {
        let week = Week::containing(date(2024, 3, 14));

        assert_eq!(week.number, 11);
        assert_eq!(week.year, 2024);
        assert_eq!(week.start_date, date(2024, 3, 11));
        assert_eq!(week.end_date, date(2024, 3, 17));
        assert_eq!(week.to_string(), "2024-W11");
    }

    #[test]
    fn test_week_year_boundary_uses_iso_year() {
        // 2024-12-30 is a Monday belonging to ISO week 1 of 2025
        let week = Week::containing(date(2024, 12, 30));

        assert_eq!(week.number, 1);
        assert_eq!(week.year, 2025);
        assert!(week.contains(date(2025, 1, 5)));
        assert!(!week.contains(date(2025, 1, 6)));
    }

    #[test]
    fn test_from_iso_and_next() {
        let week = Week::from_iso(2024, 52).unwrap();
        assert_eq!(week.start_date, date(2024, 12, 23));
        assert_eq!(week.next(), Week::from_iso(2025, 1).unwrap());
        assert!(Week::from_iso(2024, 60).is_none());
    }
}
