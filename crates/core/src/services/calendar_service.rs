use chrono::{Datelike, NaiveDate, Weekday};

use crate::models::calendar::CalendarDay;

/// Produces the fixed, ordered list of days for a tracked year.
///
/// Pure and deterministic: no I/O and no clock.
pub struct CalendarService;

impl CalendarService {
    pub fn new() -> Self {
        Self
    }

    /// Every day from Jan 1 to Dec 31 of `year`, ascending.
    /// Returns an empty list if the year is not representable.
    pub fn generate(&self, year: i32) -> Vec<CalendarDay> {
        let Some(mut current) = NaiveDate::from_ymd_opt(year, 1, 1) else {
            return Vec::new();
        };

        let mut days = Vec::with_capacity(366);
        while current.year() == year {
            days.push(Self::describe(current));
            match current.succ_opt() {
                Some(next) => current = next,
                None => break,
            }
        }
        days
    }

    fn describe(date: NaiveDate) -> CalendarDay {
        let weekday = date.weekday();
        CalendarDay {
            iso: date,
            label: date.format("%d %b").to_string(),
            weekday: date.format("%A").to_string(),
            is_weekend: matches!(weekday, Weekday::Sat | Weekday::Sun),
        }
    }
}

impl Default for CalendarService {
    fn default() -> Self {
        Self::new()
    }
}
