use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One day of the tracked year. Weekends are flagged but still take part
/// in every calculation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarDay {
    /// The calendar date
    pub iso: NaiveDate,

    /// Short human label, e.g. "05 Mar"
    pub label: String,

    /// Full English weekday name, e.g. "Monday"
    pub weekday: String,

    /// Saturday or Sunday
    pub is_weekend: bool,
}

impl CalendarDay {
    /// Year-month key used to group days, e.g. "2025-03".
    pub fn month_key(&self) -> String {
        self.iso.format("%Y-%m").to_string()
    }
}
