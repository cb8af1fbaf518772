use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::snapshot::{ClientDayRow, DailyRow};

/// Normalized input row for the TWR engine: one sub-period (day).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TwrRow {
    pub iso: NaiveDate,
    pub label: String,
    /// Balance at the start of the period, already including its own flow
    pub start_value: Option<f64>,
    pub end_value: Option<f64>,
    pub flow: f64,
}

impl From<&DailyRow> for TwrRow {
    fn from(row: &DailyRow) -> Self {
        Self {
            iso: row.iso,
            label: row.label.clone(),
            start_value: row.initial,
            end_value: row.final_balance,
            flow: row.net_flow(),
        }
    }
}

impl From<&ClientDayRow> for TwrRow {
    fn from(row: &ClientDayRow) -> Self {
        Self {
            iso: row.iso,
            label: row.label.clone(),
            start_value: row.base_balance,
            end_value: row.final_balance,
            flow: row.net_flow(),
        }
    }
}

/// Return of a single valid sub-period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TwrPeriod {
    pub iso: NaiveDate,
    pub label: String,
    pub start_value: f64,
    pub end_value: f64,
    pub flow: f64,
    /// `(end - start) / start`
    pub period_return: f64,
}

/// Chain-linked time-weighted return over a set of periods.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TwrResult {
    /// Plain decimal, 0.05 = 5%
    pub twr: f64,
    pub periods: Vec<TwrPeriod>,
    pub explanation: String,
}

/// TWR of one calendar month, computed independently of other months.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyTwr {
    /// "YYYY-MM"
    pub month: String,
    pub twr: f64,
    pub periods: Vec<TwrPeriod>,
}
