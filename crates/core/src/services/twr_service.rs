use chrono::NaiveDate;
use std::collections::BTreeMap;

use crate::models::twr::{MonthlyTwr, TwrPeriod, TwrResult, TwrRow};

/// Explanation attached to a result with no usable periods.
pub const INSUFFICIENT_DATA: &str = "insufficient data";

/// Chain-linked time-weighted return engine.
///
/// Each row's `start_value` already includes that period's own cash flow,
/// so the period return is simply `(end - start) / start` and flows never
/// leak into the measured return. No rounding happens here.
pub struct TwrService;

impl TwrService {
    pub fn new() -> Self {
        Self
    }

    /// TWR over every usable row. Rows without both values, or with a
    /// non-positive start, are skipped.
    pub fn calculate(&self, rows: &[TwrRow]) -> TwrResult {
        let periods: Vec<TwrPeriod> = rows.iter().filter_map(Self::period).collect();

        if periods.is_empty() {
            return TwrResult {
                twr: 0.0,
                periods,
                explanation: INSUFFICIENT_DATA.to_string(),
            };
        }

        let factor: f64 = periods.iter().map(|p| 1.0 + p.period_return).product();
        let skipped = rows.len() - periods.len();

        TwrResult {
            twr: factor - 1.0,
            explanation: format!(
                "chain-linked {} period(s) from {} to {}, {} skipped without a valid start or end",
                periods.len(),
                periods[0].iso,
                periods[periods.len() - 1].iso,
                skipped
            ),
            periods,
        }
    }

    /// TWR per calendar month, each month linked on its own (not a running
    /// total across months). Sorted by month.
    pub fn calculate_monthly(&self, rows: &[TwrRow]) -> Vec<MonthlyTwr> {
        let mut by_month: BTreeMap<String, Vec<TwrRow>> = BTreeMap::new();
        for row in rows {
            by_month
                .entry(row.iso.format("%Y-%m").to_string())
                .or_default()
                .push(row.clone());
        }

        by_month
            .into_iter()
            .map(|(month, month_rows)| {
                let result = self.calculate(&month_rows);
                MonthlyTwr {
                    month,
                    twr: result.twr,
                    periods: result.periods,
                }
            })
            .collect()
    }

    /// Rows whose date falls within `from..=to`.
    pub fn in_range(rows: &[TwrRow], from: NaiveDate, to: NaiveDate) -> Vec<TwrRow> {
        rows.iter()
            .filter(|r| r.iso >= from && r.iso <= to)
            .cloned()
            .collect()
    }

    fn period(row: &TwrRow) -> Option<TwrPeriod> {
        let start = row.start_value.filter(|v| v.is_finite() && *v > 0.0)?;
        let end = row.end_value.filter(|v| v.is_finite())?;
        Some(TwrPeriod {
            iso: row.iso,
            label: row.label.clone(),
            start_value: start,
            end_value: end,
            flow: row.flow,
            period_return: (end - start) / start,
        })
    }
}

impl Default for TwrService {
    fn default() -> Self {
        Self::new()
    }
}
