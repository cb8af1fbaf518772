use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Portfolio-level derived figures for one calendar day.
///
/// Every `Option` is `None` when the figure cannot be computed, never a
/// stand-in zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyRow {
    pub iso: NaiveDate,
    pub label: String,
    pub weekday: String,
    pub is_weekend: bool,

    /// Sum of client increments; `None` if no client entered one
    pub increment: Option<f64>,

    /// Sum of client decrements; `None` if no client entered one
    pub decrement: Option<f64>,

    /// Previous close plus the day's net movements
    pub initial: Option<f64>,

    /// Recorded close only (carried-forward values are not shown here)
    pub final_balance: Option<f64>,

    pub profit: Option<f64>,

    /// `profit / initial` as a plain decimal
    pub profit_pct: Option<f64>,

    /// Running sum of `profit` up to and including this day
    pub cumulative_profit: Option<f64>,
}

impl DailyRow {
    /// Net cash flow of the day (missing sides count as zero).
    pub fn net_flow(&self) -> f64 {
        self.increment.unwrap_or(0.0) - self.decrement.unwrap_or(0.0)
    }
}

/// One client's derived figures for one calendar day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientDayRow {
    pub iso: NaiveDate,
    pub label: String,
    pub weekday: String,
    pub is_weekend: bool,

    pub increment: Option<f64>,
    pub decrement: Option<f64>,

    /// Running balance after this day's own flow, before allocation
    pub base_balance: Option<f64>,

    /// Allocated share of the portfolio close (or the base balance when
    /// nothing could be allocated)
    pub final_balance: Option<f64>,

    pub profit: Option<f64>,
    pub profit_pct: Option<f64>,
    pub cumulative_profit: Option<f64>,

    /// Allocation weight, as a plain decimal
    pub share_pct: Option<f64>,

    /// Amount of the portfolio close allocated to this client
    pub share_amount: Option<f64>,
}

impl ClientDayRow {
    pub fn net_flow(&self) -> f64 {
        self.increment.unwrap_or(0.0) - self.decrement.unwrap_or(0.0)
    }
}

/// Year-level totals derived from the full walk.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Totals {
    /// Last known portfolio close
    pub assets: Option<f64>,

    pub ytd_profit: f64,

    /// `ytd_profit` over the first non-zero initial balance
    pub ytd_return_pct: Option<f64>,
}

/// The fully derived, denormalized view of a ledger. Always rebuilt whole.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub daily_rows: Vec<DailyRow>,

    /// Date → index into `daily_rows`
    pub day_index: HashMap<NaiveDate, usize>,

    /// Client id → one row per calendar day
    pub client_rows_by_id: BTreeMap<String, Vec<ClientDayRow>>,

    pub totals: Totals,

    /// Days after this one are beyond the recorded horizon
    pub last_recorded_final_day: Option<NaiveDate>,
}

impl Snapshot {
    pub fn day(&self, date: NaiveDate) -> Option<&DailyRow> {
        self.day_index.get(&date).map(|&i| &self.daily_rows[i])
    }

    pub fn client_rows(&self, client_id: &str) -> Option<&[ClientDayRow]> {
        self.client_rows_by_id.get(client_id).map(Vec::as_slice)
    }

    pub fn client_day(&self, client_id: &str, date: NaiveDate) -> Option<&ClientDayRow> {
        let idx = *self.day_index.get(&date)?;
        self.client_rows_by_id.get(client_id)?.get(idx)
    }

    /// `true` when `date` lies strictly after the last recorded close.
    pub fn is_beyond_horizon(&self, date: NaiveDate) -> bool {
        self.last_recorded_final_day.is_some_and(|last| date > last)
    }
}
