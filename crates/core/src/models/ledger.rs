use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::movement::Movement;

/// Per-client movements keyed by date.
pub type ClientMovements = BTreeMap<NaiveDate, Movement>;

/// The raw, manually entered data. This is the only state that gets
/// persisted; every derived figure is recomputed from it.
///
/// Ordered maps keep serialization deterministic, so two saves of the same
/// ledger produce identical bytes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawLedgerState {
    /// Recorded portfolio closing balance per day. A missing key means the
    /// day has not been closed yet, which is distinct from a close of zero.
    #[serde(default)]
    pub final_by_day: BTreeMap<NaiveDate, f64>,

    /// Client id → date → movement
    #[serde(default)]
    pub movements_by_client: BTreeMap<String, ClientMovements>,
}

impl RawLedgerState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Recorded close for `date`, ignoring non-finite values.
    pub fn recorded_final(&self, date: NaiveDate) -> Option<f64> {
        self.final_by_day
            .get(&date)
            .copied()
            .filter(|v| v.is_finite())
    }

    /// The last day with a usable recorded close.
    pub fn last_recorded_final_day(&self) -> Option<NaiveDate> {
        self.final_by_day
            .iter()
            .rev()
            .find(|(_, v)| v.is_finite())
            .map(|(d, _)| *d)
    }

    pub fn movement(&self, client_id: &str, date: NaiveDate) -> Option<&Movement> {
        self.movements_by_client.get(client_id)?.get(&date)
    }

    /// Ids of every client with at least one stored movement, sorted.
    pub fn client_ids(&self) -> impl Iterator<Item = &str> {
        self.movements_by_client.keys().map(String::as_str)
    }

    /// Total number of stored movement records across all clients.
    pub fn movement_count(&self) -> usize {
        self.movements_by_client.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.final_by_day.is_empty() && self.movements_by_client.is_empty()
    }
}
