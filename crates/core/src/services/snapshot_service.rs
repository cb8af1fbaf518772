use std::collections::{BTreeMap, HashMap};

use crate::models::calendar::CalendarDay;
use crate::models::client::Client;
use crate::models::ledger::RawLedgerState;
use crate::models::movement::Movement;
use crate::models::snapshot::{ClientDayRow, DailyRow, Snapshot, Totals};

/// Aggregate client flows for one day.
#[derive(Debug, Default, Clone, Copy)]
struct DayFlows {
    increment: Option<f64>,
    decrement: Option<f64>,
}

impl DayFlows {
    fn sum(movements: &[Option<&Movement>]) -> Self {
        let mut flows = Self::default();
        for movement in movements.iter().flatten() {
            if let Some(inc) = movement.increment {
                *flows.increment.get_or_insert(0.0) += inc;
            }
            if let Some(dec) = movement.decrement {
                *flows.decrement.get_or_insert(0.0) += dec;
            }
        }
        flows
    }

    fn any(&self) -> bool {
        self.increment.is_some() || self.decrement.is_some()
    }

    fn net(&self) -> f64 {
        self.increment.unwrap_or(0.0) - self.decrement.unwrap_or(0.0)
    }
}

/// Running state carried from one day to the next for a single client.
#[derive(Debug, Default, Clone, Copy)]
struct ClientRunning {
    /// `None` until the client's first movement
    balance: Option<f64>,
    cumulative_profit: f64,
}

/// `numerator / denominator`, or `None` when the denominator is zero.
fn ratio(numerator: f64, denominator: f64) -> Option<f64> {
    (denominator != 0.0).then(|| numerator / denominator)
}

fn blank_daily_row(day: &CalendarDay) -> DailyRow {
    DailyRow {
        iso: day.iso,
        label: day.label.clone(),
        weekday: day.weekday.clone(),
        is_weekend: day.is_weekend,
        increment: None,
        decrement: None,
        initial: None,
        final_balance: None,
        profit: None,
        profit_pct: None,
        cumulative_profit: None,
    }
}

fn blank_client_row(day: &CalendarDay) -> ClientDayRow {
    ClientDayRow {
        iso: day.iso,
        label: day.label.clone(),
        weekday: day.weekday.clone(),
        is_weekend: day.is_weekend,
        increment: None,
        decrement: None,
        base_balance: None,
        final_balance: None,
        profit: None,
        profit_pct: None,
        cumulative_profit: None,
        share_pct: None,
        share_amount: None,
    }
}

/// Builds the derived `Snapshot` from the raw ledger.
///
/// A single forward walk over the calendar keeps the portfolio's running
/// close and every client's running balance. Each day's recorded close is
/// split across clients in proportion to their positive base balances.
///
/// Pure: the same inputs always give the same snapshot. Cost is
/// O(days × clients), which is fine for one year and a fixed roster.
pub struct SnapshotService;

impl SnapshotService {
    pub fn new() -> Self {
        Self
    }

    pub fn build(
        &self,
        calendar: &[CalendarDay],
        roster: &[Client],
        state: &RawLedgerState,
    ) -> Snapshot {
        let horizon = state.last_recorded_final_day();
        let client_ids = Self::client_order(roster, state);

        let mut daily_rows = Vec::with_capacity(calendar.len());
        let mut day_index = HashMap::with_capacity(calendar.len());
        let mut client_rows: Vec<Vec<ClientDayRow>> =
            vec![Vec::with_capacity(calendar.len()); client_ids.len()];
        let mut running = vec![ClientRunning::default(); client_ids.len()];

        let mut previous_final: Option<f64> = None;
        let mut cumulative_profit = 0.0;
        let mut first_initial: Option<f64> = None;

        for (idx, day) in calendar.iter().enumerate() {
            day_index.insert(day.iso, idx);

            // Not reconciled yet: nothing is derived, not even the flows.
            if horizon.is_some_and(|last| day.iso > last) {
                daily_rows.push(blank_daily_row(day));
                for rows in &mut client_rows {
                    rows.push(blank_client_row(day));
                }
                continue;
            }

            let movements: Vec<Option<&Movement>> = client_ids
                .iter()
                .map(|id| state.movement(id, day.iso))
                .collect();
            let flows = DayFlows::sum(&movements);
            let net = flows.net();

            let initial = previous_final.unwrap_or(0.0) + net;
            if first_initial.is_none() && initial != 0.0 {
                first_initial = Some(initial);
            }

            // Without a recorded close the last close is carried forward,
            // adjusted for the day's own flows.
            let recorded = state.recorded_final(day.iso);
            let effective_final = recorded.or_else(|| previous_final.map(|p| p + net));

            let profit = match (recorded, effective_final) {
                (Some(f), _) => Some(f - initial),
                (None, Some(f)) if !flows.any() => Some(f - initial),
                _ => None,
            };
            if let Some(p) = profit {
                cumulative_profit += p;
            }

            daily_rows.push(DailyRow {
                iso: day.iso,
                label: day.label.clone(),
                weekday: day.weekday.clone(),
                is_weekend: day.is_weekend,
                increment: flows.increment,
                decrement: flows.decrement,
                initial: Some(initial),
                final_balance: recorded,
                profit,
                profit_pct: profit.and_then(|p| ratio(p, initial)),
                cumulative_profit: Some(cumulative_profit),
            });

            Self::allocate(
                day,
                &movements,
                effective_final,
                &mut running,
                &mut client_rows,
            );

            if effective_final.is_some() {
                previous_final = effective_final;
            }
        }

        let totals = Totals {
            assets: previous_final,
            ytd_profit: cumulative_profit,
            ytd_return_pct: first_initial.and_then(|fi| ratio(cumulative_profit, fi)),
        };

        log::debug!(
            "Built snapshot: {} days, {} clients, horizon {:?}",
            daily_rows.len(),
            client_ids.len(),
            horizon
        );

        Snapshot {
            daily_rows,
            day_index,
            client_rows_by_id: client_ids.into_iter().zip(client_rows).collect::<BTreeMap<_, _>>(),
            totals,
            last_recorded_final_day: horizon,
        }
    }

    /// Split the day's effective close across clients.
    ///
    /// First pass computes each client's base balance and the pool of
    /// positive balances; second pass hands out shares. Clients at or below
    /// zero are left out of the pool and keep their base balance.
    fn allocate(
        day: &CalendarDay,
        movements: &[Option<&Movement>],
        effective_final: Option<f64>,
        running: &mut [ClientRunning],
        client_rows: &mut [Vec<ClientDayRow>],
    ) {
        let bases: Vec<Option<f64>> = running
            .iter()
            .zip(movements)
            .map(|(client, movement)| match (client.balance, movement) {
                (None, None) => None,
                (balance, movement) => {
                    Some(balance.unwrap_or(0.0) + movement.map_or(0.0, Movement::net))
                }
            })
            .collect();

        let total_base: f64 = bases.iter().flatten().filter(|b| **b > 0.0).sum();
        let pool_final = effective_final.filter(|_| total_base > 0.0);

        for (i, client) in running.iter_mut().enumerate() {
            let movement = movements[i];
            let mut row = blank_client_row(day);
            row.increment = movement.and_then(|m| m.increment);
            row.decrement = movement.and_then(|m| m.decrement);

            if let Some(base) = bases[i] {
                row.base_balance = Some(base);
                row.final_balance = Some(base);

                match pool_final {
                    Some(final_value) if base > 0.0 => {
                        let weight = base / total_base;
                        let share_amount = final_value * weight;
                        let profit = share_amount - base;
                        client.cumulative_profit += profit;

                        row.final_balance = Some(share_amount);
                        row.profit = Some(profit);
                        row.profit_pct = ratio(profit, base);
                        row.share_pct = Some(weight);
                        row.share_amount = Some(share_amount);
                    }
                    Some(_) => {
                        row.share_pct = Some(0.0);
                        row.share_amount = Some(0.0);
                    }
                    None => {}
                }

                row.cumulative_profit = Some(client.cumulative_profit);
                client.balance = row.final_balance;
            }

            client_rows[i].push(row);
        }
    }

    /// Roster order first, then any client that only appears in the ledger.
    fn client_order(roster: &[Client], state: &RawLedgerState) -> Vec<String> {
        let mut ids: Vec<String> = roster.iter().map(|c| c.id.clone()).collect();
        for id in state.client_ids() {
            if !ids.iter().any(|known| known == id) {
                ids.push(id.to_string());
            }
        }
        ids
    }
}

impl Default for SnapshotService {
    fn default() -> Self {
        Self::new()
    }
}
