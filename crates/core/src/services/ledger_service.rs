use chrono::{Datelike, NaiveDate};

use crate::errors::CoreError;
use crate::models::client::{find_client, Client};
use crate::models::ledger::RawLedgerState;
use crate::models::movement::{Movement, MovementField};

/// Mutation rules for the raw ledger.
///
/// This is the only place that writes to a `RawLedgerState`, so the
/// "no empty movement records" invariant is enforced here rather than on
/// every read.
pub struct LedgerService {
    year: i32,
    roster: Vec<Client>,
}

impl LedgerService {
    pub fn new(year: i32, roster: Vec<Client>) -> Self {
        Self { year, roster }
    }

    /// Record or clear (`None`) the portfolio close for a day.
    pub fn set_final(
        &self,
        state: &mut RawLedgerState,
        date: NaiveDate,
        value: Option<f64>,
    ) -> Result<(), CoreError> {
        self.validate_date(date)?;
        match value {
            Some(v) => {
                if !v.is_finite() {
                    return Err(CoreError::ValidationError(format!(
                        "Closing balance for {date} must be a finite number"
                    )));
                }
                state.final_by_day.insert(date, v);
            }
            None => {
                state.final_by_day.remove(&date);
            }
        }
        Ok(())
    }

    /// Set or clear one side of a client's movement. A movement left with
    /// neither side is removed, and so is a client left with no movements.
    pub fn set_movement_field(
        &self,
        state: &mut RawLedgerState,
        client_id: &str,
        date: NaiveDate,
        field: MovementField,
        value: Option<f64>,
    ) -> Result<(), CoreError> {
        self.validate_client(client_id)?;
        self.validate_date(date)?;
        if let Some(v) = value {
            Self::validate_amount(v, field, date)?;
        }

        let movements = state
            .movements_by_client
            .entry(client_id.to_string())
            .or_default();
        let movement = movements.entry(date).or_insert_with(Movement::default);
        movement.set(field, value);

        if movement.is_empty() {
            movements.remove(&date);
        }
        if movements.is_empty() {
            state.movements_by_client.remove(client_id);
        }
        Ok(())
    }

    /// Remove both sides of a client's movement on a day.
    /// Returns `true` if something was removed.
    pub fn clear_movement(
        &self,
        state: &mut RawLedgerState,
        client_id: &str,
        date: NaiveDate,
    ) -> Result<bool, CoreError> {
        self.validate_client(client_id)?;
        let Some(movements) = state.movements_by_client.get_mut(client_id) else {
            return Ok(false);
        };
        let removed = movements.remove(&date).is_some();
        if movements.is_empty() {
            state.movements_by_client.remove(client_id);
        }
        Ok(removed)
    }

    /// Prune empty movements and empty clients. Returns how many movement
    /// records were dropped.
    pub fn normalize(&self, state: &mut RawLedgerState) -> usize {
        let mut pruned = 0;
        for movements in state.movements_by_client.values_mut() {
            let before = movements.len();
            movements.retain(|_, m| !m.is_empty());
            pruned += before - movements.len();
        }
        state.movements_by_client.retain(|_, m| !m.is_empty());
        pruned
    }

    /// Validate a whole ledger, e.g. after an import or a free-form mutation.
    /// Expects the ledger to be normalized already.
    pub fn validate(&self, state: &RawLedgerState) -> Result<(), CoreError> {
        for (&date, &value) in &state.final_by_day {
            self.validate_date(date)?;
            if !value.is_finite() {
                return Err(CoreError::ValidationError(format!(
                    "Closing balance for {date} must be a finite number"
                )));
            }
        }

        for (client_id, movements) in &state.movements_by_client {
            self.validate_client(client_id)?;
            for (&date, movement) in movements {
                self.validate_date(date)?;
                if movement.is_empty() {
                    return Err(CoreError::ValidationError(format!(
                        "Empty movement stored for '{client_id}' on {date}"
                    )));
                }
                for field in [MovementField::Increment, MovementField::Decrement] {
                    if let Some(v) = movement.get(field) {
                        Self::validate_amount(v, field, date)?;
                    }
                }
            }
        }
        Ok(())
    }

    fn validate_date(&self, date: NaiveDate) -> Result<(), CoreError> {
        if date.year() != self.year {
            return Err(CoreError::ValidationError(format!(
                "Date {date} is outside the tracked year {}",
                self.year
            )));
        }
        Ok(())
    }

    fn validate_client(&self, client_id: &str) -> Result<(), CoreError> {
        if client_id.trim().is_empty() {
            return Err(CoreError::ValidationError(
                "Client id must not be empty".into(),
            ));
        }
        if find_client(&self.roster, client_id).is_none() {
            return Err(CoreError::ClientNotFound(client_id.to_string()));
        }
        Ok(())
    }

    fn validate_amount(value: f64, field: MovementField, date: NaiveDate) -> Result<(), CoreError> {
        if !value.is_finite() || value < 0.0 {
            return Err(CoreError::ValidationError(format!(
                "The {field} on {date} must be a non-negative number, got {value}"
            )));
        }
        Ok(())
    }
}
