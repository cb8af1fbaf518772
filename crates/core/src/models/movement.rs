use serde::{Deserialize, Serialize};

/// Which side of a movement a mutation targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MovementField {
    /// Client deposit
    Increment,
    /// Client withdrawal
    Decrement,
}

impl std::fmt::Display for MovementField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MovementField::Increment => write!(f, "increment"),
            MovementField::Decrement => write!(f, "decrement"),
        }
    }
}

/// A client's cash flow on one day.
///
/// Both sides are optional and independent: `None` means "nothing entered",
/// which is not the same as an entered `0.0`. A movement with neither side
/// set must never be stored (see `LedgerService`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Movement {
    pub increment: Option<f64>,
    pub decrement: Option<f64>,
}

impl Movement {
    pub fn new(increment: Option<f64>, decrement: Option<f64>) -> Self {
        Self {
            increment,
            decrement,
        }
    }

    pub fn deposit(amount: f64) -> Self {
        Self::new(Some(amount), None)
    }

    pub fn withdrawal(amount: f64) -> Self {
        Self::new(None, Some(amount))
    }

    /// `true` when neither side has been entered.
    pub fn is_empty(&self) -> bool {
        self.increment.is_none() && self.decrement.is_none()
    }

    pub fn get(&self, field: MovementField) -> Option<f64> {
        match field {
            MovementField::Increment => self.increment,
            MovementField::Decrement => self.decrement,
        }
    }

    pub fn set(&mut self, field: MovementField, value: Option<f64>) {
        match field {
            MovementField::Increment => self.increment = value,
            MovementField::Decrement => self.decrement = value,
        }
    }

    /// Increment minus decrement, treating missing sides as zero.
    pub fn net(&self) -> f64 {
        self.increment.unwrap_or(0.0) - self.decrement.unwrap_or(0.0)
    }
}
