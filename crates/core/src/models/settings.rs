use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use super::client::Client;
use crate::errors::CoreError;

/// Earliest and latest year a ledger can be configured for.
pub const MIN_YEAR: i32 = 1970;
pub const MAX_YEAR: i32 = 2100;

fn default_year() -> i32 {
    2025
}

fn default_debounce_ms() -> u64 {
    1000
}

/// Ledger configuration: which year is tracked, who the clients are, and
/// how long the autosave worker waits for edits to settle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// The tracked calendar year
    #[serde(default = "default_year")]
    pub year: i32,

    /// Fixed client roster, in display order
    #[serde(default)]
    pub clients: Vec<Client>,

    /// Debounce window for autosave, in milliseconds
    #[serde(default = "default_debounce_ms")]
    pub autosave_debounce_ms: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            year: default_year(),
            clients: Vec::new(),
            autosave_debounce_ms: default_debounce_ms(),
        }
    }
}

impl Settings {
    pub fn new(year: i32, clients: Vec<Client>) -> Self {
        Self {
            year,
            clients,
            ..Self::default()
        }
    }

    /// Parse settings from JSON. Missing fields fall back to defaults.
    pub fn from_json(json: &str) -> Result<Self, CoreError> {
        let settings: Settings = serde_json::from_str(json)
            .map_err(|e| CoreError::Config(format!("Failed to parse settings: {e}")))?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn debounce(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.autosave_debounce_ms)
    }

    /// Check the year range and that client ids are non-empty and unique.
    pub fn validate(&self) -> Result<(), CoreError> {
        if !(MIN_YEAR..=MAX_YEAR).contains(&self.year) {
            return Err(CoreError::Config(format!(
                "Year {} out of range (expected {MIN_YEAR}..={MAX_YEAR})",
                self.year
            )));
        }

        let mut seen = HashSet::new();
        for client in &self.clients {
            if client.id.trim().is_empty() {
                return Err(CoreError::Config("Client id must not be empty".into()));
            }
            if !seen.insert(client.id.as_str()) {
                return Err(CoreError::Config(format!(
                    "Duplicate client id '{}'",
                    client.id
                )));
            }
        }
        Ok(())
    }
}
