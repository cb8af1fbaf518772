use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::errors::CoreError;
use crate::models::ledger::RawLedgerState;

/// Where the raw ledger is persisted.
///
/// The ledger itself never depends on a concrete backend; a local file, a
/// remote document store or an in-memory double all plug in here.
/// Writes are last-write-wins.
#[async_trait]
pub trait LedgerRepository: Send + Sync {
    /// Human-readable name of this backend (for logs/errors).
    fn name(&self) -> &str;

    /// Load the persisted ledger. A backend with nothing stored yet
    /// returns an empty ledger.
    async fn fetch(&self) -> Result<RawLedgerState, CoreError>;

    /// Replace the persisted ledger.
    async fn save(&self, state: &RawLedgerState) -> Result<(), CoreError>;
}

/// In-process repository. Counts saves, and can be told to fail, which
/// makes it the test double for the autosave worker.
#[derive(Debug, Default)]
pub struct MemoryRepository {
    state: Mutex<RawLedgerState>,
    saves: AtomicUsize,
    fail_with: Mutex<Option<String>>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_state(state: RawLedgerState) -> Self {
        Self {
            state: Mutex::new(state),
            ..Self::default()
        }
    }

    /// Number of successful saves so far.
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    /// Make every following save fail with `message` (`None` to recover).
    pub fn set_failure(&self, message: Option<String>) {
        if let Ok(mut fail) = self.fail_with.lock() {
            *fail = message;
        }
    }

    /// Copy of the stored ledger.
    pub fn stored(&self) -> RawLedgerState {
        self.state
            .lock()
            .map(|s| s.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl LedgerRepository for MemoryRepository {
    fn name(&self) -> &str {
        "memory"
    }

    async fn fetch(&self) -> Result<RawLedgerState, CoreError> {
        self.state
            .lock()
            .map(|s| s.clone())
            .map_err(|e| CoreError::Persistence(format!("Memory store poisoned: {e}")))
    }

    async fn save(&self, state: &RawLedgerState) -> Result<(), CoreError> {
        let failure = self
            .fail_with
            .lock()
            .map_err(|e| CoreError::Persistence(format!("Memory store poisoned: {e}")))?
            .clone();
        if let Some(message) = failure {
            return Err(CoreError::Persistence(message));
        }

        let mut stored = self
            .state
            .lock()
            .map_err(|e| CoreError::Persistence(format!("Memory store poisoned: {e}")))?;
        *stored = state.clone();
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
