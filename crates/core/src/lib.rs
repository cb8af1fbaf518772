pub mod errors;
pub mod models;
pub mod services;
pub mod storage;

use chrono::NaiveDate;
use models::{
    calendar::CalendarDay,
    client::{find_client, Client},
    ledger::RawLedgerState,
    movement::MovementField,
    settings::Settings,
    snapshot::Snapshot,
    twr::{MonthlyTwr, TwrResult, TwrRow},
};
use services::{
    calendar_service::CalendarService, ledger_service::LedgerService,
    snapshot_service::SnapshotService, twr_service::TwrService,
};
use storage::{autosave::AutosaveHandle, repository::LedgerRepository};
use uuid::Uuid;

use errors::CoreError;

/// Callback invoked with the fresh snapshot after every committed mutation.
pub type Subscriber = Box<dyn Fn(&Snapshot) + Send + Sync>;

/// Main entry point for the Fund Ledger core library.
///
/// Owns the raw ledger (the single mutable state) and the snapshot derived
/// from it. Every mutation rebuilds the snapshot synchronously, notifies
/// subscribers, and hands the new state to the autosave worker if one is
/// attached. Assumes a single mutator.
#[must_use]
pub struct FundLedger {
    settings: Settings,
    calendar: Vec<CalendarDay>,
    state: RawLedgerState,
    snapshot: Snapshot,
    ledger_service: LedgerService,
    snapshot_service: SnapshotService,
    twr_service: TwrService,
    subscribers: Vec<(Uuid, Subscriber)>,
    autosave: Option<AutosaveHandle>,
    /// Tracks whether any mutation has occurred since the last save/load.
    dirty: bool,
}

impl std::fmt::Debug for FundLedger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FundLedger")
            .field("year", &self.settings.year)
            .field("clients", &self.settings.clients.len())
            .field("closes", &self.state.final_by_day.len())
            .field("movements", &self.state.movement_count())
            .field("subscribers", &self.subscribers.len())
            .field("autosave", &self.autosave.is_some())
            .field("dirty", &self.dirty)
            .finish()
    }
}

impl FundLedger {
    /// Create an empty ledger for the configured year and roster.
    pub fn new(settings: Settings) -> Result<Self, CoreError> {
        Self::from_state(settings, RawLedgerState::default())
    }

    /// Create a ledger from previously persisted raw state.
    pub fn from_state(settings: Settings, state: RawLedgerState) -> Result<Self, CoreError> {
        settings.validate()?;
        let mut ledger = Self::build(settings);
        ledger.replace_state(state)?;
        ledger.dirty = false;
        Ok(ledger)
    }

    /// Hydrate a ledger from a repository.
    pub async fn load(
        settings: Settings,
        repository: &dyn LedgerRepository,
    ) -> Result<Self, CoreError> {
        let state = repository.fetch().await?;
        log::info!(
            "Loaded ledger from {} ({} closes, {} movements)",
            repository.name(),
            state.final_by_day.len(),
            state.movement_count()
        );
        Self::from_state(settings, state)
    }

    /// Save the raw ledger right away, bypassing the debounce.
    /// Clears the unsaved-changes flag on success.
    pub async fn save(&mut self, repository: &dyn LedgerRepository) -> Result<(), CoreError> {
        repository.save(&self.state).await?;
        self.dirty = false;
        Ok(())
    }

    /// Route every future mutation to an autosave worker.
    pub fn attach_autosave(&mut self, handle: AutosaveHandle) {
        self.autosave = Some(handle);
    }

    /// Stop autosaving. Returns the handle that was attached, if any.
    pub fn detach_autosave(&mut self) -> Option<AutosaveHandle> {
        self.autosave.take()
    }

    // ── Read ────────────────────────────────────────────────────────

    /// The raw ledger.
    #[must_use]
    pub fn read(&self) -> &RawLedgerState {
        &self.state
    }

    /// The snapshot derived from the current ledger.
    #[must_use]
    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    #[must_use]
    pub fn calendar(&self) -> &[CalendarDay] {
        &self.calendar
    }

    #[must_use]
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    #[must_use]
    pub fn clients(&self) -> &[Client] {
        &self.settings.clients
    }

    #[must_use]
    pub fn client(&self, client_id: &str) -> Option<&Client> {
        find_client(&self.settings.clients, client_id)
    }

    /// Returns `true` if the ledger has been modified since the last save or load.
    #[must_use]
    pub fn has_unsaved_changes(&self) -> bool {
        self.dirty
    }

    // ── Mutations ───────────────────────────────────────────────────

    /// Apply an arbitrary change to the raw ledger.
    ///
    /// The closure works on a copy; the result is pruned and validated
    /// before it replaces the current state, so a rejected change leaves
    /// the ledger untouched.
    pub fn mutate<F>(&mut self, f: F) -> Result<(), CoreError>
    where
        F: FnOnce(&mut RawLedgerState),
    {
        let mut next = self.state.clone();
        f(&mut next);
        self.replace_state(next)
    }

    /// Record (`Some`) or clear (`None`) the portfolio close for a day.
    pub fn set_final(&mut self, date: NaiveDate, value: Option<f64>) -> Result<(), CoreError> {
        let mut next = self.state.clone();
        self.ledger_service.set_final(&mut next, date, value)?;
        self.commit(next);
        Ok(())
    }

    /// Set or clear a client's deposit for a day.
    pub fn set_increment(
        &mut self,
        client_id: &str,
        date: NaiveDate,
        value: Option<f64>,
    ) -> Result<(), CoreError> {
        self.set_movement_field(client_id, date, MovementField::Increment, value)
    }

    /// Set or clear a client's withdrawal for a day.
    pub fn set_decrement(
        &mut self,
        client_id: &str,
        date: NaiveDate,
        value: Option<f64>,
    ) -> Result<(), CoreError> {
        self.set_movement_field(client_id, date, MovementField::Decrement, value)
    }

    pub fn set_movement_field(
        &mut self,
        client_id: &str,
        date: NaiveDate,
        field: MovementField,
        value: Option<f64>,
    ) -> Result<(), CoreError> {
        let mut next = self.state.clone();
        self.ledger_service
            .set_movement_field(&mut next, client_id, date, field, value)?;
        self.commit(next);
        Ok(())
    }

    /// Remove a client's movement for a day. Returns `true` if one existed.
    pub fn clear_movement(&mut self, client_id: &str, date: NaiveDate) -> Result<bool, CoreError> {
        let mut next = self.state.clone();
        let removed = self.ledger_service.clear_movement(&mut next, client_id, date)?;
        if removed {
            self.commit(next);
        }
        Ok(removed)
    }

    // ── Subscriptions ───────────────────────────────────────────────

    /// Register a callback for snapshot changes. Returns a handle for
    /// `unsubscribe`.
    pub fn subscribe<F>(&mut self, callback: F) -> Uuid
    where
        F: Fn(&Snapshot) + Send + Sync + 'static,
    {
        let id = Uuid::new_v4();
        self.subscribers.push((id, Box::new(callback)));
        id
    }

    pub fn unsubscribe(&mut self, id: Uuid) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sid, _)| *sid != id);
        self.subscribers.len() != before
    }

    // ── Time-weighted returns ───────────────────────────────────────

    /// Portfolio TWR over the whole tracked year.
    #[must_use]
    pub fn portfolio_twr(&self) -> TwrResult {
        self.twr_service.calculate(&self.portfolio_rows())
    }

    /// Portfolio TWR over `from..=to`.
    #[must_use]
    pub fn portfolio_twr_between(&self, from: NaiveDate, to: NaiveDate) -> TwrResult {
        let rows = TwrService::in_range(&self.portfolio_rows(), from, to);
        self.twr_service.calculate(&rows)
    }

    /// Portfolio TWR per calendar month.
    #[must_use]
    pub fn portfolio_monthly_twr(&self) -> Vec<MonthlyTwr> {
        self.twr_service.calculate_monthly(&self.portfolio_rows())
    }

    /// A client's TWR over the whole tracked year.
    pub fn client_twr(&self, client_id: &str) -> Result<TwrResult, CoreError> {
        Ok(self.twr_service.calculate(&self.client_twr_rows(client_id)?))
    }

    /// A client's TWR over `from..=to`.
    pub fn client_twr_between(
        &self,
        client_id: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<TwrResult, CoreError> {
        let rows = TwrService::in_range(&self.client_twr_rows(client_id)?, from, to);
        Ok(self.twr_service.calculate(&rows))
    }

    /// A client's TWR per calendar month.
    pub fn client_monthly_twr(&self, client_id: &str) -> Result<Vec<MonthlyTwr>, CoreError> {
        Ok(self
            .twr_service
            .calculate_monthly(&self.client_twr_rows(client_id)?))
    }

    // ── Export / Import ─────────────────────────────────────────────

    /// Export the raw ledger as a JSON string.
    pub fn export_json(&self) -> Result<String, CoreError> {
        serde_json::to_string_pretty(&self.state)
            .map_err(|e| CoreError::Serialization(format!("Failed to serialize ledger to JSON: {e}")))
    }

    /// Replace the raw ledger with one parsed from JSON. The import is
    /// validated as a whole; on error nothing changes.
    pub fn import_json(&mut self, json: &str) -> Result<(), CoreError> {
        let state: RawLedgerState = serde_json::from_str(json)?;
        self.replace_state(state)
    }

    /// Export the derived snapshot as JSON (for display/debugging).
    pub fn snapshot_to_json(&self) -> Result<String, CoreError> {
        serde_json::to_string_pretty(&self.snapshot)
            .map_err(|e| CoreError::Serialization(format!("Failed to serialize snapshot: {e}")))
    }

    // ── Internal ────────────────────────────────────────────────────

    fn portfolio_rows(&self) -> Vec<TwrRow> {
        self.snapshot.daily_rows.iter().map(TwrRow::from).collect()
    }

    fn client_twr_rows(&self, client_id: &str) -> Result<Vec<TwrRow>, CoreError> {
        if self.client(client_id).is_none() {
            return Err(CoreError::ClientNotFound(client_id.to_string()));
        }
        Ok(self
            .snapshot
            .client_rows(client_id)
            .map(|rows| rows.iter().map(TwrRow::from).collect())
            .unwrap_or_default())
    }

    fn replace_state(&mut self, mut next: RawLedgerState) -> Result<(), CoreError> {
        let pruned = self.ledger_service.normalize(&mut next);
        if pruned > 0 {
            log::debug!("Pruned {pruned} empty movement record(s)");
        }
        self.ledger_service.validate(&next)?;
        self.commit(next);
        Ok(())
    }

    fn commit(&mut self, next: RawLedgerState) {
        self.state = next;
        self.snapshot = self
            .snapshot_service
            .build(&self.calendar, &self.settings.clients, &self.state);
        self.dirty = true;

        for (_, subscriber) in &self.subscribers {
            subscriber(&self.snapshot);
        }

        if let Some(handle) = &self.autosave {
            if let Err(e) = handle.schedule(self.state.clone()) {
                log::warn!("Could not schedule autosave: {e}");
            }
        }
    }

    fn build(settings: Settings) -> Self {
        let calendar = CalendarService::new().generate(settings.year);
        let ledger_service = LedgerService::new(settings.year, settings.clients.clone());

        Self {
            settings,
            calendar,
            state: RawLedgerState::default(),
            snapshot: Snapshot::default(),
            ledger_service,
            snapshot_service: SnapshotService::new(),
            twr_service: TwrService::new(),
            subscribers: Vec::new(),
            autosave: None,
            dirty: false,
        }
    }
}
