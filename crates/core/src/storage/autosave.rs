//! Debounced, fire-and-forget persistence.
//!
//! Every ledger mutation hands the latest state to the worker. The worker
//! waits until no new state has arrived for the debounce window, then saves
//! once. A failed save is reported through the status channel and is not
//! retried; the next mutation schedules the next attempt.

use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

use crate::errors::CoreError;
use crate::models::ledger::RawLedgerState;

use super::repository::LedgerRepository;

/// Outcome of the most recent persistence attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum SaveStatus {
    /// Nothing scheduled yet
    Idle,
    /// A state is waiting for the debounce window to pass
    Pending,
    Saving,
    Saved { at: DateTime<Utc> },
    Failed(String),
}

/// Sending side of the autosave worker. Cheap to clone; the worker stops
/// (after flushing any pending state) once every handle is dropped.
#[derive(Debug, Clone)]
pub struct AutosaveHandle {
    tx: mpsc::UnboundedSender<RawLedgerState>,
    status: watch::Receiver<SaveStatus>,
}

impl AutosaveHandle {
    /// Queue `state` for saving, replacing anything still pending and
    /// restarting the debounce window.
    pub fn schedule(&self, state: RawLedgerState) -> Result<(), CoreError> {
        self.tx
            .send(state)
            .map_err(|_| CoreError::Persistence("Autosave worker has stopped".into()))
    }

    /// Current save status.
    pub fn status(&self) -> SaveStatus {
        self.status.borrow().clone()
    }

    /// A receiver that is notified on every status change.
    pub fn watch_status(&self) -> watch::Receiver<SaveStatus> {
        self.status.clone()
    }
}

/// Spawn the autosave worker on the current tokio runtime.
pub fn spawn_autosave(
    repository: Arc<dyn LedgerRepository>,
    debounce: Duration,
) -> (AutosaveHandle, JoinHandle<()>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let (status_tx, status_rx) = watch::channel(SaveStatus::Idle);
    let task = tokio::spawn(autosave_worker(rx, repository, status_tx, debounce));
    (
        AutosaveHandle {
            tx,
            status: status_rx,
        },
        task,
    )
}

async fn autosave_worker(
    mut rx: mpsc::UnboundedReceiver<RawLedgerState>,
    repository: Arc<dyn LedgerRepository>,
    status: watch::Sender<SaveStatus>,
    debounce: Duration,
) {
    log::debug!(
        "Autosave worker started ({} backend, {:?} debounce)",
        repository.name(),
        debounce
    );

    let mut pending: Option<RawLedgerState> = None;

    loop {
        if pending.is_some() {
            tokio::select! {
                next = rx.recv() => {
                    match next {
                        // Newer state: replace and wait a full window again
                        Some(state) => pending = Some(state),
                        None => {
                            if let Some(state) = pending.take() {
                                save_now(repository.as_ref(), &state, &status).await;
                            }
                            log::debug!("Autosave worker shutting down");
                            return;
                        }
                    }
                }
                _ = tokio::time::sleep(debounce) => {
                    if let Some(state) = pending.take() {
                        save_now(repository.as_ref(), &state, &status).await;
                    }
                }
            }
        } else {
            match rx.recv().await {
                Some(state) => {
                    pending = Some(state);
                    status.send_replace(SaveStatus::Pending);
                }
                None => {
                    log::debug!("Autosave worker shutting down");
                    return;
                }
            }
        }
    }
}

async fn save_now(
    repository: &dyn LedgerRepository,
    state: &RawLedgerState,
    status: &watch::Sender<SaveStatus>,
) {
    status.send_replace(SaveStatus::Saving);
    match repository.save(state).await {
        Ok(()) => {
            log::info!(
                "Saved ledger to {} ({} closes, {} movements)",
                repository.name(),
                state.final_by_day.len(),
                state.movement_count()
            );
            status.send_replace(SaveStatus::Saved { at: Utc::now() });
        }
        Err(e) => {
            log::warn!("Saving ledger to {} failed: {e}", repository.name());
            status.send_replace(SaveStatus::Failed(e.to_string()));
        }
    }
}
