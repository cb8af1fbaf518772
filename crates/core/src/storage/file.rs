use async_trait::async_trait;
use std::path::{Path, PathBuf};

use crate::errors::CoreError;
use crate::models::ledger::RawLedgerState;

use super::format;
use super::repository::LedgerRepository;

/// Serialize a ledger into file bytes.
///
/// Flow: RawLedgerState → bincode → FLDG container
pub fn to_bytes(state: &RawLedgerState) -> Result<Vec<u8>, CoreError> {
    let payload = bincode::serialize(state)
        .map_err(|e| CoreError::Serialization(format!("Failed to serialize ledger: {e}")))?;
    Ok(format::write_file(format::CURRENT_VERSION, &payload))
}

/// Parse file bytes back into a ledger.
///
/// Flow: FLDG container → header check → bincode → RawLedgerState
pub fn from_bytes(data: &[u8]) -> Result<RawLedgerState, CoreError> {
    let (_header, payload) = format::read_file(data)?;
    bincode::deserialize(payload)
        .map_err(|e| CoreError::Deserialization(format!("Failed to deserialize ledger: {e}")))
}

/// Ledger persisted as a single local file.
///
/// Saves go to a sibling temp file first and are renamed into place, so a
/// crash mid-write never leaves a truncated ledger behind.
#[derive(Debug, Clone)]
pub struct FileRepository {
    path: PathBuf,
}

impl FileRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[async_trait]
impl LedgerRepository for FileRepository {
    fn name(&self) -> &str {
        "file"
    }

    async fn fetch(&self) -> Result<RawLedgerState, CoreError> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => from_bytes(&bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::info!("No ledger at {}, starting empty", self.path.display());
                Ok(RawLedgerState::default())
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn save(&self, state: &RawLedgerState) -> Result<(), CoreError> {
        let bytes = to_bytes(state)?;
        let temp = self.temp_path();
        tokio::fs::write(&temp, &bytes).await?;
        tokio::fs::rename(&temp, &self.path).await?;
        Ok(())
    }
}
