//! Calibration snapshot storage adapter.
//!
//! Persists [`CalibrationData`] as a single JSON document.  Two backends:
//! a file next to the binary for the host simulation, and an in-memory
//! store for tests that need to exercise save/load behaviour without
//! touching the filesystem.

use std::cell::RefCell;
use std::path::PathBuf;

use log::warn;

use crate::app::ports::{CalibrationStore, StoreError};
use crate::calibration::CalibrationData;

/// JSON-file backed store.
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl CalibrationStore for JsonFileStore {
    fn load(&self) -> Result<CalibrationData, StoreError> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(StoreError::NotFound);
            }
            Err(e) => {
                warn!("calibration read failed: {e}");
                return Err(StoreError::IoError);
            }
        };
        serde_json::from_str(&raw).map_err(|e| {
            warn!("calibration snapshot corrupted: {e}");
            StoreError::Corrupted
        })
    }

    fn save(&self, data: &CalibrationData) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(data).map_err(|_| StoreError::IoError)?;
        std::fs::write(&self.path, json).map_err(|e| {
            warn!("calibration write failed: {e}");
            StoreError::IoError
        })
    }
}

/// In-memory store for tests.
#[derive(Default)]
pub struct MemoryStore {
    snapshot: RefCell<Option<CalibrationData>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-seed the store, as if a previous session had saved.
    pub fn with_snapshot(data: CalibrationData) -> Self {
        Self {
            snapshot: RefCell::new(Some(data)),
        }
    }
}

impl CalibrationStore for MemoryStore {
    fn load(&self) -> Result<CalibrationData, StoreError> {
        self.snapshot.borrow().clone().ok_or(StoreError::NotFound)
    }

    fn save(&self, data: &CalibrationData) -> Result<(), StoreError> {
        *self.snapshot.borrow_mut() = Some(data.clone());
        Ok(())
    }
}
