use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::debug;

use crate::constants::persist::{DEFAULT_STORE_DIR, DEFAULT_STORE_FILENAME};
use crate::data::SearchRecord;
use crate::errors::PipelineError;

/// Append-only sink for completed search records.
///
/// A save failure is surfaced as `PipelineError::Persistence`; it never
/// retroactively invalidates the computed result, which stays available to
/// the caller alongside the reported failure.
pub trait TopWordsSink: Send + Sync {
    /// Append one completed record to the store.
    fn save(&self, record: &SearchRecord) -> Result<(), PipelineError>;
}

/// File-backed sink appending one JSON document per line.
pub struct JsonlFileSink {
    path: PathBuf,
    write_guard: Mutex<()>,
}

impl JsonlFileSink {
    /// Create a sink appending to `path`, creating parent directories.
    pub fn new(path: impl Into<PathBuf>) -> Result<Self, PipelineError> {
        let path = path.into();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }
        Ok(Self {
            path,
            write_guard: Mutex::new(()),
        })
    }

    /// Create a sink with the default filename inside `dir`.
    pub fn in_dir(dir: impl AsRef<Path>) -> Result<Self, PipelineError> {
        Self::new(dir.as_ref().join(DEFAULT_STORE_FILENAME))
    }

    /// Create a sink at the default store location.
    pub fn default_store() -> Result<Self, PipelineError> {
        Self::in_dir(DEFAULT_STORE_DIR)
    }

    /// Path of the backing store file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TopWordsSink for JsonlFileSink {
    fn save(&self, record: &SearchRecord) -> Result<(), PipelineError> {
        let mut line = serde_json::to_string(record)
            .map_err(|err| PipelineError::Persistence(format!("failed encoding record: {err}")))?;
        line.push('\n');

        let _guard = self.write_guard.lock().expect("search store lock poisoned");
        let mut file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|err| {
                PipelineError::Persistence(format!(
                    "failed opening store '{}': {err}",
                    self.path.display()
                ))
            })?;
        file.write_all(line.as_bytes()).map_err(|err| {
            PipelineError::Persistence(format!(
                "failed appending to store '{}': {err}",
                self.path.display()
            ))
        })?;
        debug!(path = %self.path.display(), query = %record.query, "search record persisted");
        Ok(())
    }
}

/// In-memory sink for tests; optionally fails every save with a fixed reason.
#[derive(Default)]
pub struct MemorySink {
    records: Mutex<Vec<SearchRecord>>,
    fail_reason: Option<String>,
}

impl MemorySink {
    /// Create a sink that accepts every record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a sink that rejects every record with `reason`.
    pub fn failing(reason: impl Into<String>) -> Self {
        Self {
            records: Mutex::new(Vec::new()),
            fail_reason: Some(reason.into()),
        }
    }

    /// Snapshot of everything saved so far.
    pub fn saved(&self) -> Vec<SearchRecord> {
        self.records.lock().expect("memory sink lock poisoned").clone()
    }
}

impl TopWordsSink for MemorySink {
    fn save(&self, record: &SearchRecord) -> Result<(), PipelineError> {
        if let Some(reason) = &self.fail_reason {
            return Err(PipelineError::Persistence(reason.clone()));
        }
        self.records
            .lock()
            .expect("memory sink lock poisoned")
            .push(record.clone());
        Ok(())
    }
}
