use std::io;

use thiserror::Error;

use crate::types::SourceId;

/// Error type for batch fetch, pipeline, configuration, and persistence failures.
///
/// Every stage-local failure aborts the whole run; partial tallies are never
/// surfaced. `Cancelled` is the one non-failure outcome: callers match on it
/// to distinguish an interrupted run from a broken one.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("batch source '{source_id}' is unavailable: {reason}")]
    SourceUnavailable { source_id: SourceId, reason: String },
    #[error("batch source '{source_id}' returned a malformed page: {details}")]
    MalformedBatch { source_id: SourceId, details: String },
    #[error("failed persisting search record: {0}")]
    Persistence(String),
    #[error("search run cancelled")]
    Cancelled,
    #[error("configuration error: {0}")]
    Configuration(String),
    #[error(transparent)]
    Io(#[from] io::Error),
}

impl PipelineError {
    /// Returns `true` when the run was interrupted rather than failed.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, PipelineError::Cancelled)
    }
}
