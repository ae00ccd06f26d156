use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::constants::fixture::DEFAULT_SOURCE_ID;
use crate::data::Batch;
use crate::errors::PipelineError;
use crate::source::sources::WirePage;
use crate::source::{BatchSource, PageRequest};
use crate::types::SourceId;

/// Batch source that replays a captured search response from disk.
///
/// The fixture is a single page; any continuation token recorded in the
/// capture is dropped so a replay cannot chain into pages that no longer
/// exist. Every fetch re-reads the file, which keeps the source stateless
/// and restartable.
pub struct FixtureFileSource {
    source_id: SourceId,
    path: PathBuf,
}

impl FixtureFileSource {
    /// Create a fixture source reading `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            source_id: DEFAULT_SOURCE_ID.to_string(),
            path: path.into(),
        }
    }

    /// Override the source id used in errors and logs.
    pub fn with_source_id(mut self, source_id: impl Into<SourceId>) -> Self {
        self.source_id = source_id.into();
        self
    }

    /// Path of the fixture file being replayed.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl BatchSource for FixtureFileSource {
    fn id(&self) -> &str {
        &self.source_id
    }

    fn fetch(&self, _request: &PageRequest) -> Result<Batch, PipelineError> {
        let body =
            fs::read_to_string(&self.path).map_err(|err| PipelineError::SourceUnavailable {
                source_id: self.source_id.clone(),
                reason: format!("failed reading fixture '{}': {err}", self.path.display()),
            })?;
        let page: WirePage =
            serde_json::from_str(&body).map_err(|err| PipelineError::MalformedBatch {
                source_id: self.source_id.clone(),
                details: format!("failed decoding fixture '{}': {err}", self.path.display()),
            })?;
        let mut batch = page.into_batch();
        debug!(
            source_id = %self.source_id,
            record_count = batch.records.len(),
            "fixture page replayed"
        );
        batch.next.clear();
        Ok(batch)
    }
}
