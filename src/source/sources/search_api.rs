use std::time::Duration;

use tracing::debug;
use ureq::Agent;

use crate::constants::search_api::{DEFAULT_ENDPOINT, DEFAULT_SOURCE_ID, DEFAULT_TIMEOUT_SECS};
use crate::data::Batch;
use crate::errors::PipelineError;
use crate::source::sources::{WirePage, WireRequest};
use crate::source::{BatchSource, PageRequest};
use crate::types::SourceId;

/// Configuration for the live full-archive search source.
///
/// Credentials and endpoint are injected here at construction; nothing is
/// read from the process environment inside the fetch path.
#[derive(Clone, Debug)]
pub struct SearchApiConfig {
    /// Stable source identifier used in errors and logs.
    pub source_id: SourceId,
    /// Search endpoint URL.
    pub endpoint: String,
    /// Bearer token sent with every fetch.
    pub bearer_token: String,
    /// Per-fetch deadline covering connect, send, and read.
    pub timeout: Duration,
}

impl SearchApiConfig {
    /// Create a config for the default endpoint with the given token.
    pub fn new(bearer_token: impl Into<String>) -> Self {
        Self {
            source_id: DEFAULT_SOURCE_ID.to_string(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            bearer_token: bearer_token.into(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Override the source id used in errors and logs.
    pub fn with_source_id(mut self, source_id: impl Into<SourceId>) -> Self {
        self.source_id = source_id.into();
        self
    }

    /// Override the search endpoint URL.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Override the per-fetch deadline.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Live batch source backed by the remote full-archive search endpoint.
///
/// Each fetch POSTs the page request as JSON and decodes the returned page.
/// The agent enforces the configured deadline on every call, so a hung
/// upstream surfaces as `SourceUnavailable` instead of stalling the run.
pub struct SearchApiSource {
    config: SearchApiConfig,
    agent: Agent,
}

impl SearchApiSource {
    /// Create a source from explicit configuration.
    pub fn new(config: SearchApiConfig) -> Self {
        let agent: Agent = Agent::config_builder()
            .timeout_global(Some(config.timeout))
            .build()
            .into();
        Self { config, agent }
    }

    fn encode_request(&self, request: &PageRequest) -> Result<String, PipelineError> {
        serde_json::to_string(&WireRequest {
            query: &request.query,
            from_date: request.from_date.as_deref(),
            to_date: request.to_date.as_deref(),
            max_results: request.max_results,
            next: &request.next,
        })
        .map_err(|err| PipelineError::Configuration(format!("failed encoding page request: {err}")))
    }
}

impl BatchSource for SearchApiSource {
    fn id(&self) -> &str {
        &self.config.source_id
    }

    fn fetch(&self, request: &PageRequest) -> Result<Batch, PipelineError> {
        let body = self.encode_request(request)?;
        debug!(
            source_id = %self.config.source_id,
            continued = !request.next.is_empty(),
            "fetching search page"
        );

        let response = self
            .agent
            .post(&self.config.endpoint)
            .header(
                "Authorization",
                &format!("Bearer {}", self.config.bearer_token),
            )
            .header("Content-Type", "application/json")
            .send(body.as_bytes())
            .map_err(|err| PipelineError::SourceUnavailable {
                source_id: self.config.source_id.clone(),
                reason: format!("search request failed: {err}"),
            })?;

        let payload = response.into_body().read_to_string().map_err(|err| {
            PipelineError::SourceUnavailable {
                source_id: self.config.source_id.clone(),
                reason: format!("failed reading search response body: {err}"),
            }
        })?;

        let page: WirePage =
            serde_json::from_str(&payload).map_err(|err| PipelineError::MalformedBatch {
                source_id: self.config.source_id.clone(),
                details: format!("failed decoding search response: {err}"),
            })?;
        Ok(page.into_batch())
    }
}
