//! Batch source interfaces and paging contracts.
//!
//! Ownership model:
//! - `BatchSource` is the pipeline-facing interface that produces one page
//!   per fetch.
//! - `PageRequest` carries the query plus the continuation token from the
//!   previous page; the paginator owns the token chain.
//! - Sources interpret the token; the pipeline only tests it for emptiness.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::constants::search_api::DEFAULT_MAX_RESULTS;
use crate::data::Batch;
use crate::errors::PipelineError;
use crate::types::{ContinuationToken, DateBound, QueryString, SourceId};

/// Source implementation modules.
pub mod sources;

/// One page fetch request.
///
/// `next` is empty on the initial fetch; every following fetch carries the
/// token returned with the previous page, so the chain is strictly
/// sequential.
#[derive(Clone, Debug)]
pub struct PageRequest {
    /// Search query forwarded to the source.
    pub query: QueryString,
    /// Optional inclusive lower date bound (`YYYYMMDDHHmm`).
    pub from_date: Option<DateBound>,
    /// Optional inclusive upper date bound (`YYYYMMDDHHmm`).
    pub to_date: Option<DateBound>,
    /// Page size requested from the source.
    pub max_results: u32,
    /// Continuation token from the previous page; empty on the initial fetch.
    pub next: ContinuationToken,
}

impl PageRequest {
    /// Create an initial request for `query` with default page size.
    pub fn new(query: impl Into<QueryString>) -> Self {
        Self {
            query: query.into(),
            from_date: None,
            to_date: None,
            max_results: DEFAULT_MAX_RESULTS,
            next: String::new(),
        }
    }

    /// Bound the request to a date window.
    pub fn with_date_range(
        mut self,
        from_date: impl Into<DateBound>,
        to_date: impl Into<DateBound>,
    ) -> Self {
        self.from_date = Some(from_date.into());
        self.to_date = Some(to_date.into());
        self
    }

    /// Override the requested page size.
    pub fn with_max_results(mut self, max_results: u32) -> Self {
        self.max_results = max_results;
        self
    }

    /// Derive the follow-up request for the page behind `token`.
    pub(crate) fn continued(&self, token: ContinuationToken) -> Self {
        let mut request = self.clone();
        request.next = token;
        request
    }
}

/// Pipeline-facing batch source interface.
///
/// Implementations must be safe to call from the paginator thread and must
/// enforce their own per-fetch deadline; a fetch that hangs forever would
/// stall the entire run.
pub trait BatchSource: Send + Sync {
    /// Stable source identifier used in errors and logs.
    fn id(&self) -> &str;
    /// Fetch the page addressed by `request`, returning the page and the
    /// token for the page after it.
    fn fetch(&self, request: &PageRequest) -> Result<Batch, PipelineError>;
}

/// In-memory source that serves a programmed page sequence, for tests and
/// offline runs.
///
/// Every fetch pops the next scripted result; once the script is exhausted,
/// fetches return an empty final batch. `fetch_count` exposes how many
/// fetches were issued so token-chain behavior is assertable.
pub struct ScriptedSource {
    id: SourceId,
    script: Mutex<VecDeque<Result<Batch, PipelineError>>>,
    fetches: AtomicUsize,
}

impl ScriptedSource {
    /// Create a scripted source serving `pages` in order.
    pub fn new(id: impl Into<SourceId>, pages: Vec<Result<Batch, PipelineError>>) -> Self {
        Self {
            id: id.into(),
            script: Mutex::new(pages.into_iter().collect()),
            fetches: AtomicUsize::new(0),
        }
    }

    /// Number of fetches issued against this source.
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

impl BatchSource for ScriptedSource {
    fn id(&self) -> &str {
        &self.id
    }

    fn fetch(&self, _request: &PageRequest) -> Result<Batch, PipelineError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        let mut script = self.script.lock().expect("scripted source lock poisoned");
        script.pop_front().unwrap_or_else(|| Ok(Batch::last(Vec::new())))
    }
}
