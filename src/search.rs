use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};

use crate::aggregate;
use crate::cancel::CancelToken;
use crate::config::PipelineOptions;
use crate::constants::search_api::DEFAULT_MAX_RESULTS;
use crate::data::SearchRecord;
use crate::errors::PipelineError;
use crate::paginate::BatchFeed;
use crate::persist::TopWordsSink;
use crate::source::{BatchSource, PageRequest};
use crate::stats::{PipelineStats, RunStats};
use crate::tally::TallyPool;
use crate::types::{DateBound, QueryString};

/// One search request as submitted by a caller.
#[derive(Clone, Debug)]
pub struct SearchQuery {
    /// Free-text query forwarded to the batch source.
    pub query: QueryString,
    /// Optional inclusive lower date bound (`YYYYMMDDHHmm`).
    pub from_date: Option<DateBound>,
    /// Optional inclusive upper date bound (`YYYYMMDDHHmm`).
    pub to_date: Option<DateBound>,
    /// Page size requested per fetch.
    pub max_results: u32,
}

impl SearchQuery {
    /// Create a query with default page size and no date bounds.
    pub fn new(query: impl Into<QueryString>) -> Self {
        Self {
            query: query.into(),
            from_date: None,
            to_date: None,
            max_results: DEFAULT_MAX_RESULTS,
        }
    }

    /// Bound the search to a date window.
    pub fn with_date_range(
        mut self,
        from_date: impl Into<DateBound>,
        to_date: impl Into<DateBound>,
    ) -> Self {
        self.from_date = Some(from_date.into());
        self.to_date = Some(to_date.into());
        self
    }

    /// Override the page size requested per fetch.
    pub fn with_max_results(mut self, max_results: u32) -> Self {
        self.max_results = max_results;
        self
    }

    fn initial_request(&self) -> PageRequest {
        let mut request = PageRequest::new(self.query.clone()).with_max_results(self.max_results);
        if let (Some(from_date), Some(to_date)) = (&self.from_date, &self.to_date) {
            request = request.with_date_range(from_date.clone(), to_date.clone());
        }
        request
    }
}

/// Result of one completed run: the persisted record, whether persisting it
/// failed, and the run counters.
#[derive(Debug)]
pub struct SearchOutcome {
    /// The completed, ranked search record.
    pub record: SearchRecord,
    /// Set when the sink rejected the record; the record itself is still valid.
    pub save_error: Option<PipelineError>,
    /// Counters captured at the end of the run.
    pub stats: RunStats,
}

/// Entry point wiring a batch source, the three pipeline stages, and a sink.
///
/// One runner serves many runs; each run builds its own queues, workers, and
/// counters, so concurrent runs do not share mutable state.
pub struct SearchRunner {
    source: Arc<dyn BatchSource>,
    sink: Arc<dyn TopWordsSink>,
    options: PipelineOptions,
}

impl SearchRunner {
    /// Create a runner with default pipeline options.
    pub fn new(source: Arc<dyn BatchSource>, sink: Arc<dyn TopWordsSink>) -> Self {
        Self {
            source,
            sink,
            options: PipelineOptions::default(),
        }
    }

    /// Override the pipeline sizing options.
    pub fn with_options(mut self, options: PipelineOptions) -> Self {
        self.options = options;
        self
    }

    /// Run one search to completion and persist the result.
    pub fn run(&self, query: &SearchQuery) -> Result<SearchOutcome, PipelineError> {
        self.run_with_cancel(query, &CancelToken::new())
    }

    /// Run one search under an external cancellation token.
    ///
    /// Cancelling mid-run stops further fetches, makes live workers abandon
    /// their in-flight batch, and resolves to `PipelineError::Cancelled`.
    pub fn run_with_cancel(
        &self,
        query: &SearchQuery,
        cancel: &CancelToken,
    ) -> Result<SearchOutcome, PipelineError> {
        self.options.validated()?;
        if query.query.trim().is_empty() {
            return Err(PipelineError::Configuration(
                "search query must not be empty".to_string(),
            ));
        }

        let time_of_search = Utc::now();
        let stats = Arc::new(PipelineStats::default());

        let feed = BatchFeed::spawn(
            Arc::clone(&self.source),
            query.initial_request(),
            &self.options,
            cancel.clone(),
            Arc::clone(&stats),
        );
        let pool = TallyPool::spawn(feed, &self.options, cancel.clone(), Arc::clone(&stats));
        let top_words = aggregate::drain(pool, cancel)?;

        let record = SearchRecord {
            time_of_search,
            query: query.query.clone(),
            top_words,
        };
        let save_error = match self.sink.save(&record) {
            Ok(()) => None,
            Err(err) => {
                warn!(query = %record.query, error = %err, "completed search could not be persisted");
                Some(err)
            }
        };

        let stats = stats.snapshot();
        info!(
            query = %record.query,
            pages = stats.pages_fetched,
            records = stats.records_seen,
            tokens = stats.tokens_counted,
            "search run complete"
        );
        Ok(SearchOutcome {
            record,
            save_error,
            stats,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{Batch, Record};
    use crate::persist::MemorySink;
    use crate::source::ScriptedSource;

    #[test]
    fn empty_query_is_rejected_before_spawning_anything() {
        let source = Arc::new(ScriptedSource::new("scripted", Vec::new()));
        let runner = SearchRunner::new(source.clone(), Arc::new(MemorySink::new()));
        let err = runner.run(&SearchQuery::new("   ")).unwrap_err();
        assert!(matches!(err, PipelineError::Configuration(_)));
        assert_eq!(source.fetch_count(), 0);
    }

    #[test]
    fn save_failure_is_surfaced_next_to_the_completed_record() {
        let source = Arc::new(ScriptedSource::new(
            "scripted",
            vec![Ok(Batch::last(vec![Record::new("ruby ruby rails")]))],
        ));
        let runner = SearchRunner::new(source, Arc::new(MemorySink::failing("store offline")));

        let outcome = runner.run(&SearchQuery::new("ruby")).unwrap();
        assert_eq!(outcome.record.top_words.distinct_len(), 2);
        assert!(matches!(
            outcome.save_error,
            Some(PipelineError::Persistence(_))
        ));
    }
}
