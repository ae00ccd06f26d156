use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use topwords::{
    Batch, BatchSource, CancelToken, MemorySink, PageRequest, PipelineError, Record,
    ScriptedSource, SearchQuery, SearchRunner,
};

/// Endless source that trips a cancellation token during its Nth fetch.
struct CancellingSource {
    cancel: CancelToken,
    trigger_at: usize,
    fetches: AtomicUsize,
}

impl CancellingSource {
    fn new(cancel: CancelToken, trigger_at: usize) -> Self {
        Self {
            cancel,
            trigger_at,
            fetches: AtomicUsize::new(0),
        }
    }

    fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

impl BatchSource for CancellingSource {
    fn id(&self) -> &str {
        "cancelling"
    }

    fn fetch(&self, _request: &PageRequest) -> Result<Batch, PipelineError> {
        let fetch_number = self.fetches.fetch_add(1, Ordering::SeqCst) + 1;
        if fetch_number == self.trigger_at {
            self.cancel.cancel();
        }
        Ok(Batch::new(
            vec![Record::new("never reported")],
            format!("t{fetch_number}"),
        ))
    }
}

#[test]
fn pre_cancelled_run_resolves_without_fetching() {
    let source = Arc::new(ScriptedSource::new("scripted", Vec::new()));
    let runner = SearchRunner::new(source.clone(), Arc::new(MemorySink::new()));
    let cancel = CancelToken::new();
    cancel.cancel();

    let err = runner
        .run_with_cancel(&SearchQuery::new("ruby"), &cancel)
        .unwrap_err();
    assert!(err.is_cancelled());
    assert_eq!(source.fetch_count(), 0);
}

#[test]
fn mid_run_cancellation_stops_fetching_and_reports_cancelled() {
    let cancel = CancelToken::new();
    let source = Arc::new(CancellingSource::new(cancel.clone(), 3));
    let sink = Arc::new(MemorySink::new());
    let runner = SearchRunner::new(source.clone(), sink.clone());

    let err = runner
        .run_with_cancel(&SearchQuery::new("ruby"), &cancel)
        .unwrap_err();
    assert!(err.is_cancelled());
    // The paginator observes the token before the next fetch, so the endless
    // source is fetched exactly up to the trigger.
    assert_eq!(source.fetch_count(), 3);
    assert!(sink.saved().is_empty());
}

#[test]
fn fetch_failure_aborts_the_run_with_no_partial_result() {
    let source = Arc::new(ScriptedSource::new(
        "flaky",
        vec![
            Ok(Batch::new(vec![Record::new("counted then discarded")], "t1")),
            Err(PipelineError::SourceUnavailable {
                source_id: "flaky".to_string(),
                reason: "timed out".to_string(),
            }),
        ],
    ));
    let sink = Arc::new(MemorySink::new());
    let runner = SearchRunner::new(source, sink.clone());

    let err = runner.run(&SearchQuery::new("ruby")).unwrap_err();
    match &err {
        PipelineError::SourceUnavailable { source_id, reason } => {
            assert_eq!(source_id, "flaky");
            assert_eq!(reason, "timed out");
        }
        other => panic!("expected SourceUnavailable, got {other}"),
    }
    assert!(!err.is_cancelled());
    assert!(sink.saved().is_empty());
}

#[test]
fn malformed_page_aborts_the_run_distinctly() {
    let source = Arc::new(ScriptedSource::new(
        "decoder",
        vec![Err(PipelineError::MalformedBatch {
            source_id: "decoder".to_string(),
            details: "unexpected end of document".to_string(),
        })],
    ));
    let sink = Arc::new(MemorySink::new());
    let runner = SearchRunner::new(source, sink.clone());

    let err = runner.run(&SearchQuery::new("ruby")).unwrap_err();
    assert!(matches!(err, PipelineError::MalformedBatch { .. }));
    assert!(!err.is_cancelled());
    assert!(sink.saved().is_empty());
}
