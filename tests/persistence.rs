use std::fs;
use std::sync::Arc;

use tempfile::tempdir;
use topwords::{
    Batch, JsonlFileSink, MemorySink, PipelineError, Record, ScriptedSource, SearchQuery,
    SearchRecord, SearchRunner,
};

fn single_page_source(text: &str) -> Arc<ScriptedSource> {
    Arc::new(ScriptedSource::new(
        "scripted",
        vec![Ok(Batch::last(vec![Record::new(text)]))],
    ))
}

#[test]
fn completed_searches_append_to_the_store_in_order() {
    let temp = tempdir().unwrap();
    let sink = Arc::new(JsonlFileSink::in_dir(temp.path()).unwrap());

    let first_runner = SearchRunner::new(single_page_source("ruby ruby rails"), sink.clone());
    first_runner.run(&SearchQuery::new("ruby")).unwrap();

    let second_runner = SearchRunner::new(single_page_source("go gopher"), sink.clone());
    second_runner.run(&SearchQuery::new("golang")).unwrap();

    let contents = fs::read_to_string(sink.path()).unwrap();
    let records: Vec<SearchRecord> = contents
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].query, "ruby");
    assert_eq!(records[1].query, "golang");
    assert!(records[0].time_of_search <= records[1].time_of_search);
}

#[test]
fn persisted_document_matches_the_caller_facing_shape() {
    let temp = tempdir().unwrap();
    let sink = Arc::new(JsonlFileSink::in_dir(temp.path()).unwrap());
    let runner = SearchRunner::new(single_page_source("ruby gems ruby"), sink.clone());
    runner.run(&SearchQuery::new("ruby")).unwrap();

    let contents = fs::read_to_string(sink.path()).unwrap();
    let document: serde_json::Value = serde_json::from_str(contents.trim_end()).unwrap();

    assert!(document["time_of_search"].is_string());
    assert_eq!(document["query"], "ruby");
    let top_words = document["top_words"].as_array().unwrap();
    assert_eq!(top_words.len(), 10);
    assert_eq!(top_words[0]["word"], "ruby");
    assert_eq!(top_words[0]["count"], 2);
    // Placeholder entries are literal zero-valued documents, not omissions.
    assert_eq!(top_words[9]["word"], "");
    assert_eq!(top_words[9]["count"], 0);
}

#[test]
fn save_failure_does_not_invalidate_the_computed_result() {
    let sink = Arc::new(MemorySink::failing("collection quota exceeded"));
    let runner = SearchRunner::new(single_page_source("ruby rails"), sink);

    let outcome = runner.run(&SearchQuery::new("ruby")).unwrap();
    assert_eq!(outcome.record.top_words.distinct_len(), 2);
    match outcome.save_error {
        Some(PipelineError::Persistence(reason)) => {
            assert_eq!(reason, "collection quota exceeded");
        }
        other => panic!("expected Persistence failure, got {other:?}"),
    }
}
