use std::error::Error;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;

use crate::config::PipelineOptions;
use crate::persist::JsonlFileSink;
use crate::search::{SearchQuery, SearchRunner};
use crate::source::sources::FixtureFileSource;

#[derive(Debug, Parser)]
#[command(
    name = "file_search_demo",
    disable_help_subcommand = true,
    about = "Run a top-words search against a captured fixture file",
    long_about = "Replay a captured search response through the full pipeline \
        (paginator, tally pool, aggregator), print the ranked result as \
        indented JSON, and append it to the search store."
)]
/// CLI for `file_search_demo`.
///
/// Common usage:
/// - Keep the default store location: `.topwords_store/searches.jsonl`
/// - Set an explicit store path: `--store-path /tmp/searches.jsonl`
/// - Size the pool explicitly: `--workers 4 --queue-depth 8`
struct FileSearchCli {
    #[arg(long, value_name = "PATH", help = "Captured search response to replay")]
    fixture: PathBuf,
    #[arg(long, help = "Query string recorded with the persisted result")]
    query: String,
    #[arg(
        long = "store-path",
        value_name = "PATH",
        help = "Optional search store override"
    )]
    store_path: Option<PathBuf>,
    #[arg(long, help = "Optional tally worker count override")]
    workers: Option<usize>,
    #[arg(long = "queue-depth", help = "Optional queue depth override")]
    queue_depth: Option<usize>,
}

/// Run the fixture-file search demo with the provided CLI arguments.
pub fn run_file_search_demo(
    args: impl Iterator<Item = String>,
) -> Result<(), Box<dyn Error>> {
    let cli = FileSearchCli::try_parse_from(std::iter::once("file_search_demo".to_string()).chain(args))?;

    let mut options = PipelineOptions::default();
    if let Some(workers) = cli.workers {
        options = options.with_worker_count(workers);
    }
    if let Some(queue_depth) = cli.queue_depth {
        options = options.with_queue_depth(queue_depth);
    }

    let source = Arc::new(FixtureFileSource::new(&cli.fixture));
    let sink = Arc::new(match &cli.store_path {
        Some(path) => JsonlFileSink::new(path)?,
        None => JsonlFileSink::default_store()?,
    });
    let store_path = sink.path().to_path_buf();

    let runner = SearchRunner::new(source, sink).with_options(options);
    let outcome = runner.run(&SearchQuery::new(cli.query))?;

    println!("{}", outcome.record.to_pretty_json()?);
    for (label, value) in outcome.stats.summary() {
        eprintln!("[topwords:demo] {label}={value}");
    }
    match outcome.save_error {
        Some(err) => eprintln!("[topwords:demo] save failed: {err}"),
        None => eprintln!("[topwords:demo] appended to {}", store_path.display()),
    }
    Ok(())
}
