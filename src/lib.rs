#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

/// Merging partial tallies and ranking the top-K words.
pub mod aggregate;
/// Run-scoped cancellation signal.
pub mod cancel;
/// Pipeline sizing options.
pub mod config;
/// Centralized constants used across pipeline, sources, and persistence.
pub mod constants;
/// Record, batch, frequency, and result types.
pub mod data;
/// Reusable demo runners shared by the demos/ wrappers.
pub mod example_apps;
/// Pagination of a batch source into a bounded queue.
pub mod paginate;
/// Persistence sinks for completed search records.
pub mod persist;
/// Search entry point wiring source, pipeline, and sink.
pub mod search;
/// Batch source traits and built-in sources.
pub mod source;
/// Pipeline runtime counters.
pub mod stats;
/// Concurrent batch tallying.
pub mod tally;
/// Shared type aliases.
pub mod types;

mod errors;

pub use aggregate::{merge, top_k};
pub use cancel::CancelToken;
pub use config::{PipelineOptions, default_worker_count};
pub use data::{Batch, FrequencyMap, RankedWord, Record, SearchRecord, TopKResult};
pub use errors::PipelineError;
pub use paginate::BatchFeed;
pub use persist::{JsonlFileSink, MemorySink, TopWordsSink};
pub use search::{SearchOutcome, SearchQuery, SearchRunner};
pub use source::sources::{FixtureFileSource, SearchApiConfig, SearchApiSource};
pub use source::{BatchSource, PageRequest, ScriptedSource};
pub use stats::{PipelineStats, RunStats};
pub use tally::{TallyPool, tally_batch};
pub use types::{ContinuationToken, DateBound, QueryString, SourceId, Word};
