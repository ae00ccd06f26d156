/// Constants used by pipeline queue sizing and worker pools.
pub mod pipeline {
    /// Bounded capacity of the batch and partial-tally queues.
    pub const DEFAULT_QUEUE_DEPTH: usize = 8;
    /// Lower clamp for the tally worker pool size.
    pub const MIN_WORKER_COUNT: usize = 4;
    /// Upper clamp for the tally worker pool size.
    pub const MAX_WORKER_COUNT: usize = 8;
    /// Number of ranked words in a completed result.
    pub const TOP_WORD_COUNT: usize = 10;
}

/// Constants used by the remote search-API source.
pub mod search_api {
    /// Default source id used in records, errors, and logs.
    pub const DEFAULT_SOURCE_ID: &str = "search_api";
    /// Default full-archive search endpoint.
    pub const DEFAULT_ENDPOINT: &str =
        "https://api.twitter.com/1.1/tweets/search/fullarchive/prod.json";
    /// Default per-fetch deadline in seconds.
    pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
    /// Default page size requested from the remote service.
    pub const DEFAULT_MAX_RESULTS: u32 = 100;
}

/// Constants used by the fixture-file source.
pub mod fixture {
    /// Default source id used by fixture-file replays.
    pub const DEFAULT_SOURCE_ID: &str = "fixture_file";
}

/// Constants used by search-record persistence.
pub mod persist {
    /// Default directory for the append-only search store.
    pub const DEFAULT_STORE_DIR: &str = ".topwords_store";
    /// Default filename for the append-only search store.
    pub const DEFAULT_STORE_FILENAME: &str = "searches.jsonl";
}
