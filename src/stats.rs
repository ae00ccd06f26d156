use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use indexmap::IndexMap;

/// Shared runtime counters for one pipeline run.
///
/// Every stage holds a clone of the same `Arc`; counters are updated with
/// relaxed atomics since they feed observability and tests, not control flow.
/// `batch_queue_len`/`batch_queue_peak` track bounded-queue occupancy so
/// backpressure is observable from outside the pipeline.
#[derive(Debug, Default)]
pub struct PipelineStats {
    pages_fetched: AtomicU64,
    records_seen: AtomicU64,
    batches_tallied: AtomicU64,
    tokens_counted: AtomicU64,
    partials_merged: AtomicU64,
    batch_queue: AtomicUsize,
    batch_queue_peak: AtomicUsize,
}

impl PipelineStats {
    pub(crate) fn record_page(&self, record_count: usize) {
        self.pages_fetched.fetch_add(1, Ordering::Relaxed);
        self.records_seen
            .fetch_add(record_count as u64, Ordering::Relaxed);
    }

    pub(crate) fn record_batch_queued(&self) {
        let occupancy = self.batch_queue.fetch_add(1, Ordering::Relaxed) + 1;
        self.batch_queue_peak.fetch_max(occupancy, Ordering::Relaxed);
    }

    pub(crate) fn record_batch_dequeued(&self) {
        self.batch_queue
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |value| {
                Some(value.saturating_sub(1))
            })
            .ok();
    }

    pub(crate) fn record_batch_tallied(&self, token_count: usize) {
        self.batches_tallied.fetch_add(1, Ordering::Relaxed);
        self.tokens_counted
            .fetch_add(token_count as u64, Ordering::Relaxed);
    }

    pub(crate) fn record_partial_merged(&self) {
        self.partials_merged.fetch_add(1, Ordering::Relaxed);
    }

    /// Number of fetches issued by the paginator so far.
    pub fn pages_fetched(&self) -> u64 {
        self.pages_fetched.load(Ordering::Relaxed)
    }

    /// Number of records carried by all fetched pages so far.
    pub fn records_seen(&self) -> u64 {
        self.records_seen.load(Ordering::Relaxed)
    }

    /// Number of batches fully tallied so far.
    pub fn batches_tallied(&self) -> u64 {
        self.batches_tallied.load(Ordering::Relaxed)
    }

    /// Number of whitespace tokens counted across all tallied batches.
    pub fn tokens_counted(&self) -> u64 {
        self.tokens_counted.load(Ordering::Relaxed)
    }

    /// Number of partial maps folded into the total so far.
    pub fn partials_merged(&self) -> u64 {
        self.partials_merged.load(Ordering::Relaxed)
    }

    /// Current batch-queue occupancy estimate.
    pub fn batch_queue_len(&self) -> usize {
        self.batch_queue.load(Ordering::Relaxed)
    }

    /// Highest batch-queue occupancy estimate observed during the run.
    pub fn batch_queue_peak(&self) -> usize {
        self.batch_queue_peak.load(Ordering::Relaxed)
    }

    /// Copy the counters into a plain snapshot.
    pub fn snapshot(&self) -> RunStats {
        RunStats {
            pages_fetched: self.pages_fetched(),
            records_seen: self.records_seen(),
            batches_tallied: self.batches_tallied(),
            tokens_counted: self.tokens_counted(),
            partials_merged: self.partials_merged(),
            batch_queue_peak: self.batch_queue_peak() as u64,
        }
    }
}

/// Point-in-time copy of the run counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RunStats {
    /// Fetches issued by the paginator.
    pub pages_fetched: u64,
    /// Records carried by all fetched pages.
    pub records_seen: u64,
    /// Batches fully tallied by the worker pool.
    pub batches_tallied: u64,
    /// Whitespace tokens counted across all tallied batches.
    pub tokens_counted: u64,
    /// Partial maps folded into the total.
    pub partials_merged: u64,
    /// Highest batch-queue occupancy estimate observed.
    pub batch_queue_peak: u64,
}

impl RunStats {
    /// Counters in a stable reporting order, keyed by label.
    pub fn summary(&self) -> IndexMap<&'static str, u64> {
        IndexMap::from([
            ("pages_fetched", self.pages_fetched),
            ("records_seen", self.records_seen),
            ("batches_tallied", self.batches_tallied),
            ("tokens_counted", self.tokens_counted),
            ("partials_merged", self.partials_merged),
            ("batch_queue_peak", self.batch_queue_peak),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn queue_occupancy_saturates_at_zero() {
        let stats = PipelineStats::default();
        stats.record_batch_dequeued();
        assert_eq!(stats.batch_queue_len(), 0);

        stats.record_batch_queued();
        stats.record_batch_queued();
        stats.record_batch_dequeued();
        assert_eq!(stats.batch_queue_len(), 1);
        assert_eq!(stats.batch_queue_peak(), 2);
    }

    #[test]
    fn snapshot_summary_keeps_reporting_order() {
        let stats = PipelineStats::default();
        stats.record_page(3);
        stats.record_batch_tallied(7);
        stats.record_partial_merged();

        let summary = stats.snapshot().summary();
        let keys: Vec<&str> = summary.keys().copied().collect();
        assert_eq!(
            keys,
            vec![
                "pages_fetched",
                "records_seen",
                "batches_tallied",
                "tokens_counted",
                "partials_merged",
                "batch_queue_peak",
            ]
        );
        assert_eq!(summary["records_seen"], 3);
        assert_eq!(summary["tokens_counted"], 7);
    }
}
