use std::thread;

use crate::constants::pipeline::{DEFAULT_QUEUE_DEPTH, MAX_WORKER_COUNT, MIN_WORKER_COUNT};
use crate::errors::PipelineError;

/// Sizing knobs for one pipeline run.
///
/// Queue depth bounds both the batch queue and the partial-tally queue, so a
/// slow downstream stage blocks its producer instead of buffering without
/// limit. Worker count bounds the tally pool; batches are pulled from a
/// shared queue, never one thread per batch.
#[derive(Clone, Debug)]
pub struct PipelineOptions {
    /// Bounded capacity of each inter-stage queue.
    pub queue_depth: usize,
    /// Number of tally workers pulling from the batch queue.
    pub worker_count: usize,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            queue_depth: DEFAULT_QUEUE_DEPTH,
            worker_count: default_worker_count(),
        }
    }
}

impl PipelineOptions {
    /// Override the inter-stage queue capacity.
    pub fn with_queue_depth(mut self, queue_depth: usize) -> Self {
        self.queue_depth = queue_depth;
        self
    }

    /// Override the tally worker pool size.
    pub fn with_worker_count(mut self, worker_count: usize) -> Self {
        self.worker_count = worker_count;
        self
    }

    /// Validate that both bounds are usable.
    pub fn validated(&self) -> Result<(), PipelineError> {
        if self.queue_depth == 0 {
            return Err(PipelineError::Configuration(
                "queue depth must be at least 1".to_string(),
            ));
        }
        if self.worker_count == 0 {
            return Err(PipelineError::Configuration(
                "worker count must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Default tally pool size: available parallelism clamped to the configured range.
pub fn default_worker_count() -> usize {
    thread::available_parallelism()
        .map(|count| count.get())
        .unwrap_or(MIN_WORKER_COUNT)
        .clamp(MIN_WORKER_COUNT, MAX_WORKER_COUNT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_worker_count_stays_in_range() {
        let count = default_worker_count();
        assert!((MIN_WORKER_COUNT..=MAX_WORKER_COUNT).contains(&count));
    }

    #[test]
    fn zero_bounds_are_rejected() {
        assert!(
            PipelineOptions::default()
                .with_queue_depth(0)
                .validated()
                .is_err()
        );
        assert!(
            PipelineOptions::default()
                .with_worker_count(0)
                .validated()
                .is_err()
        );
        assert!(PipelineOptions::default().validated().is_ok());
    }
}
