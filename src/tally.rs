use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::thread;

use tracing::debug;

use crate::cancel::CancelToken;
use crate::config::PipelineOptions;
use crate::data::{Batch, FrequencyMap};
use crate::errors::PipelineError;
use crate::paginate::BatchFeed;
use crate::stats::PipelineStats;

/// Tally a single batch into a partial frequency map.
///
/// Tokenization splits each record's effective text on runs of whitespace
/// and discards empty tokens. Case and punctuation are preserved: the counts
/// stay reproducible against the raw source data, and any normalization is a
/// caller-visible choice rather than a hidden step.
pub fn tally_batch(batch: &Batch) -> FrequencyMap {
    let mut tally = FrequencyMap::new();
    for record in &batch.records {
        for word in record.effective_text().split_whitespace() {
            *tally.entry(word.to_string()).or_insert(0) += 1;
        }
    }
    tally
}

/// Tally stage: a bounded pool of workers pulling batches from the paginator
/// queue and pushing partial maps onto a second bounded queue.
///
/// Workers share the batch receiver behind a mutex; each builds its own
/// local map, so no tally state is ever shared between workers. Every worker
/// owns a clone of the partial-queue sender, which means the partial queue
/// closes only after the last worker has exited; the aggregator can never
/// observe a premature end-of-stream.
pub struct TallyPool {
    receiver: Option<mpsc::Receiver<Result<FrequencyMap, PipelineError>>>,
    workers: Vec<thread::JoinHandle<()>>,
    stats: Arc<PipelineStats>,
    _feed: BatchFeed,
}

impl TallyPool {
    /// Start `options.worker_count` workers over the feed's batch queue.
    pub fn spawn(
        mut feed: BatchFeed,
        options: &PipelineOptions,
        cancel: CancelToken,
        stats: Arc<PipelineStats>,
    ) -> Self {
        let batches = Arc::new(Mutex::new(
            feed.take_receiver().expect("batch feed already consumed"),
        ));
        let (sender, receiver) = mpsc::sync_channel(options.queue_depth.max(1));

        let worker_count = options.worker_count.max(1);
        let mut workers = Vec::with_capacity(worker_count);
        for worker_id in 0..worker_count {
            let batches = Arc::clone(&batches);
            let sender = sender.clone();
            let cancel = cancel.clone();
            let stats = Arc::clone(&stats);
            workers.push(thread::spawn(move || {
                Self::run_worker(worker_id, batches, sender, cancel, stats)
            }));
        }
        drop(sender);

        Self {
            receiver: Some(receiver),
            workers,
            stats,
            _feed: feed,
        }
    }

    fn run_worker(
        worker_id: usize,
        batches: Arc<Mutex<mpsc::Receiver<Result<Batch, PipelineError>>>>,
        sender: mpsc::SyncSender<Result<FrequencyMap, PipelineError>>,
        cancel: CancelToken,
        stats: Arc<PipelineStats>,
    ) {
        loop {
            let item = {
                let guard = batches.lock().expect("batch queue lock poisoned");
                guard.recv()
            };
            let item = match item {
                Ok(item) => item,
                Err(_) => return,
            };
            match item {
                Ok(batch) => {
                    stats.record_batch_dequeued();
                    if cancel.is_cancelled() {
                        debug!(worker_id, "tally worker abandoning in-flight batch");
                        return;
                    }
                    let partial = tally_batch(&batch);
                    let token_count: u64 = partial.values().sum();
                    stats.record_batch_tallied(token_count as usize);
                    if sender.send(Ok(partial)).is_err() {
                        return;
                    }
                }
                Err(err) => {
                    // A paginator failure poisons the whole run: cancel the
                    // siblings and forward the error to the aggregator.
                    cancel.cancel();
                    let _ = sender.send(Err(err));
                    return;
                }
            }
        }
    }

    /// Hand the partial queue to the aggregator. The pool keeps owning the
    /// worker threads so they are joined when the pool drops.
    pub(crate) fn take_receiver(
        &mut self,
    ) -> Option<mpsc::Receiver<Result<FrequencyMap, PipelineError>>> {
        self.receiver.take()
    }

    pub(crate) fn stats(&self) -> Arc<PipelineStats> {
        Arc::clone(&self.stats)
    }
}

impl Drop for TallyPool {
    fn drop(&mut self) {
        self.receiver.take();
        for handle in self.workers.drain(..) {
            let _ = handle.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Record;

    #[test]
    fn tally_splits_on_whitespace_runs_and_keeps_case() {
        let batch = Batch::last(vec![
            Record::new("Ruby  ruby\truby!\n rails"),
            Record::new(""),
        ]);
        let tally = tally_batch(&batch);
        assert_eq!(tally.get("Ruby"), Some(&1));
        assert_eq!(tally.get("ruby"), Some(&1));
        assert_eq!(tally.get("ruby!"), Some(&1));
        assert_eq!(tally.get("rails"), Some(&1));
        assert_eq!(tally.len(), 4);
    }

    #[test]
    fn tally_uses_overflow_text_when_present() {
        let batch = Batch::last(vec![Record::extended("cut…", "alpha beta alpha")]);
        let tally = tally_batch(&batch);
        assert_eq!(tally.get("alpha"), Some(&2));
        assert_eq!(tally.get("beta"), Some(&1));
        assert_eq!(tally.get("cut…"), None);
    }

    #[test]
    fn whitespace_only_text_yields_no_tokens() {
        let batch = Batch::last(vec![Record::new("  \t \n ")]);
        assert!(tally_batch(&batch).is_empty());
    }
}
