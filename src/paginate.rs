use std::sync::mpsc;
use std::sync::Arc;
use std::thread;

use tracing::debug;

use crate::cancel::CancelToken;
use crate::config::PipelineOptions;
use crate::data::Batch;
use crate::errors::PipelineError;
use crate::source::{BatchSource, PageRequest};
use crate::stats::PipelineStats;

/// Paginator stage: a producer thread that chains continuation tokens and
/// fills a bounded batch queue.
///
/// Pushing blocks while the queue holds `queue_depth` batches, so a slow
/// tally stage applies backpressure all the way to the source. The queue
/// closes exactly once, when the producer returns: on an empty token, after
/// forwarding a fetch error in-band, on cancellation, or when the consumer
/// side is gone.
pub struct BatchFeed {
    receiver: Option<mpsc::Receiver<Result<Batch, PipelineError>>>,
    handle: Option<thread::JoinHandle<()>>,
}

impl BatchFeed {
    /// Start paginating `source` from `request` into a bounded queue.
    pub fn spawn(
        source: Arc<dyn BatchSource>,
        request: PageRequest,
        options: &PipelineOptions,
        cancel: CancelToken,
        stats: Arc<PipelineStats>,
    ) -> Self {
        let (sender, receiver) = mpsc::sync_channel(options.queue_depth.max(1));
        let handle = thread::spawn(move || {
            let mut request = request;
            loop {
                if cancel.is_cancelled() {
                    debug!(source_id = %source.id(), "paginator cancelled");
                    return;
                }
                let batch = match source.fetch(&request) {
                    Ok(batch) => batch,
                    Err(err) => {
                        // Forward in-band; a fetch failure must never read as
                        // legitimate end-of-pagination.
                        let _ = sender.send(Err(err));
                        return;
                    }
                };
                stats.record_page(batch.records.len());
                let next = batch.next.clone();
                if sender.send(Ok(batch)).is_err() {
                    return;
                }
                stats.record_batch_queued();
                if next.is_empty() {
                    debug!(
                        source_id = %source.id(),
                        pages = stats.pages_fetched(),
                        "pagination exhausted"
                    );
                    return;
                }
                request = request.continued(next);
            }
        });
        Self {
            receiver: Some(receiver),
            handle: Some(handle),
        }
    }

    /// Hand the batch queue to the tally stage. The feed keeps owning the
    /// producer thread so it is joined when the feed drops.
    pub(crate) fn take_receiver(
        &mut self,
    ) -> Option<mpsc::Receiver<Result<Batch, PipelineError>>> {
        self.receiver.take()
    }
}

impl Drop for BatchFeed {
    fn drop(&mut self) {
        self.receiver.take();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}
