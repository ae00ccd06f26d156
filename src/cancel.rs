use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Run-scoped cancellation flag shared by every pipeline stage.
///
/// The paginator checks it before each fetch, tally workers check it before
/// each batch, and the aggregator reports `PipelineError::Cancelled` when a
/// drained run observed it. Cloning shares the same flag.
#[derive(Clone, Debug, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    /// Create a fresh, untriggered token.
    pub fn new() -> Self {
        Self::default()
    }

    /// Trigger cancellation for every stage holding a clone.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    /// Returns `true` once any clone has been cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}
