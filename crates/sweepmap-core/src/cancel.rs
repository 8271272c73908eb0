/// Cooperative cancellation shared between a caller and background work.
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Cheaply clonable cancellation flag.
///
/// All clones observe the same flag. Long-running operations poll
/// [`is_cancelled`](Self::is_cancelled) at their checkpoints (per scanned
/// entry, per hashed file) and bail out with a `Cancelled` error.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    flag: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request that all work observing this token stop as soon as possible.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    /// Check whether cancellation has been requested.
    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}
