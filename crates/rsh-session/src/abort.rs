//! Cancellation shared between signal handlers and blocking waits.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::Notify;

#[derive(Debug, Default)]
struct Inner {
    aborted: AtomicBool,
    notify: Notify,
}

/// Process-wide abort flag.
///
/// Cloning yields another handle to the same flag. Once triggered it stays
/// set. Waits race against [`AbortSignal::aborted`] so that an abort ends
/// them immediately instead of after their timeout.
#[derive(Debug, Clone, Default)]
pub struct AbortSignal {
    inner: Arc<Inner>,
}

impl AbortSignal {
    /// Create a new, untriggered signal.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the flag and wake every pending waiter.
    pub fn trigger(&self) {
        self.inner.aborted.store(true, Ordering::SeqCst);
        self.inner.notify.notify_waiters();
    }

    /// Whether the flag has been set.
    pub fn is_aborted(&self) -> bool {
        self.inner.aborted.load(Ordering::SeqCst)
    }

    /// Resolve once the flag is set. Returns immediately if it already is.
    pub async fn aborted(&self) {
        loop {
            let notified = self.inner.notify.notified();
            tokio::pin!(notified);
            // Register before checking the flag so a trigger in between is not lost.
            notified.as_mut().enable();

            if self.is_aborted() {
                return;
            }

            notified.await;
        }
    }
}
