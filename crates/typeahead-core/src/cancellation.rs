//! Cooperative cancellation tokens.
//!
//! A [`CancellationToken`] is a shared flag. The side that owns an operation
//! calls [`cancel`](CancellationToken::cancel); the side doing the work polls
//! [`is_cancelled`](CancellationToken::is_cancelled) or, with the `tokio`
//! feature, awaits [`cancelled`](CancellationToken::cancelled).
//!
//! Cancellation is advisory. Nothing stops a worker from finishing anyway,
//! so consumers must still be prepared to receive (and discard) a result.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

#[derive(Debug, Default)]
struct CancellationState {
    cancelled: AtomicBool,
    #[cfg(feature = "tokio")]
    notify: tokio::sync::Notify,
}

/// A cloneable, thread-safe cancellation flag.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    inner: Arc<CancellationState>,
}

impl CancellationToken {
    /// Create a new, non-cancelled token.
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if cancellation has been requested.
    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::Acquire)
    }

    /// Request cancellation.
    ///
    /// Returns `true` if this call flipped the flag, `false` if the token
    /// was already cancelled.
    pub fn cancel(&self) -> bool {
        let first = !self.inner.cancelled.swap(true, Ordering::AcqRel);
        #[cfg(feature = "tokio")]
        if first {
            self.inner.notify.notify_waiters();
        }
        first
    }

    /// Wait asynchronously until cancellation is requested.
    ///
    /// Returns immediately if already cancelled.
    #[cfg(feature = "tokio")]
    pub async fn cancelled(&self) {
        loop {
            let notified = self.inner.notify.notified();
            if self.is_cancelled() {
                return;
            }
            notified.await;
        }
    }
}
