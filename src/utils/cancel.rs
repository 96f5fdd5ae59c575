//! Cancellation utilities
//!
//! Provides first-class cancellation handles for calls, page sequences and
//! streamed bodies.

use std::future::Future;
use tokio_util::sync::CancellationToken;

/// A handle that can be used to request cancellation.
///
/// Clones share the same signal. Attach one to a call with `with_cancel`.
#[derive(Clone, Debug, Default)]
pub struct CancelHandle {
    token: CancellationToken,
}

impl CancelHandle {
    /// Create a new, untriggered cancel handle.
    pub fn new() -> Self {
        Self {
            token: CancellationToken::new(),
        }
    }

    /// Request cancellation. Calls observing this handle stop at their next
    /// suspension point; dropping the abandoned response closes the
    /// underlying connection.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Check if cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// A future that resolves when cancellation is requested.
    pub fn cancelled(&self) -> tokio_util::sync::WaitForCancellationFuture<'_> {
        self.token.cancelled()
    }
}

/// Create a standalone cancel handle that can be shared across tasks.
pub fn new_cancel_handle() -> CancelHandle {
    CancelHandle::new()
}

/// Drive `future` unless `cancel` fires first.
///
/// Returns `None` when cancelled; the future is dropped at its current
/// suspension point.
pub(crate) async fn run_cancellable<F>(cancel: Option<&CancelHandle>, future: F) -> Option<F::Output>
where
    F: Future,
{
    match cancel {
        None => Some(future.await),
        Some(handle) => {
            tokio::select! {
                biased;
                _ = handle.cancelled() => None,
                out = future => Some(out),
            }
        }
    }
}
