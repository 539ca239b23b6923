//! Cooperative cancellation for long-running analyses and generators.

use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

/// Shared flag polled by long-running operations between bounded units of
/// work.
///
/// Clones share the same flag, so a controller thread can keep one clone and
/// hand another to the worker. A cancelled analysis returns a partial result;
/// only the caller knows whether it set the flag, so it must treat such a
/// result as invalid.
///
/// # Examples
/// ```
/// use epinet_core::CancelToken;
///
/// let token = CancelToken::new();
/// let remote = token.clone();
/// assert!(!token.is_cancelled());
/// remote.cancel();
/// assert!(token.is_cancelled());
/// token.reset();
/// assert!(!remote.is_cancelled());
/// ```
#[derive(Clone, Debug, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    /// Creates a token in the non-cancelled state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    /// Clears a previous cancellation request.
    pub fn reset(&self) {
        self.flag.store(false, Ordering::Relaxed);
    }

    /// Returns `true` once [`Self::cancel`] has been called.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}
