//! Single-flight guard shared by the submitter and the autoplay loop.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::trace;

/// Flag marking a request as in flight.
///
/// At most one [`BusyGuard`] exists per flag at any time. The flag clears when
/// the guard is dropped, on success and failure alike.
#[derive(Debug, Clone, Default)]
pub struct BusyFlag(Arc<AtomicBool>);

impl BusyFlag {
    /// Creates a cleared flag.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the flag, or returns `None` if it is already set.
    pub fn try_acquire(&self) -> Option<BusyGuard> {
        self.0
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| {
                trace!("Busy flag acquired");
                BusyGuard(Arc::clone(&self.0))
            })
    }

    /// Whether a guard is currently held.
    pub fn is_busy(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Clears its [`BusyFlag`] on drop.
#[derive(Debug)]
pub struct BusyGuard(Arc<AtomicBool>);

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
        trace!("Busy flag released");
    }
}
