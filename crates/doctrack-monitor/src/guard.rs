use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// In-process flag that keeps monitor passes from overlapping.
///
/// A scheduler tick that arrives while the previous pass is still running
/// must fail fast instead of racing it on the dedupe ledgers.
#[derive(Debug, Clone, Default)]
pub struct RunGuard {
    in_flight: Arc<AtomicBool>,
}

impl RunGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claims the guard. Returns `None` when a pass already holds it.
    pub fn try_acquire(&self) -> Option<PassToken> {
        self.in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| PassToken {
                in_flight: Arc::clone(&self.in_flight),
            })
    }

    pub fn is_running(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }
}

/// RAII claim on a [`RunGuard`]; released on drop, including error paths.
#[derive(Debug)]
pub struct PassToken {
    in_flight: Arc<AtomicBool>,
}

impl Drop for PassToken {
    fn drop(&mut self) {
        self.in_flight.store(false, Ordering::Release);
    }
}
