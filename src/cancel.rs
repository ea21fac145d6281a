//! Cooperative cancellation for in-flight principal fetches.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

/// Cancellation token shared between a resolution scope and its fetches.
///
/// Cancellation is advisory cleanup: the cache merge is additive and
/// first-write-wins, so a fetch that completes after cancellation does no
/// harm if its result still gets merged. The recorded reason follows the
/// same rule: the first cancellation names the reason, later calls are
/// no-ops.
#[derive(Clone, Debug, Default)]
pub struct CancellationToken {
    flag: Arc<AtomicBool>,
    reason: Arc<Mutex<Option<String>>>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cancels the scope. Only the first call records its reason.
    pub fn cancel(&self, reason: impl Into<String>) {
        let mut guard = self.reason.lock().unwrap();
        if !self.flag.swap(true, Ordering::SeqCst) {
            *guard = Some(reason.into());
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    pub fn reason(&self) -> Option<String> {
        self.reason.lock().unwrap().clone()
    }

    pub fn abort_reason(&self) -> String {
        self.reason().unwrap_or_else(|| "cancelled".to_string())
    }
}
