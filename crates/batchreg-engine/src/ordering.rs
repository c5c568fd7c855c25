//! Host-supplied ordering counter used to timestamp recall flags.
//!
//! The registry never reads wall-clock time. The host hands it a monotonic
//! counter (block height, log sequence number, ...) through
//! [`OrderingSource`].

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// A monotonically non-decreasing counter supplied by the host.
pub trait OrderingSource: Send + Sync {
    /// The current ordering value.
    fn current(&self) -> u64;
}

/// Counter the host advances explicitly.
///
/// Clones share the same counter, so the host can keep one handle and give
/// another to the registry.
#[derive(Clone, Debug, Default)]
pub struct ManualOrdering {
    value: Arc<AtomicU64>,
}

impl ManualOrdering {
    pub fn new(start: u64) -> Self {
        Self {
            value: Arc::new(AtomicU64::new(start)),
        }
    }

    /// Move the counter to `value`. Values below the current one are ignored.
    pub fn set(&self, value: u64) {
        self.value.fetch_max(value, Ordering::SeqCst);
    }

    /// Advance by one and return the new value.
    pub fn advance(&self) -> u64 {
        self.value.fetch_add(1, Ordering::SeqCst) + 1
    }
}

impl OrderingSource for ManualOrdering {
    fn current(&self) -> u64 {
        self.value.load(Ordering::SeqCst)
    }
}

/// Counter that advances on every read, starting at 1.
///
/// Used when the registry runs outside a host that provides its own
/// sequencing.
#[derive(Debug, Default)]
pub struct TickingOrdering {
    last: AtomicU64,
}

impl TickingOrdering {
    pub fn new() -> Self {
        Self::default()
    }
}

impl OrderingSource for TickingOrdering {
    fn current(&self) -> u64 {
        self.last.fetch_add(1, Ordering::SeqCst) + 1
    }
}
