//! Shared vote counter.
//!
//! The counter is the only mutable state shared between the chat listener
//! and the web layer. Handles are cheap to clone and all clones observe the
//! same value.

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

/// Process-wide vote counter.
///
/// Backed by a single atomic, so concurrent increments from the chat task
/// never lose updates and stream subscribers can read without locking.
#[derive(Debug, Clone, Default)]
pub struct CounterStore {
    value: Arc<AtomicI64>,
}

impl CounterStore {
    /// Create a store starting at 0.
    pub fn new() -> Self {
        Self::default()
    }

    /// Atomically add `delta` and return the new value.
    ///
    /// Wraps on overflow, matching `AtomicI64::fetch_add`.
    pub fn increment(&self, delta: i64) -> i64 {
        self.value
            .fetch_add(delta, Ordering::AcqRel)
            .wrapping_add(delta)
    }

    /// Current value.
    pub fn read(&self) -> i64 {
        self.value.load(Ordering::Acquire)
    }

    /// Set the value back to 0 and return the value it replaced.
    pub fn reset(&self) -> i64 {
        self.value.swap(0, Ordering::AcqRel)
    }
}
