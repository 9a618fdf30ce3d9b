//! Monotonic counters for policy-governed data drops.
//!
//! Dropped-late and dropped-closed-window events are observable only through
//! these counters and diagnostic traces, never as errors.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// A monotonic counter cell. Clones share the underlying cell.
#[derive(Debug, Clone, Default)]
pub struct Counter(Arc<AtomicU64>);

impl Counter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn inc(&self) {
        self.0.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add(&self, count: u64) {
        self.0.fetch_add(count, Ordering::Relaxed);
    }

    pub fn get(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }
}

/// The two counters a grouping step maintains. Created fresh per batch, so
/// their values at the end of an evaluation are that batch's deltas.
#[derive(Debug, Clone, Default)]
pub struct StepCounters {
    /// Element copies discarded because their window was past its
    /// garbage-collection horizon when they arrived.
    pub dropped_due_to_lateness: Counter,
    /// Elements and timers that targeted a window whose state was closed or
    /// already garbage-collected.
    pub dropped_due_to_closed_window: Counter,
}

impl StepCounters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> CounterDeltas {
        CounterDeltas {
            dropped_due_to_lateness: self.dropped_due_to_lateness.get(),
            dropped_due_to_closed_window: self.dropped_due_to_closed_window.get(),
        }
    }
}

/// Point-in-time counter values reported in a
/// [`TransformResult`](crate::evaluate::TransformResult).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CounterDeltas {
    pub dropped_due_to_lateness: u64,
    pub dropped_due_to_closed_window: u64,
}
