//! Reconciliation counters.

use std::sync::atomic::{AtomicU64, Ordering};

/// Counters for reconciliation activity and drops.
#[derive(Debug, Default)]
pub struct ReconcileStats {
    /// Trade batches folded into the table.
    pub batches_applied: AtomicU64,
    /// Individual ticks folded into the table.
    pub ticks_applied: AtomicU64,
    /// Batches dropped because delivery arrived after a stop.
    pub batches_dropped: AtomicU64,
}

impl ReconcileStats {
    pub fn record_applied(&self, ticks: usize) {
        self.batches_applied.fetch_add(1, Ordering::Relaxed);
        self.ticks_applied.fetch_add(ticks as u64, Ordering::Relaxed);
    }

    pub fn record_dropped(&self) {
        self.batches_dropped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn applied(&self) -> u64 {
        self.batches_applied.load(Ordering::Relaxed)
    }

    pub fn ticks(&self) -> u64 {
        self.ticks_applied.load(Ordering::Relaxed)
    }

    pub fn dropped(&self) -> u64 {
        self.batches_dropped.load(Ordering::Relaxed)
    }
}
