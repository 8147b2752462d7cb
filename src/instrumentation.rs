// src/instrumentation.rs
//! Optional call counters for lattice queries.
//!
//! A lattice built with an `Arc<OperationCounts>` records one hit per
//! evaluation of each tracked formula. The counters are atomics so an
//! instrumented lattice can still be queried from several threads. Counting
//! how often `up_step` or `prob_up` runs with and without the memoizing cache
//! is the intended use.

use bitflags::bitflags;
use std::sync::atomic::{AtomicU64, Ordering};

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct TrackedOps: u32 {
        const NONE        = 0;
        const UP_STEP     = 1 << 0;
        const DX_STEP     = 1 << 1;
        const PROB_UP     = 1 << 2;
        const GEOMETRY    = 1 << 3;
        const UNDERLYING  = 1 << 4;
        const PROBABILITY = 1 << 5;
    }
}

const SLOTS: [TrackedOps; 6] = [
    TrackedOps::UP_STEP,
    TrackedOps::DX_STEP,
    TrackedOps::PROB_UP,
    TrackedOps::GEOMETRY,
    TrackedOps::UNDERLYING,
    TrackedOps::PROBABILITY,
];

#[derive(Debug)]
pub struct OperationCounts {
    tracked: TrackedOps,
    counts: [AtomicU64; 6],
}

impl OperationCounts {
    pub fn new(tracked: TrackedOps) -> Self {
        OperationCounts {
            tracked,
            counts: Default::default(),
        }
    }

    /// Count every operation.
    pub fn all() -> Self {
        Self::new(TrackedOps::all())
    }

    pub fn tracked(&self) -> TrackedOps {
        self.tracked
    }

    fn slot(op: TrackedOps) -> Option<usize> {
        SLOTS.iter().position(|&s| s == op)
    }

    /// Record one evaluation of `op`; a no-op for untracked operations.
    pub fn record(&self, op: TrackedOps) {
        if !self.tracked.contains(op) {
            return;
        }
        if let Some(idx) = Self::slot(op) {
            self.counts[idx].fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn count(&self, op: TrackedOps) -> u64 {
        Self::slot(op)
            .map(|idx| self.counts[idx].load(Ordering::Relaxed))
            .unwrap_or(0)
    }

    pub fn total(&self) -> u64 {
        self.counts.iter().map(|c| c.load(Ordering::Relaxed)).sum()
    }

    pub fn reset(&self) {
        for c in &self.counts {
            c.store(0, Ordering::Relaxed);
        }
    }
}

impl Default for OperationCounts {
    fn default() -> Self {
        Self::all()
    }
}
