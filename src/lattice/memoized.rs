// src/lattice/memoized.rs
//! Per-layer geometry memoization.
//!
//! Every node of layer `i` shares the geometry evaluated at `t_i`, so a full
//! backward induction over an unwrapped lattice recomputes the same step
//! formulas `i + 1` times per layer. [`MemoizedGeometry`] routes
//! `geometry_at` through a [`SyncCache`] keyed by [`TimeKey`]; the inner
//! formulas then run once per distinct step time, including when the lattice
//! is walked from several threads.
//!
//! Failed evaluations are stored too. The step formulas are pure, so asking
//! again for the same layer would fail the same way.

use super::{BinomialLattice, StepGeometry, TreeBase, TreeKind};
use crate::cache::{SyncCache, TimeKey};
use crate::error::LatticeResult;
use rayon::prelude::*;
use std::fmt;
use std::sync::Arc;

pub struct MemoizedGeometry<L: BinomialLattice + ?Sized + 'static> {
    inner: Arc<L>,
    cache: SyncCache<TimeKey, LatticeResult<StepGeometry>>,
}

impl<L: BinomialLattice + ?Sized + 'static> MemoizedGeometry<L> {
    pub fn new(inner: Arc<L>) -> Self {
        let source = Arc::clone(&inner);
        let cache = SyncCache::with_function(move |key: &TimeKey| source.geometry_at(key.time()));
        MemoizedGeometry { inner, cache }
    }

    pub fn inner(&self) -> &Arc<L> {
        &self.inner
    }

    /// Number of layers whose geometry has been evaluated.
    pub fn cached_layers(&self) -> usize {
        self.cache.len()
    }

    /// Evaluate the geometry of every layer up front, in parallel.
    pub fn warm(&self) -> LatticeResult<()> {
        let base = self.inner.base();
        (0..=base.steps())
            .into_par_iter()
            .try_for_each(|i| self.geometry_at(base.step_time(i)).map(|_| ()))
    }

    /// Drop every stored layer.
    pub fn clear(&self) {
        self.cache.clear();
    }
}

impl<L: BinomialLattice + ?Sized + 'static> BinomialLattice for MemoizedGeometry<L> {
    fn base(&self) -> &TreeBase {
        self.inner.base()
    }

    fn kind(&self) -> TreeKind {
        self.inner.kind()
    }

    fn initial_geometry(&self) -> StepGeometry {
        self.inner.initial_geometry()
    }

    fn geometry_at(&self, t: f64) -> LatticeResult<StepGeometry> {
        let key = TimeKey::new(t)?;
        self.cache.invoke(&key)?
    }
}

impl<L: BinomialLattice + ?Sized + 'static> fmt::Debug for MemoizedGeometry<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoizedGeometry")
            .field("kind", &self.inner.kind())
            .field("steps", &self.inner.steps())
            .field("cached_layers", &self.cache.len())
            .finish()
    }
}
