// src/lattice/equal_probabilities.rs
//! Equal-probability trees
//!
//! Both branches carry probability ½; the drift enters the node values through
//! `drift_step(t)` and only the up step is re-evaluated per layer.
//!
//! # Jarrow-Rudd
//! ```text
//! up_step(t) = StdDev[X_{t+Δt} − X_t]
//! ```
//! The drift has already been removed from the step and is added back by the
//! node value formula.
//!
//! # Additive equiprobabilities
//! With `R = 4·Var(t) − 3·(μΔt)²` the log moves are `½·μΔt + ½·√R` up and
//! `3/2·μΔt − ½·√R` down. Around the drift step that is a displacement of
//! ```text
//! up_step(t) = −½·μΔt + ½·√R
//! ```
//! which needs `R ≥ 0`. A negative radicand is reported as an
//! error rather than producing NaN node values.

use super::{BinomialLattice, StepGeometry, TreeBase, TreeConfig, TreeKind};
use crate::error::{validation::*, LatticeResult};
use crate::instrumentation::TrackedOps;
use crate::models::process::StochasticProcess1D;
use std::sync::Arc;

#[derive(Debug)]
pub struct JarrowRudd {
    base: TreeBase,
    up: f64,
}

impl JarrowRudd {
    pub fn new(process: Arc<dyn StochasticProcess1D>, config: &TreeConfig) -> LatticeResult<Self> {
        config.validate()?;
        let base = TreeBase::new(process, config.end, config.steps, config.counts.clone())?;
        let up = ensure_finite(
            TreeKind::JarrowRudd.name(),
            base.process().std_deviation(0.0, base.x0(), base.dt()),
        )?;
        tracing::debug!(
            scheme = TreeKind::JarrowRudd.name(),
            steps = base.steps(),
            dt = base.dt(),
            up,
            "lattice constructed"
        );
        Ok(JarrowRudd { base, up })
    }

    /// Up step computed at construction.
    pub fn up(&self) -> f64 {
        self.up
    }

    pub fn up_step(&self, t: f64) -> LatticeResult<f64> {
        self.base.record(TrackedOps::UP_STEP);
        let base = &self.base;
        ensure_finite(
            TreeKind::JarrowRudd.name(),
            base.process().std_deviation(t, base.x0(), base.dt()),
        )
    }
}

impl BinomialLattice for JarrowRudd {
    fn base(&self) -> &TreeBase {
        &self.base
    }

    fn kind(&self) -> TreeKind {
        TreeKind::JarrowRudd
    }

    fn initial_geometry(&self) -> StepGeometry {
        StepGeometry::EqualProbabilities {
            up_step: self.up,
            drift_step: self.base.drift_step(0.0),
        }
    }

    fn geometry_at(&self, t: f64) -> LatticeResult<StepGeometry> {
        self.base.record(TrackedOps::GEOMETRY);
        Ok(StepGeometry::EqualProbabilities {
            up_step: self.up_step(t)?,
            drift_step: self.base.drift_step(t),
        })
    }
}

#[derive(Debug)]
pub struct AdditiveEqp {
    base: TreeBase,
    up: f64,
}

impl AdditiveEqp {
    pub fn new(process: Arc<dyn StochasticProcess1D>, config: &TreeConfig) -> LatticeResult<Self> {
        config.validate()?;
        let base = TreeBase::new(process, config.end, config.steps, config.counts.clone())?;
        let up = additive_up_step(&base, 0.0)?;
        tracing::debug!(
            scheme = TreeKind::AdditiveEqp.name(),
            steps = base.steps(),
            dt = base.dt(),
            up,
            "lattice constructed"
        );
        Ok(AdditiveEqp { base, up })
    }

    pub fn up(&self) -> f64 {
        self.up
    }

    pub fn up_step(&self, t: f64) -> LatticeResult<f64> {
        self.base.record(TrackedOps::UP_STEP);
        additive_up_step(&self.base, t)
    }
}

fn additive_up_step(base: &TreeBase, t: f64) -> LatticeResult<f64> {
    let drift = base.drift_step(t);
    let radicand = 4.0 * base.step_variance(t) - 3.0 * drift * drift;
    let root = checked_sqrt(TreeKind::AdditiveEqp.name(), t, radicand)?;
    ensure_finite(TreeKind::AdditiveEqp.name(), -0.5 * drift + 0.5 * root)
}

impl BinomialLattice for AdditiveEqp {
    fn base(&self) -> &TreeBase {
        &self.base
    }

    fn kind(&self) -> TreeKind {
        TreeKind::AdditiveEqp
    }

    fn initial_geometry(&self) -> StepGeometry {
        StepGeometry::EqualProbabilities {
            up_step: self.up,
            drift_step: self.base.drift_step(0.0),
        }
    }

    fn geometry_at(&self, t: f64) -> LatticeResult<StepGeometry> {
        self.base.record(TrackedOps::GEOMETRY);
        Ok(StepGeometry::EqualProbabilities {
            up_step: self.up_step(t)?,
            drift_step: self.base.drift_step(t),
        })
    }
}
