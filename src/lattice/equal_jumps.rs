// src/lattice/equal_jumps.rs
//! Equal-jump trees
//!
//! Up and down log moves are `±dx_step(t)`; the drift is carried by the
//! branch probability instead of the node values:
//! ```text
//! p_up(t) = ½ + ½ · μΔt / dx_step(t)
//! ```
//! - Cox-Ross-Rubinstein: `dx_step(t) = StdDev[X_{t+Δt} − X_t]`
//! - Trigeorgis: `dx_step(t) = √(Var(t) + (μΔt)²)`, which keeps `p_up` inside
//!   [0, 1] for any drift
//!
//! `p_up` is checked against [0, 1] at construction and on every query.

use super::{BinomialLattice, StepGeometry, TreeBase, TreeConfig, TreeKind};
use crate::error::{validation::*, LatticeResult};
use crate::instrumentation::TrackedOps;
use crate::models::process::StochasticProcess1D;
use std::sync::Arc;

fn prob_up_from(kind: TreeKind, base: &TreeBase, t: f64, dx: f64) -> LatticeResult<f64> {
    let ratio = checked_div(kind.name(), base.drift_step(t), dx)?;
    validate_probability(kind.name(), t, 0.5 + 0.5 * ratio)
}

#[derive(Debug)]
pub struct CoxRossRubinstein {
    base: TreeBase,
    dx: f64,
    pu: f64,
    pd: f64,
}

impl CoxRossRubinstein {
    pub fn new(process: Arc<dyn StochasticProcess1D>, config: &TreeConfig) -> LatticeResult<Self> {
        config.validate()?;
        let base = TreeBase::new(process, config.end, config.steps, config.counts.clone())?;
        let dx = crr_dx(&base, 0.0)?;
        let pu = prob_up_from(TreeKind::CoxRossRubinstein, &base, 0.0, dx)?;
        let pd = 1.0 - pu;
        tracing::debug!(
            scheme = TreeKind::CoxRossRubinstein.name(),
            steps = base.steps(),
            dt = base.dt(),
            dx,
            pu,
            "lattice constructed"
        );
        Ok(CoxRossRubinstein { base, dx, pu, pd })
    }

    pub fn dx(&self) -> f64 {
        self.dx
    }

    pub fn pu(&self) -> f64 {
        self.pu
    }

    pub fn pd(&self) -> f64 {
        self.pd
    }

    pub fn dx_step(&self, t: f64) -> LatticeResult<f64> {
        self.base.record(TrackedOps::DX_STEP);
        crr_dx(&self.base, t)
    }

    pub fn prob_up(&self, t: f64) -> LatticeResult<f64> {
        self.base.record(TrackedOps::PROB_UP);
        let dx = self.dx_step(t)?;
        prob_up_from(TreeKind::CoxRossRubinstein, &self.base, t, dx)
    }
}

fn crr_dx(base: &TreeBase, t: f64) -> LatticeResult<f64> {
    ensure_finite(
        TreeKind::CoxRossRubinstein.name(),
        base.process().std_deviation(t, base.x0(), base.dt()),
    )
}

impl BinomialLattice for CoxRossRubinstein {
    fn base(&self) -> &TreeBase {
        &self.base
    }

    fn kind(&self) -> TreeKind {
        TreeKind::CoxRossRubinstein
    }

    fn initial_geometry(&self) -> StepGeometry {
        StepGeometry::EqualJumps {
            dx_step: self.dx,
            prob_up: self.pu,
        }
    }

    fn geometry_at(&self, t: f64) -> LatticeResult<StepGeometry> {
        self.base.record(TrackedOps::GEOMETRY);
        let dx_step = self.dx_step(t)?;
        self.base.record(TrackedOps::PROB_UP);
        let prob_up = prob_up_from(TreeKind::CoxRossRubinstein, &self.base, t, dx_step)?;
        Ok(StepGeometry::EqualJumps { dx_step, prob_up })
    }
}

#[derive(Debug)]
pub struct Trigeorgis {
    base: TreeBase,
    dx: f64,
    pu: f64,
    pd: f64,
}

impl Trigeorgis {
    pub fn new(process: Arc<dyn StochasticProcess1D>, config: &TreeConfig) -> LatticeResult<Self> {
        config.validate()?;
        let base = TreeBase::new(process, config.end, config.steps, config.counts.clone())?;
        let dx = trigeorgis_dx(&base, 0.0)?;
        let pu = prob_up_from(TreeKind::Trigeorgis, &base, 0.0, dx)?;
        let pd = 1.0 - pu;
        tracing::debug!(
            scheme = TreeKind::Trigeorgis.name(),
            steps = base.steps(),
            dt = base.dt(),
            dx,
            pu,
            "lattice constructed"
        );
        Ok(Trigeorgis { base, dx, pu, pd })
    }

    pub fn dx(&self) -> f64 {
        self.dx
    }

    pub fn pu(&self) -> f64 {
        self.pu
    }

    pub fn pd(&self) -> f64 {
        self.pd
    }

    pub fn dx_step(&self, t: f64) -> LatticeResult<f64> {
        self.base.record(TrackedOps::DX_STEP);
        trigeorgis_dx(&self.base, t)
    }

    pub fn prob_up(&self, t: f64) -> LatticeResult<f64> {
        self.base.record(TrackedOps::PROB_UP);
        let dx = self.dx_step(t)?;
        prob_up_from(TreeKind::Trigeorgis, &self.base, t, dx)
    }
}

fn trigeorgis_dx(base: &TreeBase, t: f64) -> LatticeResult<f64> {
    let drift = base.drift_step(t);
    checked_sqrt(
        TreeKind::Trigeorgis.name(),
        t,
        base.step_variance(t) + drift * drift,
    )
}

impl BinomialLattice for Trigeorgis {
    fn base(&self) -> &TreeBase {
        &self.base
    }

    fn kind(&self) -> TreeKind {
        TreeKind::Trigeorgis
    }

    fn initial_geometry(&self) -> StepGeometry {
        StepGeometry::EqualJumps {
            dx_step: self.dx,
            prob_up: self.pu,
        }
    }

    fn geometry_at(&self, t: f64) -> LatticeResult<StepGeometry> {
        self.base.record(TrackedOps::GEOMETRY);
        let dx_step = self.dx_step(t)?;
        self.base.record(TrackedOps::PROB_UP);
        let prob_up = prob_up_from(TreeKind::Trigeorgis, &self.base, t, dx_step)?;
        Ok(StepGeometry::EqualJumps { dx_step, prob_up })
    }
}
