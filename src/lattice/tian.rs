// src/lattice/tian.rs
//! Tian (1993) third-moment matching tree
//!
//! # Formula
//! ```text
//! q    = exp(Var(t))
//! r    = exp(μΔt) · √q
//! up   = ½ · r · q · (q + 1 + √(q² + 2q − 3))
//! down = ½ · r · q · (q + 1 − √(q² + 2q − 3))
//! p_up = (r − down) / (up − down)
//! ```
//! The factors are not self-similar across layers once `Var(t)` or `μ(t)`
//! move, so up, down and `p_up` are recomputed for the layer of every node
//! queried. A zero step variance collapses `up` onto `down` and is reported
//! as a numerical instability.

use super::{BinomialLattice, StepGeometry, TreeBase, TreeConfig, TreeKind};
use crate::error::{validation::*, LatticeResult};
use crate::instrumentation::TrackedOps;
use crate::models::process::StochasticProcess1D;
use std::sync::Arc;

#[derive(Debug)]
pub struct Tian {
    base: TreeBase,
    up: f64,
    down: f64,
    pu: f64,
    pd: f64,
}

impl Tian {
    pub fn new(process: Arc<dyn StochasticProcess1D>, config: &TreeConfig) -> LatticeResult<Self> {
        config.validate()?;
        let base = TreeBase::new(process, config.end, config.steps, config.counts.clone())?;
        let (up, down, pu) = tian_factors(&base, 0.0)?;
        tracing::debug!(
            scheme = TreeKind::Tian.name(),
            steps = base.steps(),
            dt = base.dt(),
            up,
            down,
            pu,
            "lattice constructed"
        );
        Ok(Tian {
            base,
            up,
            down,
            pu,
            pd: 1.0 - pu,
        })
    }

    pub fn up(&self) -> f64 {
        self.up
    }

    pub fn down(&self) -> f64 {
        self.down
    }

    pub fn pu(&self) -> f64 {
        self.pu
    }

    pub fn pd(&self) -> f64 {
        self.pd
    }
}

fn tian_factors(base: &TreeBase, t: f64) -> LatticeResult<(f64, f64, f64)> {
    let name = TreeKind::Tian.name();
    let q = base.step_variance(t).exp();
    let r = base.drift_step(t).exp() * q.sqrt();
    let root = checked_sqrt(name, t, q * q + 2.0 * q - 3.0)?;
    let up = ensure_finite(name, 0.5 * r * q * (q + 1.0 + root))?;
    let down = ensure_finite(name, 0.5 * r * q * (q + 1.0 - root))?;
    let pu = checked_div(name, r - down, up - down)?;
    let pu = validate_probability(name, t, pu)?;
    Ok((up, down, pu))
}

impl BinomialLattice for Tian {
    fn base(&self) -> &TreeBase {
        &self.base
    }

    fn kind(&self) -> TreeKind {
        TreeKind::Tian
    }

    fn initial_geometry(&self) -> StepGeometry {
        StepGeometry::Multiplicative {
            up: self.up,
            down: self.down,
            prob_up: self.pu,
        }
    }

    fn geometry_at(&self, t: f64) -> LatticeResult<StepGeometry> {
        self.base.record(TrackedOps::GEOMETRY);
        let (up, down, prob_up) = tian_factors(&self.base, t)?;
        Ok(StepGeometry::Multiplicative { up, down, prob_up })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LatticeError;
    use crate::models::{BlackScholesProcess, PiecewiseFlatCurve};
    use approx::assert_relative_eq;

    #[test]
    fn test_tian_matches_first_moment() {
        let process = Arc::new(BlackScholesProcess::flat(100.0, 0.05, 0.01, 0.3).unwrap());
        let tree = Tian::new(process, &TreeConfig::new(0.5, 25)).unwrap();
        let growth = ((0.05f64 - 0.01) * tree.dt()).exp();
        let mean = tree.pu() * tree.up() + tree.pd() * tree.down();
        assert_relative_eq!(mean, growth, epsilon = 1e-12);
        assert!(tree.up() > 1.0 && tree.down() < 1.0);
    }

    #[test]
    fn test_tian_node_identities() {
        let vol = PiecewiseFlatCurve::new(vec![0.4], vec![0.15, 0.35]).unwrap();
        let process = BlackScholesProcess::new(
            50.0,
            PiecewiseFlatCurve::flat(0.04),
            PiecewiseFlatCurve::flat(0.0),
            vol,
        )
        .unwrap();
        let tree = Tian::new(Arc::new(process), &TreeConfig::new(1.0, 10)).unwrap();
        for i in [2usize, 8] {
            let t = tree.base().step_time(i);
            let (up, down) = match tree.geometry_at(t).unwrap() {
                StepGeometry::Multiplicative { up, down, .. } => (up, down),
                other => panic!("unexpected geometry {:?}", other),
            };
            assert_relative_eq!(
                tree.underlying(i, i).unwrap(),
                50.0 * up.powi(i as i32),
                max_relative = 1e-12
            );
            assert_relative_eq!(
                tree.underlying(i, 0).unwrap(),
                50.0 * down.powi(i as i32),
                max_relative = 1e-12
            );
        }
        // the geometry of the high-volatility layers is wider
        let early = tree.geometry_at(0.0).unwrap();
        let late = tree.geometry_at(0.8).unwrap();
        match (early, late) {
            (
                StepGeometry::Multiplicative { up: u0, .. },
                StepGeometry::Multiplicative { up: u1, .. },
            ) => assert!(u1 > u0),
            _ => panic!("Tian geometry must be multiplicative"),
        }
    }

    #[test]
    fn test_tian_degenerate_variance() {
        let process = Arc::new(BlackScholesProcess::flat(100.0, 0.05, 0.0, 0.0).unwrap());
        match Tian::new(process, &TreeConfig::new(1.0, 10)) {
            Err(LatticeError::NumericalInstability { method, .. }) => assert_eq!(method, "Tian"),
            other => panic!("expected NumericalInstability, got {:?}", other),
        }
    }
}
