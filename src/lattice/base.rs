// src/lattice/base.rs
use super::StepGeometry;
use crate::error::{validation::*, LatticeError, LatticeResult};
use crate::instrumentation::{OperationCounts, TrackedOps};
use crate::models::process::StochasticProcess1D;
use std::fmt;
use std::sync::Arc;

/// Fields every scheme shares: the process, its starting level, the step
/// layout and the optional call counters.
#[derive(Clone)]
pub struct TreeBase {
    process: Arc<dyn StochasticProcess1D>,
    x0: f64,
    end: f64,
    dt: f64,
    steps: usize,
    counts: Option<Arc<OperationCounts>>,
}

impl TreeBase {
    pub fn new(
        process: Arc<dyn StochasticProcess1D>,
        end: f64,
        steps: usize,
        counts: Option<Arc<OperationCounts>>,
    ) -> LatticeResult<Self> {
        validate_positive("end", end)?;
        validate_steps(steps)?;
        let x0 = process.x0();
        validate_finite("x0", x0)?;
        Ok(TreeBase {
            process,
            x0,
            end,
            dt: end / steps as f64,
            steps,
            counts,
        })
    }

    pub fn process(&self) -> &dyn StochasticProcess1D {
        self.process.as_ref()
    }

    pub fn x0(&self) -> f64 {
        self.x0
    }

    pub fn end(&self) -> f64 {
        self.end
    }

    pub fn dt(&self) -> f64 {
        self.dt
    }

    pub fn steps(&self) -> usize {
        self.steps
    }

    pub fn counts(&self) -> Option<&Arc<OperationCounts>> {
        self.counts.as_ref()
    }

    /// Elapsed time at step `i`.
    pub fn step_time(&self, i: usize) -> f64 {
        i as f64 * self.dt
    }

    /// Drift accumulated over one step starting at `t`, anchored at `x0`.
    pub fn drift_step(&self, t: f64) -> f64 {
        self.process.drift(t, self.x0) * self.dt
    }

    /// Variance of one step starting at `t`, anchored at `x0`.
    pub fn step_variance(&self, t: f64) -> f64 {
        self.process.variance(t, self.x0, self.dt)
    }

    pub(crate) fn record(&self, op: TrackedOps) {
        if let Some(counts) = &self.counts {
            counts.record(op);
        }
    }

    /// Value at node `(i, index)` given the geometry in force at `t_i`.
    pub fn node_value(
        &self,
        geometry: &StepGeometry,
        i: usize,
        index: usize,
    ) -> LatticeResult<f64> {
        check_node(i, index)?;
        let j = 2.0 * index as f64 - i as f64;
        let value = match *geometry {
            StepGeometry::EqualProbabilities {
                up_step,
                drift_step,
            } => self.x0 * (i as f64 * drift_step + j * up_step).exp(),
            StepGeometry::EqualJumps { dx_step, .. } => self.x0 * (j * dx_step).exp(),
            StepGeometry::Multiplicative { up, down, .. } => {
                self.x0 * down.powi((i - index) as i32) * up.powi(index as i32)
            }
        };
        ensure_finite("node value", value)
    }
}

impl fmt::Debug for TreeBase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TreeBase")
            .field("x0", &self.x0)
            .field("end", &self.end)
            .field("dt", &self.dt)
            .field("steps", &self.steps)
            .field("instrumented", &self.counts.is_some())
            .finish_non_exhaustive()
    }
}

pub(crate) fn check_node(i: usize, index: usize) -> LatticeResult<()> {
    if index > i {
        return Err(LatticeError::InvalidParameters {
            parameter: "index".to_string(),
            value: index as f64,
            constraint: format!("must be in [0, {}] at step {}", i, i),
        });
    }
    Ok(())
}

pub(crate) fn check_branch(branch: usize) -> LatticeResult<()> {
    if branch > 1 {
        return Err(LatticeError::InvalidParameters {
            parameter: "branch".to_string(),
            value: branch as f64,
            constraint: "must be 0 (down) or 1 (up)".to_string(),
        });
    }
    Ok(())
}
