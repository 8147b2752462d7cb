// src/lattice/mod.rs
//! Time-inhomogeneous binomial lattices
//!
//! # Families
//!
//! | Scheme | Family | Recomputed per step |
//! |---|---|---|
//! | [`JarrowRudd`] | equal probabilities | up step |
//! | [`AdditiveEqp`] | equal probabilities | up step |
//! | [`CoxRossRubinstein`] | equal jumps | dx step, p_up |
//! | [`Trigeorgis`] | equal jumps | dx step, p_up |
//! | [`Tian`] | multiplicative | up, down, p_up |
//! | [`LeisenReimer`] | multiplicative, strike centred | up, down, p_up |
//! | [`Joshi4`] | multiplicative, strike centred | up, down, p_up |
//!
//! Every scheme evaluates its step formulas at the elapsed time `t_i = i·dt`
//! of the layer being queried instead of freezing them at `t = 0`, which is
//! what lets the trees follow processes with term-structure driven drift and
//! variance. With constant coefficients each scheme reduces to its classical
//! constant-parameter tree.
//!
//! Node values:
//! ```text
//! equal probabilities:  x0 · exp(i·drift_step(t_i) + (2·index − i)·up_step(t_i))
//! equal jumps:          x0 · exp((2·index − i)·dx_step(t_i))
//! multiplicative:       x0 · down(t_i)^(i−index) · up(t_i)^index
//! ```
//!
//! The layer geometry depends on `t_i` only, so wrapping a lattice in
//! [`MemoizedGeometry`] evaluates it once per layer instead of once per node.

pub mod base;
pub mod equal_jumps;
pub mod equal_probabilities;
pub mod leisen_reimer;
pub mod memoized;
pub mod tian;

pub use base::TreeBase;
pub use equal_jumps::{CoxRossRubinstein, Trigeorgis};
pub use equal_probabilities::{AdditiveEqp, JarrowRudd};
pub use leisen_reimer::{Joshi4, LeisenReimer};
pub use memoized::MemoizedGeometry;
pub use tian::Tian;

use crate::error::{validation::*, LatticeError, LatticeResult};
use crate::instrumentation::{OperationCounts, TrackedOps};
use crate::models::process::StochasticProcess1D;
use base::check_branch;
use std::sync::Arc;

/// Geometry of one layer of the tree.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum StepGeometry {
    /// Symmetric log displacement around the drift, probability ½ each way.
    EqualProbabilities { up_step: f64, drift_step: f64 },
    /// Symmetric log displacement `±dx_step`; drift carried by `prob_up`.
    EqualJumps { dx_step: f64, prob_up: f64 },
    /// Multiplicative up/down factors.
    Multiplicative { up: f64, down: f64, prob_up: f64 },
}

impl StepGeometry {
    pub fn prob_up(&self) -> f64 {
        match *self {
            StepGeometry::EqualProbabilities { .. } => 0.5,
            StepGeometry::EqualJumps { prob_up, .. } => prob_up,
            StepGeometry::Multiplicative { prob_up, .. } => prob_up,
        }
    }

    pub fn prob_down(&self) -> f64 {
        1.0 - self.prob_up()
    }

    /// `branch == 1` is the up move, anything else the down move.
    pub fn branch_probability(&self, branch: usize) -> f64 {
        if branch == 1 {
            self.prob_up()
        } else {
            self.prob_down()
        }
    }
}

/// Contract between a scheme and the tree scaffolding that walks it.
pub trait BinomialLattice: Send + Sync {
    fn base(&self) -> &TreeBase;

    fn kind(&self) -> TreeKind;

    /// Geometry computed at construction (`t = 0`).
    fn initial_geometry(&self) -> StepGeometry;

    /// Geometry of a layer starting at elapsed time `t`.
    fn geometry_at(&self, t: f64) -> LatticeResult<StepGeometry>;

    fn steps(&self) -> usize {
        self.base().steps()
    }

    fn dt(&self) -> f64 {
        self.base().dt()
    }

    fn x0(&self) -> f64 {
        self.base().x0()
    }

    fn size(&self, i: usize) -> usize {
        i + 1
    }

    fn descendant(&self, _i: usize, index: usize, branch: usize) -> usize {
        index + branch
    }

    fn underlying(&self, i: usize, index: usize) -> LatticeResult<f64> {
        let base = self.base();
        base.record(TrackedOps::UNDERLYING);
        let geometry = self.geometry_at(base.step_time(i))?;
        base.node_value(&geometry, i, index)
    }

    fn probability(&self, i: usize, index: usize, branch: usize) -> LatticeResult<f64> {
        let base = self.base();
        base.record(TrackedOps::PROBABILITY);
        base::check_node(i, index)?;
        check_branch(branch)?;
        let geometry = self.geometry_at(base.step_time(i))?;
        Ok(geometry.branch_probability(branch))
    }
}

/// Construction parameters shared by every scheme.
#[derive(Clone, Debug)]
pub struct TreeConfig {
    /// Horizon of the tree in years.
    pub end: f64,
    /// Requested step count; the strike-centred schemes bump it to odd.
    pub steps: usize,
    /// Required by Leisen-Reimer and Joshi4, ignored otherwise.
    pub strike: Option<f64>,
    pub counts: Option<Arc<OperationCounts>>,
}

impl TreeConfig {
    pub fn new(end: f64, steps: usize) -> Self {
        TreeConfig {
            end,
            steps,
            ..Default::default()
        }
    }

    pub fn with_strike(mut self, strike: f64) -> Self {
        self.strike = Some(strike);
        self
    }

    pub fn with_counts(mut self, counts: Arc<OperationCounts>) -> Self {
        self.counts = Some(counts);
        self
    }

    pub fn validate(&self) -> LatticeResult<()> {
        validate_positive("end", self.end)?;
        validate_finite("end", self.end)?;
        validate_steps(self.steps)?;
        if let Some(strike) = self.strike {
            validate_finite("strike", strike)?;
        }
        Ok(())
    }

    /// Strike for a scheme that centres on it: present and positive.
    pub fn required_strike(&self, kind: TreeKind) -> LatticeResult<f64> {
        let strike = self.strike.ok_or_else(|| LatticeError::InvalidConfiguration {
            field: "strike".to_string(),
            reason: format!("required by {}", kind.name()),
        })?;
        validate_positive("strike", strike)?;
        Ok(strike)
    }
}

impl Default for TreeConfig {
    fn default() -> Self {
        TreeConfig {
            end: 1.0,
            steps: 100,
            strike: None,
            counts: None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TreeKind {
    JarrowRudd,
    AdditiveEqp,
    CoxRossRubinstein,
    Trigeorgis,
    Tian,
    LeisenReimer,
    Joshi4,
}

impl TreeKind {
    pub const ALL: [TreeKind; 7] = [
        TreeKind::JarrowRudd,
        TreeKind::CoxRossRubinstein,
        TreeKind::AdditiveEqp,
        TreeKind::Trigeorgis,
        TreeKind::Tian,
        TreeKind::LeisenReimer,
        TreeKind::Joshi4,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            TreeKind::JarrowRudd => "Jarrow-Rudd",
            TreeKind::AdditiveEqp => "Additive equiprobabilities",
            TreeKind::CoxRossRubinstein => "Cox-Ross-Rubinstein",
            TreeKind::Trigeorgis => "Trigeorgis",
            TreeKind::Tian => "Tian",
            TreeKind::LeisenReimer => "Leisen-Reimer",
            TreeKind::Joshi4 => "Joshi4",
        }
    }

    pub fn requires_strike(&self) -> bool {
        matches!(self, TreeKind::LeisenReimer | TreeKind::Joshi4)
    }

    /// Build the scheme for `process` over `config`.
    pub fn build(
        &self,
        process: Arc<dyn StochasticProcess1D>,
        config: &TreeConfig,
    ) -> LatticeResult<Box<dyn BinomialLattice>> {
        Ok(match self {
            TreeKind::JarrowRudd => Box::new(JarrowRudd::new(process, config)?),
            TreeKind::AdditiveEqp => Box::new(AdditiveEqp::new(process, config)?),
            TreeKind::CoxRossRubinstein => Box::new(CoxRossRubinstein::new(process, config)?),
            TreeKind::Trigeorgis => Box::new(Trigeorgis::new(process, config)?),
            TreeKind::Tian => Box::new(Tian::new(process, config)?),
            TreeKind::LeisenReimer => Box::new(LeisenReimer::new(process, config)?),
            TreeKind::Joshi4 => Box::new(Joshi4::new(process, config)?),
        })
    }
}
