// src/models/term_structure.rs
//! Piecewise-flat term structures for rates and volatilities.
//!
//! A curve is a list of pillar times `t_1 < t_2 < ... < t_n` with one level per
//! interval: level `k` applies on `[t_{k-1}, t_k)`, the last level extends flat
//! from `t_n` on. A step starting on a pillar therefore sees the same level
//! from `level` as from the integrals over that step. The only operations a lattice needs are the instantaneous
//! level and its integral over a window.

use crate::error::{validation::*, LatticeError, LatticeResult};

#[derive(Clone, Debug, PartialEq)]
pub struct PiecewiseFlatCurve {
    pillars: Vec<f64>,
    levels: Vec<f64>,
}

impl PiecewiseFlatCurve {
    /// Single level for all times.
    pub fn flat(level: f64) -> Self {
        PiecewiseFlatCurve {
            pillars: Vec::new(),
            levels: vec![level],
        }
    }

    /// `levels.len()` must equal `pillars.len() + 1`; pillars strictly increasing and positive.
    pub fn new(pillars: Vec<f64>, levels: Vec<f64>) -> LatticeResult<Self> {
        if levels.len() != pillars.len() + 1 {
            return Err(LatticeError::InvalidConfiguration {
                field: "levels".to_string(),
                reason: format!(
                    "expected {} levels for {} pillars, got {}",
                    pillars.len() + 1,
                    pillars.len(),
                    levels.len()
                ),
            });
        }
        for &level in &levels {
            validate_finite("level", level)?;
        }
        let mut previous = 0.0;
        for &pillar in &pillars {
            validate_positive("pillar", pillar)?;
            if pillar <= previous {
                return Err(LatticeError::InvalidParameters {
                    parameter: "pillar".to_string(),
                    value: pillar,
                    constraint: format!("must be strictly greater than {}", previous),
                });
            }
            previous = pillar;
        }
        Ok(PiecewiseFlatCurve { pillars, levels })
    }

    pub fn levels(&self) -> &[f64] {
        &self.levels
    }

    /// Level in force at time `t`; a pillar belongs to the interval it opens.
    pub fn level(&self, t: f64) -> f64 {
        let idx = self.pillars.partition_point(|&p| p <= t);
        self.levels[idx]
    }

    /// `∫ f(level(s)) ds` over `[t0, t1]`.
    fn integrate_with<F: Fn(f64) -> f64>(&self, t0: f64, t1: f64, f: F) -> f64 {
        let (a, b, sign) = if t1 >= t0 { (t0, t1, 1.0) } else { (t1, t0, -1.0) };
        let mut total = 0.0;
        let mut start = a;
        for (k, &level) in self.levels.iter().enumerate() {
            let end = self.pillars.get(k).copied().unwrap_or(f64::INFINITY).min(b);
            if end > start {
                total += f(level) * (end - start);
                start = end;
            }
            if start >= b {
                break;
            }
        }
        sign * total
    }

    /// `∫ level(s) ds` over `[t0, t1]`.
    pub fn integral(&self, t0: f64, t1: f64) -> f64 {
        self.integrate_with(t0, t1, |level| level)
    }

    /// `∫ level(s)² ds` over `[t0, t1]`; the Black variance increment of a volatility curve.
    pub fn squared_integral(&self, t0: f64, t1: f64) -> f64 {
        self.integrate_with(t0, t1, |level| level * level)
    }
}
