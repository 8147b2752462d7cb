// src/models/black_scholes.rs
//! Generalized Black-Scholes-Merton process with term structures
//!
//! # Mathematical Framework
//!
//! The spot follows
//! ```text
//! dS_t = (r(t) - q(t)) S_t dt + σ(t) S_t dW_t
//! ```
//! The lattices work on the log-price, so the moments exposed here are those
//! of `d ln S_t`:
//! ```text
//! drift(t)            = r(t) - q(t) - σ(t)²/2
//! variance(t, t + Δt) = ∫_t^{t+Δt} σ(s)² ds
//! ```
//! while `x0` is the spot itself. Node values are then `x0 · exp(...)`.
//!
//! Rates and volatility are piecewise-flat curves; with flat curves the
//! process reduces to the constant-coefficient geometric Brownian motion.

use super::process::StochasticProcess1D;
use super::term_structure::PiecewiseFlatCurve;
use crate::error::{validation::*, LatticeError, LatticeResult};

#[derive(Clone, Debug)]
pub struct BlackScholesProcess {
    pub s0: f64,
    pub risk_free: PiecewiseFlatCurve,
    pub dividend: PiecewiseFlatCurve,
    pub volatility: PiecewiseFlatCurve,
}

impl BlackScholesProcess {
    pub fn new(
        s0: f64,
        risk_free: PiecewiseFlatCurve,
        dividend: PiecewiseFlatCurve,
        volatility: PiecewiseFlatCurve,
    ) -> LatticeResult<Self> {
        validate_positive("s0", s0)?;
        if let Some(&negative) = volatility.levels().iter().find(|&&v| v < 0.0) {
            return Err(LatticeError::InvalidParameters {
                parameter: "volatility".to_string(),
                value: negative,
                constraint: "must be non-negative (≥ 0)".to_string(),
            });
        }
        Ok(BlackScholesProcess {
            s0,
            risk_free,
            dividend,
            volatility,
        })
    }

    /// Constant-coefficient process: flat rate, dividend yield and volatility.
    pub fn flat(s0: f64, r: f64, q: f64, sigma: f64) -> LatticeResult<Self> {
        validate_finite("r", r)?;
        validate_finite("q", q)?;
        validate_finite("sigma", sigma)?;
        Self::new(
            s0,
            PiecewiseFlatCurve::flat(r),
            PiecewiseFlatCurve::flat(q),
            PiecewiseFlatCurve::flat(sigma),
        )
    }

    /// Discount factor `exp(-∫_0^t r(s) ds)`.
    pub fn discount(&self, t: f64) -> f64 {
        (-self.risk_free.integral(0.0, t)).exp()
    }

    /// Discount factor over `[t0, t0 + dt]`.
    pub fn discount_between(&self, t0: f64, dt: f64) -> f64 {
        (-self.risk_free.integral(t0, t0 + dt)).exp()
    }
}

impl StochasticProcess1D for BlackScholesProcess {
    fn x0(&self) -> f64 {
        self.s0
    }

    fn drift(&self, t: f64, _x: f64) -> f64 {
        let sigma = self.volatility.level(t);
        self.risk_free.level(t) - self.dividend.level(t) - 0.5 * sigma * sigma
    }

    fn diffusion(&self, t: f64, _x: f64) -> f64 {
        self.volatility.level(t)
    }

    fn variance(&self, t0: f64, _x0: f64, dt: f64) -> f64 {
        self.volatility.squared_integral(t0, t0 + dt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_flat_moments() {
        let process = BlackScholesProcess::flat(36.0, 0.06, 0.0, 0.2).unwrap();
        assert_eq!(process.x0(), 36.0);
        assert_relative_eq!(process.drift(0.3, 36.0), 0.06 - 0.02, epsilon = 1e-15);
        assert_relative_eq!(process.variance(0.3, 36.0, 0.5), 0.02, epsilon = 1e-15);
        assert_relative_eq!(process.std_deviation(0.0, 36.0, 1.0), 0.2, epsilon = 1e-15);
        assert_relative_eq!(process.discount(1.0), (-0.06f64).exp(), epsilon = 1e-15);
    }

    #[test]
    fn test_term_structure_variance_integrates_volatility() {
        let vol = PiecewiseFlatCurve::new(vec![0.5], vec![0.1, 0.3]).unwrap();
        let process = BlackScholesProcess::new(
            100.0,
            PiecewiseFlatCurve::flat(0.03),
            PiecewiseFlatCurve::flat(0.0),
            vol,
        )
        .unwrap();

        // 0.01 * 0.25 + 0.09 * 0.25
        assert_relative_eq!(process.variance(0.25, 100.0, 0.5), 0.025, epsilon = 1e-12);
        assert_relative_eq!(process.drift(0.75, 100.0), 0.03 - 0.045, epsilon = 1e-12);
    }

    #[test]
    fn test_step_starting_on_pillar_uses_its_own_regime() {
        let rates = PiecewiseFlatCurve::new(vec![0.5], vec![0.01, 0.10]).unwrap();
        let process = BlackScholesProcess::new(
            100.0,
            rates,
            PiecewiseFlatCurve::flat(0.0),
            PiecewiseFlatCurve::flat(0.2),
        )
        .unwrap();

        assert_relative_eq!(process.drift(0.5, 100.0), 0.10 - 0.02, epsilon = 1e-15);
        assert_relative_eq!(process.drift(0.5, 100.0), process.drift(0.5 + 1e-12, 100.0), epsilon = 1e-15);
        assert_relative_eq!(process.drift(0.4999, 100.0), 0.01 - 0.02, epsilon = 1e-15);
        // discounting over the same step sees the same rate
        let implied = -process.discount_between(0.5, 0.25).ln() / 0.25;
        assert_relative_eq!(implied, 0.10, epsilon = 1e-12);
    }

    #[test]
    fn test_invalid_process() {
        assert!(BlackScholesProcess::flat(0.0, 0.05, 0.0, 0.2).is_err());
        assert!(BlackScholesProcess::flat(100.0, 0.05, 0.0, -0.2).is_err());
        assert!(BlackScholesProcess::flat(100.0, f64::NAN, 0.0, 0.2).is_err());
    }
}
