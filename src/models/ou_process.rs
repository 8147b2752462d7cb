// src/models/ou_process.rs
//! Ornstein-Uhlenbeck process `dX = θ(μ - X) dt + σ dW`
//!
//! Mean-reverting with state-dependent drift, so the drift step a lattice sees
//! depends on the reference level it anchors at. The increment variance is
//! exact rather than the Euler `σ²Δt`:
//! ```text
//! Var[X_{t+Δt} | X_t] = σ² (1 - e^{-2θΔt}) / (2θ)
//! ```

use super::process::StochasticProcess1D;
use crate::error::{validation::*, LatticeResult};

#[derive(Clone, Debug)]
pub struct OuProcess {
    pub x0: f64,
    pub theta: f64,
    pub mu: f64,
    pub sigma: f64,
}

impl OuProcess {
    pub fn new(x0: f64, theta: f64, mu: f64, sigma: f64) -> LatticeResult<Self> {
        validate_finite("x0", x0)?;
        validate_positive("theta", theta)?;
        validate_finite("mu", mu)?;
        validate_positive("sigma", sigma)?;
        Ok(OuProcess {
            x0,
            theta,
            mu,
            sigma,
        })
    }

    /// `E[X_{t+Δt} | X_t = x]`
    pub fn expectation(&self, x: f64, dt: f64) -> f64 {
        self.mu + (x - self.mu) * (-self.theta * dt).exp()
    }
}

impl StochasticProcess1D for OuProcess {
    fn x0(&self) -> f64 {
        self.x0
    }

    fn drift(&self, _t: f64, x: f64) -> f64 {
        self.theta * (self.mu - x)
    }

    fn diffusion(&self, _t: f64, _x: f64) -> f64 {
        self.sigma
    }

    fn variance(&self, _t0: f64, _x0: f64, dt: f64) -> f64 {
        0.5 * self.sigma * self.sigma * (1.0 - (-2.0 * self.theta * dt).exp()) / self.theta
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_small_step_variance_matches_euler() {
        let ou = OuProcess::new(0.05, 0.5, 0.04, 0.01).unwrap();
        let dt = 1e-4;
        let exact = ou.variance(0.0, ou.x0(), dt);
        let euler = ou.sigma * ou.sigma * dt;
        assert!((exact - euler).abs() / euler < 1e-3);
    }

    #[test]
    fn test_mean_reversion() {
        let ou = OuProcess::new(0.10, 2.0, 0.04, 0.01).unwrap();
        assert!(ou.drift(0.0, ou.x0()) < 0.0);
        assert!(ou.expectation(ou.x0(), 10.0) - 0.04 < 1e-8);
        assert!(OuProcess::new(0.0, -1.0, 0.0, 0.01).is_err());
    }
}
