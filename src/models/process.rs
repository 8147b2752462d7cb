// src/models/process.rs
//! One-dimensional process abstraction consumed by the lattices.
//!
//! A process `dX = μ(t, X) dt + σ(t, X) dW` is seen by a tree only through the
//! moments of its increment over a step. Implementations with time-dependent
//! coefficients override [`StochasticProcess1D::variance`] so that the
//! variance over `[t, t + dt]` integrates the instantaneous diffusion.

pub trait StochasticProcess1D: Send + Sync {
    /// Initial level of the process (spot for log-price processes).
    fn x0(&self) -> f64;

    /// Instantaneous drift `μ(t, x)`.
    fn drift(&self, t: f64, x: f64) -> f64;

    /// Instantaneous diffusion `σ(t, x)`.
    fn diffusion(&self, t: f64, x: f64) -> f64;

    /// Variance of the increment over `[t0, t0 + dt]` starting from `x0`.
    fn variance(&self, t0: f64, x0: f64, dt: f64) -> f64 {
        let sigma = self.diffusion(t0, x0);
        sigma * sigma * dt
    }

    /// Standard deviation of the increment over `[t0, t0 + dt]`.
    fn std_deviation(&self, t0: f64, x0: f64, dt: f64) -> f64 {
        self.variance(t0, x0, dt).sqrt()
    }

    /// Variance accumulated over a window of length `horizon` starting at `t0`.
    fn variance_over_horizon(&self, t0: f64, x0: f64, horizon: f64) -> f64 {
        self.variance(t0, x0, horizon)
    }
}
