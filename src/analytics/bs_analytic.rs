// src/analytics/bs_analytic.rs
//! Analytical Black-Scholes prices for European options
//!
//! # Mathematical Foundation
//!
//! With a continuous dividend yield `q` the underlying follows
//! ```text
//! dS_t = (r − q) S_t dt + σ S_t dW_t
//! ```
//! and European prices have closed forms in the normal CDF Φ(x). They are the
//! reference the lattice schemes converge to.

use crate::error::{validation::*, LatticeResult};
use crate::math_utils::norm_cdf;

fn d1_d2(s: f64, k: f64, r: f64, q: f64, sigma: f64, t: f64) -> LatticeResult<(f64, f64)> {
    validate_positive("spot", s)?;
    validate_positive("strike", k)?;
    validate_positive("volatility", sigma)?;
    validate_positive("maturity", t)?;
    let vol_sqrt_t = sigma * t.sqrt();
    let d1 = ((s / k).ln() + (r - q + 0.5 * sigma * sigma) * t) / vol_sqrt_t;
    Ok((d1, d1 - vol_sqrt_t))
}

/// Black-Scholes European call price
///
/// # Formula
/// ```text
/// C = S·e^(−qT)·Φ(d₁) − K·e^(−rT)·Φ(d₂)
/// d₁ = [ln(S/K) + (r − q + σ²/2)T] / (σ√T)
/// d₂ = d₁ − σ√T
/// ```
pub fn bs_call_price(s: f64, k: f64, r: f64, q: f64, sigma: f64, t: f64) -> LatticeResult<f64> {
    let (d1, d2) = d1_d2(s, k, r, q, sigma, t)?;
    Ok(s * (-q * t).exp() * norm_cdf(d1) - k * (-r * t).exp() * norm_cdf(d2))
}

/// Black-Scholes European put price
///
/// # Formula
/// ```text
/// P = K·e^(−rT)·Φ(−d₂) − S·e^(−qT)·Φ(−d₁)
/// ```
pub fn bs_put_price(s: f64, k: f64, r: f64, q: f64, sigma: f64, t: f64) -> LatticeResult<f64> {
    let (d1, d2) = d1_d2(s, k, r, q, sigma, t)?;
    Ok(k * (-r * t).exp() * norm_cdf(-d2) - s * (-q * t).exp() * norm_cdf(-d1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_put_call_parity() {
        let (s, k, r, q, sigma, t) = (36.0, 40.0, 0.06, 0.02, 0.2, 1.0);
        let call = bs_call_price(s, k, r, q, sigma, t).unwrap();
        let put = bs_put_price(s, k, r, q, sigma, t).unwrap();
        let forward = s * (-q * t).exp() - k * (-r * t).exp();
        assert_relative_eq!(call - put, forward, epsilon = 1e-10);
    }

    #[test]
    fn test_reference_put() {
        // S=36, K=40, r=6%, σ=20%, T=1
        let put = bs_put_price(36.0, 40.0, 0.06, 0.0, 0.2, 1.0).unwrap();
        assert!((put - 3.8443).abs() < 1e-3, "put = {}", put);
    }

    #[test]
    fn test_rejects_degenerate_inputs() {
        assert!(bs_call_price(36.0, 0.0, 0.06, 0.0, 0.2, 1.0).is_err());
        assert!(bs_put_price(36.0, 40.0, 0.06, 0.0, 0.0, 1.0).is_err());
        assert!(bs_put_price(36.0, 40.0, 0.06, 0.0, 0.2, 0.0).is_err());
    }
}
