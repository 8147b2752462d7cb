// src/error.rs
use std::fmt;

/// Error types for lattice construction, per-step queries and the memoizing cache
#[derive(Debug, Clone, PartialEq)]
pub enum LatticeError {
    /// Invalid parameter values
    InvalidParameters {
        parameter: String,
        value: f64,
        constraint: String,
    },

    /// Invalid or incomplete configuration
    InvalidConfiguration { field: String, reason: String },

    /// Branch probability outside [0, 1]
    NegativeProbability {
        scheme: String,
        time: f64,
        probability: f64,
    },

    /// Negative value under a square root in a step formula
    NegativeRadicand {
        scheme: String,
        time: f64,
        radicand: f64,
    },

    /// Degenerate denominator or non-finite result
    NumericalInstability { method: String, reason: String },
}

impl fmt::Display for LatticeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LatticeError::InvalidParameters {
                parameter,
                value,
                constraint,
            } => {
                write!(
                    f,
                    "Invalid parameter '{}' = {}: {}",
                    parameter, value, constraint
                )
            }
            LatticeError::InvalidConfiguration { field, reason } => {
                write!(f, "Invalid configuration for '{}': {}", field, reason)
            }
            LatticeError::NegativeProbability {
                scheme,
                time,
                probability,
            } => {
                write!(
                    f,
                    "negative probability in {} at t = {}: p_up = {} is outside [0, 1]",
                    scheme, time, probability
                )
            }
            LatticeError::NegativeRadicand {
                scheme,
                time,
                radicand,
            } => {
                write!(
                    f,
                    "Negative radicand in {} at t = {}: sqrt({}) has no real value",
                    scheme, time, radicand
                )
            }
            LatticeError::NumericalInstability { method, reason } => {
                write!(f, "Numerical instability in {}: {}", method, reason)
            }
        }
    }
}

impl std::error::Error for LatticeError {}

/// Result type alias for lattice operations
pub type LatticeResult<T> = Result<T, LatticeError>;

/// Validation utilities
pub mod validation {
    use super::{LatticeError, LatticeResult};

    /// Validate that a parameter is positive
    pub fn validate_positive(name: &str, value: f64) -> LatticeResult<()> {
        if value.is_nan() || value <= 0.0 {
            Err(LatticeError::InvalidParameters {
                parameter: name.to_string(),
                value,
                constraint: "must be positive (> 0)".to_string(),
            })
        } else {
            Ok(())
        }
    }

    /// Validate that a value is finite and not NaN
    pub fn validate_finite(name: &str, value: f64) -> LatticeResult<()> {
        if !value.is_finite() {
            Err(LatticeError::InvalidParameters {
                parameter: name.to_string(),
                value,
                constraint: "must be finite (not NaN or infinite)".to_string(),
            })
        } else {
            Ok(())
        }
    }

    /// Validate steps count
    pub fn validate_steps(steps: usize) -> LatticeResult<()> {
        if steps == 0 {
            Err(LatticeError::InvalidConfiguration {
                field: "steps".to_string(),
                reason: "must be greater than 0".to_string(),
            })
        } else if steps > 100_000 {
            Err(LatticeError::InvalidConfiguration {
                field: "steps".to_string(),
                reason: "exceeds maximum allowed (100,000)".to_string(),
            })
        } else {
            Ok(())
        }
    }

    /// Validate that an up-probability lies in the closed interval [0, 1]
    pub fn validate_probability(scheme: &str, time: f64, probability: f64) -> LatticeResult<f64> {
        if (0.0..=1.0).contains(&probability) {
            Ok(probability)
        } else {
            Err(LatticeError::NegativeProbability {
                scheme: scheme.to_string(),
                time,
                probability,
            })
        }
    }

    /// Square root that refuses a negative radicand instead of returning NaN
    pub fn checked_sqrt(scheme: &str, time: f64, radicand: f64) -> LatticeResult<f64> {
        if radicand.is_nan() || radicand < 0.0 {
            Err(LatticeError::NegativeRadicand {
                scheme: scheme.to_string(),
                time,
                radicand,
            })
        } else {
            Ok(radicand.sqrt())
        }
    }

    /// Division that surfaces a zero or non-finite denominator and a non-finite quotient
    pub fn checked_div(method: &str, numerator: f64, denominator: f64) -> LatticeResult<f64> {
        if !denominator.is_finite() || denominator.abs() < f64::EPSILON {
            return Err(LatticeError::NumericalInstability {
                method: method.to_string(),
                reason: format!("degenerate denominator {}", denominator),
            });
        }
        ensure_finite(method, numerator / denominator)
    }

    /// Reject NaN and infinities produced by a formula
    pub fn ensure_finite(method: &str, value: f64) -> LatticeResult<f64> {
        if value.is_finite() {
            Ok(value)
        } else {
            Err(LatticeError::NumericalInstability {
                method: method.to_string(),
                reason: format!("non-finite result {}", value),
            })
        }
    }
}
