//! # extended-lattice: Time-Inhomogeneous Binomial Trees
//!
//! Binomial lattice schemes whose step geometry is evaluated at the elapsed
//! time of each layer, so the trees follow processes with term-structure
//! driven drift and volatility.
//!
//! ## Key Features
//!
//! - **Seven schemes**: Jarrow-Rudd, additive equiprobabilities,
//!   Cox-Ross-Rubinstein, Trigeorgis, Tian, Leisen-Reimer and Joshi4
//! - **Per-layer geometry**: up steps, jumps, factors and probabilities are
//!   functions of `t`, not constants
//! - **Memoization**: [`cache::Cache`] and the thread-safe [`cache::SyncCache`],
//!   plus [`lattice::MemoizedGeometry`] to evaluate each layer once
//! - **Instrumentation**: optional call counters selected with bitflags
//! - **Checked numerics**: out-of-range probabilities, negative radicands and
//!   degenerate denominators are errors, never clamped
//!
//! ## Quick Start
//!
//! ```rust
//! use extended_lattice::lattice::{BinomialLattice, TreeConfig, TreeKind};
//! use extended_lattice::models::BlackScholesProcess;
//! use std::sync::Arc;
//!
//! let process = Arc::new(BlackScholesProcess::flat(36.0, 0.06, 0.0, 0.2).unwrap());
//! let config = TreeConfig::new(1.0, 100).with_strike(40.0);
//! let tree = TreeKind::LeisenReimer.build(process, &config).unwrap();
//!
//! assert_eq!(tree.steps(), 101);
//! let top = tree.underlying(101, 101).unwrap();
//! let p = tree.probability(50, 20, 1).unwrap();
//! assert!(top > 36.0 && (0.0..=1.0).contains(&p));
//! ```
//!
//! Backward induction, discounting and payoffs are left to the caller.

pub mod analytics;
pub mod cache;
pub mod error;
pub mod instrumentation;
pub mod lattice;
pub mod math_utils;
pub mod models;

pub use error::{LatticeError, LatticeResult};
