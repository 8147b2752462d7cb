// tests/convergence_test.rs
mod common;

use common::*;
use extended_lattice::analytics::bs_put_price;
use extended_lattice::lattice::{BinomialLattice, MemoizedGeometry, TreeConfig, TreeKind};
use extended_lattice::models::{BlackScholesProcess, StochasticProcess1D};
use rayon::prelude::*;
use std::sync::Arc;

fn process() -> Arc<dyn StochasticProcess1D> {
    Arc::new(BlackScholesProcess::flat(SPOT, RATE, 0.0, VOL).unwrap())
}

fn european_error(kind: TreeKind, steps: usize) -> f64 {
    let config = TreeConfig::new(MATURITY, steps).with_strike(STRIKE);
    let tree: Arc<dyn BinomialLattice> = Arc::from(kind.build(process(), &config).unwrap());
    let lattice = MemoizedGeometry::new(tree);
    let price = rollback_put(&lattice, STRIKE, RATE, &Exercise::European).unwrap();
    let reference = bs_put_price(SPOT, STRIKE, RATE, 0.0, VOL, MATURITY).unwrap();
    (price - reference).abs()
}

#[test]
fn test_strike_centred_trees_converge() {
    for kind in [TreeKind::LeisenReimer, TreeKind::Joshi4] {
        let errors: Vec<f64> = [25, 101, 401]
            .iter()
            .map(|&n| european_error(kind, n))
            .collect();
        println!("{} errors: {:?}", kind.name(), errors);
        assert!(errors[2] < errors[0], "{} did not converge: {:?}", kind.name(), errors);
        assert!(errors[1] < 2e-3, "{} error at 101 steps: {}", kind.name(), errors[1]);
        assert!(errors[2] < 5e-4, "{} error at 401 steps: {}", kind.name(), errors[2]);
    }
}

#[test]
fn test_every_scheme_prices_european_put() {
    let reference = bs_put_price(SPOT, STRIKE, RATE, 0.0, VOL, MATURITY).unwrap();
    let errors: Vec<(TreeKind, f64)> = TreeKind::ALL
        .par_iter()
        .map(|&kind| (kind, european_error(kind, 500)))
        .collect();
    for (kind, error) in errors {
        println!("{:<28} |error| = {:.6}", kind.name(), error);
        assert!(
            error < 0.02,
            "{} misses Black-Scholes {:.4} by {}",
            kind.name(),
            reference,
            error
        );
    }
}

#[test]
fn test_early_exercise_ordering() {
    let config = TreeConfig::new(MATURITY, 200).with_strike(STRIKE);
    for kind in TreeKind::ALL {
        let tree: Arc<dyn BinomialLattice> = Arc::from(kind.build(process(), &config).unwrap());
        let lattice = MemoizedGeometry::new(tree);
        let n = lattice.steps();
        let european = rollback_put(&lattice, STRIKE, RATE, &Exercise::European).unwrap();
        let bermudan =
            rollback_put(&lattice, STRIKE, RATE, &Exercise::Bermudan(quarterly(n))).unwrap();
        let american = rollback_put(&lattice, STRIKE, RATE, &Exercise::American).unwrap();
        println!(
            "{:<28} E = {:.4}  B = {:.4}  A = {:.4}",
            kind.name(),
            european,
            bermudan,
            american
        );
        assert!(bermudan >= european - 1e-12, "{}", kind.name());
        assert!(american >= bermudan - 1e-12, "{}", kind.name());
        // American put on these inputs is worth about 4.48
        assert!((american - 4.48).abs() < 0.03, "{} American = {}", kind.name(), american);
    }
}

#[test]
fn test_memoized_and_plain_lattices_agree() {
    let config = TreeConfig::new(MATURITY, 60).with_strike(STRIKE);
    for kind in TreeKind::ALL {
        let plain = kind.build(process(), &config).unwrap();
        let shared: Arc<dyn BinomialLattice> = Arc::from(kind.build(process(), &config).unwrap());
        let memo = MemoizedGeometry::new(shared);
        let a = rollback_put(plain.as_ref(), STRIKE, RATE, &Exercise::American).unwrap();
        let b = rollback_put(&memo, STRIKE, RATE, &Exercise::American).unwrap();
        assert_eq!(a, b, "{}", kind.name());
    }
}
