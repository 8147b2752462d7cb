// demos/extended_trees.rs
//! Prices an American, a Bermudan and a European put on every scheme.
//!
//! Run with `RUST_LOG=debug` to see the lattice construction events.
use extended_lattice::analytics::bs_analytic;
use extended_lattice::lattice::{BinomialLattice, MemoizedGeometry, TreeConfig, TreeKind};
use extended_lattice::math_utils::Timer;
use extended_lattice::models::BlackScholesProcess;
use extended_lattice::LatticeResult;
use rayon::prelude::*;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

const SPOT: f64 = 36.0;
const STRIKE: f64 = 40.0;
const RATE: f64 = 0.06;
const DIVIDEND: f64 = 0.0;
const VOL: f64 = 0.2;
const MATURITY: f64 = 1.0;
const STEPS: usize = 500;

#[derive(Clone, Copy, Debug)]
enum Exercise {
    European,
    Bermudan,
    American,
}

impl Exercise {
    const ALL: [Exercise; 3] = [Exercise::European, Exercise::Bermudan, Exercise::American];

    fn label(&self) -> &'static str {
        match self {
            Exercise::European => "European",
            Exercise::Bermudan => "Bermudan",
            Exercise::American => "American",
        }
    }

    /// Bermudan exercise is allowed at the end of each quarter.
    fn allowed(&self, i: usize, steps: usize) -> bool {
        match self {
            Exercise::European => false,
            Exercise::Bermudan => (1..4).any(|quarter| i == quarter * steps / 4),
            Exercise::American => true,
        }
    }
}

fn rollback_put(
    lattice: &dyn BinomialLattice,
    process: &BlackScholesProcess,
    exercise: Exercise,
) -> LatticeResult<f64> {
    let n = lattice.steps();
    let mut values = (0..lattice.size(n))
        .map(|j| Ok((STRIKE - lattice.underlying(n, j)?).max(0.0)))
        .collect::<LatticeResult<Vec<f64>>>()?;

    for i in (0..n).rev() {
        let discount = process.discount_between(lattice.base().step_time(i), lattice.dt());
        let mut layer = Vec::with_capacity(lattice.size(i));
        for j in 0..lattice.size(i) {
            let pu = lattice.probability(i, j, 1)?;
            let pd = lattice.probability(i, j, 0)?;
            let continuation = discount
                * (pu * values[lattice.descendant(i, j, 1)] + pd * values[lattice.descendant(i, j, 0)]);
            let value = if exercise.allowed(i, n) {
                continuation.max(STRIKE - lattice.underlying(i, j)?)
            } else {
                continuation
            };
            layer.push(value);
        }
        values = layer;
    }
    Ok(values[0])
}

struct SchemeResult {
    kind: TreeKind,
    prices: LatticeResult<[f64; 3]>,
    elapsed_ms: f64,
}

fn price_scheme(kind: TreeKind, process: &Arc<BlackScholesProcess>) -> SchemeResult {
    let timer = Timer::new();
    let prices = (|| -> LatticeResult<[f64; 3]> {
        let config = TreeConfig::new(MATURITY, STEPS).with_strike(STRIKE);
        let tree: Arc<dyn BinomialLattice> = Arc::from(kind.build(process.clone(), &config)?);
        let lattice = MemoizedGeometry::new(tree);
        lattice.warm()?;
        let mut prices = [0.0; 3];
        for (slot, exercise) in prices.iter_mut().zip(Exercise::ALL) {
            *slot = rollback_put(&lattice, process, exercise)?;
        }
        Ok(prices)
    })();
    SchemeResult {
        kind,
        prices,
        elapsed_ms: timer.elapsed_ms(),
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("Extended binomial trees on {} threads\n", num_cpus::get());
    println!("Option type = Put");
    println!("Maturity = {} year", MATURITY);
    println!("Underlying price = {}", SPOT);
    println!("Strike = {}", STRIKE);
    println!("Risk-free interest rate = {:.2}%", RATE * 100.0);
    println!("Dividend yield = {:.2}%", DIVIDEND * 100.0);
    println!("Volatility = {:.2}%", VOL * 100.0);
    println!("Time steps = {}\n", STEPS);

    let process = match BlackScholesProcess::flat(SPOT, RATE, DIVIDEND, VOL) {
        Ok(process) => Arc::new(process),
        Err(e) => {
            eprintln!("invalid market data: {}", e);
            std::process::exit(1);
        }
    };

    let results: Vec<SchemeResult> = TreeKind::ALL
        .par_iter()
        .map(|&kind| price_scheme(kind, &process))
        .collect();

    println!(
        "{:<28} {:>10} {:>10} {:>10} {:>10}",
        "Method",
        Exercise::ALL[0].label(),
        Exercise::ALL[1].label(),
        Exercise::ALL[2].label(),
        "ms"
    );
    match bs_analytic::bs_put_price(SPOT, STRIKE, RATE, DIVIDEND, VOL, MATURITY) {
        Ok(reference) => println!(
            "{:<28} {:>10.6} {:>10} {:>10}",
            "Black-Scholes", reference, "N/A", "N/A"
        ),
        Err(e) => println!("{:<28} {}", "Black-Scholes", e),
    }
    for result in &results {
        match &result.prices {
            Ok([european, bermudan, american]) => println!(
                "{:<28} {:>10.6} {:>10.6} {:>10.6} {:>10.1}",
                result.kind.name(),
                european,
                bermudan,
                american,
                result.elapsed_ms
            ),
            Err(e) => println!("{:<28} failed: {}", result.kind.name(), e),
        }
    }
}
