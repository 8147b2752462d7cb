// tests/common/mod.rs
#![allow(dead_code)]

use extended_lattice::lattice::BinomialLattice;
use extended_lattice::LatticeResult;

pub const SPOT: f64 = 36.0;
pub const STRIKE: f64 = 40.0;
pub const RATE: f64 = 0.06;
pub const VOL: f64 = 0.2;
pub const MATURITY: f64 = 1.0;

#[derive(Clone, Debug)]
pub enum Exercise {
    European,
    /// Early exercise allowed at the listed steps only.
    Bermudan(Vec<usize>),
    American,
}

impl Exercise {
    fn allowed(&self, i: usize) -> bool {
        match self {
            Exercise::European => false,
            Exercise::Bermudan(steps) => steps.contains(&i),
            Exercise::American => true,
        }
    }
}

/// Roll a vanilla put back through `lattice` under a flat discount rate.
pub fn rollback_put(
    lattice: &dyn BinomialLattice,
    strike: f64,
    rate: f64,
    exercise: &Exercise,
) -> LatticeResult<f64> {
    let n = lattice.steps();
    let discount = (-rate * lattice.dt()).exp();

    let mut values = (0..lattice.size(n))
        .map(|j| Ok((strike - lattice.underlying(n, j)?).max(0.0)))
        .collect::<LatticeResult<Vec<f64>>>()?;

    for i in (0..n).rev() {
        let mut layer = Vec::with_capacity(lattice.size(i));
        for j in 0..lattice.size(i) {
            let up = values[lattice.descendant(i, j, 1)];
            let down = values[lattice.descendant(i, j, 0)];
            let pu = lattice.probability(i, j, 1)?;
            let pd = lattice.probability(i, j, 0)?;
            let mut value = discount * (pu * up + pd * down);
            if exercise.allowed(i) {
                value = value.max(strike - lattice.underlying(i, j)?);
            }
            layer.push(value);
        }
        values = layer;
    }
    Ok(values[0])
}

/// Quarterly exercise dates on an `n`-step, one-year grid.
pub fn quarterly(n: usize) -> Vec<usize> {
    (1..=3).map(|q| q * n / 4).collect()
}
