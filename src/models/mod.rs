// src/models/mod.rs
pub mod black_scholes;
pub mod ou_process;
pub mod process;
pub mod term_structure;

pub use black_scholes::BlackScholesProcess;
pub use ou_process::OuProcess;
pub use process::StochasticProcess1D;
pub use term_structure::PiecewiseFlatCurve;
