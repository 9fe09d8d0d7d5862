//! Generalized Kolmogorov Equation terms of a turbulent channel flow, computed from the
//! velocity and pressure snapshots of a direct numerical simulation.


pub mod constants;
pub mod context;
pub mod convolution;
pub mod correlation;
pub mod dns;
pub mod engine;
pub mod error;
pub mod grid;
pub mod offset;
pub mod parameters;
pub mod snapshot;
pub mod statistics;
pub mod store;
pub mod terms;
pub mod transform;
pub mod wavenumbers;
pub mod workers;
pub mod workspace;

pub use error::{Error, Result};
