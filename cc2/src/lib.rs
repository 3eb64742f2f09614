// Main library file for coupled-cluster diagram evaluation

pub mod config;
pub mod diagnostics;
pub mod energy_impl;
pub mod intermediates_impl;
pub mod io;
pub mod operators_impl;
pub mod orbital_impl;
pub mod potentials_impl;
pub mod projector_impl;
pub mod solver_impl;
