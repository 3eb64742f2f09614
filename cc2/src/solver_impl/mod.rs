//! Demonstration amplitude-update driver.
//!
//! Macro-iterates the singles and doubles amplitudes against the assembled
//! potentials: singles through the backend's bound-state Green's function,
//! doubles through an energy-denominator preconditioner. The driver owns the
//! clear/check discipline of the cached potentials and logs a convergence
//! table per macro iteration.

mod solver;

pub use solver::{Cc2Output, Cc2Solver};
