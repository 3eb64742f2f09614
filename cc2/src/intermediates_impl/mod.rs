//! Tabulated convolution intermediates.
//!
//! Screened-interaction functions of the form <k| op |l> appear in nearly
//! every diagram, so they are computed once per amplitude update and served
//! from tables afterwards. Reference-only tables are filled eagerly at
//! construction; amplitude-dependent (perturbed) and response tables are
//! rebuilt by the explicit `update` entry points, which the iteration driver
//! calls after every amplitude change.

mod intermediates;

pub use intermediates::Intermediates;

#[cfg(test)]
mod tests;
