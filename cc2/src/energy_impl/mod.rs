//! Two-electron integral and correlation-energy evaluation.
//!
//! All energies reduce to integrals of the form <ij| op |xy> over bra
//! orbital products and <ij| g |u> over stored pair functions; the projected
//! integral <ij| g Q12 f |xy> is expanded over the intermediate tables
//! instead of constructing the projected pair explicitly.

mod energy;

#[cfg(test)]
mod tests;
