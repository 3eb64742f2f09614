//! Tagged orbitals, orbital sets, and canonical pair storage.
//!
//! Every one-particle function carried through the diagram engine is tagged
//! with the role it plays in the cluster expansion (reference orbital,
//! cluster amplitude, relaxed orbital, response amplitude). The tags drive
//! operator dispatch: intermediates are tabulated for reference bra
//! orbitals, and several diagrams branch on the kind of their ket.

mod orbital;

pub use orbital::{
    Orbital, OrbitalKind, OrbitalSet, PairFunction, Pairs, ReferenceState,
};

#[cfg(test)]
mod tests;
