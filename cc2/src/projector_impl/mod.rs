//! Projectors onto and out of the occupied reference space.
//!
//! `Projector` realizes Q = 1 - O with O = sum_k |k><k| on one-particle
//! functions; `StrongOrthogonalityProjector` realizes
//! Q12 = 1 - O1 - O2 + O1 O2 on pair functions. Both are built from the
//! same bra/ket orbital lists so a non-orthonormal (weighted-bra) reference
//! is handled uniformly.

mod projector;

pub use projector::{Projector, StrongOrthogonalityProjector};
