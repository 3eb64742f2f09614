//! The operator layer of the diagram engine.
//!
//! `CcOperators` owns the reference determinant, the intermediate tables,
//! the projectors, and the per-iteration potential caches. It supplies the
//! screened-interaction dispatch (`apply_g12` / `apply_f12`), the exchange
//! operator on one- and two-particle functions, the regularized two-electron
//! operators ([K, f] and the nuclear-transformed Ue), and the Fock action on
//! tagged orbitals. The diagram assemblers in `potentials_impl` and the
//! energy evaluator in `energy_impl` are written against this layer.

mod operators;

pub use operators::CcOperators;
