use std::collections::BTreeMap;
use std::fmt;

use crate::diagnostics::fatal;

/// Role of a one-particle function in the cluster expansion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrbitalKind {
    /// Occupied reference orbital phi_i.
    Hole,
    /// Ground-state singles amplitude tau_i.
    Particle,
    /// Relaxed orbital t_i = phi_i + tau_i.
    Mixed,
    /// Excited-state (response) singles amplitude x_i.
    Response,
    /// Not yet assigned; any dispatch on this kind is an error.
    Undefined,
}

impl fmt::Display for OrbitalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self {
            OrbitalKind::Hole => "phi",
            OrbitalKind::Particle => "tau",
            OrbitalKind::Mixed => "t",
            OrbitalKind::Response => "x",
            OrbitalKind::Undefined => "?",
        };
        write!(f, "{}", tag)
    }
}

/// A tagged one-particle function.
#[derive(Debug, Clone)]
pub struct Orbital<F> {
    pub index: usize,
    pub kind: OrbitalKind,
    pub function: F,
}

impl<F> Orbital<F> {
    pub fn new(index: usize, kind: OrbitalKind, function: F) -> Self {
        Orbital {
            index,
            kind,
            function,
        }
    }

    /// Display name, e.g. "tau_3".
    pub fn name(&self) -> String {
        format!("{}_{}", self.kind, self.index)
    }
}

/// Orbitals keyed by occupied index.
#[derive(Debug, Clone)]
pub struct OrbitalSet<F> {
    orbitals: BTreeMap<usize, Orbital<F>>,
}

impl<F> Default for OrbitalSet<F> {
    fn default() -> Self {
        OrbitalSet {
            orbitals: BTreeMap::new(),
        }
    }
}

impl<F: Clone> OrbitalSet<F> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a set from consecutively indexed functions of one kind.
    pub fn from_functions(kind: OrbitalKind, functions: &[F]) -> Self {
        let mut set = Self::new();
        for (i, f) in functions.iter().enumerate() {
            set.insert(Orbital::new(i, kind, f.clone()));
        }
        set
    }

    pub fn insert(&mut self, orbital: Orbital<F>) {
        self.orbitals.insert(orbital.index, orbital);
    }

    /// Access by index; a missing index is an unrecoverable bug in the
    /// calling diagram.
    pub fn get(&self, index: usize) -> &Orbital<F> {
        match self.orbitals.get(&index) {
            Some(orb) => orb,
            None => fatal(&format!("orbital index {} out of range", index)),
        }
    }

    pub fn get_opt(&self, index: usize) -> Option<&Orbital<F>> {
        self.orbitals.get(&index)
    }

    pub fn len(&self) -> usize {
        self.orbitals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orbitals.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Orbital<F>> {
        self.orbitals.values()
    }

    pub fn indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.orbitals.keys().copied()
    }
}

/// A pair function u_ij with its index pair.
#[derive(Debug, Clone)]
pub struct PairFunction<F> {
    pub i: usize,
    pub j: usize,
    pub function: F,
}

impl<F> PairFunction<F> {
    pub fn new(i: usize, j: usize, function: F) -> Self {
        PairFunction { i, j, function }
    }

    pub fn name(&self) -> String {
        format!("u_{}{}", self.i, self.j)
    }
}

/// Canonical i <= j storage for pair quantities.
///
/// Only the ordered half of the pair matrix is stored; the i > j element is
/// recovered by the caller through particle exchange.
#[derive(Debug, Clone)]
pub struct Pairs<T> {
    entries: BTreeMap<(usize, usize), T>,
}

impl<T> Default for Pairs<T> {
    fn default() -> Self {
        Pairs {
            entries: BTreeMap::new(),
        }
    }
}

impl<T> Pairs<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, i: usize, j: usize, value: T) {
        if i > j {
            fatal(&format!("pair ({}, {}) violates canonical ordering", i, j));
        }
        self.entries.insert((i, j), value);
    }

    pub fn get(&self, i: usize, j: usize) -> Option<&T> {
        self.entries.get(&(i, j))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&(usize, usize), &T)> {
        self.entries.iter()
    }
}

/// The frozen reference determinant the cluster expansion is built on.
#[derive(Debug, Clone)]
pub struct ReferenceState<F> {
    /// Bra orbitals; carry the nuclear-correlation weight where the backend
    /// uses one.
    pub mo_bra: Vec<F>,
    /// Ket orbitals.
    pub mo_ket: Vec<F>,
    /// Canonical orbital energies epsilon_i.
    pub orbital_energies: Vec<f64>,
    /// Local nuclear potential, if the model carries one.
    pub nuclear_potential: Option<F>,
}
