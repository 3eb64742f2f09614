use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::debug;

use mra::MraBackend;

use crate::diagnostics::fatal;
use crate::orbital_impl::OrbitalSet;

type Table<F> = BTreeMap<(usize, usize), F>;

/// Cached convolution intermediates over the reference orbitals.
pub struct Intermediates<B: MraBackend> {
    backend: Arc<B>,
    thresh: f64,
    mo_bra: Vec<B::F3>,
    mo_ket: Vec<B::F3>,

    /// Reference density sum_k bra_k ket_k.
    density: B::F3,
    /// Coulomb potential of the reference density.
    hartree: B::F3,
    /// <k| g |l> over all reference bra/ket pairs.
    exchange: Table<B::F3>,
    /// <k| f |l> over all reference bra/ket pairs.
    f12_exchange: Table<B::F3>,

    perturbed_density: Option<B::F3>,
    perturbed_hartree: Option<B::F3>,
    /// <k| g |tau_l> against the current ground-state singles.
    perturbed_exchange: Table<B::F3>,
    /// <k| f |tau_l> against the current ground-state singles.
    perturbed_f12_exchange: Table<B::F3>,

    /// <k| g |x_l> against the current response singles.
    response_exchange: Table<B::F3>,
    /// <k| f |x_l> against the current response singles.
    response_f12_exchange: Table<B::F3>,

    update_count: usize,
}

impl<B: MraBackend> Intermediates<B> {
    /// Build the reference-only tables eagerly; amplitude-dependent tables
    /// start empty until the first `update`.
    pub fn new(backend: Arc<B>, mo_bra: &[B::F3], mo_ket: &[B::F3], thresh: f64) -> Self {
        let mut density = backend.zero3();
        for (bra, ket) in mo_bra.iter().zip(mo_ket) {
            density = backend.add3(&density, &backend.mul3(bra, ket));
        }
        let mut hartree = backend.apply_coulomb(&density);
        backend.truncate3(&mut hartree, thresh);

        let mut intermediates = Intermediates {
            backend,
            thresh,
            mo_bra: mo_bra.to_vec(),
            mo_ket: mo_ket.to_vec(),
            density,
            hartree,
            exchange: Table::new(),
            f12_exchange: Table::new(),
            perturbed_density: None,
            perturbed_hartree: None,
            perturbed_exchange: Table::new(),
            perturbed_f12_exchange: Table::new(),
            response_exchange: Table::new(),
            response_f12_exchange: Table::new(),
            update_count: 0,
        };

        let kets: Vec<B::F3> = intermediates.mo_ket.clone();
        intermediates.exchange = intermediates.make_table(&kets, Kernel::Coulomb);
        intermediates.f12_exchange = intermediates.make_table(&kets, Kernel::F12);
        intermediates
    }

    fn make_table(&self, kets: &[B::F3], kernel: Kernel) -> Table<B::F3> {
        let b = &self.backend;
        let mut table = Table::new();
        for (k, bra) in self.mo_bra.iter().enumerate() {
            for (l, ket) in kets.iter().enumerate() {
                let product = b.mul3(bra, ket);
                let mut screened = match kernel {
                    Kernel::Coulomb => b.apply_coulomb(&product),
                    Kernel::F12 => b.apply_f12(&product),
                };
                b.truncate3(&mut screened, self.thresh);
                table.insert((k, l), screened);
            }
        }
        table
    }

    fn indexed_table(&self, singles: &OrbitalSet<B::F3>, kernel: Kernel) -> Table<B::F3> {
        let b = &self.backend;
        let mut table = Table::new();
        for (k, bra) in self.mo_bra.iter().enumerate() {
            for orb in singles.iter() {
                let product = b.mul3(bra, &orb.function);
                let mut screened = match kernel {
                    Kernel::Coulomb => b.apply_coulomb(&product),
                    Kernel::F12 => b.apply_f12(&product),
                };
                b.truncate3(&mut screened, self.thresh);
                table.insert((k, orb.index), screened);
            }
        }
        table
    }

    /// Rebuild the amplitude-dependent tables from the current ground-state
    /// singles. The perturbed density uses the relaxed kets
    /// t_l = phi_l + tau_l (frozen orbitals keep t_l = phi_l).
    pub fn update(&mut self, singles: &OrbitalSet<B::F3>) {
        let b = self.backend.clone();
        let mut density = b.zero3();
        for (l, (bra, ket)) in self.mo_bra.iter().zip(&self.mo_ket).enumerate() {
            let t = match singles.get_opt(l) {
                Some(orb) => b.add3(ket, &orb.function),
                None => ket.clone(),
            };
            density = b.add3(&density, &b.mul3(bra, &t));
        }
        let mut hartree = b.apply_coulomb(&density);
        b.truncate3(&mut hartree, self.thresh);

        self.perturbed_density = Some(density);
        self.perturbed_hartree = Some(hartree);
        self.perturbed_exchange = self.indexed_table(singles, Kernel::Coulomb);
        self.perturbed_f12_exchange = self.indexed_table(singles, Kernel::F12);
        self.update_count += 1;
        debug!(
            "intermediates updated ({} ground-state singles, update {})",
            singles.len(),
            self.update_count
        );
    }

    /// Rebuild the response tables from the current response singles.
    pub fn update_response(&mut self, response: &OrbitalSet<B::F3>) {
        self.response_exchange = self.indexed_table(response, Kernel::Coulomb);
        self.response_f12_exchange = self.indexed_table(response, Kernel::F12);
        self.update_count += 1;
        debug!(
            "response intermediates updated ({} response singles, update {})",
            response.len(),
            self.update_count
        );
    }

    pub fn density(&self) -> &B::F3 {
        &self.density
    }

    pub fn hartree(&self) -> &B::F3 {
        &self.hartree
    }

    pub fn perturbed_density(&self) -> &B::F3 {
        match &self.perturbed_density {
            Some(d) => d,
            None => fatal("perturbed density requested before the first update"),
        }
    }

    pub fn perturbed_hartree(&self) -> &B::F3 {
        match &self.perturbed_hartree {
            Some(h) => h,
            None => fatal("perturbed hartree potential requested before the first update"),
        }
    }

    fn lookup<'a>(table: &'a Table<B::F3>, k: usize, l: usize, what: &str) -> &'a B::F3 {
        match table.get(&(k, l)) {
            Some(f) => f,
            None => fatal(&format!("{} intermediate ({}, {}) not tabulated", what, k, l)),
        }
    }

    /// <k| g |l> over reference orbitals.
    pub fn ex(&self, k: usize, l: usize) -> &B::F3 {
        Self::lookup(&self.exchange, k, l, "exchange")
    }

    /// <k| f |l> over reference orbitals.
    pub fn fex(&self, k: usize, l: usize) -> &B::F3 {
        Self::lookup(&self.f12_exchange, k, l, "f12-exchange")
    }

    /// <k| g |tau_l>.
    pub fn pex(&self, k: usize, l: usize) -> &B::F3 {
        Self::lookup(&self.perturbed_exchange, k, l, "perturbed exchange")
    }

    /// <k| f |tau_l>.
    pub fn pfex(&self, k: usize, l: usize) -> &B::F3 {
        Self::lookup(&self.perturbed_f12_exchange, k, l, "perturbed f12-exchange")
    }

    /// <k| g |x_l>.
    pub fn rex(&self, k: usize, l: usize) -> &B::F3 {
        Self::lookup(&self.response_exchange, k, l, "response exchange")
    }

    /// <k| f |x_l>.
    pub fn rfex(&self, k: usize, l: usize) -> &B::F3 {
        Self::lookup(&self.response_f12_exchange, k, l, "response f12-exchange")
    }

    /// Number of completed table rebuilds, for staleness checks.
    pub fn update_count(&self) -> usize {
        self.update_count
    }
}

#[derive(Clone, Copy)]
enum Kernel {
    Coulomb,
    F12,
}
