use std::cell::RefCell;
use std::ops::Range;
use std::sync::Arc;

use tracing::info;

use mra::{MraBackend, PairOp, Particle};

use crate::config::CcParams;
use crate::diagnostics::{fatal, Diagnostics};
use crate::intermediates_impl::Intermediates;
use crate::orbital_impl::{Orbital, OrbitalKind, OrbitalSet, Pairs, ReferenceState};
use crate::projector_impl::{Projector, StrongOrthogonalityProjector};

/// Operator layer over a fixed reference determinant.
pub struct CcOperators<B: MraBackend> {
    pub(crate) backend: Arc<B>,
    pub(crate) params: CcParams,
    pub(crate) mo_bra: Vec<B::F3>,
    pub(crate) mo_ket: Vec<B::F3>,
    pub(crate) orbital_energies: Vec<f64>,
    pub(crate) nuclear_potential: Option<B::F3>,
    pub(crate) intermediates: Intermediates<B>,
    pub(crate) q: Projector<B>,
    pub(crate) q12: StrongOrthogonalityProjector<B>,
    /// Singles potential of the last assembled singles vector, consumed by
    /// the Fock action on amplitude orbitals.
    pub(crate) current_singles_potential: RefCell<Vec<B::F3>>,
    /// Pair-contraction caches reused between the u-part diagrams and their
    /// callers within one macro iteration.
    pub(crate) current_s2b_u_part: RefCell<Vec<B::F3>>,
    pub(crate) current_s2c_u_part: RefCell<Vec<B::F3>>,
    pub(crate) diagnostics: Diagnostics,
}

impl<B: MraBackend> CcOperators<B> {
    pub fn new(backend: Arc<B>, reference: ReferenceState<B::F3>, params: CcParams) -> Self {
        let n = reference.mo_ket.len();
        if reference.mo_bra.len() != n {
            fatal(&format!(
                "reference has {} bra but {} ket orbitals",
                reference.mo_bra.len(),
                n
            ));
        }
        if reference.orbital_energies.len() != n {
            fatal(&format!(
                "reference has {} orbitals but {} orbital energies",
                n,
                reference.orbital_energies.len()
            ));
        }
        if params.freeze > n {
            fatal(&format!(
                "cannot freeze {} of {} occupied orbitals",
                params.freeze, n
            ));
        }

        info!("----------------------------------------");
        info!("Coupled-cluster operator layer");
        info!("  occupied orbitals:  {}", n);
        info!("  frozen orbitals:    {}", params.freeze);
        info!("  gamma:              {:.4}", backend.gamma());
        info!("  thresh (3d / 6d):   {:.1e} / {:.1e}", params.thresh_3d, params.thresh_6d);
        info!("----------------------------------------");

        let intermediates = Intermediates::new(
            backend.clone(),
            &reference.mo_bra,
            &reference.mo_ket,
            params.thresh_3d,
        );
        let q = Projector::new(
            backend.clone(),
            reference.mo_bra.clone(),
            reference.mo_ket.clone(),
        );
        let q12 = StrongOrthogonalityProjector::new(
            backend.clone(),
            reference.mo_bra.clone(),
            reference.mo_ket.clone(),
        );

        CcOperators {
            backend,
            params,
            mo_bra: reference.mo_bra,
            mo_ket: reference.mo_ket,
            orbital_energies: reference.orbital_energies,
            nuclear_potential: reference.nuclear_potential,
            intermediates,
            q,
            q12,
            current_singles_potential: RefCell::new(Vec::new()),
            current_s2b_u_part: RefCell::new(Vec::new()),
            current_s2c_u_part: RefCell::new(Vec::new()),
            diagnostics: Diagnostics::new(),
        }
    }

    // --- reference accessors ---

    pub fn backend(&self) -> &Arc<B> {
        &self.backend
    }

    pub fn params(&self) -> &CcParams {
        &self.params
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    pub fn n_occupied(&self) -> usize {
        self.mo_ket.len()
    }

    /// Indices of the correlated (non-frozen) occupied orbitals.
    pub fn active(&self) -> Range<usize> {
        self.params.freeze..self.n_occupied()
    }

    pub fn mo_bra(&self, i: usize) -> &B::F3 {
        match self.mo_bra.get(i) {
            Some(f) => f,
            None => fatal(&format!("bra orbital index {} out of range", i)),
        }
    }

    pub fn mo_ket(&self, i: usize) -> &B::F3 {
        match self.mo_ket.get(i) {
            Some(f) => f,
            None => fatal(&format!("ket orbital index {} out of range", i)),
        }
    }

    pub fn epsilon(&self, i: usize) -> f64 {
        match self.orbital_energies.get(i) {
            Some(&e) => e,
            None => fatal(&format!("orbital energy index {} out of range", i)),
        }
    }

    /// Pair energy denominator epsilon_i + epsilon_j.
    pub fn epsilon_pair(&self, i: usize, j: usize) -> f64 {
        self.epsilon(i) + self.epsilon(j)
    }

    fn hole_bra(&self, k: usize) -> Orbital<B::F3> {
        Orbital::new(k, OrbitalKind::Hole, self.mo_bra(k).clone())
    }

    pub fn projector(&self) -> &Projector<B> {
        &self.q
    }

    pub fn strong_orthogonality(&self) -> &StrongOrthogonalityProjector<B> {
        &self.q12
    }

    pub fn intermediates(&self) -> &Intermediates<B> {
        &self.intermediates
    }

    // --- intermediate maintenance ---

    pub fn update_intermediates(&mut self, singles: &OrbitalSet<B::F3>) {
        self.intermediates.update(singles);
    }

    pub fn update_response_intermediates(&mut self, response: &OrbitalSet<B::F3>) {
        self.intermediates.update_response(response);
    }

    /// Relaxed orbitals t_i = phi_i + tau_i over all occupied indices.
    /// Indices without a singles amplitude (frozen orbitals) keep t_i = phi_i
    /// and stay reference-tagged so dispatch serves them from the reference
    /// tables.
    pub fn make_t_intermediate(&self, singles: &OrbitalSet<B::F3>) -> OrbitalSet<B::F3> {
        let mut t = OrbitalSet::new();
        for i in 0..self.n_occupied() {
            let orbital = match singles.get_opt(i) {
                Some(orb) => Orbital::new(
                    i,
                    OrbitalKind::Mixed,
                    self.backend.add3(self.mo_ket(i), &orb.function),
                ),
                None => Orbital::new(i, OrbitalKind::Hole, self.mo_ket(i).clone()),
            };
            t.insert(orbital);
        }
        t
    }

    // --- screened-interaction dispatch ---

    /// <bra| g |ket> resolved through the intermediate tables where the
    /// orbital kinds allow it, by direct convolution otherwise.
    pub fn apply_g12(&self, bra: &Orbital<B::F3>, ket: &Orbital<B::F3>) -> B::F3 {
        self.apply_screened(bra, ket, ScreenedOp::Coulomb)
    }

    /// <bra| f |ket>, same dispatch as [`apply_g12`](Self::apply_g12).
    pub fn apply_f12(&self, bra: &Orbital<B::F3>, ket: &Orbital<B::F3>) -> B::F3 {
        self.apply_screened(bra, ket, ScreenedOp::F12)
    }

    fn apply_screened(
        &self,
        bra: &Orbital<B::F3>,
        ket: &Orbital<B::F3>,
        op: ScreenedOp,
    ) -> B::F3 {
        let b = &self.backend;
        if bra.kind != OrbitalKind::Hole {
            self.diagnostics.warn(format!(
                "screened interaction with non-reference bra {}, computing directly",
                bra.name()
            ));
            return self.convolve(&b.mul3(&bra.function, &ket.function), op);
        }
        let (k, l) = (bra.index, ket.index);
        let im = &self.intermediates;
        match (ket.kind, op) {
            (OrbitalKind::Hole, ScreenedOp::Coulomb) => im.ex(k, l).clone(),
            (OrbitalKind::Hole, ScreenedOp::F12) => im.fex(k, l).clone(),
            (OrbitalKind::Particle, ScreenedOp::Coulomb) => im.pex(k, l).clone(),
            (OrbitalKind::Particle, ScreenedOp::F12) => im.pfex(k, l).clone(),
            (OrbitalKind::Mixed, ScreenedOp::Coulomb) => b.add3(im.ex(k, l), im.pex(k, l)),
            (OrbitalKind::Mixed, ScreenedOp::F12) => b.add3(im.fex(k, l), im.pfex(k, l)),
            (OrbitalKind::Response, ScreenedOp::Coulomb) => im.rex(k, l).clone(),
            (OrbitalKind::Response, ScreenedOp::F12) => im.rfex(k, l).clone(),
            (OrbitalKind::Undefined, _) => {
                self.diagnostics.warn(format!(
                    "screened interaction with untagged ket {}, computing directly",
                    ket.name()
                ));
                self.convolve(&b.mul3(&bra.function, &ket.function), op)
            }
        }
    }

    fn convolve(&self, f: &B::F3, op: ScreenedOp) -> B::F3 {
        match op {
            ScreenedOp::Coulomb => self.backend.apply_coulomb(f),
            ScreenedOp::F12 => self.backend.apply_f12(f),
        }
    }

    /// The product kernel g12 f12 applied as the difference of a Coulomb and
    /// a Helmholtz convolution, (g - bsh(gamma)) / (2 gamma).
    pub fn apply_gf(&self, f: &B::F3) -> B::F3 {
        let b = &self.backend;
        let gamma = b.gamma();
        let diff = b.sub3(&b.apply_coulomb(f), &b.apply_bsh(f, gamma));
        b.scale3(&diff, 1.0 / (2.0 * gamma))
    }

    // --- exchange ---

    /// Exchange operator on a tagged orbital, served from the intermediate
    /// tables: K|ket> = sum_k <k|g|ket> |phi_k>.
    pub fn exchange(&self, ket: &Orbital<B::F3>) -> B::F3 {
        let b = &self.backend;
        let mut result = b.zero3();
        for k in 0..self.n_occupied() {
            let screened = self.apply_g12(&self.hole_bra(k), ket);
            result = b.add3(&result, &b.mul3(&screened, self.mo_ket(k)));
        }
        result
    }

    /// Exchange operator on an untagged function, by direct convolution.
    pub fn exchange_fn(&self, f: &B::F3) -> B::F3 {
        let b = &self.backend;
        let mut result = b.zero3();
        for k in 0..self.n_occupied() {
            let screened = b.apply_coulomb(&b.mul3(self.mo_bra(k), f));
            result = b.add3(&result, &b.mul3(&screened, self.mo_ket(k)));
        }
        result
    }

    /// Exchange acting on one slot of a pair function.
    pub fn apply_k_particle(&self, u: &B::F6, p: Particle) -> B::F6 {
        let b = &self.backend;
        let mut result = b.zero6();
        for k in 0..self.n_occupied() {
            let weighted = b.mul_particle(u, p, self.mo_bra(k));
            let screened = b.apply_coulomb_particle(&weighted, p);
            result = b.add6(&result, &b.mul_particle(&screened, p, self.mo_ket(k)));
        }
        result
    }

    /// K u = K1 u + K2 u. For a particle-symmetric pair the second half is
    /// the particle swap of the first.
    pub fn exchange_pair(&self, u: &B::F6, symmetric: bool) -> B::F6 {
        let b = &self.backend;
        let k1 = self.apply_k_particle(u, Particle::One);
        if symmetric {
            b.add6(&k1, &b.swap_particles(&k1))
        } else {
            b.add6(&k1, &self.apply_k_particle(u, Particle::Two))
        }
    }

    // --- decomposed pair constructors ---

    /// |x(1) y(2)>, truncated to the pair tolerance.
    pub fn make_xy(&self, x: &Orbital<B::F3>, y: &Orbital<B::F3>) -> B::F6 {
        let mut u = self.backend.outer(&x.function, &y.function);
        self.backend.truncate6(&mut u, self.params.thresh_6d);
        u
    }

    /// f12 |x(1) y(2)>, truncated to the pair tolerance.
    pub fn make_f_xy(&self, x: &Orbital<B::F3>, y: &Orbital<B::F3>) -> B::F6 {
        let mut u = self
            .backend
            .op_pair(&x.function, &y.function, PairOp::SlaterF12);
        self.backend.truncate6(&mut u, self.params.thresh_6d);
        u
    }

    // --- regularized two-electron operators ---

    /// K f12 |xy>.
    pub fn apply_kf(&self, x: &Orbital<B::F3>, y: &Orbital<B::F3>) -> B::F6 {
        let symmetric = x.index == y.index && x.kind == y.kind;
        self.exchange_pair(&self.make_f_xy(x, y), symmetric)
    }

    /// f12 K |xy> = f12 |Kx y> + f12 |x Ky>.
    pub fn apply_fk(&self, x: &Orbital<B::F3>, y: &Orbital<B::F3>) -> B::F6 {
        let b = &self.backend;
        let kx = self.exchange(x);
        let ky = self.exchange(y);
        b.add6(
            &b.op_pair(&kx, &y.function, PairOp::SlaterF12),
            &b.op_pair(&x.function, &ky, PairOp::SlaterF12),
        )
    }

    /// The exchange commutator [K, f12] |xy>.
    pub fn apply_exchange_commutator(&self, x: &Orbital<B::F3>, y: &Orbital<B::F3>) -> B::F6 {
        let b = &self.backend;
        let mut result = b.sub6(&self.apply_kf(x, y), &self.apply_fk(x, y));
        b.truncate6(&mut result, self.params.thresh_6d);
        result
    }

    /// The nuclear-transformed electronic regularization operator.
    ///
    /// On top of the flat Ue action the nuclear correlation factor adds the
    /// commutator correction -Uloc (Un(1) - Un(2)) |xy>; without a nuclear
    /// potential the correction vanishes.
    pub fn apply_transformed_ue(&self, x: &Orbital<B::F3>, y: &Orbital<B::F3>) -> B::F6 {
        let b = &self.backend;
        let mut result = b.apply_ue_pair(&x.function, &y.function);
        if let Some(un) = &self.nuclear_potential {
            let asym = b.sub6(
                &b.outer(&b.mul3(un, &x.function), &y.function),
                &b.outer(&x.function, &b.mul3(un, &y.function)),
            );
            result = b.sub6(&result, &b.mul6(&b.ue_local(), &asym));
        }
        b.truncate6(&mut result, self.params.thresh_6d);
        result
    }

    // --- Fock action ---

    /// Action of the Fock operator on a tagged orbital. Reference orbitals
    /// are Fock eigenfunctions; amplitude orbitals substitute the stored
    /// singles potential for their residual part.
    pub fn apply_f(&self, orb: &Orbital<B::F3>) -> B::F3 {
        let b = &self.backend;
        let eps = self.epsilon(orb.index);
        let diagonal = b.scale3(&orb.function, eps);
        match orb.kind {
            OrbitalKind::Hole => diagonal,
            OrbitalKind::Particle | OrbitalKind::Mixed | OrbitalKind::Response => {
                let stored = self.current_singles_potential.borrow();
                if stored.is_empty() {
                    self.diagnostics.warn(format!(
                        "Fock action on {} without a stored singles potential, using diagonal part only",
                        orb.name()
                    ));
                    return diagonal;
                }
                let slot = orb.index - self.params.freeze;
                match stored.get(slot) {
                    Some(v) => b.sub3(&diagonal, v),
                    None => fatal(&format!(
                        "stored singles potential has no entry for {}",
                        orb.name()
                    )),
                }
            }
            OrbitalKind::Undefined => {
                fatal(&format!("Fock action on untagged orbital {}", orb.name()))
            }
        }
    }

    // --- pair access ---

    /// Stored pair for i <= j, particle-swapped pair otherwise.
    pub fn get_pair_function(&self, pairs: &Pairs<B::F6>, i: usize, j: usize) -> B::F6 {
        if i <= j {
            match pairs.get(i, j) {
                Some(u) => u.clone(),
                None => fatal(&format!("pair ({}, {}) not stored", i, j)),
            }
        } else {
            match pairs.get(j, i) {
                Some(u) => self.backend.swap_particles(u),
                None => fatal(&format!("pair ({}, {}) not stored", j, i)),
            }
        }
    }

    /// The full regularized pair tau_ij = u_ij + Q12 f12 |t_i t_j>.
    pub fn make_full_pair_function(
        &self,
        u: &B::F6,
        ti: &Orbital<B::F3>,
        tj: &Orbital<B::F3>,
    ) -> B::F6 {
        let tail = self.q12.apply(&self.make_f_xy(ti, tj));
        self.backend.add6(u, &tail)
    }

    /// The regularization tails Q12 f12 |t_i t_j> for all active canonical
    /// pairs, used by the residual singles diagrams.
    pub fn make_regularization_tails(&self, singles: &OrbitalSet<B::F3>) -> Pairs<B::F6> {
        let t = self.make_t_intermediate(singles);
        let mut tails = Pairs::new();
        for i in self.active() {
            for j in self.active() {
                if i > j {
                    continue;
                }
                let tail = self.q12.apply(&self.make_f_xy(t.get(i), t.get(j)));
                tails.insert(i, j, tail);
            }
        }
        tails
    }

    // --- potential caches ---

    /// Drop all cached potentials; called at the start of a macro iteration.
    pub fn clear_stored_potentials(&self) {
        self.current_singles_potential.borrow_mut().clear();
        self.current_s2b_u_part.borrow_mut().clear();
        self.current_s2c_u_part.borrow_mut().clear();
    }

    /// Warn about caches that survived from a previous amplitude state.
    pub fn check_stored_potentials(&self) {
        if !self.current_singles_potential.borrow().is_empty() {
            self.diagnostics
                .warn("stored singles potential still set from a previous iteration");
        }
        if !self.current_s2b_u_part.borrow().is_empty() {
            self.diagnostics
                .warn("stored s2b pair contraction still set from a previous iteration");
        }
        if !self.current_s2c_u_part.borrow().is_empty() {
            self.diagnostics
                .warn("stored s2c pair contraction still set from a previous iteration");
        }
    }

    /// The singles potential stored by the last full assembly, if any.
    pub fn stored_singles_potential(&self) -> Option<Vec<B::F3>> {
        let stored = self.current_singles_potential.borrow();
        if stored.is_empty() {
            None
        } else {
            Some(stored.clone())
        }
    }
}

#[derive(Clone, Copy)]
enum ScreenedOp {
    Coulomb,
    F12,
}
