//! Singles-potential diagrams.

use tracing::debug;

use mra::{MraBackend, PairOp, Particle};

use crate::operators_impl::CcOperators;
use crate::orbital_impl::{Orbital, OrbitalKind, OrbitalSet, Pairs};

use super::SinglesTerm;

impl<B: MraBackend> CcOperators<B> {
    /// Evaluate one singles diagram for every active orbital. The returned
    /// vector is ordered by active index and truncated to the one-particle
    /// tolerance.
    pub fn potential_singles(
        &self,
        doubles: &Pairs<B::F6>,
        singles: &OrbitalSet<B::F3>,
        term: SinglesTerm,
    ) -> Vec<B::F3> {
        let n_active = self.active().len();
        if singles.len() != n_active {
            self.diagnostics.warn(format!(
                "singles vector has {} entries but {} orbitals are active",
                singles.len(),
                n_active
            ));
        }

        let mut result = match term {
            SinglesTerm::FockResidue => self.fock_residue_singles(singles),
            SinglesTerm::Ccs => self.ccs_potential(singles),
            SinglesTerm::S1 => self.s1(),
            SinglesTerm::S5a => self.s5a(singles),
            SinglesTerm::S2bU => self.s2b_u(doubles),
            SinglesTerm::S2cU => self.s2c_u(doubles),
            SinglesTerm::S4aU => self.s4a_on(doubles, singles),
            SinglesTerm::S4bU => self.s4b_on(doubles, singles),
            SinglesTerm::S4cU => self.s4c_on(doubles, singles),
            SinglesTerm::S2bReg => self.s2b_on(&self.make_regularization_tails(singles)),
            SinglesTerm::S2cReg => self.s2c_on(&self.make_regularization_tails(singles)),
            SinglesTerm::S4aReg => {
                self.s4a_on(&self.make_regularization_tails(singles), singles)
            }
            SinglesTerm::S4bReg => {
                self.s4b_on(&self.make_regularization_tails(singles), singles)
            }
            SinglesTerm::S4cReg => {
                self.s4c_on(&self.make_regularization_tails(singles), singles)
            }
        };
        for f in result.iter_mut() {
            self.backend.truncate3(f, self.params.thresh_3d);
        }
        debug!("assembled singles diagram {}", term.name());
        result
    }

    fn tau(&self, singles: &OrbitalSet<B::F3>, i: usize) -> Orbital<B::F3> {
        Orbital::new(i, OrbitalKind::Particle, singles.get(i).function.clone())
    }

    fn hole(&self, k: usize) -> Orbital<B::F3> {
        Orbital::new(k, OrbitalKind::Hole, self.mo_bra(k).clone())
    }

    /// (2J - K) |tau_i> with J from the reference Hartree potential.
    fn fock_residue_singles(&self, singles: &OrbitalSet<B::F3>) -> Vec<B::F3> {
        let b = &self.backend;
        let hartree = self.intermediates.hartree();
        self.active()
            .map(|i| {
                let tau = self.tau(singles, i);
                let coulomb = b.scale3(&b.mul3(hartree, &tau.function), 2.0);
                b.sub3(&coulomb, &self.exchange(&tau))
            })
            .collect()
    }

    /// CCS potential in t-form: the ket-relaxed Hartree-Fock potential over
    /// t = phi + tau minus the same expression over the reference orbitals.
    /// Vanishes identically for vanishing singles.
    fn ccs_potential(&self, singles: &OrbitalSet<B::F3>) -> Vec<B::F3> {
        let b = &self.backend;
        let t = self.make_t_intermediate(singles);
        self.active()
            .map(|i| {
                let mut resulti = b.zero3();
                for k in 0..self.n_occupied() {
                    let bra_k = self.hole(k);
                    // relaxed part
                    let kgtk = self.apply_g12(&bra_k, t.get(k));
                    let kgti = self.apply_g12(&bra_k, t.get(i));
                    resulti = b.add3(
                        &resulti,
                        &b.sub3(
                            &b.scale3(&b.mul3(&kgtk, &t.get(i).function), 2.0),
                            &b.mul3(&kgti, &t.get(k).function),
                        ),
                    );
                    // reference part, already carried by the Fock residue
                    let kgk = self.intermediates.ex(k, k);
                    let kgi = self.intermediates.ex(k, i);
                    resulti = b.sub3(
                        &resulti,
                        &b.sub3(
                            &b.scale3(&b.mul3(kgk, self.mo_ket(i)), 2.0),
                            &b.mul3(kgi, self.mo_ket(k)),
                        ),
                    );
                }
                resulti
            })
            .collect()
    }

    /// Brillouin term F |phi_i>; annihilated by Q for canonical orbitals.
    fn s1(&self) -> Vec<B::F3> {
        self.active()
            .map(|i| {
                let phi = Orbital::new(i, OrbitalKind::Hole, self.mo_ket(i).clone());
                self.apply_f(&phi)
            })
            .collect()
    }

    /// -sum_k <k|F|tau_i> tau_k.
    fn s5a(&self, singles: &OrbitalSet<B::F3>) -> Vec<B::F3> {
        let b = &self.backend;
        self.active()
            .map(|i| {
                let ftau_i = self.apply_f(&self.tau(singles, i));
                let mut resulti = b.zero3();
                for k in self.active() {
                    let coeff = b.inner3(self.mo_bra(k), &ftau_i);
                    resulti = b.sub3(&resulti, &b.scale3(&singles.get(k).function, coeff));
                }
                resulti
            })
            .collect()
    }

    /// S2b over stored pairs, cached for the rest of the macro iteration.
    fn s2b_u(&self, doubles: &Pairs<B::F6>) -> Vec<B::F3> {
        if !self.current_s2b_u_part.borrow().is_empty() {
            debug!("reusing stored s2b pair contraction");
            return self.current_s2b_u_part.borrow().clone();
        }
        let result = self.s2b_on(doubles);
        *self.current_s2b_u_part.borrow_mut() = result.clone();
        result
    }

    /// S2c over stored pairs, cached for the rest of the macro iteration.
    fn s2c_u(&self, doubles: &Pairs<B::F6>) -> Vec<B::F3> {
        if !self.current_s2c_u_part.borrow().is_empty() {
            debug!("reusing stored s2c pair contraction");
            return self.current_s2c_u_part.borrow().clone();
        }
        let result = self.s2c_on(doubles);
        *self.current_s2c_u_part.borrow_mut() = result.clone();
        result
    }

    /// sum_k (2 <k|g|u_ik>_2 - <k|g|u_ik>_1).
    fn s2b_on(&self, pairs: &Pairs<B::F6>) -> Vec<B::F3> {
        let b = &self.backend;
        self.active()
            .map(|i| {
                let mut resulti = b.zero3();
                for k in self.active() {
                    let u_ik = self.get_pair_function(pairs, i, k);
                    let direct = b.op_project(&u_ik, self.mo_bra(k), Particle::Two, PairOp::Coulomb);
                    let exchange =
                        b.op_project(&u_ik, self.mo_bra(k), Particle::One, PairOp::Coulomb);
                    resulti = b.add3(&resulti, &b.sub3(&b.scale3(&direct, 2.0), &exchange));
                }
                resulti
            })
            .collect()
    }

    /// -sum_kl (2 <l kgi|u_kl>_2 - <l kgi|u_kl>_1) with kgi = <k|g|i>.
    fn s2c_on(&self, pairs: &Pairs<B::F6>) -> Vec<B::F3> {
        let b = &self.backend;
        self.active()
            .map(|i| {
                let mut resulti = b.zero3();
                for k in self.active() {
                    let kgi = self.intermediates.ex(k, i);
                    for l in self.active() {
                        let u_kl = self.get_pair_function(pairs, k, l);
                        let l_kgi = b.mul3(self.mo_bra(l), kgi);
                        let direct = b.partial_inner(&u_kl, &l_kgi, Particle::Two);
                        let exchange = b.partial_inner(&u_kl, &l_kgi, Particle::One);
                        resulti = b.sub3(&resulti, &b.sub3(&b.scale3(&direct, 2.0), &exchange));
                    }
                }
                resulti
            })
            .collect()
    }

    /// -sum_kl (2 <kl|g|u_il> - <lk|g|u_il>) tau_k.
    fn s4a_on(&self, pairs: &Pairs<B::F6>, singles: &OrbitalSet<B::F3>) -> Vec<B::F3> {
        let b = &self.backend;
        self.active()
            .map(|i| {
                let mut resulti = b.zero3();
                for k in self.active() {
                    for l in self.active() {
                        let u_il = self.get_pair_function(pairs, i, l);
                        let coeff = 2.0 * self.make_ijgu(k, l, &u_il)
                            - self.make_ijgu(l, k, &u_il);
                        resulti = b.sub3(&resulti, &b.scale3(&singles.get(k).function, coeff));
                    }
                }
                resulti
            })
            .collect()
    }

    /// S2c with the perturbed interaction <k|g|tau_i> in place of kgi.
    fn s4b_on(&self, pairs: &Pairs<B::F6>, singles: &OrbitalSet<B::F3>) -> Vec<B::F3> {
        let b = &self.backend;
        self.active()
            .map(|i| {
                let tau_i = self.tau(singles, i);
                let mut resulti = b.zero3();
                for k in self.active() {
                    let kgtaui = self.apply_g12(&self.hole(k), &tau_i);
                    for l in self.active() {
                        let u_kl = self.get_pair_function(pairs, k, l);
                        let l_kgtaui = b.mul3(self.mo_bra(l), &kgtaui);
                        let direct = b.partial_inner(&u_kl, &l_kgtaui, Particle::Two);
                        let exchange = b.partial_inner(&u_kl, &l_kgtaui, Particle::One);
                        resulti = b.sub3(&resulti, &b.sub3(&b.scale3(&direct, 2.0), &exchange));
                    }
                }
                resulti
            })
            .collect()
    }

    /// sum_kl (4 <l kgtau_k|u_il>_2 - 2 <l kgtau_k|u_il>_1
    ///         - 2 <k lgtau_k|u_il>_2 + <k lgtau_k|u_il>_1).
    fn s4c_on(&self, pairs: &Pairs<B::F6>, singles: &OrbitalSet<B::F3>) -> Vec<B::F3> {
        let b = &self.backend;
        self.active()
            .map(|i| {
                let mut resulti = b.zero3();
                for k in self.active() {
                    let tau_k = self.tau(singles, k);
                    let kgtauk = self.apply_g12(&self.hole(k), &tau_k);
                    for l in self.active() {
                        let lgtauk = self.apply_g12(&self.hole(l), &tau_k);
                        let u_il = self.get_pair_function(pairs, i, l);
                        let l_kgtauk = b.mul3(self.mo_bra(l), &kgtauk);
                        let k_lgtauk = b.mul3(self.mo_bra(k), &lgtauk);
                        let mut term = b.scale3(
                            &b.partial_inner(&u_il, &l_kgtauk, Particle::Two),
                            4.0,
                        );
                        term = b.sub3(
                            &term,
                            &b.scale3(&b.partial_inner(&u_il, &l_kgtauk, Particle::One), 2.0),
                        );
                        term = b.sub3(
                            &term,
                            &b.scale3(&b.partial_inner(&u_il, &k_lgtauk, Particle::Two), 2.0),
                        );
                        term = b.add3(&term, &b.partial_inner(&u_il, &k_lgtauk, Particle::One));
                        resulti = b.add3(&resulti, &term);
                    }
                }
                resulti
            })
            .collect()
    }

    /// CCS singles potential: unprojected Fock residue plus the Q-projected
    /// Brillouin and CCS diagrams.
    pub fn get_ccs_potential(&self, singles: &OrbitalSet<B::F3>) -> Vec<B::F3> {
        let b = &self.backend;
        let doubles = Pairs::new();

        let fock = self.potential_singles(&doubles, singles, SinglesTerm::FockResidue);
        let mut rest = self.potential_singles(&doubles, singles, SinglesTerm::S1);
        for term in [SinglesTerm::S5a, SinglesTerm::Ccs] {
            let part = self.potential_singles(&doubles, singles, term);
            for (r, p) in rest.iter_mut().zip(&part) {
                *r = b.add3(r, p);
            }
        }
        self.q.apply_vec(&mut rest);

        let mut result: Vec<B::F3> = fock
            .iter()
            .zip(&rest)
            .map(|(f, r)| b.add3(f, r))
            .collect();
        for f in result.iter_mut() {
            b.truncate3(f, self.params.thresh_3d);
        }
        result
    }

    /// The full CC2 singles potential. The Q-projected diagram sum (without
    /// the Fock residue) is stored for the Fock action on amplitudes; the
    /// returned vector includes the Fock residue.
    pub fn get_cc2_singles_potential(
        &self,
        doubles: &Pairs<B::F6>,
        singles: &OrbitalSet<B::F3>,
    ) -> Vec<B::F3> {
        let b = &self.backend;

        let mut potential = self.potential_singles(doubles, singles, SinglesTerm::Ccs);
        for term in SinglesTerm::doubles_coupled() {
            let part = self.potential_singles(doubles, singles, term);
            for (p, q) in potential.iter_mut().zip(&part) {
                *p = b.add3(p, q);
            }
        }
        self.q.apply_vec(&mut potential);
        for f in potential.iter_mut() {
            b.truncate3(f, self.params.thresh_3d);
        }
        *self.current_singles_potential.borrow_mut() = potential.clone();

        let fock = self.potential_singles(doubles, singles, SinglesTerm::FockResidue);
        potential
            .iter()
            .zip(&fock)
            .map(|(p, f)| b.add3(p, f))
            .collect()
    }
}
