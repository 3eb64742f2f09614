//! Doubles-potential diagrams.

use tracing::debug;

use mra::{MraBackend, PairOp, Particle};

use crate::operators_impl::CcOperators;
use crate::orbital_impl::{Orbital, OrbitalKind, OrbitalSet, PairFunction};

use super::DoublesTerm;

impl<B: MraBackend> CcOperators<B> {
    /// Evaluate one doubles diagram for a stored pair, truncated to the
    /// pair tolerance.
    pub fn potential_doubles(
        &self,
        u: &PairFunction<B::F6>,
        singles: &OrbitalSet<B::F3>,
        term: DoublesTerm,
    ) -> B::F6 {
        let mut result = match term {
            DoublesTerm::FockResidue6d => self.fock_residue_6d(u),
            DoublesTerm::Cc2Coulomb => {
                let t = self.make_t_intermediate(singles);
                self.make_cc2_coulomb_part(t.get(u.i), t.get(u.j))
            }
            DoublesTerm::Cc2Residue => {
                let t = self.make_t_intermediate(singles);
                self.make_cc2_residue(t.get(u.i), t.get(u.j))
            }
        };
        self.backend.truncate6(&mut result, self.params.thresh_6d);
        debug!("assembled doubles diagram {} for {}", term.name(), u.name());
        result
    }

    /// Closed-shell Fock residue (2J - K + U_nuc) |u>, local parts applied
    /// per particle.
    pub fn fock_residue_6d(&self, u: &PairFunction<B::F6>) -> B::F6 {
        let b = &self.backend;
        let mut local = b.scale3(self.intermediates.hartree(), 2.0);
        if let Some(un) = &self.nuclear_potential {
            local = b.add3(&local, un);
        }
        let direct = b.add6(
            &b.mul_particle(&u.function, Particle::One, &local),
            &b.mul_particle(&u.function, Particle::Two, &local),
        );
        b.sub6(&direct, &self.exchange_pair(&u.function, u.i == u.j))
    }

    /// Screened Coulomb part g12 |t_i t_j>. The aggregate applies Q12.
    pub fn make_cc2_coulomb_part(&self, ti: &Orbital<B::F3>, tj: &Orbital<B::F3>) -> B::F6 {
        self.backend
            .op_pair(&ti.function, &tj.function, PairOp::Coulomb)
    }

    /// The regularized CC2 residue on |t_i t_j>:
    /// f12 (F(1) + F(2) - eps_ij) |t_i t_j> + Ue |t_i t_j> - [K, f] |t_i t_j>.
    pub fn make_cc2_residue(&self, ti: &Orbital<B::F3>, tj: &Orbital<B::F3>) -> B::F6 {
        let b = &self.backend;
        let eps_ij = self.epsilon_pair(ti.index, tj.index);

        let fti = self.apply_f(ti);
        let ftj = self.apply_f(tj);
        let mut fock_part = b.add6(
            &b.op_pair(&fti, &tj.function, PairOp::SlaterF12),
            &b.op_pair(&ti.function, &ftj, PairOp::SlaterF12),
        );
        fock_part = b.sub6(&fock_part, &b.scale6(&self.make_f_xy(ti, tj), eps_ij));

        let ue = self.apply_transformed_ue(ti, tj);
        let commutator = self.apply_exchange_commutator(ti, tj);
        b.sub6(&b.add6(&fock_part, &ue), &commutator)
    }

    /// The full CC2 doubles potential: Q12 over the Coulomb part and the
    /// residue, plus the unprojected Fock residue.
    pub fn get_cc2_doubles_potential(
        &self,
        u: &PairFunction<B::F6>,
        singles: &OrbitalSet<B::F3>,
    ) -> B::F6 {
        let b = &self.backend;
        let coulomb = self.potential_doubles(u, singles, DoublesTerm::Cc2Coulomb);
        let residue = self.potential_doubles(u, singles, DoublesTerm::Cc2Residue);
        let projected = self.q12.apply(&b.add6(&coulomb, &residue));
        let fock = self.potential_doubles(u, singles, DoublesTerm::FockResidue6d);
        let mut result = b.add6(&projected, &fock);
        b.truncate6(&mut result, self.params.thresh_6d);
        result
    }

    /// Amplitude-independent part of the MP2 pair equation:
    /// Q12 (Ue - [K, f]) |phi_i phi_j>.
    pub fn get_mp2_potential_constant_part(&self, i: usize, j: usize) -> B::F6 {
        let b = &self.backend;
        let phi_i = Orbital::new(i, OrbitalKind::Hole, self.mo_ket(i).clone());
        let phi_j = Orbital::new(j, OrbitalKind::Hole, self.mo_ket(j).clone());
        let ue = self.apply_transformed_ue(&phi_i, &phi_j);
        let commutator = self.apply_exchange_commutator(&phi_i, &phi_j);
        let mut result = self.q12.apply(&b.sub6(&ue, &commutator));
        b.truncate6(&mut result, self.params.thresh_6d);
        result
    }

    /// Amplitude-dependent part of the MP2 pair equation; identical to the
    /// 6-D Fock residue.
    pub fn get_mp2_potential_residue(&self, u: &PairFunction<B::F6>) -> B::F6 {
        let mut result = self.fock_residue_6d(u);
        self.backend.truncate6(&mut result, self.params.thresh_6d);
        result
    }
}
