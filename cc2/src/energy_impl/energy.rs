use tracing::info;

use mra::{MraBackend, PairOp, Particle};

use crate::operators_impl::CcOperators;
use crate::orbital_impl::{OrbitalSet, Pairs};

impl<B: MraBackend> CcOperators<B> {
    /// <ij| g |xy> over bra orbital products.
    pub fn make_ijgxy(&self, i: usize, j: usize, x: &B::F3, y: &B::F3) -> f64 {
        let b = &self.backend;
        let screened = b.apply_coulomb(&b.mul3(self.mo_bra(i), x));
        b.inner3(&b.mul3(self.mo_bra(j), y), &screened)
    }

    /// <ij| f |xy>.
    pub fn make_ijfxy(&self, i: usize, j: usize, x: &B::F3, y: &B::F3) -> f64 {
        let b = &self.backend;
        let screened = b.apply_f12(&b.mul3(self.mo_bra(i), x));
        b.inner3(&b.mul3(self.mo_bra(j), y), &screened)
    }

    /// <ij| gf |xy> through the combined kernel (g - bsh(gamma)) / (2 gamma).
    pub fn make_ijgfxy(&self, i: usize, j: usize, x: &B::F3, y: &B::F3) -> f64 {
        let b = &self.backend;
        let screened = self.apply_gf(&b.mul3(self.mo_bra(i), x));
        b.inner3(&b.mul3(self.mo_bra(j), y), &screened)
    }

    /// <ij| g Q12 f |xy>, expanded as direct - O1 - O2 + O1 O2 over the
    /// occupied orbitals instead of projecting a pair function.
    pub fn make_ijg_qf_xy(&self, i: usize, j: usize, x: &B::F3, y: &B::F3) -> f64 {
        let b = &self.backend;
        let mut result = self.make_ijgfxy(i, j, x, y);
        for m in 0..self.n_occupied() {
            let mfx = b.apply_f12(&b.mul3(self.mo_bra(m), x));
            result -= self.make_ijgxy(i, j, self.mo_ket(m), &b.mul3(&mfx, y));
            let mfy = b.apply_f12(&b.mul3(self.mo_bra(m), y));
            result -= self.make_ijgxy(i, j, &b.mul3(&mfy, x), self.mo_ket(m));
            for n in 0..self.n_occupied() {
                result += self.make_ijgxy(i, j, self.mo_ket(m), self.mo_ket(n))
                    * self.make_ijfxy(m, n, x, y);
            }
        }
        result
    }

    /// <ij| g |u> with a 6-D pair function.
    pub fn make_ijgu(&self, i: usize, j: usize, u: &B::F6) -> f64 {
        let b = &self.backend;
        let projected = b.op_project(u, self.mo_bra(j), Particle::Two, PairOp::Coulomb);
        b.inner3(self.mo_bra(i), &projected)
    }

    /// <ij| G |u> with the Green's function at the pair energy
    /// -2 (eps_i + eps_j); an unbound pair is clamped to zero decay.
    pub fn make_ij_gbsh_u(&self, i: usize, j: usize, u: &B::F6) -> f64 {
        let b = &self.backend;
        let eps = self.epsilon_pair(i, j);
        let mu = if eps > 0.0 {
            self.diagnostics.warn(format!(
                "pair ({}, {}) has positive orbital-energy sum {:.6}, clamping Green's function decay",
                i, j, eps
            ));
            0.0
        } else {
            (-2.0 * eps).sqrt()
        };
        let projected = b.op_project(u, self.mo_bra(j), Particle::Two, PairOp::Bsh(mu));
        b.inner3(self.mo_bra(i), &projected)
    }

    /// Closed-shell pair energy 2 <ij|g|tau> - <ij|g|tau~> of one pair
    /// function and its particle swap.
    pub fn compute_pair_correlation_energy(&self, i: usize, j: usize, tau: &B::F6) -> f64 {
        2.0 * self.make_ijgu(i, j, tau) - self.make_ijgu(i, j, &self.backend.swap_particles(tau))
    }

    /// CCS part of the correlation energy,
    /// sum_ij 2 <ij|g|tau_i tau_j> - <ij|g|tau_j tau_i>.
    pub fn compute_ccs_correlation_energy(&self, singles: &OrbitalSet<B::F3>) -> f64 {
        let mut energy = 0.0;
        for i in self.active() {
            for j in self.active() {
                let tau_i = &singles.get(i).function;
                let tau_j = &singles.get(j).function;
                energy += 2.0 * self.make_ijgxy(i, j, tau_i, tau_j)
                    - self.make_ijgxy(i, j, tau_j, tau_i);
            }
        }
        energy
    }

    /// Energy of one canonical pair through the full regularized pair
    /// tau_ij = u_ij + Q12 f12 |t_i t_j>, including its singles product part.
    pub fn compute_cc2_pair_energy(
        &self,
        doubles: &Pairs<B::F6>,
        singles: &OrbitalSet<B::F3>,
        i: usize,
        j: usize,
    ) -> f64 {
        let t = self.make_t_intermediate(singles);
        let u = self.get_pair_function(doubles, i, j);
        let full = self.make_full_pair_function(&u, t.get(i), t.get(j));
        let pair_part = self.compute_pair_correlation_energy(i, j, &full);

        let tau_i = &singles.get(i).function;
        let tau_j = &singles.get(j).function;
        let singles_part =
            2.0 * self.make_ijgxy(i, j, tau_i, tau_j) - self.make_ijgxy(i, j, tau_j, tau_i);
        pair_part + singles_part
    }

    /// Total CC2 correlation energy over the stored canonical pairs, with
    /// closed-shell weight (2 - delta_ij) for the off-diagonal pairs.
    pub fn get_cc2_correlation_energy(
        &self,
        doubles: &Pairs<B::F6>,
        singles: &OrbitalSet<B::F3>,
    ) -> f64 {
        let mut total = 0.0;
        info!("{:>4} {:>4} {:>20}", "i", "j", "omega_ij");
        for (&(i, j), _) in doubles.iter() {
            let weight = if i == j { 1.0 } else { 2.0 };
            let omega = self.compute_cc2_pair_energy(doubles, singles, i, j);
            info!("{:>4} {:>4} {:>20.12}", i, j, omega);
            total += weight * omega;
        }
        info!("correlation energy: {:>20.12}", total);
        total
    }
}
