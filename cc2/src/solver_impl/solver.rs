use tracing::{info, warn};

use mra::MraBackend;

use crate::config::CcParams;
use crate::operators_impl::CcOperators;
use crate::orbital_impl::{Orbital, OrbitalKind, OrbitalSet, PairFunction, Pairs};

/// Result of an amplitude iteration.
#[derive(Debug, Clone)]
pub struct Cc2Output {
    pub correlation_energy: f64,
    pub macro_iterations: usize,
    pub converged: bool,
}

/// Macro-iteration driver over the assembled singles and doubles potentials.
pub struct Cc2Solver<B: MraBackend> {
    ops: CcOperators<B>,
}

impl<B: MraBackend> Cc2Solver<B> {
    pub fn new(ops: CcOperators<B>) -> Self {
        Cc2Solver { ops }
    }

    pub fn ops(&self) -> &CcOperators<B> {
        &self.ops
    }

    /// Iterate the CC2 amplitude equations from zero amplitudes.
    pub fn solve(&mut self) -> Cc2Output {
        let b = self.ops.backend().clone();
        let params = self.ops.params().clone();

        info!("===========================================");
        info!("     Starting CC2 Iterations");
        info!("===========================================");

        let mut singles = OrbitalSet::new();
        for i in self.ops.active() {
            singles.insert(Orbital::new(i, OrbitalKind::Particle, b.zero3()));
        }
        let mut doubles: Pairs<B::F6> = Pairs::new();
        for i in self.ops.active() {
            for j in self.ops.active() {
                if i <= j {
                    doubles.insert(i, j, b.zero6());
                }
            }
        }

        let mut old_energy = 0.0;
        let mut converged = false;
        let mut iterations = 0;

        info!(
            "{:>5} {:>20} {:>14} {:>12} {:>12}",
            "iter", "energy", "delta", "rms(tau)", "rms(u)"
        );
        info!("{}", "-".repeat(68));

        for macro_iter in 1..=params.max_macro_iterations {
            iterations = macro_iter;
            // caches populated by a previous macro iteration are expected;
            // anything present before the first one points at a stale setup
            if macro_iter == 1 {
                self.ops.check_stored_potentials();
            }
            self.ops.clear_stored_potentials();

            let singles_rms = self.iterate_singles(&mut singles, &doubles, &params);
            let doubles_rms = self.update_doubles(&mut doubles, &singles);

            self.ops.update_intermediates(&singles);
            let energy = self.ops.get_cc2_correlation_energy(&doubles, &singles);
            let delta = energy - old_energy;
            old_energy = energy;

            info!(
                "{:>5} {:>20.12} {:>14.3e} {:>12.3e} {:>12.3e}",
                macro_iter, energy, delta, singles_rms, doubles_rms
            );

            if delta.abs() < params.econv && singles_rms < params.dconv {
                converged = true;
                info!("");
                info!("CC2 converged after {} macro iterations", macro_iter);
                info!("Final correlation energy: {:.12}", energy);
                break;
            }
        }
        if !converged {
            warn!(
                "CC2 did not converge within {} macro iterations",
                params.max_macro_iterations
            );
        }

        Cc2Output {
            correlation_energy: old_energy,
            macro_iterations: iterations,
            converged,
        }
    }

    /// Green's-function update of the singles at fixed doubles; returns the
    /// rms amplitude change of the last micro iteration.
    fn iterate_singles(
        &mut self,
        singles: &mut OrbitalSet<B::F3>,
        doubles: &Pairs<B::F6>,
        params: &CcParams,
    ) -> f64 {
        let b = self.ops.backend().clone();
        let mut rms = f64::MAX;

        for _micro in 1..=params.max_micro_iterations {
            self.ops.update_intermediates(singles);
            let potential = self.ops.get_cc2_singles_potential(doubles, singles);

            let mut change = 0.0;
            let mut updated = OrbitalSet::new();
            for (slot, i) in self.ops.active().enumerate() {
                let eps = self.ops.epsilon(i);
                let mu = if eps < 0.0 {
                    (-2.0 * eps).sqrt()
                } else {
                    self.ops.diagnostics().warn(format!(
                        "orbital {} has non-negative energy {:.6}, clamping Green's function decay",
                        i, eps
                    ));
                    0.0
                };
                let mut tau = b.scale3(&b.apply_bsh(&potential[slot], mu), -2.0);
                self.ops.projector().apply(&mut tau);
                b.truncate3(&mut tau, params.thresh_3d);

                let diff = b.sub3(&tau, &singles.get(i).function);
                change += b.inner3(&diff, &diff);
                updated.insert(Orbital::new(i, OrbitalKind::Particle, tau));
            }
            *singles = updated;
            rms = (change / self.ops.active().len() as f64).sqrt();
            if rms < params.dconv {
                break;
            }
        }
        rms
    }

    /// Energy-denominator preconditioned doubles update; returns the rms
    /// amplitude change over the stored pairs.
    fn update_doubles(&mut self, doubles: &mut Pairs<B::F6>, singles: &OrbitalSet<B::F3>) -> f64 {
        let b = self.ops.backend().clone();
        let mut change = 0.0;

        let mut updated = Pairs::new();
        for (&(i, j), u) in doubles.iter() {
            let pair = PairFunction::new(i, j, u.clone());
            let potential = self.ops.get_cc2_doubles_potential(&pair, singles);
            let mut unew = b.scale6(&potential, 1.0 / self.ops.epsilon_pair(i, j));
            b.truncate6(&mut unew, self.ops.params().thresh_6d);

            let diff = b.sub6(&unew, u);
            change += b.inner6(&diff, &diff);
            updated.insert(i, j, unew);
        }
        let n = doubles.len().max(1);
        *doubles = updated;
        (change / n as f64).sqrt()
    }
}
