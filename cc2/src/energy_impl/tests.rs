use std::sync::Arc;

use mra::dense::DenseBackend;
use mra::{MraBackend, PairOp};

use crate::config::CcParams;
use crate::operators_impl::CcOperators;
use crate::orbital_impl::{OrbitalKind, OrbitalSet, Pairs, ReferenceState};

fn make_ops(energies: Vec<f64>) -> CcOperators<DenseBackend> {
    let backend = Arc::new(DenseBackend::new(20, 3.0, 1.4));
    let orbs = backend.orthonormalize(&[
        backend.gaussian(-0.6, 0.8),
        backend.gaussian(0.6, 0.8),
    ]);
    let reference = ReferenceState {
        mo_bra: orbs.clone(),
        mo_ket: orbs,
        orbital_energies: energies,
        nuclear_potential: None,
    };
    let params = CcParams {
        thresh_3d: 0.0,
        thresh_6d: 0.0,
        ..CcParams::default()
    };
    CcOperators::new(backend, reference, params)
}

fn setup() -> CcOperators<DenseBackend> {
    make_ops(vec![-1.0, -0.5])
}

#[test]
fn ijgxy_matches_pair_inner_product() {
    let ops = setup();
    let b = ops.backend().clone();
    let x = b.gaussian(-0.2, 0.9);
    let y = b.gaussian(0.3, 1.1);

    let got = ops.make_ijgxy(0, 1, &x, &y);
    let want = b.inner6(
        &b.outer(ops.mo_bra(0), ops.mo_bra(1)),
        &b.op_pair(&x, &y, PairOp::Coulomb),
    );
    assert!((got - want).abs() < 1e-10);
}

#[test]
fn ijgfxy_agrees_with_explicit_f12_pair() {
    let ops = setup();
    let b = ops.backend().clone();
    let x = b.gaussian(-0.2, 0.9);
    let y = b.gaussian(0.3, 1.1);

    // <ij|gf|xy> = <ij|g| f12|xy> >, so the combined kernel must agree with
    // a Coulomb contraction of the explicit f12 pair
    let got = ops.make_ijgfxy(0, 1, &x, &y);
    let want = ops.make_ijgu(0, 1, &b.op_pair(&x, &y, PairOp::SlaterF12));
    assert!((got - want).abs() < 1e-10);
}

#[test]
fn projected_integral_matches_explicit_projection() {
    let ops = setup();
    let b = ops.backend().clone();
    let x = b.gaussian(-0.2, 0.9);
    let y = b.gaussian(0.3, 1.1);

    let got = ops.make_ijg_qf_xy(0, 1, &x, &y);
    let projected = ops.strong_orthogonality().apply(&b.op_pair(&x, &y, PairOp::SlaterF12));
    let want = ops.make_ijgu(0, 1, &projected);
    assert!((got - want).abs() < 1e-9);
}

#[test]
fn ijgu_matches_pair_inner_product() {
    let ops = setup();
    let b = ops.backend().clone();
    let u = b.op_pair(&b.gaussian(-0.1, 0.8), &b.gaussian(0.2, 1.0), PairOp::SlaterF12);

    let got = ops.make_ijgu(1, 0, &u);
    let want = b.inner6(
        &b.op_pair(ops.mo_bra(1), ops.mo_bra(0), PairOp::Coulomb),
        &u,
    );
    assert!((got - want).abs() < 1e-10);
}

#[test]
fn diagonal_pair_energy_collapses_for_symmetric_pairs() {
    let ops = setup();
    let b = ops.backend().clone();
    let x = b.gaussian(0.1, 0.9);
    // symmetric pair: swap leaves it unchanged
    let u = b.op_pair(&x, &x, PairOp::SlaterF12);

    let energy = ops.compute_pair_correlation_energy(0, 0, &u);
    assert!((energy - ops.make_ijgu(0, 0, &u)).abs() < 1e-10);
}

#[test]
fn greens_function_integral_clamps_unbound_pairs() {
    let ops = make_ops(vec![0.4, 0.3]);
    let b = ops.backend().clone();
    let u = b.outer(&b.gaussian(0.0, 0.9), &b.gaussian(0.1, 0.9));

    let before = ops.diagnostics().warning_count();
    let value = ops.make_ij_gbsh_u(0, 1, &u);
    assert!(value.is_finite());
    assert!(ops.diagnostics().warning_count() > before);
}

#[test]
fn ccs_energy_vanishes_for_zero_singles() {
    let ops = setup();
    let z = ops.backend().zero3();
    let singles = OrbitalSet::from_functions(OrbitalKind::Particle, &[z.clone(), z]);
    assert!(ops.compute_ccs_correlation_energy(&singles).abs() < 1e-14);
}

#[test]
fn cc2_energy_reduces_to_pair_part_for_zero_singles() {
    let mut ops = setup();
    let b = ops.backend().clone();
    let z = b.zero3();
    let singles = OrbitalSet::from_functions(OrbitalKind::Particle, &[z.clone(), z]);
    ops.update_intermediates(&singles);

    let mut doubles = Pairs::new();
    let u01 = ops
        .strong_orthogonality()
        .apply(&b.op_pair(ops.mo_ket(0), ops.mo_ket(1), PairOp::SlaterF12));
    doubles.insert(0, 1, u01.clone());

    // at tau = 0 the full pair is u_ij + Q12 f12 |phi_i phi_j>
    let tail = ops
        .strong_orthogonality()
        .apply(&b.op_pair(ops.mo_ket(0), ops.mo_ket(1), PairOp::SlaterF12));
    let full = b.add6(&u01, &tail);
    let want = ops.compute_pair_correlation_energy(0, 1, &full);

    let got = ops.compute_cc2_pair_energy(&doubles, &singles, 0, 1);
    assert!((got - want).abs() < 1e-10);
}
