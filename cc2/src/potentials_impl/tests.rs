use std::sync::Arc;

use mra::dense::DenseBackend;
use mra::{MraBackend, Particle};

use crate::config::CcParams;
use crate::operators_impl::CcOperators;
use crate::orbital_impl::{OrbitalKind, OrbitalSet, PairFunction, Pairs, ReferenceState};

use super::*;

fn setup() -> CcOperators<DenseBackend> {
    let backend = Arc::new(DenseBackend::new(20, 3.0, 1.4));
    let orbs = backend.orthonormalize(&[
        backend.gaussian(-0.6, 0.8),
        backend.gaussian(0.6, 0.8),
    ]);
    let reference = ReferenceState {
        mo_bra: orbs.clone(),
        mo_ket: orbs,
        orbital_energies: vec![-1.0, -0.5],
        nuclear_potential: None,
    };
    let params = CcParams {
        thresh_3d: 0.0,
        thresh_6d: 0.0,
        ..CcParams::default()
    };
    CcOperators::new(backend, reference, params)
}

fn zero_singles(ops: &CcOperators<DenseBackend>) -> OrbitalSet<nalgebra::DVector<f64>> {
    let z = ops.backend().zero3();
    OrbitalSet::from_functions(OrbitalKind::Particle, &[z.clone(), z])
}

fn zero_doubles(ops: &CcOperators<DenseBackend>) -> Pairs<nalgebra::DMatrix<f64>> {
    let mut pairs = Pairs::new();
    for i in ops.active() {
        for j in ops.active() {
            if i <= j {
                pairs.insert(i, j, ops.backend().zero6());
            }
        }
    }
    pairs
}

#[test]
fn term_names_round_trip() {
    let singles = [
        SinglesTerm::FockResidue,
        SinglesTerm::Ccs,
        SinglesTerm::S1,
        SinglesTerm::S5a,
        SinglesTerm::S2bU,
        SinglesTerm::S2cU,
        SinglesTerm::S4aU,
        SinglesTerm::S4bU,
        SinglesTerm::S4cU,
        SinglesTerm::S2bReg,
        SinglesTerm::S2cReg,
        SinglesTerm::S4aReg,
        SinglesTerm::S4bReg,
        SinglesTerm::S4cReg,
    ];
    for term in singles {
        assert_eq!(SinglesTerm::from_name(term.name()), term);
    }
    for term in [
        DoublesTerm::FockResidue6d,
        DoublesTerm::Cc2Coulomb,
        DoublesTerm::Cc2Residue,
    ] {
        assert_eq!(DoublesTerm::from_name(term.name()), term);
    }
}

#[test]
#[should_panic(expected = "unknown singles diagram 'S7'")]
fn unknown_singles_term_panics() {
    SinglesTerm::from_name("S7");
}

#[test]
#[should_panic(expected = "unknown doubles diagram 'D6b'")]
fn unknown_doubles_term_panics() {
    DoublesTerm::from_name("D6b");
}

#[test]
fn every_singles_term_covers_all_active_orbitals() {
    let mut ops = setup();
    let singles = zero_singles(&ops);
    ops.update_intermediates(&singles);
    let doubles = zero_doubles(&ops);

    for term in [
        SinglesTerm::FockResidue,
        SinglesTerm::Ccs,
        SinglesTerm::S1,
        SinglesTerm::S5a,
        SinglesTerm::S2bU,
        SinglesTerm::S2cU,
        SinglesTerm::S4aU,
        SinglesTerm::S4bU,
        SinglesTerm::S4cU,
        SinglesTerm::S2bReg,
        SinglesTerm::S2cReg,
        SinglesTerm::S4aReg,
        SinglesTerm::S4bReg,
        SinglesTerm::S4cReg,
    ] {
        ops.clear_stored_potentials();
        let potential = ops.potential_singles(&doubles, &singles, term);
        assert_eq!(potential.len(), ops.active().len(), "term {}", term.name());
    }
}

#[test]
fn amplitude_diagrams_vanish_for_zero_amplitudes() {
    let mut ops = setup();
    let singles = zero_singles(&ops);
    ops.update_intermediates(&singles);
    let doubles = zero_doubles(&ops);
    let b = ops.backend().clone();

    for term in [
        SinglesTerm::FockResidue,
        SinglesTerm::Ccs,
        SinglesTerm::S5a,
        SinglesTerm::S2bU,
        SinglesTerm::S2cU,
        SinglesTerm::S4aU,
        SinglesTerm::S4bU,
        SinglesTerm::S4cU,
    ] {
        ops.clear_stored_potentials();
        let potential = ops.potential_singles(&doubles, &singles, term);
        for f in &potential {
            assert!(b.norm3(f) < 1e-10, "term {} not zero", term.name());
        }
    }
}

#[test]
fn ccs_aggregate_vanishes_for_zero_amplitudes() {
    let mut ops = setup();
    let singles = zero_singles(&ops);
    ops.update_intermediates(&singles);

    // S1 survives as eps_i phi_i but lies in the occupied space, so the
    // aggregate's Q projection removes it together with everything else.
    let potential = ops.get_ccs_potential(&singles);
    for f in &potential {
        assert!(ops.backend().norm3(f) < 1e-10);
    }
}

#[test]
fn mismatched_singles_size_warns_but_evaluates() {
    let mut ops = setup();
    let singles = zero_singles(&ops);
    ops.update_intermediates(&singles);

    let z = ops.backend().zero3();
    let short = OrbitalSet::from_functions(OrbitalKind::Particle, &[z]);
    let before = ops.diagnostics().warning_count();
    ops.potential_singles(&zero_doubles(&ops), &short, SinglesTerm::S2bU);
    assert!(ops.diagnostics().warning_count() > before);
}

#[test]
fn s2b_contraction_is_cached_until_cleared() {
    let mut ops = setup();
    let singles = zero_singles(&ops);
    ops.update_intermediates(&singles);
    let doubles = zero_doubles(&ops);

    assert!(ops.current_s2b_u_part.borrow().is_empty());
    ops.potential_singles(&doubles, &singles, SinglesTerm::S2bU);
    assert!(!ops.current_s2b_u_part.borrow().is_empty());

    let before = ops.diagnostics().warning_count();
    ops.check_stored_potentials();
    assert!(ops.diagnostics().warning_count() > before);

    ops.clear_stored_potentials();
    assert!(ops.current_s2b_u_part.borrow().is_empty());
}

#[test]
fn fock_residue_6d_vanishes_on_zero_pair() {
    let mut ops = setup();
    let singles = zero_singles(&ops);
    ops.update_intermediates(&singles);

    let u = PairFunction::new(0, 1, ops.backend().zero6());
    let residue = ops.fock_residue_6d(&u);
    assert!(ops.backend().norm6(&residue) < 1e-12);
}

#[test]
fn mp2_constant_part_is_strongly_orthogonal() {
    let ops = setup();
    let b = ops.backend().clone();
    let constant = ops.get_mp2_potential_constant_part(0, 1);
    for k in 0..ops.n_occupied() {
        let r1 = b.partial_inner(&constant, ops.mo_bra(k), Particle::One);
        let r2 = b.partial_inner(&constant, ops.mo_bra(k), Particle::Two);
        assert!(b.norm3(&r1) < 1e-10);
        assert!(b.norm3(&r2) < 1e-10);
    }
}

#[test]
fn cc2_doubles_potential_reduces_to_mp2_form_at_zero_singles() {
    let mut ops = setup();
    let singles = zero_singles(&ops);
    ops.update_intermediates(&singles);
    let b = ops.backend().clone();

    // at tau = 0 the residue collapses onto the MP2 constant part plus the
    // Q12-projected Coulomb term over the reference orbitals
    let u = PairFunction::new(0, 1, b.zero6());
    let got = ops.get_cc2_doubles_potential(&u, &singles);

    let coulomb = ops.potential_doubles(&u, &singles, DoublesTerm::Cc2Coulomb);
    let residue = ops.potential_doubles(&u, &singles, DoublesTerm::Cc2Residue);
    let want = ops
        .strong_orthogonality()
        .apply(&b.add6(&coulomb, &residue));
    assert!(b.norm6(&b.sub6(&got, &want)) < 1e-10);
}
