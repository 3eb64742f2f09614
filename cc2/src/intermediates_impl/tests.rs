use std::sync::Arc;

use mra::dense::DenseBackend;
use mra::MraBackend;

use crate::orbital_impl::{OrbitalKind, OrbitalSet};

use super::*;

fn setup() -> (Arc<DenseBackend>, Vec<nalgebra::DVector<f64>>) {
    let backend = Arc::new(DenseBackend::new(20, 3.0, 1.4));
    let orbs = backend.orthonormalize(&[
        backend.gaussian(-0.6, 0.8),
        backend.gaussian(0.6, 0.8),
    ]);
    (backend, orbs)
}

#[test]
fn hartree_is_coulomb_of_density() {
    let (backend, orbs) = setup();
    let im = Intermediates::new(backend.clone(), &orbs, &orbs, 0.0);

    let mut density = backend.zero3();
    for orb in &orbs {
        density = backend.add3(&density, &backend.mul3(orb, orb));
    }
    assert!((im.density() - &density).norm() < 1e-12);
    assert!((im.hartree() - &backend.apply_coulomb(&density)).norm() < 1e-12);
}

#[test]
fn exchange_table_matches_direct_convolution() {
    let (backend, orbs) = setup();
    let im = Intermediates::new(backend.clone(), &orbs, &orbs, 0.0);

    let direct = backend.apply_coulomb(&backend.mul3(&orbs[0], &orbs[1]));
    assert!((im.ex(0, 1) - &direct).norm() < 1e-12);

    let direct_f = backend.apply_f12(&backend.mul3(&orbs[1], &orbs[0]));
    assert!((im.fex(1, 0) - &direct_f).norm() < 1e-12);
}

#[test]
fn exchange_table_is_symmetric_for_symmetric_reference() {
    let (backend, orbs) = setup();
    let im = Intermediates::new(backend.clone(), &orbs, &orbs, 0.0);
    // bra and ket coincide here, so <k|g|l> = <l|g|k>
    assert!((im.ex(0, 1) - im.ex(1, 0)).norm() < 1e-12);
}

#[test]
fn update_fills_perturbed_tables() {
    let (backend, orbs) = setup();
    let mut im = Intermediates::new(backend.clone(), &orbs, &orbs, 0.0);
    assert_eq!(im.update_count(), 0);

    let tau = backend.gaussian(0.1, 1.2);
    let singles = OrbitalSet::from_functions(OrbitalKind::Particle, &[tau.clone(), tau.clone()]);
    im.update(&singles);
    assert_eq!(im.update_count(), 1);

    let direct = backend.apply_coulomb(&backend.mul3(&orbs[0], &tau));
    assert!((im.pex(0, 0) - &direct).norm() < 1e-12);
    assert!((im.pfex(1, 1) - &backend.apply_f12(&backend.mul3(&orbs[1], &tau))).norm() < 1e-12);

    // perturbed density is built on t = phi + tau
    let mut density = backend.zero3();
    for orb in &orbs {
        density = backend.add3(&density, &backend.mul3(orb, &backend.add3(orb, &tau)));
    }
    assert!((im.perturbed_density() - &density).norm() < 1e-12);
}

#[test]
fn update_response_fills_response_tables() {
    let (backend, orbs) = setup();
    let mut im = Intermediates::new(backend.clone(), &orbs, &orbs, 0.0);

    let x = backend.gaussian(-0.1, 1.0);
    let response = OrbitalSet::from_functions(OrbitalKind::Response, &[x.clone(), x.clone()]);
    im.update_response(&response);

    let direct = backend.apply_coulomb(&backend.mul3(&orbs[1], &x));
    assert!((im.rex(1, 0) - &direct).norm() < 1e-12);
    assert!((im.rfex(0, 1) - &backend.apply_f12(&backend.mul3(&orbs[0], &x))).norm() < 1e-12);
}

#[test]
#[should_panic(expected = "perturbed density requested before the first update")]
fn perturbed_density_before_update_panics() {
    let (backend, orbs) = setup();
    let im = Intermediates::new(backend, &orbs, &orbs, 0.0);
    im.perturbed_density();
}

#[test]
#[should_panic(expected = "not tabulated")]
fn missing_table_entry_panics() {
    let (backend, orbs) = setup();
    let im = Intermediates::new(backend, &orbs, &orbs, 0.0);
    im.pex(0, 0);
}
