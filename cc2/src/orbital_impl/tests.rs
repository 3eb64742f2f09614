use nalgebra::DVector;

use super::*;

fn func(v: f64) -> DVector<f64> {
    DVector::from_element(4, v)
}

#[test]
fn orbital_names_follow_kind() {
    assert_eq!(Orbital::new(0, OrbitalKind::Hole, func(1.0)).name(), "phi_0");
    assert_eq!(
        Orbital::new(2, OrbitalKind::Particle, func(1.0)).name(),
        "tau_2"
    );
    assert_eq!(Orbital::new(1, OrbitalKind::Mixed, func(1.0)).name(), "t_1");
    assert_eq!(
        Orbital::new(3, OrbitalKind::Response, func(1.0)).name(),
        "x_3"
    );
    assert_eq!(
        Orbital::new(4, OrbitalKind::Undefined, func(1.0)).name(),
        "?_4"
    );
}

#[test]
fn orbital_set_from_functions_indexes_consecutively() {
    let set = OrbitalSet::from_functions(OrbitalKind::Hole, &[func(1.0), func(2.0)]);
    assert_eq!(set.len(), 2);
    assert_eq!(set.get(0).index, 0);
    assert_eq!(set.get(1).kind, OrbitalKind::Hole);
    assert_eq!(set.indices().collect::<Vec<_>>(), vec![0, 1]);
}

#[test]
#[should_panic(expected = "orbital index 7 out of range")]
fn orbital_set_get_panics_on_missing_index() {
    let set = OrbitalSet::from_functions(OrbitalKind::Hole, &[func(1.0)]);
    set.get(7);
}

#[test]
fn pairs_store_canonical_half() {
    let mut pairs: Pairs<f64> = Pairs::new();
    pairs.insert(0, 0, 1.0);
    pairs.insert(0, 1, 2.0);
    pairs.insert(1, 1, 3.0);
    assert_eq!(pairs.len(), 3);
    assert_eq!(pairs.get(0, 1), Some(&2.0));
    assert_eq!(pairs.get(1, 0), None);
}

#[test]
#[should_panic(expected = "canonical ordering")]
fn pairs_reject_reversed_index_order() {
    let mut pairs: Pairs<f64> = Pairs::new();
    pairs.insert(1, 0, 1.0);
}
