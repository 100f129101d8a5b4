//! Load molfiles from data/ and run the full pipeline on them.

use std::path::Path;

use mcsdr::{
    assign_descriptors, compare,
    loader::parse,
    molecule::{Descriptor, Element},
    DescriptorArray, DescriptorOptions, MatchOptions, Minification, Molecule,
};

fn load(name: &str) -> Molecule {
    let path = Path::new("data").join(name);
    let mut mol = parse(&path).unwrap_or_else(|e| panic!("failed to parse {path:?}: {e}"));
    assert_eq!(assign_descriptors(&mut mol).unwrap(), Minification::Complete);
    mol
}

#[test]
fn descriptors_are_assigned() {
    let mol = load("phenylalanine.mol");
    for d in [Descriptor::Valence, Descriptor::Topology, Descriptor::MinifiedRing] {
        assert!(mol.has_descriptor(d), "{d}");
    }
    assert_eq!(mol.atom_count(), 12);
    assert_eq!(mol.topology().rings.len(), 1);
    // Alpha carbon carries one hydrogen, the amine two.
    assert_eq!(mol.atom(8).unwrap().h_count(), 1);
    assert_eq!(mol.atom(9).unwrap().h_count(), 2);
}

#[test]
fn naphthalene_rings() {
    let mol = load("naphthalene.mol");
    let topology = mol.topology();
    assert_eq!(topology.scaffolds.len(), 1);
    let lengths: Vec<usize> = topology.rings.iter().map(|r| r.len()).collect();
    assert_eq!(lengths, vec![6, 6]);
    assert_eq!(topology.ring_atom_count(), 10);
}

#[test]
fn salts_and_water_are_cleaned_before_comparison() {
    let mol = load("sodium_acetate.mol");
    assert_eq!(mol.atom(4).unwrap().charge(), -1);
    assert_eq!(mol.atom(5).unwrap().element(), Element::Sodium);
    assert_eq!(mol.topology().isolated, vec![vec![5], vec![6]]);

    let array = DescriptorArray::new(&mol, &DescriptorOptions::default()).unwrap();
    assert!(array.is_valid());
    assert_eq!(array.inverse_map(), &[(1, 2), (2, 3), (2, 4)]);
    assert_eq!(array.max_size(), 3);
    assert_eq!(mol.atom_count(), 6);
}

#[test]
fn files_compare_like_built_molecules() {
    let phe = load("phenylalanine.mol");
    let tyr = load("tyrosine.mol");
    let result = compare(
        &phe,
        &tyr,
        &DescriptorOptions::default(),
        &MatchOptions::default(),
    )
    .unwrap();
    assert!(result.is_valid());
    assert_eq!(result.edge_count(), 12);
    assert_eq!(result.local_sim(3), 0.923);
}

#[test]
fn json_round_trip_keeps_comparison() {
    let phe = load("phenylalanine.mol");
    let text = phe.to_json().unwrap();
    let mut restored = Molecule::from_json(&text).unwrap();
    assign_descriptors(&mut restored).unwrap();
    let result = compare(
        &phe,
        &restored,
        &DescriptorOptions::default(),
        &MatchOptions::default(),
    )
    .unwrap();
    assert_eq!(result.local_sim(3), 1.0);
}
