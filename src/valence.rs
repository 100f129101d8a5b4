//! Assign pi electrons and implicit hydrogens.

use crate::molecule::{AtomKey, Bond, Descriptor, Element, Molecule};

/// Neighbor count of a neutral, saturated atom of `element`, or `None` for
/// elements whose hydrogens are never inferred.
fn default_valence(element: Element) -> Option<i32> {
    match element {
        Element::Carbon | Element::Silicon => Some(4),
        Element::Nitrogen | Element::Phosphorus | Element::Arsenic => Some(3),
        Element::Oxygen | Element::Sulfur | Element::Selenium => Some(2),
        Element::Fluorine | Element::Chlorine | Element::Bromine | Element::Iodine => Some(1),
        _ => None,
    }
}

/// Assign pi electron counts from bond orders and infer implicit hydrogens,
/// then mark the molecule with [`Descriptor::Valence`].
///
/// Double and aromatic bonds give one pi electron to each end, triple bonds
/// two. An atom between two double bonds (allene, ketene) is sp and gets two.
/// Previous assignments are discarded.
pub fn assign_valence(mol: &mut Molecule) {
    let keys: Vec<AtomKey> = mol.atoms().map(|(k, _)| k).collect();
    for &k in &keys {
        if let Some(atom) = mol.atom_mut(k) {
            atom.set_pi(0);
            atom.set_h_count(0);
        }
    }

    for (u, v, bond) in mol.sorted_bonds() {
        let pi = match bond {
            Bond::Single => continue,
            Bond::Double | Bond::Aromatic => 1,
            Bond::Triple => 2,
        };
        for key in [u, v] {
            if let Some(atom) = mol.atom_mut(key) {
                atom.set_pi(atom.pi().max(pi));
            }
        }
    }

    for &k in &keys {
        let neighbors: Vec<AtomKey> = mol.neighbors(k).collect();
        let cumulated = neighbors.len() == 2
            && neighbors
                .iter()
                .all(|&n| mol.bond(k, n) == Some(&Bond::Double));
        let Some(atom) = mol.atom_mut(k) else {
            continue;
        };
        if cumulated {
            atom.set_pi(2);
        }
        if let Some(valence) = default_valence(atom.element()) {
            let h = valence - neighbors.len() as i32 - atom.pi() as i32 + atom.charge() as i32;
            if h > 0 {
                atom.set_h_count(h as u8);
            }
        }
    }

    mol.mark(Descriptor::Valence);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::molecule::Atom;

    fn mol_from(atoms: &[(AtomKey, Element)], bonds: &[(AtomKey, AtomKey, Bond)]) -> Molecule {
        let mut mol = Molecule::new();
        for &(k, e) in atoms {
            mol.add_atom(k, Atom::new(e));
        }
        for &(u, v, b) in bonds {
            mol.add_bond(u, v, b).unwrap();
        }
        mol
    }

    #[test]
    fn acetic_acid() {
        let mut mol = mol_from(
            &[
                (1, Element::Carbon),
                (2, Element::Carbon),
                (3, Element::Oxygen),
                (4, Element::Oxygen),
            ],
            &[
                (1, 2, Bond::Single),
                (2, 3, Bond::Double),
                (2, 4, Bond::Single),
            ],
        );
        assign_valence(&mut mol);
        assert!(mol.require(Descriptor::Valence).is_ok());
        let pis: Vec<u8> = mol.atoms().map(|(_, a)| a.pi()).collect();
        assert_eq!(pis, vec![0, 1, 1, 0]);
        let hs: Vec<u8> = mol.atoms().map(|(_, a)| a.h_count()).collect();
        assert_eq!(hs, vec![3, 0, 0, 1]);
    }

    #[test]
    fn nitrile_and_ketene() {
        let mut mol = mol_from(
            &[
                (1, Element::Carbon),
                (2, Element::Nitrogen),
                (3, Element::Carbon),
                (4, Element::Carbon),
                (5, Element::Oxygen),
            ],
            &[
                (1, 2, Bond::Triple),
                (3, 4, Bond::Double),
                (4, 5, Bond::Double),
            ],
        );
        assign_valence(&mut mol);
        assert_eq!(mol.atom(1).unwrap().pi(), 2);
        assert_eq!(mol.atom(1).unwrap().h_count(), 1);
        assert_eq!(mol.atom(2).unwrap().h_count(), 0);
        assert_eq!(mol.atom(4).unwrap().pi(), 2);
        assert_eq!(mol.atom(3).unwrap().h_count(), 2);
    }

    #[test]
    fn charge_adjusts_hydrogens() {
        let mut mol = Molecule::new();
        mol.add_atom(1, Atom::new(Element::Nitrogen).with_charge(1));
        mol.add_atom(2, Atom::new(Element::Oxygen).with_charge(-1));
        assign_valence(&mut mol);
        assert_eq!(mol.atom(1).unwrap().h_count(), 4);
        assert_eq!(mol.atom(2).unwrap().h_count(), 1);
    }
}
