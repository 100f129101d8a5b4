//! Remove atoms that distort substructure comparison: explicit hydrogens,
//! counter ions, free water and coordinated heavy metals.

use tracing::trace;

use crate::molecule::{AtomKey, Element, Molecule};

/// Metals removed by [`remove_coordinated_metal`] unless configured otherwise.
pub const DEFAULT_COORDINATED_METALS: [Element; 2] = [Element::Iron, Element::Cobalt];

fn remove_all(mol: &mut Molecule, keys: Vec<AtomKey>, what: &str) -> usize {
    for &k in &keys {
        mol.remove_atom(k);
    }
    if !keys.is_empty() {
        trace!(removed = keys.len(), "removed {what}");
    }
    keys.len()
}

/// Remove hydrogens bonded to a heavy atom and count them as implicit
/// hydrogens on that atom. Hydrogens bonded only to hydrogens (H2) stay.
pub fn remove_explicit_hydrogens(mol: &mut Molecule) -> usize {
    let mut to_remove = Vec::new();
    let mut parents = Vec::new();
    for (k, atom) in mol.atoms() {
        if atom.element() != Element::Hydrogen {
            continue;
        }
        let heavy = mol.neighbors(k).find(|&n| {
            mol.atom(n)
                .is_some_and(|a| a.element() != Element::Hydrogen)
        });
        if let Some(parent) = heavy {
            to_remove.push(k);
            parents.push(parent);
        }
    }
    for parent in parents {
        if let Some(atom) = mol.atom_mut(parent) {
            atom.set_h_count(atom.h_count().saturating_add(1));
        }
    }
    remove_all(mol, to_remove, "explicit hydrogens")
}

/// Remove charged atoms without neighbors.
pub fn remove_salt(mol: &mut Molecule) -> usize {
    let keys = mol
        .atoms()
        .filter(|(k, a)| a.charge() != 0 && mol.neighbor_count(*k) == 0)
        .map(|(k, _)| k)
        .collect();
    remove_all(mol, keys, "salts")
}

/// Remove neutral oxygen atoms without neighbors.
pub fn remove_water(mol: &mut Molecule) -> usize {
    let keys = mol
        .atoms()
        .filter(|(k, a)| {
            a.element() == Element::Oxygen && a.charge() == 0 && mol.neighbor_count(*k) == 0
        })
        .map(|(k, _)| k)
        .collect();
    remove_all(mol, keys, "water")
}

/// Remove atoms of `metals` coordinated by more than four neighbors.
pub fn remove_coordinated_metal(mol: &mut Molecule, metals: &[Element]) -> usize {
    let keys = mol
        .atoms()
        .filter(|(k, a)| metals.contains(&a.element()) && mol.neighbor_count(*k) > 4)
        .map(|(k, _)| k)
        .collect();
    remove_all(mol, keys, "coordinated metals")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::molecule::{Atom, Bond};

    #[test]
    fn hydrogens_become_implicit() {
        let mut mol = Molecule::new();
        mol.add_atom(1, Atom::new(Element::Oxygen));
        mol.add_atom(2, Atom::new(Element::Hydrogen));
        mol.add_atom(3, Atom::new(Element::Hydrogen));
        mol.add_bond(1, 2, Bond::Single).unwrap();
        mol.add_bond(1, 3, Bond::Single).unwrap();
        // Molecular hydrogen is kept.
        mol.add_atom(4, Atom::new(Element::Hydrogen));
        mol.add_atom(5, Atom::new(Element::Hydrogen));
        mol.add_bond(4, 5, Bond::Single).unwrap();

        assert_eq!(remove_explicit_hydrogens(&mut mol), 2);
        assert_eq!(mol.atom(1).unwrap().h_count(), 2);
        assert_eq!(mol.atom_count(), 3);
        assert_eq!(mol.bond_count(), 1);
    }

    #[test]
    fn salt_and_water() {
        let mut mol = Molecule::new();
        mol.add_atom(1, Atom::new(Element::Carbon));
        mol.add_atom(2, Atom::new(Element::Oxygen).with_charge(-1));
        mol.add_bond(1, 2, Bond::Single).unwrap();
        mol.add_atom(3, Atom::new(Element::Sodium).with_charge(1));
        mol.add_atom(4, Atom::new(Element::Oxygen));
        mol.add_atom(5, Atom::new(Element::Chlorine));

        assert_eq!(remove_salt(&mut mol), 1);
        assert_eq!(remove_water(&mut mol), 1);
        let left: Vec<AtomKey> = mol.atoms().map(|(k, _)| k).collect();
        assert_eq!(left, vec![1, 2, 5]);
    }

    #[test]
    fn only_highly_coordinated_metals() {
        let mut mol = Molecule::new();
        mol.add_atom(1, Atom::new(Element::Iron));
        mol.add_atom(2, Atom::new(Element::Cobalt));
        for k in 10..16 {
            mol.add_atom(k, Atom::new(Element::Nitrogen));
            mol.add_bond(1, k, Bond::Single).unwrap();
        }
        for k in 10..14 {
            mol.add_bond(2, k, Bond::Single).unwrap();
        }

        assert_eq!(remove_coordinated_metal(&mut mol, &DEFAULT_COORDINATED_METALS), 1);
        assert!(mol.atom(1).is_none());
        assert!(mol.atom(2).is_some());
        assert_eq!(remove_coordinated_metal(&mut mol, &[]), 0);
    }
}
