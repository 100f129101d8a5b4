//! Molecule builders shared by the integration tests.

#![allow(dead_code)]

use mcsdr::{
    molecule::{Atom, AtomKey, Bond, Element},
    valence::assign_valence,
    Molecule,
};

/// Build a molecule from atoms and bonds, then assign valence.
pub fn build(atoms: &[(AtomKey, Element)], bonds: &[(AtomKey, AtomKey, Bond)]) -> Molecule {
    let mut mol = Molecule::new();
    for &(k, e) in atoms {
        mol.add_atom(k, Atom::new(e));
    }
    for &(u, v, b) in bonds {
        mol.add_bond(u, v, b).unwrap();
    }
    assign_valence(&mut mol);
    mol
}

/// Linear chain of `elements` joined by single bonds, keyed from 1.
pub fn chain(elements: &[Element]) -> Molecule {
    let atoms: Vec<_> = (1..).zip(elements.iter().copied()).collect();
    let bonds: Vec<_> = (1..elements.len() as AtomKey)
        .map(|i| (i, i + 1, Bond::Single))
        .collect();
    build(&atoms, &bonds)
}

/// Carbon skeleton with single bonds.
pub fn carbon(keys: impl IntoIterator<Item = AtomKey>, bonds: &[(AtomKey, AtomKey)]) -> Molecule {
    let atoms: Vec<_> = keys.into_iter().map(|k| (k, Element::Carbon)).collect();
    let bonds: Vec<_> = bonds.iter().map(|&(u, v)| (u, v, Bond::Single)).collect();
    build(&atoms, &bonds)
}

/// Phenylalanine heavy atoms: 12 atoms, 12 bonds. With `hydroxy`, the para
/// hydroxyl of tyrosine is added as atom 13.
pub fn phenylalanine(hydroxy: bool) -> Molecule {
    use Element::{Carbon as C, Nitrogen as N, Oxygen as O};
    let mut atoms = vec![
        (1, C), (2, C), (3, C), (4, C), (5, C), (6, C), (7, C), (8, C), (9, N), (10, C), (11, O),
        (12, O),
    ];
    let mut bonds = vec![
        (1, 2, Bond::Aromatic),
        (2, 3, Bond::Aromatic),
        (3, 4, Bond::Aromatic),
        (4, 5, Bond::Aromatic),
        (5, 6, Bond::Aromatic),
        (6, 1, Bond::Aromatic),
        (1, 7, Bond::Single),
        (7, 8, Bond::Single),
        (8, 9, Bond::Single),
        (8, 10, Bond::Single),
        (10, 11, Bond::Double),
        (10, 12, Bond::Single),
    ];
    if hydroxy {
        atoms.push((13, O));
        bonds.push((4, 13, Bond::Single));
    }
    build(&atoms, &bonds)
}

/// Cubane: carbons on the eight corners of a cube, bonded along its edges.
pub fn cubane() -> Molecule {
    carbon(
        1..=8,
        &[
            (1, 2), (2, 3), (3, 4), (4, 1), (5, 6), (6, 7), (7, 8), (8, 5), (1, 5), (2, 6), (3, 7),
            (4, 8),
        ],
    )
}

/// Alpha-pinene: a bicyclo[3.1.1] skeleton with a gem-dimethyl bridge and a
/// methyl on the ring double bond.
pub fn pinene() -> Molecule {
    use Element::Carbon as C;
    let atoms: Vec<_> = (1..=10).map(|k| (k, C)).collect();
    build(
        &atoms,
        &[
            (1, 2, Bond::Single),
            (2, 3, Bond::Double),
            (3, 4, Bond::Single),
            (4, 5, Bond::Single),
            (5, 6, Bond::Single),
            (6, 1, Bond::Single),
            (1, 7, Bond::Single),
            (7, 5, Bond::Single),
            (6, 8, Bond::Single),
            (6, 9, Bond::Single),
            (2, 10, Bond::Single),
        ],
    )
}

/// Key of atom `(i, j)` on a `rows` by `cols` grid.
fn grid_key(i: usize, j: usize, cols: usize) -> AtomKey {
    (i * cols + j + 1) as AtomKey
}

/// Carbon nanotube as a brick-wall honeycomb rolled along its columns.
///
/// Every row is a ring of `cols` atoms; atoms `(i, j)` and `(i + 1, j)` are
/// bonded when `i + j` is even. `cols` must be even.
pub fn nanotube(rows: usize, cols: usize) -> Molecule {
    let keys = (0..rows * cols).map(|k| k as AtomKey + 1);
    let mut bonds = Vec::new();
    for i in 0..rows {
        for j in 0..cols {
            bonds.push((grid_key(i, j, cols), grid_key(i, (j + 1) % cols, cols)));
            if i + 1 < rows && (i + j) % 2 == 0 {
                bonds.push((grid_key(i, j, cols), grid_key(i + 1, j, cols)));
            }
        }
    }
    carbon(keys, &bonds)
}

/// Linear acene of `n` fused hexagons; `acene(2)` is naphthalene.
pub fn acene(n: usize) -> Molecule {
    // Hexagon k uses the shared edge (a, b) of the previous one.
    let mut bonds = vec![(1, 2), (2, 3), (3, 4), (4, 5), (5, 6), (6, 1)];
    let (mut a, mut b) = (5, 4);
    let mut next: AtomKey = 7;
    for _ in 1..n {
        let (p, q, r, s) = (next, next + 1, next + 2, next + 3);
        bonds.extend([(a, p), (p, q), (q, r), (r, s), (s, b)]);
        a = r;
        b = q;
        next += 4;
    }
    carbon(1..next, &bonds)
}
