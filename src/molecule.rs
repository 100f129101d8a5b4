//! Graph-theoretic representation of a molecule.
//!
//! Atoms are keyed by caller-chosen integers which need not be contiguous or
//! start at zero; bonds form a simple undirected graph over those keys. A
//! molecule also carries the readiness [`Descriptor`]s set by the passes that
//! have run on it and the ring [`Topology`] computed by
//! [`crate::topology::recognize`].

use std::{
    collections::{BTreeMap, BTreeSet},
    fmt::Display,
    str::FromStr,
};

use petgraph::{dot::Dot, graphmap::UnGraphMap};
use serde::{Deserialize, Serialize};

use crate::{
    error::{Error, Result},
    topology::Topology,
};

/// Identifies an atom within one molecule.
pub type AtomKey = u32;
pub(crate) type MGraph = UnGraphMap<AtomKey, Bond>;

/// Thrown by [`Element::from_str`] if the string does not represent a valid
/// chemical element.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ParseElementError;

macro_rules! periodic_table {
    ( $(($element:ident, $name:literal),)* ) => {
        #[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
        /// Represents a chemical element. Variants are declared in order of
        /// atomic number.
        pub enum Element {
            $( $element, )*
        }

        impl Display for Element {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                match &self {
                    $( Element::$element => write!(f, "{}", $name), )*
                }
            }
        }

        impl FromStr for Element {
            type Err = ParseElementError;
            fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
                match s {
                    $( $name => Ok(Element::$element), )*
                    _ => Err(ParseElementError),
                }
            }
        }
    };
}

periodic_table!(
    (Hydrogen, "H"),
    (Helium, "He"),
    (Lithium, "Li"),
    (Beryllium, "Be"),
    (Boron, "B"),
    (Carbon, "C"),
    (Nitrogen, "N"),
    (Oxygen, "O"),
    (Fluorine, "F"),
    (Neon, "Ne"),
    (Sodium, "Na"),
    (Magnesium, "Mg"),
    (Aluminum, "Al"),
    (Silicon, "Si"),
    (Phosphorus, "P"),
    (Sulfur, "S"),
    (Chlorine, "Cl"),
    (Argon, "Ar"),
    (Potassium, "K"),
    (Calcium, "Ca"),
    (Scandium, "Sc"),
    (Titanium, "Ti"),
    (Vanadium, "V"),
    (Chromium, "Cr"),
    (Manganese, "Mn"),
    (Iron, "Fe"),
    (Cobalt, "Co"),
    (Nickel, "Ni"),
    (Copper, "Cu"),
    (Zinc, "Zn"),
    (Gallium, "Ga"),
    (Germanium, "Ge"),
    (Arsenic, "As"),
    (Selenium, "Se"),
    (Bromine, "Br"),
    (Krypton, "Kr"),
    (Rubidium, "Rb"),
    (Strontium, "Sr"),
    (Yttrium, "Y"),
    (Zirconium, "Zr"),
    (Niobium, "Nb"),
    (Molybdenum, "Mo"),
    (Technetium, "Tc"),
    (Ruthenium, "Ru"),
    (Rhodium, "Rh"),
    (Palladium, "Pd"),
    (Silver, "Ag"),
    (Cadmium, "Cd"),
    (Indium, "In"),
    (Tin, "Sn"),
    (Antimony, "Sb"),
    (Tellurium, "Te"),
    (Iodine, "I"),
    (Xenon, "Xe"),
    (Cesium, "Cs"),
    (Barium, "Ba"),
    (Lanthanum, "La"),
    (Cerium, "Ce"),
    (Praseodymium, "Pr"),
    (Neodymium, "Nd"),
    (Promethium, "Pm"),
    (Samarium, "Sm"),
    (Europium, "Eu"),
    (Gadolinium, "Gd"),
    (Terbium, "Tb"),
    (Dysprosium, "Dy"),
    (Holmium, "Ho"),
    (Erbium, "Er"),
    (Thulium, "Tm"),
    (Ytterbium, "Yb"),
    (Lutetium, "Lu"),
    (Hafnium, "Hf"),
    (Tantalum, "Ta"),
    (Wolfram, "W"),
    (Rhenium, "Re"),
    (Osmium, "Os"),
    (Iridium, "Ir"),
    (Platinum, "Pt"),
    (Gold, "Au"),
    (Mercury, "Hg"),
    (Thallium, "Tl"),
    (Lead, "Pb"),
    (Bismuth, "Bi"),
    (Polonium, "Po"),
    (Astatine, "At"),
    (Radon, "Rn"),
    (Francium, "Fr"),
    (Radium, "Ra"),
    (Actinium, "Ac"),
    (Thorium, "Th"),
    (Protactinium, "Pa"),
    (Uranium, "U"),
    (Neptunium, "Np"),
    (Plutonium, "Pu"),
    (Americium, "Am"),
    (Curium, "Cm"),
    (Berkelium, "Bk"),
    (Californium, "Cf"),
    (Einsteinium, "Es"),
    (Fermium, "Fm"),
    (Mendelevium, "Md"),
    (Nobelium, "No"),
    (Lawrencium, "Lr"),
    (Rutherfordium, "Rf"),
    (Dubnium, "Db"),
    (Seaborgium, "Sg"),
    (Bohrium, "Bh"),
    (Hassium, "Hs"),
    (Meitnerium, "Mt"),
    (Darmstadtium, "Ds"),
    (Roentgenium, "Rg"),
    (Copernicium, "Cn"),
    (Nihonium, "Nh"),
    (Flerovium, "Fl"),
    (Moscovium, "Mc"),
    (Livermorium, "Lv"),
    (Tennessine, "Ts"),
    (Oganesson, "Og"),
);
impl Element {
    /// Return the atomic number of this element.
    pub fn atomic_number(&self) -> u8 {
        *self as u8 + 1
    }
}

/// The nodes of a [`Molecule`] graph.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Atom {
    element: Element,
    charge: i8,
    pi: u8,
    h_count: u8,
}

impl Atom {
    /// Construct a neutral [`Atom`] of type `element` with no pi electrons
    /// and no implicit hydrogens.
    pub fn new(element: Element) -> Self {
        Self {
            element,
            charge: 0,
            pi: 0,
            h_count: 0,
        }
    }

    /// Return a copy of this atom with formal charge `charge`.
    pub fn with_charge(self, charge: i8) -> Self {
        Self { charge, ..self }
    }

    /// Return this [`Atom`]'s element.
    pub fn element(&self) -> Element {
        self.element
    }

    pub fn charge(&self) -> i8 {
        self.charge
    }

    pub fn set_charge(&mut self, charge: i8) {
        self.charge = charge;
    }

    /// Number of pi electrons assigned by [`crate::valence::assign_valence`].
    pub fn pi(&self) -> u8 {
        self.pi
    }

    pub fn set_pi(&mut self, pi: u8) {
        self.pi = pi;
    }

    /// Number of implicit hydrogens on this atom.
    pub fn h_count(&self) -> u8 {
        self.h_count
    }

    pub fn set_h_count(&mut self, h_count: u8) {
        self.h_count = h_count;
    }
}

/// The edges of a [`Molecule`] graph.
///
/// Upstream perception may mark a bond as aromatic instead of assigning
/// alternating single and double bonds.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Bond {
    Single,
    Double,
    Triple,
    Aromatic,
}

impl Bond {
    /// Return the numeric bond order, with 4 standing for aromatic bonds as in
    /// the `.mol` format.
    pub fn order(&self) -> u8 {
        match self {
            Bond::Single => 1,
            Bond::Double => 2,
            Bond::Triple => 3,
            Bond::Aromatic => 4,
        }
    }
}

/// Thrown by [`Bond::try_from`] when given anything other than 1, 2, 3 or 4.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ParseBondError;

impl TryFrom<usize> for Bond {
    type Error = ParseBondError;
    fn try_from(value: usize) -> std::result::Result<Self, Self::Error> {
        match value {
            1 => Ok(Bond::Single),
            2 => Ok(Bond::Double),
            3 => Ok(Bond::Triple),
            4 => Ok(Bond::Aromatic),
            _ => Err(ParseBondError),
        }
    }
}

/// Readiness flags set by the passes that have run on a [`Molecule`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Descriptor {
    /// Pi electrons and implicit hydrogens have been assigned.
    Valence,
    /// Rings, scaffolds and isolated fragments have been recognized.
    Topology,
    /// The ring set has been minified.
    MinifiedRing,
}

impl Display for Descriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Descriptor::Valence => "Valence",
            Descriptor::Topology => "Topology",
            Descriptor::MinifiedRing => "MinifiedRing",
        };
        write!(f, "{name}")
    }
}

/// A simple, loopless graph with [`Atom`]s as nodes and [`Bond`]s as edges.
///
/// Structural mutation does not reset descriptors or topology; callers rerun
/// the passes they need after editing a molecule.
#[derive(Debug, Clone, Default)]
pub struct Molecule {
    graph: MGraph,
    atoms: BTreeMap<AtomKey, Atom>,
    descriptors: BTreeSet<Descriptor>,
    topology: Topology,
}

impl Molecule {
    /// Construct an empty molecule.
    pub fn new() -> Self {
        Self::default()
    }

    /// Return a pretty-printable representation of this molecule.
    pub fn info(&self) -> String {
        let dot = Dot::new(&self.graph);
        format!("{dot:?}")
    }

    /// Insert `atom` under `key`, overwriting any atom already stored there
    /// but keeping its bonds.
    pub fn add_atom(&mut self, key: AtomKey, atom: Atom) {
        self.graph.add_node(key);
        self.atoms.insert(key, atom);
    }

    /// Bond two existing, distinct atoms. Bonding an already bonded pair is
    /// an error, so the graph stays simple.
    pub fn add_bond(&mut self, u: AtomKey, v: AtomKey, bond: Bond) -> Result<()> {
        for key in [u, v] {
            if !self.atoms.contains_key(&key) {
                return Err(Error::UnknownAtom(key));
            }
        }
        if u == v {
            return Err(Error::SelfLoop(u));
        }
        if self.graph.contains_edge(u, v) {
            return Err(Error::DuplicateBond(u, v));
        }
        self.graph.add_edge(u, v, bond);
        Ok(())
    }

    /// Remove an atom together with its bonds.
    pub fn remove_atom(&mut self, key: AtomKey) -> Option<Atom> {
        self.graph.remove_node(key);
        self.atoms.remove(&key)
    }

    pub fn remove_bond(&mut self, u: AtomKey, v: AtomKey) -> Option<Bond> {
        self.graph.remove_edge(u, v)
    }

    pub fn atom(&self, key: AtomKey) -> Option<&Atom> {
        self.atoms.get(&key)
    }

    pub fn atom_mut(&mut self, key: AtomKey) -> Option<&mut Atom> {
        self.atoms.get_mut(&key)
    }

    pub fn bond(&self, u: AtomKey, v: AtomKey) -> Option<&Bond> {
        self.graph.edge_weight(u, v)
    }

    /// Iterate over atoms in ascending key order.
    pub fn atoms(&self) -> impl Iterator<Item = (AtomKey, &Atom)> + '_ {
        self.atoms.iter().map(|(k, a)| (*k, a))
    }

    /// Iterate over bonds. Each bond is reported once, in no particular order.
    pub fn bonds(&self) -> impl Iterator<Item = (AtomKey, AtomKey, &Bond)> + '_ {
        self.graph.all_edges()
    }

    /// Return all bonds as `(lower key, higher key, bond)` in ascending order.
    pub fn sorted_bonds(&self) -> Vec<(AtomKey, AtomKey, Bond)> {
        let mut bonds: Vec<_> = self
            .graph
            .all_edges()
            .map(|(u, v, b)| (u.min(v), u.max(v), *b))
            .collect();
        bonds.sort();
        bonds
    }

    pub fn neighbors(&self, key: AtomKey) -> impl Iterator<Item = AtomKey> + '_ {
        self.graph.neighbors(key)
    }

    pub fn neighbor_count(&self, key: AtomKey) -> usize {
        self.graph.neighbors(key).count()
    }

    pub fn atom_count(&self) -> usize {
        self.atoms.len()
    }

    pub fn bond_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn is_empty(&self) -> bool {
        self.atoms.is_empty()
    }

    /// Fail fast unless the pass producing `descriptor` has run.
    pub fn require(&self, descriptor: Descriptor) -> Result<()> {
        if self.descriptors.contains(&descriptor) {
            Ok(())
        } else {
            Err(Error::MissingDescriptor(descriptor))
        }
    }

    pub fn has_descriptor(&self, descriptor: Descriptor) -> bool {
        self.descriptors.contains(&descriptor)
    }

    pub(crate) fn mark(&mut self, descriptor: Descriptor) {
        self.descriptors.insert(descriptor);
    }

    pub(crate) fn unmark(&mut self, descriptor: Descriptor) {
        self.descriptors.remove(&descriptor);
    }

    /// Return the ring topology. Empty until
    /// [`crate::topology::recognize`] has run.
    pub fn topology(&self) -> &Topology {
        &self.topology
    }

    pub(crate) fn set_topology(&mut self, topology: Topology) {
        self.topology = topology;
    }

    pub(crate) fn topology_mut(&mut self) -> &mut Topology {
        &mut self.topology
    }

    /// Return a copy of this molecule without its isolated fragments.
    pub fn largest_graph(&self) -> Result<Molecule> {
        self.require(Descriptor::Valence)?;
        self.require(Descriptor::Topology)?;
        let mut mol = self.clone();
        for fragment in &self.topology.isolated {
            for key in fragment {
                mol.remove_atom(*key);
            }
        }
        Ok(mol)
    }

    /// Encode atoms and bonds as compact JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(&MoleculeRecord::from(self))?)
    }

    /// Decode a molecule written by [`Molecule::to_json`]. Descriptors and
    /// topology are not persisted and must be recomputed.
    pub fn from_json(text: &str) -> Result<Molecule> {
        let record: MoleculeRecord = serde_json::from_str(text)?;
        record.into_molecule()
    }
}

/// Serialized form of an [`Atom`], using short field names.
#[derive(Serialize, Deserialize)]
struct AtomRecord {
    sym: String,
    #[serde(default, skip_serializing_if = "is_zero_i8")]
    chg: i8,
    #[serde(default, skip_serializing_if = "is_zero_u8")]
    pi: u8,
    #[serde(default, skip_serializing_if = "is_zero_u8")]
    hs: u8,
}

/// Serialized form of one bond.
#[derive(Serialize, Deserialize)]
struct BondRecord {
    u: AtomKey,
    v: AtomKey,
    o: u8,
}

#[derive(Serialize, Deserialize)]
struct MoleculeRecord {
    atoms: BTreeMap<AtomKey, AtomRecord>,
    bonds: Vec<BondRecord>,
}

fn is_zero_i8(x: &i8) -> bool {
    *x == 0
}

fn is_zero_u8(x: &u8) -> bool {
    *x == 0
}

impl From<&Molecule> for MoleculeRecord {
    fn from(mol: &Molecule) -> Self {
        let atoms = mol
            .atoms()
            .map(|(k, a)| {
                (
                    k,
                    AtomRecord {
                        sym: a.element.to_string(),
                        chg: a.charge,
                        pi: a.pi,
                        hs: a.h_count,
                    },
                )
            })
            .collect();
        let bonds = mol
            .sorted_bonds()
            .into_iter()
            .map(|(u, v, b)| BondRecord { u, v, o: b.order() })
            .collect();
        Self { atoms, bonds }
    }
}

impl MoleculeRecord {
    fn into_molecule(self) -> Result<Molecule> {
        let mut mol = Molecule::new();
        for (key, rec) in self.atoms {
            let element = rec.sym.parse::<Element>().map_err(|_| Error::Parse {
                line: 0,
                reason: format!("unknown element symbol {:?}", rec.sym),
            })?;
            let mut atom = Atom::new(element).with_charge(rec.chg);
            atom.set_pi(rec.pi);
            atom.set_h_count(rec.hs);
            mol.add_atom(key, atom);
        }
        for rec in self.bonds {
            let bond = Bond::try_from(rec.o as usize).map_err(|_| Error::Parse {
                line: 0,
                reason: format!("unknown bond order {}", rec.o),
            })?;
            mol.add_bond(rec.u, rec.v, bond)?;
        }
        Ok(mol)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn element_to_string() {
        assert!(Element::Hydrogen.to_string() == "H")
    }

    #[test]
    fn element_from_string() {
        assert!(str::parse("H") == Ok(Element::Hydrogen));
        assert!(str::parse::<Element>("Foo").is_err());
    }

    #[test]
    fn atomic_numbers_follow_declaration_order() {
        assert_eq!(Element::Hydrogen.atomic_number(), 1);
        assert_eq!(Element::Carbon.atomic_number(), 6);
        assert_eq!(Element::Iron.atomic_number(), 26);
        assert_eq!(Element::Oganesson.atomic_number(), 118);
    }

    #[test]
    fn keys_need_not_be_contiguous() {
        let mut mol = Molecule::new();
        mol.add_atom(10, Atom::new(Element::Carbon));
        mol.add_atom(42, Atom::new(Element::Oxygen));
        mol.add_bond(42, 10, Bond::Double).unwrap();
        assert_eq!(mol.bond(10, 42), Some(&Bond::Double));
        assert_eq!(mol.neighbors(10).collect::<Vec<_>>(), vec![42]);
        assert_eq!(mol.sorted_bonds(), vec![(10, 42, Bond::Double)]);
    }

    #[test]
    fn rejects_non_simple_bonds() {
        let mut mol = Molecule::new();
        mol.add_atom(1, Atom::new(Element::Carbon));
        mol.add_atom(2, Atom::new(Element::Carbon));
        assert!(matches!(mol.add_bond(1, 1, Bond::Single), Err(Error::SelfLoop(1))));
        assert!(matches!(mol.add_bond(1, 3, Bond::Single), Err(Error::UnknownAtom(3))));
        mol.add_bond(1, 2, Bond::Single).unwrap();
        assert!(matches!(
            mol.add_bond(2, 1, Bond::Single),
            Err(Error::DuplicateBond(2, 1))
        ));
    }

    #[test]
    fn remove_atom_drops_bonds() {
        let mut mol = Molecule::new();
        for k in 1..=3 {
            mol.add_atom(k, Atom::new(Element::Carbon));
        }
        mol.add_bond(1, 2, Bond::Single).unwrap();
        mol.add_bond(2, 3, Bond::Single).unwrap();
        assert!(mol.remove_atom(2).is_some());
        assert_eq!(mol.atom_count(), 2);
        assert_eq!(mol.bond_count(), 0);
        assert_eq!(mol.neighbor_count(1), 0);
    }

    #[test]
    fn require_reports_missing_descriptor() {
        let mol = Molecule::new();
        assert!(matches!(
            mol.require(Descriptor::Valence),
            Err(Error::MissingDescriptor(Descriptor::Valence))
        ));
    }

    #[test]
    fn json_uses_compact_names() {
        let mut mol = Molecule::new();
        mol.add_atom(1, Atom::new(Element::Nitrogen).with_charge(1));
        mol.add_atom(2, Atom::new(Element::Carbon));
        mol.add_bond(1, 2, Bond::Triple).unwrap();
        let text = mol.to_json().unwrap();
        assert!(text.contains("\"sym\":\"N\""));
        assert!(text.contains("\"chg\":1"));
        assert!(text.contains("\"o\":3"));

        let back = Molecule::from_json(&text).unwrap();
        assert_eq!(back.atom(1).unwrap().charge(), 1);
        assert_eq!(back.atom(2).unwrap().element(), Element::Carbon);
        assert_eq!(back.bond(2, 1), Some(&Bond::Triple));
    }
}
