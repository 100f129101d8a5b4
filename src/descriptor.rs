//! Diameter-restricted comparison arrays.
//!
//! A [`DescriptorArray`] describes a cleaned molecule through its line graph:
//! every bond becomes a node typed by its two atoms, and every pair of nodes
//! within `diameter` hops of each other becomes an [`Entry`] whose code packs
//! the hop distance and both node types. Two molecules are compared by
//! matching these codes (see [`crate::matching`]).
//!
//! Code layout (42 bits):
//!
//! ```text
//! distance (6) | type(u) (18) | type(v) (18)
//! type = atom code (9) | atom code (9), smaller code first
//! atom code = atomic number (7) | pi electrons (2)
//! ```
//!
//! See [Sheridan & Miller (1998)](https://doi.org/10.1021/ci980033m) for the
//! distance-labelled pair descriptor this builds on.

use std::time::Duration;

use tracing::{debug, warn};

use crate::{
    clique::{max_clique, AdjacencyGraph},
    deadline::Deadline,
    error::{Error, Result},
    molecule::{Atom, AtomKey, Descriptor, Element, Molecule},
    remover::{
        remove_coordinated_metal, remove_explicit_hydrogens, remove_salt, remove_water,
        DEFAULT_COORDINATED_METALS,
    },
    utils::line_graph,
};

pub const DEFAULT_DIAMETER: u32 = 8;
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);
/// Largest diameter whose distances fit the 6-bit distance field.
pub const MAX_DIAMETER: u32 = 63;

/// Settings for [`DescriptorArray::new`].
#[derive(Debug, Clone, PartialEq)]
pub struct DescriptorOptions {
    /// Line-graph hop limit for pairs entered into the array.
    pub diameter: u32,
    /// Remove explicit hydrogens before building the array.
    pub ignore_hydrogen: bool,
    /// Budget shared by the pair sweep and the self-clique bound.
    pub timeout: Duration,
    /// Metals removed when coordinated by more than four atoms.
    pub coordinated_metals: Vec<Element>,
}

impl Default for DescriptorOptions {
    fn default() -> Self {
        Self {
            diameter: DEFAULT_DIAMETER,
            ignore_hydrogen: true,
            timeout: DEFAULT_TIMEOUT,
            coordinated_metals: DEFAULT_COORDINATED_METALS.to_vec(),
        }
    }
}

impl DescriptorOptions {
    pub fn diameter(mut self, diameter: u32) -> Self {
        self.diameter = diameter;
        self
    }

    pub fn ignore_hydrogen(mut self, ignore_hydrogen: bool) -> Self {
        self.ignore_hydrogen = ignore_hydrogen;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn coordinated_metals(mut self, metals: Vec<Element>) -> Self {
        self.coordinated_metals = metals;
        self
    }
}

/// One pair of line-graph nodes within the diameter, with its collater code.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Entry {
    pub u: usize,
    pub v: usize,
    pub code: u64,
}

/// 9-bit code of an atom: atomic number and pi electron count.
pub fn atom_code(atom: &Atom) -> u64 {
    ((atom.element().atomic_number() as u64) & 0x7f) << 2 | (atom.pi().min(3) as u64)
}

/// 18-bit code of a bond from the codes of its two atoms, order independent.
pub fn bond_code(a: u64, b: u64) -> u64 {
    a.min(b) << 9 | a.max(b)
}

/// 42-bit code of a pair of bonds `distance` hops apart in the line graph.
pub fn collater(distance: u32, type_u: u64, type_v: u64) -> u64 {
    ((distance as u64) << 18 | type_u) << 18 | type_v
}

/// Comparison array of one molecule together with its self-comparison
/// clique bound.
#[derive(Debug, Clone, PartialEq)]
pub struct DescriptorArray {
    entries: Vec<Entry>,
    max_size: usize,
    inverse_map: Vec<(AtomKey, AtomKey)>,
    elapsed: Duration,
    valid: bool,
}

impl DescriptorArray {
    /// Build the comparison array of `mol`.
    ///
    /// `mol` must carry [`Descriptor::Valence`]. It is cloned and cleaned
    /// (hydrogens, salts, water, coordinated metals) before use, so the
    /// caller's molecule is not modified. Fewer than three atoms after
    /// cleaning yields [`DescriptorArray::empty`]. Running out of time is not
    /// an error: the partial array is returned with `is_valid() == false`.
    pub fn new(mol: &Molecule, options: &DescriptorOptions) -> Result<Self> {
        mol.require(Descriptor::Valence)?;
        if options.diameter == 0 || options.diameter > MAX_DIAMETER {
            return Err(Error::InvalidDiameter(options.diameter));
        }
        let deadline = Deadline::after(options.timeout);

        let mut mol = mol.clone();
        if options.ignore_hydrogen {
            remove_explicit_hydrogens(&mut mol);
        }
        remove_salt(&mut mol);
        remove_water(&mut mol);
        remove_coordinated_metal(&mut mol, &options.coordinated_metals);
        if mol.atom_count() < 3 {
            debug!(atoms = mol.atom_count(), "too few atoms for comparison");
            return Ok(Self::empty(deadline.elapsed()));
        }

        let bonds: Vec<(AtomKey, AtomKey)> = mol
            .sorted_bonds()
            .into_iter()
            .map(|(u, v, _)| (u, v))
            .collect();
        let types: Vec<u64> = bonds
            .iter()
            .map(|&(u, v)| {
                let code = |k| mol.atom(k).map(atom_code).unwrap_or_default();
                bond_code(code(u), code(v))
            })
            .collect();
        let lg = line_graph(&bonds);
        let n = bonds.len();

        let mut ticker = deadline.ticker();
        let mut entries = Vec::new();
        let mut reach = AdjacencyGraph::new(n);
        let mut dist = vec![u32::MAX; n];
        'sweep: for root in 0..n {
            dist[root] = 0;
            let mut seen = vec![root];
            let mut frontier = vec![root];
            for d in 1..=options.diameter {
                let mut next = Vec::new();
                for &x in &frontier {
                    for &y in &lg[x] {
                        if dist[y] != u32::MAX {
                            continue;
                        }
                        dist[y] = d;
                        seen.push(y);
                        next.push(y);
                        entries.push(Entry {
                            u: root,
                            v: y,
                            code: collater(d, types[root], types[y]),
                        });
                        reach.add_edge(root, y);
                        if !ticker.tick() {
                            break 'sweep;
                        }
                    }
                }
                if next.is_empty() {
                    break;
                }
                frontier = next;
            }
            for s in seen {
                dist[s] = u32::MAX;
            }
        }
        let swept = !ticker.is_expired();

        let bound = max_clique(&reach, &mut ticker);
        let valid = swept && bound.complete;
        if !valid {
            warn!(
                entries = entries.len(),
                "comparison array timed out; similarity will be a lower bound"
            );
        }
        debug!(
            atoms = mol.atom_count(),
            nodes = n,
            entries = entries.len(),
            max_size = bound.clique.len(),
            valid,
            "built comparison array"
        );

        Ok(Self {
            entries,
            max_size: bound.clique.len(),
            inverse_map: bonds,
            elapsed: deadline.elapsed(),
            valid,
        })
    }

    /// The explicit result for molecules too small to compare.
    pub fn empty(elapsed: Duration) -> Self {
        Self {
            entries: Vec::new(),
            max_size: 0,
            inverse_map: Vec::new(),
            elapsed,
            valid: false,
        }
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    /// Size of the largest clique of mutually reachable bonds, i.e. the
    /// edge count of this molecule compared with itself.
    pub fn max_size(&self) -> usize {
        self.max_size
    }

    /// Bond of each line-graph node, as `(lower key, higher key)`.
    pub fn inverse_map(&self) -> &[(AtomKey, AtomKey)] {
        &self.inverse_map
    }

    pub fn bond(&self, node: usize) -> Option<(AtomKey, AtomKey)> {
        self.inverse_map.get(node).copied()
    }

    /// Number of line-graph nodes (bonds of the cleaned molecule).
    pub fn node_count(&self) -> usize {
        self.inverse_map.len()
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// `false` if construction timed out or the molecule was too small.
    pub fn is_valid(&self) -> bool {
        self.valid
    }
}
