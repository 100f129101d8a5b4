//! Ring perception: cycle basis, ring systems and disconnected fragments.
//!
//! [`recognize`] finds a cycle basis with a single stack-driven traversal
//! and groups the cycles into scaffolds (ring systems) as they are closed.
//! [`minify_rings`] then shrinks each scaffold's rings toward the smallest
//! rings of the system. Minification is a heuristic: for graphs that are not
//! outerplanar it may keep rings larger than the smallest set of smallest
//! rings.

use std::collections::{HashMap, HashSet, VecDeque};

use petgraph::unionfind::UnionFind;
use tracing::{debug, trace, warn};

use crate::{
    error::Result,
    molecule::{AtomKey, Descriptor, Molecule},
};

/// Number of rings a scaffold may pop from its work queue before
/// minification gives up on it.
pub const MINIFY_ATTEMPT_LIMIT: usize = 100;

/// Rings, scaffolds and isolated fragments of a molecule.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Topology {
    /// Cycle basis. Each ring lists its atoms in cycle order.
    pub rings: Vec<Vec<AtomKey>>,
    /// Partition of ring indices into ring systems.
    pub scaffolds: Vec<Vec<usize>>,
    /// Connected components other than the first one discovered, largest
    /// first.
    pub isolated: Vec<Vec<AtomKey>>,
}

impl Topology {
    /// Number of atoms in at least one ring.
    pub fn ring_atom_count(&self) -> usize {
        self.rings
            .iter()
            .flatten()
            .collect::<HashSet<_>>()
            .len()
    }
}

/// Outcome of [`minify_rings`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Minification {
    Complete,
    /// These scaffolds hit [`MINIFY_ATTEMPT_LIMIT`] and kept a partially
    /// minified ring set.
    Incomplete { scaffolds: Vec<usize> },
}

impl Minification {
    pub fn is_complete(&self) -> bool {
        matches!(self, Minification::Complete)
    }
}

/// Compute the cycle basis, scaffolds and isolated fragments of `mol` and
/// store them on the molecule, replacing any previous result.
///
/// Components are explored from the smallest unvisited atom key. The first
/// component explored is the main one; every other component is reported in
/// [`Topology::isolated`].
pub fn recognize(mol: &mut Molecule) {
    let keys: Vec<AtomKey> = mol.atoms().map(|(k, _)| k).collect();
    let index: HashMap<AtomKey, usize> = keys.iter().enumerate().map(|(i, &k)| (k, i)).collect();
    let adjacency: Vec<Vec<usize>> = keys
        .iter()
        .map(|&k| {
            let mut nbrs: Vec<usize> = mol
                .neighbors(k)
                .filter_map(|n| index.get(&n).copied())
                .collect();
            nbrs.sort_unstable();
            nbrs
        })
        .collect();

    let n = keys.len();
    let mut discovered = vec![false; n];
    let mut on_stack = vec![false; n];
    let mut pred = vec![0; n];
    // Atoms a cycle through this atom may close back onto: its tree parent
    // and the tails of cycles already closed at it.
    let mut used: Vec<Vec<usize>> = vec![Vec::new(); n];
    // Latest cycle running through each atom.
    let mut owner: Vec<Option<usize>> = vec![None; n];
    // Cycles sharing an atom belong to one scaffold. Every cycle is closed
    // by a distinct bond.
    let mut groups = UnionFind::<usize>::new(mol.bond_count());
    let mut cycles: Vec<Vec<usize>> = Vec::new();
    let mut components: Vec<Vec<AtomKey>> = Vec::new();

    for start in 0..n {
        if discovered[start] {
            continue;
        }
        discovered[start] = true;
        pred[start] = start;
        on_stack[start] = true;
        let mut stack = vec![start];
        let mut component = vec![keys[start]];

        while let Some(tail) = stack.pop() {
            on_stack[tail] = false;
            for &nbr in &adjacency[tail] {
                if !discovered[nbr] {
                    discovered[nbr] = true;
                    pred[nbr] = tail;
                    used[nbr] = vec![tail];
                    on_stack[nbr] = true;
                    stack.push(nbr);
                    component.push(keys[nbr]);
                } else if on_stack[nbr] {
                    // Walk back from the tail to an atom the neighbor is
                    // already connected through.
                    let mut cycle = vec![nbr, tail];
                    let mut p = pred[tail];
                    while !used[nbr].contains(&p) {
                        cycle.push(p);
                        p = pred[p];
                    }
                    cycle.push(p);
                    used[nbr].push(tail);

                    let id = cycles.len();
                    for &a in &cycle {
                        if let Some(earlier) = owner[a].replace(id) {
                            groups.union(id, earlier);
                        }
                    }
                    cycles.push(cycle);
                }
            }
        }
        component.sort_unstable();
        components.push(component);
    }

    // Lay out rings scaffold by scaffold, scaffolds in order of their first
    // cycle.
    let mut order: Vec<usize> = Vec::new();
    let mut members: HashMap<usize, Vec<usize>> = HashMap::new();
    for i in 0..cycles.len() {
        let root = groups.find_mut(i);
        members
            .entry(root)
            .or_insert_with(|| {
                order.push(root);
                Vec::new()
            })
            .push(i);
    }
    let mut topology = Topology::default();
    for root in order {
        let first = topology.rings.len();
        for &i in &members[&root] {
            topology
                .rings
                .push(cycles[i].iter().map(|&a| keys[a]).collect());
        }
        topology
            .scaffolds
            .push((first..topology.rings.len()).collect());
    }
    // The main component keeps its place; the rest are ranked by size.
    topology.isolated = components.into_iter().skip(1).collect();
    topology.isolated.sort_by(|a, b| b.len().cmp(&a.len()));

    debug!(
        atoms = n,
        rings = topology.rings.len(),
        scaffolds = topology.scaffolds.len(),
        isolated = topology.isolated.len(),
        "recognized topology"
    );
    mol.set_topology(topology);
    mol.unmark(Descriptor::MinifiedRing);
    mol.mark(Descriptor::Topology);
}

/// Replace each scaffold's rings with smaller rings of the same ring system.
///
/// Rings are taken shortest first and checked against the rings already
/// accepted for the scaffold; a ring that shrinks goes back to the end of
/// the queue. A scaffold that pops more than [`MINIFY_ATTEMPT_LIMIT`] rings
/// keeps its accepted rings plus whatever is still queued and is reported in
/// [`Minification::Incomplete`].
pub fn minify_rings(mol: &mut Molecule) -> Result<Minification> {
    mol.require(Descriptor::Topology)?;
    let Topology {
        rings, scaffolds, ..
    } = mol.topology_mut();

    let mut incomplete = Vec::new();
    for (s, ring_ids) in scaffolds.iter().enumerate() {
        let mut sorted: Vec<Vec<AtomKey>> = ring_ids.iter().map(|&c| rings[c].clone()).collect();
        sorted.sort_by_key(|r| r.len());
        let mut queue = VecDeque::from(sorted);
        let mut minified: Vec<Vec<AtomKey>> = Vec::with_capacity(ring_ids.len());
        let mut attempts = 0;

        while let Some(ring) = queue.pop_front() {
            attempts += 1;
            if attempts > MINIFY_ATTEMPT_LIMIT {
                warn!(scaffold = s, "ring minimization incomplete");
                queue.push_front(ring);
                incomplete.push(s);
                break;
            }
            let mut r = ring.clone();
            for m in &minified {
                if let Some((resolved, _)) = resolve_inclusion(&r, m) {
                    r = resolved;
                }
            }
            trace!(scaffold = s, from = ring.len(), to = r.len(), "minify ring");
            if r.len() == ring.len() {
                minified.push(r);
            } else {
                queue.push_back(r);
            }
        }
        minified.extend(queue);

        for (&c, ring) in ring_ids.iter().zip(minified) {
            rings[c] = ring;
        }
    }

    mol.mark(Descriptor::MinifiedRing);
    if incomplete.is_empty() {
        Ok(Minification::Complete)
    } else {
        Ok(Minification::Incomplete {
            scaffolds: incomplete,
        })
    }
}

/// Try to shorten the larger of two rings using the smaller one.
///
/// If the rings share enough atoms, the larger ring's shared arc is replaced
/// by the other side of the smaller ring. Returns the rings in argument
/// order with the larger one replaced, or `None` when the pair cannot be
/// reduced.
pub fn resolve_inclusion(a: &[AtomKey], b: &[AtomKey]) -> Option<(Vec<AtomKey>, Vec<AtomKey>)> {
    let (lt, bg, rev) = if a.len() > b.len() {
        (b, a, true)
    } else {
        (a, b, false)
    };
    let lt_atoms: HashSet<AtomKey> = lt.iter().copied().collect();
    let shared: HashSet<AtomKey> = bg.iter().copied().filter(|k| lt_atoms.contains(k)).collect();
    let shared_count = shared.len();

    // A 4-ring sharing three atoms (cubane-like) is always worth resolving.
    let special = shared_count == 3 && lt.len() == 4;
    if !special && shared_count != lt.len() && 2 * shared_count <= lt.len() + 2 {
        return None;
    }
    if shared_count == 0 || shared_count == bg.len() {
        return None;
    }

    // Start the larger ring at the beginning of its shared arc.
    let mut bq: VecDeque<AtomKey> = bg.iter().copied().collect();
    while !(shared.contains(&bq[0]) && !shared.contains(&bq[bq.len() - 1])) {
        bq.rotate_right(1);
    }
    // Align the smaller ring to the same start and direction.
    let mut lq: VecDeque<AtomKey> = lt.iter().copied().collect();
    let head = lq.iter().position(|&k| k == bq[0])?;
    lq.rotate_left(head);
    if lq.len() > 1 && bq[1] != lq[1] {
        lq = lq.into_iter().rev().collect();
        let head = lq.iter().position(|&k| k == bq[0])?;
        lq.rotate_left(head);
    }
    if bq.iter().take(shared_count).ne(lq.iter().take(shared_count)) {
        return None;
    }

    let mut new_bg: Vec<AtomKey> = bq.iter().skip(shared_count - 1).copied().collect();
    new_bg.push(bq[0]);
    new_bg.extend(lq.iter().skip(shared_count).rev());

    if rev {
        Some((new_bg, lt.to_vec()))
    } else {
        Some((lt.to_vec(), new_bg))
    }
}

/// Canonical form of a ring: the lexicographically smallest of its rotations
/// and reflections.
pub fn normalize_ring(ring: &[AtomKey]) -> Vec<AtomKey> {
    let mut best: Option<Vec<AtomKey>> = None;
    let reversed: Vec<AtomKey> = ring.iter().rev().copied().collect();
    for seq in [ring, reversed.as_slice()] {
        for shift in 0..seq.len() {
            let candidate: Vec<AtomKey> =
                seq[shift..].iter().chain(&seq[..shift]).copied().collect();
            if best.as_ref().map_or(true, |b| candidate < *b) {
                best = Some(candidate);
            }
        }
    }
    best.unwrap_or_default()
}
