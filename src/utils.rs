use std::collections::HashMap;

use crate::molecule::AtomKey;

/// Adjacency lists of the line graph of `bonds`: node `i` is `bonds[i]`,
/// and two nodes are adjacent iff their bonds share an atom.
pub fn line_graph(bonds: &[(AtomKey, AtomKey)]) -> Vec<Vec<usize>> {
    let mut incident: HashMap<AtomKey, Vec<usize>> = HashMap::new();
    for (i, &(u, v)) in bonds.iter().enumerate() {
        incident.entry(u).or_default().push(i);
        incident.entry(v).or_default().push(i);
    }

    bonds
        .iter()
        .enumerate()
        .map(|(i, (u, v))| {
            let mut nbrs: Vec<usize> = [u, v]
                .into_iter()
                .flat_map(|a| incident[a].iter().copied())
                .filter(|&j| j != i)
                .collect();
            nbrs.sort_unstable();
            nbrs.dedup();
            nbrs
        })
        .collect()
}
