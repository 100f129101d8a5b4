//! Diameter-restricted maximum common edge subgraph.
//!
//! Two [`DescriptorArray`]s are joined on their collater codes into a
//! modular product graph whose maximum clique is the largest set of bonds of
//! A matched one-to-one to bonds of B with identical pairwise distances and
//! types within the diameter.

use std::{collections::HashMap, time::Duration};

use tracing::{debug, warn};

use crate::{
    clique::{max_clique, AdjacencyGraph},
    deadline::{Deadline, Ticker},
    descriptor::{DescriptorArray, DescriptorOptions, Entry, DEFAULT_TIMEOUT},
    error::{Error, Result},
    molecule::{AtomKey, Molecule},
};

/// Settings for [`MatchResult::from_arrays`].
#[derive(Debug, Clone, PartialEq)]
pub struct MatchOptions {
    /// Total budget for product graph construction and clique search.
    pub timeout: Duration,
    /// Fraction of `timeout` given to product graph construction.
    pub construction_share: f64,
}

impl Default for MatchOptions {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            construction_share: 0.5,
        }
    }
}

impl MatchOptions {
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn construction_share(mut self, share: f64) -> Self {
        self.construction_share = share;
        self
    }

    fn validate(&self) -> Result<()> {
        if (0.0..=1.0).contains(&self.construction_share) {
            Ok(())
        } else {
            Err(Error::InvalidShare(self.construction_share))
        }
    }
}

/// Modular product of two comparison arrays.
///
/// Node `i` is the pair `nodes()[i]` of a line-graph node of A and one of B.
#[derive(Debug, Clone)]
pub struct ProductGraph {
    nodes: Vec<(usize, usize)>,
    graph: AdjacencyGraph,
    complete: bool,
}

impl ProductGraph {
    /// Join the entries of `a` and `b` on equal codes.
    ///
    /// Both entry lists are sorted by code and merged, so only equal-code
    /// runs are paired. Each pair of matching entries `(a.u, a.v)` and
    /// `(b.u, b.v)` contributes the edge `(a.u, b.u) -- (a.v, b.v)`.
    /// Edges go straight into the adjacency sets, so construction, including
    /// its allocations, stops when `ticker` expires and leaves a partial
    /// graph.
    pub fn build(a: &DescriptorArray, b: &DescriptorArray, ticker: &mut Ticker) -> Self {
        let sorted = |arr: &DescriptorArray| {
            let mut entries: Vec<Entry> = arr.entries().to_vec();
            entries.sort_unstable_by_key(|e| (e.code, e.u, e.v));
            entries
        };
        let (ea, eb) = (sorted(a), sorted(b));

        let mut index: HashMap<(usize, usize), usize> = HashMap::new();
        let mut nodes = Vec::new();
        let mut graph = AdjacencyGraph::default();
        let mut intern = |pair: (usize, usize), graph: &mut AdjacencyGraph| {
            *index.entry(pair).or_insert_with(|| {
                nodes.push(pair);
                graph.add_vertex()
            })
        };

        let (mut i, mut j) = (0, 0);
        'join: while i < ea.len() && j < eb.len() {
            let code = ea[i].code;
            if code < eb[j].code {
                i += 1;
                continue;
            }
            if code > eb[j].code {
                j += 1;
                continue;
            }
            let i_end = i + ea[i..].iter().take_while(|e| e.code == code).count();
            let j_end = j + eb[j..].iter().take_while(|e| e.code == code).count();
            for x in &ea[i..i_end] {
                for y in &eb[j..j_end] {
                    let s = intern((x.u, y.u), &mut graph);
                    let t = intern((x.v, y.v), &mut graph);
                    graph.add_edge(s, t);
                    if !ticker.tick() {
                        break 'join;
                    }
                }
            }
            i = i_end;
            j = j_end;
        }

        let complete = !ticker.is_expired();
        debug!(
            nodes = graph.len(),
            edges = graph.edge_count(),
            complete,
            "built modular product graph"
        );
        Self {
            nodes,
            graph,
            complete,
        }
    }

    pub fn nodes(&self) -> &[(usize, usize)] {
        &self.nodes
    }

    pub fn graph(&self) -> &AdjacencyGraph {
        &self.graph
    }

    /// `false` if construction ran out of time.
    pub fn is_complete(&self) -> bool {
        self.complete
    }
}

/// Outcome of one diameter-restricted comparison.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchResult {
    clique: Vec<(usize, usize)>,
    inverse_a: Vec<(AtomKey, AtomKey)>,
    max_a: usize,
    max_b: usize,
    valid: bool,
    elapsed: Duration,
}

impl MatchResult {
    /// Match two comparison arrays.
    ///
    /// Invalid inputs are matched anyway; the result inherits their
    /// invalidity. Only bad options are an error.
    pub fn from_arrays(
        a: &DescriptorArray,
        b: &DescriptorArray,
        options: &MatchOptions,
    ) -> Result<Self> {
        options.validate()?;
        let total = Deadline::after(options.timeout);

        let mut construction = total.share(options.construction_share).ticker();
        let product = ProductGraph::build(a, b, &mut construction);

        let mut search = Deadline::after(total.remaining()).ticker();
        let found = max_clique(product.graph(), &mut search);

        let clique: Vec<(usize, usize)> = found
            .clique
            .iter()
            .filter_map(|&n| product.nodes().get(n).copied())
            .collect();
        let valid = a.is_valid() && b.is_valid() && product.is_complete() && found.complete;
        if a.is_valid() && b.is_valid() && !valid {
            warn!(
                edges = clique.len(),
                "comparison timed out; similarity is a lower bound"
            );
        }

        let result = Self {
            inverse_a: a.inverse_map().to_vec(),
            max_a: a.max_size(),
            max_b: b.max_size(),
            clique,
            valid,
            elapsed: total.elapsed(),
        };
        debug!(
            edges = result.edge_count(),
            max_a = result.max_a,
            max_b = result.max_b,
            valid = result.valid,
            "comparison finished"
        );
        Ok(result)
    }

    /// Matched pairs of line-graph nodes `(node of A, node of B)`.
    pub fn clique(&self) -> &[(usize, usize)] {
        &self.clique
    }

    /// Matched bonds of A, each as `(lower key, higher key)`.
    pub fn mapping(&self) -> Vec<(AtomKey, AtomKey)> {
        self.clique
            .iter()
            .filter_map(|&(a, _)| self.inverse_a.get(a).copied())
            .collect()
    }

    /// Number of matched bonds.
    pub fn edge_count(&self) -> usize {
        self.clique.len()
    }

    /// `edge_count / (max_a + max_b - edge_count)` rounded to `digits`
    /// decimal places, or 0 if the denominator is 0.
    ///
    /// Self-comparison bounds below the match size (possible after a
    /// timeout) are raised to the match size.
    pub fn local_sim(&self, digits: u32) -> f64 {
        let e = self.edge_count();
        let denominator = self.max_a.max(e) + self.max_b.max(e) - e;
        if denominator == 0 {
            return 0.0;
        }
        let sim = e as f64 / denominator as f64;
        let scale = 10f64.powi(digits.min(15) as i32);
        (sim * scale).round() / scale
    }

    /// The matched bonds of `mol_a` and their atoms as a new molecule.
    ///
    /// `mol_a` must be the molecule the first array was built from.
    pub fn extracted_fragment(&self, mol_a: &Molecule) -> Result<Molecule> {
        let mut fragment = Molecule::new();
        for (u, v) in self.mapping() {
            let (Some(bond), Some(atom_u), Some(atom_v)) =
                (mol_a.bond(u, v), mol_a.atom(u), mol_a.atom(v))
            else {
                continue;
            };
            let bond = *bond;
            for (key, atom) in [(u, atom_u), (v, atom_v)] {
                if fragment.atom(key).is_none() {
                    fragment.add_atom(key, *atom);
                }
            }
            fragment.add_bond(u, v, bond)?;
        }
        Ok(fragment)
    }

    /// `false` if either array or the comparison itself was cut short.
    pub fn is_valid(&self) -> bool {
        self.valid
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }
}

/// Build both comparison arrays and match them.
pub fn compare(
    a: &Molecule,
    b: &Molecule,
    descriptor: &DescriptorOptions,
    options: &MatchOptions,
) -> Result<MatchResult> {
    let arr_a = DescriptorArray::new(a, descriptor)?;
    let arr_b = DescriptorArray::new(b, descriptor)?;
    MatchResult::from_arrays(&arr_a, &arr_b, options)
}
