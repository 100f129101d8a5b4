//! Maximum clique search over bit-set adjacency graphs.
//!
//! A greedy clique seeds the search so that a timed-out run still returns a
//! non-trivial answer, then a pivoting Bron–Kerbosch enumeration keeps the
//! largest clique seen until the deadline passes.

use std::cmp::Reverse;

use bit_set::BitSet;
use tracing::debug;

use crate::deadline::Ticker;

/// Undirected graph on `0..len()` stored as one adjacency bit set per vertex.
///
/// Degrees are kept alongside the bit sets so that ordering vertices by
/// degree does not recount bits.
#[derive(Debug, Clone, Default)]
pub struct AdjacencyGraph {
    graph: Vec<BitSet>,
    degrees: Vec<usize>,
}

impl AdjacencyGraph {
    pub fn new(size: usize) -> Self {
        Self {
            graph: (0..size).map(|_| BitSet::with_capacity(size)).collect(),
            degrees: vec![0; size],
        }
    }

    /// Append an isolated vertex and return its index. Its bit set grows
    /// with the neighbors actually inserted.
    pub fn add_vertex(&mut self) -> usize {
        self.graph.push(BitSet::new());
        self.degrees.push(0);
        self.graph.len() - 1
    }

    /// Build a graph on `size` vertices from an edge list. Self loops are
    /// ignored.
    pub fn from_edges(size: usize, edges: impl IntoIterator<Item = (usize, usize)>) -> Self {
        let mut g = Self::new(size);
        for (u, v) in edges {
            g.add_edge(u, v);
        }
        g
    }

    pub fn add_edge(&mut self, u: usize, v: usize) {
        if u != v && self.graph[u].insert(v) {
            self.graph[v].insert(u);
            self.degrees[u] += 1;
            self.degrees[v] += 1;
        }
    }

    pub fn len(&self) -> usize {
        self.graph.len()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.is_empty()
    }

    pub fn edge_count(&self) -> usize {
        self.degrees.iter().sum::<usize>() / 2
    }

    pub fn degree(&self, v: usize) -> usize {
        self.degrees[v]
    }

    pub fn neighbors(&self, v: usize) -> &BitSet {
        &self.graph[v]
    }

    pub fn are_adjacent(&self, u: usize, v: usize) -> bool {
        self.graph[u].contains(v)
    }
}

/// Largest clique found and whether the search ran to completion.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CliqueSearch {
    pub clique: Vec<usize>,
    pub complete: bool,
}

/// Find a maximum clique of `g`, stopping early when `ticker` expires.
///
/// The greedy seed always takes its first vertex, so a graph with at least
/// one edge yields a non-empty clique even on an expired ticker. Vertices of
/// the returned clique are sorted ascending.
pub fn max_clique(g: &AdjacencyGraph, ticker: &mut Ticker) -> CliqueSearch {
    let best = greedy_clique(g, ticker);
    let mut search = Search { g, ticker, best };
    if !search.ticker.is_expired() {
        let p: BitSet = (0..g.len()).filter(|&v| g.degree(v) > 0).collect();
        search.expand(&mut Vec::new(), p, BitSet::with_capacity(g.len()));
    }

    let complete = !search.ticker.is_expired();
    let mut clique = search.best;
    clique.sort_unstable();
    debug!(
        vertices = g.len(),
        size = clique.len(),
        complete,
        "maximum clique search finished"
    );
    CliqueSearch { clique, complete }
}

/// Grow a clique by adding vertices in order of decreasing degree.
fn greedy_clique(g: &AdjacencyGraph, ticker: &mut Ticker) -> Vec<usize> {
    let mut order: Vec<usize> = (0..g.len()).filter(|&v| g.degree(v) > 0).collect();
    order.sort_by_key(|&v| Reverse(g.degree(v)));
    let mut clique: Vec<usize> = Vec::new();
    for v in order {
        if !clique.is_empty() && !ticker.tick() {
            break;
        }
        if clique.iter().all(|&u| g.are_adjacent(u, v)) {
            clique.push(v);
        }
    }
    clique
}

struct Search<'a> {
    g: &'a AdjacencyGraph,
    ticker: &'a mut Ticker,
    best: Vec<usize>,
}

impl Search<'_> {
    fn expand(&mut self, r: &mut Vec<usize>, mut p: BitSet, mut x: BitSet) {
        if !self.ticker.tick() {
            return;
        }

        if p.is_empty() {
            if r.len() > self.best.len() {
                self.best = r.clone();
            }
            return;
        }

        // Even taking every candidate cannot beat the incumbent.
        if r.len() + p.len() <= self.best.len() {
            return;
        }

        let Some(pivot) = self.pivot(&p, &x) else {
            return;
        };
        let candidates: Vec<usize> = p.difference(self.g.neighbors(pivot)).collect();

        for v in candidates {
            let mut new_p = p.clone();
            new_p.intersect_with(self.g.neighbors(v));
            let mut new_x = x.clone();
            new_x.intersect_with(self.g.neighbors(v));

            r.push(v);
            self.expand(r, new_p, new_x);
            r.pop();

            if self.ticker.is_expired() {
                return;
            }
            p.remove(v);
            x.insert(v);
        }
    }

    /// The vertex of `p` or `x` with the most neighbors in `p`, or `None`
    /// if the ticker expires during the scan.
    fn pivot(&mut self, p: &BitSet, x: &BitSet) -> Option<usize> {
        let mut best: Option<(usize, usize)> = None;
        for u in p.iter().chain(x.iter()) {
            if !self.ticker.tick() {
                return None;
            }
            let covered = self.g.neighbors(u).intersection(p).count();
            if best.map_or(true, |(_, most)| covered > most) {
                best = Some((u, covered));
            }
        }
        best.map(|(u, _)| u)
    }
}
