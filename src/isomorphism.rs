//! Subgraph isomorphism search.
//!
//! Matching treats the search as an oracle: given a host adjacency matrix and
//! a pattern adjacency matrix it produces assignment matrices `M` where
//! `M[i][j]` means pattern node `i` maps to host node `j`. Embeddings are
//! injective and edge-preserving but not induced: the host may carry extra
//! edges between matched nodes.
//!
//! Embeddings are handed to a visitor one at a time and the visitor decides
//! whether the search goes on. Graphs with interchangeable nodes have a
//! factorial number of embeddings, so callers that need one accepted
//! assignment must stop as soon as they have it.

use std::ops::ControlFlow;

use crate::types::BitMatrix;

/// Structure-preserving embedding search.
///
/// Implementations must be deterministic for identical input. No ordering is
/// promised beyond that.
pub trait SubgraphOracle {
    /// Visit embeddings of `pattern` into `host` until `visit` breaks.
    ///
    /// `compatible(i, j)` says whether pattern node `i` may take host node
    /// `j` at all. Implementations may use it to prune the search; callers
    /// still check what they receive.
    fn search(
        &self,
        host: &BitMatrix,
        pattern: &BitMatrix,
        compatible: &dyn Fn(usize, usize) -> bool,
        visit: &mut dyn FnMut(&BitMatrix) -> ControlFlow<()>,
    );

    /// Every embedding of `pattern` into `host`, collected.
    ///
    /// Only suitable for small inputs.
    fn enumerate(&self, host: &BitMatrix, pattern: &BitMatrix) -> Vec<BitMatrix> {
        let mut found = Vec::new();
        self.search(host, pattern, &|_, _| true, &mut |m| {
            found.push(m.clone());
            ControlFlow::Continue(())
        });
        found
    }
}

/// Depth-first backtracking search with degree-based candidate filtering.
///
/// Pattern nodes are assigned in index order; host candidates are tried in
/// ascending index order, so embeddings come out lexicographically ordered by
/// assignment.
#[derive(Debug, Clone, Copy, Default)]
pub struct BacktrackingOracle;

impl SubgraphOracle for BacktrackingOracle {
    fn search(
        &self,
        host: &BitMatrix,
        pattern: &BitMatrix,
        compatible: &dyn Fn(usize, usize) -> bool,
        visit: &mut dyn FnMut(&BitMatrix) -> ControlFlow<()>,
    ) {
        let p = pattern.rows();
        let h = host.rows();
        if p > h {
            return;
        }

        let host_out = out_degrees(host);
        let host_in = out_degrees(&host.transpose());
        let pattern_out = out_degrees(pattern);
        let pattern_in = out_degrees(&pattern.transpose());

        // A host node can only take a pattern node whose degrees it covers
        let candidates: Vec<Vec<usize>> = (0..p)
            .map(|i| {
                (0..h)
                    .filter(|&j| host_out[j] >= pattern_out[i] && host_in[j] >= pattern_in[i])
                    .filter(|&j| !pattern.get(i, i) || host.get(j, j))
                    .filter(|&j| compatible(i, j))
                    .collect()
            })
            .collect();

        if candidates.iter().any(|c| c.is_empty()) {
            return;
        }

        let mut search = Search {
            host,
            pattern,
            candidates,
            assignment: Vec::with_capacity(p),
            used: vec![false; h],
        };
        let _ = search.extend(visit);
    }
}

fn out_degrees(m: &BitMatrix) -> Vec<usize> {
    (0..m.rows()).map(|r| m.row_ones(r).count()).collect()
}

struct Search<'a> {
    host: &'a BitMatrix,
    pattern: &'a BitMatrix,
    candidates: Vec<Vec<usize>>,
    /// `assignment[i]` is the host index of pattern node `i`.
    assignment: Vec<usize>,
    used: Vec<bool>,
}

impl Search<'_> {
    fn extend(&mut self, visit: &mut dyn FnMut(&BitMatrix) -> ControlFlow<()>) -> ControlFlow<()> {
        let depth = self.assignment.len();
        if depth == self.pattern.rows() {
            let mut m = BitMatrix::new(self.pattern.rows(), self.host.rows());
            for (i, &j) in self.assignment.iter().enumerate() {
                m.set(i, j, true);
            }
            return visit(&m);
        }

        for idx in 0..self.candidates[depth].len() {
            let j = self.candidates[depth][idx];
            if self.used[j] || !self.consistent(depth, j) {
                continue;
            }

            self.assignment.push(j);
            self.used[j] = true;

            let flow = self.extend(visit);

            // Backtrack
            self.used[j] = false;
            self.assignment.pop();

            if flow.is_break() {
                return flow;
            }
        }
        ControlFlow::Continue(())
    }

    /// Every pattern edge between `i` and an already-assigned node must exist
    /// between their images.
    fn consistent(&self, i: usize, j: usize) -> bool {
        self.assignment.iter().enumerate().all(|(k, &m)| {
            (!self.pattern.get(i, k) || self.host.get(j, m))
                && (!self.pattern.get(k, i) || self.host.get(m, j))
        })
    }
}
