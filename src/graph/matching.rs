//! Label-aware rule matching.
//!
//! ## Algorithm
//!
//! 1. Extract the rule's context for the reading domain
//! 2. Walk the oracle's structural embeddings of the context, pruned to
//!    candidates of equal type and domain
//! 3. Drop embeddings that pair nodes of different type or domain
//! 4. Drop embeddings whose firing would recreate an existing correspondence
//! 5. Stop at the first survivor, or return an empty match
//!
//! Which of several valid embeddings is returned depends only on the oracle's
//! search order, which the default oracle keeps deterministic. Callers
//! must not rely on any particular choice among equally valid matches.

use std::collections::{BTreeMap, BTreeSet};
use std::ops::ControlFlow;

use serde::{Deserialize, Serialize};
use tracing::trace;

use super::Graph;
use crate::isomorphism::{BacktrackingOracle, SubgraphOracle};
use crate::types::{Action, BitMatrix, Domain, Node, NodeId};

/// Mapping from rule nodes to host nodes.
///
/// An empty match means "no match" and is ordinary control flow.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Match {
    pairs: BTreeMap<NodeId, NodeId>,
}

impl Match {
    /// Create an empty match.
    pub fn new() -> Self {
        Self::default()
    }

    /// Host node bound to a rule node.
    pub fn get(&self, rule_node: NodeId) -> Option<NodeId> {
        self.pairs.get(&rule_node).copied()
    }

    /// Whether a rule node is bound.
    pub fn contains(&self, rule_node: NodeId) -> bool {
        self.pairs.contains_key(&rule_node)
    }

    /// Bind a rule node to a host node.
    pub fn insert(&mut self, rule_node: NodeId, host_node: NodeId) {
        self.pairs.insert(rule_node, host_node);
    }

    /// Number of bound rule nodes.
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// Whether nothing is bound.
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// `(rule node, host node)` pairs ordered by rule node.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, NodeId)> + '_ {
        self.pairs.iter().map(|(&r, &h)| (r, h))
    }

    /// Distinct host nodes in the image.
    pub fn image(&self) -> BTreeSet<NodeId> {
        self.pairs.values().copied().collect()
    }
}

impl Graph {
    /// Find a match of `rule`'s context read from `domain`.
    ///
    /// Uses the default [`BacktrackingOracle`].
    pub fn find_match(&self, rule: &Graph, domain: Domain) -> Match {
        self.find_match_with(rule, domain, &BacktrackingOracle)
    }

    /// Find a match of `rule`'s context read from `domain` with a given oracle.
    pub fn find_match_with<O: SubgraphOracle + ?Sized>(
        &self,
        rule: &Graph,
        domain: Domain,
        oracle: &O,
    ) -> Match {
        let pattern = rule.context(domain);

        let created: BTreeSet<&str> = rule
            .nodes_in(Domain::Correspondence)
            .filter(|n| n.has_action(Action::Create))
            .map(|n| n.node_type.as_str())
            .collect();

        let compatible = |i: usize, j: usize| {
            let (p, h) = (&pattern.nodes[i], &self.nodes[j]);
            p.node_type == h.node_type && p.domain == h.domain
        };

        let mut found = Match::default();
        oracle.search(&self.adjacency, &pattern.adjacency, &compatible, &mut |assignment| {
            if !self.labels_match(&pattern, assignment) {
                return ControlFlow::Continue(());
            }

            let candidate = self.to_match(&pattern, assignment);
            if self.would_duplicate(&created, &candidate, domain) {
                trace!(
                    rule = rule.name().unwrap_or("<unnamed>"),
                    image = ?candidate.image(),
                    "Skipping match that would duplicate a correspondence"
                );
                return ControlFlow::Continue(());
            }
            found = candidate;
            ControlFlow::Break(())
        });
        found
    }

    /// Every pairing in `assignment` joins nodes of equal type and domain.
    fn labels_match(&self, pattern: &Graph, assignment: &BitMatrix) -> bool {
        assignment.ones().all(|(i, j)| {
            let (p, h) = (&pattern.nodes[i], &self.nodes[j]);
            p.node_type == h.node_type && p.domain == h.domain
        })
    }

    fn to_match(&self, pattern: &Graph, assignment: &BitMatrix) -> Match {
        let mut result = Match::new();
        for (i, j) in assignment.ones() {
            result.insert(pattern.nodes[i].id, self.nodes[j].id);
        }
        result
    }

    /// Whether firing at `candidate` would recreate every correspondence type
    /// the rule creates over the same `domain` nodes.
    fn would_duplicate(&self, created: &BTreeSet<&str>, candidate: &Match, domain: Domain) -> bool {
        if created.is_empty() {
            return false;
        }
        let image: Vec<&Node> = candidate.image().into_iter().map(|id| self.record(id)).collect();
        let existing: BTreeSet<&str> = self
            .correspondence_nodes_to(image, domain)
            .into_iter()
            .map(|n| n.node_type.as_str())
            .collect();
        created.is_subset(&existing)
    }

    /// Whether `other` equals this graph up to a renaming of node ids.
    ///
    /// Node type, domain and default flag must be preserved, as must the
    /// multiset of typed edges. Actions are ignored.
    pub fn is_isomorphic_to(&self, other: &Graph) -> bool {
        self.is_isomorphic_with(other, &BacktrackingOracle)
    }

    /// [`Graph::is_isomorphic_to`] with a given oracle.
    pub fn is_isomorphic_with<O: SubgraphOracle + ?Sized>(&self, other: &Graph, oracle: &O) -> bool {
        if self.node_count() != other.node_count()
            || self.edge_count() != other.edge_count()
            || self.adjacency.count_ones() != other.adjacency.count_ones()
        {
            return false;
        }

        let mut ours: Vec<(usize, usize, Option<&str>)> = self
            .edges
            .iter()
            .map(|e| (self.index[&e.from], self.index[&e.to], e.edge_type.as_deref()))
            .collect();
        ours.sort();

        let compatible = |i: usize, j: usize| {
            let (a, b) = (&other.nodes[i], &self.nodes[j]);
            a.node_type == b.node_type && a.domain == b.domain && a.is_default == b.is_default
        };

        let mut isomorphic = false;
        oracle.search(&self.adjacency, &other.adjacency, &compatible, &mut |assignment| {
            let same_labels = assignment.ones().all(|(i, j)| compatible(i, j));
            if !same_labels {
                return ControlFlow::Continue(());
            }

            let image: BTreeMap<usize, usize> = assignment.ones().collect();
            let mut theirs: Vec<(usize, usize, Option<&str>)> = other
                .edges
                .iter()
                .map(|e| {
                    (
                        image[&other.index[&e.from]],
                        image[&other.index[&e.to]],
                        e.edge_type.as_deref(),
                    )
                })
                .collect();
            theirs.sort();
            if theirs == ours {
                isomorphic = true;
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            }
        });
        isomorphic
    }
}
