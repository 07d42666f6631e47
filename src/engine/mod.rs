//! Fixed-point rule engine.
//!
//! ## Algorithm
//!
//! 1. Scan rules in declaration order, asking the host for a match of each
//! 2. The first rule with a match fires: its Create nodes that are not already
//!    matched are instantiated with fresh ids, then its Create edges are added
//! 3. After a firing the scan restarts from the first rule, so later rules
//!    see everything earlier firings produced
//! 4. When a full scan fires nothing, prune the host and return the result
//!
//! At most one rule fires per pass. Termination depends on the rule set:
//! a rule set that keeps producing fresh matches never reaches a fixed point,
//! and the engine does not try to detect that.
//!
//! The host is mutated in place while it is being matched against, so a host
//! graph must not be shared between concurrent translations.

pub mod prune;

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::{debug, info};

use crate::graph::{Graph, GraphError, Match};
use crate::isomorphism::{BacktrackingOracle, SubgraphOracle};
use crate::policy::TranslationPolicy;
use crate::rule::Rule;
use crate::types::{Domain, Edge, NodeAllocator, NodeId};

pub use prune::prune;

/// Error type for engine operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    /// A default correspondence node without exactly one source and one target.
    #[error("Default correspondence {node} links {sources} source and {targets} target nodes")]
    DefaultCorrespondenceArity {
        /// The offending correspondence node.
        node: NodeId,
        /// Number of source successors.
        sources: usize,
        /// Number of target successors.
        targets: usize,
    },
    /// Underlying graph error.
    #[error("Graph error: {0}")]
    Graph(#[from] GraphError),
}

/// Outcome of a translation.
#[derive(Debug, Clone, Serialize)]
pub struct Translation {
    /// Reading direction.
    pub from: Domain,
    /// Writing direction.
    pub to: Domain,
    /// The derived graph.
    pub graph: Graph,
    /// Number of scans over the rule set, the final empty one included.
    pub passes: usize,
    /// Firings per rule name.
    pub firings: BTreeMap<String, usize>,
    /// Hash of the policy used.
    pub policy_hash: String,
}

impl Translation {
    /// Total number of firings.
    pub fn total_firings(&self) -> usize {
        self.firings.values().sum()
    }

    /// Take the derived graph.
    pub fn into_graph(self) -> Graph {
        self.graph
    }
}

/// What one firing added to the host.
#[derive(Debug, Default)]
struct Firing {
    nodes: usize,
    edges: usize,
}

impl Firing {
    fn is_empty(&self) -> bool {
        self.nodes == 0 && self.edges == 0
    }
}

/// Rule engine over an ordered rule set.
pub struct Engine<O: SubgraphOracle = BacktrackingOracle> {
    rules: Vec<Rule>,
    policy: TranslationPolicy,
    oracle: O,
}

impl Engine {
    /// Create an engine with the default policy and oracle.
    pub fn new(rules: Vec<Rule>) -> Self {
        Self::with_policy(rules, TranslationPolicy::default())
    }

    /// Create an engine with a custom policy.
    pub fn with_policy(rules: Vec<Rule>, policy: TranslationPolicy) -> Self {
        Self::with_oracle(rules, policy, BacktrackingOracle)
    }
}

impl<O: SubgraphOracle> Engine<O> {
    /// Create an engine with a custom subgraph oracle.
    pub fn with_oracle(rules: Vec<Rule>, policy: TranslationPolicy, oracle: O) -> Self {
        Self { rules, policy, oracle }
    }

    /// The rules, in firing priority order.
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Get the policy.
    pub fn policy(&self) -> &TranslationPolicy {
        &self.policy
    }

    /// Derive the Target side from the Source side.
    pub fn translate_forward(
        &self,
        host: &mut Graph,
        ids: &mut NodeAllocator,
    ) -> Result<Translation, EngineError> {
        self.translate(host, Domain::Source, Domain::Target, ids)
    }

    /// Derive the Source side from the Target side.
    pub fn translate_backward(
        &self,
        host: &mut Graph,
        ids: &mut NodeAllocator,
    ) -> Result<Translation, EngineError> {
        self.translate(host, Domain::Target, Domain::Source, ids)
    }

    /// Fire rules read from `from` until none applies, then prune towards `to`.
    ///
    /// `ids` must be the allocator the host's nodes came from. An allocator
    /// that hands out an id the host already holds fails the firing with
    /// [`GraphError::DuplicateNode`] before it touches the host; earlier
    /// firings stay applied.
    pub fn translate(
        &self,
        host: &mut Graph,
        from: Domain,
        to: Domain,
        ids: &mut NodeAllocator,
    ) -> Result<Translation, EngineError> {
        let mut passes = 0;
        let mut firings: BTreeMap<String, usize> = BTreeMap::new();

        loop {
            passes += 1;
            let mut fired = false;

            for rule in &self.rules {
                if !rule.has_creation() {
                    continue;
                }
                let found = host.find_match_with(rule.graph(), from, &self.oracle);
                if found.is_empty() {
                    continue;
                }

                let firing = fire(rule, found, from, host, ids)?;
                if firing.is_empty() {
                    continue;
                }

                debug!(
                    rule = rule.name(),
                    pass = passes,
                    nodes = firing.nodes,
                    edges = firing.edges,
                    "Rule fired"
                );
                *firings.entry(rule.name().to_string()).or_default() += 1;
                fired = true;
                break;
            }

            if !fired {
                break;
            }
        }

        let graph = if self.policy.prune {
            prune(host, to)?
        } else {
            host.clone()
        };

        let translation = Translation {
            from,
            to,
            graph,
            passes,
            firings,
            policy_hash: self.policy.params_hash(),
        };

        info!(
            policy = self.policy.policy_id(),
            from = %from,
            to = %to,
            passes = translation.passes,
            firings = translation.total_firings(),
            host_nodes = host.node_count(),
            output_nodes = translation.graph.node_count(),
            output_edges = translation.graph.edge_count(),
            "Translation reached fixed point"
        );

        Ok(translation)
    }
}

/// Instantiate `rule`'s creation set in `host` at `found`.
///
/// Create edges with both endpoints in the reading domain belong to the
/// matched context and are not appended again.
fn fire(
    rule: &Rule,
    mut found: Match,
    from: Domain,
    host: &mut Graph,
    ids: &mut NodeAllocator,
) -> Result<Firing, GraphError> {
    let pattern = rule.graph();
    let mut firing = Firing::default();

    // Allocate and check every fresh id before touching the host
    let mut fresh = Vec::new();
    for template in pattern.creation_nodes() {
        if found.contains(template.id) {
            continue;
        }
        let node = ids.instantiate(template);
        if host.contains(node.id) {
            return Err(GraphError::DuplicateNode(node.id));
        }
        found.insert(template.id, node.id);
        fresh.push(node);
    }
    for node in fresh {
        host.add_node(node)?;
        firing.nodes += 1;
    }

    let creator = pattern.creator();
    for edge in creator.edges() {
        let (tail, head) = (creator.node(edge.from)?, creator.node(edge.to)?);
        if tail.domain == from && head.domain == from {
            continue;
        }

        let from_id = found.get(edge.from).ok_or(GraphError::UnknownNode(edge.from))?;
        let to_id = found.get(edge.to).ok_or(GraphError::UnknownNode(edge.to))?;
        host.add_edge(Edge {
            from: from_id,
            to: to_id,
            edge_type: edge.edge_type.clone(),
            action: None,
        })?;
        firing.edges += 1;
    }

    Ok(firing)
}
