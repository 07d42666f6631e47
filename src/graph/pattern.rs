//! Rule pattern extraction.
//!
//! A rule graph splits into the part that must already exist in the host
//! (its context, used as the search pattern) and the part it instantiates
//! when it fires.

use super::Graph;
use crate::types::{Action, Domain, Edge, Node};

impl Graph {
    /// The sub-graph a rule requires to exist before firing, read from `domain`.
    ///
    /// Contains every Preserve edge, then every edge with both endpoints in
    /// `domain`, then as isolated nodes every `domain` or Preserve node not
    /// already covered by those edges. Pure: the same rule always yields the
    /// same pattern, index for index.
    pub fn context(&self, domain: Domain) -> Graph {
        let in_domain = |e: &Edge| {
            self.record(e.from).domain == domain && self.record(e.to).domain == domain
        };

        let mut edges: Vec<Edge> = self
            .edges
            .iter()
            .filter(|e| e.has_action(Action::Preserve))
            .cloned()
            .collect();
        for edge in self.edges.iter().filter(|e| in_domain(e)) {
            if !edges.contains(edge) {
                edges.push(edge.clone());
            }
        }

        let mut graph = self.subgraph(edges, self.name.as_ref().map(|n| format!("{n}_context")));
        for node in &self.nodes {
            if graph.contains(node.id) {
                continue;
            }
            if node.domain == domain || node.has_action(Action::Preserve) {
                graph.register(node.clone());
            }
        }
        graph
    }

    /// The sub-graph of every Create edge.
    ///
    /// A Create node with no Create edge does not appear here; use
    /// [`Graph::creation_nodes`] to enumerate what a firing instantiates.
    pub fn creator(&self) -> Graph {
        let edges = self
            .edges
            .iter()
            .filter(|e| e.has_action(Action::Create))
            .cloned()
            .collect();
        self.subgraph(edges, self.name.as_ref().map(|n| format!("{n}_creator")))
    }

    /// Every Create node, standalone ones included, in index order.
    pub fn creation_nodes(&self) -> impl Iterator<Item = &Node> + '_ {
        self.nodes.iter().filter(|n| n.has_action(Action::Create))
    }

    /// Whether firing this rule can add anything to a host.
    pub fn has_creation(&self) -> bool {
        self.creation_nodes().next().is_some()
            || self.edges.iter().any(|e| e.has_action(Action::Create))
    }
}
