//! Transformation rules.
//!
//! A rule is a graph in which every node and edge carries an [`Action`]:
//! Preserve elements must already exist in the host, Create elements are
//! instantiated when the rule fires. Rules are built once through a
//! [`RuleBuilder`] and never change afterwards.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

use crate::graph::{Graph, GraphError};
use crate::types::{Action, Domain, Edge, Node, NodeAllocator, NodeId};

/// Distinguishes builders so handles cannot cross between rules.
static NEXT_SCOPE: AtomicU64 = AtomicU64::new(0);

/// Error type for rule construction.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RuleError {
    /// A handle issued by a different builder was used.
    #[error("Handle {0} does not belong to rule '{1}'")]
    ForeignHandle(NodeId, String),
    /// A rule element without an action tag.
    #[error("Element of rule '{0}' has no action")]
    MissingAction(String),
    /// Underlying graph error.
    #[error("Graph error: {0}")]
    Graph(#[from] GraphError),
}

/// Opaque reference to a node inside one [`RuleBuilder`].
///
/// Only valid for the builder that issued it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RuleHandle {
    scope: u64,
    id: NodeId,
}

impl RuleHandle {
    /// Id of the rule node behind this handle.
    pub fn id(&self) -> NodeId {
        self.id
    }
}

/// Builder for [`Rule`]s.
///
/// Rule node ids come from the builder's own allocator and are only
/// meaningful inside the rule being built.
///
/// ```
/// use triple_graph::{Domain, RuleBuilder};
///
/// let mut rule = RuleBuilder::new("queue");
/// let source = rule.create("Queue", Domain::Source);
/// let target = rule.create("CfnQueue", Domain::Target);
/// let link = rule.create_default_correspondence("QueueAxiom");
/// rule.create_edge(link, source);
/// rule.create_edge(link, target);
/// let rule = rule.build().unwrap();
/// assert_eq!(rule.graph().node_count(), 3);
/// ```
#[derive(Debug)]
pub struct RuleBuilder {
    name: String,
    scope: u64,
    ids: NodeAllocator,
    nodes: Vec<Node>,
    edges: Vec<(RuleHandle, RuleHandle, Option<String>, Action)>,
}

impl RuleBuilder {
    /// Start a new rule.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            scope: NEXT_SCOPE.fetch_add(1, Ordering::Relaxed),
            ids: NodeAllocator::new(),
            nodes: Vec::new(),
            edges: Vec::new(),
        }
    }

    fn add(&mut self, node_type: &str, domain: Domain, action: Action, is_default: bool) -> RuleHandle {
        let node = self.ids.rule_node(node_type, domain, action, is_default);
        let handle = RuleHandle {
            scope: self.scope,
            id: node.id,
        };
        self.nodes.push(node);
        handle
    }

    /// Add a node that must already exist in the host.
    pub fn preserve(&mut self, node_type: &str, domain: Domain) -> RuleHandle {
        self.add(node_type, domain, Action::Preserve, false)
    }

    /// Add a node instantiated on firing.
    pub fn create(&mut self, node_type: &str, domain: Domain) -> RuleHandle {
        self.add(node_type, domain, Action::Create, false)
    }

    /// Add a default (one source, one target) correspondence node instantiated on firing.
    pub fn create_default_correspondence(&mut self, node_type: &str) -> RuleHandle {
        self.add(node_type, Domain::Correspondence, Action::Create, true)
    }

    /// Add a default correspondence node that must already exist.
    pub fn preserve_default_correspondence(&mut self, node_type: &str) -> RuleHandle {
        self.add(node_type, Domain::Correspondence, Action::Preserve, true)
    }

    /// Add an untyped Preserve edge.
    pub fn preserve_edge(&mut self, from: RuleHandle, to: RuleHandle) -> &mut Self {
        self.edges.push((from, to, None, Action::Preserve));
        self
    }

    /// Add a typed Preserve edge.
    pub fn preserve_typed_edge(&mut self, from: RuleHandle, to: RuleHandle, edge_type: &str) -> &mut Self {
        self.edges.push((from, to, Some(edge_type.to_string()), Action::Preserve));
        self
    }

    /// Add an untyped Create edge.
    pub fn create_edge(&mut self, from: RuleHandle, to: RuleHandle) -> &mut Self {
        self.edges.push((from, to, None, Action::Create));
        self
    }

    /// Add a typed Create edge.
    pub fn create_typed_edge(&mut self, from: RuleHandle, to: RuleHandle, edge_type: &str) -> &mut Self {
        self.edges.push((from, to, Some(edge_type.to_string()), Action::Create));
        self
    }

    fn check(&self, handle: RuleHandle) -> Result<NodeId, RuleError> {
        if handle.scope != self.scope {
            return Err(RuleError::ForeignHandle(handle.id, self.name.clone()));
        }
        Ok(handle.id)
    }

    /// Finish the rule.
    pub fn build(self) -> Result<Rule, RuleError> {
        let mut edges = Vec::with_capacity(self.edges.len());
        for (from, to, edge_type, action) in &self.edges {
            let (from, to) = (self.check(*from)?, self.check(*to)?);
            let edge = match edge_type {
                Some(t) => Edge::typed(from, to, t.as_str()),
                None => Edge::new(from, to),
            };
            edges.push(edge.with_action(*action));
        }
        let graph = Graph::from_parts(self.nodes, edges)?;
        Rule::from_graph(self.name, graph)
    }
}

/// An immutable, fully action-tagged rule graph.
#[derive(Debug, Clone, Serialize)]
pub struct Rule {
    name: String,
    graph: Graph,
}

impl Rule {
    /// Wrap an existing graph as a rule.
    ///
    /// Every node and edge must carry an action.
    pub fn from_graph(name: impl Into<String>, graph: Graph) -> Result<Self, RuleError> {
        let name = name.into();
        let untagged = graph.nodes().iter().any(|n| n.action.is_none())
            || graph.edges().iter().any(|e| e.action.is_none());
        if untagged {
            return Err(RuleError::MissingAction(name));
        }

        let graph = match graph.name() {
            Some(_) => graph,
            None => graph.with_name(name.clone()),
        };
        Ok(Self { name, graph })
    }

    /// Rule that creates one source node, one target node and a default
    /// correspondence between them.
    pub fn axiom(
        name: impl Into<String>,
        source_type: &str,
        target_type: &str,
        correspondence_type: &str,
    ) -> Result<Self, RuleError> {
        let mut rule = RuleBuilder::new(name);
        let source = rule.create(source_type, Domain::Source);
        let target = rule.create(target_type, Domain::Target);
        let link = rule.create_default_correspondence(correspondence_type);
        rule.create_edge(link, source);
        rule.create_edge(link, target);
        rule.build()
    }

    /// Rule name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The rule graph.
    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    /// Whether firing can add anything to a host.
    pub fn has_creation(&self) -> bool {
        self.graph.has_creation()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_axiom_shape() {
        let rule = Rule::axiom("queue", "Queue", "CfnQueue", "QueueAxiom").unwrap();
        let graph = rule.graph();

        assert_eq!(rule.name(), "queue");
        assert_eq!(graph.name(), Some("queue"));
        assert_eq!(graph.node_count(), 3);
        assert_eq!(graph.edge_count(), 2);
        assert!(graph.nodes().iter().all(|n| n.has_action(Action::Create)));

        let link = graph.nodes_in(Domain::Correspondence).next().unwrap();
        assert!(link.is_default);
    }

    #[test]
    fn test_rule_ids_are_local() {
        let a = Rule::axiom("a", "A", "CfnA", "AAxiom").unwrap();
        let b = Rule::axiom("b", "B", "CfnB", "BAxiom").unwrap();

        let ids_a: Vec<_> = a.graph().nodes().iter().map(|n| n.id).collect();
        let ids_b: Vec<_> = b.graph().nodes().iter().map(|n| n.id).collect();
        assert_eq!(ids_a, ids_b);
    }

    #[test]
    fn test_foreign_handle_rejected() {
        let mut first = RuleBuilder::new("first");
        let foreign = first.create("Queue", Domain::Source);

        let mut second = RuleBuilder::new("second");
        let local = second.create("CfnQueue", Domain::Target);
        second.create_edge(local, foreign);

        let err = second.build().unwrap_err();
        assert_eq!(err, RuleError::ForeignHandle(foreign.id(), "second".to_string()));
    }

    #[test]
    fn test_untagged_graph_rejected() {
        let mut ids = NodeAllocator::new();
        let mut graph = Graph::new();
        graph.add_node(ids.node("Queue", Domain::Source)).unwrap();

        let err = Rule::from_graph("bare", graph).unwrap_err();
        assert_eq!(err, RuleError::MissingAction("bare".to_string()));
    }

    #[test]
    fn test_isolated_rule_nodes_kept() {
        let mut rule = RuleBuilder::new("lonely");
        rule.preserve("Queue", Domain::Source);
        rule.create("Alarm", Domain::Target);
        let rule = rule.build().unwrap();

        assert_eq!(rule.graph().node_count(), 2);
        assert_eq!(rule.graph().edge_count(), 0);
    }
}
