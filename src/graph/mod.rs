//! Adjacency-matrix backed graph store.
//!
//! A [`Graph`] holds node records in a dense arena (stable index per node),
//! the edge list it was built from, and a boolean adjacency matrix indexed by
//! arena position. The same type holds host graphs (no actions) and rule
//! graphs (every element action-tagged).
//!
//! Edges are append-only. Removal is only ever expressed by building a new
//! graph from a filtered edge list.

pub mod matching;
pub mod pattern;
pub mod render;

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::types::{BitMatrix, Domain, Edge, Node, NodeId};

pub use matching::Match;

/// Error type for graph construction and lookup.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GraphError {
    /// Node id not registered in this graph.
    #[error("Node not registered in graph: {0}")]
    UnknownNode(NodeId),
    /// A fresh node reuses an id already registered in this graph.
    #[error("Node id already in use: {0}")]
    DuplicateNode(NodeId),
    /// Default flag set on a node outside the correspondence domain.
    #[error("Default flag on non-correspondence node: {0}")]
    DefaultOnNonCorrespondence(NodeId),
}

/// Directed graph with a dense node index and a boolean adjacency relation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(try_from = "GraphParts", into = "GraphParts")]
pub struct Graph {
    name: Option<String>,
    /// Node records in index order.
    nodes: Vec<Node>,
    /// NodeId -> dense index.
    index: BTreeMap<NodeId, usize>,
    /// `adjacency[i][j]` iff some edge runs from index `i` to index `j`.
    adjacency: BitMatrix,
    /// Every edge in insertion order, duplicates included.
    edges: Vec<Edge>,
}

/// Serialized form of a [`Graph`].
#[derive(Debug, Clone, Serialize, Deserialize)]
struct GraphParts {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    nodes: Vec<Node>,
    edges: Vec<Edge>,
}

impl TryFrom<GraphParts> for Graph {
    type Error = GraphError;

    fn try_from(parts: GraphParts) -> Result<Self, Self::Error> {
        let mut graph = Graph::from_parts(parts.nodes, parts.edges)?;
        graph.name = parts.name;
        Ok(graph)
    }
}

impl From<Graph> for GraphParts {
    fn from(graph: Graph) -> Self {
        Self {
            name: graph.name,
            nodes: graph.nodes,
            edges: graph.edges,
        }
    }
}

impl Graph {
    /// Create an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Same graph under a new diagnostic name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Build a graph from node records and an edge list.
    ///
    /// Edge endpoints are registered in first-sight order, then any node not
    /// used by an edge is added as an isolated node in the order given.
    /// Every endpoint must have a record in `nodes`.
    pub fn from_parts(nodes: Vec<Node>, edges: Vec<Edge>) -> Result<Self, GraphError> {
        let mut records: BTreeMap<NodeId, Node> = BTreeMap::new();
        let mut order = Vec::with_capacity(nodes.len());
        for node in nodes {
            if !records.contains_key(&node.id) {
                order.push(node.id);
                records.insert(node.id, node);
            }
        }

        let mut graph = Self::new();
        for edge in &edges {
            for id in [edge.from, edge.to] {
                if !graph.contains(id) {
                    let node = records.get(&id).ok_or(GraphError::UnknownNode(id))?;
                    graph.add_node(node.clone())?;
                }
            }
        }
        for id in order {
            if !graph.contains(id) {
                graph.add_node(records[&id].clone())?;
            }
        }
        for edge in edges {
            graph.add_edge(edge)?;
        }
        Ok(graph)
    }

    /// Build a sub-graph of `self` from some of its own edges.
    ///
    /// Endpoints come from `self`, so registration cannot fail.
    fn subgraph(&self, edges: Vec<Edge>, name: Option<String>) -> Self {
        let mut graph = Self {
            name,
            ..Self::default()
        };
        for edge in edges {
            for id in [edge.from, edge.to] {
                if !graph.contains(id) {
                    graph.register(self.record(id).clone());
                }
            }
            graph.push_edge(edge);
        }
        graph
    }

    /// Diagnostic name, if any.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Node records in index order.
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Edge list in insertion order.
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// The adjacency matrix.
    pub fn adjacency(&self) -> &BitMatrix {
        &self.adjacency
    }

    /// Number of nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of edges, duplicates included.
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Whether the graph has no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Whether a node is registered.
    pub fn contains(&self, id: NodeId) -> bool {
        self.index.contains_key(&id)
    }

    /// Dense index of a node.
    pub fn index_of(&self, id: NodeId) -> Option<usize> {
        self.index.get(&id).copied()
    }

    /// Node record by id, if registered.
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.index.get(&id).map(|&i| &self.nodes[i])
    }

    /// Node record by id; an unregistered id is an error.
    pub fn node(&self, id: NodeId) -> Result<&Node, GraphError> {
        self.get(id).ok_or(GraphError::UnknownNode(id))
    }

    /// Node record by id for ids known to be registered.
    fn record(&self, id: NodeId) -> &Node {
        &self.nodes[self.index[&id]]
    }

    /// Nodes of one domain, in index order.
    pub fn nodes_in(&self, domain: Domain) -> impl Iterator<Item = &Node> + '_ {
        self.nodes.iter().filter(move |n| n.domain == domain)
    }

    /// Register a node.
    ///
    /// Idempotent by identity: adding an already registered id is a no-op.
    /// Grows the adjacency matrix by one zero row and column.
    pub fn add_node(&mut self, node: Node) -> Result<(), GraphError> {
        if node.is_default && !node.is_correspondence() {
            return Err(GraphError::DefaultOnNonCorrespondence(node.id));
        }
        if !self.contains(node.id) {
            self.register(node);
        }
        Ok(())
    }

    fn register(&mut self, node: Node) {
        self.index.insert(node.id, self.nodes.len());
        self.nodes.push(node);
        self.adjacency.grow();
    }

    /// Append an edge.
    ///
    /// Both endpoints must already be registered.
    pub fn add_edge(&mut self, edge: Edge) -> Result<(), GraphError> {
        for id in [edge.from, edge.to] {
            if !self.contains(id) {
                return Err(GraphError::UnknownNode(id));
            }
        }
        self.push_edge(edge);
        Ok(())
    }

    fn push_edge(&mut self, edge: Edge) {
        let (i, j) = (self.index[&edge.from], self.index[&edge.to]);
        self.adjacency.set(i, j, true);
        self.edges.push(edge);
    }

    /// Nodes reachable over one outgoing edge, in index order.
    pub fn successors(&self, id: NodeId) -> Result<Vec<&Node>, GraphError> {
        let i = self.index_of(id).ok_or(GraphError::UnknownNode(id))?;
        Ok(self.adjacency.row_ones(i).map(|j| &self.nodes[j]).collect())
    }

    /// Nodes with an edge into `id`, in index order.
    pub fn predecessors(&self, id: NodeId) -> Result<Vec<&Node>, GraphError> {
        if !self.contains(id) {
            return Err(GraphError::UnknownNode(id));
        }
        let tails: BTreeSet<usize> = self
            .edges
            .iter()
            .filter(|e| e.to == id)
            .map(|e| self.index[&e.from])
            .collect();
        Ok(tails.into_iter().map(|i| &self.nodes[i]).collect())
    }

    /// Same nodes, every edge flipped.
    pub fn reverse(&self) -> Self {
        let mut graph = Self {
            name: self.name.clone(),
            ..Self::default()
        };
        for node in &self.nodes {
            graph.register(node.clone());
        }
        for edge in &self.edges {
            graph.push_edge(edge.reversed());
        }
        graph
    }

    /// Correspondence nodes linking exactly `nodes` within `domain`.
    ///
    /// A correspondence node qualifies when the set of its successors in
    /// `domain` equals the set of given nodes in `domain`. Nodes of other
    /// domains are ignored on both sides.
    pub fn correspondence_nodes_to<'a>(
        &self,
        nodes: impl IntoIterator<Item = &'a Node>,
        domain: Domain,
    ) -> Vec<&Node> {
        let wanted: BTreeSet<NodeId> = nodes
            .into_iter()
            .filter(|n| n.domain == domain)
            .map(|n| n.id)
            .collect();

        self.nodes_in(Domain::Correspondence)
            .filter(|c| {
                let i = self.index[&c.id];
                let linked: BTreeSet<NodeId> = self
                    .adjacency
                    .row_ones(i)
                    .map(|j| &self.nodes[j])
                    .filter(|n| n.domain == domain)
                    .map(|n| n.id)
                    .collect();
                linked == wanted
            })
            .collect()
    }

    /// Nodes of one domain and the edges between them.
    pub fn project(&self, domain: Domain) -> Self {
        let edges = self
            .edges
            .iter()
            .filter(|e| self.record(e.from).domain == domain && self.record(e.to).domain == domain)
            .cloned()
            .collect();
        let mut graph = self.subgraph(edges, self.name.clone());
        for node in self.nodes_in(domain) {
            if !graph.contains(node.id) {
                graph.register(node.clone());
            }
        }
        graph
    }

    /// Identifier-independent structural fingerprint.
    ///
    /// See [`crate::canonical::structure_hash`].
    pub fn structure_hash(&self) -> String {
        crate::canonical::structure_hash(self)
    }
}

/// Incremental builder for graphs from node records.
///
/// Nodes are registered the first time they appear, either through
/// [`GraphBuilder::node`] or as an edge endpoint.
#[derive(Debug, Clone, Default)]
pub struct GraphBuilder {
    name: Option<String>,
    nodes: Vec<Node>,
    edges: Vec<Edge>,
}

impl GraphBuilder {
    /// Create an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the diagnostic name.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Add a node, isolated unless an edge later uses it.
    pub fn node(mut self, node: &Node) -> Self {
        self.nodes.push(node.clone());
        self
    }

    /// Add an untyped edge.
    pub fn edge(mut self, from: &Node, to: &Node) -> Self {
        self.nodes.push(from.clone());
        self.nodes.push(to.clone());
        self.edges.push(Edge::new(from.id, to.id));
        self
    }

    /// Add a typed edge.
    pub fn typed_edge(mut self, from: &Node, to: &Node, edge_type: impl Into<String>) -> Self {
        self.nodes.push(from.clone());
        self.nodes.push(to.clone());
        self.edges.push(Edge::typed(from.id, to.id, edge_type));
        self
    }

    /// Build the graph.
    pub fn build(self) -> Result<Graph, GraphError> {
        let graph = Graph::from_parts(self.nodes, self.edges)?;
        Ok(match self.name {
            Some(name) => graph.with_name(name),
            None => graph,
        })
    }
}
