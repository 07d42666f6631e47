//! Canonical serialization for deterministic hashing.
//!
//! ## Determinism Guarantees
//!
//! - Stable field order: Struct fields serialize in declaration order
//! - Stable Vec order: Vectors serialize in index order
//! - No HashMap allowed: Use BTreeMap for maps in hashed data
//!
//! [`structure_hash`] additionally ignores node identities, so two graphs
//! built independently with the same labels and topology hash alike.

use serde::Serialize;
use xxhash_rust::xxh64::xxh64;

use crate::graph::Graph;
use crate::types::{Domain, Node};

/// Serialize a value to canonical JSON bytes for hashing.
pub fn to_canonical_bytes<T: Serialize>(value: &T) -> Vec<u8> {
    serde_json::to_vec(value).expect("Canonical serialization failed")
}

/// Compute canonical hash of a serializable value.
pub fn canonical_hash<T: Serialize>(value: &T) -> u64 {
    let bytes = to_canonical_bytes(value);
    xxh64(&bytes, 0)
}

/// Compute canonical hash and return as hex string.
pub fn canonical_hash_hex<T: Serialize>(value: &T) -> String {
    format!("{:016x}", canonical_hash(value))
}

/// Identity-free label of a node.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
struct NodeLabel<'a> {
    domain: Domain,
    node_type: &'a str,
    is_default: bool,
}

impl<'a> From<&'a Node> for NodeLabel<'a> {
    fn from(node: &'a Node) -> Self {
        Self {
            domain: node.domain,
            node_type: &node.node_type,
            is_default: node.is_default,
        }
    }
}

/// Sorted label multisets of a graph.
#[derive(Debug, Serialize)]
struct StructureSignature<'a> {
    nodes: Vec<NodeLabel<'a>>,
    edges: Vec<(NodeLabel<'a>, NodeLabel<'a>, Option<&'a str>)>,
}

/// Fingerprint of a graph's labelled structure, ignoring node ids.
///
/// Graphs that are isomorphic up to id renaming always share a fingerprint.
/// The converse does not hold; use [`Graph::is_isomorphic_to`] for an exact
/// check.
pub fn structure_hash(graph: &Graph) -> String {
    let mut nodes: Vec<NodeLabel> = graph.nodes().iter().map(NodeLabel::from).collect();
    nodes.sort();

    let mut edges: Vec<_> = graph
        .edges()
        .iter()
        .filter_map(|e| {
            let from = graph.get(e.from)?;
            let to = graph.get(e.to)?;
            Some((NodeLabel::from(from), NodeLabel::from(to), e.edge_type.as_deref()))
        })
        .collect();
    edges.sort();

    canonical_hash_hex(&StructureSignature { nodes, edges })
}
