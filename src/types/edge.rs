//! Edge types for triple graphs.

use serde::{Deserialize, Serialize};
use super::node::{Action, NodeId};

/// Directed edge between two registered nodes.
///
/// Endpoints are node handles, not embedded node records, so cyclic and
/// cross-domain structure needs no shared ownership. There is no implicit
/// reverse edge.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Edge {
    /// Tail of the edge.
    pub from: NodeId,
    /// Head of the edge.
    pub to: NodeId,
    /// Optional type label.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub edge_type: Option<String>,
    /// Action tag (rule graphs only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<Action>,
}

impl Edge {
    /// Create an untyped host edge.
    pub fn new(from: NodeId, to: NodeId) -> Self {
        Self {
            from,
            to,
            edge_type: None,
            action: None,
        }
    }

    /// Create a typed host edge.
    pub fn typed(from: NodeId, to: NodeId, edge_type: impl Into<String>) -> Self {
        Self {
            edge_type: Some(edge_type.into()),
            ..Self::new(from, to)
        }
    }

    /// Set the action tag.
    pub fn with_action(mut self, action: Action) -> Self {
        self.action = Some(action);
        self
    }

    /// Same edge with its endpoints swapped.
    pub fn reversed(&self) -> Self {
        Self {
            from: self.to,
            to: self.from,
            ..self.clone()
        }
    }

    /// Whether this edge carries the given action.
    pub fn has_action(&self, action: Action) -> bool {
        self.action == Some(action)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reversed_keeps_labels() {
        let edge = Edge::typed(NodeId::new(1), NodeId::new(2), "Triggers")
            .with_action(Action::Preserve);
        let rev = edge.reversed();

        assert_eq!(rev.from, NodeId::new(2));
        assert_eq!(rev.to, NodeId::new(1));
        assert_eq!(rev.edge_type.as_deref(), Some("Triggers"));
        assert!(rev.has_action(Action::Preserve));
    }

    #[test]
    fn test_untyped_edge_serializes_bare() {
        let edge = Edge::new(NodeId::new(0), NodeId::new(1));
        let json = serde_json::to_string(&edge).unwrap();
        assert_eq!(json, r#"{"from":0,"to":1}"#);
    }
}
