//! Node types for triple graphs.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for a node.
///
/// Issued by a [`NodeAllocator`] and never reused. Implements `Ord` so that
/// id-keyed collections iterate deterministically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(u64);

impl NodeId {
    /// Create a node id from a raw value.
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Get the raw value.
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for NodeId {
    fn from(raw: u64) -> Self {
        Self(raw)
    }
}

/// Which of the three interlinked graphs a node belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Domain {
    /// The original model.
    Source,
    /// The derived model.
    Target,
    /// The trace linking source elements to the target elements they produced.
    Correspondence,
}

impl Domain {
    /// Category label used in diagnostic output.
    pub fn category(&self) -> &'static str {
        match self {
            Self::Source => "Source",
            Self::Target => "Target",
            Self::Correspondence => "Correspondence",
        }
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Source => write!(f, "source"),
            Self::Target => write!(f, "target"),
            Self::Correspondence => write!(f, "correspondence"),
        }
    }
}

/// Rule-local annotation on a node or edge.
///
/// Host graphs never carry actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    /// Must already exist in the host before the rule fires.
    Preserve,
    /// Instantiated in the host when the rule fires.
    Create,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Preserve => write!(f, "preserve"),
            Self::Create => write!(f, "create"),
        }
    }
}

/// An immutable, identity-keyed node record.
///
/// Nodes are never changed after construction; a graph refers to them by
/// [`NodeId`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Node {
    /// Unique node identifier.
    pub id: NodeId,
    /// Type label, matched by exact equality.
    #[serde(rename = "type")]
    pub node_type: String,
    /// Owning domain.
    pub domain: Domain,
    /// Action tag (rule graphs only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<Action>,
    /// Marks a 1:1 correspondence (correspondence nodes only).
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_default: bool,
}

impl Node {
    /// Whether this node carries the given action.
    pub fn has_action(&self, action: Action) -> bool {
        self.action == Some(action)
    }

    /// Whether this node is a correspondence node.
    pub fn is_correspondence(&self) -> bool {
        self.domain == Domain::Correspondence
    }

    /// Diagnostic name, `type_id`.
    pub fn label(&self) -> String {
        format!("{}_{}", self.node_type, self.id)
    }
}

/// Explicit source of node identities.
///
/// Every node construction goes through an allocator value owned by the
/// caller, so ids are monotonically increasing within one allocator and a
/// fresh allocator restarts at zero. Nodes that end up in the same graph must
/// come from the same allocator.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NodeAllocator {
    next: u64,
}

impl NodeAllocator {
    /// Create an allocator starting at id 0.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an allocator whose first id is `start`.
    pub fn starting_at(start: u64) -> Self {
        Self { next: start }
    }

    /// The id the next allocation will receive.
    pub fn peek(&self) -> NodeId {
        NodeId(self.next)
    }

    fn next_id(&mut self) -> NodeId {
        let id = NodeId(self.next);
        self.next += 1;
        id
    }

    /// Allocate a host node without an action.
    pub fn node(&mut self, node_type: impl Into<String>, domain: Domain) -> Node {
        Node {
            id: self.next_id(),
            node_type: node_type.into(),
            domain,
            action: None,
            is_default: false,
        }
    }

    /// Allocate a default (1:1) correspondence node.
    pub fn default_correspondence(&mut self, node_type: impl Into<String>) -> Node {
        Node {
            id: self.next_id(),
            node_type: node_type.into(),
            domain: Domain::Correspondence,
            action: None,
            is_default: true,
        }
    }

    /// Allocate a rule node carrying an action.
    pub(crate) fn rule_node(
        &mut self,
        node_type: impl Into<String>,
        domain: Domain,
        action: Action,
        is_default: bool,
    ) -> Node {
        Node {
            id: self.next_id(),
            node_type: node_type.into(),
            domain,
            action: Some(action),
            is_default,
        }
    }

    /// Allocate a host node modelled on a rule node.
    ///
    /// Type, domain and the default flag are copied; the action is dropped.
    pub fn instantiate(&mut self, template: &Node) -> Node {
        Node {
            id: self.next_id(),
            node_type: template.node_type.clone(),
            domain: template.domain,
            action: None,
            is_default: template.is_default && template.is_correspondence(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allocator_is_monotonic() {
        let mut ids = NodeAllocator::new();
        let a = ids.node("Queue", Domain::Source);
        let b = ids.node("Queue", Domain::Source);
        let c = ids.default_correspondence("QueueAxiom");

        assert!(a.id < b.id);
        assert!(b.id < c.id);
        assert_eq!(ids.peek(), NodeId::new(3));
    }

    #[test]
    fn test_fresh_allocator_restarts() {
        let mut first = NodeAllocator::new();
        first.node("A", Domain::Source);

        let mut second = NodeAllocator::new();
        assert_eq!(second.node("A", Domain::Source).id, NodeId::new(0));
    }

    #[test]
    fn test_instantiate_drops_action() {
        let mut ids = NodeAllocator::new();
        let template = ids.rule_node("QueueAxiom", Domain::Correspondence, Action::Create, true);
        let node = ids.instantiate(&template);

        assert_eq!(node.node_type, "QueueAxiom");
        assert_eq!(node.domain, Domain::Correspondence);
        assert!(node.is_default);
        assert_eq!(node.action, None);
        assert_ne!(node.id, template.id);
    }

    #[test]
    fn test_node_serde_omits_defaults() {
        let mut ids = NodeAllocator::new();
        let node = ids.node("Queue", Domain::Source);
        let json = serde_json::to_string(&node).unwrap();

        assert_eq!(json, r#"{"id":0,"type":"Queue","domain":"source"}"#);
    }
}
