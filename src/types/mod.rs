//! Core types for triple graphs.

pub mod node;
pub mod edge;
pub mod matrix;

pub use node::{NodeId, Node, Domain, Action, NodeAllocator};
pub use edge::Edge;
pub use matrix::BitMatrix;
