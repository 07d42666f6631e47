//! # triple-graph
//!
//! Bidirectional model transformation in the style of triple graph grammars.
//!
//! A host graph holds three interlinked domains: a Source model, a Target
//! model, and Correspondence nodes recording which Source elements produced
//! which Target elements. Declarative rules propagate structure from one side
//! to the other without ever re-deriving a correspondence that already exists.
//!
//! ## Core Contract
//!
//! 1. Rules are graphs whose elements are tagged Preserve (must exist) or
//!    Create (instantiated on firing)
//! 2. The engine fires rules against a host until none applies
//! 3. The host is then pruned to what confirmed correspondences support
//!
//! ## Architecture
//!
//! ```text
//! Rule ──context()──▶ pattern ──SubgraphOracle──▶ embeddings
//!                                                     │
//!                                label + duplicate filters
//!                                                     ▼
//! Host ◀──fire (creation set)──────────────────── Match
//!   │
//!   └──fixed point──▶ prune ──▶ Translation
//! ```
//!
//! ## Determinism Guarantees
//!
//! - Node ids come from an explicit [`NodeAllocator`]; a fresh allocator
//!   replays the same ids
//! - Rules are scanned in declaration order, and the default oracle
//!   enumerates embeddings in a fixed order
//! - Structurally identical hosts translate to structurally identical
//!   outputs, up to id renaming ([`Graph::structure_hash`])

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod types;
pub mod graph;
pub mod isomorphism;
pub mod rule;
pub mod engine;
pub mod policy;
pub mod canonical;

// Re-exports
pub use types::{NodeId, Node, Domain, Action, NodeAllocator, Edge, BitMatrix};
pub use graph::{Graph, GraphBuilder, GraphError, Match};
pub use isomorphism::{SubgraphOracle, BacktrackingOracle};
pub use rule::{Rule, RuleBuilder, RuleHandle, RuleError};
pub use engine::{Engine, EngineError, Translation, prune};
pub use policy::TranslationPolicy;
pub use canonical::{to_canonical_bytes, canonical_hash, canonical_hash_hex, structure_hash};

/// Default policy version identifier.
pub const DEFAULT_POLICY_VERSION: &str = "translation_policy_v1";
