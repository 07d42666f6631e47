//! Translation policy.
//!
//! Controls what a translation returns once the rule set reaches its fixed
//! point. The policy is serializable so a run can be recorded alongside the
//! policy that produced it, and [`TranslationPolicy::params_hash`] gives a
//! stable identifier for that record.

use serde::{Deserialize, Serialize};

use crate::canonical::canonical_hash_hex;
use crate::DEFAULT_POLICY_VERSION;

/// Translation policy.
///
/// ## Parameters
///
/// - `version`: policy version identifier
/// - `prune`: return the pruned projection (`true`) or the whole host graph
///   after the fixed point (`false`, for diagnostics)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslationPolicy {
    /// Policy version identifier.
    pub version: String,
    /// Whether to prune the host graph after the fixed point.
    #[serde(default = "default_prune")]
    pub prune: bool,
}

fn default_prune() -> bool {
    true
}

impl TranslationPolicy {
    /// Create a policy.
    pub fn new(prune: bool) -> Self {
        Self {
            version: DEFAULT_POLICY_VERSION.to_string(),
            prune,
        }
    }

    /// Policy returning the whole host graph.
    pub fn unpruned() -> Self {
        Self::new(false)
    }

    /// Get the policy ID.
    pub fn policy_id(&self) -> &str {
        &self.version
    }

    /// Compute a hash of the policy parameters.
    pub fn params_hash(&self) -> String {
        canonical_hash_hex(self)
    }
}

impl Default for TranslationPolicy {
    fn default() -> Self {
        Self::new(true)
    }
}
