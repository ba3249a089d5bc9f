use std::sync::Arc;

use gatekeeper_policy::{FailureClass, PolicyDocument};

use crate::encoder::{inner_product, Encoder};

/// One encoded policy example, ready for nearest-neighbor search.
struct IndexEntry {
    vector: Vec<f32>,
    failure_class: FailureClass,
    example_text: String,
}

/// An immutable snapshot of the embedded policy examples: a flat,
/// L2-normalized inner-product index plus the policy hash it was built
/// from (§3 `SemanticIndex`). Rebuilding produces a new `SemanticIndex`
/// rather than mutating this one — the same copy-on-write discipline as
/// [`gatekeeper_policy::PolicyDocument`].
pub struct SemanticIndex {
    policy_hash: String,
    entries: Vec<IndexEntry>,
}

impl SemanticIndex {
    pub fn build(policy: &PolicyDocument, encoder: &dyn Encoder) -> SemanticIndex {
        let entries = policy
            .all_examples()
            .map(|(class, text)| IndexEntry {
                vector: encoder.encode(text),
                failure_class: class,
                example_text: text.to_string(),
            })
            .collect();
        SemanticIndex { policy_hash: policy.policy_hash().to_string(), entries }
    }

    pub fn policy_hash(&self) -> &str {
        &self.policy_hash
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The k=1 nearest example *within `failure_class`* for `query`, or
    /// `0.0` if the class has no examples at all. Scores are raw inner
    /// products of unit vectors, i.e. cosine similarity in `[-1, 1]`.
    pub(crate) fn best_score_for_class(&self, query: &[f32], failure_class: FailureClass) -> f32 {
        self.entries
            .iter()
            .filter(|entry| entry.failure_class == failure_class)
            .map(|entry| inner_product(query, &entry.vector))
            .fold(0.0f32, f32::max)
    }

    /// The k nearest examples across every class, for operator debugging
    /// (§A.4, `get_nearest_examples`) — never consulted by
    /// `evaluate_response` itself.
    pub fn nearest(&self, query: &[f32], k: usize) -> Vec<(FailureClass, &str, f32)> {
        let mut scored: Vec<_> = self
            .entries
            .iter()
            .map(|entry| (entry.failure_class, entry.example_text.as_str(), inner_product(query, &entry.vector)))
            .collect();
        scored.sort_by(|a, b| b.2.partial_cmp(&a.2).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(k);
        scored
    }

    /// Index-internal introspection (§A.4 `get_statistics`): distinct
    /// from the Control Tower's tier-routing `Statistics` (C9).
    pub fn statistics(&self) -> IndexStatistics {
        let mut class_distribution: std::collections::HashMap<FailureClass, usize> = std::collections::HashMap::new();
        for entry in &self.entries {
            *class_distribution.entry(entry.failure_class).or_insert(0) += 1;
        }
        IndexStatistics {
            total_examples: self.entries.len(),
            num_classes: class_distribution.len(),
            class_distribution,
            policy_hash: self.policy_hash.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct IndexStatistics {
    pub total_examples: usize,
    pub num_classes: usize,
    pub class_distribution: std::collections::HashMap<FailureClass, usize>,
    pub policy_hash: String,
}

pub type SharedIndex = Arc<SemanticIndex>;
