use crate::taxonomy::{EnforcementAction, FailureClass, SeverityLevel};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Enforcement metadata for one [`FailureClass`], as parsed from the policy
/// document's `failure_policies.<class>` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicyEntry {
    pub action: EnforcementAction,
    pub severity: SeverityLevel,
    #[serde(default)]
    pub confidence_threshold: f64,
    #[serde(default)]
    pub message_template: String,
    #[serde(default)]
    pub examples: Vec<String>,
}

/// The raw shape of the YAML policy file, before validation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawPolicyFile {
    #[serde(default)]
    pub failure_policies: HashMap<String, PolicyEntry>,
}

/// A validated policy document, identified by the SHA-256 of the file
/// bytes it was parsed from.
///
/// Construction goes through [`crate::loader::PolicyLoader`], which runs
/// every check in [`crate::error::PolicyError`] before a `PolicyDocument`
/// ever exists — by the time callers hold one, it is known-good.
#[derive(Debug, Clone)]
pub struct PolicyDocument {
    pub(crate) hash: String,
    pub(crate) entries: HashMap<FailureClass, PolicyEntry>,
}

impl PolicyDocument {
    pub fn policy_hash(&self) -> &str {
        &self.hash
    }

    /// Looks up the entry for a class. Absent from the document simply
    /// means "no special handling configured" — callers fall back to a
    /// default action rather than treating this as an error.
    pub fn policy(&self, class: FailureClass) -> Option<&PolicyEntry> {
        self.entries.get(&class)
    }

    /// `true` iff `confidence` clears the configured threshold for `class`.
    /// A class with no entry never triggers enforcement.
    pub fn should_enforce(&self, class: FailureClass, confidence: f64) -> bool {
        self.entries
            .get(&class)
            .map(|entry| confidence >= entry.confidence_threshold)
            .unwrap_or(false)
    }

    /// All examples across every class, paired with their class — the
    /// shape the semantic index wants to build embeddings from.
    pub fn all_examples(&self) -> impl Iterator<Item = (FailureClass, &str)> {
        self.entries
            .iter()
            .flat_map(|(class, entry)| entry.examples.iter().map(move |e| (*class, e.as_str())))
    }
}
