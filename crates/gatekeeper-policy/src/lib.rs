//! Harm taxonomy and hot-reloadable policy document.
//!
//! ```text
//!   policy.yaml ──► PolicyLoader::load ──► PolicyDocument (Arc, published)
//!                         │                         ▲
//!                         └── reload() on hash change┘
//! ```
//!
//! A [`PolicyDocument`] maps each closed-set [`FailureClass`] to an
//! [`EnforcementAction`] and [`SeverityLevel`], plus the confidence
//! threshold and worked examples used downstream by the semantic index.
//! The document's identity is the SHA-256 of the file bytes it was built
//! from ([`PolicyDocument::policy_hash`]); every other component in the
//! workspace treats a hash change as the sole trigger for a rebuild.

mod document;
mod error;
mod loader;
mod taxonomy;

pub use document::{PolicyDocument, PolicyEntry, RawPolicyFile};
pub use error::PolicyError;
pub use loader::PolicyLoader;
pub use taxonomy::{EnforcementAction, FailureClass, SeverityLevel};
