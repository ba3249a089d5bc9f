use thiserror::Error;

/// Configuration-fatal errors raised while loading a policy document.
///
/// Every variant here surfaces only at load/reload time, never while a
/// request is being served (`PolicyLoader::reload` is the only caller-
/// visible way to hit one after startup).
#[derive(Debug, Error)]
pub enum PolicyError {
    #[error("failed to read policy file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse policy file as YAML: {0}")]
    Malformed(#[from] serde_yaml::Error),

    /// One or more structural violations were found; every violation found
    /// in a single validation pass is reported together rather than
    /// stopping at the first.
    #[error("policy document failed validation:\n{}", .0.join("\n"))]
    Invalid(Vec<String>),
}

impl PolicyError {
    pub fn invalid(violations: Vec<String>) -> PolicyError {
        PolicyError::Invalid(violations)
    }
}
