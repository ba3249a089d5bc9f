//! Deployment configuration, parsed from TOML (§A.2) — distinct from the
//! policy document, which is the reloadable, hash-identified harm
//! taxonomy parsed from YAML (`gatekeeper_policy::PolicyLoader`).

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Top-level configuration for a running gateway.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    pub policy: PolicyConfig,
    pub detect: DetectConfig,
    pub semantic: SemanticConfig,
    pub agent: AgentConfig,
    /// End-to-end deadline for one `evaluate_response` call, in milliseconds.
    pub deadline_ms: u64,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        GatewayConfig {
            policy: PolicyConfig::default(),
            detect: DetectConfig::default(),
            semantic: SemanticConfig::default(),
            agent: AgentConfig::default(),
            deadline_ms: 15_000,
        }
    }
}

impl GatewayConfig {
    /// Parses a `GatewayConfig` from a TOML document. Missing tables and
    /// fields fall back to their documented defaults.
    pub fn from_toml(contents: &str) -> Result<GatewayConfig, toml::de::Error> {
        toml::from_str(contents)
    }
}

/// Where to find the policy document, and whether to watch it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyConfig {
    pub path: PathBuf,
    /// Reserved for a future filesystem-watch reload path; today the
    /// Control Tower re-checks the policy hash on every request (§4.5),
    /// so polling is not required for correctness.
    pub watch: bool,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        PolicyConfig {
            path: PathBuf::from("./policy.yaml"),
            watch: false,
        }
    }
}

/// Input Guard / Tier 1 knobs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectConfig {
    pub max_input_len: usize,
    pub pattern_timeout_ms: u64,
}

impl Default for DetectConfig {
    fn default() -> Self {
        DetectConfig {
            max_input_len: gatekeeper_detect::DEFAULT_MAX_LEN,
            pattern_timeout_ms: 500,
        }
    }
}

/// Tier 2 semantic index knobs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SemanticConfig {
    pub dimension: usize,
    pub cache_size: usize,
}

impl Default for SemanticConfig {
    fn default() -> Self {
        SemanticConfig {
            dimension: 256,
            cache_size: gatekeeper_semantic::DEFAULT_CACHE_CAPACITY,
        }
    }
}

/// Tier 3 provider-manager and decision-cache knobs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    pub providers: Vec<ProviderConfig>,
    pub cache_size: usize,
    pub provider_timeout_ms: u64,
    pub liveness_timeout_ms: u64,
}

impl Default for AgentConfig {
    fn default() -> Self {
        AgentConfig {
            providers: Vec::new(),
            cache_size: gatekeeper_agent::DEFAULT_CAPACITY,
            provider_timeout_ms: gatekeeper_agent::DEFAULT_PROVIDER_TIMEOUT.as_millis() as u64,
            liveness_timeout_ms: gatekeeper_agent::DEFAULT_LIVENESS_TIMEOUT.as_millis() as u64,
        }
    }
}

/// One configured provider entry. Resolving this into a live
/// `Box<dyn Provider>` is left to the binary (`gatekeeper-cli`) that
/// knows which concrete provider implementations are linked in — the
/// core only needs the name and endpoint to describe them in config.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    pub name: String,
    #[serde(default)]
    pub endpoint: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_sane_values() {
        let config = GatewayConfig::default();
        assert_eq!(config.deadline_ms, 15_000);
        assert_eq!(config.detect.max_input_len, 10_000);
        assert!(config.agent.providers.is_empty());
    }

    #[test]
    fn parses_partial_toml_with_defaults() {
        let toml = r#"
            deadline_ms = 5000

            [policy]
            path = "custom_policy.yaml"
        "#;
        let config = GatewayConfig::from_toml(toml).unwrap();
        assert_eq!(config.deadline_ms, 5000);
        assert_eq!(config.policy.path, PathBuf::from("custom_policy.yaml"));
        assert_eq!(config.detect.max_input_len, 10_000);
    }

    #[test]
    fn parses_provider_list() {
        let toml = r#"
            [[agent.providers]]
            name = "primary"
            endpoint = "https://example.invalid/v1"

            [[agent.providers]]
            name = "local"
        "#;
        let config = GatewayConfig::from_toml(toml).unwrap();
        assert_eq!(config.agent.providers.len(), 2);
        assert_eq!(config.agent.providers[0].name, "primary");
        assert!(config.agent.providers[1].endpoint.is_none());
    }
}
