use thiserror::Error;

/// Errors surfaced at construction/configuration time only.
/// `ControlTower::evaluate_response` itself never returns `Err` (§7) —
/// every internal failure during request serving is folded into a
/// safe `Verdict` instead.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("policy error: {0}")]
    Policy(#[from] gatekeeper_policy::PolicyError),

    #[error("pattern compilation error: {0}")]
    Pattern(#[from] gatekeeper_detect::PatternError),

    #[error("failed to parse gateway config: {0}")]
    Config(#[from] toml::de::Error),

    #[error("failed to read gateway config file {path}: {source}")]
    ConfigIo {
        path: String,
        #[source]
        source: std::io::Error,
    },
}
