//! Control Tower orchestration (C8): wires the Input Guard, Pattern
//! Library, Tier 1 Screener, Tier Router, Semantic Index, Agent
//! Adjudicator and Policy Loader into the single entry point
//! `evaluate_response` (§4.8), plus the Statistics (C9) view over it.

mod config;
mod error;
mod request_id;
mod statistics;
mod tower;
mod verdict;

pub use config::{AgentConfig, DetectConfig, GatewayConfig, PolicyConfig, ProviderConfig, SemanticConfig};
pub use error::GatewayError;
pub use request_id::RequestId;
pub use statistics::Statistics;
pub use tower::ControlTower;
pub use verdict::Verdict;
