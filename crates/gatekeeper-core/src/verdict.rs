use gatekeeper_policy::{EnforcementAction, FailureClass, SeverityLevel};
use serde::{Deserialize, Serialize};

/// The external result of `evaluate_response` (§6.3). Always well-formed:
/// a BLOCK action always carries a non-empty `explanation` (§7).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Verdict {
    pub action: EnforcementAction,
    pub tier_used: u8,
    pub method: &'static str,
    pub confidence: f64,
    pub processing_time_ms: u64,
    pub failure_class: Option<FailureClass>,
    pub severity: Option<SeverityLevel>,
    pub explanation: String,
    pub request_id: String,
}
