use serde::{Deserialize, Serialize};
use std::fmt;

/// The closed set of undesirable-output categories the gateway can detect.
///
/// This set is closed by design: a policy document that references a
/// class outside this enum fails validation at load time (see
/// [`crate::error::PolicyError::UnknownFailureClass`]) rather than being
/// silently accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FailureClass {
    FabricatedConcept,
    FabricatedFact,
    DangerousContent,
    MissingGrounding,
    DomainMismatch,
    Overconfidence,
    HedgingExcessive,
    PromptInjection,
    Bias,
    Toxicity,
    ToneIssue,
    FormattingIssue,
}

impl FailureClass {
    pub const ALL: [FailureClass; 12] = [
        FailureClass::FabricatedConcept,
        FailureClass::FabricatedFact,
        FailureClass::DangerousContent,
        FailureClass::MissingGrounding,
        FailureClass::DomainMismatch,
        FailureClass::Overconfidence,
        FailureClass::HedgingExcessive,
        FailureClass::PromptInjection,
        FailureClass::Bias,
        FailureClass::Toxicity,
        FailureClass::ToneIssue,
        FailureClass::FormattingIssue,
    ];

    /// Security-sensitive classes swept at the low (0.10) semantic
    /// threshold; everything else sweeps at the general (0.30) threshold.
    pub fn is_security_class(self) -> bool {
        matches!(
            self,
            FailureClass::PromptInjection | FailureClass::Bias | FailureClass::Toxicity
        )
    }

    /// Parses the wire form used by policy documents (`"PROMPT_INJECTION"`,
    /// case-insensitive). Returns `None` for anything outside the closed set.
    pub fn parse(s: &str) -> Option<FailureClass> {
        let normalized = s.trim().to_ascii_uppercase();
        FailureClass::ALL
            .into_iter()
            .find(|class| class.to_string() == normalized)
    }

    pub fn description(self) -> &'static str {
        match self {
            FailureClass::FabricatedConcept => "Response invents a concept or term that does not exist",
            FailureClass::FabricatedFact => "Response states a specific fact that is false or unverifiable",
            FailureClass::DangerousContent => "Response provides content that could cause physical or digital harm",
            FailureClass::MissingGrounding => "Response makes claims without citing or grounding in provided context",
            FailureClass::DomainMismatch => "Response addresses a domain outside the intended scope",
            FailureClass::Overconfidence => "Response asserts uncertain claims with unwarranted confidence",
            FailureClass::HedgingExcessive => "Response hedges so heavily it fails to answer the question",
            FailureClass::PromptInjection => "Input attempts to override or extract the system prompt",
            FailureClass::Bias => "Response exhibits demographic or ideological bias",
            FailureClass::Toxicity => "Response contains toxic, abusive, or harassing language",
            FailureClass::ToneIssue => "Response tone is inappropriate for the context",
            FailureClass::FormattingIssue => "Response violates expected output formatting",
        }
    }
}

impl fmt::Display for FailureClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FailureClass::FabricatedConcept => "FABRICATED_CONCEPT",
            FailureClass::FabricatedFact => "FABRICATED_FACT",
            FailureClass::DangerousContent => "DANGEROUS_CONTENT",
            FailureClass::MissingGrounding => "MISSING_GROUNDING",
            FailureClass::DomainMismatch => "DOMAIN_MISMATCH",
            FailureClass::Overconfidence => "OVERCONFIDENCE",
            FailureClass::HedgingExcessive => "HEDGING_EXCESSIVE",
            FailureClass::PromptInjection => "PROMPT_INJECTION",
            FailureClass::Bias => "BIAS",
            FailureClass::Toxicity => "TOXICITY",
            FailureClass::ToneIssue => "TONE_ISSUE",
            FailureClass::FormattingIssue => "FORMATTING_ISSUE",
        };
        f.write_str(s)
    }
}

/// Ordered severity; `INFO < LOW < MEDIUM < HIGH < CRITICAL`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SeverityLevel {
    Info,
    Low,
    Medium,
    High,
    Critical,
}

impl fmt::Display for SeverityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SeverityLevel::Info => "INFO",
            SeverityLevel::Low => "LOW",
            SeverityLevel::Medium => "MEDIUM",
            SeverityLevel::High => "HIGH",
            SeverityLevel::Critical => "CRITICAL",
        };
        f.write_str(s)
    }
}

/// The action the control tower attaches to a verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EnforcementAction {
    Allow,
    Warn,
    Fallback,
    Block,
    Log,
}

impl fmt::Display for EnforcementAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            EnforcementAction::Allow => "ALLOW",
            EnforcementAction::Warn => "WARN",
            EnforcementAction::Fallback => "FALLBACK",
            EnforcementAction::Block => "BLOCK",
            EnforcementAction::Log => "LOG",
        };
        f.write_str(s)
    }
}
