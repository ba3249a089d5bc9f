use gatekeeper_policy::FailureClass;

/// Tri-state verdict a tier can report for `shouldAllow`: a tier may have
/// no opinion at all, which is distinct from actively allowing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShouldAllow {
    Allow,
    Deny,
    Unknown,
}

impl ShouldAllow {
    pub fn is_false(self) -> bool {
        matches!(self, ShouldAllow::Deny)
    }
}

/// The internal record every tier produces; the control tower alone maps
/// this to an [`gatekeeper_policy::EnforcementAction`] (§9: exception-
/// carried control flow replaced by explicit result records).
#[derive(Debug, Clone)]
pub struct TierResult {
    pub method: &'static str,
    pub confidence: f64,
    pub failure_class: Option<FailureClass>,
    pub should_allow: ShouldAllow,
    pub explanation: String,
    pub pattern_name: Option<String>,
}

impl TierResult {
    pub fn new(method: &'static str, confidence: f64, should_allow: ShouldAllow, explanation: impl Into<String>) -> Self {
        TierResult {
            method,
            confidence,
            failure_class: None,
            should_allow,
            explanation: explanation.into(),
            pattern_name: None,
        }
    }

    pub fn with_failure_class(mut self, class: FailureClass) -> Self {
        self.failure_class = Some(class);
        self
    }

    pub fn with_pattern_name(mut self, name: impl Into<String>) -> Self {
        self.pattern_name = Some(name.into());
        self
    }
}
