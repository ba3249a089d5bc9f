use std::fmt;

use uuid::Uuid;

/// An opaque v4 UUID minted once per `evaluate_response` call, for
/// correlating a request's tracing spans with its returned `Verdict`
/// (§3.A). Never influences a decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RequestId(Uuid);

impl RequestId {
    pub fn new() -> RequestId {
        RequestId(Uuid::new_v4())
    }
}

impl Default for RequestId {
    fn default() -> Self {
        RequestId::new()
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
