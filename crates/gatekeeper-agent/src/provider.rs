use futures::future::BoxFuture;

/// Result of one provider call, matching the wire contract of §6.4:
/// `generate(prompt) -> { success, content, provider }`.
#[derive(Debug, Clone)]
pub struct GenerateResponse {
    pub success: bool,
    pub content: String,
    pub provider: String,
}

impl GenerateResponse {
    pub fn ok(provider: impl Into<String>, content: impl Into<String>) -> GenerateResponse {
        GenerateResponse {
            success: true,
            content: content.into(),
            provider: provider.into(),
        }
    }

    pub fn failed(provider: impl Into<String>) -> GenerateResponse {
        GenerateResponse {
            success: false,
            content: String::new(),
            provider: provider.into(),
        }
    }
}

/// An LLM provider the Provider Manager can fail over between. The gateway
/// never depends on a concrete provider — the actual cloud API / local
/// inference backend is an external collaborator (§1: out of scope,
/// interface only). A provider that cannot be reached is expected to
/// return `Ok(GenerateResponse { success: false, .. })` or an error, not
/// panic; the manager treats both identically.
pub trait Provider: Send + Sync {
    fn name(&self) -> &str;

    /// Liveness probe, bounded externally to 2s by the Provider Manager
    /// (§4.6). Implementations should make this as cheap as possible —
    /// a connectivity check, not a full round-trip.
    fn probe(&self) -> BoxFuture<'_, bool>;

    /// Runs one adjudication prompt through this provider, bounded
    /// externally to 10s by the Provider Manager.
    fn generate(&self, prompt: &str) -> BoxFuture<'_, Result<GenerateResponse, ProviderError>>;
}

#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("provider `{provider}` request failed: {message}")]
    RequestFailed { provider: String, message: String },
}
