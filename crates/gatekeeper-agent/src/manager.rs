use std::time::Duration;

use crate::provider::{GenerateResponse, Provider};

/// Per-provider liveness-probe budget (§4.6).
pub const DEFAULT_LIVENESS_TIMEOUT: Duration = Duration::from_secs(2);

/// Per-provider generation budget (§4.6).
pub const DEFAULT_PROVIDER_TIMEOUT: Duration = Duration::from_secs(10);

/// An ordered list of providers tried in turn until one succeeds. No
/// provider error ever surfaces to the caller — exhausting the list is
/// reported the same way a single down provider would be, via
/// [`ProviderManager::generate`]'s `success: false` response, which
/// [`crate::Adjudicator`] maps to `llm_unavailable`.
pub struct ProviderManager {
    providers: Vec<Box<dyn Provider>>,
    liveness_timeout: Duration,
    provider_timeout: Duration,
}

impl ProviderManager {
    pub fn new(providers: Vec<Box<dyn Provider>>) -> ProviderManager {
        ProviderManager {
            providers,
            liveness_timeout: DEFAULT_LIVENESS_TIMEOUT,
            provider_timeout: DEFAULT_PROVIDER_TIMEOUT,
        }
    }

    pub fn with_timeouts(mut self, liveness: Duration, provider: Duration) -> ProviderManager {
        self.liveness_timeout = liveness;
        self.provider_timeout = provider;
        self
    }

    /// `true` iff at least one provider is configured. This is a static
    /// configuration check, not a live probe — the Tier Router's
    /// escalation decision (§4.4) must be made without first paying for
    /// a round-trip.
    pub fn is_configured(&self) -> bool {
        !self.providers.is_empty()
    }

    /// Tries each provider in order: a liveness probe bounded to
    /// `liveness_timeout`, then (if alive) a generation call bounded to
    /// `provider_timeout`. The first successful generation wins; a
    /// timed-out or failed provider is skipped, never retried.
    pub async fn generate(&self, prompt: &str) -> GenerateResponse {
        for provider in &self.providers {
            let alive = tokio::time::timeout(self.liveness_timeout, provider.probe())
                .await
                .unwrap_or(false);
            if !alive {
                tracing::warn!(provider = provider.name(), "provider failed liveness probe, skipping");
                continue;
            }

            match tokio::time::timeout(self.provider_timeout, provider.generate(prompt)).await {
                Ok(Ok(response)) if response.success => return response,
                Ok(Ok(_failed)) => {
                    tracing::warn!(provider = provider.name(), "provider returned unsuccessful response");
                }
                Ok(Err(err)) => {
                    tracing::warn!(provider = provider.name(), error = %err, "provider call failed");
                }
                Err(_elapsed) => {
                    tracing::warn!(provider = provider.name(), "provider call timed out");
                }
            }
        }

        GenerateResponse::failed("none")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::future::BoxFuture;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct FlakyProvider {
        name: &'static str,
        alive: bool,
        succeeds: bool,
        calls: Arc<AtomicUsize>,
    }

    impl Provider for FlakyProvider {
        fn name(&self) -> &str {
            self.name
        }

        fn probe(&self) -> BoxFuture<'_, bool> {
            Box::pin(async move { self.alive })
        }

        fn generate(&self, _prompt: &str) -> BoxFuture<'_, Result<GenerateResponse, crate::provider::ProviderError>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Box::pin(async move {
                if self.succeeds {
                    Ok(GenerateResponse::ok(self.name, "BLOCK: looks like an injection"))
                } else {
                    Ok(GenerateResponse::failed(self.name))
                }
            })
        }
    }

    #[tokio::test]
    async fn skips_dead_provider_and_uses_fallback() {
        let calls = Arc::new(AtomicUsize::new(0));
        let manager = ProviderManager::new(vec![
            Box::new(FlakyProvider { name: "primary", alive: false, succeeds: true, calls: calls.clone() }),
            Box::new(FlakyProvider { name: "fallback", alive: true, succeeds: true, calls: calls.clone() }),
        ]);

        let response = manager.generate("test prompt").await;
        assert!(response.success);
        assert_eq!(response.provider, "fallback");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn all_providers_exhausted_yields_unsuccessful_response() {
        let calls = Arc::new(AtomicUsize::new(0));
        let manager = ProviderManager::new(vec![Box::new(FlakyProvider {
            name: "only",
            alive: true,
            succeeds: false,
            calls,
        })]);

        let response = manager.generate("test prompt").await;
        assert!(!response.success);
    }

    #[test]
    fn empty_provider_list_is_not_configured() {
        let manager = ProviderManager::new(vec![]);
        assert!(!manager.is_configured());
    }
}
