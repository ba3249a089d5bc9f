use std::sync::Arc;
use std::time::{Duration, Instant};

use gatekeeper_agent::{Adjudicator, AgentVerdict, ProviderManager};
use gatekeeper_detect::{build_patterns, InputGuard, ShouldAllow, Tier1Screener, TierResult, TierRouter};
use gatekeeper_policy::{EnforcementAction, PolicyLoader, SeverityLevel};
use gatekeeper_semantic::{HashingEncoder, SemanticDetector};

use crate::config::GatewayConfig;
use crate::error::GatewayError;
use crate::request_id::RequestId;
use crate::statistics::{self, Statistics};
use crate::verdict::Verdict;

/// Orchestrates C1-C7 into the single entry point `evaluate_response`
/// (§4.8). Construct once per process; share across concurrent callers.
pub struct ControlTower {
    config: GatewayConfig,
    policy: PolicyLoader,
    input_guard: InputGuard,
    screener: Tier1Screener,
    router: TierRouter,
    semantic: SemanticDetector,
    adjudicator: Adjudicator,
}

impl ControlTower {
    pub fn new(config: GatewayConfig, providers: Vec<Box<dyn gatekeeper_agent::Provider>>) -> Result<ControlTower, GatewayError> {
        let policy = PolicyLoader::load(&config.policy.path)?;
        let input_guard = InputGuard::new(config.detect.max_input_len)?;
        let screener = Tier1Screener::new(build_patterns()?);
        let router = TierRouter::new();

        let encoder = Arc::new(HashingEncoder::new(config.semantic.dimension));
        let semantic = SemanticDetector::new(encoder, &policy.snapshot());

        let manager = ProviderManager::new(providers).with_timeouts(
            Duration::from_millis(config.agent.liveness_timeout_ms),
            Duration::from_millis(config.agent.provider_timeout_ms),
        );
        let adjudicator = Adjudicator::with_cache_capacity(manager, config.agent.cache_size);

        Ok(ControlTower {
            config,
            policy,
            input_guard,
            screener,
            router,
            semantic,
            adjudicator,
        })
    }

    /// `evaluate_response(text, context)` (§4.8). Infallible: every
    /// internal failure folds into a safe `Verdict` (§7).
    ///
    /// The end-to-end deadline is enforced by `tokio::time::timeout`
    /// alone: on elapse, the `evaluate_inner` future is dropped in place,
    /// which stops polling it (and, transitively, whatever Tier 1/2/3
    /// work it was suspended in) immediately — there is no separate
    /// cancellation signal to thread through, since a dropped future
    /// cannot make further progress in Rust's async model.
    pub async fn evaluate_response(&self, text: &str, context: Option<&std::collections::HashMap<String, String>>) -> Verdict {
        let request_id = RequestId::new();
        let started = Instant::now();
        let deadline = Duration::from_millis(self.config.deadline_ms);

        let work = self.evaluate_inner(text, context);
        let verdict = match tokio::time::timeout(deadline, work).await {
            Ok(verdict) => verdict,
            Err(_elapsed) => {
                tracing::warn!(request_id = %request_id, deadline_ms = self.config.deadline_ms, "end-to-end deadline exceeded");
                self.finish("timeout_protection", 0.75, EnforcementAction::Block, "request exceeded the configured deadline", 3)
            }
        };

        let elapsed_ms = started.elapsed().as_millis() as u64;
        let verdict = Verdict { processing_time_ms: elapsed_ms, request_id: request_id.to_string(), ..verdict };

        tracing::info!(
            request_id = %request_id,
            tier_used = verdict.tier_used,
            method = verdict.method,
            confidence = verdict.confidence,
            processing_time_ms = verdict.processing_time_ms,
            blocked = matches!(verdict.action, EnforcementAction::Block),
            "evaluate_response"
        );

        verdict
    }

    async fn evaluate_inner(
        &self,
        text: &str,
        context: Option<&std::collections::HashMap<String, String>>,
    ) -> Verdict {
        if let Err(reload_err) = self.policy.reload() {
            tracing::error!(error = %reload_err, "policy reload failed; continuing on last known-good snapshot");
        }
        let policy_snapshot = self.policy.snapshot();
        if self.semantic.ensure_fresh(&policy_snapshot) {
            self.adjudicator.cache().clear();
        }

        let sanitized = match self.input_guard.guard(text) {
            Err(early) => return self.finish_guard_short_circuit(early),
            Ok(sanitized) => sanitized,
        };

        let tier1_result = self.screener.screen(&sanitized);
        let decision = self.router.route(tier1_result.confidence);

        let (tier_used, result) = match decision.tier {
            1 => (1u8, tier1_result),
            2 => {
                let sweep = self.semantic.class_sweep(&sanitized);
                let tier2_result = TierResult {
                    method: "semantic_similarity",
                    confidence: sweep.confidence,
                    failure_class: sweep.failure_class,
                    should_allow: if sweep.failure_class.is_some() { ShouldAllow::Deny } else { ShouldAllow::Unknown },
                    explanation: explain_sweep(&sweep),
                    pattern_name: None,
                };

                let tier3_available = self.adjudicator.is_available();
                if self
                    .router
                    .should_escalate(tier2_result.confidence, tier2_result.failure_class.is_some(), tier3_available)
                {
                    (3u8, self.adjudicate(&sanitized, context, tier2_result.failure_class).await)
                } else {
                    (2u8, tier2_result)
                }
            }
            // Tier 1 routed directly to the gray/deep-analysis zone (confidence
            // < 0.15): Tier 2 is skipped entirely and Tier 3 is consulted
            // straightaway, mirroring the reference control tower's branch.
            _ => (3u8, self.adjudicate(&sanitized, context, None).await),
        };

        self.router.record_final(tier_used);
        self.finish_from_tier_result(tier_used, result)
    }

    async fn adjudicate(
        &self,
        text: &str,
        context: Option<&std::collections::HashMap<String, String>>,
        prior_failure_class: Option<gatekeeper_policy::FailureClass>,
    ) -> TierResult {
        let analysis = self.adjudicator.analyze(text, context).await;
        TierResult {
            method: if analysis.cached { "agent_cached" } else { "agent_adjudication" },
            confidence: analysis.confidence,
            failure_class: failure_class_for_verdict(analysis.decision, prior_failure_class),
            should_allow: match analysis.decision {
                AgentVerdict::Allow => ShouldAllow::Allow,
                AgentVerdict::Block => ShouldAllow::Deny,
            },
            explanation: analysis.reasoning,
            pattern_name: None,
        }
    }

    /// The Input Guard short-circuits ahead of Tier 1 (§4.8 step 2), so its
    /// result never goes through the policy-lookup mapping of step 6: a
    /// pathological-gate hit is BLOCK outright, at `SeverityLevel::Critical`
    /// matching `control_tower_v3.py`'s fast-path (spec.md itself is silent
    /// on the severity), and the `len < 3` skip is a plain ALLOW.
    fn finish_guard_short_circuit(&self, result: TierResult) -> Verdict {
        let action = if result.should_allow.is_false() {
            EnforcementAction::Block
        } else {
            EnforcementAction::Allow
        };
        let severity = matches!(action, EnforcementAction::Block).then_some(SeverityLevel::Critical);

        Verdict {
            action,
            tier_used: 1,
            method: result.method,
            confidence: result.confidence,
            processing_time_ms: 0,
            failure_class: result.failure_class,
            severity,
            explanation: result.explanation,
            request_id: String::new(),
        }
    }

    fn finish_from_tier_result(&self, tier_used: u8, result: TierResult) -> Verdict {
        let policy_snapshot = self.policy.snapshot();
        let (action, severity) = if let Some(class) = result.failure_class {
            match policy_snapshot.policy(class) {
                Some(entry) => (entry.action, Some(entry.severity)),
                None => (EnforcementAction::Warn, Some(SeverityLevel::Medium)),
            }
        } else if result.should_allow.is_false() {
            (EnforcementAction::Warn, Some(SeverityLevel::Medium))
        } else {
            (EnforcementAction::Allow, None)
        };

        Verdict {
            action,
            tier_used,
            method: result.method,
            confidence: result.confidence,
            processing_time_ms: 0,
            failure_class: result.failure_class,
            severity,
            explanation: result.explanation,
            request_id: String::new(),
        }
    }

    /// Builds a `Verdict` for the error-path outcomes of §7 (e.g. the
    /// `timeout_protection` BLOCK below), which carry their action
    /// directly rather than going through the failure-class policy
    /// lookup of step 6.
    fn finish(&self, method: &'static str, confidence: f64, action: EnforcementAction, explanation: impl Into<String>, tier_used: u8) -> Verdict {
        let severity = matches!(action, EnforcementAction::Block).then_some(SeverityLevel::High);
        Verdict {
            action,
            tier_used,
            method,
            confidence,
            processing_time_ms: 0,
            failure_class: None,
            severity,
            explanation: explanation.into(),
            request_id: String::new(),
        }
    }

    pub fn get_stats(&self) -> Statistics {
        statistics::collect(&self.router)
    }

    pub fn reset_stats(&self) {
        self.router.reset();
    }

    /// Forces a reload check outside the request path; mainly useful
    /// for the `gatekeeper check` CLI subcommand (§A.3). Request serving
    /// already reloads lazily on every call (§4.5).
    pub fn reload_policy(&self) -> Result<bool, GatewayError> {
        let reloaded = self.policy.reload()?;
        if reloaded {
            let snapshot = self.policy.snapshot();
            if self.semantic.ensure_fresh(&snapshot) {
                self.adjudicator.cache().clear();
            }
        }
        Ok(reloaded)
    }
}

fn explain_sweep(sweep: &gatekeeper_semantic::SweepOutcome) -> String {
    match sweep.failure_class {
        Some(class) => format!("semantic match for {class} (score {:.3})", sweep.confidence),
        None => format!("no semantic match above threshold (max score {:.3})", sweep.confidence),
    }
}

/// Tier 3's agent verdict is binary (ALLOW/BLOCK) and carries no
/// failure-class opinion of its own; a BLOCK keeps whatever class Tier 2
/// already attributed (if any) so the Policy Loader lookup in
/// `finish_from_tier_result` has something to key on, matching the
/// reference implementation's simplification of mapping an agent BLOCK
/// back onto the class that triggered escalation in the first place.
fn failure_class_for_verdict(
    verdict: AgentVerdict,
    tier2_class: Option<gatekeeper_policy::FailureClass>,
) -> Option<gatekeeper_policy::FailureClass> {
    match verdict {
        AgentVerdict::Block => tier2_class.or(Some(gatekeeper_policy::FailureClass::PromptInjection)),
        AgentVerdict::Allow => None,
    }
}
