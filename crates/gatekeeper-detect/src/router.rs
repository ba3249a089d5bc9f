use std::sync::atomic::{AtomicU64, Ordering};

/// A routing decision for a given confidence score (§4.4).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TierDecision {
    pub tier: u8,
    pub reason: &'static str,
    pub confidence: f64,
}

/// Percentage breakdown of tier usage, plus the raw monotonic counts
/// (§3/§6.2: `perTier`) they were computed from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TierDistribution {
    pub tier1: u64,
    pub tier2: u64,
    pub tier3: u64,
    pub tier1_pct: f64,
    pub tier2_pct: f64,
    pub tier3_pct: f64,
    pub total: u64,
}

/// Pure confidence → tier routing, plus the tier-usage counters that back
/// the distribution-health check (§4.9). Routing itself has no side
/// effects; callers record the tier that actually produced the final
/// result via [`TierRouter::record_final`] exactly once per request, so
/// an escalation from Tier 2 to Tier 3 is counted once, at Tier 3 — never
/// double-counted at both.
pub struct TierRouter {
    tier1: AtomicU64,
    tier2: AtomicU64,
    tier3: AtomicU64,
}

impl Default for TierRouter {
    fn default() -> Self {
        TierRouter {
            tier1: AtomicU64::new(0),
            tier2: AtomicU64::new(0),
            tier3: AtomicU64::new(0),
        }
    }
}

impl TierRouter {
    pub fn new() -> TierRouter {
        TierRouter::default()
    }

    /// Maps a Tier 1 confidence score to the tier that should handle the
    /// request next.
    pub fn route(&self, confidence: f64) -> TierDecision {
        if confidence >= 0.80 {
            TierDecision { tier: 1, reason: "final", confidence }
        } else if confidence >= 0.15 {
            TierDecision { tier: 2, reason: "semantic", confidence }
        } else if confidence >= 0.05 {
            TierDecision { tier: 3, reason: "gray zone", confidence }
        } else {
            TierDecision { tier: 3, reason: "deep analysis", confidence }
        }
    }

    /// `true` iff a Tier 2 result should escalate to Tier 3: the gray
    /// zone `[0.05, 0.15)`, or a detected failure class whose confidence
    /// is still under 0.25 — and only when Tier 3 is actually available.
    pub fn should_escalate(&self, confidence: f64, failure_detected: bool, tier3_available: bool) -> bool {
        if !tier3_available {
            return false;
        }
        (0.05..0.15).contains(&confidence) || (failure_detected && confidence < 0.25)
    }

    pub fn record_final(&self, tier: u8) {
        match tier {
            1 => self.tier1.fetch_add(1, Ordering::Relaxed),
            2 => self.tier2.fetch_add(1, Ordering::Relaxed),
            3 => self.tier3.fetch_add(1, Ordering::Relaxed),
            other => panic!("invalid tier {other}"),
        };
    }

    pub fn distribution(&self) -> TierDistribution {
        let t1 = self.tier1.load(Ordering::Relaxed);
        let t2 = self.tier2.load(Ordering::Relaxed);
        let t3 = self.tier3.load(Ordering::Relaxed);
        let total = t1 + t2 + t3;
        if total == 0 {
            return TierDistribution {
                tier1: 0,
                tier2: 0,
                tier3: 0,
                tier1_pct: 0.0,
                tier2_pct: 0.0,
                tier3_pct: 0.0,
                total: 0,
            };
        }
        TierDistribution {
            tier1: t1,
            tier2: t2,
            tier3: t3,
            tier1_pct: t1 as f64 / total as f64 * 100.0,
            tier2_pct: t2 as f64 / total as f64 * 100.0,
            tier3_pct: t3 as f64 / total as f64 * 100.0,
            total,
        }
    }

    /// `(healthy, message)`; healthy is vacuously `true` below 100
    /// samples — there isn't enough data yet to call the distribution
    /// unhealthy (§4.9).
    pub fn check_health(&self) -> (bool, String) {
        let dist = self.distribution();
        if dist.total < 100 {
            return (true, "not enough data for health check (need 100+ requests)".to_string());
        }

        let tier1_healthy = (90.0..=98.0).contains(&dist.tier1_pct);
        let tier2_healthy = (2.0..=8.0).contains(&dist.tier2_pct);
        let tier3_healthy = (0.0..=5.0).contains(&dist.tier3_pct);

        if tier1_healthy && tier2_healthy && tier3_healthy {
            return (
                true,
                format!(
                    "healthy distribution - tier1: {:.1}%, tier2: {:.1}%, tier3: {:.1}%",
                    dist.tier1_pct, dist.tier2_pct, dist.tier3_pct
                ),
            );
        }

        let mut warnings = Vec::new();
        if !tier1_healthy {
            warnings.push(format!("tier1 at {:.1}% (target: 90-98%)", dist.tier1_pct));
        }
        if !tier2_healthy {
            warnings.push(format!("tier2 at {:.1}% (target: 2-8%)", dist.tier2_pct));
        }
        if !tier3_healthy {
            warnings.push(format!("tier3 at {:.1}% (target: 0-5%)", dist.tier3_pct));
        }
        (false, warnings.join(" | "))
    }

    pub fn reset(&self) {
        self.tier1.store(0, Ordering::Relaxed);
        self.tier2.store(0, Ordering::Relaxed);
        self.tier3.store(0, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn routes_strong_confidence_to_tier1() {
        let router = TierRouter::new();
        assert_eq!(router.route(0.9).tier, 1);
    }

    #[test]
    fn routes_gray_zone_to_tier3() {
        let router = TierRouter::new();
        let decision = router.route(0.09);
        assert_eq!(decision.tier, 3);
        assert_eq!(decision.reason, "gray zone");
    }

    #[test]
    fn routes_mid_confidence_to_tier2() {
        let router = TierRouter::new();
        assert_eq!(router.route(0.5).tier, 2);
    }

    #[test]
    fn escalation_requires_tier3_available() {
        let router = TierRouter::new();
        assert!(!router.should_escalate(0.09, false, false));
        assert!(router.should_escalate(0.09, false, true));
    }

    #[test]
    fn escalation_on_low_confidence_detected_failure() {
        let router = TierRouter::new();
        assert!(router.should_escalate(0.2, true, true));
        assert!(!router.should_escalate(0.2, false, true));
    }

    #[test]
    fn distribution_and_reset() {
        let router = TierRouter::new();
        for _ in 0..95 {
            router.record_final(1);
        }
        for _ in 0..4 {
            router.record_final(2);
        }
        router.record_final(3);
        let dist = router.distribution();
        assert_eq!(dist.total, 100);
        let (healthy, _) = router.check_health();
        assert!(healthy);

        router.reset();
        assert_eq!(router.distribution().total, 0);
    }

    #[test]
    fn insufficient_data_is_reported_healthy() {
        let router = TierRouter::new();
        router.record_final(1);
        let (healthy, message) = router.check_health();
        assert!(healthy);
        assert!(message.contains("not enough data"));
    }
}
