use gatekeeper_detect::TierRouter;
use serde::Serialize;

/// Tier-usage snapshot (§4.9). The counters themselves live on
/// [`TierRouter`] — a deliberate grounding choice (the reference
/// implementation's tier router and tier-distribution tracker are the
/// same object) — this is just the serializable view over them.
#[derive(Debug, Clone, Serialize)]
pub struct Statistics {
    pub total: u64,
    /// Raw monotonic per-tier counts (§3/§6.2 `perTier`), e.g.
    /// `total == per_tier.iter().sum()`.
    pub per_tier: [u64; 3],
    pub tier1_pct: f64,
    pub tier2_pct: f64,
    pub tier3_pct: f64,
    pub healthy: bool,
    pub message: String,
}

pub fn collect(router: &TierRouter) -> Statistics {
    let distribution = router.distribution();
    let (healthy, message) = router.check_health();
    Statistics {
        total: distribution.total,
        per_tier: [distribution.tier1, distribution.tier2, distribution.tier3],
        tier1_pct: distribution.tier1_pct,
        tier2_pct: distribution.tier2_pct,
        tier3_pct: distribution.tier3_pct,
        healthy,
        message,
    }
}
