//! Input normalization, deterministic pattern screening, and tier routing.
//!
//! ```text
//!   raw text ──► InputGuard ──► Tier1Screener ──► TierRouter ──► tier {1,2,3}
//!                   │
//!                   └─ pathological gate / too-short shortcut (early TierResult)
//! ```
//!
//! This crate holds everything that can decide a request's fate without
//! an encoder, a policy lookup, or a network call: C1 (Input Guard), C2
//! (Pattern Library), C3 (Tier 1 Screener), and C4 (Tier Router). Tier 2
//! and Tier 3 build on [`TierResult`] and [`ShouldAllow`] from here but
//! live in their own crates, since they bring their own heavier
//! dependency surface (an embedding encoder, an LLM provider).

mod guard;
mod pattern;
mod result;
mod router;
mod screener;

pub use guard::{InputGuard, DEFAULT_MAX_LEN};
pub use pattern::{build_attack_signatures, build_patterns, Pattern, PatternError, PatternLibrary};
pub use result::{ShouldAllow, TierResult};
pub use router::{TierDecision, TierDistribution, TierRouter};
pub use screener::Tier1Screener;
