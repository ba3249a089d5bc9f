//! Tier 2: semantic similarity search over policy examples.
//!
//! ```text
//!   PolicyDocument ──► SemanticIndex::build ──► ArcSwap snapshot
//!                                                     │
//!   text ──► SemanticDetector::class_sweep ──► detect(text, class, threshold)
//!                                                     │
//!                                     cache hit/miss ─┴─ SemanticIndex::best_score_for_class
//! ```
//!
//! `ensure_fresh` rebuilds the index (and clears the detect cache)
//! whenever the driving [`gatekeeper_policy::PolicyDocument`]'s hash
//! changes, matching the hot-reload discipline in `gatekeeper-policy`.

mod cache;
mod detector;
mod encoder;
mod index;

pub use cache::BoundedCache;
pub use detector::{ClassScore, SemanticDetector, SweepOutcome, DEFAULT_CACHE_CAPACITY};
pub use encoder::{inner_product, Encoder, HashingEncoder};
pub use index::{IndexStatistics, SemanticIndex, SharedIndex};
