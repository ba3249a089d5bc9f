use std::sync::Arc;

use arc_swap::ArcSwap;
use gatekeeper_policy::{FailureClass, PolicyDocument};

use crate::cache::BoundedCache;
use crate::encoder::Encoder;
use crate::index::{IndexStatistics, SemanticIndex};

/// Security-sensitive classes swept at the permissive 0.10 threshold;
/// everything else at the stricter 0.30 threshold (§4.5).
const SECURITY_THRESHOLD: f64 = 0.10;
const GENERAL_THRESHOLD: f64 = 0.30;

const SECURITY_CLASSES: [FailureClass; 3] = [FailureClass::PromptInjection, FailureClass::Bias, FailureClass::Toxicity];
const GENERAL_CLASSES: [FailureClass; 5] = [
    FailureClass::FabricatedConcept,
    FailureClass::FabricatedFact,
    FailureClass::MissingGrounding,
    FailureClass::Overconfidence,
    FailureClass::DomainMismatch,
];

/// Local truncation length for Tier 2 queries (§4.5).
const QUERY_TRUNCATE_LEN: usize = 1_000;
const MIN_QUERY_LEN: usize = 10;

/// Default bound on the detect-score cache (§4.5).
pub const DEFAULT_CACHE_CAPACITY: usize = 10_000;

/// `(text, failure_class, threshold)` is hashed into this key rather
/// than kept as a tuple directly, since `f64` is neither `Eq` nor
/// `Hash` — the bit pattern is, and equal `f64` thresholds always
/// produce equal bit patterns here (every caller passes one of the two
/// fixed constants above).
#[derive(Clone, PartialEq, Eq, Hash)]
struct DetectCacheKey {
    text: String,
    failure_class: FailureClass,
    threshold_bits: u64,
}

/// One class's contribution to a [`SweepOutcome`], kept for the
/// explanation string the Control Tower surfaces to callers.
#[derive(Debug, Clone)]
pub struct ClassScore {
    pub failure_class: FailureClass,
    pub score: f64,
}

/// The result of sweeping every candidate class against one query
/// (§4.5). `confidence` is the running maximum score seen across every
/// class checked, regardless of whether that class's own threshold
/// cleared — see the Open Question note in SPEC_FULL.md §9.
#[derive(Debug, Clone)]
pub struct SweepOutcome {
    pub failure_class: Option<FailureClass>,
    pub confidence: f64,
    pub details: Vec<ClassScore>,
}

/// Tier 2 (C5): hot-reloading semantic index plus the bounded detect
/// cache and class-sweep logic the Control Tower drives.
pub struct SemanticDetector {
    encoder: Arc<dyn Encoder>,
    snapshot: ArcSwap<SemanticIndex>,
    cache: BoundedCache<DetectCacheKey, f64>,
}

impl SemanticDetector {
    pub fn new(encoder: Arc<dyn Encoder>, policy: &PolicyDocument) -> SemanticDetector {
        let index = SemanticIndex::build(policy, encoder.as_ref());
        SemanticDetector {
            encoder,
            snapshot: ArcSwap::from_pointee(index),
            cache: BoundedCache::new(DEFAULT_CACHE_CAPACITY),
        }
    }

    pub fn snapshot(&self) -> Arc<SemanticIndex> {
        self.snapshot.load_full()
    }

    /// Rebuilds the index if `policy`'s hash differs from the currently
    /// published snapshot's. Returns whether a rebuild happened. Callers
    /// (the Control Tower) invoke this once per request before Tier 2
    /// runs, ahead of any cache lookups or searches (§4.5: "before
    /// serving the request").
    pub fn ensure_fresh(&self, policy: &PolicyDocument) -> bool {
        if self.snapshot().policy_hash() == policy.policy_hash() {
            return false;
        }
        let rebuilt = SemanticIndex::build(policy, self.encoder.as_ref());
        self.snapshot.store(Arc::new(rebuilt));
        self.cache.clear();
        tracing::info!(policy_hash = policy.policy_hash(), "semantic index rebuilt");
        true
    }

    /// `detect(text, failure_class, threshold)` (§4.5): the nearest
    /// example *within `failure_class`* clears `threshold` or it
    /// doesn't; the score is cached keyed on all three inputs.
    pub fn detect(&self, text: &str, failure_class: FailureClass, threshold: f64) -> (Option<FailureClass>, f64) {
        if text.chars().count() < MIN_QUERY_LEN {
            return (None, 0.0);
        }
        let truncated: String = text.chars().take(QUERY_TRUNCATE_LEN).collect();

        let key = DetectCacheKey {
            text: truncated.clone(),
            failure_class,
            threshold_bits: threshold.to_bits(),
        };

        let score = if let Some(cached) = self.cache.get(&key) {
            cached
        } else {
            let query = self.encoder.encode(&truncated);
            let score = self.snapshot().best_score_for_class(&query, failure_class) as f64;
            self.cache.insert(key, score);
            score
        };

        if score >= threshold {
            (Some(failure_class), score)
        } else {
            (None, score)
        }
    }

    /// The class sweep the Control Tower drives for every Tier 2
    /// request (§4.5): security classes first, then general classes,
    /// keeping the running maximum score and only ever updating the
    /// reported `failure_class` in the same step that both raises the
    /// maximum and clears that class's own threshold.
    pub fn class_sweep(&self, text: &str) -> SweepOutcome {
        let mut max_similarity = 0.0f64;
        let mut detected_class = None;
        let mut details = Vec::with_capacity(SECURITY_CLASSES.len() + GENERAL_CLASSES.len());

        for class in SECURITY_CLASSES {
            let (maybe_class, score) = self.detect(text, class, SECURITY_THRESHOLD);
            details.push(ClassScore { failure_class: class, score });
            if score > max_similarity {
                max_similarity = score;
                if maybe_class.is_some() {
                    detected_class = maybe_class;
                }
            }
        }

        for class in GENERAL_CLASSES {
            let (maybe_class, score) = self.detect(text, class, GENERAL_THRESHOLD);
            details.push(ClassScore { failure_class: class, score });
            if score > max_similarity {
                max_similarity = score;
                if maybe_class.is_some() {
                    detected_class = maybe_class;
                }
            }
        }

        SweepOutcome { failure_class: detected_class, confidence: max_similarity, details }
    }

    /// Debugging aid (§A.4): the k nearest examples to `text` across
    /// every class, never consulted by `evaluate_response` itself.
    pub fn nearest_examples(&self, text: &str, k: usize) -> Vec<(FailureClass, String, f32)> {
        let truncated: String = text.chars().take(QUERY_TRUNCATE_LEN).collect();
        let query = self.encoder.encode(&truncated);
        self.snapshot()
            .nearest(&query, k)
            .into_iter()
            .map(|(class, text, score)| (class, text.to_string(), score))
            .collect()
    }

    pub fn index_statistics(&self) -> IndexStatistics {
        self.snapshot().statistics()
    }

    pub fn cache_hit_rate(&self) -> f64 {
        self.cache.hit_rate()
    }

    pub fn cache_size(&self) -> usize {
        self.cache.len()
    }
}
