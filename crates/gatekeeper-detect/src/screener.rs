use std::time::{Duration, Instant};

use crate::pattern::PatternLibrary;
use crate::result::{ShouldAllow, TierResult};

/// Local truncation length for Tier 1 regex safety; independent of the
/// Input Guard's own, larger cap.
const TIER1_TRUNCATE_LEN: usize = 500;

/// Per-pattern wall-clock budget (§4.3). A pattern that runs over this is
/// treated as "no match" rather than aborting the scan — matching the
/// source's Unix-timer behavior (§9) without depending on a signal-based
/// timer, which does not exist as a portable concept in this runtime.
const PATTERN_TIMEOUT: Duration = Duration::from_millis(500);

pub struct Tier1Screener {
    patterns: PatternLibrary,
}

impl Tier1Screener {
    pub fn new(patterns: PatternLibrary) -> Tier1Screener {
        Tier1Screener { patterns }
    }

    pub fn screen(&self, sanitized_text: &str) -> TierResult {
        let text: String = sanitized_text.chars().take(TIER1_TRUNCATE_LEN).collect();

        for allow in self.patterns.allow_patterns() {
            if bounded_is_match(&allow.regex, &text) {
                return TierResult::new(
                    "regex_anti",
                    allow.confidence,
                    ShouldAllow::Allow,
                    format!("matched allow-pattern `{}`", allow.name),
                )
                .with_pattern_name(allow.name);
            }
        }

        let mut best: Option<(&crate::pattern::Pattern, bool)> = None; // (pattern, matched)
        for block in self.patterns.block_patterns() {
            if bounded_is_match(&block.regex, &text) {
                let replace = match best {
                    Some((current, _)) => block.confidence > current.confidence,
                    None => true,
                };
                if replace {
                    best = Some((block, true));
                }
            }
        }

        if let Some((pattern, _)) = best {
            let mut result = TierResult::new(
                "regex_strong",
                pattern.confidence,
                ShouldAllow::Deny,
                format!("matched block-pattern `{}`", pattern.name),
            )
            .with_pattern_name(pattern.name);
            if let Some(class) = pattern.failure_class {
                result = result.with_failure_class(class);
            }
            return result;
        }

        TierResult::new(
            "regex_uncertain",
            0.5,
            ShouldAllow::Unknown,
            "no deterministic pattern matched",
        )
    }
}

fn bounded_is_match(regex: &regex::Regex, text: &str) -> bool {
    let started = Instant::now();
    let matched = regex.is_match(text);
    if started.elapsed() > PATTERN_TIMEOUT {
        tracing::warn!(pattern = regex.as_str(), "pattern search exceeded timeout, treating as no match");
        return false;
    }
    matched
}
