use std::collections::HashMap;

use gatekeeper_policy::FailureClass;
use regex::Regex;

use crate::pattern::{build_attack_signatures, Pattern, PatternError};
use crate::result::{ShouldAllow, TierResult};

/// Default cap on text accepted into the core (§3: ≤10 000 chars within
/// the core; the ≤50 000 char API-boundary cap is the caller's concern).
pub const DEFAULT_MAX_LEN: usize = 10_000;

/// Normalizes raw input and screens it for shapes that carry a decision
/// on their own — adversarial repetition, high-entropy garbage, or a
/// handful of known attack signatures — before any pattern or semantic
/// work is spent on it.
pub struct InputGuard {
    max_len: usize,
    attack_signatures: Vec<Pattern>,
    repeat_run: Regex,
}

impl InputGuard {
    pub fn new(max_len: usize) -> Result<InputGuard, PatternError> {
        Ok(InputGuard {
            max_len,
            attack_signatures: build_attack_signatures()?,
            repeat_run: Regex::new(r"(.)\1{20,}").unwrap(),
        })
    }

    /// Replaces NUL bytes, collapses whitespace runs to a single space,
    /// trims, and truncates to `max_len`. Idempotent: re-running this on
    /// its own output is a no-op (§8).
    pub fn normalize(&self, text: &str) -> String {
        let without_nul: String = text.chars().filter(|&c| c != '\0').collect();
        let collapsed = without_nul
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ");
        if collapsed.chars().count() > self.max_len {
            tracing::warn!(len = collapsed.chars().count(), max_len = self.max_len, "input truncated");
            collapsed.chars().take(self.max_len).collect()
        } else {
            collapsed
        }
    }

    /// Runs the full Input Guard contract: normalize, then either an
    /// early `TierResult` (pathological gate or the `len < 3` shortcut)
    /// or the sanitized text ready for Tier 1.
    pub fn guard(&self, text: &str) -> Result<String, TierResult> {
        let sanitized = self.normalize(text);

        if let Some(result) = self.pathological_gate(&sanitized) {
            return Err(result);
        }

        if sanitized.chars().count() < 3 {
            return Err(TierResult::new(
                "regex_skipped",
                0.5,
                ShouldAllow::Allow,
                "input too short for pattern analysis",
            ));
        }

        Ok(sanitized)
    }

    /// A pathological-gate hit always carries `FailureClass::PromptInjection`,
    /// matching `original_source/enforcement/control_tower_v3.py`'s
    /// fast-path, which spec.md leaves unspecified.
    fn pathological_gate(&self, text: &str) -> Option<TierResult> {
        let len = text.chars().count();

        if len > 50 {
            if let Some(ratio) = dominant_char_ratio(text) {
                if ratio > 0.8 {
                    return Some(
                        TierResult::new(
                            "regex_pathological",
                            0.95,
                            ShouldAllow::Deny,
                            "a single character dominates the input",
                        )
                        .with_failure_class(FailureClass::PromptInjection),
                    );
                }
            }
        }

        if len > 100 && distinct_char_count(text) < 5 {
            return Some(
                TierResult::new(
                    "regex_pathological",
                    0.95,
                    ShouldAllow::Deny,
                    "input has fewer than 5 distinct characters",
                )
                .with_failure_class(FailureClass::PromptInjection),
            );
        }

        if self.repeat_run.is_match(text) {
            return Some(
                TierResult::new(
                    "regex_pathological",
                    0.95,
                    ShouldAllow::Deny,
                    "input contains a run of 21 or more repeated characters",
                )
                .with_failure_class(FailureClass::PromptInjection),
            );
        }

        for sig in &self.attack_signatures {
            if sig.regex.is_match(text) {
                return Some(
                    TierResult::new(
                        "regex_pathological",
                        0.95,
                        ShouldAllow::Deny,
                        format!("matched known attack signature: {}", sig.description),
                    )
                    .with_pattern_name(sig.name)
                    .with_failure_class(FailureClass::PromptInjection),
                );
            }
        }

        None
    }
}

fn dominant_char_ratio(text: &str) -> Option<f64> {
    let mut counts: HashMap<char, usize> = HashMap::new();
    let mut total = 0usize;
    for c in text.chars() {
        *counts.entry(c).or_insert(0) += 1;
        total += 1;
    }
    let max = counts.values().copied().max()?;
    Some(max as f64 / total as f64)
}

fn distinct_char_count(text: &str) -> usize {
    text.chars().collect::<std::collections::HashSet<_>>().len()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn guard() -> InputGuard {
        InputGuard::new(DEFAULT_MAX_LEN).unwrap()
    }

    #[test]
    fn normalize_collapses_whitespace_and_strips_nul() {
        let g = guard();
        assert_eq!(g.normalize("  hello\0   world  \n"), "hello world");
    }

    #[test]
    fn normalize_is_idempotent() {
        let g = guard();
        let once = g.normalize("  a\t\tb  ");
        let twice = g.normalize(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn short_input_is_skipped_and_allowed() {
        let g = guard();
        let result = g.guard("hi").unwrap_err();
        assert_eq!(result.method, "regex_skipped");
        assert_eq!(result.confidence, 0.5);
    }

    #[test]
    fn empty_and_single_and_double_char_all_skip() {
        let g = guard();
        for input in ["", "a", "ab"] {
            let result = g.guard(input).unwrap_err();
            assert_eq!(result.method, "regex_skipped");
        }
    }

    #[test]
    fn repetition_attack_blocks() {
        let g = guard();
        let input = "a".repeat(500);
        let result = g.guard(&input).unwrap_err();
        assert_eq!(result.method, "regex_pathological");
        assert_eq!(result.confidence, 0.95);
        assert_eq!(result.failure_class, Some(gatekeeper_policy::FailureClass::PromptInjection));
    }

    #[test]
    fn exactly_twenty_repeats_does_not_trigger_char_class() {
        let g = guard();
        // 20 repeats of a non-dominant-ratio-triggering character mixed in
        // a longer, diverse string must not hit the `{20,}` run class.
        let input = format!("{}{}", "x".repeat(20), "the quick brown fox jumps over lazy dogs 123456789!");
        let gated = g.pathological_gate(&g.normalize(&input));
        assert!(gated.is_none(), "20 repeats must not trigger the (.)\\1{{20,}} class");
    }

    #[test]
    fn twenty_one_repeats_triggers_char_class() {
        let g = guard();
        let input = format!("{}{}", "x".repeat(21), "the quick brown fox jumps over lazy dogs 123456789!");
        let gated = g.pathological_gate(&g.normalize(&input));
        assert!(gated.is_some());
    }

    #[test]
    fn sql_signature_blocks() {
        let g = guard();
        let result = g.guard("'); DROP TABLE users; --").unwrap_err();
        assert_eq!(result.method, "regex_pathological");
        assert_eq!(result.failure_class, Some(gatekeeper_policy::FailureClass::PromptInjection));
    }

    #[test]
    fn low_diversity_input_blocks() {
        let g = guard();
        let input = "ab".repeat(60); // >100 chars, only 2 distinct chars
        let result = g.guard(&input).unwrap_err();
        assert_eq!(result.method, "regex_pathological");
    }

    #[test]
    fn benign_input_passes_through() {
        let g = guard();
        let sanitized = g
            .guard("According to the retrieved document, the median is 42.")
            .unwrap();
        assert_eq!(sanitized, "According to the retrieved document, the median is 42.");
    }

    #[test]
    fn truncates_overlong_input() {
        let g = guard();
        let input = "word ".repeat(5_000);
        let sanitized = g.normalize(&input);
        assert!(sanitized.chars().count() <= DEFAULT_MAX_LEN);
    }
}
