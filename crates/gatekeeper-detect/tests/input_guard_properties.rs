use gatekeeper_detect::InputGuard;
use proptest::prelude::*;

proptest! {
    #![proptest_config(ProptestConfig { cases: 200, .. ProptestConfig::default() })]

    // normalize() is idempotent (§8): re-running it on its own output must
    // be a no-op, for any input shape the guard can receive.
    #[test]
    fn normalize_is_idempotent(text in ".{0,500}") {
        let guard = InputGuard::new(200).unwrap();
        let once = guard.normalize(&text);
        let twice = guard.normalize(&once);
        prop_assert_eq!(once, twice);
    }

    // Normalized output never exceeds the configured cap, regardless of
    // how much whitespace or how many NUL bytes the input carries.
    #[test]
    fn normalize_respects_max_len(text in "[ \0a-zA-Z]{0,2000}") {
        let guard = InputGuard::new(50).unwrap();
        let normalized = guard.normalize(&text);
        prop_assert!(normalized.chars().count() <= 50);
    }
}
