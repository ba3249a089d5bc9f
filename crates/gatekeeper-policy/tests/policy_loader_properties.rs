use std::collections::HashSet;
use std::io::Write;

use gatekeeper_policy::{FailureClass, PolicyLoader};
use proptest::collection::hash_set;
use proptest::prelude::*;

const CLASSES: [&str; 4] = ["PROMPT_INJECTION", "TOXICITY", "BIAS", "DANGEROUS_CONTENT"];

fn write_policy(examples: &[String], owners: &[usize]) -> tempfile::NamedTempFile {
    let mut by_class: Vec<Vec<&String>> = vec![Vec::new(); CLASSES.len()];
    for (example, &owner) in examples.iter().zip(owners) {
        by_class[owner].push(example);
    }

    let mut yaml = String::from("failure_policies:\n");
    for (idx, class) in CLASSES.iter().enumerate() {
        yaml.push_str(&format!(
            "  {class}:\n    action: WARN\n    severity: MEDIUM\n    confidence_threshold: 0.5\n    examples:\n"
        ));
        for example in &by_class[idx] {
            yaml.push_str(&format!("      - {:?}\n", example));
        }
    }

    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(yaml.as_bytes()).unwrap();
    file
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 100, .. ProptestConfig::default() })]

    // Every example lands under exactly one class, for arbitrary
    // partitions of an arbitrary globally-unique example set. The loader
    // must accept the document and report back exactly the examples
    // that went in, each tagged with the class it was assigned.
    #[test]
    fn every_example_belongs_to_exactly_one_class(
        examples in hash_set("[a-z]{3,8}( [a-z]{3,8}){0,4}", 1..20),
        owner_seed in proptest::collection::vec(0usize..CLASSES.len(), 1..20),
    ) {
        let examples: Vec<String> = examples.into_iter().collect();
        let owners: Vec<usize> = owner_seed.into_iter().cycle().take(examples.len()).collect();

        let file = write_policy(&examples, &owners);
        let loader = PolicyLoader::load(file.path()).unwrap();
        let snapshot = loader.snapshot();

        let all: Vec<(FailureClass, &str)> = snapshot.all_examples().collect();
        prop_assert_eq!(all.len(), examples.len());

        let seen: HashSet<&str> = all.iter().map(|(_, text)| *text).collect();
        for example in &examples {
            prop_assert!(seen.contains(example.as_str()));
        }
    }
}
