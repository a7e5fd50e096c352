//! Property-based tests over the whole pipeline.
//!
//! proptest generates random value trees and random text; the pipeline
//! must round-trip the former and never panic on the latter.

use proptest::prelude::*;

use jsonkit_core::{parse, stringify, tokenize, Value};

fn config() -> ProptestConfig {
    ProptestConfig {
        cases: 200,
        max_shrink_iters: 200,
        ..ProptestConfig::default()
    }
}

// =============================================================================
// Generators
// =============================================================================

fn build_array(items: Vec<Value>) -> Value {
    let array = Value::array();
    for item in items {
        array.push(item).unwrap();
    }
    array
}

fn build_object(entries: Vec<(String, Value)>) -> Value {
    let object = Value::object();
    for (key, value) in entries {
        object.insert(&key, value).unwrap();
    }
    object
}

/// Scalars that survive a textual round trip: finite floats only, and
/// printable-ASCII strings (everything else the writer escapes is
/// covered too, since `\`, `"`, and space are in the range).
fn arb_scalar() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::null()),
        any::<bool>().prop_map(Value::from),
        any::<i64>().prop_map(Value::from),
        (prop::num::f64::POSITIVE | prop::num::f64::NEGATIVE | prop::num::f64::NORMAL
            | prop::num::f64::ZERO)
            .prop_map(Value::from),
        "[ -~]{0,12}".prop_map(Value::from),
    ]
}

fn arb_tree() -> impl Strategy<Value = Value> {
    arb_scalar().prop_recursive(4, 48, 6, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..6).prop_map(build_array),
            prop::collection::vec(("[a-z_]{1,8}", inner), 0..6).prop_map(build_object),
        ]
    })
}

/// A parseable document: the top level must be a container.
fn arb_document() -> impl Strategy<Value = Value> {
    prop_oneof![
        prop::collection::vec(arb_tree(), 0..6).prop_map(build_array),
        prop::collection::vec(("[a-z_]{1,8}", arb_tree()), 0..6).prop_map(build_object),
    ]
}

// =============================================================================
// Properties
// =============================================================================

proptest! {
    #![proptest_config(config())]

    /// Writing a tree and parsing the text reproduces the tree.
    #[test]
    fn parse_inverts_stringify(document in arb_document()) {
        let text = stringify(&document).unwrap();
        let reparsed = parse(&text).unwrap();
        prop_assert_eq!(reparsed, document);
    }

    /// Canonical text is a fixed point of parse-then-stringify.
    #[test]
    fn stringify_is_idempotent(document in arb_document()) {
        let text = stringify(&document).unwrap();
        let again = stringify(&parse(&text).unwrap()).unwrap();
        prop_assert_eq!(again, text);
    }

    /// Arbitrary text may fail to tokenize or parse, but must never
    /// panic.
    #[test]
    fn pipeline_is_total_over_text(input in "[ -~\\n\\t\\r]{0,200}") {
        let _ = tokenize(&input);
        let _ = parse(&input);
    }

    /// Same for fully arbitrary Unicode input.
    #[test]
    fn pipeline_is_total_over_unicode(input in ".{0,100}") {
        let _ = parse(&input);
    }

    /// A deep clone is structurally equal but shares no nodes with the
    /// original.
    #[test]
    fn deep_clone_is_equal_and_independent(document in arb_document()) {
        let copy = document.deep_clone();
        prop_assert_eq!(&copy, &document);
        prop_assert!(!copy.same_node(&document));
    }

    /// Structural comparison is consistent with equality.
    #[test]
    fn compare_agrees_with_eq(a in arb_tree(), b in arb_tree()) {
        let equal = a == b;
        prop_assert_eq!(equal, jsonkit_core::compare(&a, &b) == std::cmp::Ordering::Equal);
    }
}
