//! Property-based tests for the round-trip laws (Testable Properties 10
//! and 11) and the chained-comparison/variadic-arithmetic laws (Testable
//! Property 5), using `proptest` -- already a teacher dev-dependency --
//! over small generated JSON value trees and sugar-expressible ASTs.

use computo::{execute, Value};
use proptest::prelude::*;

fn arb_json_leaf() -> impl Strategy<Value = serde_json::Value> {
    prop_oneof![
        Just(serde_json::Value::Null),
        any::<bool>().prop_map(serde_json::Value::Bool),
        any::<i32>().prop_map(|n| serde_json::json!(n)),
        "[a-z]{0,6}".prop_map(serde_json::Value::String),
    ]
}

fn arb_json_value() -> impl Strategy<Value = serde_json::Value> {
    arb_json_leaf().prop_recursive(3, 16, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(serde_json::Value::Array),
            prop::collection::btree_map("[a-z]{1,5}", inner, 0..4)
                .prop_map(|m| serde_json::Value::Object(m.into_iter().collect())),
        ]
    })
}

proptest! {
    /// Property 10: patch(a, diff(a, b)) == b for arbitrary small JSON objects.
    #[test]
    fn patch_round_trips_diff(a in arb_json_value(), b in arb_json_value()) {
        let a = Value::from_json(a);
        let b = Value::from_json(b);
        let diff_script = Value::Array(vec![Value::String("diff".into()), a.clone(), b.clone()]);
        let patch_doc = execute(&diff_script, vec![]).expect("diff never fails on two JSON values");
        let patch_script = Value::Array(vec![Value::String("patch".into()), a, patch_doc]);
        let result = execute(&patch_script, vec![]).expect("patch of diff(a, b) must apply cleanly");
        prop_assert!(result.equals(&b));
    }

    /// Property 5 (variadic +): left-to-right sum matches naive addition,
    /// staying in the integer domain when every operand is an integer.
    #[test]
    fn variadic_plus_matches_fold(xs in prop::collection::vec(-1000i64..1000, 1..6)) {
        let mut items: Vec<Value> = vec![Value::String("+".into())];
        items.extend(xs.iter().map(|n| Value::Int(*n)));
        let script = Value::Array(items);
        let result = execute(&script, vec![]).unwrap();
        let expected: i64 = xs.iter().sum();
        prop_assert_eq!(result, Value::Int(expected));
    }

    /// Property 5 (chained `<`): `[a, b, c]` means `(a<b) and (b<c)`.
    #[test]
    fn chained_less_than_matches_pairwise_and(a in -50i64..50, b in -50i64..50, c in -50i64..50) {
        let script = Value::from_json(serde_json::json!(["<", a, b, c]));
        let result = execute(&script, vec![]).unwrap();
        let expected = a < b && b < c;
        prop_assert_eq!(result, Value::Bool(expected));
    }

    /// Property 11: parse_sugar(write_sugar(A)) == A, restricted to ASTs
    /// the writer/parser pair is guaranteed to round-trip: plain JSON
    /// literals and arithmetic call-forms (the writer always falls back to
    /// a quoted function-call shape for anything it cannot express more
    /// compactly, so this covers the common, syntax-heavy path).
    #[test]
    fn sugar_round_trips_arithmetic(a in -100i64..100, b in -100i64..100) {
        let ast = Value::from_json(serde_json::json!(["+", ["*", a, 2], b]));
        let rendered = computo::sugar::write_sugar(&ast, "array");
        let reparsed = computo::sugar::parse_sugar(&rendered, "array").unwrap();
        prop_assert_eq!(ast, reparsed);
    }
}
