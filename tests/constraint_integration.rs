//! End-to-end tests: fluent chains, the standalone comparer, and the
//! algebraic properties of the engine.

use std::time::Duration;

use proptest::prelude::*;

use veracity::constraints::{CollectionEquivalentConstraint, EqualConstraint};
use veracity::{
    compare, expect, Actual, Comparer, Constraint, Coordinate, Renderer, TextRenderer, Tolerance,
    Value,
};

// =============================================================================
// Scenarios
// =============================================================================

#[test]
fn full_chain_over_object_graph() {
    let order = Value::from(serde_json::json!({
        "id": 42,
        "status": "shipped",
        "items": [1, 2, 3],
    }));

    let constraint = expect()
        .prop("status")
        .equal_to("shipped")
        .and()
        .prop("id")
        .greater_than(0)
        .resolve()
        .unwrap();
    assert!(constraint.apply_to(&Actual::of(order)).unwrap().success);
}

#[test]
fn numeric_cross_representation_scenarios() {
    assert!(compare(&Value::Int(1), &Value::UInt(1)).unwrap().equal);
    assert!(compare(&Value::Int(1), &Value::Float(1.0)).unwrap().equal);
    assert!(!compare(&Value::Int(1), &Value::from("1")).unwrap().equal);
}

#[test]
fn subset_of_longer_sequence() {
    let constraint = expect()
        .subset_of(vec![1, 2, 3, 4, 5])
        .resolve()
        .unwrap();
    assert!(constraint
        .apply_to(&Actual::of(vec![2, 4, 5]))
        .unwrap()
        .success);

    let reversed = expect().subset_of(vec![2, 4, 5]).resolve().unwrap();
    assert!(!reversed
        .apply_to(&Actual::of(vec![1, 2, 3, 4, 5]))
        .unwrap()
        .success);
}

#[test]
fn multirank_mismatch_renders_coordinates() {
    let constraint = EqualConstraint::new(Value::array2(vec![vec![1, 2], vec![3, 4]]));
    let result = constraint
        .apply_to(&Actual::of(Value::array2(vec![vec![1, 2], vec![3, 0]])))
        .unwrap();
    assert!(!result.success);
    assert_eq!(
        result.failure_path[0].coordinate,
        Coordinate::MultiIndex(vec![1, 1])
    );

    let text = TextRenderer.render(&result);
    assert!(text.contains("at [1][1]"));
}

#[test]
fn jagged_mismatch_appends_nested_coordinate() {
    let expected = Value::from(vec![Value::from(vec![1, 2]), Value::from(vec![3, 4])]);
    let actual = Value::from(vec![Value::from(vec![1, 2]), Value::from(vec![3, 0, 9])]);
    let result = compare(&expected, &actual).unwrap();
    assert!(!result.equal);
    // Outer position first, then the inner list's own coordinate.
    assert_eq!(result.failure_points[0].coordinate, Coordinate::Index(1));
    assert_eq!(result.failure_points[1].coordinate, Coordinate::Index(1));
}

#[test]
fn throws_chain_inspects_error_value() {
    let failing = Actual::from_fn(|| {
        Err(Value::from(serde_json::json!({
            "kind": "Timeout",
            "message": "deadline exceeded after 30s",
        })))
    });

    let constraint = expect()
        .throws()
        .prop("message")
        .contains("deadline")
        .resolve()
        .unwrap();
    assert!(constraint.apply_to(&failing).unwrap().success);
}

#[test]
fn delayed_chain_observes_flipping_state() {
    use std::cell::Cell;
    use std::rc::Rc;

    let polls = Rc::new(Cell::new(0u32));
    let polls_in = Rc::clone(&polls);
    let actual = Actual::from_fn(move || {
        polls_in.set(polls_in.get() + 1);
        Ok(Value::Int(if polls_in.get() >= 4 { 200 } else { 0 }))
    });

    let constraint = expect()
        .after(Duration::from_secs(5), Duration::from_millis(1))
        .equal_to(200)
        .resolve()
        .unwrap();
    assert!(constraint.apply_to(&actual).unwrap().success);
    assert_eq!(polls.get(), 4);
}

#[test]
fn byte_content_from_disk_compares_by_offset() {
    let dir = tempfile::tempdir().unwrap();
    let path_a = dir.path().join("a.bin");
    let path_b = dir.path().join("b.bin");
    std::fs::write(&path_a, [0u8, 1, 2, 3]).unwrap();
    std::fs::write(&path_b, [0u8, 1, 9, 3]).unwrap();

    let expected = Value::Bytes(std::fs::read(&path_a).unwrap());
    let actual = Value::Bytes(std::fs::read(&path_b).unwrap());
    let result = compare(&expected, &actual).unwrap();
    assert!(!result.equal);
    assert_eq!(result.failure_points[0].coordinate, Coordinate::ByteOffset(2));
}

// =============================================================================
// Properties
// =============================================================================

fn scalar_value() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(Value::Int),
        any::<u64>().prop_map(Value::UInt),
        any::<f64>().prop_map(Value::Float),
        "[a-z]{0,8}".prop_map(Value::from),
    ]
}

fn nested_value() -> impl Strategy<Value = Value> {
    scalar_value().prop_recursive(3, 24, 6, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..6).prop_map(Value::List),
            prop::collection::btree_map("[a-z]{1,4}", inner, 0..4).prop_map(|entries| {
                Value::Map(
                    entries
                        .into_iter()
                        .map(|(k, v)| (Value::Str(k), v))
                        .collect(),
                )
            }),
        ]
    })
}

proptest! {
    #[test]
    fn prop_compare_is_reflexive(v in nested_value()) {
        // Includes NaN, which equals itself by convention.
        prop_assert!(compare(&v, &v).unwrap().equal);
    }

    #[test]
    fn prop_linear_tolerance_is_symmetric(a in -1000i64..1000, b in -1000i64..1000, t in 0i64..100) {
        let tol = Tolerance::new(t);
        let forward = Comparer::new()
            .are_equal(&Value::Int(a), &Value::Int(b), &tol)
            .unwrap();
        let backward = Comparer::new()
            .are_equal(&Value::Int(b), &Value::Int(a), &tol)
            .unwrap();
        prop_assert_eq!(forward, backward);
    }

    #[test]
    fn prop_equivalence_ignores_order(items in prop::collection::vec(0i64..10, 0..8)) {
        let mut reversed = items.clone();
        reversed.reverse();
        let constraint = CollectionEquivalentConstraint::new(
            items.into_iter().map(Value::Int).collect::<Vec<_>>(),
        );
        let actual = Actual::of(reversed.into_iter().map(Value::Int).collect::<Vec<_>>());
        prop_assert!(constraint.apply_to(&actual).unwrap().success);
    }

    #[test]
    fn prop_extra_occurrence_breaks_equivalence(items in prop::collection::vec(0i64..10, 1..8)) {
        let mut padded = items.clone();
        padded.push(items[0]);
        let constraint = CollectionEquivalentConstraint::new(
            items.into_iter().map(Value::Int).collect::<Vec<_>>(),
        );
        let actual = Actual::of(padded.into_iter().map(Value::Int).collect::<Vec<_>>());
        prop_assert!(!constraint.apply_to(&actual).unwrap().success);
    }

    #[test]
    fn prop_double_negation_preserves_polarity(expected in -5i64..5, actual in -5i64..5) {
        let plain = expect().equal_to(expected).resolve().unwrap();
        let doubled = expect().not().not().equal_to(expected).resolve().unwrap();
        let value = Actual::of(actual);
        prop_assert_eq!(
            plain.apply_to(&value).unwrap().success,
            doubled.apply_to(&value).unwrap().success
        );
    }

    #[test]
    fn prop_and_binds_tighter_than_or(x in 1i64..4, v in 1i64..4) {
        // [eq x, and, eq x, or, eq 3] groups as (x and x) or 3.
        let chained = expect()
            .equal_to(x)
            .and()
            .equal_to(x)
            .or()
            .equal_to(3)
            .resolve()
            .unwrap();
        let explicit = (v == x && v == x) || v == 3;
        prop_assert_eq!(
            chained.apply_to(&Actual::of(v)).unwrap().success,
            explicit
        );
    }
}
