//! Tests for expression assembly and precedence.

use std::time::Duration;

use super::*;
use crate::constraints::{ComparisonConstraint, EqualConstraint, EvalError};
use crate::value::{Actual, ObjectData, Value};

#[test]
fn test_single_leaf() {
    let constraint = expect().equal_to(5).resolve().unwrap();
    assert!(constraint.apply_to(&Actual::of(5)).unwrap().success);
}

#[test]
fn test_not_negates() {
    let constraint = expect().not().equal_to(5).resolve().unwrap();
    assert!(!constraint.apply_to(&Actual::of(5)).unwrap().success);
    assert!(constraint.apply_to(&Actual::of(6)).unwrap().success);
}

#[test]
fn test_repeated_not_stacks() {
    let constraint = expect().not().not().equal_to(5).resolve().unwrap();
    assert!(constraint.apply_to(&Actual::of(5)).unwrap().success);
}

#[test]
fn test_and_binds_tighter_than_or() {
    // [eq 1, and, eq 2, or, eq 3] must group as (1 and 2) or 3.
    let constraint = expect()
        .equal_to(1)
        .and()
        .equal_to(2)
        .or()
        .equal_to(3)
        .resolve()
        .unwrap();
    // 3 satisfies the right leg of the or; under the wrong grouping
    // 1 and (2 or 3) nothing satisfies the left leg.
    assert!(constraint.apply_to(&Actual::of(3)).unwrap().success);
    assert!(!constraint.apply_to(&Actual::of(1)).unwrap().success);
    assert!(!constraint.apply_to(&Actual::of(2)).unwrap().success);
}

#[test]
fn test_or_then_and_grouping() {
    // [eq 1, or, eq 2, and, eq 2]: and reduces first.
    let constraint = expect()
        .equal_to(1)
        .or()
        .equal_to(2)
        .and()
        .equal_to(2)
        .resolve()
        .unwrap();
    assert!(constraint.apply_to(&Actual::of(1)).unwrap().success);
    assert!(constraint.apply_to(&Actual::of(2)).unwrap().success);
    assert!(!constraint.apply_to(&Actual::of(3)).unwrap().success);
}

#[test]
fn test_quantifier_reaches_over_and() {
    // all (gt 0 and lt 100), not (all gt 0) and (lt 100).
    let constraint = expect()
        .all()
        .greater_than(0)
        .and()
        .less_than(100)
        .resolve()
        .unwrap();
    assert!(constraint
        .apply_to(&Actual::of(vec![1, 50, 99]))
        .unwrap()
        .success);
    assert!(!constraint
        .apply_to(&Actual::of(vec![1, 150]))
        .unwrap()
        .success);
}

#[test]
fn test_binary_loosens_before_quantifier() {
    // [member 1, or, member 5, and, all, gt 0] groups as
    // (member 1 or member 5) and all gt 0.
    let constraint = expect()
        .member(1)
        .or()
        .member(5)
        .and()
        .all()
        .greater_than(0)
        .resolve()
        .unwrap();
    // Contains 1, but one element is negative: the and-leg fails.
    assert!(!constraint
        .apply_to(&Actual::of(vec![1, -1]))
        .unwrap()
        .success);
    assert!(constraint
        .apply_to(&Actual::of(vec![1, 2]))
        .unwrap()
        .success);
}

#[test]
fn test_some_and_none_quantifiers() {
    let some = expect().some().greater_than(10).resolve().unwrap();
    assert!(some.apply_to(&Actual::of(vec![1, 20])).unwrap().success);

    let none = expect().none().greater_than(10).resolve().unwrap();
    assert!(none.apply_to(&Actual::of(vec![1, 2])).unwrap().success);
    assert!(!none.apply_to(&Actual::of(vec![1, 20])).unwrap().success);
}

#[test]
fn test_bare_prop_tests_existence() {
    let constraint = expect().prop("x").resolve().unwrap();
    let point = Actual::of(Value::Object(ObjectData::with_fields(
        "Point",
        vec![("x", Value::Int(1))],
    )));
    assert!(constraint.apply_to(&point).unwrap().success);

    let missing = expect().prop("z").resolve().unwrap();
    assert!(!missing.apply_to(&point).unwrap().success);
}

#[test]
fn test_prop_scopes_following_constraint() {
    let constraint = expect().prop("x").equal_to(1).resolve().unwrap();
    let point = Actual::of(Value::Object(ObjectData::with_fields(
        "Point",
        vec![("x", Value::Int(1))],
    )));
    assert!(constraint.apply_to(&point).unwrap().success);
}

#[test]
fn test_prop_before_binary_is_existence() {
    // [prop x, and, prop y]: both reduce to existence tests.
    let constraint = expect().prop("x").and().prop("y").resolve().unwrap();
    let both = Actual::of(Value::Object(ObjectData::with_fields(
        "Point",
        vec![("x", Value::Int(1)), ("y", Value::Int(2))],
    )));
    let only_x = Actual::of(Value::Object(ObjectData::with_fields(
        "Point",
        vec![("x", Value::Int(1))],
    )));
    assert!(constraint.apply_to(&both).unwrap().success);
    assert!(!constraint.apply_to(&only_x).unwrap().success);
}

#[test]
fn test_bare_throws() {
    let constraint = expect().throws().resolve().unwrap();
    let failing = Actual::from_fn(|| Err(Value::from("boom")));
    assert!(constraint.apply_to(&failing).unwrap().success);
}

#[test]
fn test_throws_swallows_following_chain() {
    // Throws has the highest right precedence: the whole chain after it
    // applies to the thrown value.
    let constraint = expect()
        .throws()
        .contains("boom")
        .or()
        .contains("bang")
        .resolve()
        .unwrap();
    let failing = Actual::from_fn(|| Err(Value::from("bang went the parser")));
    assert!(constraint.apply_to(&failing).unwrap().success);
}

#[test]
fn test_after_polls_until_success() {
    use std::cell::Cell;
    use std::rc::Rc;

    let counter = Rc::new(Cell::new(0u32));
    let counter_in = Rc::clone(&counter);
    let actual = Actual::from_fn(move || {
        counter_in.set(counter_in.get() + 1);
        Ok(Value::Bool(counter_in.get() >= 3))
    });

    let constraint = expect()
        .after(Duration::from_secs(5), Duration::from_millis(1))
        .equal_to(true)
        .resolve()
        .unwrap();
    assert!(constraint.apply_to(&actual).unwrap().success);
    assert_eq!(counter.get(), 3);
}

#[test]
fn test_with_groups_subchain() {
    // not with (eq 1 or eq 2): with's right precedence stops or from
    // escaping the negation.
    let constraint = expect()
        .not()
        .with()
        .equal_to(1)
        .or()
        .equal_to(2)
        .resolve()
        .unwrap();
    assert!(!constraint.apply_to(&Actual::of(1)).unwrap().success);
    assert!(!constraint.apply_to(&Actual::of(2)).unwrap().success);
    assert!(constraint.apply_to(&Actual::of(3)).unwrap().success);
}

#[test]
fn test_preconfigured_leaf() {
    let constraint = expect()
        .not()
        .constraint(EqualConstraint::new(5.0).within(0.5).unwrap())
        .resolve()
        .unwrap();
    assert!(constraint.apply_to(&Actual::of(5.2)).is_ok());
    assert!(!constraint.apply_to(&Actual::of(5.2)).unwrap().success);
    assert!(constraint.apply_to(&Actual::of(6.0)).unwrap().success);
}

#[test]
fn test_trailing_prefix_is_incomplete() {
    let err = expect().not().resolve().unwrap_err();
    assert_eq!(err, BuildError::Incomplete);
}

#[test]
fn test_trailing_binary_is_incomplete() {
    let err = expect().equal_to(1).and().resolve().unwrap_err();
    assert_eq!(err, BuildError::Incomplete);
}

#[test]
fn test_empty_expression_is_incomplete() {
    let err = expect().resolve().unwrap_err();
    assert_eq!(err, BuildError::Incomplete);
}

#[test]
fn test_tree_is_reusable() {
    let constraint = expect().greater_than(0).and().less_than(10).resolve().unwrap();
    for value in [1, 5, 9] {
        assert!(constraint.apply_to(&Actual::of(value)).unwrap().success);
    }
    for value in [-1, 10, 100] {
        assert!(!constraint.apply_to(&Actual::of(value)).unwrap().success);
    }
}

#[test]
fn test_apply_to_surfaces_build_error() {
    let result = expect().not().apply_to(&Actual::of(1));
    assert!(matches!(result, Err(EvalError::Build(_))));
}

#[test]
fn test_direct_builder_token_stream() {
    // The builder accepts raw tokens without the fluent surface.
    let mut builder = ConstraintBuilder::new();
    builder
        .append_constraint(Box::new(ComparisonConstraint::greater_than(0)))
        .unwrap();
    builder.append_operator(Op::And).unwrap();
    builder
        .append_constraint(Box::new(ComparisonConstraint::less_than(10)))
        .unwrap();
    let constraint = builder.resolve().unwrap();
    assert!(constraint.apply_to(&Actual::of(5)).unwrap().success);
}
