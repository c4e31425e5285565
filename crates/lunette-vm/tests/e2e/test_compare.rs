use super::helpers::*;
use lunette_core::value::LuaValue;
use lunette_vm::{CompareOp, LuaError};

#[test]
fn compare_int_equals_float() {
    let l = state_with(&[int(10), flt(10.0)]);
    assert_eq!(l.compare(1, 2, CompareOp::Eq), Ok(true));
    assert_eq!(l.compare(-1, -2, CompareOp::Eq), Ok(true));
}

#[test]
fn compare_string_never_equals_number() {
    let l = state_with(&[st("10"), int(10)]);
    assert_eq!(l.compare(1, 2, CompareOp::Eq), Ok(false));
}

#[test]
fn compare_equality_across_kinds_never_fails() {
    let l = state_with(&[LuaValue::Nil, false.into(), int(0), st("")]);
    for i in 1..=4 {
        for j in 1..=4 {
            assert_eq!(l.compare(i, j, CompareOp::Eq), Ok(i == j), "{i} == {j}");
        }
    }
}

#[test]
fn compare_numbers_order_across_kinds() {
    let l = state_with(&[int(1), flt(1.5), int(2)]);
    assert_eq!(l.compare(1, 2, CompareOp::Lt), Ok(true));
    assert_eq!(l.compare(2, 3, CompareOp::Lt), Ok(true));
    assert_eq!(l.compare(3, 2, CompareOp::Le), Ok(false));
    assert_eq!(l.compare(2, 1, CompareOp::Lt), Ok(false));
    assert_eq!(l.compare(1, 1, CompareOp::Le), Ok(true));
    assert_eq!(l.compare(1, 1, CompareOp::Lt), Ok(false));
}

#[test]
fn compare_strings_bytewise() {
    let l = state_with(&[st("apple"), st("banana"), st("apple")]);
    assert_eq!(l.compare(1, 2, CompareOp::Lt), Ok(true));
    assert_eq!(l.compare(1, 3, CompareOp::Le), Ok(true));
    assert_eq!(l.compare(1, 3, CompareOp::Lt), Ok(false));
    assert_eq!(l.compare(2, 1, CompareOp::Le), Ok(false));
}

#[test]
fn compare_float_left_operand_is_ordered() {
    let l = state_with(&[flt(2.5), int(3), flt(3.0)]);
    assert_eq!(l.compare(1, 2, CompareOp::Lt), Ok(true));
    assert_eq!(l.compare(3, 2, CompareOp::Lt), Ok(false));
    assert_eq!(l.compare(3, 2, CompareOp::Le), Ok(true));
}

#[test]
fn compare_mixed_string_number_order_fails() {
    let l = state_with(&[int(1), st("2")]);
    let err = l.compare(1, 2, CompareOp::Lt).unwrap_err();
    assert_eq!(
        err,
        LuaError::ComparisonTypeError {
            op: CompareOp::Lt,
            lhs: "number",
            rhs: "string"
        }
    );
    assert_eq!(err.to_string(), "attempt to compare number with string");
}

#[test]
fn compare_booleans_order_fails() {
    let l = state_with(&[true.into(), false.into()]);
    let err = l.compare(1, 2, CompareOp::Le).unwrap_err();
    assert_eq!(err.to_string(), "attempt to compare two boolean values");
}

#[test]
fn compare_does_not_touch_stack() {
    let l = state_with(&[int(1), int(2)]);
    let before = l.values().to_vec();
    let _ = l.compare(1, 2, CompareOp::Lt);
    assert_eq!(l.values(), before.as_slice());
}
