use super::helpers::*;
use lunette_core::value::LuaValue;
use lunette_vm::{ArithOp, LuaError, LuaState};

fn binop(op: ArithOp, a: LuaValue, b: LuaValue) -> LuaState {
    let mut l = state_with(&[a, b]);
    l.arith(op).unwrap_or_else(|e| panic!("{op:?} failed: {e}"));
    assert_eq!(l.get_top(), 1);
    l
}

// ==========================================================================
// Domain selection
// ==========================================================================

#[test]
fn arith_int_plus_int_is_int() {
    let l = binop(ArithOp::Add, int(2), int(3));
    assert_int(&l, -1, 5);
}

#[test]
fn arith_int_plus_float_is_float() {
    let l = binop(ArithOp::Add, int(2), flt(0.5));
    assert_float(&l, -1, 2.5);
}

#[test]
fn arith_true_division_is_always_float() {
    let l = binop(ArithOp::Div, int(6), int(3));
    assert_float(&l, -1, 2.0);
}

#[test]
fn arith_pow_is_always_float() {
    let l = binop(ArithOp::Pow, int(3), int(2));
    assert_float(&l, -1, 9.0);
}

#[test]
fn arith_string_operands_take_float_path() {
    let l = binop(ArithOp::Add, st("10"), int(5));
    assert_float(&l, -1, 15.0);
    let l = binop(ArithOp::Sub, st("0x10"), st(" 1 "));
    assert_float(&l, -1, 15.0);
}

#[test]
fn arith_scenario_mixed_stack() {
    init_tracing();
    let mut l = state_with(&[int(1), st("2.0"), st("3.0"), flt(4.0)]);
    assert_eq!(l.get_top(), 4);
    l.arith(ArithOp::Add).unwrap();
    assert_eq!(l.get_top(), 3);
    assert_int(&l, 1, 1);
    assert_str(&l, 2, "2.0");
    assert_float(&l, 3, 7.0);
}

// ==========================================================================
// Floor division and modulo
// ==========================================================================

#[test]
fn arith_integer_floor_division() {
    for (a, b, q) in [(7, 2, 3), (-7, 2, -4), (-7, -2, 3), (7, -2, -4), (6, 3, 2)] {
        let l = binop(ArithOp::IDiv, int(a), int(b));
        assert_int(&l, -1, q);
    }
}

#[test]
fn arith_integer_modulo_takes_divisor_sign() {
    for (a, b, r) in [(-7, 2, 1), (7, -2, -1), (7, 2, 1), (-7, -2, -1), (6, 3, 0)] {
        let l = binop(ArithOp::Mod, int(a), int(b));
        assert_int(&l, -1, r);
    }
}

#[test]
fn arith_float_floor_division_and_modulo() {
    let l = binop(ArithOp::IDiv, flt(7.5), int(2));
    assert_float(&l, -1, 3.0);
    let l = binop(ArithOp::Mod, flt(-5.5), int(2));
    assert_float(&l, -1, 0.5);
    let l = binop(ArithOp::Mod, int(5), flt(f64::INFINITY));
    assert_float(&l, -1, 5.0);
}

#[test]
fn arith_integer_division_by_zero_fails() {
    let mut l = state_with(&[int(1), int(0)]);
    assert_eq!(
        l.arith(ArithOp::IDiv),
        Err(LuaError::DivideByZero { op: ArithOp::IDiv })
    );
    assert_eq!(l.get_top(), 0);

    let l = binop(ArithOp::Div, int(1), int(0));
    assert_eq!(l.get(-1), flt(f64::INFINITY));
}

// ==========================================================================
// Bitwise
// ==========================================================================

#[test]
fn arith_shifts_normalise_counts() {
    let l = binop(ArithOp::Shl, int(1), int(63));
    assert_int(&l, -1, i64::MIN);
    let l = binop(ArithOp::Shl, int(1), int(64));
    assert_int(&l, -1, 0);
    let l = binop(ArithOp::Shr, int(-1), int(60));
    assert_int(&l, -1, 0xF);
    let l = binop(ArithOp::Shl, int(16), int(-2));
    assert_int(&l, -1, 4);
    let l = binop(ArithOp::Shr, int(1), int(-3));
    assert_int(&l, -1, 8);
}

#[test]
fn arith_bitwise_accepts_integral_floats_and_strings() {
    let l = binop(ArithOp::BXor, flt(6.0), st("3"));
    assert_int(&l, -1, 5);
}

#[test]
fn arith_bitwise_rejects_fractions() {
    let mut l = state_with(&[flt(1.5), int(1)]);
    let err = l.arith(ArithOp::BAnd).unwrap_err();
    assert_eq!(err.to_string(), "number has no integer representation");
}

// ==========================================================================
// Unary operators
// ==========================================================================

#[test]
fn arith_unary_pops_one_operand() {
    let mut l = state_with(&[int(9), int(4)]);
    l.arith(ArithOp::Unm).unwrap();
    assert_eq!(l.get_top(), 2);
    assert_int(&l, -1, -4);
    l.arith(ArithOp::BNot).unwrap();
    assert_int(&l, -1, 3);
    assert_int(&l, 1, 9);

    let mut l = state_with(&[st("2.5")]);
    l.arith(ArithOp::Unm).unwrap();
    assert_float(&l, -1, -2.5);
}

// ==========================================================================
// Errors
// ==========================================================================

#[test]
fn arith_type_error_message() {
    let mut l = state_with(&[int(1), st("abc")]);
    let err = l.arith(ArithOp::Mul).unwrap_err();
    assert_eq!(err.to_string(), "attempt to perform arithmetic on a string value");
    assert_eq!(l.get_top(), 0);

    let mut l = state_with(&[true.into()]);
    let err = l.arith(ArithOp::BNot).unwrap_err();
    assert_eq!(
        err.to_string(),
        "attempt to perform bitwise operation on a boolean value"
    );
}
