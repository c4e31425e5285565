//! Arithmetic and bitwise operations with Lua 5.3 semantics.

use crate::coerce;
use crate::error::{LuaError, LuaResult};
use lunette_core::number;
use lunette_core::value::LuaValue;

/// Arithmetic operation enum, numbered as `LUA_OPADD..LUA_OPBNOT`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ArithOp {
    Add = 0,
    Sub,
    Mul,
    Mod,
    Pow,
    Div,
    IDiv,
    BAnd,
    BOr,
    BXor,
    Shl,
    Shr,
    Unm,
    BNot,
}

/// How an operator chooses between the integer and float domains.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Domain {
    /// Integer only: operands must convert to integers.
    Integer,
    /// Integer when both operands are integers, float otherwise.
    Mixed,
    /// Float only, even for two integers.
    Float,
}

impl ArithOp {
    /// All operators, in numbering order.
    pub const ALL: [ArithOp; 14] = [
        ArithOp::Add,
        ArithOp::Sub,
        ArithOp::Mul,
        ArithOp::Mod,
        ArithOp::Pow,
        ArithOp::Div,
        ArithOp::IDiv,
        ArithOp::BAnd,
        ArithOp::BOr,
        ArithOp::BXor,
        ArithOp::Shl,
        ArithOp::Shr,
        ArithOp::Unm,
        ArithOp::BNot,
    ];

    /// Get the operator from its C API number.
    pub fn from_u8(val: u8) -> Option<ArithOp> {
        Self::ALL.get(val as usize).copied()
    }

    /// Unary operators consume a single stack operand.
    pub fn is_unary(self) -> bool {
        matches!(self, ArithOp::Unm | ArithOp::BNot)
    }

    pub fn is_bitwise(self) -> bool {
        self.domain() == Domain::Integer
    }

    /// Source-level spelling of the operator.
    pub fn symbol(self) -> &'static str {
        match self {
            ArithOp::Add => "+",
            ArithOp::Sub | ArithOp::Unm => "-",
            ArithOp::Mul => "*",
            ArithOp::Mod => "%",
            ArithOp::Pow => "^",
            ArithOp::Div => "/",
            ArithOp::IDiv => "//",
            ArithOp::BAnd => "&",
            ArithOp::BOr => "|",
            ArithOp::BXor | ArithOp::BNot => "~",
            ArithOp::Shl => "<<",
            ArithOp::Shr => ">>",
        }
    }

    fn domain(self) -> Domain {
        match self {
            ArithOp::BAnd
            | ArithOp::BOr
            | ArithOp::BXor
            | ArithOp::Shl
            | ArithOp::Shr
            | ArithOp::BNot => Domain::Integer,
            ArithOp::Pow | ArithOp::Div => Domain::Float,
            ArithOp::Add
            | ArithOp::Sub
            | ArithOp::Mul
            | ArithOp::Mod
            | ArithOp::IDiv
            | ArithOp::Unm => Domain::Mixed,
        }
    }
}

/// Apply `op` to two operands. Unary operators ignore `b` by convention
/// (callers pass the operand twice).
pub fn arith(op: ArithOp, a: &LuaValue, b: &LuaValue) -> LuaResult<LuaValue> {
    match op.domain() {
        Domain::Integer => {
            let x = coerce::to_integer(a).ok_or_else(|| type_error(op, a))?;
            let y = coerce::to_integer(b).ok_or_else(|| type_error(op, b))?;
            int_arith(op, x, y).map(LuaValue::Integer)
        }
        Domain::Mixed => {
            // Only native integers take the integer path; numeric strings
            // go through float.
            if let (LuaValue::Integer(x), LuaValue::Integer(y)) = (a, b) {
                return int_arith(op, *x, *y).map(LuaValue::Integer);
            }
            float_operands(op, a, b).map(|(x, y)| LuaValue::Float(float_arith(op, x, y)))
        }
        Domain::Float => {
            float_operands(op, a, b).map(|(x, y)| LuaValue::Float(float_arith(op, x, y)))
        }
    }
}

fn float_operands(op: ArithOp, a: &LuaValue, b: &LuaValue) -> LuaResult<(f64, f64)> {
    let x = coerce::to_float(a).ok_or_else(|| type_error(op, a))?;
    let y = coerce::to_float(b).ok_or_else(|| type_error(op, b))?;
    Ok((x, y))
}

fn type_error(op: ArithOp, operand: &LuaValue) -> LuaError {
    LuaError::ArithmeticTypeError {
        op,
        operand: operand.type_name(),
    }
}

/// Integer arithmetic. Add/sub/mul/negate wrap on overflow.
fn int_arith(op: ArithOp, a: i64, b: i64) -> LuaResult<i64> {
    Ok(match op {
        ArithOp::Add => a.wrapping_add(b),
        ArithOp::Sub => a.wrapping_sub(b),
        ArithOp::Mul => a.wrapping_mul(b),
        ArithOp::IDiv => number::ifloor_div(a, b).ok_or(LuaError::DivideByZero { op })?,
        ArithOp::Mod => number::imod(a, b).ok_or(LuaError::DivideByZero { op })?,
        ArithOp::BAnd => a & b,
        ArithOp::BOr => a | b,
        ArithOp::BXor => a ^ b,
        ArithOp::Shl => number::shift_left(a, b),
        ArithOp::Shr => number::shift_right(a, b),
        ArithOp::Unm => a.wrapping_neg(),
        ArithOp::BNot => !a,
        ArithOp::Pow | ArithOp::Div => unreachable!("{op:?} is float-only"),
    })
}

/// Float arithmetic. Division by zero follows IEEE 754.
fn float_arith(op: ArithOp, a: f64, b: f64) -> f64 {
    match op {
        ArithOp::Add => a + b,
        ArithOp::Sub => a - b,
        ArithOp::Mul => a * b,
        ArithOp::Div => a / b,
        ArithOp::Pow => a.powf(b),
        ArithOp::IDiv => number::ffloor_div(a, b),
        ArithOp::Mod => number::fmod(a, b),
        ArithOp::Unm => -a,
        ArithOp::BAnd
        | ArithOp::BOr
        | ArithOp::BXor
        | ArithOp::Shl
        | ArithOp::Shr
        | ArithOp::BNot => unreachable!("{op:?} is integer-only"),
    }
}
