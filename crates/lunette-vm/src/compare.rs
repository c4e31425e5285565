//! Comparison operations with Lua 5.3 semantics.

use crate::error::{LuaError, LuaResult};
use lunette_core::value::LuaValue;

/// Comparison operator, numbered as `LUA_OPEQ..LUA_OPLE`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum CompareOp {
    Eq = 0,
    Lt,
    Le,
}

impl CompareOp {
    pub fn from_u8(val: u8) -> Option<CompareOp> {
        match val {
            0 => Some(CompareOp::Eq),
            1 => Some(CompareOp::Lt),
            2 => Some(CompareOp::Le),
            _ => None,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            CompareOp::Eq => "==",
            CompareOp::Lt => "<",
            CompareOp::Le => "<=",
        }
    }
}

/// Apply `op` to two values.
pub fn compare(op: CompareOp, a: &LuaValue, b: &LuaValue) -> LuaResult<bool> {
    match op {
        CompareOp::Eq => Ok(lua_eq(a, b)),
        CompareOp::Lt => lua_lt(a, b),
        CompareOp::Le => lua_le(a, b),
    }
}

/// Lua equality: numbers compare by value across kinds, strings by
/// content. Never fails.
pub fn lua_eq(a: &LuaValue, b: &LuaValue) -> bool {
    match (a, b) {
        (LuaValue::Nil, LuaValue::Nil) => true,
        (LuaValue::Boolean(x), LuaValue::Boolean(y)) => x == y,
        (LuaValue::String(x), LuaValue::String(y)) => x == y,
        (LuaValue::Integer(x), LuaValue::Integer(y)) => x == y,
        (LuaValue::Float(x), LuaValue::Float(y)) => x == y,
        (LuaValue::Integer(i), LuaValue::Float(f)) | (LuaValue::Float(f), LuaValue::Integer(i)) => {
            *i as f64 == *f
        }
        _ => false,
    }
}

/// Lua less-than.
pub fn lua_lt(a: &LuaValue, b: &LuaValue) -> LuaResult<bool> {
    match (a, b) {
        (LuaValue::String(x), LuaValue::String(y)) => Ok(x.as_bytes() < y.as_bytes()),
        (LuaValue::Integer(x), LuaValue::Integer(y)) => Ok(x < y),
        (LuaValue::Integer(x), LuaValue::Float(y)) => Ok((*x as f64) < *y),
        (LuaValue::Float(x), LuaValue::Float(y)) => Ok(x < y),
        (LuaValue::Float(x), LuaValue::Integer(y)) => Ok(*x < *y as f64),
        _ => Err(order_error(CompareOp::Lt, a, b)),
    }
}

/// Lua less-than-or-equal.
pub fn lua_le(a: &LuaValue, b: &LuaValue) -> LuaResult<bool> {
    match (a, b) {
        (LuaValue::String(x), LuaValue::String(y)) => Ok(x.as_bytes() <= y.as_bytes()),
        (LuaValue::Integer(x), LuaValue::Integer(y)) => Ok(x <= y),
        (LuaValue::Integer(x), LuaValue::Float(y)) => Ok((*x as f64) <= *y),
        (LuaValue::Float(x), LuaValue::Float(y)) => Ok(x <= y),
        (LuaValue::Float(x), LuaValue::Integer(y)) => Ok(*x <= *y as f64),
        _ => Err(order_error(CompareOp::Le, a, b)),
    }
}

fn order_error(op: CompareOp, a: &LuaValue, b: &LuaValue) -> LuaError {
    LuaError::ComparisonTypeError {
        op,
        lhs: a.type_name(),
        rhs: b.type_name(),
    }
}
