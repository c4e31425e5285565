//! Type coercion helpers for Lua 5.3 semantics.

use lunette_core::number;
use lunette_core::string::LuaStr;
use lunette_core::value::LuaValue;

/// Lua truthiness: only nil and false are false.
pub fn to_boolean(v: &LuaValue) -> bool {
    v.is_truthy()
}

/// Try to convert a value to f64.
/// Integers widen; strings that look like numbers also convert.
pub fn to_float(v: &LuaValue) -> Option<f64> {
    match v {
        LuaValue::Float(f) => Some(*f),
        LuaValue::Integer(i) => Some(*i as f64),
        LuaValue::String(s) => number::str_to_float(s.as_bytes()),
        _ => None,
    }
}

/// Try to convert a value to i64.
/// Floats convert only when integral and in range.
pub fn to_integer(v: &LuaValue) -> Option<i64> {
    match v {
        LuaValue::Integer(i) => Some(*i),
        LuaValue::Float(f) => number::float_to_integer(*f),
        LuaValue::String(s) => string_to_integer(s),
        _ => None,
    }
}

fn string_to_integer(s: &LuaStr) -> Option<i64> {
    // "3.0" is an integer too.
    number::str_to_integer(s.as_bytes())
        .or_else(|| number::str_to_float(s.as_bytes()).and_then(number::float_to_integer))
}

/// Render a value as a string. Numbers are formatted; other non-strings
/// have no string form.
pub fn to_lua_string(v: &LuaValue) -> Option<LuaStr> {
    match v {
        LuaValue::String(s) => Some(s.clone()),
        LuaValue::Integer(i) => Some(LuaStr::from(number::fmt_integer(*i))),
        LuaValue::Float(f) => Some(LuaStr::from(number::fmt_float(*f))),
        _ => None,
    }
}
