//! Dynamically typed Lua scalar values.
//!
//! The VM core handles exactly five kinds of value: nil, booleans, 64-bit
//! integers, 64-bit floats, and byte strings. Every type predicate and
//! coercion is an exhaustive match over [`LuaValue`].

use crate::number;
use crate::string::LuaStr;
use std::fmt;

/// Basic Lua type tags, numbered as in the C API.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(i8)]
pub enum LuaType {
    /// An invalid (non-existent) stack index.
    None = -1,
    Nil = 0,
    Boolean = 1,
    Number = 3,
    String = 4,
}

impl LuaType {
    /// Human-readable type name, as returned by `type()`.
    pub fn name(self) -> &'static str {
        match self {
            LuaType::None => "no value",
            LuaType::Nil => "nil",
            LuaType::Boolean => "boolean",
            LuaType::Number => "number",
            LuaType::String => "string",
        }
    }
}

impl fmt::Display for LuaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A Lua value.
///
/// The derived `PartialEq` is structural: `Integer(1) != Float(1.0)`.
/// Language-level equality lives in the VM's comparison engine.
#[derive(Clone, Default, PartialEq)]
pub enum LuaValue {
    #[default]
    Nil,
    Boolean(bool),
    Integer(i64),
    Float(f64),
    String(LuaStr),
}

impl LuaValue {
    // ---- Constructors ----

    /// Create a string value from raw bytes.
    pub fn string(bytes: impl AsRef<[u8]>) -> Self {
        LuaValue::String(LuaStr::new(bytes.as_ref()))
    }

    // ---- Type checks ----

    /// The basic type of this value.
    pub fn type_of(&self) -> LuaType {
        match self {
            LuaValue::Nil => LuaType::Nil,
            LuaValue::Boolean(_) => LuaType::Boolean,
            LuaValue::Integer(_) | LuaValue::Float(_) => LuaType::Number,
            LuaValue::String(_) => LuaType::String,
        }
    }

    /// Type name of this value.
    pub fn type_name(&self) -> &'static str {
        self.type_of().name()
    }

    #[inline]
    pub fn is_nil(&self) -> bool {
        matches!(self, LuaValue::Nil)
    }

    #[inline]
    pub fn is_bool(&self) -> bool {
        matches!(self, LuaValue::Boolean(_))
    }

    #[inline]
    pub fn is_integer(&self) -> bool {
        matches!(self, LuaValue::Integer(_))
    }

    #[inline]
    pub fn is_float(&self) -> bool {
        matches!(self, LuaValue::Float(_))
    }

    /// Returns true if this value is a number (integer or float).
    #[inline]
    pub fn is_number(&self) -> bool {
        matches!(self, LuaValue::Integer(_) | LuaValue::Float(_))
    }

    #[inline]
    pub fn is_string(&self) -> bool {
        matches!(self, LuaValue::String(_))
    }

    /// Lua truthiness: only nil and false are falsy.
    #[inline]
    pub fn is_falsy(&self) -> bool {
        matches!(self, LuaValue::Nil | LuaValue::Boolean(false))
    }

    #[inline]
    pub fn is_truthy(&self) -> bool {
        !self.is_falsy()
    }

    // ---- Extractors (no coercion) ----

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            LuaValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            LuaValue::Integer(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            LuaValue::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&LuaStr> {
        match self {
            LuaValue::String(s) => Some(s),
            _ => None,
        }
    }
}

impl From<bool> for LuaValue {
    fn from(b: bool) -> Self {
        LuaValue::Boolean(b)
    }
}

impl From<i64> for LuaValue {
    fn from(i: i64) -> Self {
        LuaValue::Integer(i)
    }
}

impl From<f64> for LuaValue {
    fn from(f: f64) -> Self {
        LuaValue::Float(f)
    }
}

impl From<&str> for LuaValue {
    fn from(s: &str) -> Self {
        LuaValue::String(LuaStr::from(s))
    }
}

impl From<String> for LuaValue {
    fn from(s: String) -> Self {
        LuaValue::String(LuaStr::from(s))
    }
}

impl From<LuaStr> for LuaValue {
    fn from(s: LuaStr) -> Self {
        LuaValue::String(s)
    }
}

impl fmt::Debug for LuaValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LuaValue::Nil => write!(f, "nil"),
            LuaValue::Boolean(b) => write!(f, "{b}"),
            LuaValue::Integer(i) => write!(f, "{i}"),
            LuaValue::Float(x) => write!(f, "{}", number::fmt_float(*x)),
            LuaValue::String(s) => write!(f, "{s:?}"),
        }
    }
}

/// Renders as `tostring` would for the scalar kinds.
impl fmt::Display for LuaValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LuaValue::String(s) => write!(f, "{s}"),
            other => fmt::Debug::fmt(other, f),
        }
    }
}
