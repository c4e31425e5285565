//! `LuaState`: the host-facing stack API.
//!
//! Mirrors the shape of the Lua 5.3 C API (`lua_gettop`, `lua_rotate`,
//! `lua_tonumberx`, `lua_arith`, ...). Indices are 1-based; negative
//! indices count down from the top.

use crate::arith::{self, ArithOp};
use crate::coerce;
use crate::compare::{self, CompareOp};
use crate::error::{LuaError, LuaResult};
use crate::stack::LuaStack;
use lunette_core::string::LuaStr;
use lunette_core::value::{LuaType, LuaValue};
use tracing::debug;

/// Initial stack capacity of a new state.
pub const DEFAULT_STACK_SIZE: usize = 20;

#[derive(Clone, Debug)]
pub struct LuaState {
    stack: LuaStack,
}

impl Default for LuaState {
    fn default() -> Self {
        Self::new()
    }
}

impl LuaState {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_STACK_SIZE)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        LuaState {
            stack: LuaStack::new(capacity),
        }
    }

    /// Live values, bottom first.
    pub fn values(&self) -> &[LuaValue] {
        self.stack.values()
    }

    /// Value at `idx` without conversion. `Nil` for invalid indices.
    pub fn get(&self, idx: isize) -> LuaValue {
        self.stack.get(idx)
    }

    // ---- Basic stack manipulation ----

    pub fn get_top(&self) -> usize {
        self.stack.top()
    }

    pub fn abs_index(&self, idx: isize) -> isize {
        self.stack.abs_index(idx)
    }

    /// Reserve room for `n` more pushes. Always succeeds.
    pub fn check_stack(&mut self, n: usize) -> bool {
        self.stack.check(n);
        true
    }

    /// Pop `n` values.
    pub fn pop(&mut self, n: usize) -> LuaResult<()> {
        if n > self.stack.top() {
            return Err(LuaError::StackUnderflow);
        }
        self.stack.set_top((self.stack.top() - n) as isize)
    }

    /// Copy the value at `from` into the slot at `to`.
    pub fn copy(&mut self, from: isize, to: isize) -> LuaResult<()> {
        let val = self.stack.get(from);
        self.stack.set(to, val)
    }

    /// Push a copy of the value at `idx`.
    pub fn push_value(&mut self, idx: isize) -> LuaResult<()> {
        let val = self.stack.get(idx);
        self.stack.push(val)
    }

    /// Pop the top value, then store it at `idx`.
    ///
    /// A relative `idx` is resolved after the pop, so `replace(-1)` writes
    /// to the new top.
    pub fn replace(&mut self, idx: isize) -> LuaResult<()> {
        let val = self.stack.pop()?;
        self.stack.set(idx, val)
    }

    /// Move the top value to `idx`, shifting the values above it up.
    pub fn insert(&mut self, idx: isize) -> LuaResult<()> {
        self.rotate(idx, 1)
    }

    /// Remove the value at `idx`, shifting the values above it down.
    pub fn remove(&mut self, idx: isize) -> LuaResult<()> {
        self.rotate(idx, -1)?;
        self.pop(1)
    }

    pub fn rotate(&mut self, idx: isize, n: isize) -> LuaResult<()> {
        self.stack.rotate(idx, n)
    }

    pub fn set_top(&mut self, idx: isize) -> LuaResult<()> {
        self.stack.set_top(idx)
    }

    // ---- Access functions (stack -> host) ----

    pub fn type_name(&self, tp: LuaType) -> &'static str {
        tp.name()
    }

    /// Type of the value at `idx`, or `LuaType::None` for an invalid index.
    pub fn type_of(&self, idx: isize) -> LuaType {
        self.stack.slot(idx).map_or(LuaType::None, LuaValue::type_of)
    }

    pub fn is_none(&self, idx: isize) -> bool {
        self.type_of(idx) == LuaType::None
    }

    pub fn is_nil(&self, idx: isize) -> bool {
        self.type_of(idx) == LuaType::Nil
    }

    pub fn is_none_or_nil(&self, idx: isize) -> bool {
        matches!(self.type_of(idx), LuaType::None | LuaType::Nil)
    }

    pub fn is_boolean(&self, idx: isize) -> bool {
        self.type_of(idx) == LuaType::Boolean
    }

    /// True only for native integers; `10.0` is not an integer.
    pub fn is_integer(&self, idx: isize) -> bool {
        self.stack.get(idx).is_integer()
    }

    /// True if the value converts to a number.
    pub fn is_number(&self, idx: isize) -> bool {
        self.to_numberx(idx).is_some()
    }

    /// True for strings and numbers (numbers convert to strings).
    pub fn is_string(&self, idx: isize) -> bool {
        matches!(self.type_of(idx), LuaType::String | LuaType::Number)
    }

    pub fn to_boolean(&self, idx: isize) -> bool {
        coerce::to_boolean(&self.stack.get(idx))
    }

    /// Convert to a float, or `0.0` on failure.
    pub fn to_number(&self, idx: isize) -> f64 {
        self.to_numberx(idx).unwrap_or(0.0)
    }

    pub fn to_numberx(&self, idx: isize) -> Option<f64> {
        self.stack.slot(idx).and_then(coerce::to_float)
    }

    /// Convert to an integer, or `0` on failure.
    pub fn to_integer(&self, idx: isize) -> i64 {
        self.to_integerx(idx).unwrap_or(0)
    }

    pub fn to_integerx(&self, idx: isize) -> Option<i64> {
        self.stack.slot(idx).and_then(coerce::to_integer)
    }

    /// Convert to a string, or the empty string on failure.
    pub fn to_string(&mut self, idx: isize) -> LuaStr {
        self.to_stringx(idx).unwrap_or_default()
    }

    /// Convert the value at `idx` to a string.
    ///
    /// A number is converted in place: its slot holds the string form
    /// afterwards, as `lua_tolstring` does.
    pub fn to_stringx(&mut self, idx: isize) -> Option<LuaStr> {
        let slot = self.stack.slot_mut(idx)?;
        let s = match &*slot {
            LuaValue::String(s) => return Some(s.clone()),
            other => coerce::to_lua_string(other)?,
        };
        *slot = LuaValue::String(s.clone());
        Some(s)
    }

    // ---- Push functions (host -> stack) ----

    pub fn push_nil(&mut self) -> LuaResult<()> {
        self.stack.push(LuaValue::Nil)
    }

    pub fn push_boolean(&mut self, b: bool) -> LuaResult<()> {
        self.stack.push(LuaValue::Boolean(b))
    }

    pub fn push_integer(&mut self, n: i64) -> LuaResult<()> {
        self.stack.push(LuaValue::Integer(n))
    }

    pub fn push_number(&mut self, n: f64) -> LuaResult<()> {
        self.stack.push(LuaValue::Float(n))
    }

    pub fn push_string(&mut self, s: impl Into<LuaStr>) -> LuaResult<()> {
        self.stack.push(LuaValue::String(s.into()))
    }

    // ---- Operators ----

    /// Pop the operand(s) of `op`, push the result.
    ///
    /// Unary operators use the top value as both operands. On a type error
    /// the operands stay popped.
    pub fn arith(&mut self, op: ArithOp) -> LuaResult<()> {
        let arity = if op.is_unary() { 1 } else { 2 };
        if self.stack.top() < arity {
            return Err(LuaError::StackUnderflow);
        }
        let b = self.stack.pop()?;
        let a = if op.is_unary() {
            b.clone()
        } else {
            self.stack.pop()?
        };
        let result = arith::arith(op, &a, &b).inspect_err(|err| {
            debug!(?op, lhs = ?a, rhs = ?b, %err, "arith failed");
        })?;
        self.stack.push(result)
    }

    /// Compare the values at two indices. Invalid indices read as `nil`.
    pub fn compare(&self, idx1: isize, idx2: isize, op: CompareOp) -> LuaResult<bool> {
        let a = self.stack.get(idx1);
        let b = self.stack.get(idx2);
        compare::compare(op, &a, &b).inspect_err(|err| {
            debug!(?op, lhs = ?a, rhs = ?b, %err, "compare failed");
        })
    }

    /// Push the length of the string at `idx`.
    pub fn len(&mut self, idx: isize) -> LuaResult<()> {
        match self.stack.get(idx) {
            LuaValue::String(s) => self.stack.push(LuaValue::Integer(s.len() as i64)),
            other => Err(LuaError::LengthTypeError {
                operand: other.type_name(),
            }),
        }
    }

    /// Pop `n` values and push their concatenation.
    ///
    /// `n == 0` pushes the empty string; `n == 1` leaves the stack alone.
    /// Otherwise numbers are converted to strings and anything else is an
    /// error that leaves the stack untouched.
    pub fn concat(&mut self, n: usize) -> LuaResult<()> {
        if n == 0 {
            return self.stack.push(LuaValue::String(LuaStr::default()));
        }
        if n > self.stack.top() {
            return Err(LuaError::StackUnderflow);
        }
        if n == 1 {
            return Ok(());
        }
        let start = self.stack.top() - n;
        let mut buf = Vec::new();
        for val in &self.stack.values()[start..] {
            let s = coerce::to_lua_string(val).ok_or(LuaError::ConcatTypeError {
                operand: val.type_name(),
            })?;
            buf.extend_from_slice(s.as_bytes());
        }
        self.pop(n)?;
        self.stack.push(LuaValue::String(LuaStr::from(buf)))
    }
}
