//! The value stack: 1-based indexing, relative indices, and rotation.
//!
//! Slots `[0, top)` are live. Slots at or above `top` are reserved
//! capacity and always hold `Nil`.

use crate::error::{LuaError, LuaResult};
use lunette_core::value::LuaValue;
use tracing::trace;

#[derive(Clone, Debug, Default)]
pub struct LuaStack {
    /// Backing storage. `slots.len()` is the capacity.
    slots: Vec<LuaValue>,
    /// Number of live slots; also the absolute index of the top value.
    top: usize,
}

impl LuaStack {
    /// Create an empty stack with room for `capacity` pushes.
    pub fn new(capacity: usize) -> Self {
        LuaStack {
            slots: vec![LuaValue::Nil; capacity],
            top: 0,
        }
    }

    #[inline]
    pub fn top(&self) -> usize {
        self.top
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Number of pushes possible before `check` is needed again.
    #[inline]
    pub fn free(&self) -> usize {
        self.slots.len() - self.top
    }

    /// Ensure room for at least `n` more pushes. Never shrinks.
    pub fn check(&mut self, n: usize) {
        let free = self.free();
        if free < n {
            let grow = n - free;
            self.slots.resize(self.slots.len() + grow, LuaValue::Nil);
            trace!(grow, capacity = self.slots.len(), "stack grown");
        }
    }

    pub fn push(&mut self, val: LuaValue) -> LuaResult<()> {
        if self.top == self.slots.len() {
            return Err(LuaError::StackOverflow);
        }
        self.slots[self.top] = val;
        self.top += 1;
        Ok(())
    }

    /// Pop the top value, clearing its slot.
    pub fn pop(&mut self) -> LuaResult<LuaValue> {
        if self.top == 0 {
            return Err(LuaError::StackUnderflow);
        }
        self.top -= 1;
        Ok(std::mem::take(&mut self.slots[self.top]))
    }

    /// Convert a relative (negative) index to an absolute one.
    /// The result may be zero or negative if `idx` reaches below the base.
    #[inline]
    pub fn abs_index(&self, idx: isize) -> isize {
        if idx >= 0 {
            idx
        } else {
            idx + self.top as isize + 1
        }
    }

    #[inline]
    pub fn is_valid(&self, idx: isize) -> bool {
        let abs = self.abs_index(idx);
        abs > 0 && abs as usize <= self.top
    }

    /// Storage position of a valid index.
    fn slot_pos(&self, idx: isize) -> Option<usize> {
        self.is_valid(idx).then(|| self.abs_index(idx) as usize - 1)
    }

    /// Borrow the value at `idx`, if the index is valid.
    pub fn slot(&self, idx: isize) -> Option<&LuaValue> {
        self.slot_pos(idx).map(|pos| &self.slots[pos])
    }

    pub fn slot_mut(&mut self, idx: isize) -> Option<&mut LuaValue> {
        self.slot_pos(idx).map(|pos| &mut self.slots[pos])
    }

    /// Value at `idx`, or `Nil` for any invalid index.
    pub fn get(&self, idx: isize) -> LuaValue {
        self.slot(idx).cloned().unwrap_or_default()
    }

    pub fn set(&mut self, idx: isize, val: LuaValue) -> LuaResult<()> {
        let pos = self.slot_pos(idx).ok_or(LuaError::InvalidIndex(idx))?;
        self.slots[pos] = val;
        Ok(())
    }

    /// Reverse storage positions `[from, to]`. Empty when `from >= to`.
    fn reverse(&mut self, from: usize, to: usize) {
        if from < to {
            self.slots[from..=to].reverse();
        }
    }

    /// Rotate `[idx, top]` by `n` positions toward the top (`n > 0`) or
    /// toward the base (`n < 0`).
    pub fn rotate(&mut self, idx: isize, n: isize) -> LuaResult<()> {
        let p = self.slot_pos(idx).ok_or(LuaError::InvalidIndex(idx))?;
        let t = self.top - 1;
        // Rotating by the segment length is the identity; keep the sign.
        let n = n % (t - p + 1) as isize;
        let m = if n >= 0 {
            t - n as usize
        } else {
            p + n.unsigned_abs() - 1
        };
        self.reverse(p, m);
        self.reverse(m + 1, t);
        self.reverse(p, t);
        Ok(())
    }

    /// Move the top to `idx`, popping or filling with `Nil` as needed.
    pub fn set_top(&mut self, idx: isize) -> LuaResult<()> {
        let new_top = self.abs_index(idx);
        if new_top < 0 {
            return Err(LuaError::StackUnderflow);
        }
        let new_top = new_top as usize;
        if new_top > self.slots.len() {
            return Err(LuaError::StackOverflow);
        }
        while self.top > new_top {
            self.pop()?;
        }
        while self.top < new_top {
            self.push(LuaValue::Nil)?;
        }
        Ok(())
    }

    /// Live values, bottom first.
    pub fn values(&self) -> &[LuaValue] {
        &self.slots[..self.top]
    }
}
