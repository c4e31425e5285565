//! Error types for chunk loading and state operations.

use crate::arith::ArithOp;
use crate::compare::CompareOp;
use thiserror::Error;

/// Result alias for state operations.
pub type LuaResult<T> = Result<T, LuaError>;

/// An error raised by a [`LuaState`](crate::state::LuaState) operation.
///
/// All of these abort the current operation only; the state stays usable.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum LuaError {
    /// A push found no reserved capacity. Call `check_stack` first.
    #[error("stack overflow")]
    StackOverflow,
    /// A pop on an empty stack, or `set_top` to a negative height.
    #[error("stack underflow")]
    StackUnderflow,
    /// A write or rotation addressed a slot outside `[1, top]`.
    #[error("invalid index {0}")]
    InvalidIndex(isize),
    /// No numeric interpretation exists for an operand.
    #[error("{}", arith_message(.op, .operand))]
    ArithmeticTypeError { op: ArithOp, operand: &'static str },
    /// Integer `//` or `%` with a zero divisor.
    #[error("attempt to perform 'n{}0'", .op.symbol())]
    DivideByZero { op: ArithOp },
    /// Ordering between values that have none.
    #[error("{}", compare_message(.lhs, .rhs))]
    ComparisonTypeError {
        op: CompareOp,
        lhs: &'static str,
        rhs: &'static str,
    },
    #[error("attempt to get length of a {operand} value")]
    LengthTypeError { operand: &'static str },
    #[error("attempt to concatenate a {operand} value")]
    ConcatTypeError { operand: &'static str },
}

fn arith_message(op: &ArithOp, operand: &str) -> String {
    if op.is_bitwise() {
        if operand == "number" {
            "number has no integer representation".to_string()
        } else {
            format!("attempt to perform bitwise operation on a {operand} value")
        }
    } else {
        format!("attempt to perform arithmetic on a {operand} value")
    }
}

fn compare_message(lhs: &str, rhs: &str) -> String {
    if lhs == rhs {
        format!("attempt to compare two {lhs} values")
    } else {
        format!("attempt to compare {lhs} with {rhs}")
    }
}

/// A fixed field of the binary chunk header.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HeaderField {
    Signature,
    Version,
    Format,
    LuacData,
    CIntSize,
    SizeTSize,
    InstructionSize,
    IntegerSize,
    NumberSize,
    LuacInt,
    LuacNum,
}

impl HeaderField {
    /// The message PUC Lua reports for a mismatch in this field.
    pub fn message(self) -> &'static str {
        match self {
            HeaderField::Signature => "not a precompiled chunk",
            HeaderField::Version => "version mismatch",
            HeaderField::Format => "format mismatch",
            HeaderField::LuacData => "corrupted",
            HeaderField::CIntSize => "int size mismatch",
            HeaderField::SizeTSize => "size_t size mismatch",
            HeaderField::InstructionSize => "instruction size mismatch",
            HeaderField::IntegerSize => "lua_Integer size mismatch",
            HeaderField::NumberSize => "lua_Number size mismatch",
            HeaderField::LuacInt => "endianness mismatch",
            HeaderField::LuacNum => "float format mismatch",
        }
    }
}

/// Error type for dump failures.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum DumpError {
    /// A table is longer than its count field can hold.
    #[error("cannot dump {what}: {len} entries exceed the format limit")]
    TooLarge { what: &'static str, len: usize },
}

/// Error type for undump failures. No partial prototype survives one.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum UndumpError {
    /// The input ended before a read could be satisfied.
    #[error("truncated binary chunk: needed {needed} bytes at offset {offset}, {remaining} left")]
    MalformedInput {
        offset: usize,
        needed: usize,
        remaining: usize,
    },
    #[error("{}", .0.message())]
    HeaderMismatch(HeaderField),
    #[error("corrupted chunk: unknown constant tag {0:#04x}")]
    CorruptConstant(u8),
    /// Prototypes nested deeper than the loader allows.
    #[error("binary chunk nests functions deeper than {limit} levels")]
    NestingTooDeep { limit: usize },
}
