//! Lunette bytecode model: Lua 5.3 instructions, opcode metadata, and
//! function prototypes.

pub mod opcode;
pub mod proto;
