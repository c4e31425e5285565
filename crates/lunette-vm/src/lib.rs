//! Lunette virtual machine core: Lua 5.3 binary chunk loading and the
//! `LuaState` stack API with Lua's arithmetic and comparison semantics.

pub mod arith;
pub mod binary_chunk;
pub mod coerce;
pub mod compare;
pub mod error;
pub mod stack;
pub mod state;

pub use arith::ArithOp;
pub use binary_chunk::{dump, undump};
pub use compare::CompareOp;
pub use error::{DumpError, LuaError, LuaResult, UndumpError};
pub use state::LuaState;
