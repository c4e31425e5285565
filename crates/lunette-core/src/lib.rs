//! Lunette core types: values, strings, and Lua number semantics.

pub mod number;
pub mod string;
pub mod value;
