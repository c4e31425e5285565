//! Function prototype: holds decoded bytecode, constants, and debug info.

use crate::opcode::Instruction;
use lunette_core::string::LuaStr;
use lunette_core::value::LuaValue;

/// Description of an upvalue.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UpvalDesc {
    /// True if this upvalue is in the enclosing function's stack (not another upvalue).
    pub in_stack: bool,
    /// Index: register index if in_stack, upvalue index in parent otherwise.
    pub index: u8,
}

/// A local variable debug entry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LocalVar {
    pub name: LuaStr,
    /// First PC where the variable is active.
    pub start_pc: u32,
    /// First PC where the variable is dead.
    pub end_pc: u32,
}

/// A function prototype. Owns its constants, debug tables, and children.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Proto {
    /// Source name (for error messages). Children inherit their parent's.
    pub source: Option<LuaStr>,
    pub line_defined: u32,
    pub last_line_defined: u32,
    /// Number of fixed parameters.
    pub num_params: u8,
    /// Whether this function accepts varargs.
    pub is_vararg: bool,
    /// Maximum stack size needed.
    pub max_stack_size: u8,
    /// Bytecode instructions.
    pub code: Vec<Instruction>,
    /// Constant pool. Only scalar values can appear here.
    pub constants: Vec<LuaValue>,
    /// Upvalue descriptors.
    pub upvalues: Vec<UpvalDesc>,
    /// Nested function prototypes.
    pub protos: Vec<Proto>,

    // --- Debug info (all optional; empty when stripped) ---
    /// Source line of each instruction.
    pub line_info: Vec<u32>,
    /// Local variable debug info.
    pub local_vars: Vec<LocalVar>,
    /// Upvalue names, parallel to `upvalues`.
    pub upvalue_names: Vec<LuaStr>,
}

impl Proto {
    /// Create a new empty prototype.
    pub fn new() -> Self {
        Self::default()
    }

    /// True for the main chunk, which has no defining line.
    pub fn is_main(&self) -> bool {
        self.line_defined == 0
    }

    /// Get the line number for a given PC, if line info was kept.
    pub fn line_at(&self, pc: usize) -> Option<u32> {
        self.line_info.get(pc).copied()
    }

    /// Name of upvalue `idx`, if debug info was kept.
    pub fn upvalue_name(&self, idx: usize) -> Option<&LuaStr> {
        self.upvalue_names.get(idx)
    }

    /// Name of the `n`-th (1-based) local variable active at `pc`.
    pub fn local_name(&self, mut n: usize, pc: u32) -> Option<&LuaStr> {
        if n == 0 {
            return None;
        }
        for var in self.local_vars.iter().take_while(|v| v.start_pc <= pc) {
            if pc < var.end_pc {
                n -= 1;
                if n == 0 {
                    return Some(&var.name);
                }
            }
        }
        None
    }

    /// Total number of prototypes in this subtree, including `self`.
    pub fn count_protos(&self) -> usize {
        1 + self.protos.iter().map(Proto::count_protos).sum::<usize>()
    }
}
