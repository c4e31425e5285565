//! Lua 5.3 opcodes, operand metadata, and instruction decoding.
//!
//! Instruction format (32 bits):
//! - Bits 0-5: OpCode (6 bits)
//! - Bits 6-13: A (8 bits)
//! - For iABC format:
//!   - Bits 14-22: B (9 bits)
//!   - Bits 23-31: C (9 bits)
//! - For iABx: Bx = bits 14-31 (unsigned 18 bits)
//! - For iAsBx: sBx = Bx - MAX_SBX (signed interpretation)
//! - For iAx: Ax = bits 6-31 (26 bits, unsigned)

use std::fmt;

/// Size constants for instruction fields.
const SIZE_OP: u32 = 6;
const SIZE_A: u32 = 8;
const SIZE_B: u32 = 9;
const SIZE_C: u32 = 9;
const SIZE_BX: u32 = SIZE_B + SIZE_C; // 18
const SIZE_AX: u32 = SIZE_A + SIZE_B + SIZE_C; // 26

/// Position constants.
const POS_OP: u32 = 0;
const POS_A: u32 = POS_OP + SIZE_OP; // 6
const POS_B: u32 = POS_A + SIZE_A; // 14
const POS_C: u32 = POS_B + SIZE_B; // 23
const POS_BX: u32 = POS_B;
const POS_AX: u32 = POS_A;

/// Mask helpers.
const fn mask(n: u32) -> u32 {
    (1 << n) - 1
}

pub const MAX_A: u32 = mask(SIZE_A); // 255
pub const MAX_B: u32 = mask(SIZE_B); // 511
pub const MAX_C: u32 = mask(SIZE_C); // 511
pub const MAX_BX: u32 = mask(SIZE_BX); // 262143
pub const MAX_SBX: i32 = (MAX_BX >> 1) as i32; // 131071
pub const MAX_AX: u32 = mask(SIZE_AX); // 67108863

/// Bit that marks a B/C operand as a constant index rather than a register.
pub const BIT_RK: u32 = 1 << (SIZE_B - 1);

/// Returns true if an RK operand addresses the constant pool.
pub fn is_rk_constant(x: u32) -> bool {
    x & BIT_RK != 0
}

/// Constant-pool index of an RK operand (meaningful when [`is_rk_constant`]).
pub fn rk_index(x: u32) -> u32 {
    x & !BIT_RK
}

/// Instruction encoding layouts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OpMode {
    IABC,
    IABx,
    IAsBx,
    IAx,
}

/// How an instruction uses its B or C operand.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OpArgMode {
    /// Operand is not used.
    N,
    /// Operand is used as an unsigned value.
    U,
    /// Operand is a register index.
    R,
    /// Operand is a register or a constant index (RK).
    K,
}

/// All 47 Lua 5.3 opcodes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum OpCode {
    Move = 0,
    LoadK,
    LoadKX,
    LoadBool,
    LoadNil,
    GetUpval,
    GetTabUp,
    GetTable,
    SetTabUp,
    SetUpval,
    SetTable,
    NewTable,
    Self_,
    Add,
    Sub,
    Mul,
    Mod,
    Pow,
    Div,
    IDiv,
    BAnd,
    BOr,
    BXor,
    Shl,
    Shr,
    Unm,
    BNot,
    Not,
    Len,
    Concat,
    Jmp,
    Eq,
    Lt,
    Le,
    Test,
    TestSet,
    Call,
    TailCall,
    Return,
    ForLoop,
    ForPrep,
    TForCall,
    TForLoop,
    SetList,
    Closure,
    VarArg,
    ExtraArg,
}

/// Static per-opcode metadata.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OpInfo {
    pub op: OpCode,
    /// Conditionally skips the next instruction.
    pub test: bool,
    /// Writes register A.
    pub set_a: bool,
    pub b_mode: OpArgMode,
    pub c_mode: OpArgMode,
    pub mode: OpMode,
    pub name: &'static str,
}

const fn info(
    op: OpCode,
    test: bool,
    set_a: bool,
    b_mode: OpArgMode,
    c_mode: OpArgMode,
    mode: OpMode,
    name: &'static str,
) -> OpInfo {
    OpInfo {
        op,
        test,
        set_a,
        b_mode,
        c_mode,
        mode,
        name,
    }
}

/// Opcode metadata, indexed by opcode number.
pub static OPCODES: [OpInfo; OpCode::COUNT] = {
    use OpArgMode::*;
    use OpCode::*;
    use OpMode::*;
    [
        info(Move, false, true, R, N, IABC, "MOVE"),
        info(LoadK, false, true, K, N, IABx, "LOADK"),
        info(LoadKX, false, true, N, N, IABx, "LOADKX"),
        info(LoadBool, false, true, U, U, IABC, "LOADBOOL"),
        info(LoadNil, false, true, U, N, IABC, "LOADNIL"),
        info(GetUpval, false, true, U, N, IABC, "GETUPVAL"),
        info(GetTabUp, false, true, U, K, IABC, "GETTABUP"),
        info(GetTable, false, true, R, K, IABC, "GETTABLE"),
        info(SetTabUp, false, false, K, K, IABC, "SETTABUP"),
        info(SetUpval, false, false, U, N, IABC, "SETUPVAL"),
        info(SetTable, false, false, K, K, IABC, "SETTABLE"),
        info(NewTable, false, true, U, U, IABC, "NEWTABLE"),
        info(Self_, false, true, R, K, IABC, "SELF"),
        info(Add, false, true, K, K, IABC, "ADD"),
        info(Sub, false, true, K, K, IABC, "SUB"),
        info(Mul, false, true, K, K, IABC, "MUL"),
        info(Mod, false, true, K, K, IABC, "MOD"),
        info(Pow, false, true, K, K, IABC, "POW"),
        info(Div, false, true, K, K, IABC, "DIV"),
        info(IDiv, false, true, K, K, IABC, "IDIV"),
        info(BAnd, false, true, K, K, IABC, "BAND"),
        info(BOr, false, true, K, K, IABC, "BOR"),
        info(BXor, false, true, K, K, IABC, "BXOR"),
        info(Shl, false, true, K, K, IABC, "SHL"),
        info(Shr, false, true, K, K, IABC, "SHR"),
        info(Unm, false, true, R, N, IABC, "UNM"),
        info(BNot, false, true, R, N, IABC, "BNOT"),
        info(Not, false, true, R, N, IABC, "NOT"),
        info(Len, false, true, R, N, IABC, "LEN"),
        info(Concat, false, true, R, R, IABC, "CONCAT"),
        info(Jmp, false, false, R, N, IAsBx, "JMP"),
        info(Eq, true, false, K, K, IABC, "EQ"),
        info(Lt, true, false, K, K, IABC, "LT"),
        info(Le, true, false, K, K, IABC, "LE"),
        info(Test, true, false, N, U, IABC, "TEST"),
        info(TestSet, true, true, R, U, IABC, "TESTSET"),
        info(Call, false, true, U, U, IABC, "CALL"),
        info(TailCall, false, true, U, U, IABC, "TAILCALL"),
        info(Return, false, false, U, N, IABC, "RETURN"),
        info(ForLoop, false, true, R, N, IAsBx, "FORLOOP"),
        info(ForPrep, false, true, R, N, IAsBx, "FORPREP"),
        info(TForCall, false, false, N, U, IABC, "TFORCALL"),
        info(TForLoop, false, true, R, N, IAsBx, "TFORLOOP"),
        info(SetList, false, false, U, U, IABC, "SETLIST"),
        info(Closure, false, true, U, N, IABx, "CLOSURE"),
        info(VarArg, false, true, U, N, IABC, "VARARG"),
        info(ExtraArg, false, false, U, U, IAx, "EXTRAARG"),
    ]
};

impl OpCode {
    /// Number of opcodes.
    pub const COUNT: usize = 47;

    /// Get the opcode from a u8 value.
    pub fn from_u8(val: u8) -> Option<OpCode> {
        OPCODES.get(val as usize).map(|info| info.op)
    }

    /// Static metadata for this opcode.
    pub fn info(self) -> &'static OpInfo {
        &OPCODES[self as usize]
    }

    /// Get the name of this opcode.
    pub fn name(self) -> &'static str {
        self.info().name
    }

    /// Get the encoding layout of this opcode.
    pub fn mode(self) -> OpMode {
        self.info().mode
    }

    /// Returns true if this opcode is a test (conditional skip).
    pub fn is_test(self) -> bool {
        self.info().test
    }

    /// Returns true if this opcode writes register A.
    pub fn sets_a(self) -> bool {
        self.info().set_a
    }
}

/// A 32-bit Lua bytecode instruction.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Instruction(pub u32);

impl Instruction {
    // ---- Constructors ----

    /// Create an iABC instruction.
    pub fn abc(op: OpCode, a: u32, b: u32, c: u32) -> Self {
        debug_assert!(a <= MAX_A && b <= MAX_B && c <= MAX_C);
        Instruction(
            ((op as u32) << POS_OP) | (a << POS_A) | (b << POS_B) | (c << POS_C),
        )
    }

    /// Create an iABx instruction.
    pub fn abx(op: OpCode, a: u32, bx: u32) -> Self {
        debug_assert!(a <= MAX_A && bx <= MAX_BX, "Bx out of range: {bx}");
        Instruction(((op as u32) << POS_OP) | (a << POS_A) | (bx << POS_BX))
    }

    /// Create an iAsBx instruction (signed Bx).
    pub fn asbx(op: OpCode, a: u32, sbx: i32) -> Self {
        debug_assert!(
            (-MAX_SBX..=MAX_SBX + 1).contains(&sbx),
            "sBx out of range: {sbx}"
        );
        Self::abx(op, a, (sbx + MAX_SBX) as u32)
    }

    /// Create an iAx instruction.
    pub fn ax(op: OpCode, ax: u32) -> Self {
        debug_assert!(ax <= MAX_AX, "Ax out of range: {ax}");
        Instruction(((op as u32) << POS_OP) | (ax << POS_AX))
    }

    // ---- Decoders ----

    /// Raw opcode number (low 6 bits).
    pub fn raw_opcode(&self) -> u8 {
        ((self.0 >> POS_OP) & mask(SIZE_OP)) as u8
    }

    /// Get the opcode, or `None` for the unassigned numbers 47..=63.
    pub fn opcode(&self) -> Option<OpCode> {
        OpCode::from_u8(self.raw_opcode())
    }

    /// Metadata for this instruction's opcode.
    pub fn info(&self) -> Option<&'static OpInfo> {
        OPCODES.get(self.raw_opcode() as usize)
    }

    /// Get field A.
    pub fn a(&self) -> u32 {
        (self.0 >> POS_A) & mask(SIZE_A)
    }

    /// Get field B.
    pub fn b(&self) -> u32 {
        (self.0 >> POS_B) & mask(SIZE_B)
    }

    /// Get field C.
    pub fn c(&self) -> u32 {
        (self.0 >> POS_C) & mask(SIZE_C)
    }

    /// Get field Bx (unsigned).
    pub fn bx(&self) -> u32 {
        (self.0 >> POS_BX) & mask(SIZE_BX)
    }

    /// Get field sBx (signed).
    pub fn sbx(&self) -> i32 {
        self.bx() as i32 - MAX_SBX
    }

    /// Get field Ax (unsigned).
    pub fn ax_field(&self) -> u32 {
        (self.0 >> POS_AX) & mask(SIZE_AX)
    }

    /// Decode the operands according to this instruction's layout.
    pub fn operands(&self) -> Option<Operands> {
        let info = self.info()?;
        Some(match info.mode {
            OpMode::IABC => Operands::ABC {
                a: self.a(),
                b: self.b(),
                c: self.c(),
            },
            OpMode::IABx => Operands::ABx {
                a: self.a(),
                bx: self.bx(),
            },
            OpMode::IAsBx => Operands::AsBx {
                a: self.a(),
                sbx: self.sbx(),
            },
            OpMode::IAx => Operands::Ax { ax: self.ax_field() },
        })
    }
}

/// Operands of a decoded instruction, shaped by its layout.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operands {
    ABC { a: u32, b: u32, c: u32 },
    ABx { a: u32, bx: u32 },
    AsBx { a: u32, sbx: i32 },
    Ax { ax: u32 },
}

/// luac-style rendering of an RK operand: constants print as `-1 - index`.
fn rk_display(x: u32) -> i64 {
    if is_rk_constant(x) {
        -1 - rk_index(x) as i64
    } else {
        x as i64
    }
}

impl fmt::Debug for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Some(info) = self.info() else {
            return write!(f, "UNKNOWN({:#010x})", self.0);
        };
        write!(f, "{}", info.name)?;
        match info.mode {
            OpMode::IABC => {
                write!(f, " {}", self.a())?;
                if info.b_mode != OpArgMode::N {
                    write!(f, " {}", rk_display(self.b()))?;
                }
                if info.c_mode != OpArgMode::N {
                    write!(f, " {}", rk_display(self.c()))?;
                }
            }
            OpMode::IABx => {
                write!(f, " {}", self.a())?;
                match info.b_mode {
                    OpArgMode::K => write!(f, " {}", -1 - self.bx() as i64)?,
                    OpArgMode::U => write!(f, " {}", self.bx())?,
                    _ => {}
                }
            }
            OpMode::IAsBx => {
                write!(f, " {} {}", self.a(), self.sbx())?;
            }
            OpMode::IAx => {
                write!(f, " {}", -1 - self.ax_field() as i64)?;
            }
        }
        Ok(())
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}
