//! Lua 5.3 binary chunk serialization (dump) and deserialization (undump).
//!
//! Format follows PUC Lua 5.3 `luac` output for a 64-bit little-endian
//! build: 4-byte `int`, 8-byte `size_t`, 8-byte integers and floats.

use crate::error::{DumpError, HeaderField, UndumpError};
use lunette_bytecode::opcode::Instruction;
use lunette_bytecode::proto::{LocalVar, Proto, UpvalDesc};
use lunette_core::string::LuaStr;
use lunette_core::value::LuaValue;
use tracing::{debug, instrument, trace};

// Lua 5.3 binary header constants
pub const LUA_SIGNATURE: &[u8; 4] = b"\x1bLua";
pub const LUAC_VERSION: u8 = 0x53;
pub const LUAC_FORMAT: u8 = 0;
pub const LUAC_DATA: &[u8; 6] = b"\x19\x93\r\n\x1a\n";
pub const CINT_SIZE: u8 = 4;
pub const CSIZET_SIZE: u8 = 8;
pub const INSTRUCTION_SIZE: u8 = 4;
pub const LUA_INTEGER_SIZE: u8 = 8;
pub const LUA_NUMBER_SIZE: u8 = 8;
pub const LUAC_INT: i64 = 0x5678;
pub const LUAC_NUM: f64 = 370.5;

/// Length of the fixed header, up to and including `LUAC_NUM`.
pub const HEADER_SIZE: usize = 4 + 1 + 1 + 6 + 5 + 8 + 8;

// Constant type tags
pub const TAG_NIL: u8 = 0x00;
pub const TAG_BOOLEAN: u8 = 0x01;
pub const TAG_NUMBER: u8 = 0x03;
pub const TAG_INTEGER: u8 = 0x13;
pub const TAG_SHORT_STR: u8 = 0x04;
pub const TAG_LONG_STR: u8 = 0x14;

/// Deepest function nesting the loader accepts.
pub const MAX_NESTING: usize = 200;

/// String size prefix that announces a full `size_t` length.
const LONG_SIZE_MARKER: u8 = 0xFF;

// ─── Dumper ─────────────────────────────────────────────────────────────

/// Serialize a Proto and all its children into Lua 5.3 binary format.
///
/// With `strip` set, sources and debug tables are left out. Fails when a
/// table is longer than its count field can hold.
pub fn dump(proto: &Proto, strip: bool) -> Result<Vec<u8>, DumpError> {
    let mut out = Vec::new();
    write_header(&mut out);
    // Number of upvalues for the main chunk
    let len = proto.upvalues.len();
    let num_upvalues = u8::try_from(len).map_err(|_| DumpError::TooLarge {
        what: "main upvalues",
        len,
    })?;
    out.push(num_upvalues);
    write_function(&mut out, proto, strip, None)?;
    Ok(out)
}

fn write_header(out: &mut Vec<u8>) {
    out.extend_from_slice(LUA_SIGNATURE);
    out.push(LUAC_VERSION);
    out.push(LUAC_FORMAT);
    out.extend_from_slice(LUAC_DATA);
    out.push(CINT_SIZE);
    out.push(CSIZET_SIZE);
    out.push(INSTRUCTION_SIZE);
    out.push(LUA_INTEGER_SIZE);
    out.push(LUA_NUMBER_SIZE);
    out.extend_from_slice(&LUAC_INT.to_le_bytes());
    out.extend_from_slice(&LUAC_NUM.to_le_bytes());
}

fn write_u32(out: &mut Vec<u8>, n: u32) {
    out.extend_from_slice(&n.to_le_bytes());
}

fn write_len(out: &mut Vec<u8>, what: &'static str, n: usize) -> Result<(), DumpError> {
    let n = u32::try_from(n).map_err(|_| DumpError::TooLarge { what, len: n })?;
    write_u32(out, n);
    Ok(())
}

fn write_string(out: &mut Vec<u8>, s: Option<&[u8]>) {
    let Some(bytes) = s else {
        out.push(0);
        return;
    };
    let size = bytes.len() + 1;
    if size < LONG_SIZE_MARKER as usize {
        out.push(size as u8);
    } else {
        out.push(LONG_SIZE_MARKER);
        out.extend_from_slice(&(size as u64).to_le_bytes());
    }
    out.extend_from_slice(bytes);
}

fn write_constant(out: &mut Vec<u8>, k: &LuaValue) {
    match k {
        LuaValue::Nil => out.push(TAG_NIL),
        LuaValue::Boolean(b) => {
            out.push(TAG_BOOLEAN);
            out.push(u8::from(*b));
        }
        LuaValue::Integer(i) => {
            out.push(TAG_INTEGER);
            out.extend_from_slice(&i.to_le_bytes());
        }
        LuaValue::Float(f) => {
            out.push(TAG_NUMBER);
            out.extend_from_slice(&f.to_le_bytes());
        }
        LuaValue::String(s) => {
            if s.is_short() {
                out.push(TAG_SHORT_STR);
            } else {
                out.push(TAG_LONG_STR);
            }
            write_string(out, Some(s.as_bytes()));
        }
    }
}

fn write_function(
    out: &mut Vec<u8>,
    proto: &Proto,
    strip: bool,
    parent_source: Option<&LuaStr>,
) -> Result<(), DumpError> {
    // Source name; children sharing their parent's source write none.
    let source = proto.source.as_ref();
    if strip || source == parent_source {
        write_string(out, None);
    } else {
        write_string(out, source.map(LuaStr::as_bytes));
    }

    write_u32(out, proto.line_defined);
    write_u32(out, proto.last_line_defined);
    out.push(proto.num_params);
    out.push(u8::from(proto.is_vararg));
    out.push(proto.max_stack_size);

    write_len(out, "code", proto.code.len())?;
    for inst in &proto.code {
        write_u32(out, inst.0);
    }

    write_len(out, "constants", proto.constants.len())?;
    for k in &proto.constants {
        write_constant(out, k);
    }

    write_len(out, "upvalues", proto.upvalues.len())?;
    for uv in &proto.upvalues {
        out.push(u8::from(uv.in_stack));
        out.push(uv.index);
    }

    write_len(out, "protos", proto.protos.len())?;
    for child in &proto.protos {
        write_function(out, child, strip, source)?;
    }

    if strip {
        // Line info, local vars, upvalue names
        write_u32(out, 0);
        write_u32(out, 0);
        write_u32(out, 0);
        return Ok(());
    }

    write_len(out, "line info", proto.line_info.len())?;
    for &line in &proto.line_info {
        write_u32(out, line);
    }

    write_len(out, "local vars", proto.local_vars.len())?;
    for lv in &proto.local_vars {
        write_string(out, Some(lv.name.as_bytes()));
        write_u32(out, lv.start_pc);
        write_u32(out, lv.end_pc);
    }

    write_len(out, "upvalue names", proto.upvalue_names.len())?;
    for name in &proto.upvalue_names {
        write_string(out, Some(name.as_bytes()));
    }
    Ok(())
}

// ─── Undumper ───────────────────────────────────────────────────────────

struct Reader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(data: &'a [u8]) -> Self {
        Reader { data, pos: 0 }
    }

    fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    fn truncated(&self, needed: usize) -> UndumpError {
        UndumpError::MalformedInput {
            offset: self.pos,
            needed,
            remaining: self.remaining(),
        }
    }

    fn read_bytes(&mut self, n: usize) -> Result<&'a [u8], UndumpError> {
        if n > self.remaining() {
            return Err(self.truncated(n));
        }
        let slice = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    fn read_array<const N: usize>(&mut self) -> Result<[u8; N], UndumpError> {
        let bytes = self.read_bytes(N)?;
        let mut buf = [0u8; N];
        buf.copy_from_slice(bytes);
        Ok(buf)
    }

    fn read_byte(&mut self) -> Result<u8, UndumpError> {
        self.read_array::<1>().map(|[b]| b)
    }

    fn read_u32(&mut self) -> Result<u32, UndumpError> {
        self.read_array().map(u32::from_le_bytes)
    }

    fn read_u64(&mut self) -> Result<u64, UndumpError> {
        self.read_array().map(u64::from_le_bytes)
    }

    fn read_lua_integer(&mut self) -> Result<i64, UndumpError> {
        self.read_array().map(i64::from_le_bytes)
    }

    fn read_lua_number(&mut self) -> Result<f64, UndumpError> {
        self.read_u64().map(f64::from_bits)
    }

    /// Read a length-prefixed string. A zero prefix means "no string".
    fn read_string(&mut self) -> Result<Option<LuaStr>, UndumpError> {
        let size = match self.read_byte()? {
            0 => return Ok(None),
            LONG_SIZE_MARKER => {
                let size = self.read_u64()?;
                // The stored size counts a trailing NUL, so zero is invalid.
                match usize::try_from(size) {
                    Ok(size) if size > 0 => size,
                    _ => return Err(self.truncated(usize::MAX)),
                }
            }
            size => size as usize,
        };
        self.read_bytes(size - 1).map(|b| Some(LuaStr::new(b)))
    }

    /// Read a `u32` count, then that many elements. Preallocation is capped
    /// by what the remaining input could possibly hold.
    fn read_vec<T>(
        &mut self,
        min_elem_size: usize,
        mut read_one: impl FnMut(&mut Self) -> Result<T, UndumpError>,
    ) -> Result<Vec<T>, UndumpError> {
        let n = self.read_u32()? as usize;
        let mut out = Vec::with_capacity(n.min(self.remaining() / min_elem_size));
        for _ in 0..n {
            out.push(read_one(self)?);
        }
        Ok(out)
    }

    fn check_header(&mut self) -> Result<(), UndumpError> {
        use HeaderField::*;

        let ensure = |ok: bool, field: HeaderField| {
            if ok {
                Ok(())
            } else {
                Err(UndumpError::HeaderMismatch(field))
            }
        };
        ensure(self.read_bytes(4)? == LUA_SIGNATURE, Signature)?;
        ensure(self.read_byte()? == LUAC_VERSION, Version)?;
        ensure(self.read_byte()? == LUAC_FORMAT, Format)?;
        ensure(self.read_bytes(6)? == LUAC_DATA, LuacData)?;
        ensure(self.read_byte()? == CINT_SIZE, CIntSize)?;
        ensure(self.read_byte()? == CSIZET_SIZE, SizeTSize)?;
        ensure(self.read_byte()? == INSTRUCTION_SIZE, InstructionSize)?;
        ensure(self.read_byte()? == LUA_INTEGER_SIZE, IntegerSize)?;
        ensure(self.read_byte()? == LUA_NUMBER_SIZE, NumberSize)?;
        ensure(self.read_lua_integer()? == LUAC_INT, LuacInt)?;
        ensure(self.read_lua_number()?.to_bits() == LUAC_NUM.to_bits(), LuacNum)
    }

    fn read_constant(&mut self) -> Result<LuaValue, UndumpError> {
        let tag = self.read_byte()?;
        Ok(match tag {
            TAG_NIL => LuaValue::Nil,
            TAG_BOOLEAN => LuaValue::Boolean(self.read_byte()? != 0),
            TAG_INTEGER => LuaValue::Integer(self.read_lua_integer()?),
            TAG_NUMBER => LuaValue::Float(self.read_lua_number()?),
            TAG_SHORT_STR | TAG_LONG_STR => {
                LuaValue::String(self.read_string()?.unwrap_or_default())
            }
            _ => return Err(UndumpError::CorruptConstant(tag)),
        })
    }

    fn read_upvalue(&mut self) -> Result<UpvalDesc, UndumpError> {
        let in_stack = self.read_byte()? != 0;
        let index = self.read_byte()?;
        Ok(UpvalDesc { in_stack, index })
    }

    fn read_local_var(&mut self) -> Result<LocalVar, UndumpError> {
        let name = self.read_string()?.unwrap_or_default();
        let start_pc = self.read_u32()?;
        let end_pc = self.read_u32()?;
        Ok(LocalVar {
            name,
            start_pc,
            end_pc,
        })
    }

    fn read_function(
        &mut self,
        parent_source: Option<&LuaStr>,
        depth: usize,
    ) -> Result<Proto, UndumpError> {
        if depth > MAX_NESTING {
            return Err(UndumpError::NestingTooDeep { limit: MAX_NESTING });
        }

        // An empty source means "same as the enclosing function".
        let source = self.read_string()?.or_else(|| parent_source.cloned());
        let line_defined = self.read_u32()?;
        let last_line_defined = self.read_u32()?;
        let num_params = self.read_byte()?;
        let is_vararg = self.read_byte()? != 0;
        let max_stack_size = self.read_byte()?;

        let code = self.read_vec(4, |r| r.read_u32().map(Instruction))?;
        let constants = self.read_vec(1, Self::read_constant)?;
        let upvalues = self.read_vec(2, Self::read_upvalue)?;
        let protos = self.read_vec(1, |r| r.read_function(source.as_ref(), depth + 1))?;
        let line_info = self.read_vec(4, Self::read_u32)?;
        let local_vars = self.read_vec(9, Self::read_local_var)?;
        let upvalue_names = self.read_vec(1, |r| {
            r.read_string().map(Option::unwrap_or_default)
        })?;

        trace!(
            source = ?source,
            line_defined,
            code = code.len(),
            constants = constants.len(),
            protos = protos.len(),
            "decoded prototype"
        );

        Ok(Proto {
            source,
            line_defined,
            last_line_defined,
            num_params,
            is_vararg,
            max_stack_size,
            code,
            constants,
            upvalues,
            protos,
            line_info,
            local_vars,
            upvalue_names,
        })
    }
}

/// Deserialize a Lua 5.3 binary chunk into a Proto.
///
/// The main function's source is `None` when the chunk does not name one.
#[instrument(level = "debug", skip(data), fields(len = data.len()))]
pub fn undump(data: &[u8]) -> Result<Proto, UndumpError> {
    if data.len() < HEADER_SIZE {
        return Err(UndumpError::MalformedInput {
            offset: 0,
            needed: HEADER_SIZE,
            remaining: data.len(),
        });
    }

    let mut reader = Reader::new(data);
    reader.check_header()?;
    debug!("header verified");

    // Number of upvalues of the main closure; the loader has no closures.
    let _num_upvalues = reader.read_byte()?;

    reader.read_function(None, 0)
}
