#![allow(dead_code)]

use lunette_core::value::LuaValue;
use lunette_vm::binary_chunk::{
    CINT_SIZE, CSIZET_SIZE, INSTRUCTION_SIZE, LUAC_DATA, LUAC_FORMAT, LUAC_INT, LUAC_NUM,
    LUAC_VERSION, LUA_INTEGER_SIZE, LUA_NUMBER_SIZE, LUA_SIGNATURE,
};
use lunette_vm::LuaState;
use tracing_subscriber::EnvFilter;

/// Route `tracing` output through the test harness. Set `RUST_LOG` to see it.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn int(i: i64) -> LuaValue {
    LuaValue::Integer(i)
}

pub fn flt(f: f64) -> LuaValue {
    LuaValue::Float(f)
}

pub fn st(s: &str) -> LuaValue {
    LuaValue::from(s)
}

/// A fresh state with `vals` pushed bottom first.
pub fn state_with(vals: &[LuaValue]) -> LuaState {
    let mut l = LuaState::new();
    l.check_stack(vals.len());
    for v in vals {
        push(&mut l, v.clone());
    }
    l
}

/// Push any scalar through the typed push functions.
pub fn push(l: &mut LuaState, v: LuaValue) {
    let res = match v {
        LuaValue::Nil => l.push_nil(),
        LuaValue::Boolean(b) => l.push_boolean(b),
        LuaValue::Integer(i) => l.push_integer(i),
        LuaValue::Float(f) => l.push_number(f),
        LuaValue::String(s) => l.push_string(s),
    };
    res.unwrap_or_else(|e| panic!("push failed: {e}"));
}

/// Check that the value at `idx` is an integer with the expected value.
pub fn assert_int(l: &LuaState, idx: isize, expected: i64) {
    let val = l.get(idx);
    let got = val
        .as_integer()
        .unwrap_or_else(|| panic!("stack[{idx}] = {val:?}, expected integer {expected}"));
    assert_eq!(got, expected, "stack[{idx}] = {got}, expected {expected}");
}

/// Check that the value at `idx` is a float with the expected value.
pub fn assert_float(l: &LuaState, idx: isize, expected: f64) {
    let val = l.get(idx);
    let got = val
        .as_float()
        .unwrap_or_else(|| panic!("stack[{idx}] = {val:?}, expected float {expected}"));
    assert!(
        (got - expected).abs() < 1e-10,
        "stack[{idx}] = {got}, expected {expected}"
    );
}

/// Check that the value at `idx` is a string with the expected contents.
pub fn assert_str(l: &LuaState, idx: isize, expected: &str) {
    let val = l.get(idx);
    let got = val
        .as_str()
        .unwrap_or_else(|| panic!("stack[{idx}] = {val:?}, expected string \"{expected}\""));
    assert_eq!(
        got.as_bytes(),
        expected.as_bytes(),
        "stack[{idx}] = {got:?}, expected \"{expected}\""
    );
}

pub fn assert_nil(l: &LuaState, idx: isize) {
    let val = l.get(idx);
    assert!(val.is_nil(), "stack[{idx}] = {val:?}, expected nil");
}

/// Hand-assembles Lua 5.3 binary chunks, independently of the dumper.
#[derive(Default)]
pub struct ChunkWriter {
    pub bytes: Vec<u8>,
}

impl ChunkWriter {
    /// A writer holding a valid header and the main upvalue count.
    pub fn with_header() -> Self {
        let mut w = ChunkWriter::default();
        w.raw(LUA_SIGNATURE)
            .byte(LUAC_VERSION)
            .byte(LUAC_FORMAT)
            .raw(LUAC_DATA)
            .byte(CINT_SIZE)
            .byte(CSIZET_SIZE)
            .byte(INSTRUCTION_SIZE)
            .byte(LUA_INTEGER_SIZE)
            .byte(LUA_NUMBER_SIZE)
            .raw(&LUAC_INT.to_le_bytes())
            .raw(&LUAC_NUM.to_le_bytes())
            .byte(1);
        w
    }

    pub fn raw(&mut self, bytes: &[u8]) -> &mut Self {
        self.bytes.extend_from_slice(bytes);
        self
    }

    pub fn byte(&mut self, b: u8) -> &mut Self {
        self.bytes.push(b);
        self
    }

    pub fn u32(&mut self, n: u32) -> &mut Self {
        self.raw(&n.to_le_bytes())
    }

    /// Short-form string: prefix is `len + 1`, zero for none.
    pub fn string(&mut self, s: Option<&str>) -> &mut Self {
        match s {
            None => self.byte(0),
            Some(s) => self.byte(s.len() as u8 + 1).raw(s.as_bytes()),
        }
    }

    /// Function header fields up to and including the max stack size.
    pub fn function_start(&mut self, source: Option<&str>, lines: (u32, u32)) -> &mut Self {
        self.string(source)
            .u32(lines.0)
            .u32(lines.1)
            .byte(0)
            .byte(1)
            .byte(2)
    }

    /// Line info, local variables, and upvalue names, all empty.
    pub fn no_debug_info(&mut self) -> &mut Self {
        self.u32(0).u32(0).u32(0)
    }

    pub fn finish(&self) -> Vec<u8> {
        self.bytes.clone()
    }
}
