use super::helpers::*;
use lunette_bytecode::opcode::{Instruction, OpCode, Operands};
use lunette_bytecode::proto::{LocalVar, Proto, UpvalDesc};
use lunette_core::string::LuaStr;
use lunette_core::value::LuaValue;
use lunette_vm::binary_chunk::{HEADER_SIZE, TAG_INTEGER, TAG_LONG_STR, TAG_NUMBER};
use lunette_vm::error::HeaderField;
use lunette_vm::{dump, undump, UndumpError};

/// `local x = 1 + 2.5; return x` as luac 5.3 lays it out, by hand.
fn hand_written_chunk() -> Vec<u8> {
    let code = [
        Instruction::abx(OpCode::LoadK, 0, 0),
        Instruction::abc(OpCode::Add, 0, 0x100, 0x101),
        Instruction::abc(OpCode::Return, 0, 2, 0),
    ];
    let mut w = ChunkWriter::with_header();
    w.function_start(Some("@t.lua"), (0, 0));
    w.u32(code.len() as u32);
    for inst in code {
        w.u32(inst.0);
    }
    // constants
    w.u32(2).byte(TAG_INTEGER).raw(&1i64.to_le_bytes());
    w.byte(TAG_NUMBER).raw(&2.5f64.to_le_bytes());
    // upvalues
    w.u32(1).byte(1).byte(0);
    // protos
    w.u32(0);
    // line info
    w.u32(3).u32(1).u32(1).u32(1);
    // locals
    w.u32(1).string(Some("x")).u32(1).u32(3);
    // upvalue names
    w.u32(1).string(Some("_ENV"));
    w.finish()
}

#[test]
fn load_hand_written_chunk() {
    init_tracing();
    let proto = undump(&hand_written_chunk()).unwrap();
    assert_eq!(proto.source, Some(LuaStr::from("@t.lua")));
    assert!(proto.is_main());
    assert!(proto.is_vararg);
    assert_eq!(proto.max_stack_size, 2);

    assert_eq!(proto.code.len(), 3);
    assert_eq!(proto.code[0].opcode(), Some(OpCode::LoadK));
    assert_eq!(
        proto.code[1].operands(),
        Some(Operands::ABC {
            a: 0,
            b: 0x100,
            c: 0x101
        })
    );
    assert_eq!(proto.code[2].opcode(), Some(OpCode::Return));
    assert_eq!(proto.code[2].b(), 2);

    assert_eq!(proto.constants, vec![LuaValue::Integer(1), LuaValue::Float(2.5)]);
    assert_eq!(
        proto.upvalues,
        vec![UpvalDesc {
            in_stack: true,
            index: 0
        }]
    );
    assert_eq!(proto.line_info, vec![1, 1, 1]);
    assert_eq!(proto.local_name(1, 2), Some(&LuaStr::from("x")));
    assert_eq!(proto.upvalue_name(0), Some(&LuaStr::from("_ENV")));
}

#[test]
fn load_empty_prototype() {
    let mut w = ChunkWriter::with_header();
    w.function_start(None, (0, 0));
    w.u32(0).u32(0).u32(0).u32(0).no_debug_info();
    let proto = undump(&w.finish()).unwrap();
    assert_eq!(proto.source, None);
    assert!(proto.code.is_empty());
    assert!(proto.constants.is_empty());
    assert!(proto.upvalues.is_empty());
    assert!(proto.protos.is_empty());
    assert!(proto.line_info.is_empty());
    assert!(proto.local_vars.is_empty());
    assert!(proto.upvalue_names.is_empty());
}

#[test]
fn load_nested_prototypes_inherit_source() {
    let mut w = ChunkWriter::with_header();
    w.function_start(Some("=main"), (0, 0));
    w.u32(0).u32(0).u32(0);
    // two children, the second with its own source
    w.u32(2);
    w.function_start(None, (1, 3))
        .u32(0)
        .u32(0)
        .u32(0)
        .u32(0)
        .no_debug_info();
    w.function_start(Some("=other"), (4, 6))
        .u32(0)
        .u32(0)
        .u32(0)
        .u32(0)
        .no_debug_info();
    w.no_debug_info();

    let proto = undump(&w.finish()).unwrap();
    assert_eq!(proto.protos.len(), 2);
    assert_eq!(proto.protos[0].source, Some(LuaStr::from("=main")));
    assert_eq!(proto.protos[0].line_defined, 1);
    assert_eq!(proto.protos[0].last_line_defined, 3);
    assert_eq!(proto.protos[1].source, Some(LuaStr::from("=other")));
    assert_eq!(proto.count_protos(), 3);
}

#[test]
fn load_rejects_short_buffer() {
    for len in [0, 1, 4, HEADER_SIZE - 1] {
        let chunk = &hand_written_chunk()[..len];
        assert!(
            matches!(undump(chunk), Err(UndumpError::MalformedInput { .. })),
            "len {len}"
        );
    }
}

#[test]
fn load_rejects_text_source() {
    let err = undump(b"return 1 + 2 -- plain Lua source, not a chunk").unwrap_err();
    assert_eq!(err, UndumpError::HeaderMismatch(HeaderField::Signature));
    assert_eq!(err.to_string(), "not a precompiled chunk");
}

#[test]
fn load_rejects_lua54_chunks() {
    let mut chunk = hand_written_chunk();
    chunk[4] = 0x54;
    assert_eq!(
        undump(&chunk),
        Err(UndumpError::HeaderMismatch(HeaderField::Version))
    );
}

#[test]
fn load_rejects_unknown_constant_tag() {
    let mut w = ChunkWriter::with_header();
    w.function_start(None, (0, 0));
    w.u32(0).u32(1).byte(0x05);
    assert_eq!(undump(&w.finish()), Err(UndumpError::CorruptConstant(0x05)));
}

#[test]
fn load_long_string_form() {
    let text = "y".repeat(254);
    let mut w = ChunkWriter::with_header();
    w.function_start(None, (0, 0));
    w.u32(0).u32(1).byte(TAG_LONG_STR).byte(0xFF);
    w.raw(&(text.len() as u64 + 1).to_le_bytes()).raw(text.as_bytes());
    w.u32(0).u32(0).no_debug_info();
    let proto = undump(&w.finish()).unwrap();
    assert_eq!(proto.constants, vec![LuaValue::from(text.as_str())]);
}

#[test]
fn dump_then_load_preserves_everything() {
    let mut child = Proto::new();
    child.source = Some(LuaStr::from("@lib.lua"));
    child.line_defined = 2;
    child.last_line_defined = 9;
    child.num_params = 2;
    child.max_stack_size = 4;
    child.code.push(Instruction::asbx(OpCode::Jmp, 0, -5));
    child.upvalues.push(UpvalDesc {
        in_stack: false,
        index: 3,
    });

    let mut root = Proto::new();
    root.source = Some(LuaStr::from("@lib.lua"));
    root.is_vararg = true;
    root.constants = vec![
        LuaValue::Nil,
        LuaValue::Boolean(false),
        LuaValue::Integer(i64::MIN),
        LuaValue::Float(-0.5),
        LuaValue::from("a".repeat(100)),
    ];
    root.local_vars.push(LocalVar {
        name: LuaStr::from("t"),
        start_pc: 0,
        end_pc: 1,
    });
    root.protos.push(child);

    let restored = undump(&dump(&root, false).unwrap()).unwrap();
    assert_eq!(restored, root);
    assert_eq!(restored.protos[0].code[0].sbx(), -5);
}
