#![no_main]

use libfuzzer_sys::fuzz_target;
use lunette_vm::{ArithOp, CompareOp, LuaState};

fuzz_target!(|data: &[u8]| {
    // Interpret the input as a tape of stack operations. Errors are fine,
    // panics are bugs, and `top` must never exceed the reserved capacity.
    let mut l = LuaState::with_capacity(8);
    let mut ops = data.chunks_exact(3);
    for op in &mut ops {
        let (code, x, y) = (op[0], op[1] as i8 as isize, op[2] as i8 as isize);
        let _ = match code % 16 {
            0 => l.push_integer(x as i64 * 1000 + y as i64),
            1 => l.push_number(x as f64 / (y as f64 + 0.5)),
            2 => l.push_string(format!("{x}.{}", y.unsigned_abs())),
            3 => l.push_boolean(x & 1 == 0),
            4 => l.push_nil(),
            5 => l.set_top(x),
            6 => l.rotate(x, y),
            7 => l.insert(x),
            8 => l.remove(x),
            9 => l.replace(x),
            10 => l.copy(x, y),
            11 => l.arith(ArithOp::from_u8(op[1] % 14).unwrap()),
            12 => l
                .compare(x, y, CompareOp::from_u8(op[2] % 3).unwrap())
                .map(drop),
            13 => l.concat(op[1] as usize % 4),
            14 => {
                l.to_string(x);
                l.len(y)
            }
            _ => {
                l.check_stack(op[1] as usize % 4);
                Ok(())
            }
        };
        assert!(l.abs_index(-1) + 1 >= 0);
        assert_eq!(l.values().len(), l.get_top());
    }
});
