#![no_main]

use libfuzzer_sys::fuzz_target;
use lunette_vm::{dump, undump};

fuzz_target!(|data: &[u8]| {
    // Any input may be rejected, but never with a panic. Whatever loads
    // and fits the dump limits must survive a dump/undump cycle unchanged.
    if let Ok(proto) = undump(data) {
        let Ok(chunk) = dump(&proto, false) else {
            return;
        };
        let again = undump(&chunk).expect("re-dumped chunk must load");
        assert_eq!(again.code, proto.code);
        assert_eq!(again.count_protos(), proto.count_protos());
    }
});
