#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|wasm_bytes: &[u8]| {
    // Arbitrary input may fail to decode but must never panic. Whatever
    // decodes must encode again.
    if wasmcodec::check(wasm_bytes).is_ok() {
        let _ = wasmcodec::reencode(wasm_bytes).unwrap();
    }
});
