#![no_main]

use libfuzzer_sys::fuzz_target;
use wasm_smith::Module;

fuzz_target!(|module: Module| {
    let wasm_bytes = module.to_bytes();

    if let Ok(path) = std::env::var("DUMP_TESTCASE") {
        std::fs::write(path, &wasm_bytes).unwrap();
        return;
    }

    let once = wasmcodec::reencode(&wasm_bytes).unwrap();
    let twice = wasmcodec::reencode(&once).unwrap();
    assert_eq!(once, twice, "re-encoding is not idempotent");
    assert_eq!(
        wasmcodec::print(&wasm_bytes).unwrap(),
        wasmcodec::print(&once).unwrap(),
        "re-encoding changed the module structure"
    );
});
