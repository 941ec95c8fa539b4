//! Decode/encode round trips over modules built from text.

use pretty_assertions::assert_eq;
use wasmcodec::types::{DecoderConfig, ErrorKind};

/// MVP features, sign extension and saturating conversions.
const CORE: &str = r#"
(module
  (type $t (func (param i32) (result i32)))
  (import "env" "f" (func $imp (type $t)))
  (import "env" "mem" (memory 1 2))
  (import "env" "g" (global $g (mut i64)))
  (import "env" "tab" (table 2 funcref))
  (global $h f32 (f32.const nan:0x200001))
  (global (mut f64) (f64.const -0))
  (func $add (export "add") (param i32 i32) (result i32)
    (local i32 i32 i64 f32)
    local.get 0
    local.get 1
    i32.add
    local.tee 2
    block (result i32)
      local.get 2
      br_if 0
      drop
      i32.const -123456
    end)
  (func $loop (param i32) (result i32)
    loop $l
      local.get 0
      i32.const 1
      i32.sub
      local.tee 0
      br_if $l
    end
    local.get 0
    if (result i32)
      i32.const 1
    else
      i32.const 2
    end
    local.get 0
    call_indirect (type $t)
    block
      block
        local.get 0
        br_table 0 1 0
      end
    end)
  (func $mem
    i32.const 0
    i64.load offset=8
    i64.extend32_s
    global.set $g
    memory.size
    memory.grow
    drop
    f32.const 1.5
    i32.trunc_sat_f32_s
    drop
    i64.const 0x7fffffffffffffff
    drop)
  (func $init)
  (start $init)
  (elem (i32.const 0) $add $loop)
  (data (i32.const 16) "hello\00\ff"))
"#;

/// Bulk memory and reference types.
const REFS: &str = r#"
(module
  (table $t0 1 funcref)
  (table $t1 1 externref)
  (memory 1)
  (func $f (param externref) (result i32)
    local.get 0
    ref.is_null
    drop
    ref.func $f
    drop
    i32.const 0
    ref.null extern
    table.set $t1
    i32.const 0
    table.get $t0
    drop
    i32.const 0
    i32.const 0
    i32.const 1
    table.init $t0 $e1
    elem.drop $e1
    i32.const 0
    i32.const 0
    i32.const 1
    table.copy $t0 $t0
    ref.null func
    i32.const 1
    table.grow $t0
    drop
    table.size $t0
    drop
    i32.const 0
    ref.null func
    i32.const 0
    table.fill $t0
    i32.const 0
    i32.const 0
    i32.const 2
    memory.init $d1
    data.drop $d1
    i32.const 0
    i32.const 1
    i32.const 2
    memory.copy
    i32.const 0
    i32.const 0
    i32.const 2
    memory.fill
    i32.const 1
    i32.const 2
    i32.const 0
    select (result i32))
  (elem $e1 func $f)
  (elem declare func $f)
  (elem (i32.const 0) funcref (ref.func $f) (ref.null func))
  (elem $e3 externref (ref.null extern))
  (data $d1 "passive")
  (data (i32.const 4) "x"))
"#;

fn wasm(text: &str) -> Vec<u8> {
    wat::parse_str(text).unwrap()
}

#[test]
fn structural_round_trip() {
    for text in [CORE, REFS] {
        let original = wasm(text);
        let reencoded = wasmcodec::reencode(&original).unwrap();
        assert_eq!(
            wasmcodec::print(&original).unwrap(),
            wasmcodec::print(&reencoded).unwrap()
        );
    }
}

#[test]
fn canonical_round_trip() {
    let original = wasm(CORE);
    assert_eq!(wasmcodec::reencode(&original).unwrap(), original);
}

#[test]
fn reencoding_is_idempotent() {
    for text in [CORE, REFS] {
        let once = wasmcodec::reencode(&wasm(text)).unwrap();
        let twice = wasmcodec::reencode(&once).unwrap();
        assert_eq!(once, twice);
    }
}

#[test]
fn float_payloads_survive() {
    let dump = wasmcodec::print(&wasm(CORE)).unwrap();
    assert!(dump.contains("f32.const 0x7fa00001"), "{dump}");
    assert!(dump.contains("f64.const 0x8000000000000000"), "{dump}");
}

#[test]
fn data_count_is_kept_in_place() {
    let dump = wasmcodec::print(&wasm(REFS)).unwrap();
    let data_count = dump.find("datacount 2").unwrap();
    let element = dump.find("element section").unwrap();
    let code = dump.find("code section").unwrap();
    assert!(element < data_count && data_count < code, "{dump}");
}

/// A type section whose size is padded to five bytes.
const PADDED: [u8; 18] = [
    0x00, 0x61, 0x73, 0x6d, 0x01, 0x00, 0x00, 0x00, // header
    0x01, 0x84, 0x80, 0x80, 0x80, 0x00, // type section, size 4
    0x01, 0x60, 0x00, 0x00, // [] -> []
];

#[test]
fn padded_integers_are_canonicalized() {
    let canonical = wasmcodec::reencode(&PADDED).unwrap();
    assert_eq!(
        canonical,
        [0x00, 0x61, 0x73, 0x6d, 0x01, 0x00, 0x00, 0x00, 0x01, 0x04, 0x01, 0x60, 0x00, 0x00]
    );
    assert_eq!(
        wasmcodec::print(&PADDED).unwrap(),
        wasmcodec::print(&canonical).unwrap()
    );

    let error = wasmcodec::reencode_with_config(&PADDED, DecoderConfig::strict()).unwrap_err();
    assert_eq!(error.kind, ErrorKind::NonCanonicalVarint);
    assert_eq!(error.offset, 14);
}

#[test]
fn empty_sections_are_dropped() {
    // A function section with no entries.
    let bytes = [0x00, 0x61, 0x73, 0x6d, 0x01, 0x00, 0x00, 0x00, 0x03, 0x01, 0x00];
    assert_eq!(
        wasmcodec::print(&bytes).unwrap(),
        "module version=1\nfunction section\n  end\nend module\n"
    );

    let reencoded = wasmcodec::reencode(&bytes).unwrap();
    assert_eq!(reencoded, &bytes[..8]);
    assert_eq!(
        wasmcodec::print(&reencoded).unwrap(),
        "module version=1\nend module\n"
    );
}
