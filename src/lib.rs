//! A streaming codec for the WebAssembly binary format.
//!
//! This crate re-exports the workspace crates and adds a few one-call
//! helpers on top of them:
//!
//! * [`types`]: value and entity types, the opcode table, errors and the
//!   decoder configuration,
//! * [`visitor`]: the event interfaces a decode pass drives, with
//!   delegation, and the provided stages,
//! * [`binary`]: the byte reader and writer, the decoder and the encoder.
//!
//! ```
//! let bytes = b"\0asm\x01\0\0\0\x08\x01\x00";
//! assert_eq!(wasmcodec::reencode(bytes)?, bytes);
//!
//! let dump = wasmcodec::print(bytes)?;
//! assert_eq!(dump, "module version=1\nstart 0\nend module\n");
//! # Ok::<(), wasmcodec::types::BinaryError>(())
//! ```

#![deny(missing_docs, unused_extern_crates)]
#![warn(unused_import_braces)]

pub use wasmcodec_binary as binary;
pub use wasmcodec_types as types;
pub use wasmcodec_visitor as visitor;

use crate::binary::{DecodeStats, Decoder, Encoder};
use crate::types::{BinaryResult, DecoderConfig};
use crate::visitor::{Discard, ModuleVisitor, Printer};

/// Decodes `bytes` into `visitor` with the default configuration.
pub fn decode(bytes: &[u8], visitor: &mut dyn ModuleVisitor) -> BinaryResult<DecodeStats> {
    decode_with_config(bytes, visitor, DecoderConfig::default())
}

/// Decodes `bytes` into `visitor`, returning the pass statistics.
pub fn decode_with_config(
    bytes: &[u8],
    visitor: &mut dyn ModuleVisitor,
    config: DecoderConfig,
) -> BinaryResult<DecodeStats> {
    let mut decoder = Decoder::with_config(bytes, config);
    decoder.decode(visitor)?;
    Ok(*decoder.stats())
}

/// Walks the whole module, failing on the first malformed byte.
pub fn check(bytes: &[u8]) -> BinaryResult<DecodeStats> {
    decode(bytes, &mut Discard)
}

/// Renders the event stream of a module, one line per event.
pub fn print(bytes: &[u8]) -> BinaryResult<String> {
    let mut printer = Printer::new();
    decode(bytes, &mut printer)?;
    Ok(printer.into_string())
}

/// Decodes a module and encodes it back.
///
/// The output is the canonical encoding of the module: minimal LEB128
/// integers, compressed locals, compact segment flags, no empty sections.
/// Re-encoding the output again yields the same bytes.
///
/// A known section declaring zero entries is dropped. Such a module prints
/// an extra empty section before re-encoding and none after it; every other
/// event survives unchanged.
pub fn reencode(bytes: &[u8]) -> BinaryResult<Vec<u8>> {
    reencode_with_config(bytes, DecoderConfig::default())
}

/// Like [`reencode`], with a custom decoder configuration.
pub fn reencode_with_config(bytes: &[u8], config: DecoderConfig) -> BinaryResult<Vec<u8>> {
    let mut encoder = Encoder::new();
    decode_with_config(bytes, &mut encoder, config)?;
    Ok(encoder.finish())
}
