//! Streaming decoder and encoder for the WebAssembly binary format.
//!
//! [`Decoder`] reads a module from any [`std::io::Read`] source and emits
//! its structure as events to a [`ModuleVisitor`](wasmcodec_visitor::ModuleVisitor)
//! pipeline. [`Encoder`] is a pipeline stage writing those events back to
//! bytes, so re-encoding a module is a decode into an encoder:
//!
//! ```
//! use wasmcodec_binary::{Decoder, Encoder};
//! use wasmcodec_visitor::CustomSectionFilter;
//!
//! let module = b"\0asm\x01\0\0\0\0\x05\x04name";
//! let mut encoder = Encoder::new();
//! let mut strip = CustomSectionFilter::new(&mut encoder, |_| false);
//! Decoder::new(&module[..]).decode(&mut strip)?;
//! assert_eq!(strip.dropped(), 1);
//! assert_eq!(encoder.finish(), b"\0asm\x01\0\0\0");
//! # Ok::<(), wasmcodec_types::BinaryError>(())
//! ```

#![deny(missing_docs, unused_extern_crates)]
#![warn(unused_import_braces)]
#![cfg_attr(feature = "cargo-clippy", allow(clippy::new_without_default))]

mod decoder;
mod encoder;
pub mod leb;
mod reader;
mod writer;

pub use crate::decoder::{DecodeStats, Decoder, decode_expression};
pub use crate::encoder::{Encoder, ExpressionEncoder};
pub use crate::reader::{Bounded, ByteReader};
pub use crate::writer::{ByteWriter, ToBytes};
