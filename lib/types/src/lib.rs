//! The common types of the WebAssembly binary codec.
//!
//! This crate provides the value and entity types handed to visitors, the
//! opcode table both the decoder and the encoder dispatch on, the error
//! types of a decode pass, and the decoder configuration.

#![deny(missing_docs, unused_extern_crates)]
#![warn(unused_import_braces)]
#![cfg_attr(feature = "cargo-clippy", allow(clippy::new_without_default))]
#![cfg_attr(
    feature = "cargo-clippy",
    warn(
        clippy::mut_mut,
        clippy::nonminimal_bool,
        clippy::map_unwrap_or,
        clippy::print_stdout,
        clippy::use_self
    )
)]

mod config;
pub mod error;
mod opcode;
mod section;
mod types;

pub use crate::config::{DecoderConfig, LebPolicy};
pub use crate::error::{BinaryError, BinaryResult, ErrorKind, VisitError, VisitResult};
pub use crate::opcode::{Encoding, Immediate, Opcode, PREFIX_MISC};
pub use crate::section::{MAGIC, SectionId, VERSION};
pub use crate::types::{
    BlockType, DataMode, ElementMode, ExternalKind, FuncType, GlobalType, Ieee32, Ieee64, Limits,
    MemArg, MemoryType, Mutability, RefType, TableType, ValueType, join,
};
