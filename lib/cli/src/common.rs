//! Options and helpers shared by the subcommands.

use anyhow::{Context, Result};
use clap::Parser;
use std::fs::File;
use std::path::Path;
use wasmcodec_types::{DecoderConfig, LebPolicy};

#[derive(Debug, Parser, Clone, Default)]
/// How strictly modules are decoded.
pub struct DecodeOptions {
    /// Reject LEB128 integers that are not minimally encoded.
    #[clap(long)]
    pub strict_leb: bool,

    /// Reject `else` outside of an `if`, or a second `else` in one `if`.
    #[clap(long)]
    pub strict_nesting: bool,

    /// Maximum number of locals a function body may declare.
    #[clap(long, default_value_t = DecoderConfig::DEFAULT_MAX_LOCALS)]
    pub max_locals: usize,
}

impl DecodeOptions {
    /// The decoder configuration these options describe.
    pub fn config(&self) -> DecoderConfig {
        let mut config = DecoderConfig::new();
        config
            .leb_policy(if self.strict_leb {
                LebPolicy::Strict
            } else {
                LebPolicy::Permissive
            })
            .strict_nesting(self.strict_nesting)
            .max_locals(self.max_locals);
        config
    }
}

/// Opens a module for streaming decoding. The decoder buffers reads itself.
pub fn open(path: &Path) -> Result<File> {
    File::open(path).with_context(|| format!("failed to open `{}`", path.display()))
}

/// Writes `bytes` to `path`.
pub fn write(path: &Path, bytes: &[u8]) -> Result<()> {
    std::fs::write(path, bytes).with_context(|| format!("failed to write `{}`", path.display()))
}
