use crate::common::{DecodeOptions, open};
use anyhow::{Context, Result};
use clap::Parser;
use std::io::Write;
use std::path::PathBuf;
use wasmcodec_binary::Decoder;
use wasmcodec_visitor::Printer;

#[derive(Debug, Parser)]
/// The options for the `wasmcodec dump` subcommand
pub struct Dump {
    /// WebAssembly binary to print
    #[clap(name = "FILE")]
    path: PathBuf,

    #[clap(flatten)]
    decode: DecodeOptions,
}

impl Dump {
    /// Runs logic for the `dump` subcommand
    pub fn execute(&self) -> Result<()> {
        self.inner_execute()
            .context(format!("failed to dump `{}`", self.path.display()))
    }

    fn inner_execute(&self) -> Result<()> {
        let mut printer = Printer::new();
        let mut decoder = Decoder::with_config(open(&self.path)?, self.decode.config());
        let result = decoder.decode(&mut printer);
        // Print what was decoded before reporting a failure.
        std::io::stdout().write_all(printer.as_str().as_bytes())?;
        result?;
        Ok(())
    }
}
