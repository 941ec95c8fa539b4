use crate::common::{DecodeOptions, open};
use anyhow::{Context, Result};
use clap::Parser;
use console::style;
use std::path::PathBuf;
use wasmcodec_binary::Decoder;
use wasmcodec_visitor::Discard;

#[derive(Debug, Parser)]
/// The options for the `wasmcodec check` subcommand
pub struct Check {
    /// WebAssembly binary to check
    #[clap(name = "FILE")]
    path: PathBuf,

    #[clap(flatten)]
    decode: DecodeOptions,
}

impl Check {
    /// Runs logic for the `check` subcommand
    pub fn execute(&self) -> Result<()> {
        self.inner_execute()
            .context(format!("failed to check `{}`", self.path.display()))
    }

    fn inner_execute(&self) -> Result<()> {
        let mut decoder = Decoder::with_config(open(&self.path)?, self.decode.config());
        decoder.decode(&mut Discard)?;
        eprintln!(
            "{} `{}` is well-formed: {}",
            style("ok").green().bold(),
            self.path.display(),
            decoder.stats()
        );
        Ok(())
    }
}
