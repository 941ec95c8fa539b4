use crate::common::{DecodeOptions, open, write};
use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use wasmcodec_binary::{Decoder, Encoder};
use wasmcodec_visitor::CustomSectionFilter;

#[derive(Debug, Parser)]
/// The options for the `wasmcodec strip` subcommand
pub struct Strip {
    /// WebAssembly binary to strip
    #[clap(name = "FILE")]
    path: PathBuf,

    /// Where to write the stripped module
    #[clap(short, long)]
    output: PathBuf,

    /// Custom sections to keep, by name
    #[clap(long = "keep", name = "NAME")]
    keep: Vec<String>,

    #[clap(flatten)]
    decode: DecodeOptions,
}

impl Strip {
    /// Runs logic for the `strip` subcommand
    pub fn execute(&self) -> Result<()> {
        self.inner_execute()
            .context(format!("failed to strip `{}`", self.path.display()))
    }

    fn inner_execute(&self) -> Result<()> {
        let mut encoder = Encoder::new();
        let mut filter =
            CustomSectionFilter::new(&mut encoder, |name| self.keep.iter().any(|k| k == name));
        Decoder::with_config(open(&self.path)?, self.decode.config()).decode(&mut filter)?;
        let dropped = filter.dropped();
        tracing::info!(dropped, "custom sections removed");
        write(&self.output, &encoder.finish())?;
        eprintln!("Removed {dropped} custom section(s).");
        Ok(())
    }
}
