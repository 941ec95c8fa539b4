use crate::common::{DecodeOptions, write};
use anyhow::{Context, Result};
use clap::Parser;
use console::style;
use std::path::PathBuf;
use wasmcodec_binary::{Decoder, Encoder};

#[derive(Debug, Parser)]
/// The options for the `wasmcodec roundtrip` subcommand
pub struct Roundtrip {
    /// WebAssembly binary to re-encode
    #[clap(name = "FILE")]
    path: PathBuf,

    /// Where to write the re-encoded module
    #[clap(short, long)]
    output: Option<PathBuf>,

    #[clap(flatten)]
    decode: DecodeOptions,
}

impl Roundtrip {
    /// Runs logic for the `roundtrip` subcommand
    pub fn execute(&self) -> Result<()> {
        self.inner_execute()
            .context(format!("failed to re-encode `{}`", self.path.display()))
    }

    fn inner_execute(&self) -> Result<()> {
        let original = std::fs::read(&self.path)?;
        let mut encoder = Encoder::new();
        Decoder::with_config(&original[..], self.decode.config()).decode(&mut encoder)?;
        let encoded = encoder.finish();

        if encoded == original {
            eprintln!("{} output is byte-identical", style("ok").green().bold());
        } else {
            eprintln!(
                "{} output differs: {} bytes in, {} bytes out",
                style("note").yellow().bold(),
                original.len(),
                encoded.len()
            );
        }
        if let Some(output) = &self.output {
            write(output, &encoded)?;
        }
        Ok(())
    }
}
