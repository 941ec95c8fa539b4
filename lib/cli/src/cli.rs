//! The logic for the wasmcodec CLI tool.

use crate::commands::{Check, Dump, Roundtrip, Strip};
use crate::logging::Output;
use anyhow::Result;
use clap::{Parser, Subcommand};
use console::style;

#[derive(Parser)]
#[clap(
    name = "wasmcodec",
    about = "Decode, check and re-encode WebAssembly binaries.",
    version,
    author
)]
/// The options for the wasmcodec Command Line Interface
struct WasmcodecCLIOptions {
    #[clap(flatten)]
    output: Output,

    #[clap(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand)]
enum Cmd {
    /// Print the event stream of a module
    #[clap(name = "dump")]
    Dump(Dump),

    /// Decode a whole module and print statistics
    #[clap(name = "check")]
    Check(Check),

    /// Decode and re-encode a module
    #[clap(name = "roundtrip")]
    Roundtrip(Roundtrip),

    /// Re-encode a module without its custom sections
    #[clap(name = "strip")]
    Strip(Strip),
}

impl WasmcodecCLIOptions {
    fn execute(&self) -> Result<()> {
        self.output.initialize_logging();
        match &self.cmd {
            Cmd::Dump(options) => options.execute(),
            Cmd::Check(options) => options.execute(),
            Cmd::Roundtrip(options) => options.execute(),
            Cmd::Strip(options) => options.execute(),
        }
    }
}

/// The main function for the wasmcodec CLI tool.
pub fn wasmcodec_main() {
    let options = WasmcodecCLIOptions::parse();
    if let Err(error) = options.execute() {
        eprintln!("{}: {error:?}", style("error").red().bold());
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn command_is_well_formed() {
        WasmcodecCLIOptions::command().debug_assert();
    }

    #[test]
    fn parses_strip() {
        let options = WasmcodecCLIOptions::try_parse_from([
            "wasmcodec", "strip", "in.wasm", "-o", "out.wasm", "--keep", "name", "--keep", "producers",
        ])
        .unwrap();
        assert!(matches!(options.cmd, Cmd::Strip(_)));
        assert_eq!(options.output.verbose, 0);
    }

    #[test]
    fn verbose_is_global() {
        let options =
            WasmcodecCLIOptions::try_parse_from(["wasmcodec", "check", "in.wasm", "-vv"]).unwrap();
        assert!(matches!(options.cmd, Cmd::Check(_)));
        assert_eq!(options.output.verbose, 2);
    }
}
