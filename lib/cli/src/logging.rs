//! Logging for the wasmcodec CLI.

use clap::Parser;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// The crates whose events `--verbose` turns on.
const TARGETS: [&str; 3] = ["wasmcodec", "wasmcodec_binary", "wasmcodec_cli"];

/// Output options shared by every subcommand.
#[derive(Debug, Parser, Clone, Copy, Default)]
pub struct Output {
    /// Log what the decoder does (-v info, -vv debug, -vvv trace).
    /// `$RUST_LOG` takes precedence when set.
    #[clap(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

impl Output {
    /// The level `--verbose` asks for.
    pub fn level(&self) -> LevelFilter {
        match self.verbose {
            0 => LevelFilter::OFF,
            1 => LevelFilter::INFO,
            2 => LevelFilter::DEBUG,
            _ => LevelFilter::TRACE,
        }
    }

    /// Filter directives enabling [`Output::level`] for this workspace's
    /// crates only.
    fn directives(&self) -> String {
        let level = self.level();
        TARGETS
            .iter()
            .map(|target| format!("{target}={level}"))
            .collect::<Vec<_>>()
            .join(",")
    }

    /// Install the global subscriber. `$RUST_LOG` wins over `--verbose`.
    pub fn initialize_logging(&self) {
        let fmt_layer = fmt::layer()
            .with_target(true)
            .with_span_events(fmt::format::FmtSpan::CLOSE)
            .with_ansi(should_emit_colors())
            .with_writer(std::io::stderr)
            .compact();

        let filter_layer = if std::env::var_os(EnvFilter::DEFAULT_ENV).is_some() {
            EnvFilter::builder().from_env_lossy()
        } else {
            EnvFilter::new(self.directives())
        };

        tracing_subscriber::registry()
            .with(filter_layer)
            .with(fmt_layer)
            .init();
    }
}

/// Check whether we should emit ANSI escape codes for log formatting.
///
/// See https://github.com/tokio-rs/tracing/issues/2388
fn should_emit_colors() -> bool {
    console::Term::stderr().features().colors_supported()
        && std::env::var_os("NO_COLOR").is_none()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbosity_selects_level() {
        let quiet = Output::try_parse_from(["wasmcodec"]).unwrap();
        assert_eq!(quiet.level(), LevelFilter::OFF);

        let loud = Output::try_parse_from(["wasmcodec", "-vv"]).unwrap();
        assert_eq!(loud.verbose, 2);
        assert_eq!(
            loud.directives(),
            "wasmcodec=debug,wasmcodec_binary=debug,wasmcodec_cli=debug"
        );

        let louder = Output { verbose: 7 };
        assert_eq!(louder.level(), LevelFilter::TRACE);
    }
}
