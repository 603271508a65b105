//! Log setup for the `ensbind` binary.
//!
//! stdout is reserved for command output (hashes, JSON reports), so every
//! log line goes to stderr. `RUST_LOG` replaces [`DEFAULT_DIRECTIVES`].

use clap::ValueEnum;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Filter used when `RUST_LOG` is unset.
pub const DEFAULT_DIRECTIVES: &str = "ensbind=info,ensbind_protocol=info,ensbind_contracts=warn";

/// How log lines are rendered on stderr.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// For a terminal.
    Pretty,
    /// One JSON object per line.
    Json,
}

fn filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVES))
}

/// Install the global subscriber. Must run once, before the first event.
pub fn init_logging(format: LogFormat) {
    let (pretty, json) = match format {
        LogFormat::Pretty => (
            Some(fmt::layer().with_writer(std::io::stderr).with_target(true)),
            None,
        ),
        LogFormat::Json => (
            None,
            Some(
                fmt::layer()
                    .json()
                    .with_writer(std::io::stderr)
                    .with_current_span(false),
            ),
        ),
    };

    tracing_subscriber::registry()
        .with(filter())
        .with(pretty)
        .with(json)
        .init();

    tracing::debug!(?format, directives = DEFAULT_DIRECTIVES, "logging ready");
}
