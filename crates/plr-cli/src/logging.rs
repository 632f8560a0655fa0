//! Log subscriber setup.
//!
//! The library only emits `tracing` events; the binary decides where they
//! go. Logs are written to stderr so that `--format json` output on stdout
//! stays machine-readable.

use std::sync::OnceLock;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::CliConfig;

static LOGGING: OnceLock<()> = OnceLock::new();

/// Filter from `RUST_LOG`, falling back to the verbosity default
#[must_use]
pub fn env_filter(config: &CliConfig) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.verbosity.log_filter()))
}

/// Install the global subscriber. Safe to call multiple times.
pub fn init(config: &CliConfig) {
    LOGGING.get_or_init(|| {
        let filter = env_filter(config);
        let builder = fmt::Subscriber::builder()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(config.verbosity.is_verbose());
        let installed = if config.log_json {
            tracing::subscriber::set_global_default(
                builder
                    .json()
                    .with_current_span(false)
                    .with_span_list(false)
                    .finish(),
            )
        } else {
            tracing::subscriber::set_global_default(
                builder.with_ansi(config.color.should_color()).finish(),
            )
        };
        let _ = installed;
    });
}
