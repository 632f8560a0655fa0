//! PLR CLI Library
//!
//! Command-line interface for the PLR locator remediation engine.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)] // Error types are self-documenting

mod commands;
mod config;
mod error;
pub mod handlers;
pub mod logging;
mod output;

pub use commands::{
    AnalyzeArgs, Cli, ColorArg, Commands, DiffArgs, FingerprintArgs, LocateArgs, ModeArg,
    OutputFormat,
};
pub use config::{CliConfig, ColorChoice, Verbosity};
pub use error::{CliError, CliResult};
pub use output::Printer;
