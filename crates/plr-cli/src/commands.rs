//! CLI command definitions using clap

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// PLR: diff page snapshots and regenerate broken UI test locators
#[derive(Parser, Debug)]
#[command(name = "plr")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (errors only)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Color output (auto, always, never)
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorArg,

    /// Write logs to stderr as JSON lines
    #[arg(long, global = true)]
    pub log_json: bool,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Compute the tree edit distance and node mapping between two snapshots
    Diff(DiffArgs),

    /// Track locators across two snapshots and regenerate the broken ones
    Analyze(AnalyzeArgs),

    /// Build a locator bundle for one element of a snapshot
    Locate(LocateArgs),

    /// Compare two texts by SimHash fingerprint
    Fingerprint(FingerprintArgs),
}

/// Output format
#[derive(ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable text
    #[default]
    Text,
    /// JSON on stdout
    Json,
}

/// Arguments for the diff command
#[derive(Parser, Debug)]
pub struct DiffArgs {
    /// Old snapshot (JSON tree or capture envelope)
    pub old: PathBuf,

    /// New snapshot (JSON tree or capture envelope)
    pub new: PathBuf,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub format: OutputFormat,

    /// Also list unchanged pairs
    #[arg(long)]
    pub all: bool,

    /// Engine configuration file (.yaml, .yml or .json)
    #[arg(short, long, env = "PLR_CONFIG")]
    pub config: Option<PathBuf>,
}

/// Which elements the analyze command tracks
#[derive(ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ModeArg {
    /// Every element carrying an id or class
    #[default]
    Complete,
    /// One element selected with --target-id
    Single,
}

/// Arguments for the analyze command
#[derive(Parser, Debug)]
pub struct AnalyzeArgs {
    /// Old snapshot (JSON tree or capture envelope)
    pub old: PathBuf,

    /// New snapshot (JSON tree or capture envelope)
    pub new: PathBuf,

    /// Tracking mode
    #[arg(short, long, value_enum, default_value = "complete")]
    pub mode: ModeArg,

    /// Element id to track in single mode
    #[arg(long)]
    pub target_id: Option<String>,

    /// Engine configuration file (.yaml, .yml or .json)
    #[arg(short, long, env = "PLR_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub format: OutputFormat,
}

/// Arguments for the locate command
#[derive(Parser, Debug)]
#[command(group(
    clap::ArgGroup::new("target")
        .required(true)
        .args(["id", "class"]),
))]
pub struct LocateArgs {
    /// Snapshot (JSON tree or capture envelope)
    pub snapshot: PathBuf,

    /// Locate the first element with this id
    #[arg(long)]
    pub id: Option<String>,

    /// Locate the first element whose class attribute contains this token
    #[arg(long)]
    pub class: Option<String>,

    /// Engine configuration file (.yaml, .yml or .json)
    #[arg(short, long, env = "PLR_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub format: OutputFormat,
}

/// Arguments for the fingerprint command
#[derive(Parser, Debug)]
pub struct FingerprintArgs {
    /// First text
    pub text_a: String,

    /// Second text
    pub text_b: String,

    /// Fingerprint width in bits (1-64), overriding the configured width
    #[arg(short, long)]
    pub width: Option<u32>,

    /// Engine configuration file (.yaml, .yml or .json)
    #[arg(short, long, env = "PLR_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub format: OutputFormat,
}

/// Color argument
#[derive(ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ColorArg {
    /// Automatic color detection
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

impl From<ColorArg> for crate::config::ColorChoice {
    fn from(arg: ColorArg) -> Self {
        match arg {
            ColorArg::Auto => Self::Auto,
            ColorArg::Always => Self::Always,
            ColorArg::Never => Self::Never,
        }
    }
}
