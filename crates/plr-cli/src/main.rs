//! PLR CLI: diff page snapshots and regenerate broken UI test locators
//!
//! ## Usage
//!
//! ```bash
//! plr diff old.json new.json                        # Edit distance and mapping
//! plr analyze old.json new.json --format json       # Remediation report
//! plr analyze old.json new.json -m single --target-id checkout
//! plr locate page.json --class btn-primary          # Locator bundle
//! plr fingerprint "Add to cart" "Add to basket"     # SimHash distance
//! ```

use clap::Parser;
use plr_cli::{handlers, logging, Cli, CliConfig, CliResult, ColorChoice, Commands, Verbosity};
use std::process::ExitCode;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> CliResult<()> {
    let cli = Cli::parse();

    // Build configuration from CLI args
    let config = build_config(&cli);
    logging::init(&config);

    match &cli.command {
        Commands::Diff(args) => handlers::execute_diff(&config, args),
        Commands::Analyze(args) => handlers::execute_analyze(&config, args),
        Commands::Locate(args) => handlers::execute_locate(&config, args),
        Commands::Fingerprint(args) => handlers::execute_fingerprint(&config, args),
    }
}

fn build_config(cli: &Cli) -> CliConfig {
    let verbosity = Verbosity::from_flags(cli.quiet, cli.verbose);
    let color: ColorChoice = cli.color.into();

    CliConfig::new()
        .with_verbosity(verbosity)
        .with_color(color)
        .with_log_json(cli.log_json)
}
