//! Fingerprint command handler.

use plr::{Fingerprint, SimHash};
use serde::Serialize;

use super::load_engine_config;
use crate::commands::{FingerprintArgs, OutputFormat};
use crate::config::CliConfig;
use crate::error::CliResult;
use crate::output::Printer;

/// Serializable fingerprint comparison
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FingerprintOutput {
    /// Width in bits
    pub width: u32,
    /// Fingerprint of the first text, hex
    pub a: String,
    /// Fingerprint of the second text, hex
    pub b: String,
    /// Hamming distance
    pub distance: u32,
}

/// Fingerprint both texts and compare them
pub fn compare(a: &str, b: &str, width: u32) -> CliResult<FingerprintOutput> {
    Ok(compare_with(&SimHash::new(width)?, a, b))
}

/// Compare with an already configured fingerprinter
#[must_use]
pub fn compare_with(simhash: &SimHash, a: &str, b: &str) -> FingerprintOutput {
    let width = simhash.width();
    let (fa, fb): (Fingerprint, Fingerprint) = (simhash.compute(a), simhash.compute(b));
    FingerprintOutput {
        width,
        a: fa.to_hex(),
        b: fb.to_hex(),
        distance: simhash.distance(&fa, &fb),
    }
}

/// Execute the fingerprint command.
pub fn execute_fingerprint(config: &CliConfig, args: &FingerprintArgs) -> CliResult<()> {
    let simhash = match args.width {
        Some(width) => SimHash::new(width)?,
        None => load_engine_config(args.config.as_deref())?.simhash()?,
    };
    let output = compare_with(&simhash, &args.text_a, &args.text_b);
    let printer = Printer::from_config(config);
    match args.format {
        OutputFormat::Json => printer.json(&output)?,
        OutputFormat::Text => {
            printer.field("a", &output.a);
            printer.field("b", &output.b);
            printer.line(&format!("distance: {}/{}", output.distance, output.width));
        }
    }
    Ok(())
}
