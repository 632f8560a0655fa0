//! Command handlers - one module per subcommand
//!
//! Each handler loads its inputs, calls into the `plr` library and renders
//! the result as text or JSON.

pub mod analyze;
pub mod diff;
pub mod fingerprint;
pub mod locate;

pub use analyze::execute_analyze;
pub use diff::execute_diff;
pub use fingerprint::execute_fingerprint;
pub use locate::execute_locate;

use plr::PlrConfig;
use serde_json::Value;
use std::path::Path;

use crate::error::{CliError, CliResult};

/// Read a snapshot file as JSON
pub fn load_snapshot(path: &Path) -> CliResult<Value> {
    if !path.exists() {
        return Err(CliError::invalid_argument(format!(
            "Snapshot file not found: {}",
            path.display()
        )));
    }
    let contents = std::fs::read_to_string(path)
        .map_err(|e| CliError::snapshot(path.display().to_string(), e.to_string()))?;
    serde_json::from_str(&contents)
        .map_err(|e| CliError::snapshot(path.display().to_string(), format!("invalid JSON: {e}")))
}

/// Engine configuration from a `--config` file, or defaults
pub fn load_engine_config(path: Option<&Path>) -> CliResult<PlrConfig> {
    match path {
        Some(path) => PlrConfig::from_path(path).map_err(|e| {
            CliError::config(format!("failed to load {}: {e}", path.display()))
        }),
        None => Ok(PlrConfig::default()),
    }
}
