//! Terminal output

use console::{style, Term};
use plr::{EditKind, LocatorStatus};
use serde::Serialize;

use crate::config::CliConfig;
use crate::error::CliResult;

/// Writes command results to stdout
#[derive(Debug)]
pub struct Printer {
    term: Term,
    /// Whether to use colors
    pub use_color: bool,
    /// Quiet mode
    pub quiet: bool,
}

impl Default for Printer {
    fn default() -> Self {
        Self::new(false, false)
    }
}

impl Printer {
    /// Create a new printer
    #[must_use]
    pub fn new(use_color: bool, quiet: bool) -> Self {
        Self {
            term: Term::stdout(),
            use_color,
            quiet,
        }
    }

    /// Printer configured from global flags
    #[must_use]
    pub fn from_config(config: &CliConfig) -> Self {
        Self::new(config.color.should_color(), config.verbosity.is_quiet())
    }

    /// Print a result line (always shown)
    pub fn line(&self, message: &str) {
        let _ = self.term.write_line(message);
    }

    /// Print a section heading (hidden in quiet mode)
    pub fn heading(&self, title: &str) {
        if self.quiet {
            return;
        }
        let title = if self.use_color {
            style(title).bold().underlined().to_string()
        } else {
            title.to_string()
        };
        let _ = self.term.write_line(&title);
    }

    /// Print a `label: value` summary line (hidden in quiet mode)
    pub fn field(&self, label: &str, value: impl std::fmt::Display) {
        if self.quiet {
            return;
        }
        let label = if self.use_color {
            style(format!("{label}:")).dim().to_string()
        } else {
            format!("{label}:")
        };
        let _ = self.term.write_line(&format!("{label} {value}"));
    }

    /// Print a warning (hidden in quiet mode)
    pub fn warning(&self, message: &str) {
        if self.quiet {
            return;
        }
        let prefix = if self.use_color {
            style("!").yellow().bold().to_string()
        } else {
            "WARN".to_string()
        };
        let _ = self.term.write_line(&format!("{prefix} {message}"));
    }

    /// Pretty JSON on stdout
    pub fn json<T: Serialize>(&self, value: &T) -> CliResult<()> {
        let json = serde_json::to_string_pretty(value)?;
        let _ = self.term.write_line(&json);
        Ok(())
    }

    /// Fixed-width label for a locator status
    #[must_use]
    pub fn status_label(&self, status: LocatorStatus) -> String {
        let label = format!("{status:<10}");
        if !self.use_color {
            return label;
        }
        match status {
            LocatorStatus::Stable => style(label).green().to_string(),
            LocatorStatus::Remediated => style(label).yellow().bold().to_string(),
        }
    }

    /// Fixed-width label for an edit kind
    #[must_use]
    pub fn edit_label(&self, kind: EditKind) -> String {
        let text = match kind {
            EditKind::Unchanged => "=",
            EditKind::Renamed => "~",
            EditKind::Inserted => "+",
            EditKind::Deleted => "-",
        };
        if !self.use_color {
            return text.to_string();
        }
        let styled = style(text);
        match kind {
            EditKind::Unchanged => styled.dim(),
            EditKind::Renamed => styled.yellow(),
            EditKind::Inserted => styled.green(),
            EditKind::Deleted => styled.red(),
        }
        .to_string()
    }
}
