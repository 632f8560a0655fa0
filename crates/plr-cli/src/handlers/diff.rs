//! Diff command handler.
//!
//! Orchestrates: load both snapshots -> clean and parse -> diff -> render.

use plr::{diff, Analyzer, DiffResult, EditKind, EditSummary};
use serde::Serialize;

use super::{load_engine_config, load_snapshot};
use crate::commands::{DiffArgs, OutputFormat};
use crate::config::CliConfig;
use crate::error::CliResult;
use crate::output::Printer;

/// One mapping pair, rendered
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PairRow {
    /// Pair classification
    pub kind: EditKind,
    /// Old node, e.g. `button#save.btn`
    pub old: Option<String>,
    /// New node
    pub new: Option<String>,
}

/// Serializable diff output
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiffSummary {
    /// Tree edit distance
    pub distance: f64,
    /// Pair counts by kind
    pub edits: EditSummary,
    /// Listed pairs
    pub pairs: Vec<PairRow>,
}

impl DiffSummary {
    /// Summarize a diff, omitting unchanged pairs unless `include_unchanged`
    #[must_use]
    pub fn from_result(result: &DiffResult<'_>, include_unchanged: bool) -> Self {
        let pairs = result
            .mapping
            .iter()
            .filter(|p| include_unchanged || p.kind() != EditKind::Unchanged)
            .map(|p| PairRow {
                kind: p.kind(),
                old: p.old.map(ToString::to_string),
                new: p.new.map(ToString::to_string),
            })
            .collect();
        Self {
            distance: result.distance,
            edits: EditSummary::from_mapping(&result.mapping),
            pairs,
        }
    }
}

/// Execute the diff command.
pub fn execute_diff(config: &CliConfig, args: &DiffArgs) -> CliResult<()> {
    let analyzer = Analyzer::new(load_engine_config(args.config.as_deref())?)?;
    let old = analyzer.parse(&load_snapshot(&args.old)?)?;
    let new = analyzer.parse(&load_snapshot(&args.new)?)?;

    tracing::debug!(
        old_nodes = old.node_count(),
        new_nodes = new.node_count(),
        "diffing snapshots"
    );
    let result = diff(&old, &new)?;
    let summary = DiffSummary::from_result(&result, args.all);

    let printer = Printer::from_config(config);
    match args.format {
        OutputFormat::Json => printer.json(&summary)?,
        OutputFormat::Text => render_text(&printer, &summary),
    }
    Ok(())
}

fn render_text(printer: &Printer, summary: &DiffSummary) {
    printer.heading("Tree diff");
    printer.field("distance", format!("{:.3}", summary.distance));
    printer.field(
        "pairs",
        format!(
            "{} unchanged, {} renamed, {} inserted, {} deleted",
            summary.edits.unchanged,
            summary.edits.renamed,
            summary.edits.inserted,
            summary.edits.deleted
        ),
    );
    for pair in &summary.pairs {
        let label = printer.edit_label(pair.kind);
        let line = match (&pair.old, &pair.new) {
            (Some(old), Some(new)) if old == new => format!("{label} {old}"),
            (Some(old), Some(new)) => format!("{label} {old} -> {new}"),
            (Some(old), None) => format!("{label} {old}"),
            (None, Some(new)) => format!("{label} {new}"),
            (None, None) => continue,
        };
        printer.line(&line);
    }
}
