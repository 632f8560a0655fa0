//! Analyze command handler.
//!
//! Orchestrates: load config -> load snapshots -> analyze -> partition the
//! remediations into auto-apply and review -> render.

use plr::{partition_patches, AnalysisReport, Analyzer, PatchPlan, TrackingMode};
use serde::Serialize;

use super::{load_engine_config, load_snapshot};
use crate::commands::{AnalyzeArgs, ModeArg, OutputFormat};
use crate::config::CliConfig;
use crate::error::{CliError, CliResult};
use crate::output::Printer;

/// Serializable analyze output
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalyzeOutput {
    /// Full analysis report
    pub report: AnalysisReport,
    /// Remediations split by review requirement
    pub plan: PatchPlan,
}

/// Tracking mode from command-line arguments
pub fn tracking_mode(args: &AnalyzeArgs) -> CliResult<TrackingMode> {
    match (args.mode, &args.target_id) {
        (ModeArg::Complete, None) => Ok(TrackingMode::Complete),
        (ModeArg::Complete, Some(_)) => Err(CliError::invalid_argument(
            "--target-id is only valid with --mode single",
        )),
        (ModeArg::Single, Some(target_id)) => Ok(TrackingMode::Single {
            target_id: target_id.clone(),
        }),
        (ModeArg::Single, None) => Err(CliError::invalid_argument(
            "--mode single requires --target-id",
        )),
    }
}

/// Execute the analyze command.
pub fn execute_analyze(config: &CliConfig, args: &AnalyzeArgs) -> CliResult<()> {
    let mode = tracking_mode(args)?;
    let analyzer = Analyzer::new(load_engine_config(args.config.as_deref())?)?;

    if config.verbosity.is_verbose() {
        tracing::info!(
            old = %args.old.display(),
            new = %args.new.display(),
            ?mode,
            "analyzing snapshot pair"
        );
    }

    let old = load_snapshot(&args.old)?;
    let new = load_snapshot(&args.new)?;
    let report = analyzer.analyze(&old, &new, &mode)?;
    let plan = partition_patches(report.patch_entries());

    let printer = Printer::from_config(config);
    match args.format {
        OutputFormat::Json => printer.json(&AnalyzeOutput { report, plan })?,
        OutputFormat::Text => render_text(&printer, &report, &plan),
    }
    Ok(())
}

fn render_text(printer: &Printer, report: &AnalysisReport, plan: &PatchPlan) {
    printer.heading("Locator analysis");
    if let Some(url) = &report.url {
        printer.field("page", url);
    }
    printer.field("distance", format!("{:.3}", report.distance));
    printer.field(
        "tracked",
        format!(
            "{} ({} remediated, {} lost)",
            report.entries.len() + report.lost.len(),
            report.remediations().count(),
            report.lost.len()
        ),
    );

    for row in report.report_rows() {
        printer.line(&format!(
            "{} {:<24} {} -> {} ({:.2})",
            printer.status_label(row.status),
            row.key,
            row.old_selector,
            row.new_selector,
            row.confidence
        ));
    }
    for lost in &report.lost {
        printer.warning(&format!("{} lost ({})", lost.key, lost.old_selector));
    }

    if plan.is_empty() {
        printer.field("patch", "nothing to patch");
    } else {
        printer.field(
            "patch",
            format!(
                "{} auto-apply, {} for review",
                plan.auto_apply.len(),
                plan.review.len()
            ),
        );
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn args(mode: ModeArg, target_id: Option<&str>) -> AnalyzeArgs {
        AnalyzeArgs {
            old: PathBuf::from("old.json"),
            new: PathBuf::from("new.json"),
            mode,
            target_id: target_id.map(ToString::to_string),
            config: None,
            format: OutputFormat::Text,
        }
    }

    mod mode_tests {
        use super::*;

        #[test]
        fn test_complete_mode() {
            assert_eq!(
                tracking_mode(&args(ModeArg::Complete, None)).unwrap(),
                TrackingMode::Complete
            );
        }

        #[test]
        fn test_single_mode_needs_target() {
            assert!(tracking_mode(&args(ModeArg::Single, None)).is_err());
            assert_eq!(
                tracking_mode(&args(ModeArg::Single, Some("save"))).unwrap(),
                TrackingMode::Single {
                    target_id: "save".to_string()
                }
            );
        }

        #[test]
        fn test_target_without_single_rejected() {
            assert!(tracking_mode(&args(ModeArg::Complete, Some("save"))).is_err());
        }
    }

    #[test]
    fn test_execute_missing_snapshot() {
        assert!(execute_analyze(&CliConfig::new(), &args(ModeArg::Complete, None)).is_err());
    }
}
