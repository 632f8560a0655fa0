//! Locate command handler.
//!
//! Finds one element of a snapshot by id or class token and prints the
//! locator bundle the engine would use for it.

use plr::{count_matches, Analyzer, BundleComposer, LocatorBundle, TreeNode};
use serde::Serialize;

use super::{load_engine_config, load_snapshot};
use crate::commands::{LocateArgs, OutputFormat};
use crate::config::CliConfig;
use crate::error::{CliError, CliResult};
use crate::output::Printer;

/// Serializable locate output
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocateOutput {
    /// Element the bundle was built for
    pub element: String,
    /// Locator bundle
    pub bundle: LocatorBundle,
    /// Matches of the primary selector in the snapshot
    pub primary_matches: usize,
}

/// First element in document order matching the requested id or class token
pub fn find_target<'a>(
    root: &'a TreeNode,
    id: Option<&str>,
    class: Option<&str>,
) -> CliResult<&'a TreeNode> {
    let found = match (id, class) {
        (Some(id), _) => root.iter().find(|n| n.id() == Some(id)),
        (None, Some(class)) => root.iter().find(|n| n.has_class(class)),
        (None, None) => {
            return Err(CliError::invalid_argument("either --id or --class is required"))
        }
    };
    found.ok_or_else(|| {
        CliError::invalid_argument(match (id, class) {
            (Some(id), _) => format!("no element with id '{id}'"),
            (None, class) => format!("no element with class '{}'", class.unwrap_or_default()),
        })
    })
}

/// Execute the locate command.
pub fn execute_locate(config: &CliConfig, args: &LocateArgs) -> CliResult<()> {
    let analyzer = Analyzer::new(load_engine_config(args.config.as_deref())?)?;
    let root = analyzer.parse(&load_snapshot(&args.snapshot)?)?;
    let target = find_target(&root, args.id.as_deref(), args.class.as_deref())?;

    let bundle = BundleComposer::new(analyzer.config().weights).compose(target, &root);
    let output = LocateOutput {
        element: target.to_string(),
        primary_matches: count_matches(&bundle.primary, &root),
        bundle,
    };

    let printer = Printer::from_config(config);
    match args.format {
        OutputFormat::Json => printer.json(&output)?,
        OutputFormat::Text => render_text(&printer, &output),
    }
    Ok(())
}

fn render_text(printer: &Printer, output: &LocateOutput) {
    printer.heading(&format!("Locators for {}", output.element));
    printer.line(&format!("primary:   {}", output.bundle.primary));
    printer.line(&format!("secondary: {}", output.bundle.secondary));
    printer.line(&format!("tertiary:  {}", output.bundle.tertiary));
    if output.primary_matches != 1 {
        printer.warning(&format!(
            "primary selector matches {} elements",
            output.primary_matches
        ));
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn page() -> TreeNode {
        TreeNode::new("body")
            .with_child(
                TreeNode::new("button")
                    .with_attribute("class", "btn primary")
                    .with_text("Buy"),
            )
            .with_child(TreeNode::new("button").with_attribute("id", "cancel"))
    }

    #[test]
    fn test_find_by_id() {
        let root = page();
        let found = find_target(&root, Some("cancel"), None).unwrap();
        assert_eq!(found.id(), Some("cancel"));
    }

    #[test]
    fn test_find_by_class_token() {
        let root = page();
        let found = find_target(&root, None, Some("primary")).unwrap();
        assert_eq!(found.text(), "Buy");
    }

    #[test]
    fn test_missing_target() {
        let root = page();
        let err = find_target(&root, Some("nope"), None).unwrap_err();
        assert!(err.to_string().contains("nope"));
        assert!(find_target(&root, None, None).is_err());
    }

    #[test]
    fn test_render_warns_on_ambiguous_primary() {
        let output = LocateOutput {
            element: "li".to_string(),
            bundle: BundleComposer::default()
                .compose(&TreeNode::new("li"), &TreeNode::new("li")),
            primary_matches: 0,
        };
        render_text(&Printer::default(), &output);
    }
}
