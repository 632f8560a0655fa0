//! Snapshot-pair analysis.
//!
//! Ties the engine together: clean and parse both snapshots, diff them, feed
//! the matched pairs to the adaptive weighter, then classify every tracked
//! element as stable, changed or lost and compose locator bundles for the
//! survivors.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

use crate::adaptive::AdaptiveWeighter;
use crate::bundle::{BundleComposer, LocatorBundle, LocatorStatus};
use crate::cleaner::DomCleaner;
use crate::config::PlrConfig;
use crate::diff::{diff, EditKind, EditMapping};
use crate::integration::{PatchEntry, RegistryUpdate, ReportRow};
use crate::locator::{degraded_selector, AttributeWeights, Selector};
use crate::result::PlrResult;
use crate::tree::TreeNode;

/// Class value used in legacy selectors for elements without a `class`
pub const LEGACY_MISSING_CLASS: &str = "unknown";

/// Which old elements are tracked
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum TrackingMode {
    /// Every old element carrying an `id` or `class`
    #[default]
    Complete,
    /// The first old element with this id
    Single {
        /// Id to track
        target_id: String,
    },
}

/// A capture as stored by the page-capture collaborator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaptureEnvelope {
    /// Page the capture was taken from
    #[serde(default)]
    pub url: Option<String>,
    /// Raw snapshot tree
    pub dom_structure: Value,
}

impl CaptureEnvelope {
    /// Snapshot tree inside `value`, or `value` itself when it is not an envelope
    #[must_use]
    pub fn dom_structure(value: &Value) -> &Value {
        value.get("dom_structure").unwrap_or(value)
    }

    /// Page url of an envelope
    #[must_use]
    pub fn url(value: &Value) -> Option<&str> {
        value.get("url").and_then(Value::as_str)
    }
}

/// Outcome for one tracked element
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackedLocator {
    /// Tracked element key
    pub key: String,
    /// Selector derived from the old element
    pub old_selector: String,
    /// Bundle synthesized against the new tree
    pub bundle: LocatorBundle,
}

impl TrackedLocator {
    /// Stable or remediated
    #[must_use]
    pub const fn status(&self) -> LocatorStatus {
        self.bundle.status
    }
}

/// Tracked element with no counterpart in the new tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LostLocator {
    /// Tracked element key
    pub key: String,
    /// Selector derived from the old element
    pub old_selector: String,
}

/// Pair counts by edit kind
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditSummary {
    /// Matched with equal nodes
    pub unchanged: usize,
    /// Matched with differing nodes
    pub renamed: usize,
    /// Only in the new tree
    pub inserted: usize,
    /// Only in the old tree
    pub deleted: usize,
}

impl EditSummary {
    /// Count the pairs of a mapping
    #[must_use]
    pub fn from_mapping(mapping: &EditMapping<'_>) -> Self {
        Self {
            unchanged: mapping.count(EditKind::Unchanged),
            renamed: mapping.count(EditKind::Renamed),
            inserted: mapping.count(EditKind::Inserted),
            deleted: mapping.count(EditKind::Deleted),
        }
    }
}

/// Result of analyzing one snapshot pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    /// Page url, when the new snapshot was an envelope
    pub url: Option<String>,
    /// Tree edit distance
    pub distance: f64,
    /// Mapping pair counts
    pub edits: EditSummary,
    /// Weights used for synthesis
    pub weights: AttributeWeights,
    /// Tracked elements, remediated first
    pub entries: Vec<TrackedLocator>,
    /// Tracked elements that were deleted
    pub lost: Vec<LostLocator>,
}

impl AnalysisReport {
    /// Entries whose locator was regenerated
    pub fn remediations(&self) -> impl Iterator<Item = &TrackedLocator> {
        self.entries
            .iter()
            .filter(|e| e.status() == LocatorStatus::Remediated)
    }

    /// Entries whose element did not change
    pub fn stable(&self) -> impl Iterator<Item = &TrackedLocator> {
        self.entries
            .iter()
            .filter(|e| e.status() == LocatorStatus::Stable)
    }

    /// Whether any locator had to be regenerated
    #[must_use]
    pub fn needs_patch(&self) -> bool {
        self.remediations().next().is_some()
    }

    /// Patch entries for the remediated locators
    #[must_use]
    pub fn patch_entries(&self) -> Vec<PatchEntry> {
        self.remediations()
            .map(|e| PatchEntry {
                key: e.key.clone(),
                old_selector: e.old_selector.clone(),
                new_selector: e.bundle.primary.clone(),
                bundle: e.bundle.clone(),
                confidence: e.bundle.confidence,
            })
            .collect()
    }

    /// Registry updates for the remediated locators, stamped with `now`
    #[must_use]
    pub fn registry_updates(&self, now: DateTime<Utc>) -> Vec<RegistryUpdate> {
        self.remediations()
            .map(|e| RegistryUpdate {
                key: e.key.clone(),
                selector: e.bundle.primary.clone(),
                confidence: e.bundle.confidence,
                timestamp: now,
            })
            .collect()
    }

    /// One report row per tracked entry
    #[must_use]
    pub fn report_rows(&self) -> Vec<ReportRow> {
        self.entries
            .iter()
            .map(|e| ReportRow {
                status: e.status(),
                key: e.key.clone(),
                old_selector: e.old_selector.clone(),
                new_selector: e.bundle.primary.clone(),
                confidence: e.bundle.confidence,
            })
            .collect()
    }
}

/// Runs snapshot-pair analyses with one configuration and weight history
#[derive(Debug)]
pub struct Analyzer {
    config: PlrConfig,
    cleaner: Option<DomCleaner>,
    weighter: Arc<AdaptiveWeighter>,
}

impl Analyzer {
    /// Analyzer with a fresh weight history
    pub fn new(config: PlrConfig) -> PlrResult<Self> {
        config.validate()?;
        let cleaner = if config.dynamic_attribute_patterns.is_empty() {
            None
        } else {
            Some(DomCleaner::with_patterns(&config.dynamic_attribute_patterns)?)
        };
        let weighter = Arc::new(AdaptiveWeighter::with_config(config.adaptive));
        Ok(Self {
            config,
            cleaner,
            weighter,
        })
    }

    /// Share a weight history with other analyzers
    #[must_use]
    pub fn with_weighter(mut self, weighter: Arc<AdaptiveWeighter>) -> Self {
        self.weighter = weighter;
        self
    }

    /// Configuration in use
    #[must_use]
    pub const fn config(&self) -> &PlrConfig {
        &self.config
    }

    /// Weight history in use
    #[must_use]
    pub const fn weighter(&self) -> &Arc<AdaptiveWeighter> {
        &self.weighter
    }

    /// Clean and parse a raw snapshot or capture envelope
    pub fn parse(&self, snapshot: &Value) -> PlrResult<TreeNode> {
        let dom = CaptureEnvelope::dom_structure(snapshot);
        match &self.cleaner {
            Some(cleaner) => TreeNode::from_snapshot(&cleaner.clean(dom)),
            None => TreeNode::from_snapshot(dom),
        }
    }

    /// Analyze two raw snapshots (or capture envelopes)
    pub fn analyze(
        &self,
        old: &Value,
        new: &Value,
        mode: &TrackingMode,
    ) -> PlrResult<AnalysisReport> {
        let old_root = self.parse(old)?;
        let new_root = self.parse(new)?;
        let mut report = self.analyze_trees(&old_root, &new_root, mode)?;
        report.url = CaptureEnvelope::url(new).map(ToString::to_string);
        Ok(report)
    }

    /// Analyze two parsed trees
    pub fn analyze_trees(
        &self,
        old_root: &TreeNode,
        new_root: &TreeNode,
        mode: &TrackingMode,
    ) -> PlrResult<AnalysisReport> {
        let result = diff(old_root, new_root)?;

        let weights = if self.config.adaptive_weights {
            self.weighter.observe_mapping(&result.mapping);
            self.weighter.adjust(self.config.weights)
        } else {
            self.config.weights
        };
        let composer = BundleComposer::new(weights);

        let mut entries = Vec::new();
        let mut lost = Vec::new();
        for (key, old, new) in tracked(&result.mapping, mode) {
            let old_selector = legacy_selector(old);
            let Some(new) = new else {
                tracing::info!(%key, "tracked element was removed");
                lost.push(LostLocator { key, old_selector });
                continue;
            };
            let bundle = composer.compose(new, new_root);
            let bundle = if old == new {
                bundle
                    .with_confidence(self.config.stable_confidence)
                    .with_status(LocatorStatus::Stable)
            } else {
                tracing::info!(
                    %key,
                    old = %old_selector,
                    new = %bundle.primary,
                    "remediated locator"
                );
                bundle
                    .with_confidence(self.config.remediated_confidence)
                    .with_status(LocatorStatus::Remediated)
            };
            entries.push(TrackedLocator {
                key,
                old_selector,
                bundle,
            });
        }
        entries.sort_by_key(|e| e.status() != LocatorStatus::Remediated);

        tracing::debug!(
            distance = result.distance,
            tracked = entries.len() + lost.len(),
            lost = lost.len(),
            "analysis complete"
        );

        Ok(AnalysisReport {
            url: None,
            distance: result.distance,
            edits: EditSummary::from_mapping(&result.mapping),
            weights,
            entries,
            lost,
        })
    }
}

type Tracked<'a> = (String, &'a TreeNode, Option<&'a TreeNode>);

fn tracked<'a>(mapping: &EditMapping<'a>, mode: &TrackingMode) -> Vec<Tracked<'a>> {
    let with_old = mapping.iter().filter_map(|p| p.old.map(|old| (old, p.new)));
    match mode {
        TrackingMode::Complete => with_old
            .filter_map(|(old, new)| old.locator_key().map(|key| (key, old, new)))
            .collect(),
        TrackingMode::Single { target_id } => {
            let found = with_old
                .filter(|(old, _)| old.id() == Some(target_id.as_str()))
                .map(|(old, new)| (target_id.clone(), old, new))
                .next();
            if found.is_none() {
                tracing::warn!(%target_id, "target id not found in old snapshot");
            }
            found.into_iter().collect()
        }
    }
}

/// Selector a test suite would have used for the old element
fn legacy_selector(node: &TreeNode) -> String {
    let selector = match node.locator_id() {
        Some(id) => Selector::id(id),
        None => Selector::TagClassExact {
            tag: node.tag().to_string(),
            class: node
                .attribute("class")
                .unwrap_or(LEGACY_MISSING_CLASS)
                .to_string(),
        },
    };
    selector.render().unwrap_or_else(|_| degraded_selector(node))
}
