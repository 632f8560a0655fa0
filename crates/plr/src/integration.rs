//! Payloads and traits for the collaborators around the engine.
//!
//! The engine never writes the locator registry, opens pull requests or
//! renders reports itself. It produces the values those collaborators
//! consume, and the traits here describe the seams they plug into.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::bundle::{LocatorBundle, LocatorStatus};
use crate::result::PlrResult;

/// Patches at or above this confidence are applied without review
pub const AUTO_APPLY_THRESHOLD: f64 = 0.95;

/// New registry value for one tracked key
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegistryUpdate {
    /// Tracked element key
    pub key: String,
    /// Replacement primary selector
    pub selector: String,
    /// Confidence of the replacement
    pub confidence: f64,
    /// When the update was produced
    #[serde(rename = "last_updated")]
    pub timestamp: DateTime<Utc>,
}

/// Store of the current selector for each tracked key
pub trait LocatorRegistry {
    /// Current selector for `key`
    fn selector(&self, key: &str) -> Option<&str>;

    /// Record an update
    fn apply(&mut self, update: &RegistryUpdate) -> PlrResult<()>;

    /// Record a batch of updates, stopping at the first failure
    fn apply_all(&mut self, updates: &[RegistryUpdate]) -> PlrResult<()> {
        for update in updates {
            self.apply(update)?;
        }
        Ok(())
    }
}

/// Registry kept in memory, keyed by tracked key
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InMemoryRegistry {
    entries: BTreeMap<String, RegistryUpdate>,
}

impl InMemoryRegistry {
    /// Empty registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Latest update for `key`
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&RegistryUpdate> {
        self.entries.get(key)
    }

    /// Number of keys
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no key is registered
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl LocatorRegistry for InMemoryRegistry {
    fn selector(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(|u| u.selector.as_str())
    }

    fn apply(&mut self, update: &RegistryUpdate) -> PlrResult<()> {
        self.entries.insert(update.key.clone(), update.clone());
        Ok(())
    }
}

/// One proposed selector replacement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatchEntry {
    /// Tracked element key
    pub key: String,
    /// Selector that is expected to break
    pub old_selector: String,
    /// Proposed replacement
    pub new_selector: String,
    /// Full bundle behind the replacement
    pub bundle: LocatorBundle,
    /// Confidence of the replacement
    pub confidence: f64,
}

impl PatchEntry {
    /// Whether this entry may be applied without review
    #[must_use]
    pub fn is_auto_applicable(&self) -> bool {
        self.confidence >= AUTO_APPLY_THRESHOLD
    }
}

/// Patch entries split by review requirement
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PatchPlan {
    /// Entries at or above [`AUTO_APPLY_THRESHOLD`]
    pub auto_apply: Vec<PatchEntry>,
    /// Entries needing human review
    pub review: Vec<PatchEntry>,
}

impl PatchPlan {
    /// Whether there is nothing to submit
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.auto_apply.is_empty() && self.review.is_empty()
    }

    /// Total number of entries
    #[must_use]
    pub fn len(&self) -> usize {
        self.auto_apply.len() + self.review.len()
    }
}

/// Split entries on [`AUTO_APPLY_THRESHOLD`], keeping input order in each half
#[must_use]
pub fn partition_patches(entries: impl IntoIterator<Item = PatchEntry>) -> PatchPlan {
    let (auto_apply, review) = entries
        .into_iter()
        .partition(PatchEntry::is_auto_applicable);
    PatchPlan { auto_apply, review }
}

/// Turns a patch plan into version-control changes
pub trait PatchSubmitter {
    /// Submit the plan. Empty plans should be a no-op.
    fn submit(&mut self, plan: &PatchPlan) -> PlrResult<()>;
}

/// One line of a human-readable report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportRow {
    /// Locator status
    pub status: LocatorStatus,
    /// Tracked element key
    pub key: String,
    /// Selector before the change
    pub old_selector: String,
    /// Current primary selector
    pub new_selector: String,
    /// Confidence of the current selector
    pub confidence: f64,
}
