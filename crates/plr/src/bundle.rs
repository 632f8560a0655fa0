//! Locator bundles: a verified primary selector plus two cheaper fallbacks.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::locator::{degraded_selector, AttributeWeights, LocatorSynthesizer};
use crate::tree::TreeNode;

/// Text longer than this (after trimming) is not used for the tertiary selector
pub const TERTIARY_TEXT_LIMIT: usize = 50;

/// Whether a tracked locator survived unchanged or had to be regenerated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LocatorStatus {
    /// Element unchanged between snapshots
    Stable,
    /// Element changed; a new locator was synthesized
    Remediated,
}

impl fmt::Display for LocatorStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stable => f.pad("STABLE"),
            Self::Remediated => f.pad("REMEDIATED"),
        }
    }
}

/// Ranked alternative selectors for one element
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocatorBundle {
    /// Verified unique selector (unless degraded)
    pub primary: String,
    /// Unverified id/class/tag selector
    pub secondary: String,
    /// Text selector, or a generic tag selector
    pub tertiary: String,
    /// Caller-assigned confidence in `[0, 1]`
    pub confidence: f64,
    /// Caller-assigned status
    pub status: LocatorStatus,
}

impl LocatorBundle {
    /// Set the confidence, clamped to `[0, 1]`
    #[must_use]
    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = if confidence.is_nan() {
            0.0
        } else {
            confidence.clamp(0.0, 1.0)
        };
        self
    }

    /// Set the status
    #[must_use]
    pub const fn with_status(mut self, status: LocatorStatus) -> Self {
        self.status = status;
        self
    }

    /// Selectors in priority order
    #[must_use]
    pub fn selectors(&self) -> [&str; 3] {
        [&self.primary, &self.secondary, &self.tertiary]
    }
}

/// Builds [`LocatorBundle`]s
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BundleComposer {
    synthesizer: LocatorSynthesizer,
}

impl BundleComposer {
    /// Composer whose primary selectors use `weights`
    #[must_use]
    pub const fn new(weights: AttributeWeights) -> Self {
        Self {
            synthesizer: LocatorSynthesizer::new(weights),
        }
    }

    /// Bundle for `target` within `context`, with confidence 1.0 and status
    /// `Remediated` until the caller says otherwise.
    #[must_use]
    pub fn compose(&self, target: &TreeNode, context: &TreeNode) -> LocatorBundle {
        LocatorBundle {
            primary: self.primary(target, context),
            secondary: secondary_selector(target),
            tertiary: tertiary_selector(target),
            confidence: 1.0,
            status: LocatorStatus::Remediated,
        }
    }

    fn primary(&self, target: &TreeNode, context: &TreeNode) -> String {
        self.synthesizer
            .try_synthesize(target, context)
            .unwrap_or_else(|err| {
                tracing::warn!(target_node = %target, error = %err, "primary locator degraded");
                degraded_selector(target)
            })
    }
}

/// `#id`, else `.class1.class2`, else the tag. Not checked for uniqueness.
#[must_use]
pub fn secondary_selector(target: &TreeNode) -> String {
    if let Some(id) = target.locator_id() {
        return format!("#{id}");
    }
    let classes = target.classes();
    if classes.is_empty() {
        target.tag().to_string()
    } else {
        format!(".{}", classes.join("."))
    }
}

/// `text='...'` for short non-empty text, else `xpath=//tag`
#[must_use]
pub fn tertiary_selector(target: &TreeNode) -> String {
    let text = target.text().trim();
    if !text.is_empty() && text.chars().count() < TERTIARY_TEXT_LIMIT {
        format!("text='{}'", text.replace('\'', "\\'"))
    } else {
        format!("xpath=//{}", target.tag())
    }
}
