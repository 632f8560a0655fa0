//! PLR: proactive locator remediation for UI test suites
//!
//! Compares two snapshots of the same rendered page, works out which
//! elements survived and how they changed, and derives new selectors that
//! are unique in the new page for elements whose old selector may break.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────┐   ┌──────────┐   ┌──────────┐   ┌───────────┐   ┌──────────┐
//! │ snapshot │──►│ cleaner  │──►│ TreeNode │──►│ tree diff │──►│ analysis │
//! │  (JSON)  │   │          │   │          │   │ + mapping │   │          │
//! └──────────┘   └──────────┘   └──────────┘   └───────────┘   └────┬─────┘
//!                                                                   │
//!                  ┌──────────────┐   ┌─────────────┐   ┌───────────▼──┐
//!                  │ collaborator │◄──│   bundle    │◄──│   locator    │
//!                  │   payloads   │   │  composer   │   │ synthesizer  │
//!                  └──────────────┘   └─────────────┘   └──────▲───────┘
//!                                                              │ weights
//!                                                      ┌───────┴──────┐
//!                                                      │   adaptive   │
//!                                                      └──────────────┘
//! ```
//!
//! # Example
//!
//! ```
//! use plr::{diff, LocatorSynthesizer, AttributeWeights, TreeNode};
//!
//! let old = TreeNode::new("form").with_child(TreeNode::new("button").with_attribute("id", "save"));
//! let new = TreeNode::new("form").with_child(TreeNode::new("button").with_attribute("id", "save-v2"));
//!
//! let result = diff(&old, &new).unwrap();
//! assert!(result.distance > 0.0);
//!
//! let (_, moved) = result.mapping.matches().find(|(o, _)| o.id() == Some("save")).unwrap();
//! let selector = LocatorSynthesizer::new(AttributeWeights::default()).synthesize(moved, &new);
//! assert_eq!(selector, "//*[@id='save-v2']");
//! ```

#![warn(missing_docs)]
// Lints are configured in workspace Cargo.toml [workspace.lints.clippy]

/// Adaptive attribute weights learned from observed churn
#[allow(clippy::cast_precision_loss, clippy::missing_errors_doc)]
pub mod adaptive;

/// Snapshot-pair analysis pipeline
#[allow(clippy::missing_errors_doc)]
pub mod analysis;

mod bundle;

#[allow(clippy::missing_errors_doc)]
mod cleaner;

#[allow(clippy::missing_errors_doc)]
mod config;

/// Ordered tree edit distance and node mapping
#[allow(
    clippy::missing_errors_doc,
    clippy::many_single_char_names,
    clippy::similar_names
)]
pub mod diff;

#[allow(
    clippy::missing_errors_doc,
    clippy::cast_possible_truncation,
    clippy::cast_possible_wrap
)]
mod fingerprint;

/// Collaborator payloads and seams
#[allow(clippy::missing_errors_doc)]
pub mod integration;

/// Selector grammar and locator synthesis
#[allow(clippy::missing_errors_doc)]
pub mod locator;

mod recovery;
mod result;

#[allow(clippy::missing_errors_doc)]
mod tree;

pub use adaptive::{AdaptiveConfig, AdaptiveWeighter, Observation, StabilityStats};
pub use analysis::{
    AnalysisReport, Analyzer, CaptureEnvelope, EditSummary, LostLocator, TrackedLocator,
    TrackingMode,
};
pub use bundle::{
    secondary_selector, tertiary_selector, BundleComposer, LocatorBundle, LocatorStatus,
    TERTIARY_TEXT_LIMIT,
};
pub use cleaner::{DomCleaner, DEFAULT_DYNAMIC_PATTERNS};
pub use config::{PlrConfig, DEFAULT_REMEDIATED_CONFIDENCE, DEFAULT_STABLE_CONFIDENCE};
pub use diff::{
    diff, diff_with, CostModel, DiffResult, DomCostModel, EditKind, EditMapping, EditPair,
    UnitCostModel,
};
pub use fingerprint::{simhash_distance, Fingerprint, SimHash, DEFAULT_WIDTH};
pub use integration::{
    partition_patches, InMemoryRegistry, LocatorRegistry, PatchEntry, PatchPlan,
    PatchSubmitter, RegistryUpdate, ReportRow, AUTO_APPLY_THRESHOLD,
};
pub use locator::{
    count_matches, is_unique, synthesize, AttributeClass, AttributeWeights, LocatorSynthesizer,
    Selector,
};
pub use recovery::{cosine_similarity, find_best_match, SemanticMatch};
pub use result::{PlrError, PlrResult};
pub use tree::{TreeNode, SHADOW_ROOT_TAG, TEXT_NODE_NAME, UNKNOWN_TAG};

/// Prelude for convenient imports
pub mod prelude {
    pub use super::adaptive::*;
    pub use super::analysis::*;
    pub use super::bundle::*;
    pub use super::config::*;
    pub use super::diff::*;
    pub use super::integration::*;
    pub use super::locator::*;
    pub use super::result::*;
    pub use super::tree::*;
}
