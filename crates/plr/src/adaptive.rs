//! Adaptive attribute weights.
//!
//! Every matched `(old, new)` node pair is an observation: for each attribute
//! class present on either side we record whether its value changed. An
//! attribute class that changes in at least `instability_threshold` of its
//! observations is considered unstable and its trust weight is penalised.
//!
//! The history is append-only and guarded by an [`RwLock`], so one
//! [`AdaptiveWeighter`] can be shared between concurrent analyses behind an
//! `Arc`: writers are serialized, readers run in parallel.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::{PoisonError, RwLock};

use crate::diff::EditMapping;
use crate::locator::{AttributeClass, AttributeWeights};
use crate::result::{PlrError, PlrResult};
use crate::tree::TreeNode;

/// Attribute classes tracked for stability
pub const TRACKED_CLASSES: [AttributeClass; 4] = [
    AttributeClass::Id,
    AttributeClass::Class,
    AttributeClass::Name,
    AttributeClass::Tag,
];

/// Tuning for [`AdaptiveWeighter`]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdaptiveConfig {
    /// Multiplier applied to an unstable attribute's weight
    pub penalty_factor: f64,
    /// Fraction of changed observations at which an attribute is unstable
    pub instability_threshold: f64,
    /// Observations needed before an attribute can be judged
    pub min_observations: usize,
}

impl Default for AdaptiveConfig {
    fn default() -> Self {
        Self {
            penalty_factor: 0.5,
            instability_threshold: 0.3,
            min_observations: 3,
        }
    }
}

impl AdaptiveConfig {
    /// Set the penalty factor
    #[must_use]
    pub const fn with_penalty_factor(mut self, factor: f64) -> Self {
        self.penalty_factor = factor;
        self
    }

    /// Set the instability threshold
    #[must_use]
    pub const fn with_instability_threshold(mut self, threshold: f64) -> Self {
        self.instability_threshold = threshold;
        self
    }

    /// Set the minimum observation count
    #[must_use]
    pub const fn with_min_observations(mut self, count: usize) -> Self {
        self.min_observations = count;
        self
    }

    /// Check value ranges
    pub fn validate(&self) -> PlrResult<()> {
        if !(0.0..=1.0).contains(&self.penalty_factor) {
            return Err(PlrError::invalid_config(format!(
                "penalty_factor must be in [0, 1], got {}",
                self.penalty_factor
            )));
        }
        if !(0.0..=1.0).contains(&self.instability_threshold) {
            return Err(PlrError::invalid_config(format!(
                "instability_threshold must be in [0, 1], got {}",
                self.instability_threshold
            )));
        }
        Ok(())
    }
}

/// One recorded value comparison
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Observation {
    /// Logical element the observation belongs to
    pub key: String,
    /// Attribute class compared
    pub class: AttributeClass,
    /// Whether the value differed between snapshots
    pub changed: bool,
}

/// Per-class summary of the history
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StabilityStats {
    /// Number of observations
    pub observed: usize,
    /// Number of observations whose value changed
    pub changed: usize,
}

impl StabilityStats {
    /// Fraction of observations that changed
    #[must_use]
    pub fn change_rate(&self) -> f64 {
        if self.observed == 0 {
            0.0
        } else {
            self.changed as f64 / self.observed as f64
        }
    }
}

/// Adjusts attribute trust from observed instability
#[derive(Debug, Default)]
pub struct AdaptiveWeighter {
    config: AdaptiveConfig,
    history: RwLock<Vec<Observation>>,
}

impl AdaptiveWeighter {
    /// Weighter with default tuning
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Weighter with explicit tuning
    #[must_use]
    pub fn with_config(config: AdaptiveConfig) -> Self {
        Self {
            config,
            history: RwLock::new(Vec::new()),
        }
    }

    /// Weighter seeded with a previously exported history
    #[must_use]
    pub fn with_history(config: AdaptiveConfig, history: Vec<Observation>) -> Self {
        Self {
            config,
            history: RwLock::new(history),
        }
    }

    /// Tuning in use
    #[must_use]
    pub const fn config(&self) -> &AdaptiveConfig {
        &self.config
    }

    /// Base table before penalties: `id=1.0, class=0.8, name=0.8, text=0.5, tag=0.5`
    #[must_use]
    pub fn base_weights() -> AttributeWeights {
        AttributeWeights::default().with(AttributeClass::Tag, 0.5)
    }

    /// Record one matched pair under `key`
    pub fn observe(&self, key: &str, old: &TreeNode, new: &TreeNode) {
        let observations: Vec<Observation> = TRACKED_CLASSES
            .iter()
            .filter_map(|&class| {
                let (before, after) = (class_value(old, class), class_value(new, class));
                (before.is_some() || after.is_some()).then(|| Observation {
                    key: key.to_string(),
                    class,
                    changed: before != after,
                })
            })
            .collect();
        self.append(observations);
    }

    /// Record every matched pair of a mapping, keyed by the old node
    pub fn observe_mapping(&self, mapping: &EditMapping<'_>) {
        for (old, new) in mapping.matches() {
            self.observe(&element_key(old), old, new);
        }
    }

    /// Current weights: base table with unstable classes penalised
    #[must_use]
    pub fn get_weights(&self) -> AttributeWeights {
        self.adjust(Self::base_weights())
    }

    /// `base` with unstable classes penalised
    #[must_use]
    pub fn adjust(&self, base: AttributeWeights) -> AttributeWeights {
        let stats = self.stability_report();
        let mut weights = base;
        for class in TRACKED_CLASSES {
            let entry = stats.get(&class).copied().unwrap_or_default();
            if entry.observed >= self.config.min_observations.max(1)
                && entry.change_rate() >= self.config.instability_threshold
            {
                let penalised = weights.get(class) * self.config.penalty_factor;
                tracing::debug!(
                    attribute = %class,
                    change_rate = entry.change_rate(),
                    weight = penalised,
                    "penalising unstable attribute"
                );
                weights = weights.with(class, penalised);
            }
        }
        weights
    }

    /// Observed/changed counts per tracked class
    #[must_use]
    pub fn stability_report(&self) -> BTreeMap<AttributeClass, StabilityStats> {
        let history = self.history.read().unwrap_or_else(PoisonError::into_inner);
        let mut report = BTreeMap::new();
        for observation in history.iter() {
            let entry: &mut StabilityStats = report.entry(observation.class).or_default();
            entry.observed += 1;
            if observation.changed {
                entry.changed += 1;
            }
        }
        report
    }

    /// Number of recorded observations
    #[must_use]
    pub fn history_len(&self) -> usize {
        self.history
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Copy of the history, e.g. for a registry collaborator to persist
    #[must_use]
    pub fn export_history(&self) -> Vec<Observation> {
        self.history
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn append(&self, observations: Vec<Observation>) {
        if observations.is_empty() {
            return;
        }
        self.history
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .extend(observations);
    }
}

/// Stable key for a node: its id, else `.` followed by the raw class string,
/// else the tag.
#[must_use]
pub fn element_key(node: &TreeNode) -> String {
    node.locator_key()
        .unwrap_or_else(|| node.tag().to_string())
}

fn class_value(node: &TreeNode, class: AttributeClass) -> Option<&str> {
    match class {
        AttributeClass::Id => node.id(),
        AttributeClass::Class => node.attribute("class"),
        AttributeClass::Name => node.attribute("name"),
        AttributeClass::Tag => Some(node.tag()),
        AttributeClass::Text => Some(node.text()).filter(|t| !t.is_empty()),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    fn button(id: &str) -> TreeNode {
        TreeNode::new("button")
            .with_attribute("id", id)
            .with_attribute("class", "btn")
    }

    #[test]
    fn test_default_weights_without_history() {
        let weighter = AdaptiveWeighter::new();
        let w = weighter.get_weights();
        assert_eq!(w.id, 1.0);
        assert_eq!(w.class, 0.8);
        assert_eq!(w.name, 0.8);
        assert_eq!(w.tag, 0.5);
    }

    #[test]
    fn test_observe_records_present_classes_only() {
        let weighter = AdaptiveWeighter::new();
        weighter.observe("save", &button("save"), &button("save"));
        // id, class and tag present; name absent on both sides
        assert_eq!(weighter.history_len(), 3);
        let report = weighter.stability_report();
        assert_eq!(report[&AttributeClass::Id].changed, 0);
        assert!(!report.contains_key(&AttributeClass::Name));
    }

    #[test]
    fn test_unstable_ids_are_penalised() {
        let weighter = AdaptiveWeighter::new();
        for i in 0..4 {
            weighter.observe(
                "save",
                &button(&format!("ember{i}")),
                &button(&format!("ember{}", i + 100)),
            );
        }
        let w = weighter.get_weights();
        assert_eq!(w.id, 0.5);
        assert_eq!(w.class, 0.8);
        assert_eq!(w.tag, 0.5);
    }

    #[test]
    fn test_min_observations_respected() {
        let weighter = AdaptiveWeighter::with_config(
            AdaptiveConfig::default().with_min_observations(10),
        );
        weighter.observe("k", &button("a"), &button("b"));
        assert_eq!(weighter.get_weights().id, 1.0);
    }

    #[test]
    fn test_threshold_is_inclusive() {
        let config = AdaptiveConfig::default()
            .with_instability_threshold(0.5)
            .with_min_observations(2);
        let weighter = AdaptiveWeighter::with_config(config);
        weighter.observe("a", &button("a"), &button("a"));
        weighter.observe("b", &button("b"), &button("c"));
        assert_eq!(weighter.get_weights().id, 0.5);
    }

    #[test]
    fn test_observe_mapping() {
        let old = TreeNode::new("body").with_child(button("a"));
        let new = TreeNode::new("body").with_child(button("b"));
        let result = crate::diff::diff(&old, &new).unwrap();
        let weighter = AdaptiveWeighter::new();
        weighter.observe_mapping(&result.mapping);
        let report = weighter.stability_report();
        assert_eq!(report[&AttributeClass::Id].changed, 1);
        assert_eq!(report[&AttributeClass::Tag].observed, 2);
    }

    #[test]
    fn test_concurrent_observers() {
        let weighter = Arc::new(AdaptiveWeighter::new());
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let weighter = Arc::clone(&weighter);
                thread::spawn(move || {
                    for _ in 0..25 {
                        weighter.observe(&format!("k{i}"), &button("x"), &button("y"));
                        let _ = weighter.get_weights();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        // 3 observations (id, class, tag) per call
        assert_eq!(weighter.history_len(), 8 * 25 * 3);
        assert_eq!(weighter.get_weights().id, 0.5);
    }

    #[test]
    fn test_adjust_keeps_caller_base() {
        let weighter = AdaptiveWeighter::new();
        for i in 0..3 {
            weighter.observe("k", &button(&format!("a{i}")), &button(&format!("b{i}")));
        }
        let adjusted = weighter.adjust(AttributeWeights::default());
        assert_eq!(adjusted.id, 0.5);
        assert_eq!(adjusted.tag, 0.2);
    }

    #[test]
    fn test_history_roundtrip() {
        let weighter = AdaptiveWeighter::new();
        weighter.observe("k", &button("a"), &button("b"));
        let exported = weighter.export_history();
        let restored = AdaptiveWeighter::with_history(AdaptiveConfig::default(), exported);
        assert_eq!(restored.history_len(), weighter.history_len());
    }

    #[test]
    fn test_element_key() {
        assert_eq!(element_key(&button("save")), "save");
        assert_eq!(
            element_key(&TreeNode::new("a").with_attribute("class", "nav link")),
            ".nav link"
        );
        assert_eq!(element_key(&TreeNode::new("main")), "main");
    }

    #[test]
    fn test_config_validation() {
        assert!(AdaptiveConfig::default().validate().is_ok());
        assert!(AdaptiveConfig::default()
            .with_penalty_factor(1.5)
            .validate()
            .is_err());
        assert!(AdaptiveConfig::default()
            .with_instability_threshold(-0.1)
            .validate()
            .is_err());
    }
}
