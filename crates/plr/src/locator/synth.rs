//! Tiered locator synthesis.
//!
//! Candidates are tried in priority order and the first one that is unique in
//! the context tree wins:
//!
//! 1. id, when trusted
//! 2. exact class, when the node has a single class and classes are trusted
//! 3. class token containment, token by token in declaration order
//! 4. tag alone, or `//tag[1]` when the tag occurs more than once
//!
//! Tier 4 is approximate: nodes carry no parent or sibling links, so the
//! `[1]` form is not guaranteed to address the target.

use super::selector::Selector;
use super::weights::{AttributeClass, AttributeWeights};
use crate::result::PlrResult;
use crate::tree::TreeNode;

/// Generates the shortest unique selector it can find for a node
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LocatorSynthesizer {
    weights: AttributeWeights,
}

impl LocatorSynthesizer {
    /// Create a synthesizer with explicit weights
    #[must_use]
    pub const fn new(weights: AttributeWeights) -> Self {
        Self { weights }
    }

    /// Weights in use
    #[must_use]
    pub const fn weights(&self) -> &AttributeWeights {
        &self.weights
    }

    /// Selector text for `target` within `context`.
    ///
    /// Never fails; an internal error yields a degraded id or tag selector.
    #[must_use]
    pub fn synthesize(&self, target: &TreeNode, context: &TreeNode) -> String {
        match self.try_synthesize(target, context) {
            Ok(selector) => selector,
            Err(err) => {
                let fallback = degraded_selector(target);
                tracing::warn!(
                    target_node = %target,
                    error = %err,
                    fallback = %fallback,
                    "locator synthesis degraded"
                );
                fallback
            }
        }
    }

    /// Run the tiers, surfacing internal errors
    pub fn try_synthesize(&self, target: &TreeNode, context: &TreeNode) -> PlrResult<String> {
        if let Some(id) = target.locator_id() {
            if self.weights.is_trusted(AttributeClass::Id) {
                if let Some(found) = unique(&Selector::id(id), context) {
                    return Ok(found);
                }
            }
        }

        let classes = target.classes();
        if !classes.is_empty() && self.weights.is_trusted(AttributeClass::Class) {
            if let [only] = classes.as_slice() {
                let exact = Selector::TagClassExact {
                    tag: target.tag().to_string(),
                    class: (*only).to_string(),
                };
                if let Some(found) = unique(&exact, context) {
                    return Ok(found);
                }
            }

            for class in &classes {
                let contains = Selector::TagClassContains {
                    tag: target.tag().to_string(),
                    class: (*class).to_string(),
                };
                if let Some(found) = unique(&contains, context) {
                    return Ok(found);
                }
            }
        }

        let by_tag = Selector::tag(target.tag());
        if by_tag.count_in(context) <= 1 {
            return by_tag.render();
        }
        tracing::debug!(target_node = %target, "no unique attribute locator, using positional fallback");
        Selector::TagIndex {
            tag: target.tag().to_string(),
            index: 1,
        }
        .render()
    }
}

/// Synthesize with the given weights
#[must_use]
pub fn synthesize(target: &TreeNode, context: &TreeNode, weights: &AttributeWeights) -> String {
    LocatorSynthesizer::new(*weights).synthesize(target, context)
}

/// Selector used when synthesis fails: id when present, else the bare tag
#[must_use]
pub fn degraded_selector(target: &TreeNode) -> String {
    target
        .locator_id()
        .and_then(|id| Selector::id(id).render().ok())
        .unwrap_or_else(|| format!("//{}", target.tag()))
}

/// Rendered text of `selector` if it matches exactly one node of `context`.
/// Uniqueness is checked on the rendered text, as a consumer would see it.
/// A candidate that cannot be rendered counts as not unique.
fn unique(selector: &Selector, context: &TreeNode) -> Option<String> {
    match selector.render() {
        Ok(text) => super::selector::is_unique(&text, context).then_some(text),
        Err(err) => {
            tracing::debug!(error = %err, "skipping unrenderable candidate");
            None
        }
    }
}
