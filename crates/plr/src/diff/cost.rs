//! Edit operation cost models.
//!
//! The edit-distance engine is parameterised over a [`CostModel`]. The domain
//! model, [`DomCostModel`], charges unit cost for inserts, deletes and tag
//! changes, and a fractional cost (at most 0.5) for same-tag attribute drift.

use std::collections::BTreeSet;

use crate::tree::TreeNode;

/// Highest cost of renaming between two nodes with the same tag
pub const MAX_SAME_TAG_RENAME_COST: f64 = 0.5;

/// Cost of a tag change
pub const TAG_CHANGE_COST: f64 = 1.0;

/// Cost of edit operations between two ordered labeled trees.
///
/// Any closure `Fn(&TreeNode, &TreeNode) -> f64` is a cost model with unit
/// insert/delete cost and the closure as rename cost.
pub trait CostModel {
    /// Cost of inserting `node`
    fn insert(&self, _node: &TreeNode) -> f64 {
        1.0
    }

    /// Cost of deleting `node`
    fn delete(&self, _node: &TreeNode) -> f64 {
        1.0
    }

    /// Cost of relabeling `from` into `to`
    fn rename(&self, from: &TreeNode, to: &TreeNode) -> f64;
}

impl<F> CostModel for F
where
    F: Fn(&TreeNode, &TreeNode) -> f64,
{
    fn rename(&self, from: &TreeNode, to: &TreeNode) -> f64 {
        self(from, to)
    }
}

/// Attribute-aware cost model for document trees
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DomCostModel;

impl DomCostModel {
    /// Create the domain cost model
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl CostModel for DomCostModel {
    fn rename(&self, from: &TreeNode, to: &TreeNode) -> f64 {
        if from.tag() != to.tag() {
            return TAG_CHANGE_COST;
        }

        let keys: BTreeSet<&String> = from
            .attributes()
            .keys()
            .chain(to.attributes().keys())
            .collect();
        if keys.is_empty() {
            return 0.0;
        }

        // An absent attribute never equals a present one.
        let mismatches = keys
            .iter()
            .filter(|k| from.attributes().get(k.as_str()) != to.attributes().get(k.as_str()))
            .count();

        let fraction = mismatches as f64 / keys.len() as f64;
        (fraction * MAX_SAME_TAG_RENAME_COST).min(MAX_SAME_TAG_RENAME_COST)
    }
}

/// Cost model that treats every label difference as a full rename
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UnitCostModel;

impl CostModel for UnitCostModel {
    fn rename(&self, from: &TreeNode, to: &TreeNode) -> f64 {
        if from == to {
            0.0
        } else {
            1.0
        }
    }
}
