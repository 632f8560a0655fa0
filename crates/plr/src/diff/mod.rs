//! Structural diff between two document trees.
//!
//! [`diff`] computes the minimum-cost ordered edit script between an old and
//! a new tree under the [`DomCostModel`] and returns the distance together
//! with a node correspondence ([`EditMapping`]). [`diff_with`] accepts any
//! other [`CostModel`].
//!
//! ```
//! use plr::{diff, TreeNode};
//!
//! let old = TreeNode::new("body").with_child(TreeNode::new("div").with_attribute("id", "a"));
//! let new = TreeNode::new("body").with_child(TreeNode::new("div").with_attribute("id", "b"));
//! let result = diff(&old, &new).unwrap();
//! assert_eq!(result.distance, 0.5);
//! ```

mod cost;
mod ted;

pub use cost::{CostModel, DomCostModel, UnitCostModel, MAX_SAME_TAG_RENAME_COST, TAG_CHANGE_COST};

use serde::Serialize;

use crate::result::{PlrError, PlrResult};
use crate::tree::TreeNode;
use ted::{Step, TreeEditDistance};

/// Kind of correspondence a pair represents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EditKind {
    /// Both sides present and equal
    Unchanged,
    /// Both sides present, labels or payload differ
    Renamed,
    /// Only the new side is present
    Inserted,
    /// Only the old side is present
    Deleted,
}

/// One `(old, new)` pair of the correspondence. At least one side is present.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EditPair<'a> {
    /// Node of the old tree
    pub old: Option<&'a TreeNode>,
    /// Node of the new tree
    pub new: Option<&'a TreeNode>,
}

impl<'a> EditPair<'a> {
    /// Classify this pair
    #[must_use]
    pub fn kind(&self) -> EditKind {
        match (self.old, self.new) {
            (Some(old), Some(new)) if old == new => EditKind::Unchanged,
            (Some(_), Some(_)) => EditKind::Renamed,
            (None, Some(_)) => EditKind::Inserted,
            // Empty pairs are rejected when the mapping is built.
            (Some(_) | None, None) => EditKind::Deleted,
        }
    }

    /// Both sides, when the pair is a match
    #[must_use]
    pub fn matched(&self) -> Option<(&'a TreeNode, &'a TreeNode)> {
        self.old.zip(self.new)
    }
}

/// Node correspondence derived from an edit script.
///
/// Every node of the old tree is the old side of exactly one pair and every
/// node of the new tree the new side of exactly one pair.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditMapping<'a> {
    pairs: Vec<EditPair<'a>>,
}

impl<'a> EditMapping<'a> {
    /// All pairs, ordered by old post-order position with insertions interleaved
    #[must_use]
    pub fn pairs(&self) -> &[EditPair<'a>] {
        &self.pairs
    }

    /// Iterate over pairs
    pub fn iter(&self) -> std::slice::Iter<'_, EditPair<'a>> {
        self.pairs.iter()
    }

    /// Number of pairs
    #[must_use]
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// Whether there are no pairs
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Matched pairs (both sides present)
    pub fn matches(&self) -> impl Iterator<Item = (&'a TreeNode, &'a TreeNode)> + '_ {
        self.pairs.iter().filter_map(EditPair::matched)
    }

    /// Count pairs of one kind
    #[must_use]
    pub fn count(&self, kind: EditKind) -> usize {
        self.pairs.iter().filter(|p| p.kind() == kind).count()
    }
}

impl<'m, 'a> IntoIterator for &'m EditMapping<'a> {
    type Item = &'m EditPair<'a>;
    type IntoIter = std::slice::Iter<'m, EditPair<'a>>;

    fn into_iter(self) -> Self::IntoIter {
        self.pairs.iter()
    }
}

/// Distance and correspondence between two trees
#[derive(Debug, Clone, PartialEq)]
pub struct DiffResult<'a> {
    /// Total cost of the cheapest edit script
    pub distance: f64,
    /// Node correspondence
    pub mapping: EditMapping<'a>,
}

/// Diff two trees under the domain cost model
pub fn diff<'a>(old: &'a TreeNode, new: &'a TreeNode) -> PlrResult<DiffResult<'a>> {
    diff_with(old, new, &DomCostModel)
}

/// Diff two trees under a caller-supplied cost model
pub fn diff_with<'a, C: CostModel>(
    old: &'a TreeNode,
    new: &'a TreeNode,
    costs: &C,
) -> PlrResult<DiffResult<'a>> {
    let mut engine = TreeEditDistance::new(old, new, costs);
    let distance = engine.compute()?;
    let mut steps = engine.edit_script()?;
    // The walk runs from the roots backwards.
    steps.reverse();

    let old_nodes = &engine.old().nodes;
    let new_nodes = &engine.new_tree().nodes;
    let mapping = build_mapping(&steps, old_nodes, new_nodes)?;

    tracing::debug!(
        old_nodes = old_nodes.len(),
        new_nodes = new_nodes.len(),
        distance,
        pairs = mapping.len(),
        "computed tree diff"
    );

    Ok(DiffResult { distance, mapping })
}

/// Turn an index-level edit script into a node mapping, enforcing the
/// bijection-with-nulls over both node sets.
fn build_mapping<'a>(
    steps: &[Step],
    old_nodes: &[&'a TreeNode],
    new_nodes: &[&'a TreeNode],
) -> PlrResult<EditMapping<'a>> {
    let mut old_seen = vec![false; old_nodes.len()];
    let mut new_seen = vec![false; new_nodes.len()];
    let mut pairs = Vec::with_capacity(steps.len());

    for step in steps {
        let (old_index, new_index) = match *step {
            Step::Match(x, y) => (Some(x), Some(y)),
            Step::Delete(x) => (Some(x), None),
            Step::Insert(y) => (None, Some(y)),
        };
        let old = old_index
            .map(|x| claim(x, old_nodes, &mut old_seen, "old"))
            .transpose()?;
        let new = new_index
            .map(|y| claim(y, new_nodes, &mut new_seen, "new"))
            .transpose()?;
        pairs.push(EditPair { old, new });
    }

    if let Some(missing) = old_seen.iter().position(|seen| !seen) {
        return Err(PlrError::mapping_violation(format!(
            "old node {missing} has no pair"
        )));
    }
    if let Some(missing) = new_seen.iter().position(|seen| !seen) {
        return Err(PlrError::mapping_violation(format!(
            "new node {missing} has no pair"
        )));
    }

    Ok(EditMapping { pairs })
}

fn claim<'a>(
    index: usize,
    nodes: &[&'a TreeNode],
    seen: &mut [bool],
    side: &str,
) -> PlrResult<&'a TreeNode> {
    let node = nodes.get(index).copied().ok_or_else(|| {
        PlrError::mapping_violation(format!("{side} index {index} is not a node of the tree"))
    })?;
    if std::mem::replace(&mut seen[index], true) {
        return Err(PlrError::mapping_violation(format!(
            "{side} node {index} mapped more than once"
        )));
    }
    Ok(node)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    fn div(id: &str) -> TreeNode {
        TreeNode::new("div").with_attribute("id", id)
    }

    mod diff_tests {
        use super::*;

        #[test]
        fn test_identical_trees_zero_distance() {
            let tree = TreeNode::new("body")
                .with_child(div("a").with_child(TreeNode::new("span").with_text("hi")))
                .with_child(TreeNode::new("footer"));
            let result = diff(&tree, &tree).unwrap();
            assert_eq!(result.distance, 0.0);
            assert_eq!(result.mapping.len(), 4);
            for pair in &result.mapping {
                let (old, new) = pair.matched().unwrap();
                assert!(std::ptr::eq(old, new));
            }
        }

        #[test]
        fn test_attribute_change_is_partial_rename() {
            let old = TreeNode::from_snapshot(&json!({
                "nodeName": "body",
                "children": [{"nodeName": "div", "attributes": {"id": "a"}}]
            }))
            .unwrap();
            let new = TreeNode::from_snapshot(&json!({
                "nodeName": "body",
                "children": [{"nodeName": "div", "attributes": {"id": "b"}}]
            }))
            .unwrap();

            let result = diff(&old, &new).unwrap();
            assert!(result.distance > 0.0 && result.distance <= 0.5);

            let renamed: Vec<_> = result
                .mapping
                .iter()
                .filter(|p| p.kind() == EditKind::Renamed)
                .collect();
            assert_eq!(renamed.len(), 1);
            assert_eq!(renamed[0].old.unwrap().id(), Some("a"));
            assert_eq!(renamed[0].new.unwrap().id(), Some("b"));
            assert_eq!(result.mapping.count(EditKind::Unchanged), 1);
        }

        #[test]
        fn test_tag_change_prefers_rename_over_delete_insert() {
            let old = TreeNode::new("body").with_child(TreeNode::new("div"));
            let new = TreeNode::new("body").with_child(TreeNode::new("section"));
            let result = diff(&old, &new).unwrap();
            assert_eq!(result.distance, 1.0);
            assert_eq!(result.mapping.count(EditKind::Renamed), 1);
            assert_eq!(result.mapping.count(EditKind::Inserted), 0);
        }

        #[test]
        fn test_deleted_subtree() {
            let old = TreeNode::new("body")
                .with_child(div("keep"))
                .with_child(TreeNode::new("aside").with_child(TreeNode::new("p")));
            let new = TreeNode::new("body").with_child(div("keep"));
            let result = diff(&old, &new).unwrap();
            assert_eq!(result.distance, 2.0);
            assert_eq!(result.mapping.count(EditKind::Deleted), 2);
            assert_eq!(result.mapping.count(EditKind::Unchanged), 2);
        }

        #[test]
        fn test_inserted_wrapper_keeps_inner_match() {
            let old = TreeNode::new("body").with_child(div("login"));
            let new = TreeNode::new("body")
                .with_child(TreeNode::new("nav").with_child(div("login")));
            let result = diff(&old, &new).unwrap();
            assert_eq!(result.distance, 1.0);

            let login = result
                .mapping
                .iter()
                .find(|p| p.old.and_then(TreeNode::id) == Some("login"))
                .unwrap();
            assert_eq!(login.kind(), EditKind::Unchanged);
            assert_eq!(result.mapping.count(EditKind::Inserted), 1);
        }

        #[test]
        fn test_sibling_order_is_respected() {
            let old = TreeNode::new("ul")
                .with_child(TreeNode::new("li").with_text("a"))
                .with_child(TreeNode::new("p").with_text("b"));
            let swapped = TreeNode::new("ul")
                .with_child(TreeNode::new("p").with_text("b"))
                .with_child(TreeNode::new("li").with_text("a"));
            let result = diff(&old, &swapped).unwrap();
            assert!(result.distance > 0.0);
        }

        #[test]
        fn test_every_node_appears_once() {
            let old = TreeNode::new("body")
                .with_child(div("a").with_child(TreeNode::new("b")))
                .with_child(TreeNode::new("c"));
            let new = TreeNode::new("main")
                .with_child(TreeNode::new("c"))
                .with_child(div("z"))
                .with_child(TreeNode::new("d"));
            let result = diff(&old, &new).unwrap();
            let old_count = result.mapping.iter().filter(|p| p.old.is_some()).count();
            let new_count = result.mapping.iter().filter(|p| p.new.is_some()).count();
            assert_eq!(old_count, old.node_count());
            assert_eq!(new_count, new.node_count());
            assert!(result.mapping.iter().all(|p| p.old.is_some() || p.new.is_some()));
        }

        #[test]
        fn test_custom_cost_model() {
            let old = TreeNode::new("div").with_text("a");
            let new = TreeNode::new("div").with_text("b");
            let text_aware = |a: &TreeNode, b: &TreeNode| if a == b { 0.0 } else { 0.75 };
            assert_eq!(diff(&old, &new).unwrap().distance, 0.0);
            assert_eq!(diff_with(&old, &new, &text_aware).unwrap().distance, 0.75);
        }
    }

    mod mapping_tests {
        use super::*;

        #[test]
        fn test_duplicate_index_rejected() {
            let node = TreeNode::new("div");
            let nodes = vec![&node];
            let steps = [Step::Match(0, 0), Step::Delete(0)];
            let err = build_mapping(&steps, &nodes, &nodes).unwrap_err();
            assert!(matches!(err, PlrError::MappingTypeViolation { .. }));
        }

        #[test]
        fn test_out_of_range_index_rejected() {
            let node = TreeNode::new("div");
            let nodes = vec![&node];
            let steps = [Step::Match(0, 3)];
            assert!(build_mapping(&steps, &nodes, &nodes).is_err());
        }

        #[test]
        fn test_unpaired_node_rejected() {
            let a = TreeNode::new("div");
            let b = TreeNode::new("span");
            let old_nodes = vec![&a, &b];
            let new_nodes = vec![&a];
            let steps = [Step::Match(0, 0)];
            assert!(build_mapping(&steps, &old_nodes, &new_nodes).is_err());
        }

        #[test]
        fn test_pair_kinds() {
            let a = TreeNode::new("div");
            let b = TreeNode::new("div").with_attribute("id", "x");
            assert_eq!(EditPair { old: Some(&a), new: Some(&a) }.kind(), EditKind::Unchanged);
            assert_eq!(EditPair { old: Some(&a), new: Some(&b) }.kind(), EditKind::Renamed);
            assert_eq!(EditPair { old: None, new: Some(&b) }.kind(), EditKind::Inserted);
            assert_eq!(EditPair { old: Some(&a), new: None }.kind(), EditKind::Deleted);
        }
    }

    mod proptest_tests {
        use super::*;

        fn tree_strategy() -> impl Strategy<Value = TreeNode> {
            let leaf = (
                prop_oneof![Just("div"), Just("span"), Just("li")],
                prop_oneof![Just(None), Just(Some("x")), Just(Some("y"))],
            )
                .prop_map(|(tag, id)| match id {
                    Some(id) => TreeNode::new(tag).with_attribute("id", id),
                    None => TreeNode::new(tag),
                });
            leaf.prop_recursive(3, 24, 4, |inner| {
                (
                    prop_oneof![Just("div"), Just("ul"), Just("section")],
                    proptest::collection::vec(inner, 0..4),
                )
                    .prop_map(|(tag, children)| TreeNode::new(tag).with_children(children))
            })
        }

        proptest! {
            #[test]
            fn prop_self_diff_is_identity(tree in tree_strategy()) {
                let result = diff(&tree, &tree).unwrap();
                prop_assert_eq!(result.distance, 0.0);
                prop_assert_eq!(result.mapping.len(), tree.node_count());
                for pair in &result.mapping {
                    let (old, new) = pair.matched().unwrap();
                    prop_assert!(std::ptr::eq(old, new));
                }
            }

            #[test]
            fn prop_mapping_covers_both_trees(a in tree_strategy(), b in tree_strategy()) {
                let result = diff(&a, &b).unwrap();
                prop_assert!(result.distance >= 0.0);
                let olds = result.mapping.iter().filter(|p| p.old.is_some()).count();
                let news = result.mapping.iter().filter(|p| p.new.is_some()).count();
                prop_assert_eq!(olds, a.node_count());
                prop_assert_eq!(news, b.node_count());
            }

            #[test]
            fn prop_distance_is_symmetric(a in tree_strategy(), b in tree_strategy()) {
                let ab = diff(&a, &b).unwrap().distance;
                let ba = diff(&b, &a).unwrap().distance;
                prop_assert!((ab - ba).abs() < 1e-9);
            }
        }
    }
}
