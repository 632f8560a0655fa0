//! Zhang–Shasha ordered tree edit distance.
//!
//! Nodes are numbered in post-order. For every node we keep its leftmost leaf
//! descendant (`lld`); key roots are the highest-numbered nodes for each
//! distinct `lld`. Tree distances for all subtree pairs are filled by running
//! the forest-distance recurrence once per key-root pair. The edit script is
//! recovered by walking forest-distance tables backwards, re-running the
//! recurrence for every subtree pair the walk jumps into.

use super::cost::CostModel;
use crate::result::{PlrError, PlrResult};
use crate::tree::TreeNode;

const EPSILON: f64 = 1e-9;

/// Post-order view of one tree
#[derive(Debug)]
pub(crate) struct Indexed<'a> {
    pub(crate) nodes: Vec<&'a TreeNode>,
    lld: Vec<usize>,
    keyroots: Vec<usize>,
}

impl<'a> Indexed<'a> {
    pub(crate) fn new(root: &'a TreeNode) -> Self {
        let mut nodes = Vec::new();
        let mut lld = Vec::new();
        index_postorder(root, &mut nodes, &mut lld);

        // Last (highest) node per leftmost leaf is the key root.
        let mut last_for_leaf = vec![None; nodes.len()];
        for (i, &leaf) in lld.iter().enumerate() {
            last_for_leaf[leaf] = Some(i);
        }
        let mut keyroots: Vec<usize> = last_for_leaf.into_iter().flatten().collect();
        keyroots.sort_unstable();

        Self {
            nodes,
            lld,
            keyroots,
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.nodes.len()
    }
}

fn index_postorder<'a>(
    node: &'a TreeNode,
    nodes: &mut Vec<&'a TreeNode>,
    lld: &mut Vec<usize>,
) -> usize {
    let mut leftmost = None;
    for child in node.children() {
        let child_index = index_postorder(child, nodes, lld);
        if leftmost.is_none() {
            leftmost = Some(lld[child_index]);
        }
    }
    nodes.push(node);
    let index = nodes.len() - 1;
    lld.push(leftmost.unwrap_or(index));
    index
}

/// One step of the recovered edit script, as post-order indices
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Step {
    /// Old node matched (or renamed) to new node
    Match(usize, usize),
    /// Old node deleted
    Delete(usize),
    /// New node inserted
    Insert(usize),
}

/// Edit distance computation over a pair of indexed trees
pub(crate) struct TreeEditDistance<'a, 'c, C: CostModel> {
    old: Indexed<'a>,
    new: Indexed<'a>,
    costs: &'c C,
    treedist: Vec<Vec<f64>>,
}

impl<'a, 'c, C: CostModel> TreeEditDistance<'a, 'c, C> {
    pub(crate) fn new(old: &'a TreeNode, new: &'a TreeNode, costs: &'c C) -> Self {
        let old = Indexed::new(old);
        let new = Indexed::new(new);
        let treedist = vec![vec![0.0; new.len()]; old.len()];
        Self {
            old,
            new,
            costs,
            treedist,
        }
    }

    pub(crate) fn old(&self) -> &Indexed<'a> {
        &self.old
    }

    pub(crate) fn new_tree(&self) -> &Indexed<'a> {
        &self.new
    }

    /// Fill the tree-distance table and return the distance between the roots.
    pub(crate) fn compute(&mut self) -> PlrResult<f64> {
        let old_keyroots = self.old.keyroots.clone();
        let new_keyroots = self.new.keyroots.clone();
        for &i in &old_keyroots {
            for &j in &new_keyroots {
                self.forest_distance(i, j)?;
            }
        }
        Ok(self.treedist[self.old.len() - 1][self.new.len() - 1])
    }

    /// Walk the tables back from the roots. Call after [`Self::compute`].
    pub(crate) fn edit_script(&mut self) -> PlrResult<Vec<Step>> {
        let mut steps = Vec::with_capacity(self.old.len().max(self.new.len()));
        let mut pending = vec![(self.old.len() - 1, self.new.len() - 1)];

        while let Some((i, j)) = pending.pop() {
            let fd = self.forest_distance(i, j)?;
            let (li, lj) = (self.old.lld[i], self.new.lld[j]);
            let (mut a, mut b) = (i + 1 - li, j + 1 - lj);

            while a > 0 || b > 0 {
                if a > 0 && b > 0 {
                    let (x, y) = (li + a - 1, lj + b - 1);
                    let (lx, ly) = (self.old.lld[x], self.new.lld[y]);
                    if lx == li && ly == lj {
                        let rename = self.rename_cost(x, y)?;
                        if approx_eq(fd[a][b], fd[a - 1][b - 1] + rename) {
                            steps.push(Step::Match(x, y));
                            a -= 1;
                            b -= 1;
                            continue;
                        }
                    } else {
                        let (p, q) = (lx - li, ly - lj);
                        if approx_eq(fd[a][b], fd[p][q] + self.treedist[x][y]) {
                            pending.push((x, y));
                            a = p;
                            b = q;
                            continue;
                        }
                    }
                }
                if a > 0 {
                    let x = li + a - 1;
                    if approx_eq(fd[a][b], fd[a - 1][b] + self.delete_cost(x)?) {
                        steps.push(Step::Delete(x));
                        a -= 1;
                        continue;
                    }
                }
                if b > 0 {
                    let y = lj + b - 1;
                    if approx_eq(fd[a][b], fd[a][b - 1] + self.insert_cost(y)?) {
                        steps.push(Step::Insert(y));
                        b -= 1;
                        continue;
                    }
                }
                return Err(PlrError::mapping_violation(format!(
                    "no edit operation explains forest distance at old {i}/{a}, new {j}/{b}"
                )));
            }
        }

        Ok(steps)
    }

    /// Forest-distance table for the subtrees rooted at `i` and `j`.
    ///
    /// Row `a` covers old nodes `lld[i] .. lld[i] + a`, column `b` the new ones.
    /// Subtree distances discovered on the way are stored in `treedist`.
    fn forest_distance(&mut self, i: usize, j: usize) -> PlrResult<Vec<Vec<f64>>> {
        let (li, lj) = (self.old.lld[i], self.new.lld[j]);
        let rows = i + 2 - li;
        let cols = j + 2 - lj;
        let mut fd = vec![vec![0.0; cols]; rows];

        for a in 1..rows {
            fd[a][0] = fd[a - 1][0] + self.delete_cost(li + a - 1)?;
        }
        for b in 1..cols {
            fd[0][b] = fd[0][b - 1] + self.insert_cost(lj + b - 1)?;
        }

        for a in 1..rows {
            let x = li + a - 1;
            let delete = self.delete_cost(x)?;
            for b in 1..cols {
                let y = lj + b - 1;
                let insert = self.insert_cost(y)?;
                let (lx, ly) = (self.old.lld[x], self.new.lld[y]);
                let via_edit = (fd[a - 1][b] + delete).min(fd[a][b - 1] + insert);
                if lx == li && ly == lj {
                    let value = via_edit.min(fd[a - 1][b - 1] + self.rename_cost(x, y)?);
                    fd[a][b] = value;
                    self.treedist[x][y] = value;
                } else {
                    let (p, q) = (lx - li, ly - lj);
                    fd[a][b] = via_edit.min(fd[p][q] + self.treedist[x][y]);
                }
            }
        }

        Ok(fd)
    }

    fn delete_cost(&self, x: usize) -> PlrResult<f64> {
        checked("delete", self.costs.delete(self.old.nodes[x]))
    }

    fn insert_cost(&self, y: usize) -> PlrResult<f64> {
        checked("insert", self.costs.insert(self.new.nodes[y]))
    }

    fn rename_cost(&self, x: usize, y: usize) -> PlrResult<f64> {
        checked(
            "rename",
            self.costs.rename(self.old.nodes[x], self.new.nodes[y]),
        )
    }
}

fn checked(operation: &'static str, cost: f64) -> PlrResult<f64> {
    if cost.is_finite() && cost >= 0.0 {
        Ok(cost)
    } else {
        Err(PlrError::InvalidCost { operation, cost })
    }
}

fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() <= EPSILON * a.abs().max(b.abs()).max(1.0)
}
