//! Semantic recovery contract.
//!
//! When a tracked node is deleted with no structural correspondence, an
//! external embedding model may supply vectors for the lost node and for
//! candidate nodes of the new tree. This module only ranks those vectors.

use crate::tree::TreeNode;

/// Best semantic replacement for a lost node
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SemanticMatch<'a> {
    /// Chosen candidate
    pub node: &'a TreeNode,
    /// Cosine similarity to the reference vector
    pub score: f64,
}

/// Cosine similarity, or `None` for mismatched lengths.
///
/// A zero vector has similarity 0 to everything.
#[must_use]
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Option<f64> {
    if a.len() != b.len() || a.is_empty() {
        return None;
    }
    let (mut dot, mut norm_a, mut norm_b) = (0.0f64, 0.0f64, 0.0f64);
    for (x, y) in a.iter().zip(b) {
        let (x, y) = (f64::from(*x), f64::from(*y));
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }
    let denominator = norm_a.sqrt() * norm_b.sqrt();
    Some(if denominator > 0.0 {
        dot / denominator
    } else {
        0.0
    })
}

/// Highest-scoring candidate for `reference`.
///
/// Candidates without a vector, or whose vector cannot be compared with the
/// reference, are skipped. Returns `None` when nothing is comparable.
#[must_use]
pub fn find_best_match<'a>(
    reference: &[f32],
    candidates: &[(&'a TreeNode, Option<Vec<f32>>)],
) -> Option<SemanticMatch<'a>> {
    let mut best: Option<SemanticMatch<'a>> = None;
    for (node, vector) in candidates {
        let Some(vector) = vector else {
            continue;
        };
        let Some(score) = cosine_similarity(reference, vector) else {
            tracing::warn!(
                candidate = %node,
                reference_len = reference.len(),
                candidate_len = vector.len(),
                "skipping incomparable candidate vector"
            );
            continue;
        };
        if best.map_or(true, |b| score > b.score) {
            best = Some(SemanticMatch { node: *node, score });
        }
    }
    best
}
