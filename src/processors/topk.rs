//! Top-K classification decoding.
//!
//! Turns a flat score vector into the `best` highest-scoring class entries
//! using a partial sort: only the top of the vector is ordered, the
//! remainder is left as the selection pass happened to leave it. Threshold
//! filtering runs after selection, so fewer than `best` entries may come
//! back, never more.

use ndarray::ArrayView1;
use std::cmp::Ordering;

/// One decoded classification entry.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassScore {
    /// Index into the label table.
    pub index: usize,
    /// Raw confidence score.
    pub score: f32,
}

/// Decodes a score vector into the top `best` entries at or above
/// `confidence_threshold`, sorted descending by score.
///
/// `best` is clamped to the score-vector length rather than left as an
/// unchecked hazard. Exact floating-point ties break in implementation
/// order.
pub fn decode_classification(
    scores: ArrayView1<f32>,
    best: usize,
    confidence_threshold: f32,
) -> Vec<ClassScore> {
    let mut entries: Vec<(usize, f32)> = scores.iter().copied().enumerate().collect();
    let k = best.min(entries.len());
    if k == 0 {
        return Vec::new();
    }

    let descending =
        |a: &(usize, f32), b: &(usize, f32)| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal);

    // Partial sort: partition the k largest to the front, then order only
    // that prefix.
    if k < entries.len() {
        entries.select_nth_unstable_by(k - 1, descending);
        entries.truncate(k);
    }
    entries.sort_unstable_by(descending);

    entries
        .into_iter()
        .filter(|(_, score)| *score >= confidence_threshold)
        .map(|(index, score)| ClassScore { index, score })
        .collect()
}
