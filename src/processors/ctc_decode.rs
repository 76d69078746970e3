//! Greedy best-path CTC decoding.
//!
//! Decoding runs in two passes over the output matrix: an argmax per
//! timestep producing the raw label path, then a single collapse scan that
//! drops blanks and consecutive repeats. This is best-path decoding, not
//! beam search; per-timestep choices are independent.

use ndarray::ArrayView2;
use std::cmp::Ordering;

/// Computes the raw label path: the argmax class index of every timestep.
///
/// Each row of `output` is one timestep, each column one class. The raw
/// path has exactly one label per timestep.
pub fn greedy_path(output: ArrayView2<f32>) -> Vec<usize> {
    output
        .rows()
        .into_iter()
        .map(|row| {
            row.iter()
                .enumerate()
                .max_by(|(_, a), (_, b)| a.partial_cmp(b).unwrap_or(Ordering::Equal))
                .map(|(idx, _)| idx)
                .unwrap_or(0)
        })
        .collect()
}

/// Collapses a raw label path.
///
/// A label is emitted only when it differs from the immediately preceding
/// raw label and is not the blank index. The previous-label sentinel
/// before the first timestep is the blank itself, so a path starting with
/// a non-blank label emits immediately. Repeats collapse only against the
/// directly preceding symbol, never globally.
pub fn collapse(raw: &[usize], blank: Option<usize>) -> Vec<usize> {
    let mut collapsed = Vec::new();
    let mut prev = blank;
    for &label in raw {
        let current = Some(label);
        if current != prev && current != blank {
            collapsed.push(label);
        }
        prev = current;
    }
    collapsed
}

/// Decodes an output matrix into a collapsed label sequence.
///
/// `blank` is the reserved class index meaning "no output at this
/// timestep"; `None` disables blank handling for models without one.
pub fn decode_sequence(output: ArrayView2<f32>, blank: Option<usize>) -> Vec<usize> {
    collapse(&greedy_path(output), blank)
}
