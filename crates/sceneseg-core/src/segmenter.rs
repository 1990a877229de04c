//! Greedy similarity-drop segmentation.
//!
//! Scans the embedding sequence left to right, tracking the minimum
//! dot-product similarity between the candidate frame and every frame
//! already inside the open segment. When that minimum falls below the
//! threshold the segment is closed and a new one opens. A single outlier
//! frame inside an otherwise coherent segment does not trigger a cut
//! unless it drives the minimum pairwise similarity below threshold, so
//! boundary placement stays conservative without training a classifier.

use tracing::debug;

use sceneseg_models::{EmbeddingSequence, Segment, Segmentation};

use crate::config::SceneConfig;

/// Sentinel above any attainable dot product of unit vectors; the
/// minimum-similarity tracker is updated downward from here.
const SIMILARITY_SENTINEL: f64 = 10.0;

/// Segment an embedding sequence using the config's threshold and
/// minimum length.
pub fn segment_sequence(seq: &EmbeddingSequence, config: &SceneConfig) -> Segmentation {
    segment(
        seq.vectors(),
        config.similarity_threshold,
        config.min_segment_len,
    )
}

/// Segment unit-norm embedding vectors.
///
/// Boundaries are closed at the minimum-similarity rule, a final
/// boundary is forced at the last index, and intervals not strictly
/// longer than `min_len` are discarded. `covered_len` sums the lengths
/// of retained intervals. Deterministic for identical inputs.
pub fn segment(vectors: &[Vec<f32>], threshold: f64, min_len: usize) -> Segmentation {
    let n = vectors.len();
    if n == 0 {
        return Segmentation::empty();
    }

    let mut boundaries: Vec<usize> = vec![0];
    for k in 0..n {
        let open_start = *boundaries.last().unwrap();
        let mut min_sim = SIMILARITY_SENTINEL;
        for m in open_start..k {
            let d = dot(&vectors[k], &vectors[m]);
            if d < min_sim {
                min_sim = d;
            }
        }
        if min_sim < threshold {
            boundaries.push(k);
        }
    }
    boundaries.push(n - 1);

    let mut segments = Vec::new();
    let mut covered_len = 0usize;
    for pair in boundaries.windows(2) {
        let (start, end) = (pair[0], pair[1]);
        if end - start > min_len {
            segments.push(Segment::new(start, end));
            covered_len += end - start;
        }
    }

    debug!(
        boundaries = boundaries.len(),
        retained = segments.len(),
        covered_len,
        "Segmentation complete"
    );

    Segmentation {
        segments,
        covered_len,
    }
}

fn dot(a: &[f32], b: &[f32]) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| *x as f64 * *y as f64)
        .sum()
}
