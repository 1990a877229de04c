//! Embedding sequences built over a video window.
//!
//! An [`EmbeddingSequence`] is the ordered list of per-frame embedding
//! vectors produced for a requested window, index-aligned 1:1 with the
//! decode-order frame indices of that window.

use serde::{Deserialize, Serialize};

/// How a window's start/end values are interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IndexUnit {
    /// Start/end are raw frame indices (unit factor 1).
    Frames,
    /// Start/end are seconds, converted via the source frame rate.
    Seconds,
}

impl IndexUnit {
    /// Conversion factor from window units to frame indices.
    pub fn factor(&self, fps: f64) -> f64 {
        match self {
            IndexUnit::Frames => 1.0,
            IndexUnit::Seconds => fps,
        }
    }
}

/// Ordered per-frame embedding vectors for one requested window.
///
/// Element `i` corresponds to absolute frame index `start_index + i`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingSequence {
    /// One vector per forwarded frame, in decode order.
    vectors: Vec<Vec<f32>>,
    /// Source frame rate (frames/second).
    pub fps: f64,
    /// Unit the originating window was expressed in.
    pub unit: IndexUnit,
    /// Absolute frame index of element 0.
    pub start_index: usize,
}

impl EmbeddingSequence {
    /// Create a sequence from already-normalized vectors.
    pub fn new(vectors: Vec<Vec<f32>>, fps: f64, unit: IndexUnit, start_index: usize) -> Self {
        Self {
            vectors,
            fps,
            unit,
            start_index,
        }
    }

    /// Number of embeddings in the sequence.
    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    /// Whether the window produced no embeddings at all.
    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    /// Embedding dimensionality (0 for an empty sequence).
    pub fn dim(&self) -> usize {
        self.vectors.first().map(|v| v.len()).unwrap_or(0)
    }

    /// Vector at local index `i`.
    pub fn get(&self, i: usize) -> Option<&[f32]> {
        self.vectors.get(i).map(|v| v.as_slice())
    }

    /// All vectors, in order.
    pub fn vectors(&self) -> &[Vec<f32>] {
        &self.vectors
    }

    /// Vectors for the local half-open range `[start, end)`.
    pub fn slice(&self, start: usize, end: usize) -> &[Vec<f32>] {
        &self.vectors[start..end]
    }

    /// Absolute frame index of local index `i`.
    pub fn absolute_index(&self, i: usize) -> usize {
        self.start_index + i
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_factor() {
        assert_eq!(IndexUnit::Frames.factor(25.0), 1.0);
        assert_eq!(IndexUnit::Seconds.factor(25.0), 25.0);
    }

    #[test]
    fn test_sequence_accessors() {
        let seq = EmbeddingSequence::new(
            vec![vec![1.0, 0.0], vec![0.0, 1.0]],
            24.0,
            IndexUnit::Frames,
            10,
        );
        assert_eq!(seq.len(), 2);
        assert!(!seq.is_empty());
        assert_eq!(seq.dim(), 2);
        assert_eq!(seq.get(1), Some(&[0.0f32, 1.0][..]));
        assert_eq!(seq.absolute_index(1), 11);
        assert_eq!(seq.slice(0, 1).len(), 1);
    }

    #[test]
    fn test_empty_sequence() {
        let seq = EmbeddingSequence::new(vec![], 30.0, IndexUnit::Seconds, 0);
        assert!(seq.is_empty());
        assert_eq!(seq.dim(), 0);
        assert!(seq.get(0).is_none());
    }
}
