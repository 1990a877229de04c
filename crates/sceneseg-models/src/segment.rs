//! Scene segments over frame indices.

use serde::{Deserialize, Serialize};

/// A contiguous run of visually coherent frames, as a half-open
/// interval `[start, end)` over local embedding indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    /// First frame index in the segment (inclusive).
    pub start: usize,
    /// One past the last frame index (exclusive).
    pub end: usize,
}

impl Segment {
    /// Create a segment. Callers are expected to uphold `start < end`.
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Number of frames covered.
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    /// Whether the interval is degenerate.
    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }
}

/// Result of segmenting an embedding sequence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Segmentation {
    /// Retained segments, non-overlapping and ordered by start.
    pub segments: Vec<Segment>,
    /// Total number of frames covered by retained segments.
    pub covered_len: usize,
}

impl Segmentation {
    /// An empty result (nothing survived the length filter).
    pub fn empty() -> Self {
        Self {
            segments: Vec::new(),
            covered_len: 0,
        }
    }
}
