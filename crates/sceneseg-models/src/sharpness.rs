//! Per-frame sharpness profiles.

use serde::{Deserialize, Serialize};

/// Sharpness measurements for a single frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FrameSharpness {
    /// Absolute frame index the measurements belong to.
    pub frame_index: usize,
    /// Variance of the Laplacian of the blurred grayscale frame.
    /// Higher means sharper edges.
    pub laplacian_var: f64,
    /// Mean log-magnitude inside the centered spectral window.
    pub spectral_center: f64,
    /// Mean log-magnitude with the centered window zeroed out.
    pub spectral_border: f64,
}

/// Ordered sharpness measurements over a window, plus the derived
/// adaptive blur threshold.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SharpnessProfile {
    /// One entry per decodable frame in the window, in decode order.
    pub frames: Vec<FrameSharpness>,
    /// Adaptive threshold derived from the Laplacian score distribution.
    pub threshold: f64,
}

impl SharpnessProfile {
    /// Laplacian-variance scores in frame order.
    pub fn scores(&self) -> Vec<f64> {
        self.frames.iter().map(|f| f.laplacian_var).collect()
    }

    /// Number of scored frames.
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Whether the window yielded no scores.
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}
