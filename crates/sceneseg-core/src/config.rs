//! Configuration for the segmentation and selection pipeline.
//!
//! All empirically tuned constants live here so callers can adjust them
//! for footage outside the typical movie domain they were tuned on.

use serde::{Deserialize, Serialize};

/// Tunables for embedding, segmentation, selection, and sharpness scoring.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneConfig {
    // === Embedding ===
    /// Frames per inference batch. 0 disables batching and issues
    /// single-frame calls, required when no accelerator batch processing
    /// is available (default: 0).
    pub batch_size: usize,

    /// Expected embedding dimensionality, model-dependent; common values
    /// are 640, 512, and 768 (default: 512).
    pub embedding_dim: usize,

    // === Segmentation ===
    /// Minimum retained segment length in frames; intervals must be
    /// strictly longer to survive (default: 9).
    pub min_segment_len: usize,

    /// Similarity threshold for closing a segment. Usable range is
    /// roughly 0.5-0.9 for cosine-style similarity over CLIP-like
    /// embeddings (default: 0.8).
    pub similarity_threshold: f64,

    // === Selection ===
    /// Fraction of farthest points discarded by outlier-trimmed
    /// selection; at least 2 points are always retained (default: 0.2).
    pub trim_fraction: f64,

    /// Convergence tolerance for the geometric-median iteration, in
    /// Euclidean distance between successive estimates (default: 1e-5).
    pub median_tolerance: f64,

    // === Sharpness ===
    /// The adaptive blur threshold is the median Laplacian-variance
    /// score divided by this value. Biased low on purpose so moderately
    /// sharp frames are not over-rejected (default: 1.25).
    pub blur_threshold_divisor: f64,

    /// Half-size in pixels of the centered box used by the spectral
    /// center/border diagnostic (default: 50).
    pub spectral_window: usize,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            batch_size: 0,
            embedding_dim: 512,
            min_segment_len: 9,
            similarity_threshold: 0.8,
            trim_fraction: 0.2,
            median_tolerance: 1e-5,
            blur_threshold_divisor: 1.25,
            spectral_window: 50,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = SceneConfig::default();
        assert_eq!(config.batch_size, 0);
        assert_eq!(config.embedding_dim, 512);
        assert_eq!(config.min_segment_len, 9);
        assert!((config.similarity_threshold - 0.8).abs() < f64::EPSILON);
        assert!((config.trim_fraction - 0.2).abs() < f64::EPSILON);
        assert!((config.blur_threshold_divisor - 1.25).abs() < f64::EPSILON);
        assert_eq!(config.spectral_window, 50);
    }
}
