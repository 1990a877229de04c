//! Temporal scene segmentation and representative-frame selection.
//!
//! This crate partitions a video's frame sequence into visually coherent
//! segments using a per-frame embedding signal, selects the frame that
//! best represents each segment, and scores frames for blur with an
//! adaptive threshold:
//! - [`embedding::EmbeddingSequenceBuilder`] drives a frame source and an
//!   embedding provider in batches, normalizing every vector to unit L2
//!   norm.
//! - [`segmenter::segment`] closes a segment when the minimum similarity
//!   between a candidate frame and the open segment drops below threshold.
//! - [`selector`] picks the embedding closest to a robust centroid
//!   (geometric median, or an outlier-trimmed mean).
//! - [`sharpness::SharpnessScorer`] computes Laplacian-variance blur
//!   scores and derives an adaptive cutoff from their distribution.
//!
//! The embedding model and the video decoder are collaborators behind the
//! [`provider::EmbeddingProvider`] and [`source::FrameSource`] traits;
//! everything here is synchronous, single-threaded, and free of shared
//! mutable state across calls.

pub mod config;
pub mod embedding;
pub mod error;
pub mod pipeline;
pub mod provider;
pub mod segmenter;
pub mod selector;
pub mod sharpness;
pub mod source;

#[cfg(test)]
pub(crate) mod testutil;


pub use config::SceneConfig;
pub use embedding::{l2_normalize, EmbeddingSequenceBuilder};
pub use error::{CoreError, CoreResult};
pub use pipeline::{representative_frames, scene_elements};
pub use provider::EmbeddingProvider;
pub use segmenter::{segment, segment_sequence};
pub use selector::{
    choose_index, choose_trimmed_index, geometric_median, select, select_all,
    select_with_outlier_trim, RepresentativeFrame,
};
pub use sharpness::{laplacian_variance, spectral_profile, SharpnessScorer};
pub use source::{collect_frames, probe_video, FfmpegFrameSource, Frame, FrameSource, VideoInfo};
