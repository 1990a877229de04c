//! Shared data models for scene segmentation.
//!
//! This crate provides Serde-serializable types for:
//! - Embedding sequences built over a video window
//! - Scene segments and segmentation results
//! - Per-frame sharpness profiles

pub mod embedding;
pub mod segment;
pub mod sharpness;

// Re-export common types
pub use embedding::{EmbeddingSequence, IndexUnit};
pub use segment::{Segment, Segmentation};
pub use sharpness::{FrameSharpness, SharpnessProfile};
