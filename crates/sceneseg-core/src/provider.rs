//! Embedding provider contract.
//!
//! The visual model that turns frames into embedding vectors is an
//! external collaborator. Anything that satisfies [`EmbeddingProvider`]
//! can be plugged in, including a deterministic stub for tests, without
//! touching the segmentation or selection logic.

use crate::error::CoreResult;
use crate::source::Frame;

/// Batch embedding inference.
///
/// Implementations must be length- and order-preserving: one raw vector
/// per input frame, in input order. Vectors are not required to be
/// pre-normalized; the sequence builder normalizes on receipt.
pub trait EmbeddingProvider {
    /// Embed a batch of frames. Errors propagate to the caller
    /// unmodified; the core performs no retry or fallback.
    fn embed(&self, frames: Vec<Frame>) -> CoreResult<Vec<Vec<f32>>>;

    /// Embedding dimensionality produced by the active model.
    fn dim(&self) -> usize;

    /// Provider name for logging.
    fn name(&self) -> &'static str;
}
