//! Embedding sequence construction.
//!
//! Drives a [`FrameSource`] and an [`EmbeddingProvider`] over a requested
//! window, accumulating frames into fixed-size batches and normalizing
//! every returned vector to unit L2 norm before it enters the sequence.
//! Downstream components then operate in a metric space where dot-product
//! similarity and normalized distance coincide.

use tracing::{debug, info};

use sceneseg_models::{EmbeddingSequence, IndexUnit};

use crate::config::SceneConfig;
use crate::error::{CoreError, CoreResult};
use crate::provider::EmbeddingProvider;
use crate::source::{Frame, FrameSource};

/// Normalize a vector to unit L2 norm in place. A zero vector is left
/// untouched.
pub fn l2_normalize(v: &mut [f32]) {
    let norm = v.iter().map(|x| (*x as f64) * (*x as f64)).sum::<f64>().sqrt();
    if norm > 0.0 {
        for x in v.iter_mut() {
            *x = (*x as f64 / norm) as f32;
        }
    }
}

/// Builds an [`EmbeddingSequence`] for a video window.
pub struct EmbeddingSequenceBuilder<'a, P: EmbeddingProvider> {
    provider: &'a P,
    config: SceneConfig,
}

impl<'a, P: EmbeddingProvider> EmbeddingSequenceBuilder<'a, P> {
    /// Create a builder around an embedding provider.
    pub fn new(provider: &'a P, config: SceneConfig) -> Self {
        Self { provider, config }
    }

    /// Build the embedding sequence for `[start, end)` in the given unit.
    ///
    /// Frames are read strictly in decode order; frames outside the
    /// window are decoded and discarded. A negative `start` means "from
    /// the beginning". An empty window yields an empty sequence; a source
    /// that cannot produce a first frame at all is `SourceUnavailable`.
    pub fn build(
        &self,
        source: &mut dyn FrameSource,
        start: f64,
        end: f64,
        unit: IndexUnit,
    ) -> CoreResult<EmbeddingSequence> {
        let fps = source.fps();
        let factor = unit.factor(fps);
        let lo = start * factor;
        let hi = end * factor;

        let Some(first) = source.next_frame() else {
            return Err(CoreError::source_unavailable(
                "source produced no decodable first frame",
            ));
        };

        info!(
            provider = self.provider.name(),
            batch_size = self.config.batch_size,
            fps,
            "Building embedding sequence for window [{:.1}, {:.1})",
            lo,
            hi
        );

        let mut vectors: Vec<Vec<f32>> = Vec::new();
        let mut batch: Vec<Frame> = Vec::new();
        let mut start_index: Option<usize> = None;

        let mut next = Some(first);
        while let Some(frame) = next.take() {
            let idx = frame.index as f64;
            if idx >= hi {
                break;
            }
            if idx >= lo {
                start_index.get_or_insert(frame.index);
                if self.config.batch_size == 0 {
                    self.flush(vec![frame], &mut vectors)?;
                } else {
                    batch.push(frame);
                    if batch.len() == self.config.batch_size {
                        let full = std::mem::take(&mut batch);
                        self.flush(full, &mut vectors)?;
                    }
                }
            }
            next = source.next_frame();
        }

        // Partial final batch is still inferred.
        if !batch.is_empty() {
            self.flush(batch, &mut vectors)?;
        }

        debug!(embeddings = vectors.len(), "Embedding sequence complete");

        Ok(EmbeddingSequence::new(
            vectors,
            fps,
            unit,
            start_index.unwrap_or(0),
        ))
    }

    /// Run one inference call, taking ownership of the batch, and append
    /// the normalized results.
    fn flush(&self, frames: Vec<Frame>, out: &mut Vec<Vec<f32>>) -> CoreResult<()> {
        let expected = frames.len();
        let embeddings = self.provider.embed(frames)?;

        if embeddings.len() != expected {
            return Err(CoreError::BatchLengthMismatch {
                expected,
                got: embeddings.len(),
            });
        }

        for mut v in embeddings {
            if v.len() != self.config.embedding_dim {
                return Err(CoreError::DimensionMismatch {
                    expected: self.config.embedding_dim,
                    got: v.len(),
                });
            }
            l2_normalize(&mut v);
            out.push(v);
        }
        Ok(())
    }
}
