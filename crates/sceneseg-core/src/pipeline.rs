//! Windowed scene-analysis drivers.
//!
//! Convenience entry points composing the builder, segmenter, and
//! selector over one video window. Frame sources are forward-only, so
//! the selection pass takes a second, freshly opened source for the
//! same video; there is no shared state between calls and every driver
//! is idempotent with respect to its own data.

use sceneseg_models::{EmbeddingSequence, IndexUnit, Segmentation};

use crate::config::SceneConfig;
use crate::embedding::EmbeddingSequenceBuilder;
use crate::error::CoreResult;
use crate::provider::EmbeddingProvider;
use crate::segmenter::segment_sequence;
use crate::selector::{select_all, RepresentativeFrame};
use crate::source::FrameSource;

/// Divide a window of a video into scene elements.
pub fn scene_elements<P: EmbeddingProvider>(
    source: &mut dyn FrameSource,
    provider: &P,
    config: &SceneConfig,
    start: f64,
    end: f64,
    unit: IndexUnit,
) -> CoreResult<Segmentation> {
    let builder = EmbeddingSequenceBuilder::new(provider, config.clone());
    let seq = builder.build(source, start, end, unit)?;
    Ok(segment_sequence(&seq, config))
}

/// Segment a window and pick a representative frame per scene element.
///
/// `frame_source` must be a fresh source over the same video; the
/// embedding pass consumes `embed_source` to its window end.
pub fn representative_frames<P: EmbeddingProvider>(
    embed_source: &mut dyn FrameSource,
    frame_source: &mut dyn FrameSource,
    provider: &P,
    config: &SceneConfig,
    start: f64,
    end: f64,
    unit: IndexUnit,
) -> CoreResult<(Vec<RepresentativeFrame>, EmbeddingSequence, Segmentation)> {
    let builder = EmbeddingSequenceBuilder::new(provider, config.clone());
    let seq = builder.build(embed_source, start, end, unit)?;
    let segmentation = segment_sequence(&seq, config);
    let frames = select_all(&seq, &segmentation, frame_source, config);
    Ok((frames, seq, segmentation))
}
