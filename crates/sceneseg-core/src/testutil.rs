//! Shared test doubles: an in-memory frame source and a deterministic
//! stub embedding provider.

use std::cell::RefCell;
use std::collections::VecDeque;

use image::{Rgb, RgbImage};

use crate::error::{CoreError, CoreResult};
use crate::provider::EmbeddingProvider;
use crate::source::{Frame, FrameSource};

/// A 4x4 frame filled with a single gray value.
pub fn solid_frame(index: usize, value: u8) -> Frame {
    Frame::new(index, RgbImage::from_pixel(4, 4, Rgb([value; 3])))
}

/// Frame source backed by a vector of pre-built frames.
pub struct VecFrameSource {
    frames: VecDeque<Frame>,
    fps: f64,
}

impl VecFrameSource {
    pub fn new(frames: Vec<Frame>, fps: f64) -> Self {
        Self {
            frames: frames.into(),
            fps,
        }
    }

    /// `n` frames whose gray value equals their index.
    pub fn counting(n: usize, fps: f64) -> Self {
        Self::new((0..n).map(|i| solid_frame(i, i as u8)).collect(), fps)
    }
}

impl FrameSource for VecFrameSource {
    fn next_frame(&mut self) -> Option<Frame> {
        self.frames.pop_front()
    }

    fn fps(&self) -> f64 {
        self.fps
    }
}

/// Deterministic provider: the frame's top-left gray value picks an
/// angle in the first quadrant and the raw vector points along it,
/// scaled by the gray value so it is deliberately not unit-norm and
/// normalization is observable. Distinct gray values therefore produce
/// embeddings with controllable dot-product similarity. Records the
/// size of every batch it receives.
pub struct StubProvider {
    dim: usize,
    batches: RefCell<Vec<usize>>,
}

impl StubProvider {
    pub fn new(dim: usize) -> Self {
        Self {
            dim,
            batches: RefCell::new(Vec::new()),
        }
    }

    pub fn batch_sizes(&self) -> Vec<usize> {
        self.batches.borrow().clone()
    }
}

impl EmbeddingProvider for StubProvider {
    fn embed(&self, frames: Vec<Frame>) -> CoreResult<Vec<Vec<f32>>> {
        self.batches.borrow_mut().push(frames.len());
        Ok(frames
            .iter()
            .map(|f| {
                let value = f.image.get_pixel(0, 0)[0] as f32;
                let theta = value / 255.0 * std::f32::consts::FRAC_PI_2;
                let scale = value + 1.0;
                let mut v = vec![0.0f32; self.dim];
                v[0] = scale * theta.cos();
                if self.dim > 1 {
                    v[1] = scale * theta.sin();
                }
                v
            })
            .collect())
    }

    fn dim(&self) -> usize {
        self.dim
    }

    fn name(&self) -> &'static str {
        "stub"
    }
}

/// Provider that always fails, for propagation tests.
pub struct FailingProvider;

impl EmbeddingProvider for FailingProvider {
    fn embed(&self, _frames: Vec<Frame>) -> CoreResult<Vec<Vec<f32>>> {
        Err(CoreError::provider(std::io::Error::new(
            std::io::ErrorKind::Other,
            "inference backend down",
        )))
    }

    fn dim(&self) -> usize {
        2
    }

    fn name(&self) -> &'static str {
        "failing"
    }
}
