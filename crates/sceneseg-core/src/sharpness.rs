//! Blur scoring and adaptive sharpness thresholds.
//!
//! The primary per-frame score is the variance of the Laplacian of a
//! Gaussian-blurred grayscale conversion: sharper edges mean higher
//! variance. A secondary frequency-domain signal (log-magnitude energy
//! inside vs. outside a centered spectral window) is recorded per frame
//! for diagnostics; a blurry frame concentrates relatively more energy
//! near the spectrum center.
//!
//! The adaptive threshold is the median Laplacian score over a window,
//! divided by a fixed factor. The division biases the threshold low so
//! moderately sharp frames are not over-rejected; it is an empirically
//! chosen constant, exposed through [`SceneConfig`].

use image::RgbImage;
use rustfft::num_complex::Complex;
use rustfft::FftPlanner;
use tracing::{debug, info};

use sceneseg_models::{FrameSharpness, SharpnessProfile};

use crate::config::SceneConfig;
use crate::source::FrameSource;

/// Floor applied to spectral magnitudes before the log, keeping the
/// diagnostic finite on constant frames where the spectrum is zero.
const MAGNITUDE_FLOOR: f64 = 1e-12;

/// Sharpness scoring over frame windows.
pub struct SharpnessScorer {
    config: SceneConfig,
}

impl SharpnessScorer {
    /// Create a scorer with the given tunables.
    pub fn new(config: SceneConfig) -> Self {
        Self { config }
    }

    /// Score every decodable frame with index in `[start, end)`.
    ///
    /// Corrupt or zero-sized frames contribute no entry and never fail
    /// the call. The profile's threshold is derived adaptively from the
    /// collected Laplacian scores (0 for an empty window).
    pub fn score_window(
        &self,
        source: &mut dyn FrameSource,
        start: usize,
        end: usize,
    ) -> SharpnessProfile {
        let mut frames = Vec::new();

        while let Some(frame) = source.next_frame() {
            if frame.index >= end {
                break;
            }
            if frame.index < start {
                continue;
            }
            if frame.image.width() == 0 || frame.image.height() == 0 {
                debug!(frame = frame.index, "Skipping zero-sized frame");
                continue;
            }

            let laplacian_var = laplacian_variance(&frame.image);
            let (spectral_center, spectral_border) =
                spectral_profile(&frame.image, self.config.spectral_window);
            frames.push(FrameSharpness {
                frame_index: frame.index,
                laplacian_var,
                spectral_center,
                spectral_border,
            });
        }

        let scores: Vec<f64> = frames.iter().map(|f| f.laplacian_var).collect();
        let threshold = self.adaptive_threshold(&scores);

        info!(
            scored = frames.len(),
            threshold, "Sharpness window scored"
        );

        SharpnessProfile { frames, threshold }
    }

    /// Median Laplacian score divided by the configured factor.
    pub fn adaptive_threshold(&self, scores: &[f64]) -> f64 {
        median(scores) / self.config.blur_threshold_divisor
    }

    /// Classify a single frame: `true` if sharp (score above threshold).
    pub fn classify(&self, image: &RgbImage, threshold: f64) -> bool {
        laplacian_variance(image) > threshold
    }

    /// Sharp/blurry mask for the frames in `[start, end)`.
    ///
    /// A negative `threshold` means "derive it adaptively from this
    /// window first"; otherwise the explicit value is applied per frame.
    pub fn mark_window(
        &self,
        source: &mut dyn FrameSource,
        start: usize,
        end: usize,
        threshold: f64,
    ) -> Vec<bool> {
        let profile = self.score_window(source, start, end);
        let threshold = if threshold < 0.0 {
            profile.threshold
        } else {
            threshold
        };
        profile
            .frames
            .iter()
            .map(|f| f.laplacian_var > threshold)
            .collect()
    }
}

/// Variance of the Laplacian of the Gaussian-blurred grayscale frame.
pub fn laplacian_variance(image: &RgbImage) -> f64 {
    let (w, h) = (image.width() as usize, image.height() as usize);
    if w == 0 || h == 0 {
        return 0.0;
    }

    let gray = to_gray(image);
    let blurred = gaussian_blur_3x3(&gray, w, h);
    let lap = laplacian_3x3(&blurred, w, h);
    variance(&lap)
}

/// Spectral (center, border) log-magnitude means.
///
/// The spectrum is shifted so the zero-frequency component is centered,
/// the log-magnitude is averaged inside the centered window, then the
/// window is zeroed and the remaining plane averaged for the border
/// value.
pub fn spectral_profile(image: &RgbImage, window: usize) -> (f64, f64) {
    let (w, h) = (image.width() as usize, image.height() as usize);
    if w == 0 || h == 0 {
        return (0.0, 0.0);
    }

    let gray = to_gray(image);
    let mut magnitude = fft2_log_magnitude(&gray, w, h);

    let (cx, cy) = (w / 2, h / 2);
    let row_lo = cy.saturating_sub(window);
    let row_hi = (cy + window).min(h);
    let col_lo = cx.saturating_sub(window);
    let col_hi = (cx + window).min(w);

    let mut center_sum = 0.0f64;
    let mut center_count = 0usize;
    for row in row_lo..row_hi {
        for col in col_lo..col_hi {
            center_sum += magnitude[row * w + col];
            center_count += 1;
            magnitude[row * w + col] = 0.0;
        }
    }

    let center_mean = if center_count > 0 {
        center_sum / center_count as f64
    } else {
        0.0
    };
    // The zeroed center stays in the denominator; the border mean is
    // taken over the whole plane after masking.
    let border_mean = magnitude.iter().sum::<f64>() / (w * h) as f64;

    (center_mean, border_mean)
}

/// Grayscale plane (ITU-R 601 luma, 0..255).
fn to_gray(image: &RgbImage) -> Vec<f64> {
    image
        .pixels()
        .map(|p| 0.299 * p[0] as f64 + 0.587 * p[1] as f64 + 0.114 * p[2] as f64)
        .collect()
}

/// 3x3 Gaussian blur with edge replication.
fn gaussian_blur_3x3(plane: &[f64], w: usize, h: usize) -> Vec<f64> {
    const KERNEL: [[f64; 3]; 3] = [[1.0, 2.0, 1.0], [2.0, 4.0, 2.0], [1.0, 2.0, 1.0]];
    convolve_3x3(plane, w, h, &KERNEL, 1.0 / 16.0)
}

/// 3x3 Laplacian with edge replication.
fn laplacian_3x3(plane: &[f64], w: usize, h: usize) -> Vec<f64> {
    const KERNEL: [[f64; 3]; 3] = [[0.0, 1.0, 0.0], [1.0, -4.0, 1.0], [0.0, 1.0, 0.0]];
    convolve_3x3(plane, w, h, &KERNEL, 1.0)
}

fn convolve_3x3(plane: &[f64], w: usize, h: usize, kernel: &[[f64; 3]; 3], scale: f64) -> Vec<f64> {
    let mut out = vec![0.0f64; w * h];
    for y in 0..h {
        for x in 0..w {
            let mut acc = 0.0f64;
            for (ky, krow) in kernel.iter().enumerate() {
                let sy = (y + ky).saturating_sub(1).min(h - 1);
                for (kx, kval) in krow.iter().enumerate() {
                    let sx = (x + kx).saturating_sub(1).min(w - 1);
                    acc += kval * plane[sy * w + sx];
                }
            }
            out[y * w + x] = acc * scale;
        }
    }
    out
}

fn variance(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mean = values.iter().sum::<f64>() / values.len() as f64;
    values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64
}

fn median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

/// Shifted 2D FFT log-magnitude plane, zero frequency centered.
fn fft2_log_magnitude(plane: &[f64], w: usize, h: usize) -> Vec<f64> {
    let mut planner = FftPlanner::<f64>::new();
    let row_fft = planner.plan_fft_forward(w);
    let col_fft = planner.plan_fft_forward(h);

    let mut data: Vec<Complex<f64>> = plane.iter().map(|v| Complex::new(*v, 0.0)).collect();

    for row in data.chunks_exact_mut(w) {
        row_fft.process(row);
    }

    let mut column = vec![Complex::new(0.0, 0.0); h];
    for x in 0..w {
        for y in 0..h {
            column[y] = data[y * w + x];
        }
        col_fft.process(&mut column);
        for y in 0..h {
            data[y * w + x] = column[y];
        }
    }

    let mut magnitude = vec![0.0f64; w * h];
    for y in 0..h {
        let sy = (y + h / 2) % h;
        for x in 0..w {
            let sx = (x + w / 2) % w;
            magnitude[sy * w + sx] = data[y * w + x].norm().max(MAGNITUDE_FLOOR).ln();
        }
    }
    magnitude
}
