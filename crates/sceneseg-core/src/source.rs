//! Frame sources.
//!
//! A [`FrameSource`] wraps a decodable video and yields frames strictly in
//! decode order. Seeking is not assumed reliable, so the cursor is
//! forward-only; callers that need a second pass over the same video must
//! open a fresh source.
//!
//! [`FfmpegFrameSource`] decodes via the FFmpeg CLI, reading RGB24 frames
//! from a rawvideo pipe. End-of-stream and unrecoverable decode failure
//! both surface as `None`; the two are not distinguished.

use std::collections::HashSet;
use std::io::Read;
use std::path::Path;
use std::process::{Child, ChildStdout, Command, Stdio};

use image::RgbImage;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{CoreError, CoreResult};

/// A decoded video frame with its 0-based decode-order index.
#[derive(Debug, Clone)]
pub struct Frame {
    /// Index assigned by the source, monotonically increasing.
    pub index: usize,
    /// Decoded RGB pixel data.
    pub image: RgbImage,
}

impl Frame {
    /// Create a frame from a decoded image.
    pub fn new(index: usize, image: RgbImage) -> Self {
        Self { index, image }
    }
}

/// Ordered, forward-only frame supplier.
pub trait FrameSource {
    /// Next frame in decode order, or `None` at end of stream or on an
    /// unrecoverable decode failure.
    fn next_frame(&mut self) -> Option<Frame>;

    /// Source frame rate in frames/second.
    fn fps(&self) -> f64;
}

/// Basic stream properties reported by ffprobe.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoInfo {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Frame rate (fps)
    pub fps: f64,
    /// Duration in seconds
    pub duration: f64,
}

/// FFprobe JSON output format.
#[derive(Debug, Deserialize)]
struct FfprobeOutput {
    format: FfprobeFormat,
    streams: Vec<FfprobeStream>,
}

#[derive(Debug, Deserialize)]
struct FfprobeFormat {
    duration: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FfprobeStream {
    codec_type: String,
    width: Option<u32>,
    height: Option<u32>,
    r_frame_rate: Option<String>,
    avg_frame_rate: Option<String>,
}

/// Probe a video file for stream properties.
pub fn probe_video(path: impl AsRef<Path>) -> CoreResult<VideoInfo> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(CoreError::FileNotFound(path.to_path_buf()));
    }

    which::which("ffprobe").map_err(|_| CoreError::FfprobeNotFound)?;

    let output = Command::new("ffprobe")
        .args([
            "-v",
            "quiet",
            "-print_format",
            "json",
            "-show_format",
            "-show_streams",
        ])
        .arg(path)
        .stdin(Stdio::null())
        .output()?;

    if !output.status.success() {
        return Err(CoreError::ffprobe_failed(
            "FFprobe failed",
            Some(String::from_utf8_lossy(&output.stderr).to_string()),
        ));
    }

    let probe: FfprobeOutput = serde_json::from_slice(&output.stdout)?;

    let video_stream = probe
        .streams
        .iter()
        .find(|s| s.codec_type == "video")
        .ok_or_else(|| CoreError::InvalidVideo("No video stream found".to_string()))?;

    let fps = video_stream
        .avg_frame_rate
        .as_deref()
        .or(video_stream.r_frame_rate.as_deref())
        .and_then(parse_frame_rate)
        .unwrap_or(30.0);

    let duration = probe
        .format
        .duration
        .as_ref()
        .and_then(|d| d.parse::<f64>().ok())
        .unwrap_or(0.0);

    Ok(VideoInfo {
        width: video_stream.width.unwrap_or(0),
        height: video_stream.height.unwrap_or(0),
        fps,
        duration,
    })
}

/// Parse an ffprobe frame-rate fraction like "30000/1001".
fn parse_frame_rate(rate: &str) -> Option<f64> {
    let mut parts = rate.split('/');
    let num: f64 = parts.next()?.trim().parse().ok()?;
    match parts.next() {
        Some(den) => {
            let den: f64 = den.trim().parse().ok()?;
            if den > 0.0 {
                Some(num / den)
            } else {
                None
            }
        }
        None => Some(num),
    }
}

/// Frame source decoding through an FFmpeg rawvideo pipe.
pub struct FfmpegFrameSource {
    child: Child,
    stdout: ChildStdout,
    width: u32,
    height: u32,
    fps: f64,
    frame_len: usize,
    next_index: usize,
    finished: bool,
}

impl FfmpegFrameSource {
    /// Open a video for forward-only decoding at native resolution.
    pub fn open(path: impl AsRef<Path>) -> CoreResult<Self> {
        let path = path.as_ref();
        let info = probe_video(path)?;

        if info.width == 0 || info.height == 0 {
            return Err(CoreError::InvalidVideo(format!(
                "Zero-sized video stream in {}",
                path.display()
            )));
        }

        which::which("ffmpeg").map_err(|_| CoreError::FfmpegNotFound)?;

        let mut cmd = Command::new("ffmpeg");
        cmd.args(["-hide_banner", "-loglevel", "error", "-i"])
            .arg(path)
            .args(["-pix_fmt", "rgb24", "-f", "rawvideo", "-"])
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null());

        debug!(path = %path.display(), fps = info.fps, "Spawning FFmpeg decode pipe");

        let mut child = cmd
            .spawn()
            .map_err(|e| CoreError::ffmpeg_failed(format!("Failed to spawn FFmpeg: {}", e), None, None))?;

        let stdout = child.stdout.take().ok_or_else(|| {
            CoreError::ffmpeg_failed("Failed to capture FFmpeg stdout", None, None)
        })?;

        Ok(Self {
            child,
            stdout,
            width: info.width,
            height: info.height,
            fps: info.fps,
            frame_len: (info.width * info.height * 3) as usize,
            next_index: 0,
            finished: false,
        })
    }

    /// Frame width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Frame height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }
}

impl FrameSource for FfmpegFrameSource {
    fn next_frame(&mut self) -> Option<Frame> {
        if self.finished {
            return None;
        }

        let mut buffer = vec![0u8; self.frame_len];
        if let Err(e) = self.stdout.read_exact(&mut buffer) {
            // EOF or a decoder error mid-frame; both end the stream.
            if e.kind() != std::io::ErrorKind::UnexpectedEof {
                warn!(frame = self.next_index, "FFmpeg pipe read failed: {}", e);
            }
            self.finished = true;
            let _ = self.child.wait();
            return None;
        }

        let image = RgbImage::from_raw(self.width, self.height, buffer)?;
        let frame = Frame::new(self.next_index, image);
        self.next_index += 1;
        Some(frame)
    }

    fn fps(&self) -> f64 {
        self.fps
    }
}

impl Drop for FfmpegFrameSource {
    fn drop(&mut self) {
        if !self.finished {
            let _ = self.child.kill();
            let _ = self.child.wait();
        }
    }
}

/// Materialize the frames at `indices` in a single forward pass.
///
/// Returns the matching frames in decode order; indices past the end of
/// the stream are silently absent from the result.
pub fn collect_frames(source: &mut dyn FrameSource, indices: &[usize]) -> Vec<Frame> {
    if indices.is_empty() {
        return Vec::new();
    }

    let wanted: HashSet<usize> = indices.iter().copied().collect();
    let last = *indices.iter().max().unwrap_or(&0);

    let mut collected = Vec::with_capacity(wanted.len());
    while let Some(frame) = source.next_frame() {
        let done = frame.index >= last;
        if wanted.contains(&frame.index) {
            collected.push(frame);
        }
        if done {
            break;
        }
    }

    collected
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::testutil::{solid_frame, VecFrameSource};

    #[test]
    fn test_parse_frame_rate() {
        assert_eq!(parse_frame_rate("25/1"), Some(25.0));
        assert_eq!(parse_frame_rate("30000/1001").map(|f| (f * 100.0).round()), Some(2997.0));
        assert_eq!(parse_frame_rate("24"), Some(24.0));
        assert_eq!(parse_frame_rate("0/0"), None);
        assert_eq!(parse_frame_rate("abc"), None);
    }

    #[test]
    fn test_collect_frames_single_pass() {
        let mut source = VecFrameSource::counting(10, 25.0);

        let collected = collect_frames(&mut source, &[2, 7, 4]);
        let indices: Vec<usize> = collected.iter().map(|f| f.index).collect();
        assert_eq!(indices, vec![2, 4, 7]);
    }

    #[test]
    fn test_collect_frames_past_end() {
        let frames: Vec<Frame> = (0..3).map(|i| solid_frame(i, 0)).collect();
        let mut source = VecFrameSource::new(frames, 25.0);

        let collected = collect_frames(&mut source, &[1, 99]);
        assert_eq!(collected.len(), 1);
        assert_eq!(collected[0].index, 1);
    }

    #[test]
    fn test_collect_frames_empty_request() {
        let mut source = VecFrameSource::new(Vec::new(), 25.0);
        assert!(collect_frames(&mut source, &[]).is_empty());
    }

    #[test]
    fn test_probe_missing_file() {
        let err = probe_video("/nonexistent/video.mp4").unwrap_err();
        assert!(matches!(err, CoreError::FileNotFound(_)));
    }
}
