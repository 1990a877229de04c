//! Representative-frame selection.
//!
//! Both policies converge on "pick the embedding closest to a robust
//! centroid": the geometric-median path for segment-local windows, and a
//! two-pass outlier-trimmed mean for arbitrary caller-specified windows
//! where the slower Weiszfeld iteration is not warranted.

use image::RgbImage;
use tracing::debug;

use sceneseg_models::{EmbeddingSequence, Segment, Segmentation};

use crate::config::SceneConfig;
use crate::source::{collect_frames, FrameSource};

/// Segments with fewer embeddings than this are skipped by the
/// geometric-median path; too few points for a meaningful robust centroid.
const MIN_POINTS_FOR_MEDIAN: usize = 3;

/// The frame chosen to stand in for an entire segment.
#[derive(Debug, Clone)]
pub struct RepresentativeFrame {
    /// Absolute frame index in the source video.
    pub frame_index: usize,
    /// The decoded frame.
    pub image: RgbImage,
    /// Number of frames in the segment, kept as a confidence weight for
    /// downstream consumers.
    pub segment_size: usize,
}

/// Geometric median of a point set via Weiszfeld's algorithm.
///
/// Iteration re-weights points by inverse distance to the current
/// estimate. Points coinciding with the estimate are excluded from the
/// weighted average and their pull re-incorporated through a correction
/// term so the estimate does not diverge; if every point coincides, the
/// estimate is returned as-is. Terminates when the estimate moves less
/// than `eps` in Euclidean distance.
pub fn geometric_median(points: &[Vec<f32>], eps: f64) -> Vec<f64> {
    let dim = points.first().map(|p| p.len()).unwrap_or(0);
    let mut y = mean_point(points, dim);

    loop {
        let dists: Vec<f64> = points.iter().map(|p| euclidean(p, &y)).collect();

        let mut inv_sum = 0.0f64;
        let mut weighted = vec![0.0f64; dim];
        let mut num_zeros = 0usize;
        for (p, d) in points.iter().zip(dists.iter()) {
            if *d == 0.0 {
                num_zeros += 1;
                continue;
            }
            let w = 1.0 / d;
            inv_sum += w;
            for (acc, x) in weighted.iter_mut().zip(p.iter()) {
                *acc += w * *x as f64;
            }
        }

        if num_zeros == points.len() {
            return y;
        }

        let t: Vec<f64> = weighted.iter().map(|w| w / inv_sum).collect();

        let y1 = if num_zeros == 0 {
            t
        } else {
            let r: f64 = t
                .iter()
                .zip(y.iter())
                .map(|(ti, yi)| ((ti - yi) * inv_sum).powi(2))
                .sum::<f64>()
                .sqrt();
            let rinv = if r == 0.0 { 0.0 } else { num_zeros as f64 / r };
            let wt = (1.0 - rinv).max(0.0);
            let wy = rinv.min(1.0);
            t.iter()
                .zip(y.iter())
                .map(|(ti, yi)| wt * ti + wy * yi)
                .collect()
        };

        let moved: f64 = y1
            .iter()
            .zip(y.iter())
            .map(|(a, b)| (a - b).powi(2))
            .sum::<f64>()
            .sqrt();
        if moved < eps {
            return y1;
        }
        y = y1;
    }
}

/// Choose the representative index for a segment without touching the
/// frame source. Returns the absolute frame index, or `None` when the
/// segment has fewer than 3 embeddings.
pub fn choose_index(seq: &EmbeddingSequence, segment: &Segment, eps: f64) -> Option<usize> {
    if segment.len() < MIN_POINTS_FOR_MEDIAN {
        return None;
    }
    let local = seq.slice(segment.start, segment.end);
    let median = geometric_median(local, eps);

    let argmin = argmin_sq_dist(local, &median)?;
    Some(seq.absolute_index(segment.start + argmin))
}

/// Select the representative frame for one segment, re-querying the
/// source to materialize the chosen image.
///
/// A `None` result (segment too short, or the source ended before the
/// chosen index) is valid output, not an error.
pub fn select(
    seq: &EmbeddingSequence,
    segment: &Segment,
    source: &mut dyn FrameSource,
    config: &SceneConfig,
) -> Option<RepresentativeFrame> {
    let index = choose_index(seq, segment, config.median_tolerance)?;
    let frame = collect_frames(source, &[index]).pop()?;
    Some(RepresentativeFrame {
        frame_index: index,
        image: frame.image,
        segment_size: segment.len(),
    })
}

/// Select representative frames for every retained segment in one
/// forward decode pass over the source.
pub fn select_all(
    seq: &EmbeddingSequence,
    segmentation: &Segmentation,
    source: &mut dyn FrameSource,
    config: &SceneConfig,
) -> Vec<RepresentativeFrame> {
    let mut chosen: Vec<(usize, usize)> = Vec::new();
    for segment in &segmentation.segments {
        if let Some(index) = choose_index(seq, segment, config.median_tolerance) {
            chosen.push((index, segment.len()));
        }
    }

    debug!(
        segments = segmentation.segments.len(),
        chosen = chosen.len(),
        "Selected representative indices"
    );

    let indices: Vec<usize> = chosen.iter().map(|(i, _)| *i).collect();
    let frames = collect_frames(source, &indices);

    frames
        .into_iter()
        .filter_map(|frame| {
            chosen
                .iter()
                .find(|(i, _)| *i == frame.index)
                .map(|(_, size)| RepresentativeFrame {
                    frame_index: frame.index,
                    image: frame.image,
                    segment_size: *size,
                })
        })
        .collect()
}

/// Select a representative for an arbitrary local window `[start, end)`
/// using the outlier-trimmed-mean policy.
///
/// The farthest `trim_fraction` of points from the window mean are
/// discarded (always retaining at least 2), the mean is recomputed over
/// the inliers, and the inlier closest to the refined mean wins.
pub fn select_with_outlier_trim(
    seq: &EmbeddingSequence,
    start: usize,
    end: usize,
    trim_fraction: f64,
    source: &mut dyn FrameSource,
) -> Option<RepresentativeFrame> {
    let local_index = choose_trimmed_index(seq.slice(start, end), trim_fraction)?;
    let index = seq.absolute_index(start + local_index);
    let frame = collect_frames(source, &[index]).pop()?;
    Some(RepresentativeFrame {
        frame_index: index,
        image: frame.image,
        segment_size: end - start,
    })
}

/// Trimmed-mean choice over a window, returning the window-local index.
pub fn choose_trimmed_index(points: &[Vec<f32>], trim_fraction: f64) -> Option<usize> {
    if points.is_empty() {
        return None;
    }
    let dim = points[0].len();

    let mean = mean_point(points, dim);
    let mut order: Vec<usize> = (0..points.len()).collect();
    let dists: Vec<f64> = points.iter().map(|p| sq_dist(p, &mean)).collect();
    // Index tie-break keeps the ranking deterministic.
    order.sort_by(|a, b| {
        dists[*a]
            .partial_cmp(&dists[*b])
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.cmp(b))
    });

    let keep = ((points.len() as f64 * (1.0 - trim_fraction)) as usize)
        .max(2)
        .min(points.len());
    let inliers = &order[..keep];

    let inlier_points: Vec<Vec<f32>> = inliers.iter().map(|i| points[*i].clone()).collect();
    let refined = mean_point(&inlier_points, dim);

    let best = argmin_sq_dist(&inlier_points, &refined)?;
    Some(inliers[best])
}

fn mean_point(points: &[Vec<f32>], dim: usize) -> Vec<f64> {
    let mut mean = vec![0.0f64; dim];
    if points.is_empty() {
        return mean;
    }
    for p in points {
        for (acc, x) in mean.iter_mut().zip(p.iter()) {
            *acc += *x as f64;
        }
    }
    for acc in mean.iter_mut() {
        *acc /= points.len() as f64;
    }
    mean
}

fn euclidean(p: &[f32], q: &[f64]) -> f64 {
    sq_dist(p, q).sqrt()
}

fn sq_dist(p: &[f32], q: &[f64]) -> f64 {
    p.iter()
        .zip(q.iter())
        .map(|(a, b)| (*a as f64 - b).powi(2))
        .sum()
}

fn argmin_sq_dist(points: &[Vec<f32>], target: &[f64]) -> Option<usize> {
    points
        .iter()
        .enumerate()
        .map(|(i, p)| (i, sq_dist(p, target)))
        .min_by(|(_, a), (_, b)| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal))
        .map(|(i, _)| i)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::VecFrameSource;
    use sceneseg_models::IndexUnit;

    fn seq(vectors: Vec<Vec<f32>>, start_index: usize) -> EmbeddingSequence {
        EmbeddingSequence::new(vectors, 25.0, IndexUnit::Frames, start_index)
    }

    #[test]
    fn test_median_of_identical_points() {
        let points = vec![vec![1.0, 0.0, 0.0]; 4];
        let median = geometric_median(&points, 1e-5);
        assert!((median[0] - 1.0).abs() < 1e-9);
        assert!(median[1].abs() < 1e-9);
    }

    #[test]
    fn test_median_robust_to_outlier() {
        let points = vec![
            vec![1.0, 0.0],
            vec![0.99, 0.14],
            vec![0.99, -0.14],
            vec![0.0, 1.0],
        ];
        let median = geometric_median(&points, 1e-5);
        // The median should sit inside the cluster, not drift toward
        // the outlier the way the mean does.
        let mean_y = (0.0 + 0.14 - 0.14 + 1.0) / 4.0;
        assert!(median[1] < mean_y);
        assert!(median[0] > 0.8);
    }

    #[test]
    fn test_median_with_coincident_majority() {
        let points = vec![vec![0.0, 0.0], vec![0.0, 0.0], vec![10.0, 0.0]];
        let median = geometric_median(&points, 1e-5);
        assert!(median[0].abs() < 0.1, "median drifted: {:?}", median);
    }

    #[test]
    fn test_choose_index_skip_rule_is_strictly_less_than_three() {
        let three = seq(vec![vec![1.0, 0.0, 0.0]; 3], 0);
        assert!(choose_index(&three, &Segment::new(0, 3), 1e-5).is_some());

        let two = seq(vec![vec![1.0, 0.0, 0.0]; 3], 0);
        assert!(choose_index(&two, &Segment::new(0, 2), 1e-5).is_none());
    }

    #[test]
    fn test_choose_index_applies_offsets() {
        let s = seq(
            vec![
                vec![0.0, 1.0],
                vec![1.0, 0.0],
                vec![1.0, 0.0],
                vec![1.0, 0.0],
            ],
            10,
        );
        let index = choose_index(&s, &Segment::new(1, 4), 1e-5).unwrap();
        // Local argmin is within [1, 4); absolute = 10 + local.
        assert!((11..14).contains(&index));
    }

    #[test]
    fn test_trimmed_choice_excludes_extreme_outlier() {
        let mut points = vec![vec![1.0f32, 0.0]; 5];
        points[2] = vec![-1.0, 0.0];
        let chosen = choose_trimmed_index(&points, 0.2).unwrap();
        assert_ne!(chosen, 2);
    }

    #[test]
    fn test_trimmed_choice_keeps_at_least_two() {
        let points = vec![vec![1.0f32, 0.0], vec![0.0, 1.0]];
        // Even an aggressive trim keeps 2 points.
        assert!(choose_trimmed_index(&points, 0.9).is_some());
    }

    #[test]
    fn test_select_materializes_chosen_frame() {
        let s = seq(vec![vec![1.0, 0.0]; 5], 0);
        let mut source = VecFrameSource::counting(10, 25.0);
        let config = SceneConfig::default();

        let rep = select(&s, &Segment::new(0, 5), &mut source, &config).unwrap();
        assert!(rep.frame_index < 5);
        assert_eq!(rep.segment_size, 5);
        assert_eq!(
            rep.image.get_pixel(0, 0)[0] as usize,
            rep.frame_index,
            "materialized frame does not match chosen index"
        );
    }

    #[test]
    fn test_select_all_single_pass() {
        let mut vectors = vec![vec![1.0f32, 0.0]; 12];
        vectors.extend(vec![vec![0.0f32, 1.0]; 12]);
        let s = seq(vectors, 0);
        let segmentation = Segmentation {
            segments: vec![Segment::new(0, 12), Segment::new(12, 24)],
            covered_len: 24,
        };
        let mut source = VecFrameSource::counting(30, 25.0);
        let config = SceneConfig::default();

        let reps = select_all(&s, &segmentation, &mut source, &config);
        assert_eq!(reps.len(), 2);
        assert!(reps[0].frame_index < 12);
        assert!((12..24).contains(&reps[1].frame_index));
        assert_eq!(reps[0].segment_size, 12);
    }

    #[test]
    fn test_select_with_outlier_trim_window_offset() {
        let mut vectors = vec![vec![1.0f32, 0.0]; 6];
        vectors[4] = vec![-1.0, 0.0];
        let s = seq(vectors, 100);
        let mut source = VecFrameSource::new(
            (0..200).map(|i| crate::testutil::solid_frame(i, (i % 256) as u8)).collect(),
            25.0,
        );

        let rep = select_with_outlier_trim(&s, 1, 6, 0.2, &mut source).unwrap();
        assert!((101..106).contains(&rep.frame_index));
        assert_ne!(rep.frame_index, 104, "outlier frame must not be chosen");
        assert_eq!(rep.segment_size, 5);
    }

    #[test]
    fn test_short_segment_yields_none_from_select() {
        let s = seq(vec![vec![1.0, 0.0]; 2], 0);
        let mut source = VecFrameSource::counting(5, 25.0);
        let config = SceneConfig::default();
        assert!(select(&s, &Segment::new(0, 2), &mut source, &config).is_none());
    }
}
