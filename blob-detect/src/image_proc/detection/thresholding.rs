//! Statistical thresholding of sensor frames.
//!
//! A pixel becomes a blob candidate when its value reaches
//! `mean + nsd * std_dev`, where the statistics are taken over the whole
//! frame. Candidates also get a z-score, `(value - mean) / std_dev`, which the
//! labeler averages into each blob's probability.
//!
//! # Zero variance
//!
//! A flat frame has no meaningful z-score. In that case no pixel qualifies
//! unless `nsd <= 0`, and qualifying pixels get a z-score of 0.

use ndarray::{Array2, Zip};

use crate::algo::stats::{sample_statistics, SampleStatistics};
use crate::error::DetectionError;
use crate::image_proc::grid::{try_filled_array, Grid};

/// Per-pixel labeling state.
///
/// Every pixel is in exactly one state. Thresholding produces `Below` and
/// `Candidate`; the labeler moves each candidate to `Labeled` exactly once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PixelState {
    /// Below the detection threshold
    #[default]
    Below,
    /// Above threshold, not yet assigned to a blob
    Candidate,
    /// Member of the blob with this id
    Labeled(usize),
}

impl PixelState {
    /// True for pixels that reached the threshold, labeled or not.
    pub fn is_thresholded(&self) -> bool {
        !matches!(self, PixelState::Below)
    }
}

/// Output of [`apply_threshold`].
#[derive(Debug, Clone)]
pub struct ThresholdMap {
    /// `(height, width)` pixel states
    pub mask: Array2<PixelState>,
    /// `(height, width)` z-scores, 0.0 where the mask is `Below`
    pub z_scores: Array2<f64>,
    /// Frame statistics the threshold was derived from
    pub statistics: SampleStatistics,
    /// Threshold value actually applied
    pub threshold: f64,
    /// Number of `Candidate` pixels
    pub candidate_count: usize,
}

/// Mark every pixel at or above `mean + nsd * std_dev`.
///
/// # Arguments
/// * `grid` - Frame to threshold (already filtered, if filtering is wanted)
/// * `nsd` - Threshold in standard deviations above the mean; negative values
///   lower the threshold below the mean
///
/// # Errors
/// - [`DetectionError::DegenerateStatistics`] for a single-pixel frame
/// - [`DetectionError::Allocation`] if mask or z-score buffers cannot be reserved
pub fn apply_threshold(grid: &Grid, nsd: f64) -> Result<ThresholdMap, DetectionError> {
    let statistics = sample_statistics(&grid.view())?;
    let threshold = statistics.threshold(nsd);
    let (width, height) = (grid.width(), grid.height());

    let mut mask = try_filled_array(width, height, PixelState::Below, "mask")?;
    let mut z_scores = try_filled_array(width, height, 0.0, "z-score map")?;

    let zero_variance = statistics.is_zero_variance();
    if zero_variance {
        log::warn!(
            "Zero-variance frame (mean={:.3}); candidates only when nsd <= 0 (nsd={nsd})",
            statistics.mean
        );
    }

    let mut candidate_count = 0;
    Zip::from(&mut mask)
        .and(&mut z_scores)
        .and(grid.view())
        .for_each(|state, z, &value| {
            let qualifies = if zero_variance {
                nsd <= 0.0
            } else {
                value >= threshold
            };
            if qualifies {
                *state = PixelState::Candidate;
                *z = statistics.z_score(value);
                candidate_count += 1;
            }
        });

    log::trace!(
        "Threshold: mean={:.3}, sd={:.3}, nsd={nsd}, threshold={threshold:.3}, candidates={candidate_count}",
        statistics.mean,
        statistics.std_dev
    );

    Ok(ThresholdMap {
        mask,
        z_scores,
        statistics,
        threshold,
        candidate_count,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn center_hot_grid() -> Grid {
        let mut samples = [0.0; 9];
        samples[4] = 100.0;
        Grid::from_samples(&samples, 3, 3).unwrap()
    }

    #[test]
    fn test_only_hot_center_survives() {
        let map = apply_threshold(&center_hot_grid(), 1.0).unwrap();

        let mean = 100.0 / 9.0;
        let sd = 100.0 / 3.0;
        assert_relative_eq!(map.statistics.mean, mean, epsilon = 1e-12);
        assert_relative_eq!(map.statistics.std_dev, sd, epsilon = 1e-10);
        assert_relative_eq!(map.threshold, mean + sd, epsilon = 1e-10);

        assert_eq!(map.candidate_count, 1);
        for ((row, col), state) in map.mask.indexed_iter() {
            if (row, col) == (1, 1) {
                assert_eq!(*state, PixelState::Candidate);
            } else {
                assert_eq!(*state, PixelState::Below);
                assert_eq!(map.z_scores[[row, col]], 0.0);
            }
        }
        assert_relative_eq!(map.z_scores[[1, 1]], (100.0 - mean) / sd, epsilon = 1e-10);
    }

    #[test]
    fn test_threshold_is_inclusive() {
        let grid = Grid::from_samples(&[0.0, 2.0, 0.0, 2.0], 2, 2).unwrap();
        // nsd = 0 puts the threshold exactly on the mean
        let map = apply_threshold(&grid, 0.0).unwrap();
        assert_relative_eq!(map.threshold, 1.0);
        assert_eq!(map.candidate_count, 2);
        assert_eq!(map.mask[[0, 1]], PixelState::Candidate);
        assert_eq!(map.mask[[0, 0]], PixelState::Below);
    }

    #[test]
    fn test_negative_multiplier_lowers_threshold() {
        let map = apply_threshold(&center_hot_grid(), -1.0).unwrap();
        assert_eq!(map.candidate_count, 9);
        assert!(map.mask.iter().all(PixelState::is_thresholded));
        assert!(map.z_scores[[0, 0]] < 0.0);
    }

    #[test]
    fn test_zero_variance_frame() {
        let grid = Grid::from_samples(&[7.0; 6], 3, 2).unwrap();

        let strict = apply_threshold(&grid, 1.0).unwrap();
        assert_eq!(strict.candidate_count, 0);
        assert!(strict.mask.iter().all(|s| *s == PixelState::Below));

        let lenient = apply_threshold(&grid, 0.0).unwrap();
        assert_eq!(lenient.candidate_count, 6);
        assert!(lenient.z_scores.iter().all(|&z| z == 0.0));
    }

    #[test]
    fn test_single_pixel_frame_is_rejected() {
        let grid = Grid::from_samples(&[3.0], 1, 1).unwrap();
        assert_eq!(
            apply_threshold(&grid, 1.0).err(),
            Some(DetectionError::DegenerateStatistics { count: 1 })
        );
    }
}
