//! Single-call blob detection pipeline.
//!
//! frame → optional convolution → threshold → flood-fill labeling → sorted
//! blob list. Every buffer lives for one call only and is dropped on return,
//! including early error returns.

use ndarray::Array2;

use super::blob::BlobList;
use super::config::DetectionConfig;
use super::labeling::{label_blobs, ScanPolicy};
use super::thresholding::{apply_threshold, PixelState};
use crate::algo::stats::SampleStatistics;
use crate::error::DetectionError;
use crate::image_proc::convolve2d::{convolve2d, FilterSpec};
use crate::image_proc::grid::Grid;

/// Full result of a detection call.
#[derive(Debug, Clone)]
pub struct BlobDetection {
    /// Blobs sorted by area, largest first
    pub blobs: BlobList,
    /// Final per-pixel state; labeled pixels carry their blob id
    pub labels: Array2<PixelState>,
    /// Statistics of the (filtered) frame
    pub statistics: SampleStatistics,
    /// Threshold applied to the (filtered) frame
    pub threshold: f64,
    /// Pixels that reached the threshold
    pub candidate_count: usize,
}

/// Run the pipeline and keep the intermediate label mask and statistics.
///
/// # Errors
/// Validation errors are returned before any computation:
/// - [`DetectionError::InvalidCapacity`] / [`DetectionError::InvalidRequest`] from
///   [`DetectionConfig::validate`]
/// - [`DetectionError::DegenerateStatistics`] for frames with fewer than 2 pixels
///
/// Allocation and frontier errors abort the call.
pub fn detect_report(grid: &Grid, config: &DetectionConfig) -> Result<BlobDetection, DetectionError> {
    config.validate()?;
    if grid.pixel_count() < 2 {
        return Err(DetectionError::DegenerateStatistics {
            count: grid.pixel_count(),
        });
    }

    let start_time = std::time::Instant::now();
    let total_pixels = grid.pixel_count();

    let filtered;
    let frame = match config.filter.kernel() {
        Some(kernel) => {
            filtered = convolve2d(grid, &kernel)?;
            &filtered
        }
        None => grid,
    };

    let threshold_map = apply_threshold(frame, config.std_dev_multiplier)?;
    let mut labels = threshold_map.mask;
    let blobs = label_blobs(
        &mut labels,
        &threshold_map.z_scores.view(),
        config.max_blobs,
        config.scan_policy,
    )?;

    let duration = start_time.elapsed();
    let time_per_pixel_ns = duration.as_nanos() as f64 / total_pixels as f64;
    log::debug!(
        "Blob detection: {}x{} frame, filter={:?}, candidates={}, blobs={}, duration={:.3}ms, time_per_pixel={:.2}ns/pixel",
        grid.width(),
        grid.height(),
        config.filter,
        threshold_map.candidate_count,
        blobs.len(),
        duration.as_secs_f64() * 1000.0,
        time_per_pixel_ns
    );

    Ok(BlobDetection {
        blobs,
        labels,
        statistics: threshold_map.statistics,
        threshold: threshold_map.threshold,
        candidate_count: threshold_map.candidate_count,
    })
}

/// Run the pipeline on a frame, returning only the blob list.
pub fn detect_blobs(grid: &Grid, config: &DetectionConfig) -> Result<BlobList, DetectionError> {
    detect_report(grid, config).map(|report| report.blobs)
}

/// Detect blobs in a flat row-major sample buffer.
///
/// # Arguments
/// * `samples` - `width * height` samples, pixel `(x, y)` at `x + y * width`
/// * `width`, `height` - Frame dimensions
/// * `filter` - Optional pre-filter
/// * `std_dev_multiplier` - Threshold in standard deviations above the mean
/// * `max_blobs` - Capacity of the returned list
///
/// # Returns
/// Up to `max_blobs` blobs, largest first. An empty list means nothing
/// reached the threshold.
pub fn detect<T>(
    samples: &[T],
    width: usize,
    height: usize,
    filter: FilterSpec,
    std_dev_multiplier: f64,
    max_blobs: usize,
) -> Result<BlobList, DetectionError>
where
    T: Copy + Into<f64>,
{
    let config = DetectionConfig {
        filter,
        std_dev_multiplier,
        max_blobs,
        scan_policy: ScanPolicy::Exhaustive,
    };
    config.validate()?;
    let grid = Grid::from_samples(samples, width, height)?;
    detect_blobs(&grid, &config)
}
