//! Sample statistics over sensor frames.

use ndarray::ArrayView2;

use crate::error::DetectionError;

/// Standard deviations at or below this fraction of `max(|mean|, 1)` are
/// treated as zero variance.
pub const ZERO_VARIANCE_EPSILON: f64 = 1e-12;

/// Mean and Bessel-corrected standard deviation of a frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SampleStatistics {
    /// Number of samples the statistics were computed from
    pub count: usize,
    /// Arithmetic mean
    pub mean: f64,
    /// Sample standard deviation, `sqrt(Σ(v - mean)² / (n - 1))`
    pub std_dev: f64,
}

impl SampleStatistics {
    /// Detection threshold `mean + nsd * std_dev`.
    pub fn threshold(&self, nsd: f64) -> f64 {
        self.mean + nsd * self.std_dev
    }

    /// True when every sample is (numerically) equal to the mean.
    pub fn is_zero_variance(&self) -> bool {
        self.std_dev <= ZERO_VARIANCE_EPSILON * self.mean.abs().max(1.0)
    }

    /// Normalized distance of `value` from the mean.
    ///
    /// Returns 0.0 for zero-variance frames instead of dividing by zero.
    pub fn z_score(&self, value: f64) -> f64 {
        if self.is_zero_variance() {
            0.0
        } else {
            (value - self.mean) / self.std_dev
        }
    }
}

/// Arithmetic mean of all samples, or 0.0 for an empty view.
pub fn mean(image: &ArrayView2<f64>) -> f64 {
    if image.is_empty() {
        return 0.0;
    }
    image.sum() / image.len() as f64
}

/// Compute mean and sample standard deviation in two passes.
///
/// The squared-deviation sum uses its own accumulator, independent of the
/// sum used for the mean.
///
/// # Errors
/// [`DetectionError::DegenerateStatistics`] for fewer than two samples.
pub fn sample_statistics(image: &ArrayView2<f64>) -> Result<SampleStatistics, DetectionError> {
    let count = image.len();
    if count < 2 {
        return Err(DetectionError::DegenerateStatistics { count });
    }

    let mean = mean(image);
    let squared_deviations: f64 = image.iter().map(|&v| (v - mean).powi(2)).sum();
    let std_dev = (squared_deviations / (count - 1) as f64).sqrt();

    Ok(SampleStatistics {
        count,
        mean,
        std_dev,
    })
}
