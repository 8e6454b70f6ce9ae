//! Detection parameters.
//!
//! Defaults match a small thermal camera setup: no pre-filter, threshold at
//! 0.7 standard deviations above the frame mean, and the five largest blobs
//! reported.
//!
//! # Usage
//!
//! ```rust
//! use blob_detect::image_proc::convolve2d::{FilterSpec, PresetKernel};
//! use blob_detect::image_proc::detection::config::DetectionConfig;
//!
//! let config = DetectionConfig::default()
//!     .with_filter(FilterSpec::Preset(PresetKernel::Box))
//!     .with_std_dev_multiplier(1.5)
//!     .with_max_blobs(3);
//! assert!(config.validate().is_ok());
//! ```

use serde::{Deserialize, Serialize};

use super::labeling::ScanPolicy;
use crate::error::DetectionError;
use crate::image_proc::convolve2d::FilterSpec;

/// Default threshold in standard deviations above the mean.
pub const DEFAULT_STD_DEV_MULTIPLIER: f64 = 0.7;

/// Default number of blobs reported per frame.
pub const DEFAULT_MAX_BLOBS: usize = 5;

/// Parameters for one detection call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    /// Optional convolution applied before thresholding
    pub filter: FilterSpec,
    /// Threshold = mean + multiplier × standard deviation; may be negative
    pub std_dev_multiplier: f64,
    /// Capacity of the returned blob list
    pub max_blobs: usize,
    /// Whether labeling stops once `max_blobs` ids are used
    pub scan_policy: ScanPolicy,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            filter: FilterSpec::None,
            std_dev_multiplier: DEFAULT_STD_DEV_MULTIPLIER,
            max_blobs: DEFAULT_MAX_BLOBS,
            scan_policy: ScanPolicy::Exhaustive,
        }
    }
}

impl DetectionConfig {
    /// Replace the pre-filter.
    pub fn with_filter(mut self, filter: FilterSpec) -> Self {
        self.filter = filter;
        self
    }

    /// Replace the threshold multiplier.
    pub fn with_std_dev_multiplier(mut self, nsd: f64) -> Self {
        self.std_dev_multiplier = nsd;
        self
    }

    /// Replace the blob list capacity.
    pub fn with_max_blobs(mut self, max_blobs: usize) -> Self {
        self.max_blobs = max_blobs;
        self
    }

    /// Replace the scan policy.
    pub fn with_scan_policy(mut self, scan_policy: ScanPolicy) -> Self {
        self.scan_policy = scan_policy;
        self
    }

    /// Check parameters before any computation is done.
    ///
    /// # Errors
    /// - [`DetectionError::InvalidCapacity`] if `max_blobs` is 0
    /// - [`DetectionError::InvalidRequest`] if the multiplier is NaN or infinite
    pub fn validate(&self) -> Result<(), DetectionError> {
        if self.max_blobs == 0 {
            return Err(DetectionError::InvalidCapacity(self.max_blobs));
        }
        if !self.std_dev_multiplier.is_finite() {
            return Err(DetectionError::InvalidRequest(format!(
                "std_dev_multiplier must be finite, got {}",
                self.std_dev_multiplier
            )));
        }
        Ok(())
    }
}
