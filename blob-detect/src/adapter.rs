//! JSON request adapter for host integrations.
//!
//! Hosts describe a detection call as a flat JSON object:
//!
//! ```json
//! {
//!     "samples": [0, 0, 0, 0, 100, 0, 0, 0, 0],
//!     "width": 3,
//!     "height": 3,
//!     "filter": 1,
//!     "nsd": 1.0,
//!     "max_blobs": 5
//! }
//! ```
//!
//! `filter` is either an integer mode (0 = none, 1 = box, 2 = sharpen) or a
//! nested row-major kernel matrix. Omitted fields take the defaults of
//! [`DetectionConfig`]. The response is a JSON array of [`BlobRecord`]s,
//! largest blob first.

use serde::{Deserialize, Serialize};

use crate::error::DetectionError;
use crate::image_proc::convolve2d::{FilterSpec, Kernel};
use crate::image_proc::detection::blob::Blob;
use crate::image_proc::detection::config::{
    DetectionConfig, DEFAULT_MAX_BLOBS, DEFAULT_STD_DEV_MULTIPLIER,
};
use crate::image_proc::detection::labeling::ScanPolicy;
use crate::image_proc::detection::unified::detect_blobs;
use crate::image_proc::grid::Grid;

/// Wire form of a filter: integer mode or explicit kernel rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterArg {
    /// Host filter mode
    Mode(i64),
    /// Row-major kernel weights
    Matrix(Vec<Vec<f64>>),
}

impl TryFrom<FilterArg> for FilterSpec {
    type Error = DetectionError;

    fn try_from(arg: FilterArg) -> Result<Self, Self::Error> {
        match arg {
            FilterArg::Mode(mode) => FilterSpec::from_mode(mode),
            FilterArg::Matrix(rows) => Kernel::from_rows(&rows).map(FilterSpec::Custom),
        }
    }
}

impl From<FilterSpec> for FilterArg {
    fn from(spec: FilterSpec) -> Self {
        match spec {
            FilterSpec::None => FilterArg::Mode(0),
            FilterSpec::Preset(preset) => FilterArg::Mode(preset.mode()),
            FilterSpec::Custom(kernel) => FilterArg::Matrix(
                kernel
                    .weights()
                    .rows()
                    .into_iter()
                    .map(|row| row.to_vec())
                    .collect(),
            ),
        }
    }
}

fn default_std_dev_multiplier() -> f64 {
    DEFAULT_STD_DEV_MULTIPLIER
}

fn default_max_blobs() -> usize {
    DEFAULT_MAX_BLOBS
}

/// One detection call as sent by a host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectRequest {
    /// Row-major samples, `width * height` of them
    pub samples: Vec<f64>,
    /// Frame width in pixels
    pub width: usize,
    /// Frame height in pixels
    pub height: usize,
    /// Optional pre-filter; absent means no filtering
    #[serde(default)]
    pub filter: Option<FilterArg>,
    /// Threshold in standard deviations above the mean
    #[serde(default = "default_std_dev_multiplier", alias = "nsd")]
    pub std_dev_multiplier: f64,
    /// Maximum number of blobs returned
    #[serde(default = "default_max_blobs")]
    pub max_blobs: usize,
    /// Scan policy, exhaustive unless stated
    #[serde(default)]
    pub scan_policy: ScanPolicy,
}

impl DetectRequest {
    /// Parse a request from JSON text.
    ///
    /// # Errors
    /// [`DetectionError::InvalidRequest`] on malformed JSON or missing fields.
    pub fn from_json(text: &str) -> Result<Self, DetectionError> {
        serde_json::from_str(text).map_err(|e| DetectionError::InvalidRequest(e.to_string()))
    }

    /// Validated detection parameters.
    pub fn config(&self) -> Result<DetectionConfig, DetectionError> {
        let filter = match &self.filter {
            Some(arg) => FilterSpec::try_from(arg.clone())?,
            None => FilterSpec::None,
        };
        let config = DetectionConfig {
            filter,
            std_dev_multiplier: self.std_dev_multiplier,
            max_blobs: self.max_blobs,
            scan_policy: self.scan_policy,
        };
        config.validate()?;
        Ok(config)
    }

    /// Frame described by the request.
    pub fn grid(&self) -> Result<Grid, DetectionError> {
        Grid::from_samples(&self.samples, self.width, self.height)
    }

    /// Validate and run the request.
    pub fn run(&self) -> Result<Vec<BlobRecord>, DetectionError> {
        let config = self.config()?;
        let grid = self.grid()?;
        let blobs = detect_blobs(&grid, &config)?;
        Ok(blobs.iter().map(BlobRecord::from).collect())
    }
}

/// Wire form of one detected blob.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BlobRecord {
    /// Number of member pixels
    pub area: usize,
    /// Blob label, 1-based in discovery order
    pub id: usize,
    /// Mean z-score of the member pixels
    pub probability: f64,
    /// Mean column coordinate
    pub centroid_x: f64,
    /// Mean row coordinate
    pub centroid_y: f64,
}

impl BlobRecord {
    /// Legacy positional layout `(area, id, probability, x, y)`.
    pub fn to_tuple(&self) -> (usize, usize, f64, f64, f64) {
        (
            self.area,
            self.id,
            self.probability,
            self.centroid_x,
            self.centroid_y,
        )
    }
}

impl From<&Blob> for BlobRecord {
    fn from(blob: &Blob) -> Self {
        Self {
            area: blob.area,
            id: blob.id,
            probability: blob.probability,
            centroid_x: blob.x,
            centroid_y: blob.y,
        }
    }
}

/// Parse a JSON request, run detection and serialize the blob records.
pub fn detect_json(text: &str) -> Result<String, DetectionError> {
    let request = DetectRequest::from_json(text)?;
    let records = request.run()?;
    log::debug!(
        "JSON request {}x{}: {} blob(s)",
        request.width,
        request.height,
        records.len()
    );
    serde_json::to_string(&records).map_err(|e| DetectionError::InvalidRequest(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image_proc::convolve2d::PresetKernel;
    use approx::assert_relative_eq;

    const CENTER_HOT: &str = r#"{
        "samples": [0, 0, 0, 0, 100, 0, 0, 0, 0],
        "width": 3,
        "height": 3,
        "nsd": 1.0
    }"#;

    #[test]
    fn test_defaults_fill_missing_fields() {
        let request = DetectRequest::from_json(r#"{"samples": [1, 2], "width": 2, "height": 1}"#)
            .unwrap();
        assert_eq!(request.filter, None);
        assert_eq!(request.std_dev_multiplier, 0.7);
        assert_eq!(request.max_blobs, 5);
        assert_eq!(request.scan_policy, ScanPolicy::Exhaustive);
        assert_eq!(request.config().unwrap(), DetectionConfig::default());
    }

    #[test]
    fn test_center_hot_request() {
        let records = DetectRequest::from_json(CENTER_HOT).unwrap().run().unwrap();
        assert_eq!(records.len(), 1);

        let (area, id, probability, x, y) = records[0].to_tuple();
        assert_eq!((area, id), (1, 1));
        assert_relative_eq!(x, 1.0);
        assert_relative_eq!(y, 1.0);
        let mean = 100.0 / 9.0;
        assert_relative_eq!(probability, (100.0 - mean) / (100.0 / 3.0), epsilon = 1e-10);
    }

    #[test]
    fn test_filter_argument_forms() {
        let mode: DetectRequest = serde_json::from_str(
            r#"{"samples": [1, 2, 3, 4], "width": 2, "height": 2, "filter": 2}"#,
        )
        .unwrap();
        assert_eq!(
            mode.config().unwrap().filter,
            FilterSpec::Preset(PresetKernel::Sharpen)
        );

        let matrix: DetectRequest = serde_json::from_str(
            r#"{"samples": [1, 2, 3, 4], "width": 2, "height": 2, "filter": [[0, 0, 0], [0, 1, 0], [0, 0, 0]]}"#,
        )
        .unwrap();
        assert!(matches!(
            matrix.config().unwrap().filter,
            FilterSpec::Custom(_)
        ));

        let unknown: DetectRequest = serde_json::from_str(
            r#"{"samples": [1, 2, 3, 4], "width": 2, "height": 2, "filter": 7}"#,
        )
        .unwrap();
        assert_eq!(
            unknown.config(),
            Err(DetectionError::UnknownFilterMode(7))
        );

        let even: DetectRequest = serde_json::from_str(
            r#"{"samples": [1, 2, 3, 4], "width": 2, "height": 2, "filter": [[1, 1], [1, 1]]}"#,
        )
        .unwrap();
        assert_eq!(
            even.config(),
            Err(DetectionError::InvalidKernel { rows: 2, cols: 2 })
        );
    }

    #[test]
    fn test_filter_spec_wire_round_trip() {
        let kernel = Kernel::from_rows(&[
            vec![0.0, 1.0, 0.0],
            vec![1.0, -4.0, 1.0],
            vec![0.0, 1.0, 0.0],
        ])
        .unwrap();
        let arg = FilterArg::from(FilterSpec::Custom(kernel.clone()));
        assert_eq!(
            arg,
            FilterArg::Matrix(vec![
                vec![0.0, 1.0, 0.0],
                vec![1.0, -4.0, 1.0],
                vec![0.0, 1.0, 0.0],
            ])
        );
        assert_eq!(FilterSpec::try_from(arg).unwrap(), FilterSpec::Custom(kernel));
        assert_eq!(FilterArg::from(FilterSpec::None), FilterArg::Mode(0));
    }

    #[test]
    fn test_malformed_requests() {
        assert!(matches!(
            DetectRequest::from_json("{not json"),
            Err(DetectionError::InvalidRequest(_))
        ));
        assert!(matches!(
            DetectRequest::from_json(r#"{"width": 2, "height": 1}"#),
            Err(DetectionError::InvalidRequest(_))
        ));

        let short = DetectRequest::from_json(r#"{"samples": [1, 2, 3], "width": 2, "height": 2}"#)
            .unwrap();
        assert!(matches!(
            short.run(),
            Err(DetectionError::SizeMismatch { expected: 4, actual: 3, .. })
        ));

        let no_room = DetectRequest::from_json(
            r#"{"samples": [1, 2], "width": 2, "height": 1, "max_blobs": 0}"#,
        )
        .unwrap();
        assert_eq!(no_room.run(), Err(DetectionError::InvalidCapacity(0)));
    }

    #[test]
    fn test_detect_json_output_shape() {
        let output = detect_json(CENTER_HOT).unwrap();
        let parsed: Vec<serde_json::Value> = serde_json::from_str(&output).unwrap();
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0]["area"], 1);
        assert_eq!(parsed[0]["id"], 1);
        assert_eq!(parsed[0]["centroid_x"], 1.0);
        assert_eq!(parsed[0]["centroid_y"], 1.0);
    }

    #[test]
    fn test_empty_result_is_empty_array() {
        let output = detect_json(
            r#"{"samples": [5, 5, 5, 5], "width": 2, "height": 2, "nsd": 1.0}"#,
        )
        .unwrap();
        assert_eq!(output, "[]");
    }
}
