//! Thermal blob detection for small single-channel sensor frames.
//!
//! Given a frame of numeric samples, [`detect`] optionally smooths or
//! sharpens it with a small convolution kernel, marks every pixel that
//! stands out from the frame statistics, groups marked pixels into
//! 4-connected blobs and returns the largest ones with their area,
//! centroid and mean z-score.
//!
//! ```rust
//! use blob_detect::{detect, FilterSpec};
//!
//! let mut frame = [0u16; 9];
//! frame[4] = 100;
//! let blobs = detect(&frame, 3, 3, FilterSpec::None, 1.0, 5).unwrap();
//! assert_eq!(blobs.len(), 1);
//! assert_eq!(blobs.get(0).unwrap().area, 1);
//! ```
//!
//! Every call is self-contained: all buffers are owned by the call and
//! released on return, so independent calls may run on separate threads.

pub mod adapter;
pub mod algo;
pub mod error;
pub mod image_proc;

pub use adapter::{detect_json, BlobRecord, DetectRequest, FilterArg};
pub use error::DetectionError;
pub use image_proc::convolve2d::{convolve2d, spatial_filter, FilterSpec, Kernel, PresetKernel};
pub use image_proc::detection::{
    detect, detect_blobs, detect_report, Blob, BlobDetection, BlobList, DetectionConfig,
    ScanPolicy,
};
pub use image_proc::grid::Grid;
