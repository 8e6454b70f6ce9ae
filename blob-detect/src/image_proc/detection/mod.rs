//! Blob detection on single sensor frames.
//!
//! Detection runs in three stages, each usable on its own:
//!
//! - **thresholding**: frame statistics, threshold mask and per-pixel z-scores
//! - **labeling**: 4-connected flood fill of the mask into blobs
//! - **blob**: blob records and the capacity-bounded, area-sorted result list
//!
//! **unified** chains the stages (with an optional pre-filter) behind one call,
//! configured by **config**.

pub mod blob;
pub mod config;
pub mod labeling;
pub mod thresholding;
pub mod unified;

pub use blob::{Blob, BlobList, Insertion};
pub use config::{DetectionConfig, DEFAULT_MAX_BLOBS, DEFAULT_STD_DEV_MULTIPLIER};
pub use labeling::{count_label, label_blobs, ScanPolicy};
pub use thresholding::{apply_threshold, PixelState, ThresholdMap};
pub use unified::{detect, detect_blobs, detect_report, BlobDetection};
