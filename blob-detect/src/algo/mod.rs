//! Generic building blocks used by the detection pipeline.
//!
//! - **bounded_stack**: fixed-capacity LIFO used as flood-fill frontier
//! - **stats**: mean and sample standard deviation over a frame

pub mod bounded_stack;
pub mod stats;

pub use bounded_stack::{BoundedStack, StackError};
pub use stats::{mean, sample_statistics, SampleStatistics};
