//! Frame containers, spatial filtering and blob detection.

pub mod convolve2d;
pub mod detection;
pub mod grid;

pub use convolve2d::{convolve2d, spatial_filter, FilterSpec, Kernel, Normalization, PresetKernel};
pub use grid::{pixel_index, Grid, Position};
