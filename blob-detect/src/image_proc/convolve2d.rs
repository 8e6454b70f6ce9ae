//! 2D convolution with mean-padded borders.
//!
//! Pixels outside the frame are replaced by the frame's global mean, so a
//! filtered border does not pick up an artificial step against zero. The
//! kernel is applied as a correlation (not flipped): kernel row `ky` and
//! column `kx` weight the sample at `(x + kx - r, y + ky - r)`.
//!
//! Each kernel carries its own normalization policy:
//! - preset kernels divide the weighted sum by the number of non-zero weights
//! - caller-supplied kernels return the raw weighted sum

use ndarray::{s, Array2, Zip};
use serde::{Deserialize, Serialize};

use crate::adapter::FilterArg;
use crate::algo::stats::mean;
use crate::error::DetectionError;
use crate::image_proc::grid::{try_filled_array, Grid};

/// How a kernel's weighted sum is scaled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Normalization {
    /// Divide by the count of non-zero kernel weights
    NonZeroWeights,
    /// Use the weighted sum as is
    Raw,
}

/// Square, odd-sized convolution kernel.
#[derive(Debug, Clone, PartialEq)]
pub struct Kernel {
    weights: Array2<f64>,
    normalization: Normalization,
}

impl Kernel {
    /// Validate and wrap a weight matrix.
    ///
    /// # Errors
    /// [`DetectionError::InvalidKernel`] unless the matrix is square with an
    /// odd side of at least 1.
    pub fn new(weights: Array2<f64>, normalization: Normalization) -> Result<Self, DetectionError> {
        let (rows, cols) = weights.dim();
        if rows != cols || rows % 2 == 0 {
            return Err(DetectionError::InvalidKernel { rows, cols });
        }
        Ok(Self {
            weights,
            normalization,
        })
    }

    /// Caller-supplied kernel; the weighted sum is not normalized.
    pub fn custom(weights: Array2<f64>) -> Result<Self, DetectionError> {
        Self::new(weights, Normalization::Raw)
    }

    /// Caller-supplied kernel given as nested rows.
    ///
    /// # Errors
    /// [`DetectionError::InvalidKernel`] for ragged, empty, non-square or
    /// even-sized input.
    pub fn from_rows(rows: &[Vec<f64>]) -> Result<Self, DetectionError> {
        let n_rows = rows.len();
        let n_cols = rows.first().map_or(0, Vec::len);
        if rows.iter().any(|row| row.len() != n_cols) {
            let widest = rows.iter().map(Vec::len).max().unwrap_or(0);
            return Err(DetectionError::InvalidKernel {
                rows: n_rows,
                cols: widest,
            });
        }
        let flat: Vec<f64> = rows.iter().flatten().copied().collect();
        let weights = Array2::from_shape_vec((n_rows, n_cols), flat).map_err(|_| {
            DetectionError::InvalidKernel {
                rows: n_rows,
                cols: n_cols,
            }
        })?;
        Self::custom(weights)
    }

    /// 3×3 all-ones smoothing kernel.
    pub fn box_blur() -> Self {
        Self {
            weights: Array2::ones((3, 3)),
            normalization: Normalization::NonZeroWeights,
        }
    }

    /// 3×3 sharpening kernel: centre 5, edge neighbours -1, corners 0.
    pub fn sharpen() -> Self {
        Self {
            weights: ndarray::arr2(&[[0.0, -1.0, 0.0], [-1.0, 5.0, -1.0], [0.0, -1.0, 0.0]]),
            normalization: Normalization::NonZeroWeights,
        }
    }

    /// Side length `K`.
    pub fn size(&self) -> usize {
        self.weights.nrows()
    }

    /// Padding radius `(K - 1) / 2`.
    pub fn radius(&self) -> usize {
        (self.size() - 1) / 2
    }

    /// Weight matrix, row = vertical offset.
    pub fn weights(&self) -> &Array2<f64> {
        &self.weights
    }

    /// Normalization policy of this kernel.
    pub fn normalization(&self) -> Normalization {
        self.normalization
    }

    /// Value the weighted sum is divided by.
    pub fn divisor(&self) -> f64 {
        match self.normalization {
            Normalization::Raw => 1.0,
            Normalization::NonZeroWeights => {
                let nonzero = self.weights.iter().filter(|&&w| w != 0.0).count();
                if nonzero == 0 {
                    1.0
                } else {
                    nonzero as f64
                }
            }
        }
    }
}

/// Built-in kernels selectable by integer mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresetKernel {
    /// Mode 1: 3×3 box smoothing
    Box,
    /// Mode 2: 3×3 sharpening
    Sharpen,
}

impl PresetKernel {
    /// Integer mode used by the host interface.
    pub fn mode(&self) -> i64 {
        match self {
            PresetKernel::Box => 1,
            PresetKernel::Sharpen => 2,
        }
    }

    /// Materialize the preset's kernel.
    pub fn kernel(&self) -> Kernel {
        match self {
            PresetKernel::Box => Kernel::box_blur(),
            PresetKernel::Sharpen => Kernel::sharpen(),
        }
    }
}

/// Optional pre-filter applied before thresholding.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(try_from = "FilterArg", into = "FilterArg")]
pub enum FilterSpec {
    /// Skip filtering
    #[default]
    None,
    /// One of the built-in kernels
    Preset(PresetKernel),
    /// Caller-supplied kernel
    Custom(Kernel),
}

impl FilterSpec {
    /// Map a host filter mode: 0 = none, 1 = box, 2 = sharpen.
    ///
    /// # Errors
    /// [`DetectionError::UnknownFilterMode`] for any other value.
    pub fn from_mode(mode: i64) -> Result<Self, DetectionError> {
        match mode {
            0 => Ok(FilterSpec::None),
            1 => Ok(FilterSpec::Preset(PresetKernel::Box)),
            2 => Ok(FilterSpec::Preset(PresetKernel::Sharpen)),
            other => Err(DetectionError::UnknownFilterMode(other)),
        }
    }

    /// Kernel to apply, or `None` when filtering is skipped.
    pub fn kernel(&self) -> Option<Kernel> {
        match self {
            FilterSpec::None => None,
            FilterSpec::Preset(preset) => Some(preset.kernel()),
            FilterSpec::Custom(kernel) => Some(kernel.clone()),
        }
    }
}

/// Convolve `grid` with `kernel`, padding the borders with the grid mean.
///
/// Returns a new grid with the same dimensions. The padded working copy is
/// dropped before returning.
///
/// # Errors
/// [`DetectionError::Allocation`] if the padded copy or the output cannot be
/// reserved.
///
/// # Performance
/// O(W·H·K²)
pub fn convolve2d(grid: &Grid, kernel: &Kernel) -> Result<Grid, DetectionError> {
    let (width, height) = (grid.width(), grid.height());
    let r = kernel.radius();
    let k = kernel.size();
    let fill = mean(&grid.view());

    let mut padded = try_filled_array(width + 2 * r, height + 2 * r, fill, "padded frame")?;
    padded
        .slice_mut(s![r..r + height, r..r + width])
        .assign(&grid.view());

    let mut output = try_filled_array(width, height, 0.0, "filtered frame")?;
    let weights = kernel.weights();
    let divisor = kernel.divisor();

    Zip::from(&mut output)
        .and(padded.windows((k, k)))
        .for_each(|out, window| {
            let sum: f64 = window
                .iter()
                .zip(weights.iter())
                .map(|(&v, &w)| v * w)
                .sum();
            *out = sum / divisor;
        });

    log::trace!(
        "convolve2d: {}x{} frame, {}x{} kernel, pad value {:.3}, divisor {}",
        width,
        height,
        k,
        k,
        fill,
        divisor
    );

    Grid::from_array(output)
}

/// Apply a filter spec; `FilterSpec::None` returns an unmodified copy.
pub fn spatial_filter(grid: &Grid, filter: &FilterSpec) -> Result<Grid, DetectionError> {
    match filter.kernel() {
        Some(kernel) => convolve2d(grid, &kernel),
        None => Ok(grid.clone()),
    }
}
