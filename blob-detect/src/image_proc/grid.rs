//! Sensor frame container and the pixel addressing convention.
//!
//! A frame of `width × height` samples is stored row-major: the sample at
//! column `x`, row `y` lives at flat index `x + y * width`. Internally the
//! frame is an `Array2<f64>` of shape `(height, width)` in standard layout,
//! so `grid[[y, x]]` and `pixel_index(x, y, width)` address the same sample.

use ndarray::{Array2, ArrayView2};

use crate::error::DetectionError;

/// Flat index of pixel `(x, y)` in a row-major frame of the given width.
#[inline]
pub fn pixel_index(x: usize, y: usize, width: usize) -> usize {
    x + y * width
}

/// Integer pixel coordinate; `x` is the column, `y` the row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Position {
    /// Column index
    pub x: usize,
    /// Row index
    pub y: usize,
}

impl Position {
    /// Create a position from column and row.
    pub fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }

    /// Position shifted by `(dx, dy)` if it stays inside a `width × height` frame.
    pub fn offset(&self, dx: isize, dy: isize, width: usize, height: usize) -> Option<Position> {
        let x = self.x.checked_add_signed(dx)?;
        let y = self.y.checked_add_signed(dy)?;
        (x < width && y < height).then_some(Position { x, y })
    }
}

/// Reserve exactly `len` elements and fill them with `value`.
///
/// Every per-call buffer goes through here so that an allocation failure is
/// reported instead of aborting.
pub(crate) fn try_filled_vec<T: Clone>(
    len: usize,
    value: T,
    buffer: &'static str,
) -> Result<Vec<T>, DetectionError> {
    let mut data = Vec::new();
    data.try_reserve_exact(len)
        .map_err(|_| DetectionError::Allocation {
            buffer,
            requested: len,
        })?;
    data.resize(len, value);
    Ok(data)
}

/// Reserve a `(height, width)` array filled with `value`.
pub(crate) fn try_filled_array<T: Clone>(
    width: usize,
    height: usize,
    value: T,
    buffer: &'static str,
) -> Result<Array2<T>, DetectionError> {
    let data = try_filled_vec(width * height, value, buffer)?;
    Array2::from_shape_vec((height, width), data).map_err(|_| DetectionError::SizeMismatch {
        width,
        height,
        expected: width * height,
        actual: width * height,
    })
}

/// A single-channel numeric frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    data: Array2<f64>,
}

impl Grid {
    /// Build a frame from a flat row-major sample sequence.
    ///
    /// # Errors
    /// - [`DetectionError::EmptyGrid`] if either dimension is zero
    /// - [`DetectionError::FrameTooLarge`] if `width * height` overflows `usize`
    /// - [`DetectionError::SizeMismatch`] if `samples.len() != width * height`
    /// - [`DetectionError::Allocation`] if the frame buffer cannot be reserved
    pub fn from_samples<T>(samples: &[T], width: usize, height: usize) -> Result<Self, DetectionError>
    where
        T: Copy + Into<f64>,
    {
        if width == 0 || height == 0 {
            return Err(DetectionError::EmptyGrid { width, height });
        }
        let expected = width
            .checked_mul(height)
            .ok_or(DetectionError::FrameTooLarge { width, height })?;
        if samples.len() != expected {
            return Err(DetectionError::SizeMismatch {
                width,
                height,
                expected,
                actual: samples.len(),
            });
        }

        let mut data = try_filled_array(width, height, 0.0, "frame")?;
        for (dst, &src) in data.iter_mut().zip(samples) {
            *dst = src.into();
        }
        Ok(Self { data })
    }

    /// Wrap an existing `(height, width)` array.
    ///
    /// # Errors
    /// [`DetectionError::EmptyGrid`] if the array has a zero dimension.
    pub fn from_array(data: Array2<f64>) -> Result<Self, DetectionError> {
        let (height, width) = data.dim();
        if width == 0 || height == 0 {
            return Err(DetectionError::EmptyGrid { width, height });
        }
        let data = if data.is_standard_layout() {
            data
        } else {
            data.as_standard_layout().into_owned()
        };
        Ok(Self { data })
    }

    /// Frame width (number of columns).
    pub fn width(&self) -> usize {
        self.data.ncols()
    }

    /// Frame height (number of rows).
    pub fn height(&self) -> usize {
        self.data.nrows()
    }

    /// Total number of samples.
    pub fn pixel_count(&self) -> usize {
        self.data.len()
    }

    /// Flat index of `(x, y)` in this frame.
    #[inline]
    pub fn index(&self, x: usize, y: usize) -> usize {
        pixel_index(x, y, self.width())
    }

    /// Sample at column `x`, row `y`.
    pub fn get(&self, x: usize, y: usize) -> Option<f64> {
        self.data.get([y, x]).copied()
    }

    /// Samples in row-major order.
    pub fn as_slice(&self) -> &[f64] {
        // from_samples and from_array both guarantee standard layout
        self.data
            .as_slice()
            .unwrap_or_default()
    }

    /// Borrow the frame as an `(height, width)` view.
    pub fn view(&self) -> ArrayView2<'_, f64> {
        self.data.view()
    }

    /// Consume the frame and return the underlying array.
    pub fn into_array(self) -> Array2<f64> {
        self.data
    }
}
