//! Test helpers for blob-detect
//!
//! Synthetic thermal frames and logging setup shared by unit and integration
//! tests. Frames are returned as flat row-major sample vectors, the layout
//! the detector takes as input.

use ndarray::Array2;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal, Uniform};

/// Flat index of `(x, y)`; every frame built here is row-major, `x + y * width`.
fn flat_index(x: usize, y: usize, width: usize) -> usize {
    x + y * width
}

/// Initialize `env_logger` for tests.
///
/// Safe to call from every test; only the first call installs the logger.
/// Output is captured by the test harness unless `--nocapture` is given.
pub fn init_test_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Flat row-major frame from an ASCII-art style pattern.
///
/// # Returns
/// `(samples, width, height)`
///
/// # Panics
/// If the pattern is empty or ragged.
pub fn frame_from_pattern(pattern: &[&[i32]]) -> (Vec<f64>, usize, usize) {
    let height = pattern.len();
    assert!(height > 0, "pattern needs at least one row");
    let width = pattern[0].len();
    assert!(
        pattern.iter().all(|row| row.len() == width),
        "pattern rows must all have width {width}"
    );

    let samples = pattern
        .iter()
        .flat_map(|row| row.iter().map(|&v| v as f64))
        .collect();
    (samples, width, height)
}

/// Same as [`frame_from_pattern`] but as a `(height, width)` array.
pub fn array_from_pattern(pattern: &[&[i32]]) -> Array2<f64> {
    let (samples, width, height) = frame_from_pattern(pattern);
    Array2::from_shape_vec((height, width), samples).expect("pattern shape is consistent")
}

/// Frame with every sample set to `value`.
pub fn uniform_frame(width: usize, height: usize, value: f64) -> Vec<f64> {
    vec![value; width * height]
}

/// Flat background with single hot pixels at `(x, y, value)`.
pub fn hot_pixel_frame(
    width: usize,
    height: usize,
    background: f64,
    hot: &[(usize, usize, f64)],
) -> Vec<f64> {
    let mut samples = uniform_frame(width, height, background);
    for &(x, y, value) in hot {
        assert!(x < width && y < height, "hot pixel ({x}, {y}) out of frame");
        samples[flat_index(x, y, width)] = value;
    }
    samples
}

/// Add a circular Gaussian spot of the given peak and sigma centred on `(cx, cy)`.
pub fn add_gaussian_spot(
    samples: &mut [f64],
    width: usize,
    cx: f64,
    cy: f64,
    peak: f64,
    sigma: f64,
) {
    let two_sigma_sq = 2.0 * sigma * sigma;
    for (i, sample) in samples.iter_mut().enumerate() {
        let dx = (i % width) as f64 - cx;
        let dy = (i / width) as f64 - cy;
        *sample += peak * (-(dx * dx + dy * dy) / two_sigma_sq).exp();
    }
}

/// Add seeded uniform noise in `[-amplitude, amplitude)`.
///
/// The same seed always produces the same frame.
pub fn add_noise(samples: &mut [f64], amplitude: f64, seed: u64) {
    if amplitude <= 0.0 {
        return;
    }
    let mut rng = StdRng::seed_from_u64(seed);
    let dist = Uniform::new(-amplitude, amplitude);
    for sample in samples.iter_mut() {
        *sample += dist.sample(&mut rng);
    }
}

/// `(height, width)` array of seeded Gaussian noise with the given mean and sigma.
///
/// # Panics
/// If `std_dev` is negative or not finite.
pub fn normal_noise_array(size: (usize, usize), mean: f64, std_dev: f64, seed: u64) -> Array2<f64> {
    let mut rng = StdRng::seed_from_u64(seed);
    let normal_dist = Normal::new(mean, std_dev).expect("std_dev must be finite and >= 0");
    Array2::from_shape_fn(size, |_| normal_dist.sample(&mut rng))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pattern_is_row_major() {
        let (samples, width, height) = frame_from_pattern(&[&[1, 2, 3], &[4, 5, 6]]);
        assert_eq!((width, height), (3, 2));
        assert_eq!(samples, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);

        let array = array_from_pattern(&[&[1, 2, 3], &[4, 5, 6]]);
        assert_eq!(array[[1, 0]], 4.0);
    }

    #[test]
    #[should_panic(expected = "pattern rows")]
    fn test_ragged_pattern_panics() {
        frame_from_pattern(&[&[1, 2], &[3]]);
    }

    #[test]
    fn test_hot_pixels_are_placed() {
        let samples = hot_pixel_frame(4, 3, 1.0, &[(3, 2, 9.0), (0, 1, 7.0)]);
        assert_eq!(samples[flat_index(3, 2, 4)], 9.0);
        assert_eq!(samples[11], 9.0);
        assert_eq!(samples[4], 7.0);
        assert_eq!(samples.iter().filter(|&&v| v == 1.0).count(), 10);
    }

    #[test]
    fn test_gaussian_peak_is_at_centre() {
        let mut samples = uniform_frame(9, 9, 0.0);
        add_gaussian_spot(&mut samples, 9, 4.0, 4.0, 50.0, 1.0);
        let (peak_index, _) = samples
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .unwrap();
        assert_eq!(peak_index, 4 + 4 * 9);
        assert_eq!(samples[peak_index], 50.0);
    }

    #[test]
    fn test_noise_is_bounded_and_reproducible() {
        let mut a = uniform_frame(8, 8, 10.0);
        let mut b = uniform_frame(8, 8, 10.0);
        add_noise(&mut a, 0.5, 42);
        add_noise(&mut b, 0.5, 42);
        assert_eq!(a, b);
        assert!(a.iter().all(|&v| (9.5..10.5).contains(&v)));

        let mut c = uniform_frame(8, 8, 10.0);
        add_noise(&mut c, 0.5, 43);
        assert_ne!(a, c);
        init_test_logging();
        init_test_logging();
    }

    #[test]
    fn test_normal_noise_array_is_seeded() {
        let a = normal_noise_array((16, 12), 5.0, 2.0, 9);
        let b = normal_noise_array((16, 12), 5.0, 2.0, 9);
        assert_eq!(a.dim(), (16, 12));
        assert_eq!(a, b);

        let mean = a.sum() / a.len() as f64;
        assert!((mean - 5.0).abs() < 1.0, "mean {mean}");
    }
}
