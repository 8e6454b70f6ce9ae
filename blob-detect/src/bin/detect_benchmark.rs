use std::time::{Duration, Instant};

use blob_detect::image_proc::pixel_index;
use blob_detect::{detect_blobs, detect_json, DetectionConfig, FilterSpec, Grid};
use clap::Parser;

/// Command line arguments for the detection benchmark
#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Time blob detection on synthetic thermal frames"
)]
struct Args {
    /// Frame width in pixels
    #[arg(long, default_value_t = 32)]
    width: usize,

    /// Frame height in pixels
    #[arg(long, default_value_t = 24)]
    height: usize,

    /// Number of synthetic hot spots
    #[arg(long, default_value_t = 3)]
    spots: usize,

    /// Filter mode (0 = none, 1 = box, 2 = sharpen)
    #[arg(short, long, default_value_t = 0)]
    filter: i64,

    /// Threshold in standard deviations above the mean
    #[arg(long, default_value_t = 0.7, allow_hyphen_values = true)]
    nsd: f64,

    /// Maximum number of blobs reported
    #[arg(long, default_value_t = 5)]
    max_blobs: usize,

    /// Timed iterations
    #[arg(short, long, default_value_t = 10000)]
    iterations: usize,

    /// Run a JSON request file once and print the result instead of benchmarking
    #[arg(long)]
    request: Option<std::path::PathBuf>,
}

/// Background at 20 with Gaussian hot spots spread along the frame diagonal.
fn synthetic_frame(width: usize, height: usize, spots: usize) -> Vec<f64> {
    let mut samples = vec![20.0; width * height];
    let sigma = 1.2;
    for spot in 0..spots {
        let t = (spot + 1) as f64 / (spots + 1) as f64;
        let cx = t * width as f64;
        let cy = t * height as f64;
        let peak = 15.0 + 5.0 * spot as f64;
        for y in 0..height {
            for x in 0..width {
                let dx = x as f64 - cx;
                let dy = y as f64 - cy;
                samples[pixel_index(x, y, width)] += peak * (-(dx * dx + dy * dy) / (2.0 * sigma * sigma)).exp();
            }
        }
    }
    samples
}

fn micros(d: Duration) -> f64 {
    d.as_nanos() as f64 / 1000.0
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args = Args::parse();

    if let Some(path) = &args.request {
        let text = std::fs::read_to_string(path)?;
        println!("{}", detect_json(&text)?);
        return Ok(());
    }

    let config = DetectionConfig::default()
        .with_filter(FilterSpec::from_mode(args.filter)?)
        .with_std_dev_multiplier(args.nsd)
        .with_max_blobs(args.max_blobs);
    config.validate()?;
    if args.iterations == 0 {
        return Err("iterations must be at least 1".into());
    }

    let samples = synthetic_frame(args.width, args.height, args.spots);
    let grid = Grid::from_samples(&samples, args.width, args.height)?;

    // Warmup iterations
    println!("Warming up...");
    let blobs = detect_blobs(&grid, &config)?;
    for _ in 0..100 {
        let _ = detect_blobs(&grid, &config)?;
    }

    println!("Running {} iterations...", args.iterations);
    let mut timings = Vec::with_capacity(args.iterations);
    for _ in 0..args.iterations {
        let start = Instant::now();
        let _result = detect_blobs(&grid, &config)?;
        timings.push(start.elapsed());
    }

    timings.sort();
    let n = timings.len();
    let total_nanos: u128 = timings.iter().map(|d| d.as_nanos()).sum();
    let mean_us = total_nanos as f64 / n as f64 / 1000.0;
    let median_us = micros(timings[n / 2]);
    let p99_us = micros(timings[((n as f64 * 0.99) as usize).min(n - 1)]);
    let pixels = (args.width * args.height) as f64;

    println!("\n========== BLOB DETECTION BENCHMARK ==========");
    println!("Configuration:");
    println!("  Frame: {}x{} pixels", args.width, args.height);
    println!("  Filter: {:?}", config.filter);
    println!("  nsd: {:.2}", config.std_dev_multiplier);
    println!("  Max blobs: {}", config.max_blobs);
    println!("  Iterations: {}", n);
    println!("\nTiming Results:");
    println!("  Mean:   {mean_us:.2} µs ({:.2} ns/pixel)", mean_us * 1000.0 / pixels);
    println!("  Median: {median_us:.2} µs");
    println!("  P99:    {p99_us:.2} µs");
    println!("  Min:    {:.2} µs", micros(timings[0]));
    println!("  Max:    {:.2} µs", micros(timings[n - 1]));
    println!("\nBlobs ({}):", blobs.len());
    for b in &blobs {
        println!(
            "  id={:<3} area={:<4} centroid=({:.2}, {:.2}) probability={:.3}",
            b.id, b.area, b.x, b.y, b.probability
        );
    }

    Ok(())
}
