//! 4-connected flood-fill labeling of thresholded pixels.
//!
//! The mask is scanned row by row (y outer, x inner). Each `Candidate` pixel
//! found by the scan seeds a new blob that is grown through its edge-sharing
//! neighbours using a [`BoundedStack`] frontier. A pixel is relabeled the
//! moment it is pushed, so no pixel enters the frontier twice and a frontier
//! sized to the pixel count can never overflow.
//!
//! # Connectivity
//! Only horizontal and vertical neighbours are connected. Pixels that touch
//! at a corner belong to different blobs.

use ndarray::{Array2, ArrayView2};
use serde::{Deserialize, Serialize};

use super::blob::{Blob, BlobList, Insertion};
use super::thresholding::PixelState;
use crate::algo::bounded_stack::BoundedStack;
use crate::error::DetectionError;
use crate::image_proc::grid::Position;

/// Neighbour offsets visited around each frontier pixel, in this order.
const NEIGHBOR_OFFSETS: [(isize, isize); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];

/// When the raster scan ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanPolicy {
    /// Label every candidate; the list keeps the largest `max_blobs` blobs
    #[default]
    Exhaustive,
    /// Stop once `max_blobs` ids have been handed out; the list keeps the
    /// first blobs found and later candidates stay unlabeled
    StopAtCapacity,
}

/// Partition all candidate pixels of `mask` into blobs.
///
/// Candidates are relabeled in place to `Labeled(id)`, ids starting at 1 in
/// discovery order. The returned list holds at most `max_blobs` blobs,
/// largest first.
///
/// # Errors
/// - [`DetectionError::SizeMismatch`] if `z_scores` and `mask` differ in shape
/// - [`DetectionError::InvalidCapacity`] if `max_blobs` is 0
/// - [`DetectionError::Allocation`] if the frontier cannot be reserved
/// - [`DetectionError::Frontier`] if the frontier overflows (internal error)
pub fn label_blobs(
    mask: &mut Array2<PixelState>,
    z_scores: &ArrayView2<f64>,
    max_blobs: usize,
    policy: ScanPolicy,
) -> Result<BlobList, DetectionError> {
    let (height, width) = mask.dim();
    if z_scores.dim() != mask.dim() {
        return Err(DetectionError::SizeMismatch {
            width,
            height,
            expected: mask.len(),
            actual: z_scores.len(),
        });
    }

    let mut blobs = BlobList::new(max_blobs)?;
    let pixel_count = mask.len();
    let mut frontier =
        BoundedStack::new(pixel_count).map_err(|_| DetectionError::Allocation {
            buffer: "flood-fill frontier",
            requested: pixel_count,
        })?;

    let mut next_id = 1;
    'scan: for y in 0..height {
        for x in 0..width {
            if mask[[y, x]] != PixelState::Candidate {
                continue;
            }
            if policy == ScanPolicy::StopAtCapacity && next_id > max_blobs {
                log::trace!("Label budget of {max_blobs} exhausted at ({x}, {y})");
                break 'scan;
            }

            let blob = flood_fill(mask, z_scores, Position::new(x, y), next_id, &mut frontier)?;
            next_id += 1;

            match blobs.insert(blob) {
                Insertion::Rejected => {
                    log::trace!("Blob {} (area {}) below list cutoff", blob.id, blob.area)
                }
                Insertion::Evicted { evicted, .. } => log::trace!(
                    "Blob {} (area {}) evicted blob {} (area {})",
                    blob.id,
                    blob.area,
                    evicted.id,
                    evicted.area
                ),
                Insertion::Inserted { .. } => {}
            }
        }
    }

    Ok(blobs)
}

/// Grow one blob from `seed`, relabeling its pixels with `id`.
fn flood_fill(
    mask: &mut Array2<PixelState>,
    z_scores: &ArrayView2<f64>,
    seed: Position,
    id: usize,
    frontier: &mut BoundedStack<Position>,
) -> Result<Blob, DetectionError> {
    let (height, width) = mask.dim();
    debug_assert!(frontier.is_empty(), "frontier must start empty");

    frontier.push(seed)?;
    mask[[seed.y, seed.x]] = PixelState::Labeled(id);

    let mut area = 1usize;
    let mut sum_x = seed.x as f64;
    let mut sum_y = seed.y as f64;
    let mut sum_z = z_scores[[seed.y, seed.x]];

    while let Ok(pixel) = frontier.pop() {
        for (dx, dy) in NEIGHBOR_OFFSETS {
            let Some(next) = pixel.offset(dx, dy, width, height) else {
                continue;
            };
            if mask[[next.y, next.x]] != PixelState::Candidate {
                continue;
            }

            frontier.push(next)?;
            mask[[next.y, next.x]] = PixelState::Labeled(id);
            area += 1;
            sum_x += next.x as f64;
            sum_y += next.y as f64;
            sum_z += z_scores[[next.y, next.x]];
        }
    }

    let n = area as f64;
    Ok(Blob {
        area,
        id,
        probability: sum_z / n,
        x: sum_x / n,
        y: sum_y / n,
    })
}

/// Number of pixels carrying label `id`.
pub fn count_label(mask: &ArrayView2<PixelState>, id: usize) -> usize {
    mask.iter()
        .filter(|&&state| state == PixelState::Labeled(id))
        .count()
}
