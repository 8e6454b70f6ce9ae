//! Blob records and the capacity-bounded, area-sorted result list.

use serde::{Deserialize, Serialize};

use crate::error::DetectionError;

/// One connected region of above-threshold pixels.
///
/// Centroid coordinates follow the frame convention: `x` is the column
/// (horizontal) coordinate and `y` the row coordinate, both averaged over
/// the member pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Blob {
    /// Number of member pixels (always > 0)
    pub area: usize,
    /// Label assigned during flood fill, unique within one detection call
    pub id: usize,
    /// Mean z-score of the member pixels
    pub probability: f64,
    /// Mean column coordinate of the member pixels
    #[serde(rename = "centroid_x")]
    pub x: f64,
    /// Mean row coordinate of the member pixels
    #[serde(rename = "centroid_y")]
    pub y: f64,
}

impl Blob {
    /// Legacy host layout: `(area, id, probability, x, y)`.
    pub fn to_tuple(&self) -> (usize, usize, f64, f64, f64) {
        (self.area, self.id, self.probability, self.x, self.y)
    }

    /// Centroid relative to the frame centre `(width / 2, height / 2)`.
    ///
    /// Negative `x` is left of centre, negative `y` above it.
    pub fn offset_from_center(&self, width: usize, height: usize) -> (f64, f64) {
        (
            self.x - width as f64 / 2.0,
            self.y - height as f64 / 2.0,
        )
    }
}

/// What [`BlobList::insert`] did with a blob.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Insertion {
    /// Stored at this rank; nothing was dropped
    Inserted {
        /// Position in the list after insertion
        rank: usize,
    },
    /// Stored at this rank; the previously smallest entry was dropped
    Evicted {
        /// Position in the list after insertion
        rank: usize,
        /// Entry that no longer fits
        evicted: Blob,
    },
    /// List is full and the blob is not larger than the smallest entry
    Rejected,
}

/// Blobs sorted by area, largest first, holding at most `capacity` entries.
///
/// A new blob is placed at the first position whose area is not greater than
/// its own, so among equal areas the most recently found blob ranks first.
/// Once full, a new blob is kept only if it is strictly larger than the
/// smallest stored blob, which is then evicted.
#[derive(Debug, Clone, PartialEq)]
pub struct BlobList {
    blobs: Vec<Blob>,
    capacity: usize,
}

impl BlobList {
    /// Create an empty list.
    ///
    /// # Errors
    /// - [`DetectionError::InvalidCapacity`] if `capacity` is 0
    /// - [`DetectionError::Allocation`] if storage cannot be reserved
    pub fn new(capacity: usize) -> Result<Self, DetectionError> {
        if capacity == 0 {
            return Err(DetectionError::InvalidCapacity(capacity));
        }
        let mut blobs = Vec::new();
        blobs
            .try_reserve_exact(capacity)
            .map_err(|_| DetectionError::Allocation {
                buffer: "blob list",
                requested: capacity,
            })?;
        Ok(Self { blobs, capacity })
    }

    /// Insert a finished blob according to the ordering and capacity policy.
    pub fn insert(&mut self, blob: Blob) -> Insertion {
        let mut evicted = None;
        if self.is_full() {
            match self.blobs.last() {
                Some(smallest) if blob.area > smallest.area => {
                    evicted = self.blobs.pop();
                }
                _ => return Insertion::Rejected,
            }
        }

        let rank = self.blobs.partition_point(|b| b.area > blob.area);
        self.blobs.insert(rank, blob);

        match evicted {
            Some(evicted) => Insertion::Evicted { rank, evicted },
            None => Insertion::Inserted { rank },
        }
    }

    /// Largest blob if it has at least `min_area` pixels and a probability of
    /// at least `min_probability`.
    pub fn best(&self, min_area: usize, min_probability: f64) -> Option<&Blob> {
        self.blobs
            .first()
            .filter(|b| b.area >= min_area && b.probability >= min_probability)
    }

    /// Number of stored blobs.
    pub fn len(&self) -> usize {
        self.blobs.len()
    }

    /// True if no blob is stored.
    pub fn is_empty(&self) -> bool {
        self.blobs.is_empty()
    }

    /// Maximum number of stored blobs.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// True once `capacity` blobs are stored.
    pub fn is_full(&self) -> bool {
        self.blobs.len() >= self.capacity
    }

    /// Sum of the stored areas.
    pub fn total_area(&self) -> usize {
        self.blobs.iter().map(|b| b.area).sum()
    }

    /// Blob at `rank`, 0 being the largest.
    pub fn get(&self, rank: usize) -> Option<&Blob> {
        self.blobs.get(rank)
    }

    /// Stored blobs, largest first.
    pub fn as_slice(&self) -> &[Blob] {
        &self.blobs
    }

    /// Iterate largest first.
    pub fn iter(&self) -> std::slice::Iter<'_, Blob> {
        self.blobs.iter()
    }

    /// Consume the list, returning blobs largest first.
    pub fn into_vec(self) -> Vec<Blob> {
        self.blobs
    }
}

impl IntoIterator for BlobList {
    type Item = Blob;
    type IntoIter = std::vec::IntoIter<Blob>;

    fn into_iter(self) -> Self::IntoIter {
        self.blobs.into_iter()
    }
}

impl<'a> IntoIterator for &'a BlobList {
    type Item = &'a Blob;
    type IntoIter = std::slice::Iter<'a, Blob>;

    fn into_iter(self) -> Self::IntoIter {
        self.blobs.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blob(id: usize, area: usize) -> Blob {
        Blob {
            area,
            id,
            probability: 1.0,
            x: 0.0,
            y: 0.0,
        }
    }

    fn ids(list: &BlobList) -> Vec<usize> {
        list.iter().map(|b| b.id).collect()
    }

    #[test]
    fn test_sorted_by_area_descending() {
        let mut list = BlobList::new(5).unwrap();
        list.insert(blob(1, 3));
        list.insert(blob(2, 7));
        list.insert(blob(3, 1));
        list.insert(blob(4, 5));

        assert_eq!(ids(&list), vec![2, 4, 1, 3]);
        assert_eq!(list.total_area(), 16);
    }

    #[test]
    fn test_ties_insert_ahead_of_equal_areas() {
        let mut list = BlobList::new(5).unwrap();
        assert_eq!(list.insert(blob(1, 2)), Insertion::Inserted { rank: 0 });
        assert_eq!(list.insert(blob(2, 2)), Insertion::Inserted { rank: 0 });
        assert_eq!(list.insert(blob(3, 4)), Insertion::Inserted { rank: 0 });
        assert_eq!(list.insert(blob(4, 2)), Insertion::Inserted { rank: 1 });

        assert_eq!(ids(&list), vec![3, 4, 2, 1]);
    }

    #[test]
    fn test_full_list_rejects_blob_not_larger_than_smallest() {
        let mut list = BlobList::new(2).unwrap();
        list.insert(blob(1, 4));
        list.insert(blob(2, 3));
        assert!(list.is_full());

        assert_eq!(list.insert(blob(3, 3)), Insertion::Rejected);
        assert_eq!(list.insert(blob(4, 1)), Insertion::Rejected);
        assert_eq!(ids(&list), vec![1, 2]);
    }

    #[test]
    fn test_full_list_evicts_smallest() {
        let mut list = BlobList::new(2).unwrap();
        list.insert(blob(1, 4));
        list.insert(blob(2, 3));

        assert_eq!(
            list.insert(blob(3, 9)),
            Insertion::Evicted {
                rank: 0,
                evicted: blob(2, 3)
            }
        );
        assert_eq!(ids(&list), vec![3, 1]);

        assert_eq!(
            list.insert(blob(4, 5)),
            Insertion::Evicted {
                rank: 1,
                evicted: blob(1, 4)
            }
        );
        assert_eq!(ids(&list), vec![3, 4]);
        assert_eq!(list.len(), 2);
    }

    #[test]
    fn test_zero_capacity_is_rejected() {
        assert_eq!(BlobList::new(0), Err(DetectionError::InvalidCapacity(0)));
    }

    #[test]
    fn test_best_applies_both_criteria() {
        let mut list = BlobList::new(3).unwrap();
        assert!(list.best(1, 0.0).is_none());

        list.insert(Blob {
            area: 4,
            id: 1,
            probability: 1.8,
            x: 2.0,
            y: 3.0,
        });
        list.insert(blob(2, 2));

        assert_eq!(list.best(4, 1.5).map(|b| b.id), Some(1));
        assert!(list.best(5, 1.5).is_none());
        assert!(list.best(4, 2.0).is_none());
    }

    #[test]
    fn test_offset_and_tuple() {
        let b = Blob {
            area: 3,
            id: 2,
            probability: 2.5,
            x: 1.0,
            y: 6.5,
        };
        assert_eq!(b.offset_from_center(8, 8), (-3.0, 2.5));
        assert_eq!(b.to_tuple(), (3, 2, 2.5, 1.0, 6.5));
    }
}
