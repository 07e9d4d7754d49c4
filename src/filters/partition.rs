//! Row partitioning for fork-join execution.
//!
//! The row dimension is cut into contiguous, disjoint blocks, one per
//! worker. Block sizes may differ by one row; only coverage matters.

use std::ops::Range;

use crate::error::{FilterError, Result};

/// Half-open block of rows `[start, end)` owned by a single worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Partition {
    pub start: usize,
    pub end: usize,
}

impl Partition {
    pub fn rows(&self) -> Range<usize> {
        self.start..self.end
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Last row of the block, inclusive.
    pub fn last_row(&self) -> Option<usize> {
        if self.is_empty() {
            None
        } else {
            Some(self.end - 1)
        }
    }
}

/// Number of workers actually used for `rows` rows.
///
/// Never more workers than rows, so no worker gets an empty block.
pub fn effective_workers(rows: usize, requested: usize) -> usize {
    requested.min(rows)
}

/// Split `rows` rows into `min(requested, rows)` contiguous partitions.
///
/// Boundary `i` sits at `rows * i / n`. Returns no partitions for an empty
/// image. Fails with [`FilterError::InvalidKernelRequest`] when
/// `requested` is zero.
pub fn plan_partitions(rows: usize, requested: usize) -> Result<Vec<Partition>> {
    if requested < 1 {
        return Err(FilterError::InvalidKernelRequest(format!(
            "worker count must be at least 1, got {requested}"
        )));
    }

    let workers = effective_workers(rows, requested);
    if workers == 0 {
        return Ok(Vec::new());
    }

    let boundary = |i: usize| -> usize {
        // u128 keeps rows * i from overflowing on very tall images
        ((rows as u128 * i as u128) / workers as u128) as usize
    };

    Ok((0..workers)
        .map(|i| Partition {
            start: boundary(i),
            end: boundary(i + 1),
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_covers(partitions: &[Partition], rows: usize) {
        let mut next = 0;
        for p in partitions {
            assert_eq!(p.start, next, "gap or overlap at {p:?}");
            assert!(!p.is_empty());
            next = p.end;
        }
        assert_eq!(next, rows);
    }

    #[test]
    fn test_even_split() {
        let parts = plan_partitions(8, 4).unwrap();
        assert_eq!(parts.len(), 4);
        assert!(parts.iter().all(|p| p.len() == 2));
        assert_covers(&parts, 8);
    }

    #[test]
    fn test_uneven_split_covers_all_rows() {
        for rows in 1..40 {
            for workers in 1..10 {
                let parts = plan_partitions(rows, workers).unwrap();
                assert_eq!(parts.len(), workers.min(rows));
                assert_covers(&parts, rows);
                let max = parts.iter().map(Partition::len).max().unwrap();
                let min = parts.iter().map(Partition::len).min().unwrap();
                assert!(max - min <= 1);
            }
        }
    }

    #[test]
    fn test_floor_boundaries() {
        let parts = plan_partitions(10, 3).unwrap();
        let bounds: Vec<_> = parts.iter().map(|p| (p.start, p.end)).collect();
        assert_eq!(bounds, vec![(0, 3), (3, 6), (6, 10)]);
        assert_eq!(parts[2].last_row(), Some(9));
    }

    #[test]
    fn test_workers_clamped_to_rows() {
        let parts = plan_partitions(3, 16).unwrap();
        assert_eq!(parts.len(), 3);
        assert_covers(&parts, 3);
    }

    #[test]
    fn test_empty_image_has_no_partitions() {
        assert!(plan_partitions(0, 4).unwrap().is_empty());
    }

    #[test]
    fn test_zero_workers_rejected() {
        assert!(matches!(
            plan_partitions(5, 0),
            Err(FilterError::InvalidKernelRequest(_))
        ));
    }
}
