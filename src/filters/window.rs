//! Kernel sizes and boundary-clipped windows.
//!
//! Windows are truncated at the image edges. Nothing is padded or
//! mirrored, so pixels near a border are filtered with fewer samples
//! than interior pixels.

use std::ops::RangeInclusive;

use crate::error::{FilterError, Result};

/// Nominal kernel extent as requested by a caller.
///
/// Values are signed so that zero or negative requests coming from
/// bindings can be represented and rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KernelArg {
    /// Square kernel for 2D input, `(k, 1)` for 1D input.
    Scalar(i64),
    /// `[height, width]`, or `[k]` for 1D input.
    Dims(Vec<i64>),
}

impl Default for KernelArg {
    fn default() -> Self {
        KernelArg::Scalar(3)
    }
}

impl From<KernelSize> for KernelArg {
    fn from(size: KernelSize) -> Self {
        KernelArg::Dims(vec![size.height as i64, size.width as i64])
    }
}

impl KernelArg {
    /// Normalize to a positive `(height, width)` pair for an input of `rank`.
    pub fn resolve(&self, rank: usize) -> Result<KernelSize> {
        let (height, width) = match (self, rank) {
            (KernelArg::Scalar(k), 1) => (*k, 1),
            (KernelArg::Scalar(k), _) => (*k, *k),
            (KernelArg::Dims(dims), _) => match (dims.as_slice(), rank) {
                ([k], 1) => (*k, 1),
                ([h, w], _) => (*h, *w),
                _ => {
                    return Err(FilterError::InvalidKernelRequest(format!(
                        "kernel size {dims:?} does not fit an input of rank {rank}"
                    )))
                }
            },
        };
        KernelSize::try_new(height, width)
    }
}

/// Positive kernel height and width.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KernelSize {
    pub height: usize,
    pub width: usize,
}

impl KernelSize {
    pub fn try_new(height: i64, width: i64) -> Result<Self> {
        if height <= 0 || width <= 0 {
            return Err(FilterError::InvalidKernelRequest(format!(
                "kernel dimensions must be positive, got ({height}, {width})"
            )));
        }
        Ok(Self {
            height: usize::try_from(height).unwrap_or(usize::MAX),
            width: usize::try_from(width).unwrap_or(usize::MAX),
        })
    }

    pub fn square(size: usize) -> Self {
        Self {
            height: size,
            width: size,
        }
    }

    #[inline]
    pub fn half_height(&self) -> usize {
        self.height / 2
    }

    #[inline]
    pub fn half_width(&self) -> usize {
        self.width / 2
    }

    /// Cells in an unclipped window.
    pub fn area(&self) -> usize {
        let span = |half: usize| half.saturating_mul(2).saturating_add(1);
        span(self.half_height()).saturating_mul(span(self.half_width()))
    }
}

/// Clipped window around one pixel, both ranges inclusive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Window {
    pub rows: RangeInclusive<usize>,
    pub cols: RangeInclusive<usize>,
}

impl Window {
    /// Window of `kernel` centered on `(row, col)` inside a `dims` image.
    ///
    /// `row` and `col` must lie inside the image.
    #[inline]
    pub fn clipped(row: usize, col: usize, dims: (usize, usize), kernel: KernelSize) -> Self {
        let (rows, cols) = dims;
        debug_assert!(row < rows && col < cols);

        let (hh, hw) = (kernel.half_height(), kernel.half_width());
        Self {
            rows: row.saturating_sub(hh)..=row.saturating_add(hh).min(rows - 1),
            cols: col.saturating_sub(hw)..=col.saturating_add(hw).min(cols - 1),
        }
    }

    /// Number of cells; never zero for a pixel inside the image.
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        (self.rows.end() - self.rows.start() + 1) * (self.cols.end() - self.cols.start() + 1)
    }
}
