//! Median kernel: order statistic of a clipped window.
//!
//! ## Median of an even-sized window
//!
//! Clipped windows at the image border can hold an even number of cells.
//! The filter then takes the upper median, the element of rank `n / 2`
//! in the sorted window. Values are never averaged, so integer images
//! stay exact and every output value is an input value.
//!
//! ## Conditional mode
//!
//! A pixel is only replaced when its value equals the window minimum or
//! maximum. Equality is non-strict: a pixel tied with other cells at the
//! extremum still qualifies, including in a window where all cells are
//! equal. Every other pixel keeps its original value.

use std::cmp::Ordering;

use ndarray::{s, ArrayView2, ArrayViewMut2};

use super::core::Element;
use super::partition::Partition;
use super::window::{KernelSize, Window};

/// Upper median of `values`, reordering them in place.
///
/// `values` must not be empty.
#[inline]
pub fn window_median<T: Element>(values: &mut [T]) -> T {
    let mid = values.len() / 2;
    let (_, median, _) = values.select_nth_unstable_by(mid, T::order);
    *median
}

/// Minimum and maximum of `values`, `None` when empty.
pub fn window_extrema<T: Element>(values: &[T]) -> Option<(T, T)> {
    let (&first, rest) = values.split_first()?;
    Some(rest.iter().fold((first, first), |(lo, hi), &v| {
        let lo = if v.order(&lo) == Ordering::Less { v } else { lo };
        let hi = if v.order(&hi) == Ordering::Greater { v } else { hi };
        (lo, hi)
    }))
}

/// Whether `center` sits at the minimum or maximum of its window.
pub fn is_local_extremum<T: Element>(center: T, values: &[T]) -> bool {
    match window_extrema(values) {
        Some((lo, hi)) => {
            center.order(&lo) == Ordering::Equal || center.order(&hi) == Ordering::Equal
        }
        None => false,
    }
}

/// Filtered value of the pixel at `(row, col)`.
///
/// `scratch` is the caller's working set, reused across pixels.
#[inline]
pub fn filter_pixel<T: Element>(
    input: &ArrayView2<T>,
    row: usize,
    col: usize,
    kernel: KernelSize,
    conditional: bool,
    scratch: &mut Vec<T>,
) -> T {
    let window = Window::clipped(row, col, input.dim(), kernel);
    scratch.clear();
    scratch.extend(input.slice(s![window.rows, window.cols]).iter().copied());

    let center = input[[row, col]];
    if conditional && !is_local_extremum(center, scratch) {
        return center;
    }
    window_median(scratch)
}

/// Filter every pixel of `partition` into `output`.
///
/// `output` holds exactly the partition's rows, so row `partition.start`
/// of the image lands in row 0 of `output`.
pub fn filter_rows<T: Element>(
    input: ArrayView2<T>,
    partition: Partition,
    kernel: KernelSize,
    conditional: bool,
    mut output: ArrayViewMut2<T>,
) {
    debug_assert_eq!(output.nrows(), partition.len());
    debug_assert_eq!(output.ncols(), input.ncols());

    let mut scratch = Vec::with_capacity(kernel.area().min(input.len()));

    for (row, mut out_row) in partition.rows().zip(output.outer_iter_mut()) {
        for (col, out) in out_row.iter_mut().enumerate() {
            *out = filter_pixel(&input, row, col, kernel, conditional, &mut scratch);
        }
    }
}
