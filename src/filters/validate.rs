//! Buffer preconditions checked before any filtering work starts.

use ndarray::ArrayViewD;

use super::core::Element;
use crate::error::{FilterError, Result};

/// Highest rank the filter accepts. Rank 1 is treated as a single column.
pub const MAX_RANK: usize = 2;

/// Check that `input` and `output` can be filtered into one another.
///
/// Fails with [`FilterError::InvalidBuffer`] when either buffer is not
/// row-major contiguous, has rank 0 or above [`MAX_RANK`], the element
/// types differ, or the shapes differ. Neither buffer is touched.
pub fn validate_buffers<A: Element, B: Element>(
    input: &ArrayViewD<A>,
    output: &ArrayViewD<B>,
) -> Result<()> {
    check_buffer("input", input)?;
    check_buffer("output", output)?;

    if A::TYPE != B::TYPE {
        return Err(FilterError::InvalidBuffer(format!(
            "element type mismatch: input is {}, output is {}",
            A::TYPE,
            B::TYPE
        )));
    }

    if input.shape() != output.shape() {
        return Err(FilterError::InvalidBuffer(format!(
            "shape mismatch: input is {:?}, output is {:?}",
            input.shape(),
            output.shape()
        )));
    }

    Ok(())
}

fn check_buffer<T: Element>(label: &str, buffer: &ArrayViewD<T>) -> Result<()> {
    let rank = buffer.ndim();
    if rank == 0 || rank > MAX_RANK {
        return Err(FilterError::InvalidBuffer(format!(
            "{label} must have rank 1 or 2, got rank {rank}"
        )));
    }
    if !buffer.is_standard_layout() {
        return Err(FilterError::InvalidBuffer(format!(
            "{label} is not contiguous in row-major order (strides {:?})",
            buffer.strides()
        )));
    }
    Ok(())
}
