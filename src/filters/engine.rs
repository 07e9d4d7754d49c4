//! Filter engine: validation, partitioning and fork-join execution.
//!
//! Each call allocates one output buffer, validates it against the input,
//! splits it into disjoint row blocks and filters every block on its own
//! worker. The input is only ever read, and each worker writes to its own
//! block, so no locking is involved. The call returns once every block is
//! done; the result does not depend on the worker count.

use log::{debug, trace};
use ndarray::{Array2, ArrayD, ArrayView1, ArrayView2, ArrayViewD, ArrayViewMut2, Axis, Ix2};
use rayon::prelude::*;
use rayon::ThreadPoolBuilder;

use super::core::{for_each_buffer, Element, ImageBuffer};
use super::median::filter_rows;
use super::partition::{plan_partitions, Partition};
use super::validate::validate_buffers;
use super::window::{KernelArg, KernelSize};
use crate::error::Result;

/// Worker count used when the caller does not pick one.
pub const DEFAULT_WORKERS: usize = 4;

/// Median filter settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MedianFilterParams {
    /// Nominal window size, resolved against the input rank.
    pub kernel_size: KernelArg,
    /// Only replace pixels that are a minimum or maximum of their window.
    pub conditional: bool,
    /// Requested workers; clamped to the row count.
    pub workers: usize,
}

impl Default for MedianFilterParams {
    fn default() -> Self {
        Self {
            kernel_size: KernelArg::default(),
            conditional: false,
            workers: DEFAULT_WORKERS,
        }
    }
}

impl MedianFilterParams {
    pub fn new(kernel_size: KernelArg) -> Self {
        Self {
            kernel_size,
            ..Self::default()
        }
    }

    pub fn with_kernel(mut self, kernel_size: KernelArg) -> Self {
        self.kernel_size = kernel_size;
        self
    }

    pub fn with_conditional(mut self, conditional: bool) -> Self {
        self.conditional = conditional;
        self
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }
}

/// Apply a median filter to a 1D or 2D array.
///
/// A 1D input is filtered as a single column and returned as 1D.
///
/// # Errors
/// * `InvalidBuffer` - input is not contiguous row-major, or its rank is not 1 or 2
/// * `InvalidKernelRequest` - non-positive kernel dimension or zero workers
/// * `ThreadPool` - worker pool could not be started
///
/// # Returns
/// Filtered array with the same shape and element type as `input`
pub fn median_filter<T: Element>(
    input: ArrayViewD<T>,
    params: &MedianFilterParams,
) -> Result<ArrayD<T>> {
    let mut output = ArrayD::<T>::default(input.raw_dim());
    validate_buffers(&input, &output.view())?;

    let kernel = params.kernel_size.resolve(input.ndim())?;
    let (rows, cols) = image_dims(input.shape());
    let partitions = plan_partitions(rows, params.workers)?;

    debug!(
        "median filter: {}x{} {} image, kernel {}x{}, conditional={}, {} partition(s)",
        rows,
        cols,
        T::TYPE,
        kernel.height,
        kernel.width,
        params.conditional,
        partitions.len()
    );

    let source = input.into_shape_with_order((rows, cols))?;
    let target = output.view_mut().into_shape_with_order((rows, cols))?;
    let blocks = split_rows(target, &partitions);
    run_partitions(source, kernel, params.conditional, blocks)?;

    Ok(output)
}

/// Apply a median filter to a buffer of any supported element type.
pub fn median_filter_dyn(input: &ImageBuffer, params: &MedianFilterParams) -> Result<ImageBuffer> {
    for_each_buffer!(input, array => median_filter(array.view(), params).map(ImageBuffer::from))
}

/// Median filter a 1D signal with a window of `kernel_size` samples.
pub fn medfilt1d<T: Element>(
    data: &[T],
    kernel_size: i64,
    conditional: bool,
    workers: usize,
) -> Result<Vec<T>> {
    let params = MedianFilterParams {
        kernel_size: KernelArg::Scalar(kernel_size),
        conditional,
        workers,
    };
    let output = median_filter(ArrayView1::from(data).into_dyn(), &params)?;
    Ok(output.into_raw_vec_and_offset().0)
}

/// Median filter a 2D image.
pub fn medfilt2d<T: Element>(
    input: ArrayView2<T>,
    kernel_size: KernelSize,
    conditional: bool,
    workers: usize,
) -> Result<Array2<T>> {
    let params = MedianFilterParams {
        kernel_size: kernel_size.into(),
        conditional,
        workers,
    };
    let output = median_filter(input.into_dyn(), &params)?;
    Ok(output.into_dimensionality::<Ix2>()?)
}

/// Rows and columns of a validated rank 1 or 2 shape.
fn image_dims(shape: &[usize]) -> (usize, usize) {
    match *shape {
        [len] => (len, 1),
        [rows, cols] => (rows, cols),
        _ => unreachable!("rank checked by validate_buffers"),
    }
}

/// Cut `target` into one disjoint row block per partition.
fn split_rows<'a, T>(
    mut rest: ArrayViewMut2<'a, T>,
    partitions: &[Partition],
) -> Vec<(Partition, ArrayViewMut2<'a, T>)> {
    let mut blocks = Vec::with_capacity(partitions.len());
    for &partition in partitions {
        let (block, tail) = rest.split_at(Axis(0), partition.len());
        blocks.push((partition, block));
        rest = tail;
    }
    blocks
}

/// Filter every block, one worker per block, and wait for all of them.
fn run_partitions<T: Element>(
    source: ArrayView2<T>,
    kernel: KernelSize,
    conditional: bool,
    blocks: Vec<(Partition, ArrayViewMut2<T>)>,
) -> Result<()> {
    let task = |(partition, block): (Partition, ArrayViewMut2<T>)| {
        trace!("filtering rows {}..{}", partition.start, partition.end);
        filter_rows(source, partition, kernel, conditional, block);
    };

    if blocks.len() <= 1 {
        blocks.into_iter().for_each(task);
        return Ok(());
    }

    let pool = ThreadPoolBuilder::new()
        .num_threads(blocks.len())
        .thread_name(|i| format!("medfilt-worker-{i}"))
        .build()?;
    pool.install(|| blocks.into_par_iter().for_each(task));

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FilterError;
    use crate::filters::core::ElementType;
    use ndarray::{array, Array1, Array3, IxDyn};

    /// Deterministic pseudo-random values (MINSTD).
    fn noise_image(rows: usize, cols: usize, seed: u64) -> Array2<i32> {
        let mut state = seed.wrapping_add(1);
        Array2::from_shape_fn((rows, cols), |_| {
            state = state.wrapping_mul(48271) % 2147483647;
            (state % 1000) as i32
        })
    }

    fn params(kernel: KernelArg, conditional: bool, workers: usize) -> MedianFilterParams {
        MedianFilterParams::new(kernel)
            .with_conditional(conditional)
            .with_workers(workers)
    }

    #[test]
    fn test_defaults() {
        let p = MedianFilterParams::default();
        assert_eq!(p.kernel_size, KernelArg::Scalar(3));
        assert!(!p.conditional);
        assert_eq!(p.workers, 4);
    }

    #[test]
    fn test_result_independent_of_worker_count() {
        let rows = 13;
        let input = noise_image(rows, 7, 42).into_dyn();
        let kernels = [KernelArg::Scalar(3), KernelArg::Dims(vec![5, 3]), KernelArg::Scalar(4)];

        for kernel in kernels {
            for conditional in [false, true] {
                let reference =
                    median_filter(input.view(), &params(kernel.clone(), conditional, 1)).unwrap();
                for workers in [2, 4, rows, rows * 3] {
                    let result =
                        median_filter(input.view(), &params(kernel.clone(), conditional, workers))
                            .unwrap();
                    assert_eq!(result, reference, "{kernel:?} conditional={conditional} workers={workers}");
                }
            }
        }
    }

    #[test]
    fn test_float_result_independent_of_worker_count() {
        let input = noise_image(9, 9, 7).mapv(|v| v as f64 / 7.0).into_dyn();
        let single = median_filter(input.view(), &params(KernelArg::Scalar(3), false, 1)).unwrap();
        let many = median_filter(input.view(), &params(KernelArg::Scalar(3), false, 9)).unwrap();
        let bits = |a: &ArrayD<f64>| a.iter().map(|v| v.to_bits()).collect::<Vec<_>>();
        assert_eq!(bits(&single), bits(&many));
    }

    #[test]
    fn test_shape_and_type_preserved() {
        let signal = Array1::from_vec(vec![3i16, -1, 4, 1, -5, 9, 2]).into_dyn();
        let out = median_filter(signal.view(), &MedianFilterParams::default()).unwrap();
        assert_eq!(out.shape(), signal.shape());

        let image = ImageBuffer::from(Array2::<u64>::zeros((4, 6)).into_dyn());
        let out = median_filter_dyn(&image, &MedianFilterParams::default()).unwrap();
        assert_eq!(out.element_type(), ElementType::U64);
        assert_eq!(out.shape(), &[4, 6]);
    }

    #[test]
    fn test_constant_image_is_fixed_point() {
        let input = ArrayD::from_elem(IxDyn(&[6, 5]), 2.5f64);
        for k in 1..8 {
            let out = median_filter(input.view(), &params(KernelArg::Scalar(k), false, 3)).unwrap();
            assert_eq!(out, input);
        }
    }

    #[test]
    fn test_unit_kernel_is_identity() {
        let input = noise_image(5, 8, 3).mapv(|v| v as u32).into_dyn();
        for kernel in [KernelArg::Scalar(1), KernelArg::Dims(vec![1, 1])] {
            for conditional in [false, true] {
                let out = median_filter(input.view(), &params(kernel.clone(), conditional, 2)).unwrap();
                assert_eq!(out, input);
            }
        }
    }

    #[test]
    fn test_corner_uses_clipped_neighborhood() {
        // Distinct values where clipping and zero padding disagree.
        let input = Array2::from_shape_fn((5, 5), |(r, c)| (r * 5 + c + 1) as f32);
        let out = medfilt2d(input.view(), KernelSize::square(3), false, 4).unwrap();
        // Clipped {1, 2, 6, 7} -> upper median 6. Padding with zeros would give 1.
        assert_eq!(out[[0, 0]], 6.0);
        // Clipped {4, 5, 9, 10} -> 9.
        assert_eq!(out[[0, 4]], 9.0);
        // Edge pixel (0, 2): {2, 3, 4, 7, 8, 9} -> 7.
        assert_eq!(out[[0, 2]], 7.0);
    }

    #[test]
    fn test_rank_one_matches_column_image() {
        let values: Vec<i64> = noise_image(1, 15, 11).iter().map(|&v| v as i64).collect();
        let vector = Array1::from_vec(values.clone()).into_dyn();
        let column = Array2::from_shape_vec((15, 1), values).unwrap().into_dyn();

        let from_vector = median_filter(vector.view(), &params(KernelArg::Scalar(5), false, 4)).unwrap();
        let from_column =
            median_filter(column.view(), &params(KernelArg::Dims(vec![5, 1]), false, 4)).unwrap();

        assert_eq!(from_vector.ndim(), 1);
        assert_eq!(from_vector.as_slice(), from_column.as_slice());

        let listed =
            median_filter(vector.view(), &params(KernelArg::Dims(vec![5]), false, 4)).unwrap();
        assert_eq!(listed, from_vector);
    }

    #[test]
    fn test_conditional_leaves_interior_values() {
        let input = noise_image(10, 10, 5);
        let out = median_filter(input.view().into_dyn(), &params(KernelArg::Scalar(3), true, 4))
            .unwrap()
            .into_dimensionality::<Ix2>()
            .unwrap();

        for ((r, c), &value) in input.indexed_iter() {
            let window = crate::filters::window::Window::clipped(r, c, input.dim(), KernelSize::square(3));
            let cells = input.slice(ndarray::s![window.rows, window.cols]);
            let lo = *cells.iter().min().unwrap();
            let hi = *cells.iter().max().unwrap();
            if lo < value && value < hi {
                assert_eq!(out[[r, c]], value, "pixel ({r}, {c}) should be untouched");
            }
        }
    }

    #[test]
    fn test_medfilt1d_removes_spike() {
        let out = medfilt1d(&[1.0f32, 1.0, 50.0, 1.0, 1.0], 3, false, 2).unwrap();
        assert_eq!(out, vec![1.0; 5]);
    }

    #[test]
    fn test_empty_image() {
        let input = Array2::<u16>::zeros((0, 4)).into_dyn();
        let out = median_filter(input.view(), &MedianFilterParams::default()).unwrap();
        assert_eq!(out.shape(), &[0, 4]);
    }

    #[test]
    fn test_non_contiguous_input_rejected() {
        let input = noise_image(4, 6, 1);
        let transposed = input.t().into_dyn();
        let result = median_filter(transposed, &MedianFilterParams::default());
        assert!(matches!(result, Err(FilterError::InvalidBuffer(_))));
    }

    #[test]
    fn test_buffer_errors_reported_before_kernel_errors() {
        let input = noise_image(4, 6, 1);
        let result = median_filter(input.t().into_dyn(), &params(KernelArg::Scalar(0), false, 0));
        assert!(matches!(result, Err(FilterError::InvalidBuffer(_))));
    }

    #[test]
    fn test_three_dimensional_input_rejected() {
        let input = Array3::<f32>::zeros((2, 3, 4)).into_dyn();
        let result = median_filter(input.view(), &MedianFilterParams::default());
        assert!(matches!(result, Err(FilterError::InvalidBuffer(_))));
    }

    #[test]
    fn test_zero_kernel_rejected() {
        let input = array![[1u16, 2], [3, 4]].into_dyn();
        let result = median_filter(input.view(), &params(KernelArg::Scalar(0), false, 4));
        assert!(matches!(result, Err(FilterError::InvalidKernelRequest(_))));
    }

    #[test]
    fn test_zero_workers_rejected() {
        let input = array![[1u16, 2], [3, 4]].into_dyn();
        let result = median_filter(input.view(), &params(KernelArg::Scalar(3), false, 0));
        assert!(matches!(result, Err(FilterError::InvalidKernelRequest(_))));
    }
}
