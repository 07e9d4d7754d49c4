//! Median filter Rust extensions
//!
//! Parallel windowed median filter for 1D and 2D numeric arrays, with
//! Python bindings via PyO3 and WASM bindings for JavaScript.
//!
//! ## Array Format
//! - **1D**: (n,) - filtered as a single column of n rows
//! - **2D**: (rows, cols) - row-major, contiguous
//!
//! Element types: `f32`, `f64`, `i16`, `u16`, `i32`, `u32`, `i64`, `u64`.
//!
//! ## Border Handling
//! Windows are clipped at the array edges. Border pixels are filtered
//! with the cells that exist; nothing is padded or mirrored.
//!
//! ## Concurrency
//! Rows are split into contiguous blocks, one per worker, and filtered on
//! a rayon pool. The output is identical for every worker count.
//!
//! ## Logging
//! Progress is reported through the `log` facade at `debug` and `trace`
//! level. No logger is installed by this crate.

pub mod error;
pub mod filters;

#[cfg(feature = "wasm")]
pub mod wasm;

pub use error::{FilterError, Result};
pub use filters::{
    medfilt1d, medfilt2d, median_filter, median_filter_dyn, ElementType, ImageBuffer, KernelArg,
    KernelSize, MedianFilterParams,
};

// Python bindings (only when python feature is enabled)
#[cfg(feature = "python")]
mod python {
    use numpy::{IntoPyArray, PyArrayDyn, PyArrayMethods, PyUntypedArray, PyUntypedArrayMethods};
    use pyo3::create_exception;
    use pyo3::exceptions::{PyRuntimeError, PyTypeError, PyValueError};
    use pyo3::prelude::*;

    use crate::error::FilterError;
    use crate::filters::{median_filter, Element, ElementType, KernelArg, MedianFilterParams};

    create_exception!(medfilt_rust, InvalidBuffer, PyValueError);
    create_exception!(medfilt_rust, InvalidKernelRequest, PyValueError);
    create_exception!(medfilt_rust, UnsupportedElementType, PyTypeError);

    impl From<FilterError> for PyErr {
        fn from(err: FilterError) -> PyErr {
            let message = err.to_string();
            match err {
                FilterError::InvalidBuffer(_) | FilterError::Shape(_) => {
                    InvalidBuffer::new_err(message)
                }
                FilterError::InvalidKernelRequest(_) => InvalidKernelRequest::new_err(message),
                FilterError::UnsupportedElementType(_) => UnsupportedElementType::new_err(message),
                FilterError::ThreadPool(_) => PyRuntimeError::new_err(message),
            }
        }
    }

    // ========================================================================
    // Argument Conversion
    // ========================================================================

    /// Accept an int (square kernel) or a sequence of ints.
    fn kernel_arg(kernel_size: Option<&Bound<'_, PyAny>>) -> PyResult<KernelArg> {
        let Some(value) = kernel_size else {
            return Ok(KernelArg::default());
        };
        if let Ok(k) = value.extract::<i64>() {
            return Ok(KernelArg::Scalar(k));
        }
        value.extract::<Vec<i64>>().map(KernelArg::Dims).map_err(|_| {
            InvalidKernelRequest::new_err("kernel_size must be an int or a sequence of ints")
        })
    }

    fn filter_params(
        kernel_size: Option<&Bound<'_, PyAny>>,
        conditional: bool,
        n_workers: i64,
    ) -> PyResult<MedianFilterParams> {
        let workers = usize::try_from(n_workers).map_err(|_| {
            FilterError::InvalidKernelRequest(format!(
                "worker count must be at least 1, got {n_workers}"
            ))
        })?;
        Ok(MedianFilterParams {
            kernel_size: kernel_arg(kernel_size)?,
            conditional,
            workers,
        })
    }

    fn require_rank(data: &Bound<'_, PyAny>, rank: usize) -> PyResult<()> {
        let array = data.downcast::<PyUntypedArray>()?;
        if array.ndim() != rank {
            return Err(FilterError::InvalidBuffer(format!(
                "expected a {rank}D array, got {}D",
                array.ndim()
            ))
            .into());
        }
        Ok(())
    }

    fn unsupported_dtype(data: &Bound<'_, PyAny>) -> PyErr {
        let name = match data.downcast::<PyUntypedArray>() {
            Ok(array) => array.dtype().to_string(),
            Err(_) => data.get_type().to_string(),
        };
        match ElementType::from_dtype_name(&name) {
            Err(err) => err.into(),
            // Supported type in a layout numpy cannot hand over as-is
            Ok(_) => UnsupportedElementType::new_err(format!(
                "{name} is not in native byte order"
            )),
        }
    }

    // ========================================================================
    // Median Filter
    // ========================================================================

    fn filter_typed<'py, T>(
        py: Python<'py>,
        array: &Bound<'py, PyArrayDyn<T>>,
        params: &MedianFilterParams,
    ) -> PyResult<Bound<'py, PyAny>>
    where
        T: Element + numpy::Element,
    {
        let readonly = array.readonly();
        let view = readonly.as_array();
        let output = py.allow_threads(|| median_filter(view, params))?;
        Ok(output.into_pyarray(py).into_any())
    }

    macro_rules! dispatch_dtype {
        ($py:expr, $data:expr, $params:expr; $($t:ty),*) => {
            $(
                if let Ok(array) = $data.downcast::<PyArrayDyn<$t>>() {
                    return filter_typed($py, array, $params);
                }
            )*
        };
    }

    fn filter_any<'py>(
        py: Python<'py>,
        data: &Bound<'py, PyAny>,
        params: &MedianFilterParams,
    ) -> PyResult<Bound<'py, PyAny>> {
        dispatch_dtype!(py, data, params; f32, f64, i16, u16, i32, u32, i64, u64);
        Err(unsupported_dtype(data))
    }

    /// Apply a median filter to a 1D or 2D numpy array.
    ///
    /// # Arguments
    /// * `data` - Contiguous array of float32/64, (u)int16, (u)int32 or (u)int64
    /// * `kernel_size` - Int for a square kernel, or (height, width)
    /// * `conditional` - Only replace pixels that are a window minimum or maximum
    /// * `n_workers` - Number of worker threads (clamped to the row count)
    ///
    /// # Returns
    /// Filtered array with the same shape and dtype
    #[pyfunction]
    #[pyo3(signature = (data, kernel_size=None, conditional=false, n_workers=4))]
    pub fn medfilt<'py>(
        py: Python<'py>,
        data: &Bound<'py, PyAny>,
        kernel_size: Option<&Bound<'py, PyAny>>,
        conditional: bool,
        n_workers: i64,
    ) -> PyResult<Bound<'py, PyAny>> {
        let params = filter_params(kernel_size, conditional, n_workers)?;
        filter_any(py, data, &params)
    }

    /// Median filter a 1D numpy array.
    #[pyfunction]
    #[pyo3(signature = (data, kernel_size=None, conditional=false, n_workers=4))]
    pub fn medfilt1d<'py>(
        py: Python<'py>,
        data: &Bound<'py, PyAny>,
        kernel_size: Option<&Bound<'py, PyAny>>,
        conditional: bool,
        n_workers: i64,
    ) -> PyResult<Bound<'py, PyAny>> {
        require_rank(data, 1)?;
        let params = filter_params(kernel_size, conditional, n_workers)?;
        filter_any(py, data, &params)
    }

    /// Median filter a 2D numpy array.
    #[pyfunction]
    #[pyo3(signature = (data, kernel_size=None, conditional=false, n_workers=4))]
    pub fn medfilt2d<'py>(
        py: Python<'py>,
        data: &Bound<'py, PyAny>,
        kernel_size: Option<&Bound<'py, PyAny>>,
        conditional: bool,
        n_workers: i64,
    ) -> PyResult<Bound<'py, PyAny>> {
        require_rank(data, 2)?;
        let params = filter_params(kernel_size, conditional, n_workers)?;
        filter_any(py, data, &params)
    }

    // ========================================================================
    // Module Registration
    // ========================================================================

    #[pymodule]
    pub fn medfilt_rust(m: &Bound<'_, PyModule>) -> PyResult<()> {
        m.add_function(wrap_pyfunction!(medfilt, m)?)?;
        m.add_function(wrap_pyfunction!(medfilt1d, m)?)?;
        m.add_function(wrap_pyfunction!(medfilt2d, m)?)?;

        // Error classes
        let py = m.py();
        m.add("InvalidBuffer", py.get_type::<InvalidBuffer>())?;
        m.add("InvalidKernelRequest", py.get_type::<InvalidKernelRequest>())?;
        m.add("UnsupportedElementType", py.get_type::<UnsupportedElementType>())?;

        Ok(())
    }
}

#[cfg(feature = "python")]
pub use python::medfilt_rust;
