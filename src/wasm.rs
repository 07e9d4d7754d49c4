//! WebAssembly exports for the median filter.
//!
//! These functions are exposed to JavaScript via wasm-bindgen.
//!
//! Images are passed as flat row-major arrays (length = width * height).
//! Filtering runs on a single worker since wasm32 has no thread pool.

use ndarray::ArrayView2;
use wasm_bindgen::prelude::*;

use crate::filters::{medfilt2d, Element, KernelSize};

fn median_filter_flat<T: Element>(
    data: &[T],
    width: usize,
    height: usize,
    kernel_height: i32,
    kernel_width: i32,
    conditional: bool,
) -> Result<Vec<T>, JsError> {
    let input = ArrayView2::from_shape((height, width), data)?;
    let kernel = KernelSize::try_new(i64::from(kernel_height), i64::from(kernel_width))?;
    let output = medfilt2d(input, kernel, conditional, 1)?;
    Ok(output.into_raw_vec_and_offset().0)
}

// ============================================================================
// Median Filter - f32 (float)
// ============================================================================

/// Median filter a float image.
///
/// # Arguments
/// * `data` - Flat array of floats (length = width * height)
/// * `width` - Image width in pixels
/// * `height` - Image height in pixels
/// * `kernel_height` - Window height (positive)
/// * `kernel_width` - Window width (positive)
/// * `conditional` - Only replace pixels that are a window minimum or maximum
///
/// # Returns
/// Flat array of filtered floats
#[wasm_bindgen]
pub fn median_filter_f32_wasm(
    data: &[f32],
    width: usize,
    height: usize,
    kernel_height: i32,
    kernel_width: i32,
    conditional: bool,
) -> Result<Vec<f32>, JsError> {
    median_filter_flat(data, width, height, kernel_height, kernel_width, conditional)
}

// ============================================================================
// Median Filter - f64 (double)
// ============================================================================

/// Median filter a double precision image.
#[wasm_bindgen]
pub fn median_filter_f64_wasm(
    data: &[f64],
    width: usize,
    height: usize,
    kernel_height: i32,
    kernel_width: i32,
    conditional: bool,
) -> Result<Vec<f64>, JsError> {
    median_filter_flat(data, width, height, kernel_height, kernel_width, conditional)
}

// ============================================================================
// Median Filter - integer images
// ============================================================================

/// Median filter a 16-bit unsigned image (e.g. raw detector frames).
#[wasm_bindgen]
pub fn median_filter_u16_wasm(
    data: &[u16],
    width: usize,
    height: usize,
    kernel_height: i32,
    kernel_width: i32,
    conditional: bool,
) -> Result<Vec<u16>, JsError> {
    median_filter_flat(data, width, height, kernel_height, kernel_width, conditional)
}

/// Median filter a 32-bit signed image.
#[wasm_bindgen]
pub fn median_filter_i32_wasm(
    data: &[i32],
    width: usize,
    height: usize,
    kernel_height: i32,
    kernel_width: i32,
    conditional: bool,
) -> Result<Vec<i32>, JsError> {
    median_filter_flat(data, width, height, kernel_height, kernel_width, conditional)
}
