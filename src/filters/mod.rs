//! Parallel median filter for 1D and 2D numeric arrays.
//!
//! ## Supported Formats
//!
//! | Rank | Shape | Treated as |
//! |------|-------|------------|
//! | 1 | (n,) | n rows, 1 column |
//! | 2 | (rows, cols) | rows, cols |
//!
//! Element types: `f32`, `f64`, `i16`, `u16`, `i32`, `u32`, `i64`, `u64`.
//! Buffers must be contiguous in row-major order.
//!
//! ## Architecture
//!
//! - **core** - element types and runtime dispatch
//! - **validate** - buffer preconditions
//! - **partition** - row blocks for the workers
//! - **window** - kernel sizes and border-clipped windows
//! - **median** - per-pixel order statistic and conditional policy
//! - **engine** - fork-join orchestration on a rayon pool

pub mod core;
pub mod engine;
pub mod median;
pub mod partition;
pub mod validate;
pub mod window;

pub use self::core::{Element, ElementType, ImageBuffer};
pub use self::engine::{
    medfilt1d, medfilt2d, median_filter, median_filter_dyn, MedianFilterParams, DEFAULT_WORKERS,
};
pub use self::partition::{plan_partitions, Partition};
pub use self::validate::validate_buffers;
pub use self::window::{KernelArg, KernelSize, Window};
