//! Error type shared by every stage of the median filter.
//!
//! All errors are raised synchronously while validating or dispatching a
//! call, before any worker is spawned. A failed call never leaves a
//! partially filtered output behind.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum FilterError {
    /// Contiguity, rank, element type or shape precondition violated.
    #[error("invalid buffer: {0}")]
    InvalidBuffer(String),

    /// Non-positive kernel dimension, malformed kernel size or worker count.
    #[error("invalid kernel request: {0}")]
    InvalidKernelRequest(String),

    /// Element type outside the supported numeric set.
    #[error("unsupported element type: {0}")]
    UnsupportedElementType(String),

    #[error("failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error(transparent)]
    Shape(#[from] ndarray::ShapeError),
}

pub type Result<T> = std::result::Result<T, FilterError>;
