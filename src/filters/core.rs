//! Element types accepted by the median filter.
//!
//! This module provides the pieces shared by every filter stage:
//! - The closed set of supported element types ([`ElementType`])
//! - A generic [`Element`] trait implemented for each of them
//! - A tagged union of owned arrays ([`ImageBuffer`]) for runtime dispatch

use std::cmp::Ordering;
use std::fmt;

use ndarray::{ArrayD, IxDyn};

use crate::error::{FilterError, Result};

/// Supported numeric element types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementType {
    F32,
    F64,
    I16,
    U16,
    I32,
    U32,
    I64,
    U64,
}

impl ElementType {
    /// Every supported type, in dispatch order.
    pub const ALL: [ElementType; 8] = [
        ElementType::F32,
        ElementType::F64,
        ElementType::I16,
        ElementType::U16,
        ElementType::I32,
        ElementType::U32,
        ElementType::I64,
        ElementType::U64,
    ];

    /// Canonical numpy dtype name.
    pub fn name(self) -> &'static str {
        match self {
            ElementType::F32 => "float32",
            ElementType::F64 => "float64",
            ElementType::I16 => "int16",
            ElementType::U16 => "uint16",
            ElementType::I32 => "int32",
            ElementType::U32 => "uint32",
            ElementType::I64 => "int64",
            ElementType::U64 => "uint64",
        }
    }

    /// Parse a numpy dtype name (`"float32"`) or type string (`"<f4"`, `"u2"`).
    ///
    /// Byte-order prefixes (`<`, `>`, `=`, `|`) are ignored. Anything that
    /// does not name one of the supported types is rejected.
    pub fn from_dtype_name(name: &str) -> Result<Self> {
        let trimmed = name.trim();
        let bare = trimmed.trim_start_matches(['<', '>', '=', '|']);
        let element = match bare {
            "float32" | "f4" => ElementType::F32,
            "float64" | "f8" | "double" => ElementType::F64,
            "int16" | "i2" => ElementType::I16,
            "uint16" | "u2" => ElementType::U16,
            "int32" | "i4" => ElementType::I32,
            "uint32" | "u4" => ElementType::U32,
            "int64" | "i8" => ElementType::I64,
            "uint64" | "u8" => ElementType::U64,
            _ => return Err(FilterError::UnsupportedElementType(trimmed.to_string())),
        };
        Ok(element)
    }
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A numeric type the median filter can be instantiated for.
///
/// `order` is a total order: integers use `Ord`, floats use IEEE-754
/// `total_cmp`, so NaN values sort above every number and the median of a
/// window is always well defined.
pub trait Element: Copy + Default + PartialEq + fmt::Debug + Send + Sync + 'static {
    const TYPE: ElementType;

    fn order(&self, other: &Self) -> Ordering;
}

macro_rules! impl_element_int {
    ($($t:ty => $variant:ident),* $(,)?) => {
        $(
            impl Element for $t {
                const TYPE: ElementType = ElementType::$variant;

                #[inline]
                fn order(&self, other: &Self) -> Ordering {
                    Ord::cmp(self, other)
                }
            }
        )*
    };
}

macro_rules! impl_element_float {
    ($($t:ty => $variant:ident),* $(,)?) => {
        $(
            impl Element for $t {
                const TYPE: ElementType = ElementType::$variant;

                #[inline]
                fn order(&self, other: &Self) -> Ordering {
                    <$t>::total_cmp(self, other)
                }
            }
        )*
    };
}

impl_element_int!(
    i16 => I16,
    u16 => U16,
    i32 => I32,
    u32 => U32,
    i64 => I64,
    u64 => U64,
);

impl_element_float!(f32 => F32, f64 => F64);

/// Owned array of any supported element type.
#[derive(Debug, Clone, PartialEq)]
pub enum ImageBuffer {
    F32(ArrayD<f32>),
    F64(ArrayD<f64>),
    I16(ArrayD<i16>),
    U16(ArrayD<u16>),
    I32(ArrayD<i32>),
    U32(ArrayD<u32>),
    I64(ArrayD<i64>),
    U64(ArrayD<u64>),
}

/// Apply the same expression to whichever array an [`ImageBuffer`] holds.
macro_rules! for_each_buffer {
    ($buffer:expr, $array:ident => $body:expr) => {
        match $buffer {
            ImageBuffer::F32($array) => $body,
            ImageBuffer::F64($array) => $body,
            ImageBuffer::I16($array) => $body,
            ImageBuffer::U16($array) => $body,
            ImageBuffer::I32($array) => $body,
            ImageBuffer::U32($array) => $body,
            ImageBuffer::I64($array) => $body,
            ImageBuffer::U64($array) => $body,
        }
    };
}
pub(crate) use for_each_buffer;

impl ImageBuffer {
    pub fn element_type(&self) -> ElementType {
        match self {
            ImageBuffer::F32(_) => ElementType::F32,
            ImageBuffer::F64(_) => ElementType::F64,
            ImageBuffer::I16(_) => ElementType::I16,
            ImageBuffer::U16(_) => ElementType::U16,
            ImageBuffer::I32(_) => ElementType::I32,
            ImageBuffer::U32(_) => ElementType::U32,
            ImageBuffer::I64(_) => ElementType::I64,
            ImageBuffer::U64(_) => ElementType::U64,
        }
    }

    pub fn shape(&self) -> &[usize] {
        for_each_buffer!(self, array => array.shape())
    }

    /// Zero-filled buffer of the given type and shape.
    pub fn zeros(element: ElementType, shape: &[usize]) -> Self {
        let dim = IxDyn(shape);
        match element {
            ElementType::F32 => ImageBuffer::F32(ArrayD::default(dim)),
            ElementType::F64 => ImageBuffer::F64(ArrayD::default(dim)),
            ElementType::I16 => ImageBuffer::I16(ArrayD::default(dim)),
            ElementType::U16 => ImageBuffer::U16(ArrayD::default(dim)),
            ElementType::I32 => ImageBuffer::I32(ArrayD::default(dim)),
            ElementType::U32 => ImageBuffer::U32(ArrayD::default(dim)),
            ElementType::I64 => ImageBuffer::I64(ArrayD::default(dim)),
            ElementType::U64 => ImageBuffer::U64(ArrayD::default(dim)),
        }
    }
}

macro_rules! impl_from_array {
    ($($t:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<ArrayD<$t>> for ImageBuffer {
                fn from(array: ArrayD<$t>) -> Self {
                    ImageBuffer::$variant(array)
                }
            }
        )*
    };
}

impl_from_array!(
    f32 => F32,
    f64 => F64,
    i16 => I16,
    u16 => U16,
    i32 => I32,
    u32 => U32,
    i64 => I64,
    u64 => U64,
);
