//! Data type system for numlab arrays
//!
//! This module provides the `DType` enum describing the element type of an
//! array independently of the backend that stores it, along with dtype-level
//! promotion rules that backends use to build their promotion tables.

mod element;
mod promotion;

pub use element::Element;
pub use promotion::promote;

use std::fmt;

// ============================================================================
// DType Enum
// ============================================================================

/// Element types understood by the dispatch layer
///
/// Backends tag their dtype values with their own concrete type tag (see
/// [`crate::types::DTypeValue`]); this enum is the backend-neutral part.
///
/// Variants are ordered by promotion rank: `Bool < I64 < F32 < F64`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DType {
    /// Boolean
    Bool,
    /// 64-bit signed integer
    I64,
    /// 32-bit floating point
    F32,
    /// 64-bit floating point
    F64,
}

impl DType {
    /// Whether this is a floating point type
    #[inline]
    pub const fn is_float(self) -> bool {
        matches!(self, Self::F64 | Self::F32)
    }

    /// Whether this is a signed integer type
    #[inline]
    pub const fn is_int(self) -> bool {
        matches!(self, Self::I64)
    }

    /// Whether this is the boolean type
    #[inline]
    pub const fn is_bool(self) -> bool {
        matches!(self, Self::Bool)
    }

    /// Integer dtype used for index-valued results (`randint`, `randperm`)
    #[inline]
    pub const fn default_int() -> Self {
        Self::I64
    }

    /// Default float dtype
    #[inline]
    pub const fn default_float() -> Self {
        Self::F64
    }

    /// Short lowercase name
    pub const fn short_name(self) -> &'static str {
        match self {
            Self::F64 => "f64",
            Self::F32 => "f32",
            Self::I64 => "i64",
            Self::Bool => "bool",
        }
    }
}

impl fmt::Display for DType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.short_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dtype_classes() {
        assert!(DType::F32.is_float());
        assert!(!DType::I64.is_float());
        assert!(DType::I64.is_int());
        assert!(DType::Bool.is_bool());
        assert!(!DType::Bool.is_int());
    }

    #[test]
    fn test_display() {
        assert_eq!(DType::F64.to_string(), "f64");
        assert_eq!(DType::Bool.to_string(), "bool");
    }
}
