//! Error types for numlab

use crate::dtype::DType;
use thiserror::Error;

/// Result type alias using numlab's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while resolving or executing an operation
#[derive(Error, Debug)]
pub enum Error {
    /// No registered implementation matches the argument types
    #[error("No implementation of '{function}' for argument types ({types}){}", abstract_note(.declared))]
    NoImplementation {
        /// Function name that was called
        function: String,
        /// Rendered argument type tuple
        types: String,
        /// Whether the function is a declared abstract primitive
        declared: bool,
    },

    /// Promotion unified the arguments but still found no implementation
    #[error("No implementation of '{function}' for argument types ({types}); promotion to ({promoted}) did not match either")]
    Promotion {
        /// Function name that was called
        function: String,
        /// Rendered argument type tuple before promotion
        types: String,
        /// Rendered argument type tuple after promotion
        promoted: String,
    },

    /// Registration attempted after the dispatcher was frozen
    #[error("Cannot register '{function}': dispatcher is frozen")]
    RegistryFrozen {
        /// Function name being registered
        function: String,
    },

    /// Shape mismatch in an operation
    #[error("Shape mismatch: expected {expected:?}, got {got:?}")]
    ShapeMismatch {
        /// Expected shape
        expected: Vec<usize>,
        /// Actual shape
        got: Vec<usize>,
    },

    /// Shapes cannot be broadcast together
    #[error("Cannot broadcast shapes {lhs:?} and {rhs:?}")]
    BroadcastError {
        /// Left-hand side shape
        lhs: Vec<usize>,
        /// Right-hand side shape
        rhs: Vec<usize>,
    },

    /// Operand has the wrong rank
    #[error("'{op}' requires {expected}, got rank {got}")]
    InvalidRank {
        /// The operation name
        op: &'static str,
        /// Description of the accepted ranks
        expected: &'static str,
        /// Actual rank
        got: usize,
    },

    /// Operand shape violates a structural precondition
    #[error("Invalid shape for '{op}': {reason}")]
    InvalidShape {
        /// The operation name
        op: &'static str,
        /// Reason for invalidity
        reason: String,
    },

    /// Invalid dimension index
    #[error("Invalid dimension {dim} for tensor with {ndim} dimensions")]
    InvalidDimension {
        /// The invalid dimension
        dim: isize,
        /// Number of dimensions
        ndim: usize,
    },

    /// Invalid argument provided to an operation
    #[error("Invalid argument '{arg}': {reason}")]
    InvalidArgument {
        /// The argument name
        arg: &'static str,
        /// Reason for invalidity
        reason: String,
    },

    /// A value did not have the runtime type an implementation expected
    #[error("Type mismatch for '{arg}': expected {expected}, got {got}")]
    TypeMismatch {
        /// The argument name
        arg: &'static str,
        /// Expected type description
        expected: &'static str,
        /// Actual type tag
        got: String,
    },

    /// Unsupported dtype for an operation
    #[error("Unsupported dtype {dtype:?} for operation '{op}'")]
    UnsupportedDType {
        /// The unsupported dtype
        dtype: DType,
        /// The operation name
        op: &'static str,
    },

    /// Backend-specific error
    #[error("Backend error: {0}")]
    Backend(String),

    /// Generic internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

fn abstract_note(declared: &bool) -> &'static str {
    if *declared {
        " (abstract primitive)"
    } else {
        ""
    }
}

impl Error {
    /// Create a shape mismatch error
    pub fn shape_mismatch(expected: &[usize], got: &[usize]) -> Self {
        Self::ShapeMismatch {
            expected: expected.to_vec(),
            got: got.to_vec(),
        }
    }

    /// Create a broadcast error
    pub fn broadcast(lhs: &[usize], rhs: &[usize]) -> Self {
        Self::BroadcastError {
            lhs: lhs.to_vec(),
            rhs: rhs.to_vec(),
        }
    }

    /// Create an invalid rank error
    pub fn invalid_rank(op: &'static str, expected: &'static str, got: usize) -> Self {
        Self::InvalidRank { op, expected, got }
    }

    /// Create an invalid shape error
    pub fn invalid_shape(op: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidShape {
            op,
            reason: reason.into(),
        }
    }

    /// Create an invalid argument error
    pub fn invalid_argument(arg: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            arg,
            reason: reason.into(),
        }
    }

    /// Create a type mismatch error
    pub fn type_mismatch(arg: &'static str, expected: &'static str, got: impl ToString) -> Self {
        Self::TypeMismatch {
            arg,
            expected,
            got: got.to_string(),
        }
    }

    /// Create an unsupported dtype error
    pub fn unsupported_dtype(dtype: DType, op: &'static str) -> Self {
        Self::UnsupportedDType { dtype, op }
    }

    /// Whether this error reports a failed resolution
    pub fn is_no_implementation(&self) -> bool {
        matches!(self, Self::NoImplementation { .. } | Self::Promotion { .. })
    }
}
