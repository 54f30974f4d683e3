//! Dtype promotion for binary operations

use super::DType;

/// Common dtype of two operands
///
/// The wider of the two wins, with floats above integers and `Bool` at the
/// bottom. Mixing `I64` with `F32` yields `F32`, matching how the CPU
/// backend keeps float precision when an integer operand joins in.
#[inline]
pub fn promote(lhs: DType, rhs: DType) -> DType {
    lhs.max(rhs)
}
