//! Promotion rules between CPU arrays and scalars
//!
//! Scalars meeting an array become rank-0 arrays. Floating-point arrays keep
//! their precision; integer and boolean arrays widen to the smallest dtype that
//! holds the scalar. Two arrays of different dtypes meet at
//! [`dtype::promote`](crate::dtype::promote).

use super::creation::scalar_array;
use crate::dispatch::{PromotionRule, Registrar};
use crate::dtype::{DType, promote};
use crate::error::Result;
use crate::runtime::cpu::array::{CpuElement, CpuView};
use crate::types::{BOOL, FLOAT, INT, TypeTag, Value};

const ARRAYS: [DType; 4] = [DType::F64, DType::F32, DType::I64, DType::Bool];

fn tag(dtype: DType) -> TypeTag {
    let concrete = match dtype {
        DType::F64 => f64::TAG,
        DType::F32 => f32::TAG,
        DType::I64 => i64::TAG,
        _ => bool::TAG,
    };
    TypeTag::Concrete(concrete)
}

/// Dtype of an array of `array` combined with a scalar of tag `scalar`
fn with_scalar(array: DType, scalar: &TypeTag) -> DType {
    if array.is_float() {
        return array;
    }
    match (array, scalar) {
        (_, s) if *s == FLOAT => DType::F64,
        (DType::Bool, s) if *s == BOOL => DType::Bool,
        _ => DType::I64,
    }
}

fn to_array(dtype: DType) -> impl Fn(&Value) -> Result<Value> + Send + Sync + 'static {
    move |v| CpuView::of(v, "a")?.cast_value(dtype)
}

fn to_scalar_array(dtype: DType) -> impl Fn(&Value) -> Result<Value> + Send + Sync + 'static {
    move |v| scalar_array(v, dtype)
}

pub(super) fn register(r: &Registrar<'_>) -> Result<()> {
    for array in ARRAYS {
        for scalar in [FLOAT, INT, BOOL] {
            let common = with_scalar(array, &scalar);
            let mut rule = PromotionRule::new(tag(array), scalar, tag(common))
                .convert_right(to_scalar_array(common));
            if common != array {
                rule = rule.convert_left(to_array(common));
            }
            r.promotion(rule)?;
        }
    }

    for (i, &left) in ARRAYS.iter().enumerate() {
        for &right in &ARRAYS[i + 1..] {
            let common = promote(left, right);
            let mut rule = PromotionRule::new(tag(left), tag(right), tag(common));
            if common != left {
                rule = rule.convert_left(to_array(common));
            }
            if common != right {
                rule = rule.convert_right(to_array(common));
            }
            r.promotion(rule)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_dtypes() {
        assert_eq!(with_scalar(DType::F32, &FLOAT), DType::F32);
        assert_eq!(with_scalar(DType::I64, &FLOAT), DType::F64);
        assert_eq!(with_scalar(DType::I64, &BOOL), DType::I64);
        assert_eq!(with_scalar(DType::Bool, &INT), DType::I64);
        assert_eq!(with_scalar(DType::Bool, &BOOL), DType::Bool);
    }
}
