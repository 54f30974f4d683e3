//! Dtype queries, casts and array creation

use super::{DTYPE, any_array, view};
use crate::dispatch::{Registrar, Signature};
use crate::dtype::DType;
use crate::error::{Error, Result};
use crate::runtime::cpu::{self, CpuArray, CpuElement};
use crate::tensor::Shape;
use crate::types::{BOOL, FLOAT, INT, Value, number};

pub(super) fn register(r: &Registrar<'_>) -> Result<()> {
    r.register("dtype", any_array(), |_, args, _| {
        Ok(cpu::dtype(view(args, 0)?.dtype()).into())
    })?;
    r.register("dtype", Signature::new([FLOAT]), |_, _, _| Ok(cpu::FLOAT64.into()))?;
    r.register("dtype", Signature::new([INT]), |_, _, _| Ok(cpu::INT64.into()))?;
    r.register("dtype", Signature::new([BOOL]), |_, _, _| Ok(cpu::BOOL.into()))?;

    r.register("cast", Signature::new([DTYPE, cpu::tags::array()]), |_, args, _| {
        let dtype = args[0].expect_dtype("dtype")?.dtype;
        view(args, 1)?.cast_value(dtype)
    })?;
    r.register("cast", Signature::new([DTYPE, number()]), |_, args, _| {
        scalar_array(&args[1], args[0].expect_dtype("dtype")?.dtype)
    })?;

    for (name, one) in [("zeros", false), ("ones", true)] {
        r.register(name, Signature::new([DTYPE]).variadic(INT), move |_, args, _| {
            let dtype = args[0].expect_dtype("dtype")?.dtype;
            filled(dtype, shape_of(&args[1..])?, one)
        })?;
        r.register(name, Signature::varargs(INT), move |_, args, _| {
            filled(DType::default_float(), shape_of(args)?, one)
        })?;
    }
    r.register("eye", Signature::new([DTYPE]).variadic(INT), |_, args, _| {
        eye(args[0].expect_dtype("dtype")?.dtype, &args[1..])
    })?;
    r.register("eye", Signature::varargs(INT), |_, args, _| {
        eye(DType::default_float(), args)
    })?;
    Ok(())
}

fn shape_of(dims: &[Value]) -> Result<Shape> {
    dims.iter().map(|d| d.expect_usize("shape")).collect()
}

/// Rank-0 array of `dtype` holding the scalar `v`
pub(super) fn scalar_array(v: &Value, dtype: DType) -> Result<Value> {
    Ok(match dtype {
        DType::F64 => CpuArray::scalar(v.expect_f64("scalar")?).into_value(),
        DType::F32 => CpuArray::scalar(v.expect_f64("scalar")? as f32).into_value(),
        DType::I64 => {
            let i = match v {
                Value::Int(i) => *i,
                other => other.expect_f64("scalar")? as i64,
            };
            CpuArray::scalar(i).into_value()
        }
        DType::Bool => CpuArray::scalar(v.expect_f64("scalar")? != 0.0).into_value(),
    })
}

fn filled(dtype: DType, shape: Shape, one: bool) -> Result<Value> {
    fn full<T: CpuElement>(shape: Shape, one: bool) -> Value {
        CpuArray::full(shape, if one { T::ONE } else { T::ZERO }).into_value()
    }
    Ok(match dtype {
        DType::F64 => full::<f64>(shape, one),
        DType::F32 => full::<f32>(shape, one),
        DType::I64 => full::<i64>(shape, one),
        DType::Bool => full::<bool>(shape, one),
    })
}

/// `n × m` identity (`m` defaults to `n`)
fn eye(dtype: DType, dims: &[Value]) -> Result<Value> {
    let (n, m) = match dims {
        [n] => (n.expect_usize("n")?, n.expect_usize("n")?),
        [n, m] => (n.expect_usize("n")?, m.expect_usize("m")?),
        _ => {
            return Err(Error::invalid_argument(
                "shape",
                format!("eye takes one or two dimensions, got {}", dims.len()),
            ));
        }
    };
    fn identity<T: CpuElement>(n: usize, m: usize) -> Value {
        let mut data = vec![T::ZERO; n * m];
        for i in 0..n.min(m) {
            data[i * m + i] = T::ONE;
        }
        CpuArray::from_parts(Shape::from([n, m]), data).into_value()
    }
    Ok(match dtype {
        DType::F64 => identity::<f64>(n, m),
        DType::F32 => identity::<f32>(n, m),
        DType::I64 => identity::<i64>(n, m),
        DType::Bool => identity::<bool>(n, m),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_eye_rectangular() {
        let v = eye(DType::F64, &[Value::Int(2), Value::Int(3)]).unwrap();
        let a = CpuArray::<f64>::from_value(&v, "a").unwrap();
        assert_eq!(a.data(), &[1.0, 0.0, 0.0, 0.0, 1.0, 0.0]);
        assert!(eye(DType::F64, &[]).is_err());
    }

    #[test]
    fn test_scalar_array_keeps_large_ints() {
        let v = scalar_array(&Value::Int(i64::MAX), DType::I64).unwrap();
        assert_eq!(CpuArray::<i64>::from_value(&v, "a").unwrap().data(), &[i64::MAX]);
    }
}
