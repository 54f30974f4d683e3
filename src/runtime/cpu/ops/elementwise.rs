//! Elementwise unary and binary operations
//!
//! Integer arithmetic wraps on overflow. `divide` of integers or booleans
//! produces `f64`; transcendental functions of integers and booleans are
//! evaluated in `f64`. Boolean arithmetic is carried out in `i64`.

use super::{any_array, dtype_mismatch, pair, same_dtype_pairs, view};
use crate::dispatch::Registrar;
use crate::error::{Error, Result};
use crate::runtime::cpu::array::{CpuArray, CpuFloat, CpuView};
use crate::runtime::cpu::kernels::elementwise::binary;
use crate::types::Value;

pub(super) fn register(r: &Registrar<'_>) -> Result<()> {
    register_float_unary(r)?;
    register_signed_unary(r)?;
    register_arithmetic(r)?;
    register_comparisons(r)?;
    Ok(())
}

// ============================================================================
// Unary
// ============================================================================

macro_rules! float_unary {
    ($r:expr, $($name:literal => $method:ident),* $(,)?) => {
        $(
            $r.register($name, any_array(), |_, args, _| {
                Ok(match view(args, 0)? {
                    CpuView::F64(a) => a.map(f64::$method).into_value(),
                    CpuView::F32(a) => a.map(f32::$method).into_value(),
                    other => other.cast::<f64>().map(f64::$method).into_value(),
                })
            })?;
        )*
    };
}

fn register_float_unary(r: &Registrar<'_>) -> Result<()> {
    float_unary!(r,
        "sqrt" => sqrt,
        "exp" => exp,
        "log" => ln,
        "sin" => sin,
        "cos" => cos,
        "tan" => tan,
        "tanh" => tanh,
    );
    Ok(())
}

/// Sign with `sign(0) = 0` and NaN passed through
fn float_sign<T: CpuFloat>(x: T) -> T {
    if x == T::zero() || x.is_nan() { x } else { x.signum() }
}

macro_rules! signed_unary {
    ($r:expr, $($name:literal => float: $float:expr, int: $int:expr;)*) => {
        $(
            $r.register($name, any_array(), |_, args, _| {
                Ok(match view(args, 0)? {
                    CpuView::F64(a) => a.map($float).into_value(),
                    CpuView::F32(a) => a.map($float).into_value(),
                    CpuView::I64(a) => a.map($int).into_value(),
                    CpuView::Bool(a) => a.cast::<i64>().map($int).into_value(),
                })
            })?;
        )*
    };
}

fn register_signed_unary(r: &Registrar<'_>) -> Result<()> {
    signed_unary!(r,
        "negative" => float: |x| -x, int: i64::wrapping_neg;
        "abs" => float: |x| num_traits::Float::abs(x), int: i64::wrapping_abs;
        "sign" => float: float_sign, int: i64::signum;
    );
    Ok(())
}

// ============================================================================
// Binary
// ============================================================================

/// Register a same-dtype binary operation with a float and an integer rule
macro_rules! arithmetic {
    ($r:expr, $name:literal, |$x:ident, $y:ident| float: $float:expr, int: $int:expr) => {
        $r.register_all($name, same_dtype_pairs(), |_, args, _| {
            let out = match pair(args)? {
                (CpuView::F64(a), CpuView::F64(b)) => binary(a, b, |$x: f64, $y: f64| $float)?.into_value(),
                (CpuView::F32(a), CpuView::F32(b)) => binary(a, b, |$x: f32, $y: f32| $float)?.into_value(),
                (CpuView::I64(a), CpuView::I64(b)) => binary(a, b, |$x: i64, $y: i64| $int)?.into_value(),
                (CpuView::Bool(a), CpuView::Bool(b)) => {
                    binary(&a.cast::<i64>(), &b.cast::<i64>(), |$x: i64, $y: i64| $int)?.into_value()
                }
                (a, b) => return Err(dtype_mismatch(&a, &b)),
            };
            Ok(out)
        })?;
    };
}

/// `base^exp` for integers; negative exponents have no integer result
fn int_power(base: &CpuArray<i64>, exp: &CpuArray<i64>) -> Result<Value> {
    if exp.data().iter().any(|&e| e < 0) {
        return Err(Error::invalid_argument(
            "b",
            "integers cannot be raised to negative integer powers",
        ));
    }
    Ok(binary(base, exp, |x, e| x.wrapping_pow(e.min(u32::MAX as i64) as u32))?.into_value())
}

fn register_arithmetic(r: &Registrar<'_>) -> Result<()> {
    arithmetic!(r, "add", |x, y| float: x + y, int: x.wrapping_add(y));
    arithmetic!(r, "subtract", |x, y| float: x - y, int: x.wrapping_sub(y));
    arithmetic!(r, "multiply", |x, y| float: x * y, int: x.wrapping_mul(y));
    arithmetic!(r, "minimum", |x, y| float: x.min(y), int: x.min(y));
    arithmetic!(r, "maximum", |x, y| float: x.max(y), int: x.max(y));

    r.register_all("divide", same_dtype_pairs(), |_, args, _| {
        let out = match pair(args)? {
            (CpuView::F64(a), CpuView::F64(b)) => binary(a, b, |x, y| x / y)?.into_value(),
            (CpuView::F32(a), CpuView::F32(b)) => binary(a, b, |x, y| x / y)?.into_value(),
            (a, b) if a.dtype() == b.dtype() => {
                binary(&a.cast::<f64>(), &b.cast::<f64>(), |x, y| x / y)?.into_value()
            }
            (a, b) => return Err(dtype_mismatch(&a, &b)),
        };
        Ok(out)
    })?;

    r.register_all("power", same_dtype_pairs(), |_, args, _| {
        match pair(args)? {
            (CpuView::F64(a), CpuView::F64(b)) => Ok(binary(a, b, f64::powf)?.into_value()),
            (CpuView::F32(a), CpuView::F32(b)) => Ok(binary(a, b, f32::powf)?.into_value()),
            (CpuView::I64(a), CpuView::I64(b)) => int_power(a, b),
            (CpuView::Bool(a), CpuView::Bool(b)) => int_power(&a.cast(), &b.cast()),
            (a, b) => Err(dtype_mismatch(&a, &b)),
        }
    })?;
    Ok(())
}

macro_rules! comparison {
    ($r:expr, $($name:literal => $op:tt),* $(,)?) => {
        $(
            $r.register_all($name, same_dtype_pairs(), |_, args, _| {
                let out = match pair(args)? {
                    (CpuView::F64(a), CpuView::F64(b)) => binary(a, b, |x, y| x $op y)?,
                    (CpuView::F32(a), CpuView::F32(b)) => binary(a, b, |x, y| x $op y)?,
                    (CpuView::I64(a), CpuView::I64(b)) => binary(a, b, |x, y| x $op y)?,
                    (CpuView::Bool(a), CpuView::Bool(b)) => binary(a, b, |x, y| x $op y)?,
                    (a, b) => return Err(dtype_mismatch(&a, &b)),
                };
                Ok(out.into_value())
            })?;
        )*
    };
}

fn register_comparisons(r: &Registrar<'_>) -> Result<()> {
    comparison!(r,
        "lt" => <,
        "le" => <=,
        "gt" => >,
        "ge" => >=,
    );
    Ok(())
}
