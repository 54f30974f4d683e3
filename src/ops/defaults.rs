//! Implementations every backend inherits
//!
//! Registered above the backends in the lattice (`Number`, `Numeric` and
//! `DType` level), so a backend registration for its own concrete tags always
//! takes precedence.

use crate::dispatch::{BackendAdapter, Dispatcher, Kwargs, Registrar, Signature};
use crate::error::{Error, Result};
use crate::tensor::normalize_dim;
use crate::types::{DTYPE, INT, NUMERIC, Value, number};

use super::split_draw;

/// Adapter registering the inherited defaults
#[derive(Copy, Clone, Debug, Default)]
pub struct Defaults;

impl BackendAdapter for Defaults {
    fn name(&self) -> &str {
        "defaults"
    }

    fn register(&self, r: &Registrar<'_>) -> Result<()> {
        register_structural(r)?;
        register_activations(r)?;
        register_scalars(r)?;
        register_implicit_draws(r)?;
        Ok(())
    }
}

fn unary() -> Signature {
    Signature::new([NUMERIC])
}

// ============================================================================
// Structural defaults
// ============================================================================

fn register_structural(r: &Registrar<'_>) -> Result<()> {
    r.register("trace", unary(), trace)?;

    r.register("outer", Signature::new([NUMERIC, NUMERIC]), |d, args, _| {
        for arg in args {
            let rank = d.rank(arg)?;
            if rank != 1 {
                return Err(Error::invalid_rank("outer", "rank-1 operands", rank));
            }
        }
        let column = d.expand_dims(&args[0], -1)?;
        let row = d.expand_dims(&args[1], 0)?;
        d.multiply(column, row)
    })?;
    r.register("outer", unary(), |d, args, _| {
        d.call("outer", &[args[0].clone(), args[0].clone()])
    })?;

    r.register("flatten", unary(), |d, args, _| d.reshape(&args[0], &[-1]))?;
    r.register("isscalar", unary(), |d, args, _| {
        Ok(Value::Bool(d.rank(&args[0])? == 0))
    })?;
    r.register("uprank", unary(), |d, args, _| {
        let mut a = args[0].clone();
        let rank = d.rank(&a)?;
        if rank > 2 {
            return Err(Error::invalid_rank("uprank", "rank at most 2", rank));
        }
        for _ in rank..2 {
            a = d.expand_dims(a, -1)?;
        }
        Ok(a)
    })?;

    for name in ["zeros", "ones", "eye"] {
        r.register(name, unary(), move |d, args, _| {
            let dtype = d.dtype(&args[0])?;
            let mut call_args = vec![Value::from(dtype)];
            call_args.extend(super::shape_args(&d.shape(&args[0])?));
            d.call(name, &call_args)
        })?;
    }
    Ok(())
}

/// Trace over `axis1`/`axis2` by moving both axes to the front
fn trace(d: &Dispatcher, args: &[Value], kw: &Kwargs) -> Result<Value> {
    let axis1 = kw.int_or("axis1", 0)? as isize;
    let axis2 = kw.int_or("axis2", 1)? as isize;
    if axis1 == axis2 {
        return Err(Error::invalid_argument(
            "axis2",
            format!("trace axes must differ, got {axis1} twice"),
        ));
    }

    let a = &args[0];
    let rank = d.rank(a)?;
    let first = normalize_dim(axis1, rank)?;
    let second = normalize_dim(axis2, rank)?;
    if first == second {
        return Err(Error::invalid_argument(
            "axis2",
            format!("trace axes {axis1} and {axis2} refer to the same axis"),
        ));
    }
    let (first, second) = (first.min(second), first.max(second));

    if (first, second) == (0, 1) {
        return d.call("trace_leading", &[a.clone()]);
    }
    let perm: Vec<usize> = [first, second]
        .into_iter()
        .chain((0..rank).filter(|&i| i != first && i != second))
        .collect();
    let permuted = d.permute(a, &perm)?;
    d.call("trace_leading", &[permuted])
}

// ============================================================================
// Activations
// ============================================================================

fn register_activations(r: &Registrar<'_>) -> Result<()> {
    r.register("sigmoid", unary(), |d, args, _| {
        let e = d.exp(d.negative(&args[0])?)?;
        d.divide(1.0, d.add(1.0, e)?)
    })?;
    r.register("relu", unary(), |d, args, _| d.maximum(&args[0], 0))?;
    r.register("softplus", unary(), |d, args, _| {
        let a = &args[0];
        let tail = d.log(d.add(1.0, d.exp(d.negative(d.abs(a)?)?)?)?)?;
        d.add(tail, d.maximum(a, 0)?)
    })?;
    Ok(())
}

// ============================================================================
// Scalar implementations
// ============================================================================

/// Integer view of an int or bool scalar
fn as_integer(v: &Value) -> Option<i64> {
    match v {
        Value::Int(i) => Some(*i),
        Value::Bool(b) => Some(i64::from(*b)),
        _ => None,
    }
}

fn scalar_unary(
    r: &Registrar<'_>,
    name: &str,
    int_op: Option<fn(i64) -> i64>,
    float_op: fn(f64) -> f64,
) -> Result<()> {
    r.register(name, Signature::new([number()]), move |_, args, _| {
        let a = &args[0];
        match (int_op, as_integer(a)) {
            (Some(op), Some(i)) => Ok(Value::Int(op(i))),
            _ => Ok(Value::Float(float_op(a.expect_f64("a")?))),
        }
    })?;
    Ok(())
}

fn scalar_binary(
    r: &Registrar<'_>,
    name: &str,
    int_op: Option<fn(i64, i64) -> Option<i64>>,
    float_op: fn(f64, f64) -> f64,
) -> Result<()> {
    r.register(
        name,
        Signature::new([number(), number()]),
        move |_, args, _| {
            let (a, b) = (&args[0], &args[1]);
            if let (Some(op), Some(x), Some(y)) = (int_op, as_integer(a), as_integer(b)) {
                if let Some(v) = op(x, y) {
                    return Ok(Value::Int(v));
                }
            }
            Ok(Value::Float(float_op(a.expect_f64("a")?, b.expect_f64("b")?)))
        },
    )?;
    Ok(())
}

fn scalar_compare(r: &Registrar<'_>, name: &str, op: fn(f64, f64) -> bool) -> Result<()> {
    r.register(
        name,
        Signature::new([number(), number()]),
        move |_, args, _| Ok(Value::Bool(op(args[0].expect_f64("a")?, args[1].expect_f64("b")?))),
    )?;
    Ok(())
}

fn integer_power(base: i64, exp: i64) -> Option<i64> {
    u32::try_from(exp).ok().and_then(|e| base.checked_pow(e))
}

fn register_scalars(r: &Registrar<'_>) -> Result<()> {
    scalar_unary(r, "negative", Some(i64::wrapping_neg), |x: f64| -x)?;
    scalar_unary(r, "abs", Some(i64::wrapping_abs), f64::abs)?;
    scalar_unary(r, "sign", Some(i64::signum), |x: f64| {
        if x == 0.0 || x.is_nan() { x } else { x.signum() }
    })?;
    scalar_unary(r, "sqrt", None, f64::sqrt)?;
    scalar_unary(r, "exp", None, f64::exp)?;
    scalar_unary(r, "log", None, f64::ln)?;
    scalar_unary(r, "sin", None, f64::sin)?;
    scalar_unary(r, "cos", None, f64::cos)?;
    scalar_unary(r, "tan", None, f64::tan)?;
    scalar_unary(r, "tanh", None, f64::tanh)?;

    scalar_binary(r, "add", Some(i64::checked_add), |x: f64, y: f64| x + y)?;
    scalar_binary(r, "subtract", Some(i64::checked_sub), |x: f64, y: f64| x - y)?;
    scalar_binary(r, "multiply", Some(i64::checked_mul), |x: f64, y: f64| x * y)?;
    scalar_binary(r, "divide", None, |x: f64, y: f64| x / y)?;
    scalar_binary(r, "power", Some(integer_power), f64::powf)?;
    scalar_binary(r, "minimum", Some(|x: i64, y: i64| Some(x.min(y))), f64::min)?;
    scalar_binary(r, "maximum", Some(|x: i64, y: i64| Some(x.max(y))), f64::max)?;

    scalar_compare(r, "lt", |x: f64, y: f64| x < y)?;
    scalar_compare(r, "le", |x: f64, y: f64| x <= y)?;
    scalar_compare(r, "gt", |x: f64, y: f64| x > y)?;
    scalar_compare(r, "ge", |x: f64, y: f64| x >= y)?;

    let scalar = || Signature::new([number()]);
    r.register("shape", scalar(), |_, _, _| Ok(Value::List(Vec::new())))?;
    r.register("rank", scalar(), |_, _, _| Ok(Value::Int(0)))?;
    Ok(())
}

// ============================================================================
// Implicit-state random draws
// ============================================================================

/// Resolve the default state for `dtype`, draw, and drop the returned handle
fn draw_with_default(d: &Dispatcher, name: &str, args: &[Value], kw: &Kwargs) -> Result<Value> {
    let dtype = args[0].expect_dtype("dtype")?;
    let state = d.global_random_state(dtype)?;
    let mut explicit = Vec::with_capacity(args.len() + 1);
    explicit.push(Value::State(state));
    explicit.extend_from_slice(args);
    let (_, result) = split_draw(d.invoke(name, &explicit, kw)?)?;
    Ok(result)
}

fn register_implicit_draws(r: &Registrar<'_>) -> Result<()> {
    for name in ["rand", "randn", "randint"] {
        r.register(
            name,
            Signature::new([DTYPE]).variadic(INT),
            move |d, args, kw| draw_with_default(d, name, args, kw),
        )?;
    }
    r.register("randperm", Signature::new([DTYPE, INT]), |d, args, kw| {
        draw_with_default(d, "randperm", args, kw)
    })?;
    r.register("choice", Signature::new([NUMERIC, INT]), |d, args, kw| {
        let state = d.global_random_state(d.dtype(&args[0])?)?;
        let explicit = [Value::State(state), args[0].clone(), args[1].clone()];
        let (_, result) = split_draw(d.invoke("choice", &explicit, kw)?)?;
        Ok(result)
    })?;
    Ok(())
}
