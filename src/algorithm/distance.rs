//! Pairwise and elementwise distances and sums between rows

use crate::dispatch::{Dispatcher, Registrar, Signature};
use crate::error::{Error, Result};
use crate::types::{NUMERIC, Value};

/// Floor applied after every square root in this module
///
/// Keeps the gradient of the square root finite at exactly coinciding points.
pub const SQRT_FLOOR: f64 = 1e-30;

/// Squared row norms of `a` with a unit axis inserted at `axis`
fn row_norms2(d: &Dispatcher, a: &Value, axis: isize) -> Result<Value> {
    let norms = d.sum(d.multiply(a, a)?, Some(1))?;
    d.expand_dims(norms, axis)
}

fn pairwise2(d: &Dispatcher, a: &Value, b: &Value, cross_sign: f64) -> Result<Value> {
    let a = d.uprank(a)?;
    let b = d.uprank(b)?;
    let norms = d.add(row_norms2(d, &a, -1)?, row_norms2(d, &b, 0)?)?;
    let cross = d.matmul_tr(&a, &b, false, true)?;
    d.add(norms, d.multiply(2.0 * cross_sign, cross)?)
}

fn elementwise2(d: &Dispatcher, a: &Value, b: &Value, combined: Value) -> Result<Value> {
    let (a_shape, b_shape) = (d.shape(a)?, d.shape(b)?);
    if a_shape != b_shape {
        return Err(Error::shape_mismatch(&a_shape, &b_shape));
    }
    let combined = d.uprank(combined)?;
    row_norms2(d, &combined, -1)
}

fn floored_sqrt(d: &Dispatcher, squared: Value) -> Result<Value> {
    d.maximum(d.sqrt(squared)?, SQRT_FLOOR)
}

fn pw_dists2(d: &Dispatcher, a: &Value, b: &Value) -> Result<Value> {
    pairwise2(d, a, b, -1.0)
}

fn pw_sums2(d: &Dispatcher, a: &Value, b: &Value) -> Result<Value> {
    pairwise2(d, a, b, 1.0)
}

fn ew_dists2(d: &Dispatcher, a: &Value, b: &Value) -> Result<Value> {
    elementwise2(d, a, b, d.subtract(a, b)?)
}

fn ew_sums2(d: &Dispatcher, a: &Value, b: &Value) -> Result<Value> {
    elementwise2(d, a, b, d.add(a, b)?)
}

type Routine = fn(&Dispatcher, &Value, &Value) -> Result<Value>;

/// Register a squared routine, its square-rooted variant, and one-argument forms
fn register_family(r: &Registrar<'_>, name: &'static str, rooted: &'static str, f: Routine) -> Result<()> {
    let two = || Signature::new([NUMERIC, NUMERIC]);
    let one = || Signature::new([NUMERIC]);

    r.register(name, two(), move |d, args, _| f(d, &args[0], &args[1]))?;
    r.register(name, one(), move |d, args, _| f(d, &args[0], &args[0]))?;
    r.register(rooted, two(), move |d, args, _| {
        floored_sqrt(d, d.call(name, &[args[0].clone(), args[1].clone()])?)
    })?;
    r.register(rooted, one(), move |d, args, _| {
        floored_sqrt(d, d.call(name, &[args[0].clone(), args[0].clone()])?)
    })?;
    Ok(())
}

pub(super) fn register(r: &Registrar<'_>) -> Result<()> {
    register_family(r, "pw_dists2", "pw_dists", pw_dists2)?;
    register_family(r, "pw_sums2", "pw_sums", pw_sums2)?;
    register_family(r, "ew_dists2", "ew_dists", ew_dists2)?;
    register_family(r, "ew_sums2", "ew_sums", ew_sums2)?;
    Ok(())
}
