//! Triangular and Cholesky solves, batched over leading axes

use crate::dispatch::{Dispatcher, Kwargs, Registrar, Signature};
use crate::error::{Error, Result};
use crate::types::{NUMERIC, Value};

fn as_isize(dims: &[usize]) -> Vec<isize> {
    dims.iter().map(|&d| d as isize).collect()
}

fn triangular_solve(d: &Dispatcher, a: &Value, b: &Value, lower_a: bool) -> Result<Value> {
    d.invoke(
        "triangular_solve",
        &[a.clone(), b.clone()],
        &Kwargs::new().with("lower_a", lower_a),
    )
}

/// Solve `a x = b` for triangular `a`
///
/// A rank-2 `a` goes straight to the backend's 2-D solve. Otherwise `a` has
/// shape `(*batch, m, m)` and `b` shape `(*batch, m, k)`: every pair of
/// trailing slices is solved independently and the batch shape is kept.
pub fn trisolve(d: &Dispatcher, a: &Value, b: &Value, lower_a: bool) -> Result<Value> {
    let a_shape = d.shape(a)?;
    let rank = a_shape.len();
    if rank < 2 {
        return Err(Error::invalid_rank("trisolve", "a matrix or a batch of matrices", rank));
    }
    if rank == 2 {
        return triangular_solve(d, a, b, lower_a);
    }

    let b_shape = d.shape(b)?;
    if b_shape.len() != rank || b_shape[..rank - 2] != a_shape[..rank - 2] {
        return Err(Error::shape_mismatch(&a_shape, &b_shape));
    }
    let batch: usize = a_shape[..rank - 2].iter().product();
    if batch == 0 {
        return Ok(b.clone());
    }

    let m = a_shape[rank - 1] as isize;
    let k = b_shape[rank - 1] as isize;
    let a_slices = d.unstack(d.reshape(a, &[batch as isize, a_shape[rank - 2] as isize, m])?, 0)?;
    let b_slices = d.unstack(d.reshape(b, &[batch as isize, b_shape[rank - 2] as isize, k])?, 0)?;

    let solved = a_slices
        .iter()
        .zip(&b_slices)
        .map(|(a, b)| triangular_solve(d, a, b, lower_a))
        .collect::<Result<Vec<_>>>()?;
    d.reshape(d.stack(&solved, 0)?, &as_isize(&b_shape))
}

/// Solve `L Lᵀ x = b` given the lower Cholesky factor `L`
pub fn cholesky_solve(d: &Dispatcher, chol: &Value, b: &Value) -> Result<Value> {
    let y = trisolve(d, chol, b, true)?;
    trisolve(d, &d.transpose(chol)?, &y, false)
}

pub(super) fn register(r: &Registrar<'_>) -> Result<()> {
    let two = || Signature::new([NUMERIC, NUMERIC]);
    r.register("trisolve", two(), |d, args, kw| {
        trisolve(d, &args[0], &args[1], kw.bool_or("lower_a", true)?)
    })?;
    r.register("cholesky_solve", two(), |d, args, _| {
        cholesky_solve(d, &args[0], &args[1])
    })?;
    Ok(())
}
