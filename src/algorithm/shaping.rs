//! Triangular packing, axis-wise take and block assembly

use crate::dispatch::{Dispatcher, Registrar, Signature};
use crate::error::{Error, Result};
use crate::tensor::{normalize_dim, triangular_side};
use crate::types::{ANY, NUMERIC, Value, list_of};

fn index_list(indices: impl IntoIterator<Item = usize>) -> Value {
    Value::List(indices.into_iter().map(Value::from).collect())
}

/// `m × m` lower-triangular matrix from `m (m + 1) / 2` packed entries
///
/// Entries fill the lower triangle row by row, diagonal included; the strict
/// upper triangle is zero.
pub fn vec_to_tril(d: &Dispatcher, a: &Value) -> Result<Value> {
    let rank = d.rank(a)?;
    if rank != 1 {
        return Err(Error::invalid_rank("vec_to_tril", "a rank-1 input", rank));
    }
    let n = d.length(a)?;
    let m = triangular_side(n).ok_or_else(|| {
        Error::invalid_shape("vec_to_tril", format!("length {n} is not a triangular number"))
    })?;

    // Position `n` of the padded vector holds the zero for the upper triangle.
    let padded = d.concat(&[a.clone(), d.zeros(d.dtype(a)?, &[1])?], 0)?;
    let gather = (0..m).flat_map(|i| (0..m).map(move |j| if j <= i { i * (i + 1) / 2 + j } else { n }));
    let flat = d.call("take_leading", &[padded, index_list(gather)])?;
    d.reshape(flat, &[m as isize, m as isize])
}

/// Packed lower-triangular entries of a square matrix, row by row
pub fn tril_to_vec(d: &Dispatcher, a: &Value) -> Result<Value> {
    let shape = d.shape(a)?;
    if shape.len() != 2 {
        return Err(Error::invalid_rank("tril_to_vec", "a rank-2 input", shape.len()));
    }
    if shape[0] != shape[1] {
        return Err(Error::invalid_shape(
            "tril_to_vec",
            format!("matrix must be square, got {shape:?}"),
        ));
    }
    let m = shape[0];
    let gather = (0..m).flat_map(|i| (0..=i).map(move |j| i * m + j));
    d.call("take_leading", &[d.flatten(a)?, index_list(gather)])
}

/// Select along `axis` by moving it to the front, taking, and moving it back
pub fn take(d: &Dispatcher, a: &Value, indices: &Value, axis: isize) -> Result<Value> {
    if !matches!(indices, Value::List(_)) {
        let rank = d.rank(indices)?;
        if rank != 1 {
            return Err(Error::invalid_rank("take", "rank-1 indices or mask", rank));
        }
    }
    let rank = d.rank(a)?;
    let axis = normalize_dim(axis, rank)?;
    if axis == 0 {
        return d.call("take_leading", &[a.clone(), indices.clone()]);
    }

    let mut perm: Vec<usize> = (0..rank).collect();
    perm.swap(0, axis);
    let front = d.permute(a, &perm)?;
    let taken = d.call("take_leading", &[front, indices.clone()])?;
    d.permute(taken, &perm)
}

/// Block matrix from a list of rows of blocks
pub fn concat2d(d: &Dispatcher, rows: &[Value]) -> Result<Value> {
    let joined = rows
        .iter()
        .map(|row| d.concat(row.expect_list("rows")?, 1))
        .collect::<Result<Vec<_>>>()?;
    d.concat(&joined, 0)
}

pub(super) fn register(r: &Registrar<'_>) -> Result<()> {
    r.register("vec_to_tril", Signature::new([NUMERIC]), |d, args, _| {
        vec_to_tril(d, &args[0])
    })?;
    r.register("tril_to_vec", Signature::new([NUMERIC]), |d, args, _| {
        tril_to_vec(d, &args[0])
    })?;
    r.register("take", Signature::new([NUMERIC, ANY]), |d, args, kw| {
        take(d, &args[0], &args[1], kw.int_or("axis", 0)? as isize)
    })?;
    r.register("concat2d", Signature::new([list_of(ANY)]), |d, args, _| {
        concat2d(d, args[0].expect_list("rows")?)
    })?;
    Ok(())
}
