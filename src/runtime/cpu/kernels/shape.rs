//! Shape manipulation: permutation, stacking, indexing, Kronecker products

use super::{gather_offsets, split_at_axis, Strides};
use crate::error::{Error, Result};
use crate::runtime::cpu::array::{CpuArray, CpuElement};
use crate::tensor::{Shape, normalize_dim, normalize_insert_dim};
use num_traits::Num;

/// Permute axes; `perm[i]` is the source axis of output axis `i`
pub(crate) fn permute<T: CpuElement>(a: &CpuArray<T>, perm: &[usize]) -> Result<CpuArray<T>> {
    let ndim = a.ndim();
    let mut seen = vec![false; ndim];
    if perm.len() != ndim || !perm.iter().all(|&p| p < ndim && !std::mem::replace(&mut seen[p], true)) {
        return Err(Error::invalid_argument(
            "perm",
            format!("{perm:?} is not a permutation of {ndim} axes"),
        ));
    }

    let src_strides = a.shape().strides();
    let shape: Shape = perm.iter().map(|&p| a.shape()[p]).collect();
    let strides: Strides = perm.iter().map(|&p| src_strides[p]).collect();
    let data = gather_offsets(&shape, &strides)
        .into_iter()
        .map(|i| a.data()[i])
        .collect();
    Ok(CpuArray::from_parts(shape, data))
}

/// Swap the last two axes
pub(crate) fn transpose<T: CpuElement>(a: &CpuArray<T>) -> Result<CpuArray<T>> {
    let ndim = a.ndim();
    if ndim < 2 {
        return Ok(a.clone());
    }
    let mut perm: Vec<usize> = (0..ndim).collect();
    perm.swap(ndim - 2, ndim - 1);
    permute(a, &perm)
}

/// Reshape; at most one entry of `dims` may be `-1`
pub(crate) fn reshape<T: CpuElement>(a: &CpuArray<T>, dims: &[i64]) -> Result<CpuArray<T>> {
    let invalid = |reason: String| Error::invalid_shape("reshape", reason);
    let mut inferred = None;
    let mut known = 1usize;
    for (i, &d) in dims.iter().enumerate() {
        match d {
            -1 if inferred.is_none() => inferred = Some(i),
            -1 => return Err(invalid(format!("more than one -1 in {dims:?}"))),
            d if d < 0 => return Err(invalid(format!("negative dimension in {dims:?}"))),
            d => known *= d as usize,
        }
    }

    let mut shape: Shape = dims.iter().map(|&d| d.max(0) as usize).collect();
    if let Some(i) = inferred {
        if known == 0 || a.numel() % known != 0 {
            return Err(invalid(format!("cannot infer -1 in {dims:?} for {} elements", a.numel())));
        }
        shape[i] = a.numel() / known;
    }
    if shape.numel() != a.numel() {
        return Err(invalid(format!(
            "cannot reshape {:?} into {dims:?}",
            a.shape()
        )));
    }
    Ok(a.clone().with_shape(shape))
}

pub(crate) fn expand_dims<T: CpuElement>(a: &CpuArray<T>, axis: isize) -> Result<CpuArray<T>> {
    let axis = normalize_insert_dim(axis, a.ndim())?;
    let mut shape = a.shape().clone();
    shape.insert(axis, 1);
    Ok(a.clone().with_shape(shape))
}

pub(crate) fn squeeze<T: CpuElement>(a: &CpuArray<T>) -> CpuArray<T> {
    let shape: Shape = a.shape().iter().copied().filter(|&d| d != 1).collect();
    a.clone().with_shape(shape)
}

/// Diagonal of a matrix, or the diagonal matrix of a vector
pub(crate) fn diag<T: CpuElement>(a: &CpuArray<T>) -> Result<CpuArray<T>> {
    match a.shape().as_slice() {
        &[n] => {
            let mut data = vec![T::ZERO; n * n];
            for (i, &x) in a.data().iter().enumerate() {
                data[i * n + i] = x;
            }
            Ok(CpuArray::from_parts(Shape::from([n, n]), data))
        }
        &[rows, cols] => {
            let data = (0..rows.min(cols)).map(|i| a.data()[i * cols + i]).collect();
            Ok(CpuArray::from_vec(data))
        }
        _ => Err(Error::invalid_rank("diag", "a rank-1 or rank-2 input", a.ndim())),
    }
}

/// Sum of `a[i, i, ...]` over the first two axes
pub(crate) fn trace_leading<T: CpuElement + Num>(a: &CpuArray<T>) -> Result<CpuArray<T>> {
    if a.ndim() < 2 {
        return Err(Error::invalid_rank("trace", "rank at least 2", a.ndim()));
    }
    let (rows, cols) = (a.shape()[0], a.shape()[1]);
    let shape: Shape = a.shape()[2..].iter().copied().collect();
    let inner = shape.numel();
    let data = (0..inner)
        .map(|r| {
            (0..rows.min(cols)).fold(T::zero(), |acc, i| acc + a.data()[(i * cols + i) * inner + r])
        })
        .collect();
    Ok(CpuArray::from_parts(shape, data))
}

/// Kronecker product; the lower-rank operand gets leading unit axes
pub(crate) fn kron<T: CpuElement + Num>(a: &CpuArray<T>, b: &CpuArray<T>) -> CpuArray<T> {
    let ndim = a.ndim().max(b.ndim());
    let pad = |s: &Shape| -> Shape {
        std::iter::repeat_n(1, ndim - s.ndim()).chain(s.iter().copied()).collect()
    };
    let (sa, sb) = (pad(a.shape()), pad(b.shape()));
    let shape: Shape = sa.iter().zip(sb.iter()).map(|(x, y)| x * y).collect();
    let (stride_a, stride_b) = (sa.strides(), sb.strides());

    let mut index: Strides = smallvec::SmallVec::from_elem(0, ndim);
    let mut data = Vec::with_capacity(shape.numel());
    for _ in 0..shape.numel() {
        let (mut ia, mut ib) = (0, 0);
        for axis in 0..ndim {
            ia += index[axis] / sb[axis] * stride_a[axis];
            ib += index[axis] % sb[axis] * stride_b[axis];
        }
        data.push(a.data()[ia] * b.data()[ib]);
        for axis in (0..ndim).rev() {
            index[axis] += 1;
            if index[axis] < shape[axis] {
                break;
            }
            index[axis] = 0;
        }
    }
    CpuArray::from_parts(shape, data)
}

/// Join equally shaped arrays along a new axis
pub(crate) fn stack<T: CpuElement>(arrays: &[&CpuArray<T>], axis: isize) -> Result<CpuArray<T>> {
    let first = arrays
        .first()
        .ok_or_else(|| Error::invalid_argument("arrays", "stack needs at least one array"))?;
    let axis = normalize_insert_dim(axis, first.ndim())?;
    for a in arrays {
        if a.shape() != first.shape() {
            return Err(Error::shape_mismatch(first.shape(), a.shape()));
        }
    }

    let outer: usize = first.shape()[..axis].iter().product();
    let chunk: usize = first.shape()[axis..].iter().product();
    let mut data = Vec::with_capacity(first.numel() * arrays.len());
    for o in 0..outer {
        for a in arrays {
            data.extend_from_slice(&a.data()[o * chunk..(o + 1) * chunk]);
        }
    }
    let mut shape = first.shape().clone();
    shape.insert(axis, arrays.len());
    Ok(CpuArray::from_parts(shape, data))
}

/// Join arrays along an existing axis
pub(crate) fn concat<T: CpuElement>(arrays: &[&CpuArray<T>], axis: isize) -> Result<CpuArray<T>> {
    let first = arrays
        .first()
        .ok_or_else(|| Error::invalid_argument("arrays", "concat needs at least one array"))?;
    let axis = normalize_dim(axis, first.ndim())?;
    let mut total = 0;
    for a in arrays {
        let compatible = a.ndim() == first.ndim()
            && a.shape().iter().zip(first.shape().iter()).enumerate().all(|(i, (x, y))| i == axis || x == y);
        if !compatible {
            return Err(Error::shape_mismatch(first.shape(), a.shape()));
        }
        total += a.shape()[axis];
    }

    let outer: usize = first.shape()[..axis].iter().product();
    let inner: usize = first.shape()[axis + 1..].iter().product();
    let mut data = Vec::with_capacity(outer * total * inner);
    for o in 0..outer {
        for a in arrays {
            let chunk = a.shape()[axis] * inner;
            data.extend_from_slice(&a.data()[o * chunk..(o + 1) * chunk]);
        }
    }
    let mut shape = first.shape().clone();
    shape[axis] = total;
    Ok(CpuArray::from_parts(shape, data))
}

/// Slices of `a` along `axis`, each one rank lower
pub(crate) fn unstack<T: CpuElement>(a: &CpuArray<T>, axis: isize) -> Result<Vec<CpuArray<T>>> {
    let axis = normalize_dim(axis, a.ndim())?;
    let (outer, len, inner) = split_at_axis(a.shape(), axis);
    let mut shape = a.shape().clone();
    shape.remove(axis);

    Ok((0..len)
        .map(|j| {
            let mut data = Vec::with_capacity(outer * inner);
            for o in 0..outer {
                let start = (o * len + j) * inner;
                data.extend_from_slice(&a.data()[start..start + inner]);
            }
            CpuArray::from_parts(shape.clone(), data)
        })
        .collect())
}

/// Rows `indices` of the leading axis, in order, repeats allowed
pub(crate) fn take_rows<T: CpuElement>(a: &CpuArray<T>, indices: &[usize]) -> Result<CpuArray<T>> {
    if a.ndim() == 0 {
        return Err(Error::invalid_rank("take", "rank at least 1", 0));
    }
    let len = a.shape()[0];
    let row: usize = a.shape()[1..].iter().product();
    let mut data = Vec::with_capacity(indices.len() * row);
    for &i in indices {
        if i >= len {
            return Err(Error::invalid_argument(
                "indices",
                format!("index {i} out of bounds for axis of length {len}"),
            ));
        }
        data.extend_from_slice(&a.data()[i * row..(i + 1) * row]);
    }
    let mut shape = a.shape().clone();
    shape[0] = indices.len();
    Ok(CpuArray::from_parts(shape, data))
}

/// Normalise possibly negative indices against an axis of length `len`
pub(crate) fn resolve_indices(indices: &[i64], len: usize) -> Result<Vec<usize>> {
    indices
        .iter()
        .map(|&i| {
            let resolved = if i < 0 { i + len as i64 } else { i };
            usize::try_from(resolved)
                .ok()
                .filter(|&r| r < len)
                .ok_or_else(|| {
                    Error::invalid_argument(
                        "indices",
                        format!("index {i} out of bounds for axis of length {len}"),
                    )
                })
        })
        .collect()
}

/// Positions of the true entries of a mask over an axis of length `len`
pub(crate) fn mask_indices(mask: &[bool], len: usize) -> Result<Vec<usize>> {
    if mask.len() != len {
        return Err(Error::shape_mismatch(&[len], &[mask.len()]));
    }
    Ok(mask.iter().enumerate().filter_map(|(i, &m)| m.then_some(i)).collect())
}
