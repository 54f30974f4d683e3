//! Batched matrix multiplication
//!
//! Operands have shape `(*batch, rows, cols)`; batch axes broadcast. Either
//! operand may be read transposed without materialising the transpose.
//! Inner products accumulate from zero in ascending index order, one row of
//! the output per task.

use super::broadcast_offsets;
use crate::error::{Error, Result};
use crate::runtime::cpu::array::{CpuArray, CpuElement};
use crate::tensor::{Shape, broadcast_shape};
use num_traits::Num;

#[cfg(feature = "rayon")]
use rayon::prelude::*;

/// Skip Rayon below this many multiply-adds
#[cfg(feature = "rayon")]
const PARALLEL_THRESHOLD: usize = 1 << 15;

/// `op(a) @ op(b)` where `op` transposes the last two axes when requested
pub(crate) fn matmul<T>(
    a: &CpuArray<T>,
    b: &CpuArray<T>,
    tr_a: bool,
    tr_b: bool,
) -> Result<CpuArray<T>>
where
    T: CpuElement + Num,
{
    if a.ndim() < 2 || b.ndim() < 2 {
        let rank = a.ndim().min(b.ndim());
        return Err(Error::invalid_rank("matmul", "operands of rank at least 2", rank));
    }
    let (ra, ca) = (a.shape()[a.ndim() - 2], a.shape()[a.ndim() - 1]);
    let (rb, cb) = (b.shape()[b.ndim() - 2], b.shape()[b.ndim() - 1]);
    let (m, k) = if tr_a { (ca, ra) } else { (ra, ca) };
    let (kb, n) = if tr_b { (cb, rb) } else { (rb, cb) };
    if k != kb {
        return Err(Error::shape_mismatch(&[m, k], &[kb, n]));
    }

    let a_batch = &a.shape()[..a.ndim() - 2];
    let b_batch = &b.shape()[..b.ndim() - 2];
    let batch_shape = broadcast_shape(a_batch, b_batch)?;
    let a_offsets = broadcast_offsets(a_batch, &batch_shape);
    let b_offsets = broadcast_offsets(b_batch, &batch_shape);

    let mut shape: Shape = batch_shape.iter().copied().collect();
    shape.push(m);
    shape.push(n);
    let mut out = vec![T::zero(); shape.numel()];
    if out.is_empty() {
        return Ok(CpuArray::from_parts(shape, out));
    }

    let (a_data, b_data) = (a.data(), b.data());
    let fill_row = |row: usize, out_row: &mut [T]| {
        let (batch, i) = (row / m, row % m);
        let a_base = a_offsets[batch] * ra * ca;
        let b_base = b_offsets[batch] * rb * cb;
        for (j, cell) in out_row.iter_mut().enumerate() {
            let mut acc = T::zero();
            for p in 0..k {
                let x = if tr_a { a_data[a_base + p * ca + i] } else { a_data[a_base + i * ca + p] };
                let y = if tr_b { b_data[b_base + j * cb + p] } else { b_data[b_base + p * cb + j] };
                acc = acc + x * y;
            }
            *cell = acc;
        }
    };

    #[cfg(feature = "rayon")]
    if out.len() * k >= PARALLEL_THRESHOLD {
        out.par_chunks_mut(n)
            .enumerate()
            .for_each(|(row, out_row)| fill_row(row, out_row));
        return Ok(CpuArray::from_parts(shape, out));
    }

    for (row, out_row) in out.chunks_mut(n).enumerate() {
        fill_row(row, out_row);
    }
    Ok(CpuArray::from_parts(shape, out))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matmul_2x3_3x2() {
        let a = CpuArray::new([2, 3], vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]).unwrap();
        let b = CpuArray::new([3, 2], vec![7.0, 8.0, 9.0, 10.0, 11.0, 12.0]).unwrap();
        let c = matmul(&a, &b, false, false).unwrap();
        assert_eq!(c.shape().as_slice(), &[2, 2]);
        assert_eq!(c.data(), &[58.0, 64.0, 139.0, 154.0]);
    }

    #[test]
    fn test_transposed_operands() {
        let a = CpuArray::new([2, 3], vec![1i64, 2, 3, 4, 5, 6]).unwrap();
        // a @ aᵀ
        let c = matmul(&a, &a, false, true).unwrap();
        assert_eq!(c.data(), &[14, 32, 32, 77]);
        // aᵀ @ a
        let d = matmul(&a, &a, true, false).unwrap();
        assert_eq!(d.shape().as_slice(), &[3, 3]);
        assert_eq!(d.data()[0], 17);
    }

    #[test]
    fn test_batch_broadcast() {
        let a = CpuArray::new([2, 1, 2], vec![1.0, 2.0, 3.0, 4.0]).unwrap();
        let b = CpuArray::new([2, 1], vec![1.0, 1.0]).unwrap();
        let c = matmul(&a, &b, false, false).unwrap();
        assert_eq!(c.shape().as_slice(), &[2, 1, 1]);
        assert_eq!(c.data(), &[3.0, 7.0]);
    }

    #[test]
    fn test_inner_mismatch() {
        let a = CpuArray::new([2, 3], vec![0.0; 6]).unwrap();
        assert!(matmul(&a, &a, false, false).is_err());
    }
}
