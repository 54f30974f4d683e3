//! Broadcasting binary kernels

use super::broadcast_offsets;
use crate::error::Result;
use crate::runtime::cpu::array::{CpuArray, CpuElement};
use crate::tensor::broadcast_shape;

/// Apply `f` pairwise with NumPy-style broadcasting
pub(crate) fn binary<T, U>(
    a: &CpuArray<T>,
    b: &CpuArray<T>,
    f: impl Fn(T, T) -> U,
) -> Result<CpuArray<U>>
where
    T: CpuElement,
    U: CpuElement,
{
    if a.shape() == b.shape() {
        let data = a.data().iter().zip(b.data()).map(|(&x, &y)| f(x, y)).collect();
        return Ok(CpuArray::from_parts(a.shape().clone(), data));
    }

    let shape = broadcast_shape(a.shape(), b.shape())?;
    let ia = broadcast_offsets(a.shape(), &shape);
    let ib = broadcast_offsets(b.shape(), &shape);
    let data = ia
        .iter()
        .zip(&ib)
        .map(|(&i, &j)| f(a.data()[i], b.data()[j]))
        .collect();
    Ok(CpuArray::from_parts(shape, data))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_shape() {
        let a = CpuArray::from_vec(vec![1.0, 2.0]);
        let b = CpuArray::from_vec(vec![3.0, 5.0]);
        let c = binary(&a, &b, |x, y| x * y).unwrap();
        assert_eq!(c.data(), &[3.0, 10.0]);
    }

    #[test]
    fn test_column_plus_row() {
        let col = CpuArray::new([2, 1], vec![10i64, 20]).unwrap();
        let row = CpuArray::new([1, 3], vec![1i64, 2, 3]).unwrap();
        let c = binary(&col, &row, |x, y| x + y).unwrap();
        assert_eq!(c.shape().as_slice(), &[2, 3]);
        assert_eq!(c.data(), &[11, 12, 13, 21, 22, 23]);
    }

    #[test]
    fn test_scalar_broadcast_and_comparison() {
        let a = CpuArray::from_vec(vec![1.0, 5.0, 3.0]);
        let s = CpuArray::scalar(2.0);
        let c = binary(&a, &s, |x, y| x > y).unwrap();
        assert_eq!(c.data(), &[false, true, true]);
    }

    #[test]
    fn test_incompatible_shapes() {
        let a = CpuArray::from_vec(vec![1.0, 2.0]);
        let b = CpuArray::from_vec(vec![1.0, 2.0, 3.0]);
        assert!(binary(&a, &b, |x, y| x + y).is_err());
    }
}
