//! Shapes, axis normalisation and broadcasting
//!
//! Backend-neutral helpers shared by the generic algorithms and the CPU
//! backend's kernels.

mod shape;

pub use shape::Shape;

use crate::error::{Error, Result};

/// Normalize an axis index, supporting negative indexing.
#[inline]
pub fn normalize_dim(dim: isize, ndim: usize) -> Result<usize> {
    let idx = if dim < 0 { ndim as isize + dim } else { dim };
    if idx < 0 || idx as usize >= ndim {
        return Err(Error::InvalidDimension { dim, ndim });
    }
    Ok(idx as usize)
}

/// Normalize the position of a newly inserted axis (valid range `0..=ndim`).
#[inline]
pub fn normalize_insert_dim(dim: isize, ndim: usize) -> Result<usize> {
    normalize_dim(dim, ndim + 1)
}

/// Compute the output shape for binary operations with broadcasting
pub fn broadcast_shape(a: &[usize], b: &[usize]) -> Result<Shape> {
    let max_ndim = a.len().max(b.len());
    let mut result = Shape::with_capacity(max_ndim);

    // Iterate from right to left
    for i in 0..max_ndim {
        let a_dim = if i < a.len() { a[a.len() - 1 - i] } else { 1 };
        let b_dim = if i < b.len() { b[b.len() - 1 - i] } else { 1 };

        if a_dim == b_dim || b_dim == 1 {
            result.push(a_dim);
        } else if a_dim == 1 {
            result.push(b_dim);
        } else {
            return Err(Error::broadcast(a, b));
        }
    }

    result.reverse();
    Ok(result)
}

/// Integer `m` with `m (m + 1) / 2 == len`, if there is one
pub fn triangular_side(len: usize) -> Option<usize> {
    // Solve m^2 + m - 2 len = 0, then correct rounding either way.
    let estimate = (((8 * len + 1) as f64).sqrt() - 1.0) / 2.0;
    let m = estimate.round() as usize;
    (m * (m + 1) / 2 == len).then_some(m)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_dim() {
        assert_eq!(normalize_dim(-1, 3).unwrap(), 2);
        assert_eq!(normalize_dim(0, 3).unwrap(), 0);
        assert!(normalize_dim(3, 3).is_err());
        assert!(normalize_dim(-4, 3).is_err());
        assert!(normalize_dim(0, 0).is_err());
        assert_eq!(normalize_insert_dim(-1, 2).unwrap(), 2);
        assert_eq!(normalize_insert_dim(0, 0).unwrap(), 0);
    }

    #[test]
    fn test_broadcast_shape() {
        assert_eq!(broadcast_shape(&[3, 1], &[1, 4]).unwrap().as_slice(), &[3, 4]);
        assert_eq!(broadcast_shape(&[], &[2, 2]).unwrap().as_slice(), &[2, 2]);
        assert_eq!(broadcast_shape(&[5, 2, 3], &[3]).unwrap().as_slice(), &[5, 2, 3]);
        assert!(broadcast_shape(&[2], &[3]).is_err());
    }

    #[test]
    fn test_triangular_side() {
        assert_eq!(triangular_side(0), Some(0));
        assert_eq!(triangular_side(1), Some(1));
        assert_eq!(triangular_side(6), Some(3));
        assert_eq!(triangular_side(5050), Some(100));
        assert_eq!(triangular_side(5), None);
        assert_eq!(triangular_side(7), None);
    }
}
