//! LU and Cholesky factorisations of one row-major square matrix

use crate::error::{Error, Result};
use crate::runtime::cpu::array::CpuFloat;

/// Packed LU factors with LAPACK-style row interchanges
///
/// `lu` holds unit-lower `L` below the diagonal and `U` on and above it;
/// row `i` was swapped with row `pivots[i]` at step `i`.
#[derive(Debug, Clone)]
pub(crate) struct LuFactors<T> {
    pub lu: Vec<T>,
    pub pivots: Vec<usize>,
    pub num_swaps: usize,
    pub n: usize,
}

impl<T: CpuFloat> LuFactors<T> {
    /// `det(a)`, from the product of the pivots and the swap parity
    pub fn det(&self) -> T {
        let n = self.n;
        let product = (0..n).fold(T::one(), |acc, i| acc * self.lu[i * n + i]);
        if self.num_swaps % 2 == 1 { -product } else { product }
    }

    /// Apply the recorded row interchanges to a length-`n` vector
    pub fn permute(&self, b: &mut [T]) {
        for (i, &p) in self.pivots.iter().enumerate() {
            if p != i {
                b.swap(i, p);
            }
        }
    }
}

/// LU decomposition with partial pivoting
///
/// Returns `None` when a pivot column is entirely zero (the matrix is
/// singular).
pub(crate) fn lu_decompose<T: CpuFloat>(a: &[T], n: usize) -> Option<LuFactors<T>> {
    let mut lu = a.to_vec();
    let mut pivots = vec![0; n];
    let mut num_swaps = 0usize;

    for col in 0..n {
        let mut pivot_row = col;
        let mut max_val = lu[col * n + col].abs();
        for row in (col + 1)..n {
            let val = lu[row * n + col].abs();
            if val > max_val {
                max_val = val;
                pivot_row = row;
            }
        }

        pivots[col] = pivot_row;
        if pivot_row != col {
            for j in 0..n {
                lu.swap(col * n + j, pivot_row * n + j);
            }
            num_swaps += 1;
        }

        let pivot = lu[col * n + col];
        if pivot == T::zero() {
            return None;
        }

        for row in (col + 1)..n {
            lu[row * n + col] = lu[row * n + col] / pivot;
        }
        for row in (col + 1)..n {
            let multiplier = lu[row * n + col];
            for j in (col + 1)..n {
                let update = multiplier * lu[col * n + j];
                lu[row * n + j] = lu[row * n + j] - update;
            }
        }
    }

    Some(LuFactors {
        lu,
        pivots,
        num_swaps,
        n,
    })
}

/// Lower Cholesky factor (Cholesky–Banachiewicz)
pub(crate) fn cholesky_decompose<T: CpuFloat>(a: &[T], n: usize) -> Result<Vec<T>> {
    let mut l = vec![T::zero(); n * n];

    for i in 0..n {
        let mut sum_sq = T::zero();
        for k in 0..i {
            sum_sq = sum_sq + l[i * n + k] * l[i * n + k];
        }

        let diag = a[i * n + i] - sum_sq;
        if !(diag > T::zero()) {
            return Err(Error::invalid_argument(
                "a",
                format!("matrix is not positive definite (pivot {i})"),
            ));
        }
        l[i * n + i] = diag.sqrt();

        for j in (i + 1)..n {
            let mut sum_prod = T::zero();
            for k in 0..i {
                sum_prod = sum_prod + l[j * n + k] * l[i * n + k];
            }
            l[j * n + i] = (a[j * n + i] - sum_prod) / l[i * n + i];
        }
    }
    Ok(l)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lu_det() {
        let a = [4.0f64, 3.0, 6.0, 3.0];
        let lu = lu_decompose(&a, 2).unwrap();
        assert!((lu.det() - (-6.0)).abs() < 1e-12);
        assert_eq!(lu.num_swaps, 1);
    }

    #[test]
    fn test_lu_singular() {
        assert!(lu_decompose(&[1.0, 2.0, 2.0, 4.0], 2).is_none());
    }

    #[test]
    fn test_cholesky() {
        let a = [4.0, 2.0, 2.0, 3.0];
        let l = cholesky_decompose(&a, 2).unwrap();
        assert_eq!(l, vec![2.0, 0.0, 1.0, 2.0f64.sqrt()]);
        assert!(cholesky_decompose(&[1.0, 2.0, 2.0, 1.0], 2).is_err());
    }
}
