//! Jacobi rotation utilities for the one-sided Jacobi SVD
//!
//! The rotation parameters use the LAPACK formula to avoid catastrophic
//! cancellation.

use super::array::CpuFloat;

/// Jacobi rotation parameters (cosine and sine of rotation angle).
///
/// ```text
/// J = [ c  -s ]
///     [ s   c ]
/// ```
#[derive(Debug, Clone, Copy)]
pub struct JacobiRotation {
    /// Cosine of rotation angle
    pub c: f64,
    /// Sine of rotation angle
    pub s: f64,
}

impl JacobiRotation {
    /// Rotation zeroing the off-diagonal entry of a symmetric 2×2 block
    ///
    /// ```text
    /// τ = (a_qq - a_pp) / (2 * a_pq)
    /// t = sign(τ) / (|τ| + sqrt(1 + τ²))
    /// c = 1 / sqrt(1 + t²)
    /// s = t * c
    /// ```
    #[inline]
    pub fn compute(a_pp: f64, a_qq: f64, a_pq: f64) -> Self {
        let tau_num = a_qq - a_pp;
        let tau_den = 2.0 * a_pq;

        if tau_den.abs() < 1e-300 {
            return Self { c: 1.0, s: 0.0 };
        }

        let tau = tau_num / tau_den;
        let t = if tau >= 0.0 {
            1.0 / (tau + (1.0 + tau * tau).sqrt())
        } else {
            -1.0 / (-tau + (1.0 + tau * tau).sqrt())
        };

        let c = 1.0 / (1.0 + t * t).sqrt();
        Self { c, s: t * c }
    }

    #[inline]
    fn typed<T: CpuFloat>(&self) -> (T, T) {
        (T::from_f64(self.c), T::from_f64(self.s))
    }
}

/// `[col_p', col_q'] = [col_p, col_q] @ [[c, s], [-s, c]]` on a row-major matrix
#[inline]
pub fn apply_rotation_to_columns<T: CpuFloat>(
    data: &mut [T],
    rows: usize,
    cols: usize,
    p: usize,
    q: usize,
    rot: &JacobiRotation,
) {
    let (c, s): (T, T) = rot.typed();
    for i in 0..rows {
        let idx_p = i * cols + p;
        let idx_q = i * cols + q;
        let val_p = data[idx_p];
        let val_q = data[idx_q];
        data[idx_p] = c * val_p - s * val_q;
        data[idx_q] = s * val_p + c * val_q;
    }
}

/// `(B[:,p]·B[:,p], B[:,q]·B[:,q], B[:,p]·B[:,q])`
#[inline]
pub fn compute_gram_elements<T: CpuFloat>(
    b: &[T],
    rows: usize,
    cols: usize,
    p: usize,
    q: usize,
) -> (T, T, T) {
    let mut a_pp = T::zero();
    let mut a_qq = T::zero();
    let mut a_pq = T::zero();
    for i in 0..rows {
        let bp = b[i * cols + p];
        let bq = b[i * cols + q];
        a_pp = a_pp + bp * bp;
        a_qq = a_qq + bq * bq;
        a_pq = a_pq + bp * bq;
    }
    (a_pp, a_qq, a_pq)
}

/// Indices sorting `values` in descending order
pub fn argsort_desc<T: CpuFloat>(values: &[T]) -> Vec<usize> {
    let mut indices: Vec<usize> = (0..values.len()).collect();
    indices.sort_by(|&i, &j| {
        values[j]
            .partial_cmp(&values[i])
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    indices
}

/// The first `new_cols` columns of `data`, reordered by `indices`
pub fn permute_columns<T: CpuFloat>(
    data: &[T],
    rows: usize,
    cols: usize,
    indices: &[usize],
    new_cols: usize,
) -> Vec<T> {
    let mut result = vec![T::zero(); rows * new_cols];
    for (new_idx, &old_idx) in indices.iter().take(new_cols).enumerate() {
        for i in 0..rows {
            result[i * new_cols + new_idx] = data[i * cols + old_idx];
        }
    }
    result
}

/// Row-major `n × n` identity
pub fn identity_matrix<T: CpuFloat>(n: usize) -> Vec<T> {
    let mut result = vec![T::zero(); n * n];
    for i in 0..n {
        result[i * n + i] = T::one();
    }
    result
}

/// Normalize columns in place and return their norms
///
/// Columns with norm at most `eps` are zeroed.
pub fn normalize_columns<T: CpuFloat>(data: &mut [T], rows: usize, cols: usize, eps: T) -> Vec<T> {
    let mut norms = vec![T::zero(); cols];
    for (j, norm_out) in norms.iter_mut().enumerate() {
        let mut norm_sq = T::zero();
        for i in 0..rows {
            let val = data[i * cols + j];
            norm_sq = norm_sq + val * val;
        }
        let norm = norm_sq.sqrt();
        *norm_out = norm;

        for i in 0..rows {
            let idx = i * cols + j;
            data[idx] = if norm > eps { data[idx] / norm } else { T::zero() };
        }
    }
    norms
}
