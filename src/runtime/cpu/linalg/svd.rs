//! One-sided Jacobi SVD
//!
//! Columns of a working copy `B` are orthogonalised by Jacobi rotations while
//! `V` accumulates them; afterwards `U = B / ‖B‖` column-wise and the norms
//! are the singular values. Wide inputs are decomposed through their
//! transpose. The result is the thin decomposition with `k = min(m, n)`.

use crate::runtime::cpu::array::CpuFloat;
use crate::runtime::cpu::jacobi::{
    JacobiRotation, apply_rotation_to_columns, argsort_desc, compute_gram_elements,
    identity_matrix, normalize_columns, permute_columns,
};

const MAX_SWEEPS: usize = 30;

/// Row-major thin factors: `u` is `m × k`, `s` has `k` entries, `v` is `n × k`
#[derive(Debug, Clone)]
pub(crate) struct SvdFactors<T> {
    pub u: Vec<T>,
    pub s: Vec<T>,
    pub v: Vec<T>,
}

pub(crate) fn svd_decompose<T: CpuFloat>(a: &[T], m: usize, n: usize) -> SvdFactors<T> {
    let k = m.min(n);
    if k == 0 {
        return SvdFactors {
            u: Vec::new(),
            s: Vec::new(),
            v: Vec::new(),
        };
    }

    let transpose = m < n;
    let (work_m, work_n) = if transpose { (n, m) } else { (m, n) };
    let mut b: Vec<T> = if transpose {
        let mut bt = vec![T::zero(); work_m * work_n];
        for i in 0..m {
            for j in 0..n {
                bt[j * work_n + i] = a[i * n + j];
            }
        }
        bt
    } else {
        a.to_vec()
    };
    let mut v: Vec<T> = identity_matrix(work_n);

    let eps = T::epsilon();
    let tol = T::from_f64(work_n as f64) * eps;

    for _ in 0..MAX_SWEEPS {
        let mut off_diag = T::zero();
        for p in 0..work_n {
            for q in (p + 1)..work_n {
                let (a_pp, a_qq, a_pq) = compute_gram_elements(&b, work_m, work_n, p, q);
                off_diag = off_diag + a_pq * a_pq;

                if a_pq.abs() < tol * (a_pp * a_qq).sqrt() {
                    continue;
                }
                let rot = JacobiRotation::compute(
                    a_pp.into_f64(),
                    a_qq.into_f64(),
                    a_pq.into_f64(),
                );
                apply_rotation_to_columns(&mut b, work_m, work_n, p, q, &rot);
                apply_rotation_to_columns(&mut v, work_n, work_n, p, q, &rot);
            }
        }
        if off_diag.sqrt() < tol {
            break;
        }
    }

    let norms = normalize_columns(&mut b, work_m, work_n, eps);
    let order = argsort_desc(&norms);
    let s: Vec<T> = order.iter().take(k).map(|&i| norms[i]).collect();
    let left = permute_columns(&b, work_m, work_n, &order, k);
    let right = permute_columns(&v, work_n, work_n, &order, k);

    // B = Aᵀ when transposed, so the roles of the two factors swap.
    if transpose {
        SvdFactors { u: right, s, v: left }
    } else {
        SvdFactors { u: left, s, v: right }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reconstruct(f: &SvdFactors<f64>, m: usize, n: usize) -> Vec<f64> {
        let k = f.s.len();
        let mut out = vec![0.0; m * n];
        for i in 0..m {
            for j in 0..n {
                out[i * n + j] = (0..k).map(|r| f.u[i * k + r] * f.s[r] * f.v[j * k + r]).sum();
            }
        }
        out
    }

    #[test]
    fn test_tall_reconstruction() {
        let a = [3.0, 2.0, 2.0, 3.0, 2.0, -2.0];
        let f = svd_decompose(&a, 3, 2);
        assert!(f.s[0] >= f.s[1]);
        for (x, y) in reconstruct(&f, 3, 2).iter().zip(&a) {
            assert!((x - y).abs() < 1e-10);
        }
    }

    #[test]
    fn test_wide_reconstruction() {
        let a = [3.0f64, 2.0, 2.0, 2.0, 3.0, -2.0];
        let f = svd_decompose(&a, 2, 3);
        assert!((f.s[0] - 5.0).abs() < 1e-10);
        assert!((f.s[1] - 3.0).abs() < 1e-10);
        for (x, y) in reconstruct(&f, 2, 3).iter().zip(&a) {
            assert!((x - y).abs() < 1e-10);
        }
    }
}
