//! Triangular substitution and LU-based solves
//!
//! Right-hand sides are row-major `n × k` blocks; every column is solved
//! independently.

use super::decompositions::LuFactors;
use crate::error::{Error, Result};
use crate::runtime::cpu::array::CpuFloat;

fn singular() -> Error {
    Error::invalid_argument("a", "matrix is singular")
}

/// Solve `t x = b` for triangular `t`
///
/// With `unit_diagonal`, the diagonal of `t` is taken to be one and never
/// read.
pub(crate) fn triangular_solve<T: CpuFloat>(
    t: &[T],
    b: &[T],
    n: usize,
    k: usize,
    lower: bool,
    unit_diagonal: bool,
) -> Result<Vec<T>> {
    let mut x = b.to_vec();
    let rows: Box<dyn Iterator<Item = usize>> = if lower {
        Box::new(0..n)
    } else {
        Box::new((0..n).rev())
    };

    for i in rows {
        let (start, end) = if lower { (0, i) } else { (i + 1, n) };
        let diag = t[i * n + i];
        if !unit_diagonal && diag == T::zero() {
            return Err(singular());
        }
        for c in 0..k {
            let mut acc = x[i * k + c];
            for j in start..end {
                acc = acc - t[i * n + j] * x[j * k + c];
            }
            x[i * k + c] = if unit_diagonal { acc } else { acc / diag };
        }
    }
    Ok(x)
}

/// Solve `a x = b` from the LU factors of `a`
pub(crate) fn lu_solve<T: CpuFloat>(factors: &LuFactors<T>, b: &[T], k: usize) -> Result<Vec<T>> {
    let n = factors.n;
    let mut x = vec![T::zero(); n * k];
    let mut column = vec![T::zero(); n];

    for c in 0..k {
        for i in 0..n {
            column[i] = b[i * k + c];
        }
        factors.permute(&mut column);
        let y = triangular_solve(&factors.lu, &column, n, 1, true, true)?;
        let solved = triangular_solve(&factors.lu, &y, n, 1, false, false)?;
        for i in 0..n {
            x[i * k + c] = solved[i];
        }
    }
    Ok(x)
}

/// Inverse from the LU factors
pub(crate) fn lu_inverse<T: CpuFloat>(factors: &LuFactors<T>) -> Result<Vec<T>> {
    let n = factors.n;
    let mut identity = vec![T::zero(); n * n];
    for i in 0..n {
        identity[i * n + i] = T::one();
    }
    lu_solve(factors, &identity, n)
}

pub(crate) fn require_factors<T>(factors: Option<LuFactors<T>>) -> Result<LuFactors<T>> {
    factors.ok_or_else(singular)
}
