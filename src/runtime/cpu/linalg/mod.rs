//! Dense linear algebra on [`CpuArray`]s of floats
//!
//! Factorisations work on one row-major matrix at a time. `cholesky`, `inv`,
//! `det` and `logdet` loop over leading batch axes; the solves take a single
//! matrix with a vector or matrix right-hand side.

mod decompositions;
mod solvers;
mod svd;

use decompositions::{cholesky_decompose, lu_decompose};
use solvers::{lu_inverse, lu_solve, require_factors};

use crate::error::{Error, Result};
use crate::runtime::cpu::array::{CpuArray, CpuFloat};
use crate::tensor::Shape;

/// `(batch, n)` of a stack of square matrices
fn square_dims<T: CpuFloat>(a: &CpuArray<T>, op: &'static str) -> Result<(usize, usize)> {
    let (batch, rows, cols) = a
        .shape()
        .matrix_dims()
        .ok_or_else(|| Error::invalid_rank(op, "a (batch of) square matrices", a.ndim()))?;
    if rows != cols {
        return Err(Error::invalid_shape(op, format!("matrix must be square, got {:?}", a.shape())));
    }
    Ok((batch, rows))
}

fn batch_shape(shape: &Shape) -> Shape {
    shape[..shape.ndim() - 2].iter().copied().collect()
}

/// Apply `f` to every `n × n` matrix, concatenating the per-matrix outputs
fn per_matrix<T: CpuFloat>(
    a: &CpuArray<T>,
    op: &'static str,
    out_shape: impl FnOnce(&Shape) -> Shape,
    f: impl Fn(&[T], usize) -> Result<Vec<T>>,
) -> Result<CpuArray<T>> {
    let (batch, n) = square_dims(a, op)?;
    let mut data = Vec::new();
    for b in 0..batch {
        data.extend(f(&a.data()[b * n * n..(b + 1) * n * n], n)?);
    }
    CpuArray::new(out_shape(a.shape()), data)
}

pub(crate) fn cholesky<T: CpuFloat>(a: &CpuArray<T>) -> Result<CpuArray<T>> {
    per_matrix(a, "cholesky", Shape::clone, cholesky_decompose)
}

pub(crate) fn inv<T: CpuFloat>(a: &CpuArray<T>) -> Result<CpuArray<T>> {
    per_matrix(a, "inv", Shape::clone, |m, n| lu_inverse(&require_factors(lu_decompose(m, n))?))
}

/// Determinant; zero for singular matrices
pub(crate) fn det<T: CpuFloat>(a: &CpuArray<T>) -> Result<CpuArray<T>> {
    per_matrix(a, "det", batch_shape, |m, n| {
        Ok(vec![lu_decompose(m, n).map_or(T::zero(), |f| f.det())])
    })
}

/// `log det(a)` of a positive-definite matrix, via its Cholesky factor
pub(crate) fn logdet<T: CpuFloat>(a: &CpuArray<T>) -> Result<CpuArray<T>> {
    per_matrix(a, "logdet", batch_shape, |m, n| {
        let l = cholesky_decompose(m, n)?;
        let half = (0..n).fold(T::zero(), |acc, i| acc + l[i * n + i].ln());
        Ok(vec![half + half])
    })
}

/// Rows and right-hand-side columns of `b` against an `n × n` system
fn rhs_dims<T: CpuFloat>(b: &CpuArray<T>, n: usize) -> Result<usize> {
    let k = match b.shape().as_slice() {
        &[rows] if rows == n => 1,
        &[rows, k] if rows == n => k,
        _ => return Err(Error::shape_mismatch(&[n], b.shape())),
    };
    Ok(k)
}

fn single_square<T: CpuFloat>(a: &CpuArray<T>, op: &'static str) -> Result<usize> {
    if a.ndim() != 2 {
        return Err(Error::invalid_rank(op, "a rank-2 matrix", a.ndim()));
    }
    let (_, n) = square_dims(a, op)?;
    Ok(n)
}

/// Solve `a x = b` with LU and partial pivoting
pub(crate) fn solve<T: CpuFloat>(a: &CpuArray<T>, b: &CpuArray<T>) -> Result<CpuArray<T>> {
    let n = single_square(a, "solve")?;
    let k = rhs_dims(b, n)?;
    let factors = require_factors(lu_decompose(a.data(), n))?;
    let x = lu_solve(&factors, b.data(), k)?;
    CpuArray::new(b.shape().clone(), x)
}

/// Solve `a x = b` for lower (or upper) triangular `a`
pub(crate) fn triangular_solve<T: CpuFloat>(
    a: &CpuArray<T>,
    b: &CpuArray<T>,
    lower: bool,
) -> Result<CpuArray<T>> {
    let n = single_square(a, "triangular_solve")?;
    let k = rhs_dims(b, n)?;
    let x = solvers::triangular_solve(a.data(), b.data(), n, k, lower, false)?;
    CpuArray::new(b.shape().clone(), x)
}

/// Thin SVD `(U, S, V)` of a single matrix
pub(crate) fn svd<T: CpuFloat>(a: &CpuArray<T>) -> Result<(CpuArray<T>, CpuArray<T>, CpuArray<T>)> {
    let &[m, n] = a.shape().as_slice() else {
        return Err(Error::invalid_rank("svd", "a rank-2 matrix", a.ndim()));
    };
    let k = m.min(n);
    let factors = svd::svd_decompose(a.data(), m, n);
    Ok((
        CpuArray::new([m, k], factors.u)?,
        CpuArray::new([k], factors.s)?,
        CpuArray::new([n, k], factors.v)?,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batched_det_and_logdet() {
        let a = CpuArray::new([2, 2, 2], vec![2.0f64, 0.0, 0.0, 3.0, 4.0, 2.0, 2.0, 3.0]).unwrap();
        let d = det(&a).unwrap();
        assert_eq!(d.shape().as_slice(), &[2]);
        assert!((d.data()[0] - 6.0).abs() < 1e-12);
        assert!((d.data()[1] - 8.0).abs() < 1e-12);
        let ld = logdet(&a).unwrap();
        assert!((ld.data()[1] - 8.0f64.ln()).abs() < 1e-12);
    }

    #[test]
    fn test_singular_det_is_zero() {
        let a = CpuArray::new([2, 2], vec![1.0, 2.0, 2.0, 4.0]).unwrap();
        assert_eq!(det(&a).unwrap().data(), &[0.0]);
        assert!(inv(&a).is_err());
    }

    #[test]
    fn test_solve_vector_rhs() {
        let a = CpuArray::new([2, 2], vec![3.0f64, 1.0, 1.0, 2.0]).unwrap();
        let b = CpuArray::from_vec(vec![9.0, 8.0]);
        let x = solve(&a, &b).unwrap();
        assert_eq!(x.shape().as_slice(), &[2]);
        assert!((x.data()[0] - 2.0).abs() < 1e-12);
        assert!((x.data()[1] - 3.0).abs() < 1e-12);
        assert!(solve(&a, &CpuArray::from_vec(vec![1.0, 2.0, 3.0])).is_err());
    }

    #[test]
    fn test_non_square_rejected() {
        let a = CpuArray::new([2, 3], vec![0.0; 6]).unwrap();
        assert!(cholesky(&a).is_err());
        assert!(svd(&a).is_ok());
    }
}
