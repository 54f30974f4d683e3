//! Matrix products and dense factorisations
//!
//! Factorisations run in the operand's float type; integer and boolean
//! operands are converted to `f64` first.

use super::{any_array, dtype_mismatch, pair, same_dtype_pairs, view};
use crate::dispatch::Registrar;
use crate::error::Result;
use crate::runtime::cpu::array::CpuView;
use crate::runtime::cpu::kernels::{matmul::matmul, shape};
use crate::runtime::cpu::linalg;
use crate::types::Value;

/// Evaluate `$body` with `$a` bound to a float array
macro_rules! with_float {
    ($view:expr, $a:ident => $body:expr) => {
        match $view {
            CpuView::F64($a) => $body,
            CpuView::F32($a) => $body,
            other => {
                let widened = other.cast::<f64>();
                let $a = &widened;
                $body
            }
        }
    };
}

/// Evaluate `$body` with both operands bound to float arrays of one type
macro_rules! with_float_pair {
    ($views:expr, ($a:ident, $b:ident) => $body:expr) => {
        match $views {
            (CpuView::F64($a), CpuView::F64($b)) => $body,
            (CpuView::F32($a), CpuView::F32($b)) => $body,
            (x, y) if x.dtype() == y.dtype() => {
                let (wx, wy) = (x.cast::<f64>(), y.cast::<f64>());
                let ($a, $b) = (&wx, &wy);
                $body
            }
            (x, y) => return Err(dtype_mismatch(&x, &y)),
        }
    };
}

pub(super) fn register(r: &Registrar<'_>) -> Result<()> {
    r.register_all("matmul", same_dtype_pairs(), |_, args, kw| {
        let tr_a = kw.bool_or("tr_a", false)?;
        let tr_b = kw.bool_or("tr_b", false)?;
        let out = match pair(args)? {
            (CpuView::F64(a), CpuView::F64(b)) => matmul(a, b, tr_a, tr_b)?.into_value(),
            (CpuView::F32(a), CpuView::F32(b)) => matmul(a, b, tr_a, tr_b)?.into_value(),
            (CpuView::I64(a), CpuView::I64(b)) => matmul(a, b, tr_a, tr_b)?.into_value(),
            (CpuView::Bool(a), CpuView::Bool(b)) => {
                matmul(&a.cast::<i64>(), &b.cast::<i64>(), tr_a, tr_b)?.into_value()
            }
            (a, b) => return Err(dtype_mismatch(&a, &b)),
        };
        Ok(out)
    })?;

    r.register("trace_leading", any_array(), |_, args, _| {
        Ok(match view(args, 0)? {
            CpuView::F64(a) => shape::trace_leading(a)?.into_value(),
            CpuView::F32(a) => shape::trace_leading(a)?.into_value(),
            CpuView::I64(a) => shape::trace_leading(a)?.into_value(),
            CpuView::Bool(a) => shape::trace_leading(&a.cast::<i64>())?.into_value(),
        })
    })?;

    r.register_all("kron", same_dtype_pairs(), |_, args, _| {
        let out = match pair(args)? {
            (CpuView::F64(a), CpuView::F64(b)) => shape::kron(a, b).into_value(),
            (CpuView::F32(a), CpuView::F32(b)) => shape::kron(a, b).into_value(),
            (CpuView::I64(a), CpuView::I64(b)) => shape::kron(a, b).into_value(),
            (CpuView::Bool(a), CpuView::Bool(b)) => {
                shape::kron(&a.cast::<i64>(), &b.cast::<i64>()).into_value()
            }
            (a, b) => return Err(dtype_mismatch(&a, &b)),
        };
        Ok(out)
    })?;

    r.register("svd", any_array(), |_, args, kw| {
        let compute_uv = kw.bool_or("compute_uv", true)?;
        with_float!(view(args, 0)?, a => {
            let (u, s, v) = linalg::svd(a)?;
            Ok(if compute_uv {
                Value::List(vec![u.into_value(), s.into_value(), v.into_value()])
            } else {
                s.into_value()
            })
        })
    })?;

    r.register("cholesky", any_array(), |_, args, _| {
        with_float!(view(args, 0)?, a => Ok(linalg::cholesky(a)?.into_value()))
    })?;
    r.register("inv", any_array(), |_, args, _| {
        with_float!(view(args, 0)?, a => Ok(linalg::inv(a)?.into_value()))
    })?;
    r.register("det", any_array(), |_, args, _| {
        with_float!(view(args, 0)?, a => Ok(linalg::det(a)?.into_value()))
    })?;
    r.register("logdet", any_array(), |_, args, _| {
        with_float!(view(args, 0)?, a => Ok(linalg::logdet(a)?.into_value()))
    })?;

    r.register_all("triangular_solve", same_dtype_pairs(), |_, args, kw| {
        let lower = kw.bool_or("lower_a", true)?;
        with_float_pair!(pair(args)?, (a, b) => {
            Ok(linalg::triangular_solve(a, b, lower)?.into_value())
        })
    })?;
    r.register_all("solve", same_dtype_pairs(), |_, args, _| {
        with_float_pair!(pair(args)?, (a, b) => Ok(linalg::solve(a, b)?.into_value()))
    })?;
    Ok(())
}
