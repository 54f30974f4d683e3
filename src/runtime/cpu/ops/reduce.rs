//! Reductions over one axis or the whole array

use super::{any_array, axis_kw, view};
use crate::dispatch::{Kwargs, Registrar};
use crate::error::Result;
use crate::runtime::cpu::array::{CpuView, with_view};
use crate::runtime::cpu::kernels::reduce::{self, reduce};
use crate::types::Value;

pub(super) fn register(r: &Registrar<'_>) -> Result<()> {
    r.register("sum", any_array(), |_, args, kw| {
        let a = view(args, 0)?;
        let axis = axis_kw(kw, a.shape().ndim())?;
        Ok(match a {
            CpuView::F64(a) => reduce(a, axis, reduce::sum)?.into_value(),
            CpuView::F32(a) => reduce(a, axis, reduce::sum)?.into_value(),
            CpuView::I64(a) => reduce(a, axis, reduce::sum)?.into_value(),
            CpuView::Bool(a) => reduce(&a.cast::<i64>(), axis, reduce::sum)?.into_value(),
        })
    })?;

    r.register("mean", any_array(), |_, args, kw| float_reduction(args, kw, Statistic::Mean))?;
    r.register("std", any_array(), |_, args, kw| float_reduction(args, kw, Statistic::StdDev))?;

    r.register("min", any_array(), |_, args, kw| {
        let a = view(args, 0)?;
        let axis = axis_kw(kw, a.shape().ndim())?;
        with_view!(a, a => Ok(reduce(a, axis, reduce::min)?.into_value()))
    })?;
    r.register("max", any_array(), |_, args, kw| {
        let a = view(args, 0)?;
        let axis = axis_kw(kw, a.shape().ndim())?;
        with_view!(a, a => Ok(reduce(a, axis, reduce::max)?.into_value()))
    })?;

    r.register("all", any_array(), |_, args, kw| {
        let a = view(args, 0)?;
        let axis = axis_kw(kw, a.shape().ndim())?;
        with_view!(a, a => Ok(reduce(a, axis, reduce::all)?.into_value()))
    })?;
    r.register("any", any_array(), |_, args, kw| {
        let a = view(args, 0)?;
        let axis = axis_kw(kw, a.shape().ndim())?;
        with_view!(a, a => Ok(reduce(a, axis, reduce::any)?.into_value()))
    })?;
    Ok(())
}

#[derive(Copy, Clone)]
enum Statistic {
    Mean,
    StdDev,
}

/// Mean or population standard deviation; integers and booleans go through `f64`
fn float_reduction(args: &[Value], kw: &Kwargs, stat: Statistic) -> Result<Value> {
    let a = view(args, 0)?;
    let axis = axis_kw(kw, a.shape().ndim())?;
    Ok(match (a, stat) {
        (CpuView::F64(a), Statistic::Mean) => reduce(a, axis, reduce::mean)?.into_value(),
        (CpuView::F64(a), Statistic::StdDev) => reduce(a, axis, reduce::std_dev)?.into_value(),
        (CpuView::F32(a), Statistic::Mean) => reduce(a, axis, reduce::mean)?.into_value(),
        (CpuView::F32(a), Statistic::StdDev) => reduce(a, axis, reduce::std_dev)?.into_value(),
        (other, Statistic::Mean) => reduce(&other.cast::<f64>(), axis, reduce::mean)?.into_value(),
        (other, Statistic::StdDev) => {
            reduce(&other.cast::<f64>(), axis, reduce::std_dev)?.into_value()
        }
    })
}
