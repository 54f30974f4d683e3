//! Shape queries and shape manipulation

use super::{BOOL, F32, F64, I64, any_array, view};
use crate::dispatch::{Kwargs, Registrar, Signature};
use crate::error::{Error, Result};
use crate::runtime::cpu::array::{CpuArray, CpuElement, CpuView, with_view};
use crate::runtime::cpu::kernels::shape;
use crate::runtime::cpu::tags;
use crate::types::{ANY, INT, Value};

pub(super) fn register(r: &Registrar<'_>) -> Result<()> {
    r.register("shape", any_array(), |_, args, _| {
        let dims = view(args, 0)?.shape().iter().map(|&d| Value::from(d));
        Ok(Value::List(dims.collect()))
    })?;
    r.register("rank", any_array(), |_, args, _| {
        Ok(Value::from(view(args, 0)?.shape().ndim()))
    })?;
    r.register("length", any_array(), |_, args, _| {
        let dims = view(args, 0)?.shape();
        dims.first()
            .map(|&len| Value::from(len))
            .ok_or_else(|| Error::invalid_rank("length", "rank at least 1", 0))
    })?;

    r.register("expand_dims", any_array(), |_, args, kw| {
        let axis = kw.int_or("axis", 0)? as isize;
        with_view!(view(args, 0)?, a => Ok(shape::expand_dims(a, axis)?.into_value()))
    })?;
    r.register("squeeze", any_array(), |_, args, _| {
        with_view!(view(args, 0)?, a => Ok(shape::squeeze(a).into_value()))
    })?;
    r.register("diag", any_array(), |_, args, _| {
        with_view!(view(args, 0)?, a => Ok(shape::diag(a)?.into_value()))
    })?;
    r.register("reshape", any_array().variadic(INT), |_, args, _| {
        let dims = args[1..]
            .iter()
            .map(|d| d.expect_int("shape"))
            .collect::<Result<Vec<_>>>()?;
        with_view!(view(args, 0)?, a => Ok(shape::reshape(a, &dims)?.into_value()))
    })?;
    r.register("transpose", any_array(), |_, args, kw| {
        let perm = kw.get("perm").map(|p| p.expect_usize_list("perm")).transpose()?;
        with_view!(view(args, 0)?, a => {
            let out = match &perm {
                Some(perm) => shape::permute(a, perm)?,
                None => shape::transpose(a)?,
            };
            Ok(out.into_value())
        })
    })?;

    let joins = || [F64, F32, I64, BOOL].map(Signature::varargs);
    r.register_all("stack", joins(), |_, args, kw| {
        join(args, kw, Join::Stack)
    })?;
    r.register_all("concat", joins(), |_, args, kw| {
        join(args, kw, Join::Concat)
    })?;
    r.register("unstack", any_array(), |_, args, kw| {
        let axis = kw.int_or("axis", 0)? as isize;
        with_view!(view(args, 0)?, a => {
            let parts = shape::unstack(a, axis)?;
            Ok(Value::List(parts.into_iter().map(CpuArray::into_value).collect()))
        })
    })?;

    let take = Signature::new([tags::array(), ANY]);
    r.register("take_leading", take, |_, args, _| {
        let source = view(args, 0)?;
        let len = source
            .shape()
            .first()
            .copied()
            .ok_or_else(|| Error::invalid_rank("take", "rank at least 1", 0))?;
        let rows = leading_indices(&args[1], len)?;
        with_view!(source, a => Ok(shape::take_rows(a, &rows)?.into_value()))
    })?;
    Ok(())
}

#[derive(Copy, Clone)]
enum Join {
    Stack,
    Concat,
}

impl Join {
    fn name(self) -> &'static str {
        match self {
            Self::Stack => "stack",
            Self::Concat => "concat",
        }
    }

    fn apply<T: CpuElement>(self, arrays: &[&CpuArray<T>], axis: isize) -> Result<CpuArray<T>> {
        match self {
            Self::Stack => shape::stack(arrays, axis),
            Self::Concat => shape::concat(arrays, axis),
        }
    }
}

/// Join arguments that all share the first one's dtype
fn join(args: &[Value], kw: &Kwargs, how: Join) -> Result<Value> {
    if args.is_empty() {
        return Err(Error::invalid_argument(
            "arrays",
            format!("{} needs at least one array", how.name()),
        ));
    }
    let axis = kw.int_or("axis", 0)? as isize;
    with_view!(view(args, 0)?, first => {
        let arrays = same_dtype(first, args)?;
        Ok(how.apply(&arrays, axis)?.into_value())
    })
}

fn same_dtype<'a, T: CpuElement>(_: &CpuArray<T>, args: &'a [Value]) -> Result<Vec<&'a CpuArray<T>>> {
    args.iter().map(|v| CpuArray::<T>::from_value(v, "arrays")).collect()
}

/// Leading-axis rows selected by an index list, an `i64` array or a mask
fn leading_indices(indices: &Value, len: usize) -> Result<Vec<usize>> {
    match indices {
        Value::List(items) if !items.is_empty() && items.iter().all(|v| v.as_bool().is_some()) => {
            let mask: Vec<bool> = items.iter().filter_map(Value::as_bool).collect();
            shape::mask_indices(&mask, len)
        }
        Value::List(items) => {
            let ints = items
                .iter()
                .map(|v| v.expect_int("indices"))
                .collect::<Result<Vec<_>>>()?;
            shape::resolve_indices(&ints, len)
        }
        Value::Array(_) => match CpuView::of(indices, "indices")? {
            CpuView::I64(a) if a.ndim() == 1 => shape::resolve_indices(a.data(), len),
            CpuView::Bool(a) if a.ndim() == 1 => shape::mask_indices(a.data(), len),
            CpuView::I64(a) => Err(Error::invalid_rank("take", "rank-1 indices", a.ndim())),
            CpuView::Bool(a) => Err(Error::invalid_rank("take", "a rank-1 mask", a.ndim())),
            other => Err(Error::type_mismatch(
                "indices",
                "integer indices or a boolean mask",
                other.dtype(),
            )),
        },
        other => Err(Error::type_mismatch(
            "indices",
            "integer indices or a boolean mask",
            other.type_tag(),
        )),
    }
}
