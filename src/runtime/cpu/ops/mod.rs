//! Registrations of the CPU backend
//!
//! Dtype-agnostic operations are registered once on the `CpuArray` union;
//! operations whose semantics depend on the element type are registered per
//! concrete tag, so mixed-dtype calls fall through to promotion.

mod creation;
mod elementwise;
mod linalg;
mod promotion;
mod random;
mod reduce;
mod shaping;

use super::array::CpuView;
use super::tags;
use crate::dispatch::{Kwargs, Registrar, Signature};
use crate::error::{Error, Result};
use crate::tensor::normalize_dim;
use crate::types::{TypeTag, Value};

const F64: TypeTag = TypeTag::Concrete(tags::F64);
const F32: TypeTag = TypeTag::Concrete(tags::F32);
const I64: TypeTag = TypeTag::Concrete(tags::I64);
const BOOL: TypeTag = TypeTag::Concrete(tags::BOOL);
const DTYPE: TypeTag = TypeTag::Concrete(tags::DTYPE);
const STATE: TypeTag = TypeTag::Concrete(tags::RANDOM_STATE);

pub(super) fn register(r: &Registrar<'_>) -> Result<()> {
    creation::register(r)?;
    shaping::register(r)?;
    elementwise::register(r)?;
    reduce::register(r)?;
    linalg::register(r)?;
    random::register(r)?;
    promotion::register(r)?;
    Ok(())
}

/// One argument of any CPU dtype
fn any_array() -> Signature {
    Signature::new([tags::array()])
}

/// Two arguments of the same concrete CPU dtype
fn same_dtype_pairs() -> [Signature; 4] {
    [F64, F32, I64, BOOL].map(|t| Signature::new([t.clone(), t]))
}

fn view<'a>(args: &'a [Value], index: usize) -> Result<CpuView<'a>> {
    const NAMES: [&str; 2] = ["a", "b"];
    CpuView::of(&args[index], NAMES.get(index).copied().unwrap_or("arg"))
}

/// Both operands of a binary call, which must share a dtype
fn pair(args: &[Value]) -> Result<(CpuView<'_>, CpuView<'_>)> {
    Ok((view(args, 0)?, view(args, 1)?))
}

fn dtype_mismatch(a: &CpuView<'_>, b: &CpuView<'_>) -> Error {
    Error::Internal(format!(
        "operands reached the kernel with different dtypes {} and {}",
        a.dtype(),
        b.dtype()
    ))
}

/// Optional `axis` keyword, normalised against `ndim`
fn axis_kw(kw: &Kwargs, ndim: usize) -> Result<Option<usize>> {
    kw.opt_int("axis")?
        .map(|axis| normalize_dim(axis as isize, ndim))
        .transpose()
}
