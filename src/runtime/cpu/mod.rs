//! Reference CPU backend
//!
//! Dense row-major [`CpuArray`]s of `f64`, `f32`, `i64` and `bool`, with
//! every abstract primitive implemented for its own concrete tags. Install it
//! with [`Dispatcher::install`](crate::dispatch::Dispatcher::install), or use
//! [`Dispatcher::with_builtins`](crate::dispatch::Dispatcher::with_builtins).
//!
//! # Broadcasting
//!
//! Binary elementwise operations broadcast NumPy-style: shapes are
//! right-aligned and size-1 axes stretch. Scalars and mixed dtypes are
//! unified by promotion rules before the kernels see them:
//!
//! ```text
//! (cpu.f64, float)    -> cpu.f64   scalar becomes a rank-0 array
//! (cpu.i64, float)    -> cpu.f64   both sides converted
//! (cpu.f32, cpu.i64)  -> cpu.f32   per dtype::promote
//! ```

pub(crate) mod array;
mod device;
pub(crate) mod jacobi;
pub(crate) mod kernels;
mod linalg;
mod ops;
mod random;

pub use array::{CpuArray, CpuElement, CpuFloat};
pub use device::CpuDevice;
pub use random::CpuRandomState;

use crate::dispatch::{BackendAdapter, Registrar};
use crate::dtype::DType;
use crate::error::Result;
use crate::types::DTypeValue;

/// Concrete tags of the CPU backend
pub mod tags {
    use crate::types::{Concrete, Kind, TypeTag};
    use std::sync::OnceLock;

    /// `f64` arrays
    pub const F64: Concrete = Concrete::numeric("cpu.f64");
    /// `f32` arrays
    pub const F32: Concrete = Concrete::numeric("cpu.f32");
    /// `i64` arrays
    pub const I64: Concrete = Concrete::numeric("cpu.i64");
    /// `bool` arrays
    pub const BOOL: Concrete = Concrete::numeric("cpu.bool");
    /// CPU dtype values
    pub const DTYPE: Concrete = Concrete::new("cpu.dtype", Kind::DType);
    /// CPU generator states
    pub const RANDOM_STATE: Concrete = Concrete::new("cpu.random_state", Kind::RandomState);

    /// Union of the four array tags
    pub fn array() -> TypeTag {
        static ARRAY: OnceLock<TypeTag> = OnceLock::new();
        ARRAY
            .get_or_init(|| TypeTag::union("CpuArray", [F64, F32, I64, BOOL].map(TypeTag::from)))
            .clone()
    }

    /// Every concrete tag of the backend
    pub fn all() -> Vec<TypeTag> {
        [F64, F32, I64, BOOL, DTYPE, RANDOM_STATE]
            .map(TypeTag::from)
            .to_vec()
    }
}

/// `f64` dtype on the CPU
pub const FLOAT64: DTypeValue = DTypeValue {
    dtype: DType::F64,
    tag: tags::DTYPE,
};
/// `f32` dtype on the CPU
pub const FLOAT32: DTypeValue = DTypeValue {
    dtype: DType::F32,
    tag: tags::DTYPE,
};
/// `i64` dtype on the CPU
pub const INT64: DTypeValue = DTypeValue {
    dtype: DType::I64,
    tag: tags::DTYPE,
};
/// `bool` dtype on the CPU
pub const BOOL: DTypeValue = DTypeValue {
    dtype: DType::Bool,
    tag: tags::DTYPE,
};

/// CPU dtype value for `dtype`
pub fn dtype(dtype: DType) -> DTypeValue {
    DTypeValue {
        dtype,
        tag: tags::DTYPE,
    }
}

/// Adapter registering the CPU backend
#[derive(Copy, Clone, Debug, Default)]
pub struct CpuBackend;

impl BackendAdapter for CpuBackend {
    fn name(&self) -> &str {
        "cpu"
    }

    fn register(&self, registrar: &Registrar<'_>) -> Result<()> {
        ops::register(registrar)
    }
}
