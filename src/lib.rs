//! # numlab
//!
//! **Backend-agnostic numerical linear algebra driven by runtime multiple dispatch.**
//!
//! numlab lets one algorithm run unchanged on any array backend. Every
//! operation is looked up by name and by the runtime types of its arguments;
//! backends contribute implementations for their own types, and generic
//! algorithms are written once against the abstract primitives.
//!
//! ## Layers
//!
//! - **Type lattice** ([`types`]): concrete tags, unions and kind tops that
//!   signatures are written over
//! - **Dispatcher** ([`dispatch`]): registration, specificity ranking,
//!   promotion and a resolution cache
//! - **Primitives** ([`ops`]): the catalogue every backend provides, the
//!   defaults every backend inherits, and typed call wrappers
//! - **Generic algorithms** ([`algorithm`]): distances, triangular and
//!   Cholesky solves, packing of triangular matrices, `reg`, `logsumexp`
//! - **Backends** ([`runtime`]): the reference CPU backend
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use numlab::prelude::*;
//!
//! let d = lab()?;
//! let a = CpuArray::new([2, 2], vec![4.0, 2.0, 2.0, 3.0])?.into_value();
//! let chol = d.cholesky(&a)?;
//! let x = d.cholesky_solve(&chol, &d.eye_like(&a)?)?;
//! ```
//!
//! ## Feature Flags
//!
//! - `cpu` (default): CPU backend
//! - `rayon` (default): multi-threaded CPU matrix products

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_inception)]

pub mod algorithm;
pub mod dispatch;
pub mod dtype;
pub mod error;
pub mod ops;
pub mod runtime;
pub mod tensor;
pub mod types;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::dispatch::{Dispatcher, Kwargs, Signature, lab};
    pub use crate::dtype::DType;
    pub use crate::error::{Error, Result};
    pub use crate::runtime::{ActiveDevice, Device};
    pub use crate::types::{DTypeValue, StateHandle, TypeTag, Value};

    #[cfg(feature = "cpu")]
    pub use crate::runtime::cpu::{CpuArray, CpuBackend, CpuDevice, CpuRandomState};
}
