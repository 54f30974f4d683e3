//! Generic algorithms written once against the primitives
//!
//! Nothing here touches a backend array directly: every routine is a
//! composition of dispatched primitives, so it holds for every backend that
//! implements the catalogue. Routines are registered at the `Numeric` level,
//! which lets a backend with a faster native path override any of them by
//! registering a more specific signature.
//!
//! | Routine | Built from |
//! |---------|-----------|
//! | `pw_dists2`, `pw_sums2` | `multiply`, `sum`, `matmul(tr_b)` |
//! | `ew_dists2`, `ew_sums2` | `subtract`/`add`, `sum` |
//! | `*_dists`, `*_sums` | squared form, `sqrt`, `maximum(·, 1e-30)` |
//! | `trisolve` | `triangular_solve` per trailing 2-D slice |
//! | `cholesky_solve` | two `trisolve`s |
//! | `vec_to_tril`, `tril_to_vec` | `concat`, `take_leading`, `reshape` |
//! | `take` | `transpose`, `take_leading` |
//! | `logsumexp` | `max`, `exp`, `sum`, `log` |
//! | [`reg`] | `maximum`, `eye`, `add` |

mod distance;
mod shaping;
mod solve;

pub use distance::SQRT_FLOOR;
pub use shaping::{concat2d, take, tril_to_vec, vec_to_tril};
pub use solve::{cholesky_solve, trisolve};

use crate::dispatch::{BackendAdapter, Dispatcher, Registrar, Signature};
use crate::error::Result;
use crate::tensor::normalize_dim;
use crate::types::{NUMERIC, Value};

/// Magnitude of the diagonal added by [`reg`]
pub const EPSILON: f64 = 1e-12;

/// Add a diagonal to a matrix: `a + diag · I`
///
/// `diag` defaults to [`EPSILON`]. With `clip`, a supplied `diag` is floored
/// at [`EPSILON`].
pub fn reg(d: &Dispatcher, a: &Value, diag: Option<Value>, clip: bool) -> Result<Value> {
    let diag = match diag {
        None => Value::Float(EPSILON),
        Some(diag) if clip => d.maximum(diag, EPSILON)?,
        Some(diag) => diag,
    };
    d.add(a, d.multiply(diag, d.eye_like(a)?)?)
}

/// `log(sum(exp(a)))` over `axis` (or everything), shifted by the maximum
pub fn logsumexp(d: &Dispatcher, a: &Value, axis: Option<isize>) -> Result<Value> {
    let peak = d.max(a, axis)?;
    let shift = match axis {
        Some(axis) => d.expand_dims(&peak, normalize_dim(axis, d.rank(a)?)? as isize)?,
        None => peak.clone(),
    };
    let summed = d.sum(d.exp(d.subtract(a, shift)?)?, axis)?;
    d.add(d.log(summed)?, peak)
}

impl Dispatcher {
    /// See [`reg`]
    pub fn reg(&self, a: &Value, diag: Option<Value>, clip: bool) -> Result<Value> {
        reg(self, a, diag, clip)
    }
}

/// Adapter registering the generic algorithms
#[derive(Copy, Clone, Debug, Default)]
pub struct GenericAlgorithms;

impl BackendAdapter for GenericAlgorithms {
    fn name(&self) -> &str {
        "generic"
    }

    fn register(&self, r: &Registrar<'_>) -> Result<()> {
        distance::register(r)?;
        solve::register(r)?;
        shaping::register(r)?;
        r.register("logsumexp", Signature::new([NUMERIC]), |d, args, kw| {
            logsumexp(d, &args[0], kw.opt_int("axis")?.map(|a| a as isize))
        })?;
        Ok(())
    }
}
