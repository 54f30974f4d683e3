//! Abstract primitives, their defaults, and typed call wrappers
//!
//! # Design
//!
//! ```text
//! Catalogue   declares every primitive (signature, no implementation)
//! Defaults    implementations valid for every backend, registered at the
//!             union / AnyOf level so any backend can override them
//! wrappers    `impl Dispatcher { fn matmul(..), fn sum(..), .. }`, thin typed
//!             entry points over `Dispatcher::invoke`
//! ```
//!
//! Backends only ever see `&[Value]` plus [`Kwargs`](crate::dispatch::Kwargs);
//! the wrappers fix the argument order and keyword names used throughout.

mod catalogue;
mod defaults;
mod elementwise;
mod linalg;
mod random;
mod shaping;

pub use catalogue::{Catalogue, PRIMITIVES, Param, Primitive, primitive};
pub use defaults::Defaults;
pub use linalg::Svd;

use crate::error::{Error, Result};
use crate::types::{StateHandle, Value};

/// Split the `(state, result)` pair returned by explicit-state draws
pub(crate) fn split_draw(value: Value) -> Result<(StateHandle, Value)> {
    let [state, result]: [Value; 2] =
        value.into_list("draw")?.try_into().map_err(|items: Vec<Value>| {
            Error::Internal(format!(
                "random draw returned {} values, expected (state, result)",
                items.len()
            ))
        })?;
    Ok((state.expect_state("state")?.clone(), result))
}

/// Pair an updated state with a draw result
pub(crate) fn draw_result(state: &StateHandle, result: Value) -> Value {
    Value::List(vec![Value::State(state.clone()), result])
}

/// Integer shape arguments from `usize` dimensions
pub(crate) fn shape_args(shape: &[usize]) -> impl Iterator<Item = Value> + '_ {
    shape.iter().map(|&d| Value::from(d))
}
