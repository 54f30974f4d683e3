//! Random draw entry points
//!
//! Explicit-state draws take a [`StateHandle`] and return it alongside the
//! result. The implicit forms use the process-wide default state of the
//! active device for the dtype's backend.

use crate::dispatch::{Dispatcher, Kwargs};
use crate::error::Result;
use crate::types::{DTypeValue, StateHandle, Value};

use super::{shape_args, split_draw};

fn draw_args(state: Option<&StateHandle>, dtype: DTypeValue, shape: &[usize]) -> Vec<Value> {
    state
        .map(|s| Value::State(s.clone()))
        .into_iter()
        .chain(std::iter::once(Value::from(dtype)))
        .chain(shape_args(shape))
        .collect()
}

fn bounds(lower: i64, upper: i64) -> Kwargs {
    Kwargs::new().with("lower", lower).with("upper", upper)
}

impl Dispatcher {
    /// New generator state for the dtype's backend
    pub fn create_random_state(&self, dtype: DTypeValue, seed: Option<u64>) -> Result<StateHandle> {
        let mut args = vec![Value::from(dtype)];
        if let Some(seed) = seed {
            args.push(Value::Int(seed as i64));
        }
        Ok(self
            .call("create_random_state", &args)?
            .expect_state("create_random_state")?
            .clone())
    }

    /// Default state of the active device, created on first use
    pub fn global_random_state(&self, dtype: DTypeValue) -> Result<StateHandle> {
        Ok(self
            .call("global_random_state", &[dtype.into()])?
            .expect_state("global_random_state")?
            .clone())
    }

    /// Replace the default state of the active device
    pub fn set_global_random_state(&self, state: &StateHandle) -> Result<()> {
        self.call("set_global_random_state", &[state.clone().into()])?;
        Ok(())
    }

    /// Uniform draws on `[0, 1)` from an explicit state
    pub fn rand_with(
        &self,
        state: &StateHandle,
        dtype: DTypeValue,
        shape: &[usize],
    ) -> Result<(StateHandle, Value)> {
        split_draw(self.call("rand", &draw_args(Some(state), dtype, shape))?)
    }

    /// Uniform draws on `[0, 1)` from the default state
    pub fn rand(&self, dtype: DTypeValue, shape: &[usize]) -> Result<Value> {
        self.call("rand", &draw_args(None, dtype, shape))
    }

    /// Standard normal draws from an explicit state
    pub fn randn_with(
        &self,
        state: &StateHandle,
        dtype: DTypeValue,
        shape: &[usize],
    ) -> Result<(StateHandle, Value)> {
        split_draw(self.call("randn", &draw_args(Some(state), dtype, shape))?)
    }

    /// Standard normal draws from the default state
    pub fn randn(&self, dtype: DTypeValue, shape: &[usize]) -> Result<Value> {
        self.call("randn", &draw_args(None, dtype, shape))
    }

    /// Integers uniform on `[lower, upper)` from an explicit state
    pub fn randint_with(
        &self,
        state: &StateHandle,
        dtype: DTypeValue,
        shape: &[usize],
        lower: i64,
        upper: i64,
    ) -> Result<(StateHandle, Value)> {
        split_draw(self.invoke(
            "randint",
            &draw_args(Some(state), dtype, shape),
            &bounds(lower, upper),
        )?)
    }

    /// Integers uniform on `[lower, upper)` from the default state
    pub fn randint(&self, dtype: DTypeValue, shape: &[usize], lower: i64, upper: i64) -> Result<Value> {
        self.invoke("randint", &draw_args(None, dtype, shape), &bounds(lower, upper))
    }

    /// Random permutation of `0..n` from an explicit state
    pub fn randperm_with(
        &self,
        state: &StateHandle,
        dtype: DTypeValue,
        n: usize,
    ) -> Result<(StateHandle, Value)> {
        split_draw(self.call("randperm", &draw_args(Some(state), dtype, &[n]))?)
    }

    /// Random permutation of `0..n` from the default state
    pub fn randperm(&self, dtype: DTypeValue, n: usize) -> Result<Value> {
        self.call("randperm", &draw_args(None, dtype, &[n]))
    }

    /// `n` leading-axis entries of `a` drawn with replacement from an explicit state
    ///
    /// With `n == 1` the single entry is returned without the leading axis.
    pub fn choice_with(
        &self,
        state: &StateHandle,
        a: impl Into<Value>,
        n: usize,
    ) -> Result<(StateHandle, Value)> {
        split_draw(self.call(
            "choice",
            &[Value::State(state.clone()), a.into(), Value::from(n)],
        )?)
    }

    /// `n` leading-axis entries of `a` drawn with replacement from the default state
    pub fn choice(&self, a: impl Into<Value>, n: usize) -> Result<Value> {
        self.call("choice", &[a.into(), Value::from(n)])
    }
}
