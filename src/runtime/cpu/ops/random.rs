//! Random states and draws
//!
//! Every draw locks its state for the whole kernel and returns the handle
//! alongside the result. Default states are kept per CPU device.

use super::{DTYPE, STATE, view};
use crate::dispatch::{Registrar, Signature};
use crate::dtype::DType;
use crate::error::{Error, Result};
use crate::ops::draw_result;
use crate::runtime::cpu::array::with_view;
use crate::runtime::cpu::{CpuDevice, CpuRandomState, tags};
use crate::runtime::{Device, random};
use crate::tensor::Shape;
use crate::types::{INT, StateHandle, Value};

/// Seed used when `create_random_state` is called without one
const DEFAULT_SEED: u64 = 0;

pub(super) fn register(r: &Registrar<'_>) -> Result<()> {
    r.register("create_random_state", Signature::new([DTYPE]).variadic(INT), |_, args, _| {
        let seed = match &args[1..] {
            [] => DEFAULT_SEED,
            [seed] => seed.expect_int("seed")? as u64,
            extra => {
                return Err(Error::invalid_argument(
                    "seed",
                    format!("expected at most one seed, got {}", extra.len()),
                ));
            }
        };
        Ok(StateHandle::new(CpuRandomState::seeded(seed)).into())
    })?;

    r.register("global_random_state", Signature::new([DTYPE]), |_, _, _| {
        Ok(default_state()?.into())
    })?;

    r.register("set_global_random_state", Signature::new([STATE]), |_, args, _| {
        let state = args[0].expect_state("state")?;
        let default = default_state()?;
        if !default.ptr_eq(state) {
            let snapshot = state.with(|s: &mut CpuRandomState| s.clone())?;
            default.with(|d: &mut CpuRandomState| *d = snapshot)?;
            tracing::debug!("default cpu random state replaced");
        }
        Ok(default.into())
    })?;

    let draw = || Signature::new([STATE, DTYPE]).variadic(INT);
    r.register("rand", draw(), |_, args, _| {
        let (state, dtype, shape) = draw_args(args)?;
        let out = state.with(|s: &mut CpuRandomState| match dtype {
            DType::F64 => Ok(s.uniform::<f64>(shape).into_value()),
            DType::F32 => Ok(s.uniform::<f32>(shape).into_value()),
            other => Err(Error::unsupported_dtype(other, "rand")),
        })??;
        Ok(draw_result(state, out))
    })?;
    r.register("randn", draw(), |_, args, _| {
        let (state, dtype, shape) = draw_args(args)?;
        let out = state.with(|s: &mut CpuRandomState| match dtype {
            DType::F64 => Ok(s.normal::<f64>(shape).into_value()),
            DType::F32 => Ok(s.normal::<f32>(shape).into_value()),
            other => Err(Error::unsupported_dtype(other, "randn")),
        })??;
        Ok(draw_result(state, out))
    })?;
    r.register("randint", draw(), |_, args, kw| {
        let (state, _, shape) = draw_args(args)?;
        let lower = kw.int_or("lower", 0)?;
        let upper = kw
            .opt_int("upper")?
            .ok_or_else(|| Error::invalid_argument("upper", "randint requires an upper bound"))?;
        let out = state.with(|s: &mut CpuRandomState| s.integers(shape, lower, upper))??;
        Ok(draw_result(state, out.into_value()))
    })?;

    r.register("randperm", Signature::new([STATE, DTYPE, INT]), |_, args, _| {
        let state = args[0].expect_state("state")?;
        let n = args[2].expect_usize("n")?;
        let out = state.with(|s: &mut CpuRandomState| s.permutation(n))?;
        Ok(draw_result(state, out.into_value()))
    })?;

    r.register("choice", Signature::new([STATE, tags::array(), INT]), |_, args, _| {
        let state = args[0].expect_state("state")?;
        let n = args[2].expect_usize("n")?;
        let out = state.with(|s: &mut CpuRandomState| {
            with_view!(view(&args[1..], 0)?, a => Ok::<_, Error>(s.choice(a, n)?.into_value()))
        })??;
        Ok(draw_result(state, out))
    })?;
    Ok(())
}

/// Default state of the active CPU device
fn default_state() -> Result<StateHandle> {
    let device = CpuDevice::active()?;
    random::default_state("cpu", &device.name(), || {
        Ok(StateHandle::new(CpuRandomState::from_entropy()))
    })
}

fn draw_args(args: &[Value]) -> Result<(&StateHandle, DType, Shape)> {
    let state = args[0].expect_state("state")?;
    let dtype = args[1].expect_dtype("dtype")?.dtype;
    let shape = args[2..]
        .iter()
        .map(|d| d.expect_usize("shape"))
        .collect::<Result<Shape>>()?;
    Ok((state, dtype, shape))
}
