//! Generator state and draw kernels of the CPU backend

use super::array::{CpuArray, CpuElement, CpuFloat};
use super::kernels::shape::take_rows;
use super::tags;
use crate::error::{Error, Result};
use crate::tensor::Shape;
use crate::types::{RandomState, TypeTag};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;
use std::any::Any;

/// Seedable CPU generator state
#[derive(Clone, Debug)]
pub struct CpuRandomState {
    rng: StdRng,
}

impl CpuRandomState {
    /// Deterministic state from `seed`
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// State seeded from the operating system
    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_os_rng(),
        }
    }

    /// Uniform draws on `[0, 1)`
    pub(crate) fn uniform<T: CpuFloat>(&mut self, shape: Shape) -> CpuArray<T> {
        let data = (0..shape.numel())
            .map(|_| T::from_f64(self.rng.random::<f64>()))
            .collect();
        CpuArray::from_parts(shape, data)
    }

    /// Standard normal draws
    pub(crate) fn normal<T: CpuFloat>(&mut self, shape: Shape) -> CpuArray<T> {
        let data = (0..shape.numel())
            .map(|_| T::from_f64(self.rng.sample::<f64, _>(StandardNormal)))
            .collect();
        CpuArray::from_parts(shape, data)
    }

    /// Integers uniform on `[lower, upper)`
    pub(crate) fn integers(&mut self, shape: Shape, lower: i64, upper: i64) -> Result<CpuArray<i64>> {
        if lower >= upper {
            return Err(Error::invalid_argument(
                "upper",
                format!("empty range [{lower}, {upper})"),
            ));
        }
        let data = (0..shape.numel())
            .map(|_| self.rng.random_range(lower..upper))
            .collect();
        Ok(CpuArray::from_parts(shape, data))
    }

    /// Random permutation of `0..n`
    pub(crate) fn permutation(&mut self, n: usize) -> CpuArray<i64> {
        let mut data: Vec<i64> = (0..n as i64).collect();
        data.shuffle(&mut self.rng);
        CpuArray::from_vec(data)
    }

    /// `n` leading-axis entries of `a`, drawn with replacement
    ///
    /// With `n == 1` the leading axis is dropped.
    pub(crate) fn choice<T: CpuElement>(&mut self, a: &CpuArray<T>, n: usize) -> Result<CpuArray<T>> {
        let len = match a.shape().first() {
            Some(&len) if len > 0 => len,
            Some(_) => return Err(Error::invalid_argument("a", "cannot choose from an empty array")),
            None => return Err(Error::invalid_rank("choice", "rank at least 1", 0)),
        };
        let indices: Vec<usize> = (0..n).map(|_| self.rng.random_range(0..len)).collect();
        let chosen = take_rows(a, &indices)?;
        if n == 1 {
            let shape: Shape = a.shape()[1..].iter().copied().collect();
            return Ok(chosen.with_shape(shape));
        }
        Ok(chosen)
    }
}

impl RandomState for CpuRandomState {
    fn type_tag(&self) -> TypeTag {
        TypeTag::Concrete(tags::RANDOM_STATE)
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seeded_states_agree() {
        let mut a = CpuRandomState::seeded(7);
        let mut b = CpuRandomState::seeded(7);
        let x = a.uniform::<f64>(Shape::from([5]));
        let y = b.uniform::<f64>(Shape::from([5]));
        assert_eq!(x, y);
        assert!(x.data().iter().all(|&v| (0.0..1.0).contains(&v)));
        assert_ne!(a.uniform::<f64>(Shape::from([5])), x);
    }

    #[test]
    fn test_integers_in_range() {
        let mut s = CpuRandomState::seeded(1);
        let draws = s.integers(Shape::from([100]), -3, 4).unwrap();
        assert!(draws.data().iter().all(|&v| (-3..4).contains(&v)));
        assert!(s.integers(Shape::from([1]), 2, 2).is_err());
    }

    #[test]
    fn test_permutation_is_complete() {
        let mut s = CpuRandomState::seeded(3);
        let mut p = s.permutation(10).into_data();
        p.sort_unstable();
        assert_eq!(p, (0..10).collect::<Vec<i64>>());
    }

    #[test]
    fn test_choice_shapes() {
        let mut s = CpuRandomState::seeded(0);
        let a = CpuArray::new([3, 2], vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]).unwrap();
        assert_eq!(s.choice(&a, 4).unwrap().shape().as_slice(), &[4, 2]);
        assert_eq!(s.choice(&a, 1).unwrap().shape().as_slice(), &[2]);
        let empty = CpuArray::<f64>::new([0], vec![]).unwrap();
        assert!(s.choice(&empty, 1).is_err());
    }
}
