//! Axis reductions

use super::split_at_axis;
use crate::error::{Error, Result};
use crate::runtime::cpu::array::{CpuArray, CpuElement, CpuFloat};

/// Reduce every lane along `axis` (or all elements) with `f`
///
/// Lanes are handed to `f` in ascending index order.
pub(crate) fn reduce<T, U>(
    a: &CpuArray<T>,
    axis: Option<usize>,
    f: impl Fn(&[T]) -> Result<U>,
) -> Result<CpuArray<U>>
where
    T: CpuElement,
    U: CpuElement,
{
    let Some(axis) = axis else {
        return Ok(CpuArray::scalar(f(a.data())?));
    };

    let (outer, len, inner) = split_at_axis(a.shape(), axis);
    let mut shape = a.shape().clone();
    shape.remove(axis);

    let mut lane = Vec::with_capacity(len);
    let mut data = Vec::with_capacity(outer * inner);
    for o in 0..outer {
        for i in 0..inner {
            lane.clear();
            lane.extend((0..len).map(|j| a.data()[(o * len + j) * inner + i]));
            data.push(f(&lane)?);
        }
    }
    Ok(CpuArray::from_parts(shape, data))
}

pub(crate) fn sum<T: CpuElement + num_traits::Num>(lane: &[T]) -> Result<T> {
    Ok(lane.iter().fold(T::zero(), |acc, &x| acc + x))
}

fn nonempty<T>(lane: &[T], op: &'static str) -> Result<()> {
    if lane.is_empty() {
        return Err(Error::invalid_shape(op, "reduction over an empty axis"));
    }
    Ok(())
}

pub(crate) fn min<T: CpuElement>(lane: &[T]) -> Result<T> {
    nonempty(lane, "min")?;
    Ok(lane[1..]
        .iter()
        .fold(lane[0], |acc, &x| if x < acc { x } else { acc }))
}

pub(crate) fn max<T: CpuElement>(lane: &[T]) -> Result<T> {
    nonempty(lane, "max")?;
    Ok(lane[1..]
        .iter()
        .fold(lane[0], |acc, &x| if x > acc { x } else { acc }))
}

pub(crate) fn mean<T: CpuFloat>(lane: &[T]) -> Result<T> {
    nonempty(lane, "mean")?;
    Ok(sum(lane)? / T::from_f64(lane.len() as f64))
}

/// Population standard deviation
pub(crate) fn std_dev<T: CpuFloat>(lane: &[T]) -> Result<T> {
    let mu = mean(lane)?;
    let var = lane
        .iter()
        .fold(T::zero(), |acc, &x| acc + (x - mu) * (x - mu))
        / T::from_f64(lane.len() as f64);
    Ok(var.sqrt())
}

pub(crate) fn all<T: CpuElement>(lane: &[T]) -> Result<bool> {
    Ok(lane.iter().all(|&x| x != T::ZERO))
}

pub(crate) fn any<T: CpuElement>(lane: &[T]) -> Result<bool> {
    Ok(lane.iter().any(|&x| x != T::ZERO))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matrix() -> CpuArray<f64> {
        CpuArray::new([2, 3], vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]).unwrap()
    }

    #[test]
    fn test_sum_axes() {
        let a = matrix();
        assert_eq!(reduce(&a, None, sum).unwrap().data(), &[21.0]);
        let rows = reduce(&a, Some(1), sum).unwrap();
        assert_eq!(rows.shape().as_slice(), &[2]);
        assert_eq!(rows.data(), &[6.0, 15.0]);
        let cols = reduce(&a, Some(0), sum).unwrap();
        assert_eq!(cols.data(), &[5.0, 7.0, 9.0]);
    }

    #[test]
    fn test_min_max_mean_std() {
        let a = matrix();
        assert_eq!(reduce(&a, Some(1), min).unwrap().data(), &[1.0, 4.0]);
        assert_eq!(reduce(&a, Some(0), max).unwrap().data(), &[4.0, 5.0, 6.0]);
        assert_eq!(reduce(&a, None, mean).unwrap().data(), &[3.5]);
        let s = CpuArray::from_vec(vec![2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]);
        assert_eq!(reduce(&s, None, std_dev).unwrap().data(), &[2.0]);
    }

    #[test]
    fn test_empty_max_fails() {
        let a = CpuArray::<f64>::from_vec(vec![]);
        assert!(reduce(&a, None, max).is_err());
        assert_eq!(reduce(&a, None, sum).unwrap().data(), &[0.0]);
    }

    #[test]
    fn test_all_any() {
        let a = CpuArray::from_vec(vec![true, false]);
        assert_eq!(reduce(&a, None, all).unwrap().data(), &[false]);
        assert_eq!(reduce(&a, None, any).unwrap().data(), &[true]);
    }
}
