//! Dense row-major host arrays

use super::tags;
use crate::dtype::{DType, Element};
use crate::error::{Error, Result};
use crate::tensor::Shape;
use crate::types::{Array, Concrete, TypeTag, Value};
use num_traits::Float;
use std::any::Any;
use std::fmt::Debug;

/// Element types stored by [`CpuArray`]
pub trait CpuElement: Copy + Debug + PartialOrd + Send + Sync + 'static {
    /// Element dtype
    const DTYPE: DType;

    /// Concrete tag of arrays with this element type
    const TAG: Concrete;

    /// Widen to f64
    fn into_f64(self) -> f64;

    /// Narrow from f64 (truncating for integers, `!= 0` for booleans)
    fn from_f64(v: f64) -> Self;

    /// Additive identity
    const ZERO: Self;

    /// Multiplicative identity
    const ONE: Self;
}

macro_rules! impl_cpu_element {
    ($t:ty, $tag:expr) => {
        impl CpuElement for $t {
            const DTYPE: DType = <$t as Element>::DTYPE;
            const TAG: Concrete = $tag;
            const ZERO: Self = 0 as $t;
            const ONE: Self = 1 as $t;

            #[inline]
            fn into_f64(self) -> f64 {
                Element::to_f64(self)
            }

            #[inline]
            fn from_f64(v: f64) -> Self {
                <$t as Element>::from_f64(v)
            }
        }
    };
}

impl_cpu_element!(f64, tags::F64);
impl_cpu_element!(f32, tags::F32);
impl_cpu_element!(i64, tags::I64);

impl CpuElement for bool {
    const DTYPE: DType = DType::Bool;
    const TAG: Concrete = tags::BOOL;
    const ZERO: Self = false;
    const ONE: Self = true;

    #[inline]
    fn into_f64(self) -> f64 {
        if self { 1.0 } else { 0.0 }
    }

    #[inline]
    fn from_f64(v: f64) -> Self {
        v != 0.0
    }
}

/// Floating-point elements, for kernels needing `sqrt`, `exp` and friends
pub trait CpuFloat: CpuElement + Float {}

impl CpuFloat for f64 {}
impl CpuFloat for f32 {}

/// Dense, contiguous, row-major array on the host
#[derive(Clone, Debug, PartialEq)]
pub struct CpuArray<T: CpuElement> {
    shape: Shape,
    data: Vec<T>,
}

impl<T: CpuElement> CpuArray<T> {
    /// Array from a shape and row-major data
    pub fn new(shape: impl Into<Shape>, data: Vec<T>) -> Result<Self> {
        let shape = shape.into();
        if shape.numel() != data.len() {
            return Err(Error::invalid_shape(
                "CpuArray::new",
                format!("shape {shape:?} needs {} elements, got {}", shape.numel(), data.len()),
            ));
        }
        Ok(Self { shape, data })
    }

    pub(crate) fn from_parts(shape: Shape, data: Vec<T>) -> Self {
        debug_assert_eq!(shape.numel(), data.len());
        Self { shape, data }
    }

    /// Rank-1 array
    pub fn from_vec(data: Vec<T>) -> Self {
        Self {
            shape: Shape::from([data.len()]),
            data,
        }
    }

    /// Rank-0 array
    pub fn scalar(value: T) -> Self {
        Self {
            shape: Shape::new(),
            data: vec![value],
        }
    }

    /// Array with every element equal to `value`
    pub fn full(shape: impl Into<Shape>, value: T) -> Self {
        let shape = shape.into();
        let data = vec![value; shape.numel()];
        Self { shape, data }
    }

    /// Shape
    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    /// Row-major elements
    pub fn data(&self) -> &[T] {
        &self.data
    }

    /// Take the row-major elements
    pub fn into_data(self) -> Vec<T> {
        self.data
    }

    /// Number of axes
    pub fn ndim(&self) -> usize {
        self.shape.ndim()
    }

    /// Number of elements
    pub fn numel(&self) -> usize {
        self.data.len()
    }

    /// Same data under a new shape with the same element count
    pub(crate) fn with_shape(self, shape: Shape) -> Self {
        Self::from_parts(shape, self.data)
    }

    /// Apply `f` to every element
    pub fn map<U: CpuElement>(&self, f: impl Fn(T) -> U) -> CpuArray<U> {
        CpuArray::from_parts(self.shape.clone(), self.data.iter().map(|&x| f(x)).collect())
    }

    /// Convert every element through f64
    pub fn cast<U: CpuElement>(&self) -> CpuArray<U> {
        self.map(|x| U::from_f64(x.into_f64()))
    }

    /// Wrap as a dispatch value
    pub fn into_value(self) -> Value {
        Value::array(self)
    }

    /// Borrow the array behind `value`
    pub fn from_value<'a>(value: &'a Value, arg: &'static str) -> Result<&'a Self> {
        value
            .downcast_array::<Self>()
            .ok_or_else(|| Error::type_mismatch(arg, T::TAG.name(), value.type_tag()))
    }
}

impl<T: CpuElement> Array for CpuArray<T> {
    fn type_tag(&self) -> TypeTag {
        TypeTag::Concrete(T::TAG)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// A CPU array of any element type, borrowed from a [`Value`]
#[derive(Copy, Clone, Debug)]
pub(crate) enum CpuView<'a> {
    F64(&'a CpuArray<f64>),
    F32(&'a CpuArray<f32>),
    I64(&'a CpuArray<i64>),
    Bool(&'a CpuArray<bool>),
}

/// Evaluate `$body` with `$arr` bound to the typed array inside a [`CpuView`]
macro_rules! with_view {
    ($view:expr, $arr:ident => $body:expr) => {
        match $view {
            $crate::runtime::cpu::array::CpuView::F64($arr) => $body,
            $crate::runtime::cpu::array::CpuView::F32($arr) => $body,
            $crate::runtime::cpu::array::CpuView::I64($arr) => $body,
            $crate::runtime::cpu::array::CpuView::Bool($arr) => $body,
        }
    };
}
pub(crate) use with_view;

impl<'a> CpuView<'a> {
    /// View of a CPU array value
    pub fn of(value: &'a Value, arg: &'static str) -> Result<Self> {
        if let Some(a) = value.downcast_array::<CpuArray<f64>>() {
            Ok(Self::F64(a))
        } else if let Some(a) = value.downcast_array::<CpuArray<f32>>() {
            Ok(Self::F32(a))
        } else if let Some(a) = value.downcast_array::<CpuArray<i64>>() {
            Ok(Self::I64(a))
        } else if let Some(a) = value.downcast_array::<CpuArray<bool>>() {
            Ok(Self::Bool(a))
        } else {
            Err(Error::type_mismatch(arg, "CpuArray", value.type_tag()))
        }
    }

    pub fn shape(&self) -> &'a Shape {
        with_view!(*self, a => a.shape())
    }

    pub fn dtype(&self) -> DType {
        match self {
            Self::F64(_) => DType::F64,
            Self::F32(_) => DType::F32,
            Self::I64(_) => DType::I64,
            Self::Bool(_) => DType::Bool,
        }
    }

    pub fn cast<U: CpuElement>(&self) -> CpuArray<U> {
        with_view!(*self, a => a.cast::<U>())
    }

    /// Convert to a value of `dtype`, sharing nothing with the source
    pub fn cast_value(&self, dtype: DType) -> Result<Value> {
        Ok(match dtype {
            DType::F64 => self.cast::<f64>().into_value(),
            DType::F32 => self.cast::<f32>().into_value(),
            DType::I64 => self.cast::<i64>().into_value(),
            DType::Bool => self.cast::<bool>().into_value(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_checks_element_count() {
        assert!(CpuArray::new([2, 2], vec![1.0, 2.0, 3.0]).is_err());
        let a = CpuArray::new([2, 2], vec![1.0, 2.0, 3.0, 4.0]).unwrap();
        assert_eq!(a.ndim(), 2);
        assert_eq!(a.numel(), 4);
    }

    #[test]
    fn test_value_round_trip_and_tag() {
        let v = CpuArray::from_vec(vec![1i64, 2, 3]).into_value();
        assert_eq!(v.type_tag(), TypeTag::Concrete(tags::I64));
        assert!(CpuArray::<i64>::from_value(&v, "a").is_ok());
        assert!(CpuArray::<f64>::from_value(&v, "a").is_err());
    }

    #[test]
    fn test_view_cast() {
        let v = CpuArray::from_vec(vec![0.0, 2.5, -1.0]).into_value();
        let view = CpuView::of(&v, "a").unwrap();
        assert_eq!(view.dtype(), DType::F64);
        assert_eq!(view.cast::<i64>().data(), &[0, 2, -1]);
        assert_eq!(view.cast::<bool>().data(), &[false, true, true]);
    }
}
