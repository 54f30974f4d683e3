//! Elementwise, reduction and creation entry points

use crate::dispatch::{Dispatcher, Kwargs};
use crate::error::Result;
use crate::types::{DTypeValue, Value};

use super::shape_args;

macro_rules! unary_ops {
    ($($(#[$doc:meta])* $name:ident),* $(,)?) => {
        impl Dispatcher {
            $(
                $(#[$doc])*
                pub fn $name(&self, a: impl Into<Value>) -> Result<Value> {
                    self.call(stringify!($name), &[a.into()])
                }
            )*
        }
    };
}

macro_rules! binary_ops {
    ($($(#[$doc:meta])* $name:ident),* $(,)?) => {
        impl Dispatcher {
            $(
                $(#[$doc])*
                pub fn $name(&self, a: impl Into<Value>, b: impl Into<Value>) -> Result<Value> {
                    self.call(stringify!($name), &[a.into(), b.into()])
                }
            )*
        }
    };
}

macro_rules! reduce_ops {
    ($($(#[$doc:meta])* $name:ident),* $(,)?) => {
        impl Dispatcher {
            $(
                $(#[$doc])*
                pub fn $name(&self, a: impl Into<Value>, axis: Option<isize>) -> Result<Value> {
                    self.invoke(
                        stringify!($name),
                        &[a.into()],
                        &Kwargs::new().with_opt("axis", axis),
                    )
                }
            )*
        }
    };
}

unary_ops! {
    /// `-a`
    negative,
    /// `|a|`
    abs,
    /// Sign (-1, 0 or 1)
    sign,
    /// Square root
    sqrt,
    /// Exponential
    exp,
    /// Natural logarithm
    log,
    /// Sine
    sin,
    /// Cosine
    cos,
    /// Tangent
    tan,
    /// Hyperbolic tangent
    tanh,
    /// `1 / (1 + exp(-a))`
    sigmoid,
    /// `max(a, 0)`
    relu,
    /// `log(1 + exp(a))`, computed stably
    softplus,
}

binary_ops! {
    /// `a + b`
    add,
    /// `a - b`
    subtract,
    /// `a * b`
    multiply,
    /// `a / b`
    divide,
    /// `a ^ b`
    power,
    /// Elementwise minimum
    minimum,
    /// Elementwise maximum
    maximum,
    /// `a < b`
    lt,
    /// `a <= b`
    le,
    /// `a > b`
    gt,
    /// `a >= b`
    ge,
}

reduce_ops! {
    /// Sum over `axis`, or over everything
    sum,
    /// Mean over `axis`, or over everything
    mean,
    /// Minimum over `axis`, or over everything
    min,
    /// Maximum over `axis`, or over everything
    max,
    /// Population standard deviation over `axis`, or over everything
    std,
    /// Whether all entries are true
    all,
    /// Whether any entry is true
    any,
    /// `log(sum(exp(a)))`, computed stably
    logsumexp,
}

impl Dispatcher {
    /// Backend dtype of `a`
    pub fn dtype(&self, a: impl Into<Value>) -> Result<DTypeValue> {
        self.call("dtype", &[a.into()])?.expect_dtype("dtype")
    }

    /// Convert `a` to `dtype`
    pub fn cast(&self, dtype: DTypeValue, a: impl Into<Value>) -> Result<Value> {
        self.call("cast", &[dtype.into(), a.into()])
    }

    /// Zeros of the given dtype and shape
    pub fn zeros(&self, dtype: DTypeValue, shape: &[usize]) -> Result<Value> {
        self.call("zeros", &creation_args(dtype, shape))
    }

    /// Ones of the given dtype and shape
    pub fn ones(&self, dtype: DTypeValue, shape: &[usize]) -> Result<Value> {
        self.call("ones", &creation_args(dtype, shape))
    }

    /// Identity; one dimension means a square matrix
    pub fn eye(&self, dtype: DTypeValue, shape: &[usize]) -> Result<Value> {
        self.call("eye", &creation_args(dtype, shape))
    }

    /// Zeros shaped and typed like `reference`
    pub fn zeros_like(&self, reference: impl Into<Value>) -> Result<Value> {
        self.call("zeros", &[reference.into()])
    }

    /// Ones shaped and typed like `reference`
    pub fn ones_like(&self, reference: impl Into<Value>) -> Result<Value> {
        self.call("ones", &[reference.into()])
    }

    /// Identity shaped and typed like `reference`
    pub fn eye_like(&self, reference: impl Into<Value>) -> Result<Value> {
        self.call("eye", &[reference.into()])
    }
}

fn creation_args(dtype: DTypeValue, shape: &[usize]) -> Vec<Value> {
    std::iter::once(Value::from(dtype))
        .chain(shape_args(shape))
        .collect()
}
