//! Runtime values passed through the dispatcher

use super::{Concrete, FLOAT, INT, BOOL, NUMERIC, TypeTag, list_of};
use crate::dtype::DType;
use crate::error::{Error, Result};
use parking_lot::{Mutex, MutexGuard};
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// A backend array representation
///
/// Backends implement this for their native array type and downcast through
/// [`Array::as_any`] inside their registered implementations.
pub trait Array: fmt::Debug + Send + Sync + 'static {
    /// Concrete tag of this array (backend + element kind)
    fn type_tag(&self) -> TypeTag;

    /// Access for downcasting
    fn as_any(&self) -> &dyn Any;
}

/// Shared, immutable array handle
pub type ArrayRef = Arc<dyn Array>;

/// Backend generator state behind a [`StateHandle`]
pub trait RandomState: fmt::Debug + Send + 'static {
    /// Concrete tag of this state (kind `RandomState`)
    fn type_tag(&self) -> TypeTag;

    /// Mutable access for downcasting
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// Opaque, shared handle to mutable generator state
///
/// Cloning shares the underlying state. The mutex serialises draws so that
/// concurrent users of one handle never interleave inside a draw.
#[derive(Clone)]
pub struct StateHandle {
    tag: TypeTag,
    inner: Arc<Mutex<Box<dyn RandomState>>>,
}

impl StateHandle {
    /// Wrap a backend state
    pub fn new<S: RandomState>(state: S) -> Self {
        Self {
            tag: state.type_tag(),
            inner: Arc::new(Mutex::new(Box::new(state))),
        }
    }

    /// Concrete tag of the wrapped state
    pub fn type_tag(&self) -> TypeTag {
        self.tag.clone()
    }

    /// Lock the state for the duration of one draw
    pub fn lock(&self) -> MutexGuard<'_, Box<dyn RandomState>> {
        self.inner.lock()
    }

    /// Run `f` on the state downcast to `S`, holding the lock throughout
    pub fn with<S: RandomState, R>(&self, f: impl FnOnce(&mut S) -> R) -> Result<R> {
        let mut guard = self.inner.lock();
        let state = guard
            .as_any_mut()
            .downcast_mut::<S>()
            .ok_or_else(|| Error::type_mismatch("state", std::any::type_name::<S>(), &self.tag))?;
        Ok(f(state))
    }

    /// Whether two handles share the same state
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for StateHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateHandle")
            .field("tag", &self.tag)
            .finish_non_exhaustive()
    }
}

/// A dtype value tagged with the backend it belongs to
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct DTypeValue {
    /// Element type
    pub dtype: DType,
    /// Backend dtype tag (kind `DType`)
    pub tag: Concrete,
}

/// A dynamically typed argument or result
#[derive(Clone, Debug)]
pub enum Value {
    /// Float scalar
    Float(f64),
    /// Integer scalar
    Int(i64),
    /// Boolean scalar
    Bool(bool),
    /// Backend array
    Array(ArrayRef),
    /// Ordered container
    List(Vec<Value>),
    /// Backend dtype
    DType(DTypeValue),
    /// Random state handle
    State(StateHandle),
}

impl Value {
    /// Wrap a backend array
    pub fn array<A: Array>(array: A) -> Self {
        Self::Array(Arc::new(array))
    }

    /// Concrete runtime tag used for resolution
    pub fn type_tag(&self) -> TypeTag {
        match self {
            Self::Float(_) => FLOAT,
            Self::Int(_) => INT,
            Self::Bool(_) => BOOL,
            Self::Array(a) => a.type_tag(),
            Self::List(items) => {
                let mut tags = items.iter().map(Value::type_tag);
                match tags.next() {
                    None => list_of(NUMERIC),
                    Some(first) => list_of(tags.fold(first, |acc, t| acc.join(&t))),
                }
            }
            Self::DType(d) => TypeTag::Concrete(d.tag),
            Self::State(s) => s.type_tag(),
        }
    }

    /// Downcast an array value to a backend type
    pub fn downcast_array<A: Array>(&self) -> Option<&A> {
        match self {
            Self::Array(a) => a.as_any().downcast_ref::<A>(),
            _ => None,
        }
    }

    /// Scalar as f64 (ints and bools widen)
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Float(v) => Some(*v),
            Self::Int(v) => Some(*v as f64),
            Self::Bool(v) => Some(if *v { 1.0 } else { 0.0 }),
            _ => None,
        }
    }

    /// Integer scalar
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// Boolean scalar
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(v) => Some(*v),
            _ => None,
        }
    }

    /// Whether this is a scalar (float, int or bool)
    pub fn is_scalar(&self) -> bool {
        matches!(self, Self::Float(_) | Self::Int(_) | Self::Bool(_))
    }

    /// Extract a float scalar or fail with a type mismatch naming `arg`
    pub fn expect_f64(&self, arg: &'static str) -> Result<f64> {
        self.as_f64()
            .ok_or_else(|| Error::type_mismatch(arg, "number", self.type_tag()))
    }

    /// Extract an integer scalar or fail with a type mismatch naming `arg`
    pub fn expect_int(&self, arg: &'static str) -> Result<i64> {
        self.as_int()
            .ok_or_else(|| Error::type_mismatch(arg, "int", self.type_tag()))
    }

    /// Extract a non-negative integer
    pub fn expect_usize(&self, arg: &'static str) -> Result<usize> {
        let v = self.expect_int(arg)?;
        usize::try_from(v).map_err(|_| Error::invalid_argument(arg, format!("{v} is negative")))
    }

    /// Extract a boolean scalar
    pub fn expect_bool(&self, arg: &'static str) -> Result<bool> {
        self.as_bool()
            .ok_or_else(|| Error::type_mismatch(arg, "bool", self.type_tag()))
    }

    /// Borrow list items
    pub fn expect_list(&self, arg: &'static str) -> Result<&[Value]> {
        match self {
            Self::List(items) => Ok(items),
            other => Err(Error::type_mismatch(arg, "list", other.type_tag())),
        }
    }

    /// Take list items
    pub fn into_list(self, arg: &'static str) -> Result<Vec<Value>> {
        match self {
            Self::List(items) => Ok(items),
            other => Err(Error::type_mismatch(arg, "list", other.type_tag())),
        }
    }

    /// Backend dtype
    pub fn expect_dtype(&self, arg: &'static str) -> Result<DTypeValue> {
        match self {
            Self::DType(d) => Ok(*d),
            other => Err(Error::type_mismatch(arg, "dtype", other.type_tag())),
        }
    }

    /// Random state handle
    pub fn expect_state(&self, arg: &'static str) -> Result<&StateHandle> {
        match self {
            Self::State(s) => Ok(s),
            other => Err(Error::type_mismatch(arg, "random state", other.type_tag())),
        }
    }

    /// List of integer scalars as `usize`
    pub fn expect_usize_list(&self, arg: &'static str) -> Result<Vec<usize>> {
        self.expect_list(arg)?
            .iter()
            .map(|v| v.expect_usize(arg))
            .collect()
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Self::Int(value as i64)
    }
}

impl From<isize> for Value {
    fn from(value: isize) -> Self {
        Self::Int(value as i64)
    }
}

impl From<usize> for Value {
    fn from(value: usize) -> Self {
        Self::Int(value as i64)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<&Value> for Value {
    fn from(value: &Value) -> Self {
        value.clone()
    }
}

impl From<Vec<Value>> for Value {
    fn from(value: Vec<Value>) -> Self {
        Self::List(value)
    }
}

impl From<ArrayRef> for Value {
    fn from(value: ArrayRef) -> Self {
        Self::Array(value)
    }
}

impl From<DTypeValue> for Value {
    fn from(value: DTypeValue) -> Self {
        Self::DType(value)
    }
}

impl From<StateHandle> for Value {
    fn from(value: StateHandle) -> Self {
        Self::State(value)
    }
}
