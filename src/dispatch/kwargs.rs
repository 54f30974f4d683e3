//! Keyword arguments
//!
//! Keyword arguments are forwarded to the selected implementation but never
//! take part in resolution.

use crate::error::Result;
use crate::types::Value;
use smallvec::SmallVec;

/// Named optional arguments of a call
#[derive(Clone, Debug, Default)]
pub struct Kwargs {
    entries: SmallVec<[(&'static str, Value); 2]>,
}

impl Kwargs {
    /// No keyword arguments
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a keyword argument
    pub fn with(mut self, name: &'static str, value: impl Into<Value>) -> Self {
        self.set(name, value);
        self
    }

    /// Add a keyword argument only if `value` is present
    pub fn with_opt<V: Into<Value>>(self, name: &'static str, value: Option<V>) -> Self {
        match value {
            Some(v) => self.with(name, v),
            None => self,
        }
    }

    /// Add or replace a keyword argument in place
    pub fn set(&mut self, name: &'static str, value: impl Into<Value>) {
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == name) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((name, value)),
        }
    }

    /// Look up a keyword argument
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find_map(|(k, v)| (*k == name).then_some(v))
    }

    /// Whether there are no keyword arguments
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Boolean flag with a default
    pub fn bool_or(&self, name: &'static str, default: bool) -> Result<bool> {
        self.get(name).map_or(Ok(default), |v| v.expect_bool(name))
    }

    /// Integer with a default
    pub fn int_or(&self, name: &'static str, default: i64) -> Result<i64> {
        self.get(name).map_or(Ok(default), |v| v.expect_int(name))
    }

    /// Optional integer
    pub fn opt_int(&self, name: &'static str) -> Result<Option<i64>> {
        self.get(name).map(|v| v.expect_int(name)).transpose()
    }
}
