//! Shaping entry points

use crate::dispatch::{Dispatcher, Kwargs};
use crate::error::Result;
use crate::types::Value;

impl Dispatcher {
    /// Shape of `a` (empty for scalars)
    pub fn shape(&self, a: impl Into<Value>) -> Result<Vec<usize>> {
        self.call("shape", &[a.into()])?.expect_usize_list("shape")
    }

    /// Number of axes of `a`
    pub fn rank(&self, a: impl Into<Value>) -> Result<usize> {
        self.call("rank", &[a.into()])?.expect_usize("rank")
    }

    /// Length of the leading axis of `a`
    pub fn length(&self, a: impl Into<Value>) -> Result<usize> {
        self.call("length", &[a.into()])?.expect_usize("length")
    }

    /// Whether `a` has rank zero
    pub fn isscalar(&self, a: impl Into<Value>) -> Result<bool> {
        self.call("isscalar", &[a.into()])?.expect_bool("isscalar")
    }

    /// Insert a unit axis at `axis` (negative counts from the end)
    pub fn expand_dims(&self, a: impl Into<Value>, axis: isize) -> Result<Value> {
        self.invoke("expand_dims", &[a.into()], &Kwargs::new().with("axis", axis))
    }

    /// Remove every unit axis
    pub fn squeeze(&self, a: impl Into<Value>) -> Result<Value> {
        self.call("squeeze", &[a.into()])
    }

    /// Diagonal of a matrix, or the diagonal matrix of a vector
    pub fn diag(&self, a: impl Into<Value>) -> Result<Value> {
        self.call("diag", &[a.into()])
    }

    /// Reshape; at most one dimension may be `-1`
    pub fn reshape(&self, a: impl Into<Value>, shape: &[isize]) -> Result<Value> {
        let mut args = Vec::with_capacity(shape.len() + 1);
        args.push(a.into());
        args.extend(shape.iter().map(|&d| Value::from(d)));
        self.call("reshape", &args)
    }

    /// Reshape to rank 1
    pub fn flatten(&self, a: impl Into<Value>) -> Result<Value> {
        self.call("flatten", &[a.into()])
    }

    /// Append trailing unit axes until rank 2
    pub fn uprank(&self, a: impl Into<Value>) -> Result<Value> {
        self.call("uprank", &[a.into()])
    }

    /// Join arrays along a new axis
    pub fn stack(&self, arrays: &[Value], axis: isize) -> Result<Value> {
        self.invoke("stack", arrays, &Kwargs::new().with("axis", axis))
    }

    /// Split along `axis` into arrays of one lower rank
    pub fn unstack(&self, a: impl Into<Value>, axis: isize) -> Result<Vec<Value>> {
        self.invoke("unstack", &[a.into()], &Kwargs::new().with("axis", axis))?
            .into_list("unstack")
    }

    /// Join arrays along an existing axis
    pub fn concat(&self, arrays: &[Value], axis: isize) -> Result<Value> {
        self.invoke("concat", arrays, &Kwargs::new().with("axis", axis))
    }

    /// Assemble a block matrix from rows of blocks
    pub fn concat2d(&self, rows: &[Vec<Value>]) -> Result<Value> {
        let rows = rows.iter().cloned().map(Value::List).collect();
        self.call("concat2d", &[Value::List(rows)])
    }

    /// Select entries (index list, integer array or boolean mask) along `axis`
    pub fn take(&self, a: impl Into<Value>, indices: impl Into<Value>, axis: isize) -> Result<Value> {
        self.invoke(
            "take",
            &[a.into(), indices.into()],
            &Kwargs::new().with("axis", axis),
        )
    }

    /// Lower-triangular matrix from its packed row-major entries
    pub fn vec_to_tril(&self, a: impl Into<Value>) -> Result<Value> {
        self.call("vec_to_tril", &[a.into()])
    }

    /// Packed row-major lower-triangular entries of a square matrix
    pub fn tril_to_vec(&self, a: impl Into<Value>) -> Result<Value> {
        self.call("tril_to_vec", &[a.into()])
    }
}
