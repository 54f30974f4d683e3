//! Linear algebra entry points

use crate::dispatch::{Dispatcher, Kwargs};
use crate::error::{Error, Result};
use crate::types::Value;

/// `(U, S, V)` with `a = U · diag(S) · Vᵀ`
#[derive(Clone, Debug)]
pub struct Svd {
    /// Left singular vectors
    pub u: Value,
    /// Singular values, descending
    pub s: Value,
    /// Right singular vectors
    pub v: Value,
}

fn second(b: Option<&Value>, a: &Value) -> Value {
    b.unwrap_or(a).clone()
}

impl Dispatcher {
    /// Swap the last two axes
    pub fn transpose(&self, a: impl Into<Value>) -> Result<Value> {
        self.call("transpose", &[a.into()])
    }

    /// Permute axes
    pub fn permute(&self, a: impl Into<Value>, perm: &[usize]) -> Result<Value> {
        let perm = perm.iter().map(|&p| Value::from(p)).collect::<Vec<_>>();
        self.invoke(
            "transpose",
            &[a.into()],
            &Kwargs::new().with("perm", Value::List(perm)),
        )
    }

    /// Matrix product
    pub fn matmul(&self, a: impl Into<Value>, b: impl Into<Value>) -> Result<Value> {
        self.call("matmul", &[a.into(), b.into()])
    }

    /// Matrix product with optional transposition of either operand
    pub fn matmul_tr(
        &self,
        a: impl Into<Value>,
        b: impl Into<Value>,
        tr_a: bool,
        tr_b: bool,
    ) -> Result<Value> {
        self.invoke(
            "matmul",
            &[a.into(), b.into()],
            &Kwargs::new().with("tr_a", tr_a).with("tr_b", tr_b),
        )
    }

    /// Trace over two axes
    pub fn trace(&self, a: impl Into<Value>, axis1: isize, axis2: isize) -> Result<Value> {
        self.invoke(
            "trace",
            &[a.into()],
            &Kwargs::new().with("axis1", axis1).with("axis2", axis2),
        )
    }

    /// Kronecker product
    pub fn kron(&self, a: impl Into<Value>, b: impl Into<Value>) -> Result<Value> {
        self.call("kron", &[a.into(), b.into()])
    }

    /// Outer product of two vectors; `b = None` is the self-outer product
    pub fn outer(&self, a: &Value, b: Option<&Value>) -> Result<Value> {
        match b {
            Some(b) => self.call("outer", &[a.clone(), b.clone()]),
            None => self.call("outer", &[a.clone()]),
        }
    }

    /// Full singular value decomposition
    pub fn svd(&self, a: impl Into<Value>) -> Result<Svd> {
        let parts = self
            .invoke("svd", &[a.into()], &Kwargs::new().with("compute_uv", true))?
            .into_list("svd")?;
        let [u, s, v]: [Value; 3] = parts.try_into().map_err(|parts: Vec<Value>| {
            Error::Internal(format!("svd returned {} factors, expected 3", parts.len()))
        })?;
        Ok(Svd { u, s, v })
    }

    /// Singular values only
    pub fn singular_values(&self, a: impl Into<Value>) -> Result<Value> {
        self.invoke("svd", &[a.into()], &Kwargs::new().with("compute_uv", false))
    }

    /// Lower Cholesky factor
    pub fn cholesky(&self, a: impl Into<Value>) -> Result<Value> {
        self.call("cholesky", &[a.into()])
    }

    /// Solve `a x = b` given the lower Cholesky factor `a`
    pub fn cholesky_solve(&self, a: impl Into<Value>, b: impl Into<Value>) -> Result<Value> {
        self.call("cholesky_solve", &[a.into(), b.into()])
    }

    /// Solve `a x = b` for triangular `a`, batched over leading axes
    pub fn trisolve(&self, a: impl Into<Value>, b: impl Into<Value>, lower_a: bool) -> Result<Value> {
        self.invoke(
            "trisolve",
            &[a.into(), b.into()],
            &Kwargs::new().with("lower_a", lower_a),
        )
    }

    /// Solve a general square system
    pub fn solve(&self, a: impl Into<Value>, b: impl Into<Value>) -> Result<Value> {
        self.call("solve", &[a.into(), b.into()])
    }

    /// Matrix inverse
    pub fn inv(&self, a: impl Into<Value>) -> Result<Value> {
        self.call("inv", &[a.into()])
    }

    /// Determinant
    pub fn det(&self, a: impl Into<Value>) -> Result<Value> {
        self.call("det", &[a.into()])
    }

    /// Log-determinant of a positive-definite matrix
    pub fn logdet(&self, a: impl Into<Value>) -> Result<Value> {
        self.call("logdet", &[a.into()])
    }

    /// Squared Euclidean distances between rows of `a` and rows of `b`
    pub fn pw_dists2(&self, a: &Value, b: Option<&Value>) -> Result<Value> {
        self.call("pw_dists2", &[a.clone(), second(b, a)])
    }

    /// Euclidean distances between rows of `a` and rows of `b`
    pub fn pw_dists(&self, a: &Value, b: Option<&Value>) -> Result<Value> {
        self.call("pw_dists", &[a.clone(), second(b, a)])
    }

    /// Squared Euclidean distances between corresponding rows
    pub fn ew_dists2(&self, a: &Value, b: Option<&Value>) -> Result<Value> {
        self.call("ew_dists2", &[a.clone(), second(b, a)])
    }

    /// Euclidean distances between corresponding rows
    pub fn ew_dists(&self, a: &Value, b: Option<&Value>) -> Result<Value> {
        self.call("ew_dists", &[a.clone(), second(b, a)])
    }

    /// Squared norms of pairwise row sums
    pub fn pw_sums2(&self, a: &Value, b: Option<&Value>) -> Result<Value> {
        self.call("pw_sums2", &[a.clone(), second(b, a)])
    }

    /// Norms of pairwise row sums
    pub fn pw_sums(&self, a: &Value, b: Option<&Value>) -> Result<Value> {
        self.call("pw_sums", &[a.clone(), second(b, a)])
    }

    /// Squared norms of row-wise sums
    pub fn ew_sums2(&self, a: &Value, b: Option<&Value>) -> Result<Value> {
        self.call("ew_sums2", &[a.clone(), second(b, a)])
    }

    /// Norms of row-wise sums
    pub fn ew_sums(&self, a: &Value, b: Option<&Value>) -> Result<Value> {
        self.call("ew_sums", &[a.clone(), second(b, a)])
    }
}
