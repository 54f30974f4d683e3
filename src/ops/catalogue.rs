//! The abstract primitive catalogue
//!
//! Every name below is declared with a signature and no implementation.
//! Backends register implementations against their own tags; calling a
//! primitive for which nothing matches is an error, never a silent default.

use crate::dispatch::{BackendAdapter, Registrar, Signature};
use crate::error::Result;
use crate::types::{ANY, DTYPE, INT, NUMERIC, RANDOM_STATE, TypeTag};

/// Parameter class of a catalogued primitive
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Param {
    /// Scalar or array of any backend
    Numeric,
    /// Backend dtype value
    DType,
    /// Random state handle
    State,
    /// Integer scalar
    Int,
    /// Anything (lists of indices, masks)
    Any,
}

impl Param {
    fn tag(self) -> TypeTag {
        match self {
            Self::Numeric => NUMERIC,
            Self::DType => DTYPE,
            Self::State => RANDOM_STATE,
            Self::Int => INT,
            Self::Any => ANY,
        }
    }
}

/// Declaration of one abstract primitive
#[derive(Copy, Clone, Debug)]
pub struct Primitive {
    /// Function name
    pub name: &'static str,
    /// Fixed parameters
    pub params: &'static [Param],
    /// Variadic tail
    pub variadic: Option<Param>,
}

impl Primitive {
    const fn fixed(name: &'static str, params: &'static [Param]) -> Self {
        Self {
            name,
            params,
            variadic: None,
        }
    }

    const fn variadic(name: &'static str, params: &'static [Param], tail: Param) -> Self {
        Self {
            name,
            params,
            variadic: Some(tail),
        }
    }

    /// Declared signature
    pub fn signature(&self) -> Signature {
        let signature = Signature::new(self.params.iter().map(|p| p.tag()));
        match self.variadic {
            Some(tail) => signature.variadic(tail.tag()),
            None => signature,
        }
    }
}

use Param::{Any, DType, Int, Numeric, State};

const UNARY: &[Param] = &[Numeric];
const BINARY: &[Param] = &[Numeric, Numeric];

/// Every abstract primitive a complete backend provides
pub const PRIMITIVES: &[Primitive] = &[
    // shaping
    Primitive::fixed("shape", UNARY),
    Primitive::fixed("rank", UNARY),
    Primitive::fixed("length", UNARY),
    Primitive::fixed("expand_dims", UNARY),
    Primitive::fixed("squeeze", UNARY),
    Primitive::fixed("diag", UNARY),
    Primitive::variadic("reshape", UNARY, Int),
    Primitive::variadic("stack", &[], Numeric),
    Primitive::fixed("unstack", UNARY),
    Primitive::variadic("concat", &[], Numeric),
    Primitive::fixed("take_leading", &[Numeric, Any]),
    // linear algebra
    Primitive::fixed("transpose", UNARY),
    Primitive::fixed("matmul", BINARY),
    Primitive::fixed("trace_leading", UNARY),
    Primitive::fixed("kron", BINARY),
    Primitive::fixed("svd", UNARY),
    Primitive::fixed("cholesky", UNARY),
    Primitive::fixed("triangular_solve", BINARY),
    Primitive::fixed("solve", BINARY),
    Primitive::fixed("inv", UNARY),
    Primitive::fixed("det", UNARY),
    Primitive::fixed("logdet", UNARY),
    // creation and conversion
    Primitive::fixed("dtype", UNARY),
    Primitive::fixed("cast", &[DType, Numeric]),
    Primitive::variadic("zeros", &[DType], Int),
    Primitive::variadic("ones", &[DType], Int),
    Primitive::variadic("eye", &[DType], Int),
    // elementwise unary
    Primitive::fixed("negative", UNARY),
    Primitive::fixed("abs", UNARY),
    Primitive::fixed("sign", UNARY),
    Primitive::fixed("sqrt", UNARY),
    Primitive::fixed("exp", UNARY),
    Primitive::fixed("log", UNARY),
    Primitive::fixed("sin", UNARY),
    Primitive::fixed("cos", UNARY),
    Primitive::fixed("tan", UNARY),
    Primitive::fixed("tanh", UNARY),
    // elementwise binary
    Primitive::fixed("add", BINARY),
    Primitive::fixed("subtract", BINARY),
    Primitive::fixed("multiply", BINARY),
    Primitive::fixed("divide", BINARY),
    Primitive::fixed("power", BINARY),
    Primitive::fixed("minimum", BINARY),
    Primitive::fixed("maximum", BINARY),
    Primitive::fixed("lt", BINARY),
    Primitive::fixed("le", BINARY),
    Primitive::fixed("gt", BINARY),
    Primitive::fixed("ge", BINARY),
    // reductions
    Primitive::fixed("sum", UNARY),
    Primitive::fixed("mean", UNARY),
    Primitive::fixed("min", UNARY),
    Primitive::fixed("max", UNARY),
    Primitive::fixed("std", UNARY),
    Primitive::fixed("all", UNARY),
    Primitive::fixed("any", UNARY),
    // random
    Primitive::variadic("create_random_state", &[DType], Int),
    Primitive::fixed("global_random_state", &[DType]),
    Primitive::fixed("set_global_random_state", &[State]),
    Primitive::variadic("rand", &[State, DType], Int),
    Primitive::variadic("randn", &[State, DType], Int),
    Primitive::variadic("randint", &[State, DType], Int),
    Primitive::fixed("randperm", &[State, DType, Int]),
    Primitive::fixed("choice", &[State, Numeric, Int]),
];

/// Look up a catalogued primitive by name
pub fn primitive(name: &str) -> Option<&'static Primitive> {
    PRIMITIVES.iter().find(|p| p.name == name)
}

/// Adapter declaring [`PRIMITIVES`]
#[derive(Copy, Clone, Debug, Default)]
pub struct Catalogue;

impl BackendAdapter for Catalogue {
    fn name(&self) -> &str {
        "catalogue"
    }

    fn register(&self, registrar: &Registrar<'_>) -> Result<()> {
        for primitive in PRIMITIVES {
            registrar.declare(primitive.name, primitive.signature())?;
        }
        tracing::debug!(primitives = PRIMITIVES.len(), "primitive catalogue declared");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_names_are_unique() {
        let names: HashSet<_> = PRIMITIVES.iter().map(|p| p.name).collect();
        assert_eq!(names.len(), PRIMITIVES.len());
    }

    #[test]
    fn test_signature_rendering() {
        let reshape = primitive("reshape").unwrap();
        assert_eq!(reshape.signature().to_string(), "(Numeric, *int)");
        assert!(primitive("vec_to_tril").is_none());
    }
}
