//! Integration tests for the backend contract
//!
//! Tests verify:
//! - The CPU backend implements every catalogued primitive
//! - A third-party backend installed next to it inherits the defaults
//! - Backend registrations outrank the defaults and generic algorithms

mod common;

use common::{array, dispatcher, to_f64};
use numlab::dispatch::{BackendAdapter, Registrar, Signature};
use numlab::error::{Error, Result};
use numlab::ops::PRIMITIVES;
use numlab::runtime::cpu::tags;
use numlab::types::{Array, Concrete, INT, TypeTag, Value};
use std::any::Any;

const TALLY: Concrete = Concrete::numeric("tally.vec");

/// Minimal external backend: flat vectors of `f64` with a logical shape
#[derive(Debug, Clone)]
struct Tally {
    shape: Vec<usize>,
    data: Vec<f64>,
}

impl Array for Tally {
    fn type_tag(&self) -> TypeTag {
        TypeTag::Concrete(TALLY)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

fn tally(args: &[Value]) -> Result<&Tally> {
    args[0]
        .downcast_array::<Tally>()
        .ok_or_else(|| Error::type_mismatch("a", "tally.vec", args[0].type_tag()))
}

struct TallyBackend;

impl BackendAdapter for TallyBackend {
    fn name(&self) -> &str {
        "tally"
    }

    fn register(&self, r: &Registrar<'_>) -> Result<()> {
        let own = TypeTag::Concrete(TALLY);
        r.register("shape", Signature::new([own.clone()]), |_, args, _| {
            Ok(Value::List(tally(args)?.shape.iter().map(|&d| Value::from(d)).collect()))
        })?;
        r.register("rank", Signature::new([own.clone()]), |_, args, _| {
            Ok(Value::from(tally(args)?.shape.len()))
        })?;
        r.register("reshape", Signature::new([own]).variadic(INT), |_, args, _| {
            let source = tally(args)?;
            let dims = args[1..]
                .iter()
                .map(|d| d.expect_int("shape"))
                .collect::<Result<Vec<_>>>()?;
            let known: i64 = dims.iter().filter(|&&d| d >= 0).product();
            let shape = dims
                .iter()
                .map(|&d| if d < 0 { source.data.len() / known as usize } else { d as usize })
                .collect();
            Ok(Value::array(Tally {
                shape,
                data: source.data.clone(),
            }))
        })?;
        Ok(())
    }
}

fn matrix() -> Value {
    Value::array(Tally {
        shape: vec![2, 3],
        data: (0..6).map(f64::from).collect(),
    })
}

#[test]
fn test_cpu_backend_is_complete() {
    let d = dispatcher();
    let missing = d.missing_primitives(&tags::all());
    assert!(missing.is_empty(), "cpu backend is missing {missing:?}");
}

#[test]
fn test_every_primitive_is_declared() {
    let d = dispatcher();
    for primitive in PRIMITIVES {
        assert!(d.is_declared(primitive.name), "{} not declared", primitive.name);
    }
}

#[test]
fn test_external_backend_reports_missing_primitives() {
    let d = dispatcher();
    d.install(&TallyBackend).unwrap();
    let missing = d.missing_primitives(&[TypeTag::Concrete(TALLY)]);
    assert!(!missing.contains(&"shape".to_string()));
    assert!(!missing.contains(&"reshape".to_string()));
    assert!(missing.contains(&"cholesky".to_string()));
    assert!(missing.contains(&"matmul".to_string()));
    assert!(missing.windows(2).all(|w| w[0] < w[1]));
}

#[test]
fn test_external_backend_inherits_defaults() {
    let d = dispatcher();
    d.install(&TallyBackend).unwrap();
    let a = matrix();

    assert!(!d.isscalar(&a).unwrap());
    let flat = d.flatten(&a).unwrap();
    assert_eq!(d.shape(&flat).unwrap(), vec![6]);
    let column = d.uprank(&flat).unwrap_err();
    // uprank needs expand_dims, which the backend never provided.
    assert!(matches!(column, Error::NoImplementation { declared: true, .. }));
}

#[test]
fn test_unimplemented_primitive_names_the_backend_type() {
    let d = dispatcher();
    d.install(&TallyBackend).unwrap();
    let err = d.cholesky(matrix()).unwrap_err();
    let message = err.to_string();
    assert!(message.contains("tally.vec"), "{message}");
    assert!(message.contains("abstract primitive"), "{message}");
}

#[test]
fn test_backend_override_outranks_generic_algorithm() {
    let d = dispatcher();
    let f64_tag = TypeTag::Concrete(tags::F64);
    let generic = d.resolve("pw_dists2", &[f64_tag.clone(), f64_tag.clone()]).unwrap();
    assert_eq!(generic.origin(), "generic");

    d.register("pw_dists2", Signature::new([f64_tag.clone(), f64_tag.clone()]), |d, args, _| {
        d.zeros_like(&args[0])
    })
    .unwrap();
    let overridden = d.resolve("pw_dists2", &[f64_tag.clone(), f64_tag]).unwrap();
    assert_eq!(overridden.origin(), "user");

    let a = array(&[2, 2], vec![1.0, 2.0, 3.0, 4.0]);
    let out = d.pw_dists2(&a, Some(&a)).unwrap();
    assert_eq!(to_f64(&out), vec![0.0; 4]);
}
