//! Integration tests for signature matching and specificity ranking
//!
//! Tests verify:
//! - The most specific matching signature wins
//! - Lexicographic tie-breaking, fixed arity over variadic, latest registration
//! - Cache invalidation after late registrations
//! - Failure reporting for unmatched calls

use numlab::dispatch::{DispatchConfig, Dispatcher, Kwargs, Signature};
use numlab::error::{Error, Result};
use numlab::types::{Array, Concrete, INT, NUMERIC, TypeTag, Value, list_of};
use std::any::Any;

const X: Concrete = Concrete::numeric("mock.x");
const Y: Concrete = Concrete::numeric("mock.y");
const Z: Concrete = Concrete::numeric("mock.z");

#[derive(Debug)]
struct Mock(Concrete);

impl Array for Mock {
    fn type_tag(&self) -> TypeTag {
        TypeTag::Concrete(self.0)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

fn mock(tag: Concrete) -> Value {
    Value::array(Mock(tag))
}

fn tag(c: Concrete) -> TypeTag {
    TypeTag::Concrete(c)
}

fn returns(label: &'static str) -> impl Fn(&Dispatcher, &[Value], &Kwargs) -> Result<Value> + Send + Sync {
    move |_, _, _| Ok(Value::Int(label.len() as i64))
}

fn label_of(v: Value) -> i64 {
    v.as_int().unwrap()
}

// ============================================================================
// Specificity
// ============================================================================

#[test]
fn test_concrete_beats_union_beats_numeric() {
    let d = Dispatcher::default();
    let xy = TypeTag::union("XY", [tag(X), tag(Y)]);
    d.register("f", Signature::new([NUMERIC]), |_, _, _| Ok(Value::Int(1))).unwrap();
    d.register("f", Signature::new([xy]), |_, _, _| Ok(Value::Int(2))).unwrap();
    d.register("f", Signature::new([tag(X)]), |_, _, _| Ok(Value::Int(3))).unwrap();

    assert_eq!(label_of(d.call("f", &[mock(X)]).unwrap()), 3);
    assert_eq!(label_of(d.call("f", &[mock(Y)]).unwrap()), 2);
    assert_eq!(label_of(d.call("f", &[mock(Z)]).unwrap()), 1);
}

#[test]
fn test_registration_order_does_not_beat_specificity() {
    let d = Dispatcher::default();
    d.register("f", Signature::new([tag(X)]), |_, _, _| Ok(Value::Int(3))).unwrap();
    d.register("f", Signature::new([NUMERIC]), |_, _, _| Ok(Value::Int(1))).unwrap();
    assert_eq!(label_of(d.call("f", &[mock(X)]).unwrap()), 3);
}

#[test]
fn test_leftmost_argument_decides() {
    let d = Dispatcher::default();
    d.register("g", Signature::new([tag(X), NUMERIC]), |_, _, _| Ok(Value::Int(1))).unwrap();
    d.register("g", Signature::new([NUMERIC, tag(X)]), |_, _, _| Ok(Value::Int(2))).unwrap();
    assert_eq!(label_of(d.call("g", &[mock(X), mock(X)]).unwrap()), 1);
    assert_eq!(label_of(d.call("g", &[mock(Y), mock(X)]).unwrap()), 2);
}

#[test]
fn test_fixed_arity_beats_variadic() {
    let d = Dispatcher::default();
    d.register("h", Signature::new([tag(X)]).variadic(INT), returns("variadic")).unwrap();
    d.register("h", Signature::new([tag(X), INT]), returns("fixed")).unwrap();

    let two = [mock(X), Value::Int(1)];
    assert_eq!(label_of(d.call("h", &two).unwrap()), "fixed".len() as i64);
    let three = [mock(X), Value::Int(1), Value::Int(2)];
    assert_eq!(label_of(d.call("h", &three).unwrap()), "variadic".len() as i64);
    assert_eq!(label_of(d.call("h", &[mock(X)]).unwrap()), "variadic".len() as i64);
}

#[test]
fn test_identical_signature_override() {
    let d = Dispatcher::new(DispatchConfig::default().with_warn_on_override(true));
    d.register("f", Signature::new([tag(X)]), |_, _, _| Ok(Value::Int(1))).unwrap();
    d.register("f", Signature::new([tag(X)]), |_, _, _| Ok(Value::Int(2))).unwrap();
    assert_eq!(d.implementation_count("f"), 2);
    assert_eq!(label_of(d.call("f", &[mock(X)]).unwrap()), 2);
}

#[test]
fn test_list_arguments() {
    let d = Dispatcher::default();
    d.register("len", Signature::new([list_of(NUMERIC)]), |_, args, _| {
        Ok(Value::from(args[0].expect_list("items")?.len()))
    })
    .unwrap();
    let items = Value::List(vec![mock(X), Value::Int(2)]);
    assert_eq!(label_of(d.call("len", &[items]).unwrap()), 2);
    assert!(d.call("len", &[mock(X)]).is_err());
}

// ============================================================================
// Cache and lifecycle
// ============================================================================

#[test]
fn test_late_registration_invalidates_cache() {
    let d = Dispatcher::default();
    d.register("f", Signature::new([NUMERIC]), |_, _, _| Ok(Value::Int(1))).unwrap();
    assert_eq!(label_of(d.call("f", &[mock(X)]).unwrap()), 1);

    d.register("f", Signature::new([tag(X)]), |_, _, _| Ok(Value::Int(3))).unwrap();
    assert_eq!(label_of(d.call("f", &[mock(X)]).unwrap()), 3);
}

#[test]
fn test_kwargs_do_not_affect_resolution() {
    let d = Dispatcher::default();
    d.register("f", Signature::new([tag(X)]), |_, _, kw| {
        Ok(Value::Int(kw.int_or("scale", 1)?))
    })
    .unwrap();
    let kw = Kwargs::new().with("scale", 5i64);
    assert_eq!(label_of(d.invoke("f", &[mock(X)], &kw).unwrap()), 5);
    assert_eq!(label_of(d.call("f", &[mock(X)]).unwrap()), 1);
}

#[test]
fn test_frozen_dispatcher_still_resolves() {
    let d = Dispatcher::default();
    d.register("f", Signature::new([tag(X)]), |_, _, _| Ok(Value::Int(1))).unwrap();
    d.freeze();
    assert!(d.is_frozen());
    assert!(matches!(
        d.register("f", Signature::new([tag(Y)]), |_, _, _| Ok(Value::Int(2))),
        Err(Error::RegistryFrozen { .. })
    ));
    assert_eq!(label_of(d.call("f", &[mock(X)]).unwrap()), 1);
}

// ============================================================================
// Failures
// ============================================================================

#[test]
fn test_unmatched_call_names_function_and_types() {
    let d = Dispatcher::default();
    d.register("f", Signature::new([tag(X)]), |_, _, _| Ok(Value::Int(1))).unwrap();
    let err = d.call("f", &[mock(Y)]).unwrap_err();
    assert!(err.is_no_implementation());
    let message = err.to_string();
    assert!(message.contains("'f'"), "{message}");
    assert!(message.contains("mock.y"), "{message}");
    assert!(!message.contains("abstract primitive"), "{message}");
}

#[test]
fn test_unknown_function() {
    let d = Dispatcher::default();
    assert!(matches!(
        d.call("nothing", &[Value::Int(1)]),
        Err(Error::NoImplementation { declared: false, .. })
    ));
}

#[test]
fn test_builtin_primitive_without_backend_is_abstract() {
    let d = Dispatcher::with_builtins(DispatchConfig::default()).unwrap();
    let err = d.call("cholesky", &[mock(X)]).unwrap_err();
    assert!(matches!(err, Error::NoImplementation { declared: true, .. }));
}
