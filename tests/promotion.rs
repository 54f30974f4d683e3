//! Integration tests for pairwise promotion
//!
//! Tests verify:
//! - Converter chains are applied per argument before the call
//! - Failure reporting with and without an applicable rule
//! - CPU scalar/array and mixed-dtype promotion

mod common;

use common::{array, data, dispatcher, int_array, shape, to_f64};
use numlab::dispatch::{DispatchConfig, Dispatcher, PromotionRule, Signature};
use numlab::error::Error;
use numlab::types::{Array, Concrete, TypeTag, Value};
use std::any::Any;

const X: Concrete = Concrete::numeric("mock.x");
const Y: Concrete = Concrete::numeric("mock.y");
const Z: Concrete = Concrete::numeric("mock.z");

/// Mock array recording how many conversions it went through
#[derive(Debug)]
struct Mock {
    tag: Concrete,
    hops: i64,
}

impl Array for Mock {
    fn type_tag(&self) -> TypeTag {
        TypeTag::Concrete(self.tag)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

fn mock(tag: Concrete) -> Value {
    Value::array(Mock { tag, hops: 0 })
}

fn hops(v: &Value) -> i64 {
    v.downcast_array::<Mock>().map_or(-1, |m| m.hops)
}

fn to_z(v: &Value) -> numlab::error::Result<Value> {
    Ok(Value::array(Mock {
        tag: Z,
        hops: hops(v) + 1,
    }))
}

fn mock_dispatcher(config: DispatchConfig) -> Dispatcher {
    let d = Dispatcher::new(config);
    let z = TypeTag::Concrete(Z);
    d.add_promotion(
        PromotionRule::new(TypeTag::Concrete(X), TypeTag::Concrete(Y), z.clone())
            .convert_left(to_z)
            .convert_right(to_z),
    )
    .unwrap();
    d.register("f", Signature::new([z.clone(), z]), |_, args, _| {
        Ok(Value::Int(hops(&args[0]) * 10 + hops(&args[1])))
    })
    .unwrap();
    d
}

// ============================================================================
// Dispatcher promotion
// ============================================================================

#[test]
fn test_promotion_converts_both_sides() {
    let d = mock_dispatcher(DispatchConfig::default());
    let out = d.call("f", &[mock(X), mock(Y)]).unwrap();
    assert_eq!(out.as_int(), Some(11));

    let resolution = d
        .resolve("f", &[TypeTag::Concrete(X), TypeTag::Concrete(Y)])
        .unwrap();
    assert!(resolution.is_promoted());
}

#[test]
fn test_rule_applies_in_either_order() {
    let d = mock_dispatcher(DispatchConfig::default());
    let out = d.call("f", &[mock(Y), mock(X)]).unwrap();
    assert_eq!(out.as_int(), Some(11));
}

#[test]
fn test_direct_match_skips_promotion() {
    let d = mock_dispatcher(DispatchConfig::default());
    let out = d.call("f", &[mock(Z), mock(Z)]).unwrap();
    assert_eq!(out.as_int(), Some(0));
}

#[test]
fn test_no_rule_reports_no_implementation() {
    let d = mock_dispatcher(DispatchConfig::default());
    let err = d.call("f", &[mock(X), mock(X)]).unwrap_err();
    assert!(err.is_no_implementation());
}

#[test]
fn test_promoted_types_without_implementation() {
    let d = mock_dispatcher(DispatchConfig::default());
    d.register(
        "g",
        Signature::new([TypeTag::Concrete(X), TypeTag::Concrete(X)]),
        |_, _, _| Ok(Value::Int(0)),
    )
    .unwrap();
    match d.call("g", &[mock(X), mock(Y)]) {
        Err(Error::Promotion { function, promoted, .. }) => {
            assert_eq!(function, "g");
            assert_eq!(promoted, "mock.z, mock.z");
        }
        other => panic!("expected a promotion error, got {other:?}"),
    }
}

#[test]
fn test_three_arguments_each_convert_once() {
    let d = mock_dispatcher(DispatchConfig::default());
    let z = TypeTag::Concrete(Z);
    d.register("h", Signature::new([z.clone(), z.clone(), z]), |_, args, _| {
        Ok(Value::Int(args.iter().map(hops).fold(0, |acc, h| acc * 10 + h)))
    })
    .unwrap();

    for args in [[mock(X), mock(Y), mock(X)], [mock(X), mock(X), mock(Y)]] {
        let out = d.call("h", &args).unwrap();
        assert_eq!(out.as_int(), Some(111));
    }

    let (x, y) = (TypeTag::Concrete(X), TypeTag::Concrete(Y));
    let resolution = d.resolve("h", &[y.clone(), x, y]).unwrap();
    assert!(resolution.is_promoted());
}

#[test]
fn test_promotion_can_be_disabled() {
    let d = mock_dispatcher(DispatchConfig::default().with_promotion(false));
    let err = d.call("f", &[mock(X), mock(Y)]).unwrap_err();
    assert!(err.is_no_implementation());
}

// ============================================================================
// CPU promotion
// ============================================================================

#[test]
fn test_float_scalar_keeps_array_precision() {
    let d = dispatcher();
    let a: Value = numlab::runtime::cpu::CpuArray::new([2], vec![1.0f32, 2.0])
        .unwrap()
        .into_value();
    let out = d.add(&a, 0.5).unwrap();
    assert_eq!(data::<f32>(&out), vec![1.5, 2.5]);
}

#[test]
fn test_int_array_with_float_scalar_widens() {
    let d = dispatcher();
    let a = int_array(&[3], vec![1, 2, 3]);
    let out = d.multiply(&a, 0.5).unwrap();
    assert_eq!(to_f64(&out), vec![0.5, 1.0, 1.5]);
}

#[test]
fn test_int_array_with_int_scalar_stays_int() {
    let d = dispatcher();
    let a = int_array(&[3], vec![1, 2, 3]);
    let out = d.add(2i64, &a).unwrap();
    assert_eq!(data::<i64>(&out), vec![3, 4, 5]);
}

#[test]
fn test_mixed_dtype_arrays_meet_at_f64() {
    let d = dispatcher();
    let a = array(&[2, 1], vec![0.5, 1.5]);
    let b = int_array(&[1, 3], vec![1, 2, 3]);
    let out = d.add(&a, &b).unwrap();
    assert_eq!(shape::<f64>(&out), vec![2, 3]);
    assert_eq!(to_f64(&out), vec![1.5, 2.5, 3.5, 2.5, 3.5, 4.5]);
}

#[test]
fn test_scalar_arithmetic_without_arrays() {
    let d = dispatcher();
    let out = d.add(1.5, 2i64).unwrap();
    assert_eq!(out.as_f64(), Some(3.5));
}
