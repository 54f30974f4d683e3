//! Integration tests for concurrent use of one dispatcher
//!
//! Tests verify:
//! - Threads resolving the same uncached tuple all pick one implementation
//! - Implicit draws on the shared default state never repeat a value

mod common;

use common::{dispatcher, to_f64};
use numlab::dispatch::Signature;
use numlab::runtime::cpu::{FLOAT64, tags};
use numlab::types::{NUMERIC, TypeTag, Value};
use std::collections::HashSet;
use std::thread;

const THREADS: usize = 8;

#[test]
fn test_concurrent_resolution_agrees() {
    let d = dispatcher();
    let f64_tag = TypeTag::Concrete(tags::F64);
    d.register("blend", Signature::new([NUMERIC, NUMERIC]), |_, _, _| Ok(Value::Int(0)))
        .unwrap();
    let specific = d
        .register("blend", Signature::new([f64_tag.clone(), NUMERIC]), |_, _, _| {
            Ok(Value::Int(1))
        })
        .unwrap();
    d.freeze();

    let call_tags = [f64_tag, TypeTag::Concrete(tags::I64)];
    let orders: Vec<u64> = thread::scope(|s| {
        let handles: Vec<_> = (0..THREADS)
            .map(|_| s.spawn(|| d.resolve("blend", &call_tags).unwrap().order()))
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert_eq!(orders, vec![specific; THREADS]);
    assert_eq!(d.resolve("blend", &call_tags).unwrap().order(), specific);
}

#[test]
fn test_concurrent_implicit_draws_are_serialised() {
    let d = dispatcher();
    let draws: Vec<f64> = thread::scope(|s| {
        let handles: Vec<_> = (0..THREADS)
            .map(|_| s.spawn(|| to_f64(&d.rand(FLOAT64, &[64]).unwrap())))
            .collect();
        handles
            .into_iter()
            .flat_map(|h| h.join().unwrap())
            .collect()
    });

    assert_eq!(draws.len(), THREADS * 64);
    let distinct: HashSet<u64> = draws.iter().map(|x| x.to_bits()).collect();
    assert_eq!(distinct.len(), draws.len());
}
