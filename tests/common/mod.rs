//! Common test utilities
#![allow(dead_code)]

use numlab::dispatch::{DispatchConfig, Dispatcher};
use numlab::runtime::cpu::{CpuArray, CpuElement};
use numlab::types::Value;

/// Fresh dispatcher with every built-in adapter installed
///
/// Tests that register overrides use their own dispatcher so they never
/// disturb the process-wide one.
pub fn dispatcher() -> Dispatcher {
    Dispatcher::with_builtins(DispatchConfig::default()).unwrap()
}

/// `f64` CPU array value
pub fn array(shape: &[usize], data: Vec<f64>) -> Value {
    CpuArray::new(shape, data).unwrap().into_value()
}

/// `i64` CPU array value
pub fn int_array(shape: &[usize], data: Vec<i64>) -> Value {
    CpuArray::new(shape, data).unwrap().into_value()
}

/// Elements of a CPU array value of element type `T`
pub fn data<T: CpuElement>(v: &Value) -> Vec<T> {
    CpuArray::<T>::from_value(v, "value").unwrap().data().to_vec()
}

/// Elements of an `f64` CPU array value
pub fn to_f64(v: &Value) -> Vec<f64> {
    data::<f64>(v)
}

/// Shape of a CPU array value of element type `T`
pub fn shape<T: CpuElement>(v: &Value) -> Vec<usize> {
    CpuArray::<T>::from_value(v, "value")
        .unwrap()
        .shape()
        .to_vec()
}

/// Assert two f64 slices are close within tolerance
///
/// Uses the formula: |a - b| <= atol + rtol * |b|
pub fn assert_allclose_f64(a: &[f64], b: &[f64], rtol: f64, atol: f64, msg: &str) {
    assert_eq!(a.len(), b.len(), "{}: length mismatch", msg);
    for (i, (x, y)) in a.iter().zip(b.iter()).enumerate() {
        let diff = (x - y).abs();
        let tol = atol + rtol * y.abs();
        assert!(
            diff <= tol,
            "{}: element {} differs: {} vs {} (diff={}, tol={})",
            msg,
            i,
            x,
            y,
            diff,
            tol
        );
    }
}

/// Naive matrix product of row-major `m × k` and `k × n` matrices
pub fn reference_matmul(a: &[f64], b: &[f64], m: usize, k: usize, n: usize) -> Vec<f64> {
    let mut out = vec![0.0; m * n];
    for i in 0..m {
        for j in 0..n {
            out[i * n + j] = (0..k).map(|p| a[i * k + p] * b[p * n + j]).sum();
        }
    }
    out
}
