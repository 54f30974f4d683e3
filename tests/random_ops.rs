//! Integration tests for random states and draws
//!
//! Default states and the active device are process-wide, so every test that
//! touches them holds `GLOBAL`.

mod common;

use common::{array, data, dispatcher, shape, to_f64};
use numlab::error::Error;
use numlab::runtime::ActiveDevice;
use numlab::runtime::cpu::{FLOAT32, FLOAT64, INT64};
use numlab::types::Value;
use parking_lot::Mutex;

static GLOBAL: Mutex<()> = parking_lot::const_mutex(());

// ============================================================================
// Explicit states
// ============================================================================

#[test]
fn test_seeded_states_reproduce() {
    let d = dispatcher();
    let first = d.create_random_state(FLOAT64, Some(42)).unwrap();
    let second = d.create_random_state(FLOAT64, Some(42)).unwrap();

    let (returned, a) = d.rand_with(&first, FLOAT64, &[4, 3]).unwrap();
    let (_, b) = d.rand_with(&second, FLOAT64, &[4, 3]).unwrap();
    assert!(returned.ptr_eq(&first));
    assert_eq!(shape::<f64>(&a), vec![4, 3]);
    assert_eq!(to_f64(&a), to_f64(&b));
    assert!(to_f64(&a).iter().all(|&x| (0.0..1.0).contains(&x)));

    let (_, next) = d.rand_with(&first, FLOAT64, &[4, 3]).unwrap();
    assert_ne!(to_f64(&next), to_f64(&a));
}

#[test]
fn test_default_seed_is_fixed() {
    let d = dispatcher();
    let unseeded = d.create_random_state(FLOAT64, None).unwrap();
    let zero = d.create_random_state(FLOAT64, Some(0)).unwrap();
    let (_, a) = d.randn_with(&unseeded, FLOAT64, &[5]).unwrap();
    let (_, b) = d.randn_with(&zero, FLOAT64, &[5]).unwrap();
    assert_eq!(to_f64(&a), to_f64(&b));
}

#[test]
fn test_more_than_one_seed_is_rejected() {
    let d = dispatcher();
    let args = [Value::from(FLOAT64), Value::Int(1), Value::Int(2)];
    assert!(matches!(
        d.call("create_random_state", &args),
        Err(Error::InvalidArgument { .. })
    ));
}

#[test]
fn test_float32_draws() {
    let d = dispatcher();
    let state = d.create_random_state(FLOAT32, Some(7)).unwrap();
    let (_, a) = d.randn_with(&state, FLOAT32, &[2, 2]).unwrap();
    assert_eq!(data::<f32>(&a).len(), 4);
    assert!(d.rand_with(&state, INT64, &[2]).is_err());
}

#[test]
fn test_randint_bounds() {
    let d = dispatcher();
    let state = d.create_random_state(INT64, Some(3)).unwrap();
    let (_, draws) = d.randint_with(&state, INT64, &[200], -2, 3).unwrap();
    let draws = data::<i64>(&draws);
    assert!(draws.iter().all(|&x| (-2..3).contains(&x)));
    assert!(draws.contains(&-2));
    assert!(draws.contains(&2));

    assert!(d.randint_with(&state, INT64, &[2], 5, 5).is_err());
}

#[test]
fn test_randperm_is_a_permutation() {
    let d = dispatcher();
    let state = d.create_random_state(INT64, Some(11)).unwrap();
    let (_, perm) = d.randperm_with(&state, INT64, 50).unwrap();
    let mut perm = data::<i64>(&perm);
    perm.sort_unstable();
    assert_eq!(perm, (0..50).collect::<Vec<_>>());
}

#[test]
fn test_choice_shapes() {
    let d = dispatcher();
    let state = d.create_random_state(FLOAT64, Some(5)).unwrap();
    let a = array(&[4, 2], vec![0.0, 1.0, 10.0, 11.0, 20.0, 21.0, 30.0, 31.0]);

    let (_, many) = d.choice_with(&state, &a, 3).unwrap();
    assert_eq!(shape::<f64>(&many), vec![3, 2]);
    for row in to_f64(&many).chunks(2) {
        assert_eq!(row[1], row[0] + 1.0);
        assert_eq!(row[0] % 10.0, 0.0);
    }

    let (_, one) = d.choice_with(&state, &a, 1).unwrap();
    assert_eq!(shape::<f64>(&one), vec![2]);

    let empty = array(&[0], Vec::new());
    assert!(d.choice_with(&state, &empty, 1).is_err());
}

// ============================================================================
// Default states
// ============================================================================

#[test]
fn test_implicit_draws_use_the_default_state() {
    let _lock = GLOBAL.lock();
    let d = dispatcher();
    let draws = d.rand(FLOAT64, &[3]).unwrap();
    assert_eq!(shape::<f64>(&draws), vec![3]);
    let ints = d.randint(INT64, &[4], 0, 2).unwrap();
    assert!(data::<i64>(&ints).iter().all(|&x| x == 0 || x == 1));
    let picked = d.choice(array(&[2], vec![1.0, 2.0]), 1).unwrap();
    assert_eq!(shape::<f64>(&picked), Vec::<usize>::new());

    let a = d.global_random_state(FLOAT64).unwrap();
    let b = d.global_random_state(FLOAT64).unwrap();
    assert!(a.ptr_eq(&b));
}

#[test]
fn test_set_global_copies_the_state() {
    let _lock = GLOBAL.lock();
    let d = dispatcher();
    let seeded = d.create_random_state(FLOAT64, Some(99)).unwrap();
    let reference = d.create_random_state(FLOAT64, Some(99)).unwrap();

    d.set_global_random_state(&seeded).unwrap();
    let global = d.global_random_state(FLOAT64).unwrap();
    assert!(!global.ptr_eq(&seeded));

    let implicit = d.rand(FLOAT64, &[6]).unwrap();
    let (_, expected) = d.rand_with(&reference, FLOAT64, &[6]).unwrap();
    assert_eq!(to_f64(&implicit), to_f64(&expected));

    // The source state did not advance with the default one.
    let (_, from_seeded) = d.rand_with(&seeded, FLOAT64, &[6]).unwrap();
    assert_eq!(to_f64(&from_seeded), to_f64(&expected));

    // Setting the default state to itself is a no-op.
    d.set_global_random_state(&global).unwrap();
}

#[test]
fn test_default_state_per_device() {
    let _lock = GLOBAL.lock();
    let d = dispatcher();
    let host = d.global_random_state(FLOAT64).unwrap();
    let other = {
        let _device = ActiveDevice::set("cpu:1");
        d.global_random_state(FLOAT64).unwrap()
    };
    assert!(!host.ptr_eq(&other));
    assert!(d.global_random_state(FLOAT64).unwrap().ptr_eq(&host));
}

#[test]
fn test_unknown_active_device() {
    let _lock = GLOBAL.lock();
    let d = dispatcher();
    let state = d.create_random_state(FLOAT64, Some(1)).unwrap();
    let _device = ActiveDevice::set("tpu:0");

    assert!(matches!(d.rand(FLOAT64, &[2]), Err(Error::Backend(_))));
    // Explicit states never consult the active device.
    assert!(d.rand_with(&state, FLOAT64, &[2]).is_ok());
}
