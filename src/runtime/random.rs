//! Default random states, one per backend and device

use crate::error::Result;
use crate::types::StateHandle;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::LazyLock;

type Key = (&'static str, String);

static DEFAULTS: LazyLock<Mutex<HashMap<Key, StateHandle>>> =
    LazyLock::new(|| Mutex::new(HashMap::new()));

/// Default state of `backend` on `device`, created with `create` on first use
///
/// Every later call for the same pair returns a handle to the same state.
pub fn default_state(
    backend: &'static str,
    device: &str,
    create: impl FnOnce() -> Result<StateHandle>,
) -> Result<StateHandle> {
    let mut defaults = DEFAULTS.lock();
    let key = (backend, device.to_owned());
    if let Some(state) = defaults.get(&key) {
        return Ok(state.clone());
    }
    let state = create()?;
    tracing::debug!(backend, device, "default random state created");
    defaults.insert(key, state.clone());
    Ok(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Concrete, Kind, RandomState, TypeTag};
    use std::any::Any;

    #[derive(Debug)]
    struct Counter(u32);

    impl RandomState for Counter {
        fn type_tag(&self) -> TypeTag {
            TypeTag::Concrete(Concrete::new("test.state", Kind::RandomState))
        }

        fn as_any_mut(&mut self) -> &mut dyn Any {
            self
        }
    }

    #[test]
    fn test_default_state_is_created_once() {
        let first = default_state("test", "dev:0", || Ok(StateHandle::new(Counter(0)))).unwrap();
        let second = default_state("test", "dev:0", || panic!("must not recreate")).unwrap();
        assert!(first.ptr_eq(&second));

        let other = default_state("test", "dev:1", || Ok(StateHandle::new(Counter(1)))).unwrap();
        assert!(!first.ptr_eq(&other));
    }
}
