//! Runtime multiple dispatch
//!
//! A [`Dispatcher`] maps a function name plus the concrete [`TypeTag`]s of
//! the arguments to exactly one implementation:
//!
//! 1. look the tuple up in the resolution cache;
//! 2. otherwise collect every registered [`Signature`] matching position-wise;
//! 3. rank them lexicographically by specificity (leftmost argument first),
//!    fixed arity over variadic, then latest registration;
//! 4. with no match, apply one pass of pairwise [`PromotionRule`]s and retry;
//! 5. fail with [`Error::NoImplementation`](crate::error::Error::NoImplementation)
//!    or [`Error::Promotion`](crate::error::Error::Promotion).
//!
//! [`TypeTag`]: crate::types::TypeTag

mod adapter;
mod config;
mod kwargs;
mod promotion;
mod registry;
mod signature;

pub use adapter::{BackendAdapter, Registrar};
pub use config::DispatchConfig;
pub use kwargs::Kwargs;
pub use promotion::{Converter, PromotionRule};
pub use registry::{Dispatcher, Resolution};
pub use signature::Signature;

use crate::error::{Error, Result};
use crate::types::Value;
use std::sync::{Arc, OnceLock};

/// A registered implementation
///
/// Implementations receive the dispatcher that resolved them so that generic
/// code calls back into the same registry.
pub type Method = Arc<dyn Fn(&Dispatcher, &[Value], &Kwargs) -> Result<Value> + Send + Sync>;

impl Dispatcher {
    /// Dispatcher populated with the primitive catalogue, the defaults, the
    /// generic algorithms and every enabled backend
    pub fn with_builtins(config: DispatchConfig) -> Result<Self> {
        let dispatcher = Self::new(config);
        dispatcher.install(&crate::ops::Catalogue)?;
        dispatcher.install(&crate::ops::Defaults)?;
        dispatcher.install(&crate::algorithm::GenericAlgorithms)?;
        #[cfg(feature = "cpu")]
        dispatcher.install(&crate::runtime::cpu::CpuBackend)?;
        Ok(dispatcher)
    }

    /// The process-wide dispatcher, built on first use
    ///
    /// It is not frozen: applications may register overrides on it before
    /// concurrent use begins. A failed build is remembered and reported by
    /// every call.
    pub fn global() -> Result<&'static Dispatcher> {
        static GLOBAL: OnceLock<BuiltDispatcher> = OnceLock::new();
        built_once(&GLOBAL, || Self::with_builtins(DispatchConfig::default()))
    }
}

type BuiltDispatcher = std::result::Result<Dispatcher, String>;

fn built_once(
    cell: &'static OnceLock<BuiltDispatcher>,
    build: impl FnOnce() -> Result<Dispatcher>,
) -> Result<&'static Dispatcher> {
    let built = cell.get_or_init(|| {
        build().map_err(|err| {
            tracing::error!(%err, "built-in registration failed");
            err.to_string()
        })
    });
    built
        .as_ref()
        .map_err(|msg| Error::Internal(format!("built-in registration failed: {msg}")))
}

/// Shorthand for [`Dispatcher::global`]
pub fn lab() -> Result<&'static Dispatcher> {
    Dispatcher::global()
}
