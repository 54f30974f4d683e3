//! Backend adapters and the registration helper they receive

use super::{Dispatcher, Kwargs, PromotionRule, Signature};
use crate::error::Result;
use crate::types::Value;
use std::sync::Arc;

/// A backend (or library module) contributing registrations
///
/// Adapters are installed explicitly with [`Dispatcher::install`]; nothing is
/// registered as a side effect of loading a module.
pub trait BackendAdapter {
    /// Label attached to every registration, e.g. `"cpu"`
    fn name(&self) -> &str;

    /// Register implementations and promotion rules
    fn register(&self, registrar: &Registrar<'_>) -> Result<()>;
}

/// Registration handle stamping entries with their origin
pub struct Registrar<'a> {
    dispatcher: &'a Dispatcher,
    origin: &'a str,
}

impl<'a> Registrar<'a> {
    /// Registrar for `origin`
    pub fn new(dispatcher: &'a Dispatcher, origin: &'a str) -> Self {
        Self { dispatcher, origin }
    }

    /// Dispatcher being populated
    pub fn dispatcher(&self) -> &'a Dispatcher {
        self.dispatcher
    }

    /// Register an implementation
    pub fn register<F>(&self, name: &str, signature: Signature, method: F) -> Result<u64>
    where
        F: Fn(&Dispatcher, &[Value], &Kwargs) -> Result<Value> + Send + Sync + 'static,
    {
        self.dispatcher
            .register_method(name, signature, Arc::new(method), self.origin)
    }

    /// Register the same implementation under several signatures
    pub fn register_all<F>(
        &self,
        name: &str,
        signatures: impl IntoIterator<Item = Signature>,
        method: F,
    ) -> Result<()>
    where
        F: Fn(&Dispatcher, &[Value], &Kwargs) -> Result<Value> + Send + Sync + 'static,
    {
        let method: super::Method = Arc::new(method);
        for signature in signatures {
            self.dispatcher
                .register_method(name, signature, Arc::clone(&method), self.origin)?;
        }
        Ok(())
    }

    /// Catalogue an abstract primitive
    pub fn declare(&self, name: &str, signature: Signature) -> Result<()> {
        self.dispatcher.declare(name, signature)
    }

    /// Add a promotion rule
    pub fn promotion(&self, rule: PromotionRule) -> Result<()> {
        self.dispatcher.add_promotion(rule)
    }
}

impl Dispatcher {
    /// Let `adapter` register its implementations
    pub fn install(&self, adapter: &dyn BackendAdapter) -> Result<()> {
        let name = adapter.name();
        let before = self.generation();
        adapter.register(&Registrar::new(self, name))?;
        tracing::debug!(
            adapter = name,
            mutations = self.generation() - before,
            "backend adapter installed"
        );
        Ok(())
    }
}
