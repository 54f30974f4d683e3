//! The dispatcher: registry, resolution and resolution cache

use super::promotion::{Converter, PromotionTable};
use super::{DispatchConfig, Kwargs, Method, PromotionRule, Signature};
use crate::error::{Error, Result};
use crate::types::{TypeTag, Value, render_tags};
use parking_lot::RwLock;
use smallvec::SmallVec;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering as AtomicOrdering};

/// One registered implementation
#[derive(Clone)]
struct Entry {
    signature: Signature,
    method: Method,
    /// Registration counter, unique across the dispatcher
    order: u64,
    origin: Arc<str>,
}

/// All implementations of one function name
#[derive(Default)]
struct Function {
    /// Signature of the abstract primitive, if the name is catalogued
    declared: Option<Signature>,
    entries: Vec<Entry>,
}

#[derive(Default)]
struct Registry {
    functions: HashMap<String, Function>,
    counter: u64,
}

/// Per-argument converter chains applied before calling a promoted match
type Conversions = SmallVec<[SmallVec<[Converter; 1]>; 4]>;

/// Outcome of resolving a function name against an argument tuple
#[derive(Clone)]
pub struct Resolution {
    method: Method,
    signature: Signature,
    order: u64,
    origin: Arc<str>,
    conversions: Option<Conversions>,
}

impl Resolution {
    /// Signature of the selected implementation
    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    /// Registration counter of the selected implementation
    pub fn order(&self) -> u64 {
        self.order
    }

    /// Adapter or module that registered the implementation
    pub fn origin(&self) -> &str {
        &self.origin
    }

    /// Whether the arguments are converted by promotion before the call
    pub fn is_promoted(&self) -> bool {
        self.conversions.is_some()
    }

    /// Apply conversions, then call the implementation
    pub fn call(&self, dispatcher: &Dispatcher, args: &[Value], kwargs: &Kwargs) -> Result<Value> {
        match &self.conversions {
            None => (self.method)(dispatcher, args, kwargs),
            Some(chains) => {
                let converted = args
                    .iter()
                    .zip(chains.iter())
                    .map(|(arg, chain)| {
                        chain
                            .iter()
                            .try_fold(arg.clone(), |value, convert| convert(&value))
                    })
                    .collect::<Result<Vec<_>>>()?;
                (self.method)(dispatcher, &converted, kwargs)
            }
        }
    }
}

impl fmt::Debug for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resolution")
            .field("signature", &self.signature)
            .field("order", &self.order)
            .field("origin", &self.origin)
            .field("promoted", &self.is_promoted())
            .finish()
    }
}

type Cache = HashMap<String, HashMap<Vec<TypeTag>, Arc<Resolution>>>;

/// Process-wide mapping from function names to implementations
///
/// Lifecycle: build with [`Dispatcher::new`], populate with
/// [`Dispatcher::declare`], [`Dispatcher::register`] and
/// [`Dispatcher::install`], optionally [`Dispatcher::freeze`], then resolve.
/// Lookups take read locks only; registration takes the write lock and drops
/// the affected cache entries.
pub struct Dispatcher {
    config: DispatchConfig,
    registry: RwLock<Registry>,
    promotions: RwLock<PromotionTable>,
    cache: RwLock<Cache>,
    /// Bumped by every mutation so stale resolutions are never cached
    generation: AtomicU64,
    frozen: AtomicBool,
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new(DispatchConfig::default())
    }
}

impl Dispatcher {
    /// Empty dispatcher
    pub fn new(config: DispatchConfig) -> Self {
        Self {
            config,
            registry: RwLock::new(Registry::default()),
            promotions: RwLock::new(PromotionTable::default()),
            cache: RwLock::new(HashMap::new()),
            generation: AtomicU64::new(0),
            frozen: AtomicBool::new(false),
        }
    }

    /// Configuration in effect
    pub fn config(&self) -> &DispatchConfig {
        &self.config
    }

    /// Reject further registrations
    pub fn freeze(&self) {
        self.frozen.store(true, AtomicOrdering::Release);
        tracing::debug!("dispatcher frozen");
    }

    pub(crate) fn generation(&self) -> u64 {
        self.generation.load(AtomicOrdering::Acquire)
    }

    /// Whether [`Dispatcher::freeze`] was called
    pub fn is_frozen(&self) -> bool {
        self.frozen.load(AtomicOrdering::Acquire)
    }

    fn ensure_mutable(&self, function: &str) -> Result<()> {
        if self.is_frozen() {
            return Err(Error::RegistryFrozen {
                function: function.to_string(),
            });
        }
        Ok(())
    }

    /// Catalogue `name` as an abstract primitive with the given signature
    ///
    /// Declaring registers no implementation: calling a declared name with no
    /// matching registration fails with [`Error::NoImplementation`].
    pub fn declare(&self, name: &str, signature: Signature) -> Result<()> {
        self.ensure_mutable(name)?;
        let mut registry = self.registry.write();
        registry
            .functions
            .entry(name.to_string())
            .or_default()
            .declared = Some(signature);
        Ok(())
    }

    /// Register an implementation of `name` for `signature`
    ///
    /// An identical signature may already exist; the newer registration wins
    /// every later tie. Returns the registration counter.
    pub fn register<F>(&self, name: &str, signature: Signature, method: F) -> Result<u64>
    where
        F: Fn(&Dispatcher, &[Value], &Kwargs) -> Result<Value> + Send + Sync + 'static,
    {
        self.register_method(name, signature, Arc::new(method), "user")
    }

    pub(crate) fn register_method(
        &self,
        name: &str,
        signature: Signature,
        method: Method,
        origin: &str,
    ) -> Result<u64> {
        self.ensure_mutable(name)?;
        let order = {
            let mut registry = self.registry.write();
            registry.counter += 1;
            let order = registry.counter;
            let function = registry.functions.entry(name.to_string()).or_default();

            if let Some(existing) = function.entries.iter().find(|e| e.signature == signature) {
                if self.config.warn_on_override {
                    tracing::warn!(
                        function = name,
                        %signature,
                        previous = %existing.origin,
                        origin,
                        "registration overrides an equally specific implementation"
                    );
                } else {
                    tracing::debug!(
                        function = name,
                        %signature,
                        previous = %existing.origin,
                        origin,
                        "registration overrides an equally specific implementation"
                    );
                }
            }

            function.entries.push(Entry {
                signature,
                method,
                order,
                origin: Arc::from(origin),
            });
            order
        };

        let mut cache = self.cache.write();
        self.generation.fetch_add(1, AtomicOrdering::AcqRel);
        cache.remove(name);
        Ok(order)
    }

    /// Add a promotion rule; drops every cached resolution
    pub fn add_promotion(&self, rule: PromotionRule) -> Result<()> {
        self.ensure_mutable("<promotion>")?;
        let size = {
            let mut table = self.promotions.write();
            if let Some(previous) = table.insert(rule) {
                tracing::debug!(?previous, "promotion rule replaced");
            }
            table.len()
        };
        tracing::trace!(rules = size, "promotion table updated");

        let mut cache = self.cache.write();
        self.generation.fetch_add(1, AtomicOrdering::AcqRel);
        cache.clear();
        Ok(())
    }

    /// Whether `name` is a catalogued abstract primitive
    pub fn is_declared(&self, name: &str) -> bool {
        self.registry
            .read()
            .functions
            .get(name)
            .is_some_and(|f| f.declared.is_some())
    }

    /// Number of implementations registered under `name`
    pub fn implementation_count(&self, name: &str) -> usize {
        self.registry
            .read()
            .functions
            .get(name)
            .map_or(0, |f| f.entries.len())
    }

    /// Abstract primitives with no backend implementation accepting any of `tags`
    ///
    /// An implementation counts when one of its patterns is concrete or a
    /// union (not an `AnyOf`/`Any` default) and accepts one of `tags`. The
    /// result is sorted by name.
    pub fn missing_primitives(&self, tags: &[TypeTag]) -> Vec<String> {
        let registry = self.registry.read();
        let mut missing: Vec<String> = registry
            .functions
            .iter()
            .filter(|(_, f)| f.declared.is_some())
            .filter(|(_, f)| {
                !f.entries.iter().any(|entry| {
                    entry.signature.patterns().any(|pattern| {
                        pattern.level() < 2 && tags.iter().any(|t| t.is_subtag_of(pattern))
                    })
                })
            })
            .map(|(name, _)| name.clone())
            .collect();
        missing.sort();
        missing
    }

    /// Resolve `name` for the given concrete argument tags
    pub fn resolve(&self, name: &str, tags: &[TypeTag]) -> Result<Arc<Resolution>> {
        if self.config.cache_resolutions {
            if let Some(hit) = self
                .cache
                .read()
                .get(name)
                .and_then(|entries| entries.get(tags))
            {
                tracing::trace!(function = name, types = %render_tags(tags), "resolution cache hit");
                return Ok(Arc::clone(hit));
            }
        }

        let generation = self.generation.load(AtomicOrdering::Acquire);
        let resolution = Arc::new(self.resolve_uncached(name, tags)?);

        if self.config.cache_resolutions {
            let mut cache = self.cache.write();
            // A registration since `generation` may have changed the winner.
            if self.generation.load(AtomicOrdering::Acquire) == generation {
                cache
                    .entry(name.to_string())
                    .or_default()
                    .insert(tags.to_vec(), Arc::clone(&resolution));
            }
        }
        Ok(resolution)
    }

    fn resolve_uncached(&self, name: &str, tags: &[TypeTag]) -> Result<Resolution> {
        let registry = self.registry.read();
        let function = registry.functions.get(name);
        let declared = function.is_some_and(|f| f.declared.is_some());
        let entries = function.map_or(&[][..], |f| f.entries.as_slice());

        if let Some(entry) = select(entries, tags) {
            tracing::trace!(
                function = name,
                types = %render_tags(tags),
                signature = %entry.signature,
                origin = %entry.origin,
                "resolved"
            );
            return Ok(resolution(entry, None));
        }

        let no_implementation = || Error::NoImplementation {
            function: name.to_string(),
            types: render_tags(tags),
            declared,
        };

        if !self.config.promote {
            return Err(no_implementation());
        }
        let Some((promoted, chains)) = self.promote(tags) else {
            return Err(no_implementation());
        };

        match select(entries, &promoted) {
            Some(entry) => {
                tracing::trace!(
                    function = name,
                    types = %render_tags(tags),
                    promoted = %render_tags(&promoted),
                    signature = %entry.signature,
                    "resolved after promotion"
                );
                Ok(resolution(entry, Some(chains)))
            }
            None => Err(Error::Promotion {
                function: name.to_string(),
                types: render_tags(tags),
                promoted: render_tags(&promoted),
            }),
        }
    }

    /// Single promotion pass over every unordered pair of differing concrete tags
    ///
    /// Rules are looked up against the original argument tags. An argument is
    /// converted at most once; the first rule that claims it fixes its common
    /// tag. Returns `None` if no rule applied.
    fn promote(&self, tags: &[TypeTag]) -> Option<(Vec<TypeTag>, Conversions)> {
        let table = self.promotions.read();
        let mut targets: SmallVec<[Option<TypeTag>; 4]> = smallvec::smallvec![None; tags.len()];
        let mut chains: Conversions = (0..tags.len()).map(|_| SmallVec::new()).collect();

        for i in 0..tags.len() {
            for j in (i + 1)..tags.len() {
                if tags[i] == tags[j] || !tags[i].is_concrete() || !tags[j].is_concrete() {
                    continue;
                }
                let Some(rule) = table.lookup(&tags[i], &tags[j]) else {
                    continue;
                };
                for (slot, convert) in [(i, rule.first), (j, rule.second)] {
                    match &targets[slot] {
                        None => {
                            if let Some(convert) = convert {
                                chains[slot].push(convert);
                            }
                            targets[slot] = Some(rule.common.clone());
                        }
                        Some(common) if *common != rule.common => {
                            tracing::debug!(
                                argument = slot,
                                kept = %common,
                                skipped = %rule.common,
                                "argument already promoted to a different tag"
                            );
                        }
                        Some(_) => {}
                    }
                }
            }
        }

        if targets.iter().all(Option::is_none) {
            return None;
        }
        let promoted = tags
            .iter()
            .zip(targets)
            .map(|(tag, target)| target.unwrap_or_else(|| tag.clone()))
            .collect();
        Some((promoted, chains))
    }

    /// Resolve and call `name`
    pub fn invoke(&self, name: &str, args: &[Value], kwargs: &Kwargs) -> Result<Value> {
        let tags: SmallVec<[TypeTag; 4]> = args.iter().map(Value::type_tag).collect();
        let resolution = self.resolve(name, &tags)?;
        resolution.call(self, args, kwargs)
    }

    /// Resolve and call `name` without keyword arguments
    pub fn call(&self, name: &str, args: &[Value]) -> Result<Value> {
        self.invoke(name, args, &Kwargs::new())
    }
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let registry = self.registry.read();
        f.debug_struct("Dispatcher")
            .field("functions", &registry.functions.len())
            .field("registrations", &registry.counter)
            .field("frozen", &self.is_frozen())
            .finish()
    }
}

/// Pick the most specific matching entry; ties go to the latest registration
fn select<'a>(entries: &'a [Entry], tags: &[TypeTag]) -> Option<&'a Entry> {
    entries
        .iter()
        .filter(|e| e.signature.matches(tags))
        .max_by(|a, b| {
            match a.signature.compare_specificity(&b.signature, tags.len()) {
                Ordering::Equal => a.order.cmp(&b.order),
                decided => decided,
            }
        })
}

fn resolution(entry: &Entry, conversions: Option<Conversions>) -> Resolution {
    Resolution {
        method: Arc::clone(&entry.method),
        signature: entry.signature.clone(),
        order: entry.order,
        origin: Arc::clone(&entry.origin),
        conversions,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Concrete, INT, NUMERIC};

    const X: TypeTag = TypeTag::Concrete(Concrete::numeric("test.x"));

    fn constant(v: i64) -> impl Fn(&Dispatcher, &[Value], &Kwargs) -> Result<Value> + Send + Sync {
        move |_, _, _| Ok(Value::Int(v))
    }

    #[test]
    fn test_latest_registration_wins_tie() {
        let d = Dispatcher::default();
        d.register("f", Signature::new([NUMERIC]), constant(1)).unwrap();
        assert_eq!(d.call("f", &[Value::Int(0)]).unwrap().as_int(), Some(1));
        d.register("f", Signature::new([NUMERIC]), constant(2)).unwrap();
        assert_eq!(d.call("f", &[Value::Int(0)]).unwrap().as_int(), Some(2));
    }

    #[test]
    fn test_cache_hit_and_invalidation() {
        let d = Dispatcher::default();
        d.register("f", Signature::new([NUMERIC]), constant(1)).unwrap();
        let first = d.resolve("f", &[INT]).unwrap();
        let second = d.resolve("f", &[INT]).unwrap();
        assert!(Arc::ptr_eq(&first, &second));

        d.register("f", Signature::new([INT]), constant(2)).unwrap();
        let third = d.resolve("f", &[INT]).unwrap();
        assert!(!Arc::ptr_eq(&first, &third));
        assert_eq!(third.signature(), &Signature::new([INT]));
    }

    #[test]
    fn test_declared_failure_is_reported() {
        let d = Dispatcher::default();
        d.declare("g", Signature::new([NUMERIC])).unwrap();
        let err = d.call("g", &[Value::Int(1)]).unwrap_err();
        assert!(matches!(err, Error::NoImplementation { declared: true, .. }));
        assert!(err.to_string().contains("abstract primitive"));
    }

    #[test]
    fn test_frozen_rejects_registration() {
        let d = Dispatcher::default();
        d.freeze();
        let err = d.register("f", Signature::new([X]), constant(1)).unwrap_err();
        assert!(matches!(err, Error::RegistryFrozen { .. }));
    }

    #[test]
    fn test_uncached_dispatcher_still_resolves() {
        let d = Dispatcher::new(DispatchConfig::default().with_cache(false));
        d.register("f", Signature::new([NUMERIC]), constant(1)).unwrap();
        let a = d.resolve("f", &[INT]).unwrap();
        let b = d.resolve("f", &[INT]).unwrap();
        assert!(!Arc::ptr_eq(&a, &b));
        assert_eq!(a.order(), b.order());
    }
}
