//! Type-tag registries.
//!
//! A `Registry` maps a tag to a [`ConfiguredObjectFactory`]. Tags are
//! registered once; a second registration of the same tag is a conflict
//! and leaves the registry unchanged.
//!
//! ## Example
//!
//! ```
//! use rust_gamelib::core::ConstructionError;
//! use rust_gamelib::registry::{FeatureRegistry, RegistryError};
//!
//! let registry = FeatureRegistry::new();
//! registry
//!     .register("broken", |_ctx| Err(ConstructionError::new("not today")))
//!     .unwrap();
//!
//! assert!(registry.contains("broken"));
//! assert!(matches!(
//!     registry.register("broken", |_ctx| Err(ConstructionError::new("again"))),
//!     Err(RegistryError::RegistrationConflict { .. })
//! ));
//! ```

use std::cell::RefCell;
use std::rc::Rc;

use indexmap::IndexMap;
use tracing::debug;

use crate::core::{
    ConstructionError, GameError, GameObjectContext, ObjectId, RegistryError, Scope,
};
use crate::features::{Feature, FeatureType};
use crate::phases::{Phase, PhaseBehavior, PhaseType};

use super::factory::{ConfiguredObjectFactory, Entries, Strategy};
use super::kind::{FeatureKind, ObjectKind, PhaseKind};

/// Registry of features.
pub type FeatureRegistry = Registry<FeatureKind>;

/// Registry of phases.
pub type PhaseRegistry = Registry<PhaseKind>;

/// Tag to factory table with single-registration discipline.
pub struct Registry<K: ObjectKind> {
    entries: Rc<Entries<K>>,
}

impl<K: ObjectKind> Registry<K> {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: Rc::new(RefCell::new(IndexMap::new())),
        }
    }

    /// Register a construction strategy for `tag`.
    pub fn register<F>(
        &self,
        tag: impl Into<String>,
        strategy: F,
    ) -> Result<Rc<ConfiguredObjectFactory<K>>, RegistryError>
    where
        F: Fn(&GameObjectContext) -> Result<Box<K::Object>, ConstructionError> + 'static,
    {
        self.insert(tag.into(), Rc::new(strategy), false)
    }

    fn insert(
        &self,
        tag: String,
        strategy: Strategy<K>,
        conventional: bool,
    ) -> Result<Rc<ConfiguredObjectFactory<K>>, RegistryError> {
        let mut entries = self.entries.borrow_mut();
        if entries.contains_key(&tag) {
            return Err(RegistryError::RegistrationConflict {
                kind: K::LABEL,
                tag,
            });
        }

        let factory = Rc::new(ConfiguredObjectFactory::new(
            tag.clone(),
            strategy,
            conventional,
            Rc::downgrade(&self.entries),
        ));
        debug!(kind = K::LABEL, tag = %tag, conventional, "registered");
        entries.insert(tag, Rc::clone(&factory));
        Ok(factory)
    }

    /// The factory registered for exactly `tag`.
    #[must_use]
    pub fn get(&self, tag: &str) -> Option<Rc<ConfiguredObjectFactory<K>>> {
        self.entries.borrow().get(tag).cloned()
    }

    /// Check if a tag is registered.
    #[must_use]
    pub fn contains(&self, tag: &str) -> bool {
        self.entries.borrow().contains_key(tag)
    }

    /// Number of registered tags.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    /// Check if the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    /// Snapshot of the registered tags, in registration order.
    #[must_use]
    pub fn all_types(&self) -> Vec<String> {
        self.entries.borrow().keys().cloned().collect()
    }

    /// Remove a tag. Returns whether it was registered.
    pub fn unregister(&self, tag: &str) -> bool {
        self.entries.borrow_mut().shift_remove(tag).is_some()
    }

    /// Drop the cached bindings of `scope` from every factory.
    pub fn forget_scope(&self, scope: ObjectId) {
        let factories: Vec<_> = self.entries.borrow().values().cloned().collect();
        for factory in factories {
            factory.forget_scope(scope);
        }
    }

    /// Look up `tag` and create a configured instance in `scope`.
    pub fn create(&self, tag: &str, scope: &Scope) -> Result<Box<K::Object>, GameError> {
        let factory = self.get(tag).ok_or_else(|| RegistryError::NotRegistered {
            kind: K::LABEL,
            tag: tag.to_string(),
        })?;
        factory.create(scope)
    }
}

impl<K: ObjectKind> Default for Registry<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: ObjectKind> std::fmt::Debug for Registry<K> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("kind", &K::LABEL)
            .field("tags", &self.all_types())
            .finish()
    }
}

impl Registry<FeatureKind> {
    /// Register a feature type under its [`FeatureType::TAG`].
    ///
    /// If the type's constructor fails, the tag is removed again and the
    /// failure is reported by `create`.
    pub fn register_type<F: FeatureType>(
        &self,
    ) -> Result<Rc<ConfiguredObjectFactory<FeatureKind>>, RegistryError> {
        let strategy: Strategy<FeatureKind> = Rc::new(|ctx: &GameObjectContext| {
            F::construct(ctx).map(|feature| Box::new(feature) as Box<dyn Feature>)
        });
        self.insert(F::TAG.to_string(), strategy, true)
    }
}

impl Registry<PhaseKind> {
    /// Register a phase type under its [`PhaseType::TAG`].
    pub fn register_type<P: PhaseType>(
        &self,
    ) -> Result<Rc<ConfiguredObjectFactory<PhaseKind>>, RegistryError> {
        let strategy: Strategy<PhaseKind> = Rc::new(|ctx: &GameObjectContext| {
            P::construct(ctx)
                .map(|behavior| Box::new(Phase::new(ctx.clone(), P::TAG, Box::new(behavior))))
        });
        self.insert(P::TAG.to_string(), strategy, true)
    }

    /// Register a phase built from a behavior strategy.
    pub fn register_behavior<F>(
        &self,
        tag: impl Into<String>,
        strategy: F,
    ) -> Result<Rc<ConfiguredObjectFactory<PhaseKind>>, RegistryError>
    where
        F: Fn(&GameObjectContext) -> Result<Box<dyn PhaseBehavior>, ConstructionError> + 'static,
    {
        let tag = tag.into();
        let phase_tag = tag.clone();
        self.register(tag, move |ctx: &GameObjectContext| {
            strategy(ctx).map(|behavior| Box::new(Phase::new(ctx.clone(), phase_tag.clone(), behavior)))
        })
    }
}
