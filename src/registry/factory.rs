//! Configured object factory.
//!
//! One factory exists per registered tag. `create` always builds a fresh
//! instance; only the configuration binding is cached, keyed by scope id.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use indexmap::IndexMap;
use rustc_hash::FxHashMap;
use tracing::{debug, warn};

use crate::config::option::Configurable;
use crate::config::ConfigBinding;
use crate::core::{
    BindingError, ConstructionError, GameError, GameObjectContext, ObjectId, RegistryError, Scope,
};

use super::kind::ObjectKind;

/// Construction strategy: builds a bare instance for a context.
pub type Strategy<K> = Rc<
    dyn Fn(&GameObjectContext) -> Result<Box<<K as ObjectKind>::Object>, ConstructionError>,
>;

pub(crate) type Entries<K> = RefCell<IndexMap<String, Rc<ConfiguredObjectFactory<K>>>>;

/// Builds configured instances of one registered tag.
pub struct ConfiguredObjectFactory<K: ObjectKind> {
    tag: String,
    strategy: Strategy<K>,
    conventional: bool,
    registry: Weak<Entries<K>>,
    bindings: RefCell<FxHashMap<ObjectId, Rc<ConfigBinding>>>,
}

impl<K: ObjectKind> ConfiguredObjectFactory<K> {
    pub(crate) fn new(
        tag: String,
        strategy: Strategy<K>,
        conventional: bool,
        registry: Weak<Entries<K>>,
    ) -> Self {
        Self {
            tag,
            strategy,
            conventional,
            registry,
            bindings: RefCell::new(FxHashMap::default()),
        }
    }

    /// The registered tag.
    #[must_use]
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// True if registered through the type convention.
    #[must_use]
    pub fn is_conventional(&self) -> bool {
        self.conventional
    }

    /// Build a configured instance in `scope`.
    ///
    /// A failing conventional constructor removes the tag from its registry
    /// and surfaces [`RegistryError::ConstructorResolutionFailure`]. Binding
    /// errors abort only this call and leave the cache untouched.
    pub fn create(&self, scope: &Scope) -> Result<Box<K::Object>, GameError> {
        let ctx = K::object_context(scope, &self.tag);
        let mut instance = match (self.strategy)(&ctx) {
            Ok(instance) => instance,
            Err(err) if self.conventional => {
                self.remove_from_registry();
                warn!(
                    kind = K::LABEL,
                    tag = %self.tag,
                    error = %err,
                    "constructor failed, tag unregistered"
                );
                return Err(RegistryError::ConstructorResolutionFailure {
                    kind: K::LABEL,
                    tag: self.tag.clone(),
                    reason: err.to_string(),
                }
                .into());
            }
            Err(err) => return Err(BindingError::Construction(err).into()),
        };

        let binding = self.binding_for(scope, &*instance)?;
        binding.apply_to(&mut *instance);

        debug!(
            kind = K::LABEL,
            tag = %self.tag,
            id = %ctx.id(),
            scope = %scope,
            "created configured object"
        );
        Ok(instance)
    }

    /// The cached binding of a scope, if one has been resolved.
    #[must_use]
    pub fn cached_binding(&self, scope: ObjectId) -> Option<Rc<ConfigBinding>> {
        self.bindings.borrow().get(&scope).cloned()
    }

    /// Number of scopes holding a cached binding.
    #[must_use]
    pub fn cached_scope_count(&self) -> usize {
        self.bindings.borrow().len()
    }

    /// Drop the cached binding of a scope.
    pub fn forget_scope(&self, scope: ObjectId) {
        self.bindings.borrow_mut().remove(&scope);
    }

    fn binding_for(
        &self,
        scope: &Scope,
        instance: &K::Object,
    ) -> Result<Rc<ConfigBinding>, BindingError> {
        if let Some(binding) = self.cached_binding(scope.id()) {
            return Ok(binding);
        }

        let config = scope.session_handle().game().config();
        let section = config.section(&K::section_path(scope, &self.tag));
        let binding = Rc::new(ConfigBinding::resolve(&section, &instance.options())?);
        self.bindings
            .borrow_mut()
            .insert(scope.id(), Rc::clone(&binding));
        Ok(binding)
    }

    fn remove_from_registry(&self) {
        if let Some(entries) = self.registry.upgrade() {
            entries.borrow_mut().shift_remove(&self.tag);
        }
    }
}

impl<K: ObjectKind> std::fmt::Debug for ConfiguredObjectFactory<K> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfiguredObjectFactory")
            .field("kind", &K::LABEL)
            .field("tag", &self.tag)
            .field("conventional", &self.conventional)
            .field("cached_scopes", &self.bindings.borrow().len())
            .finish()
    }
}
