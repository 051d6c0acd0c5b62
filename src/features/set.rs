//! Feature sets.
//!
//! Phases and sessions keep their features in a `FeatureSet`: one feature
//! per tag, in attachment order. The set drives the features' lifecycle
//! when its scope starts and ends.

use indexmap::IndexMap;
use tracing::{debug, error, warn};

use crate::core::{ObjectId, Scope};

use super::feature::Feature;

struct FeatureSlot {
    feature: Box<dyn Feature>,
    enabled: bool,
}

/// Features of one scope, keyed by tag.
#[derive(Default)]
pub struct FeatureSet {
    slots: IndexMap<String, FeatureSlot>,
}

impl FeatureSet {
    /// Create an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create the feature registered as `tag` in `scope` and attach it.
    ///
    /// Returns the new feature's id. A tag that is already attached, not
    /// registered, or fails to configure is logged and skipped.
    pub fn attach(
        &mut self,
        scope: &Scope,
        tag: &str,
        customize: impl FnOnce(&mut dyn Feature),
    ) -> Option<ObjectId> {
        if self.slots.contains_key(tag) {
            debug!(tag, scope = %scope, "feature already attached, skipping");
            return None;
        }

        let registry = scope.session_handle().manager().features();
        let Some(factory) = registry.get(tag) else {
            warn!(tag, scope = %scope, "no feature registered, skipping");
            return None;
        };

        let mut feature = match factory.create(scope) {
            Ok(feature) => feature,
            Err(err) => {
                error!(tag, scope = %scope, error = %err, "failed to configure feature");
                return None;
            }
        };

        customize(&mut *feature);
        feature.load();

        let id = feature.context().id();
        self.slots.insert(
            tag.to_string(),
            FeatureSlot {
                feature,
                enabled: false,
            },
        );
        Some(id)
    }

    /// Enable every feature in attachment order and register the
    /// listenable ones with the dispatcher.
    pub fn activate(&mut self) {
        for (tag, slot) in &mut self.slots {
            if slot.enabled {
                continue;
            }
            slot.feature.enable();
            slot.enabled = true;

            let ctx = slot.feature.context();
            if let Some(listenable) = slot.feature.as_listenable() {
                ctx.manager()
                    .dispatcher()
                    .register_events(ctx.id(), listenable, ctx.scope());
            }
            debug!(tag = %tag, id = %ctx.id(), "feature enabled");
        }
    }

    /// Unregister and disable every enabled feature in attachment order,
    /// then drop its session listeners.
    pub fn deactivate(&mut self) {
        for (tag, slot) in &mut self.slots {
            if !slot.enabled {
                continue;
            }
            let ctx = slot.feature.context().clone();
            if slot.feature.as_listenable().is_some() {
                ctx.manager().dispatcher().unregister(ctx.id(), ctx.scope());
            }
            slot.feature.disable();
            slot.enabled = false;
            ctx.session().remove_listeners(ctx.id());
            debug!(tag = %tag, id = %ctx.id(), "feature disabled");
        }
    }

    /// The feature attached as `tag`.
    #[must_use]
    pub fn get(&self, tag: &str) -> Option<&dyn Feature> {
        self.slots.get(tag).map(|slot| &*slot.feature)
    }

    /// The feature attached as `tag`.
    pub fn get_mut(&mut self, tag: &str) -> Option<&mut dyn Feature> {
        match self.slots.get_mut(tag) {
            Some(slot) => Some(&mut *slot.feature),
            None => None,
        }
    }

    /// The first feature of type `F`.
    #[must_use]
    pub fn get_as<F: Feature>(&self) -> Option<&F> {
        self.slots
            .values()
            .find_map(|slot| slot.feature.downcast_ref::<F>())
    }

    /// The first feature of type `F`.
    pub fn get_as_mut<F: Feature>(&mut self) -> Option<&mut F> {
        self.slots
            .values_mut()
            .find_map(|slot| slot.feature.downcast_mut::<F>())
    }

    /// Check if a tag is attached.
    #[must_use]
    pub fn contains(&self, tag: &str) -> bool {
        self.slots.contains_key(tag)
    }

    /// Check if the feature attached as `tag` is enabled.
    #[must_use]
    pub fn is_enabled(&self, tag: &str) -> bool {
        self.slots.get(tag).is_some_and(|slot| slot.enabled)
    }

    /// Attached tags in attachment order.
    pub fn tags(&self) -> impl Iterator<Item = &str> {
        self.slots.keys().map(String::as_str)
    }

    /// Iterate over `(tag, feature)` in attachment order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &dyn Feature)> {
        self.slots
            .iter()
            .map(|(tag, slot)| (tag.as_str(), &*slot.feature))
    }

    /// Number of attached features.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Check if no feature is attached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

impl std::fmt::Debug for FeatureSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_map()
            .entries(self.slots.iter().map(|(tag, slot)| (tag, slot.enabled)))
            .finish()
    }
}
