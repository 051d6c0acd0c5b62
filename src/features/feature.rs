//! The feature contract.
//!
//! A feature is the smallest independently configurable behavior unit of a
//! game. It is created by the feature registry inside a scope (a phase or
//! the session), receives its configuration, and is enabled while its scope
//! is active.
//!
//! ## Lifecycle
//!
//! ```text
//! construct -> bind configuration -> customize -> load -> enable -> disable
//! ```
//!
//! The framework enables and disables a feature exactly once per
//! activation; features do not need to guard against repeated calls.

use crate::config::Configurable;
use crate::core::{AsAny, ConstructionError, GameObjectContext, ObjectId, Scope};
use crate::events::Listenable;
use crate::session::SessionHandle;

/// A behavior unit attached to a phase or session.
pub trait Feature: Configurable + AsAny {
    /// Identity and scope of this feature.
    fn context(&self) -> &GameObjectContext;

    /// Runs once after configuration and before the first `enable`.
    fn load(&mut self) {}

    /// The scope became active.
    fn enable(&mut self);

    /// The scope ended.
    fn disable(&mut self);

    /// Event subscriptions of this feature, if it listens to events.
    fn as_listenable(&self) -> Option<&dyn Listenable> {
        None
    }
}

/// A feature type registered by convention under a static tag.
pub trait FeatureType: Feature + Sized + 'static {
    /// Registry tag, also the configuration key.
    const TAG: &'static str;

    /// Build a bare instance. Configuration is applied afterwards.
    fn construct(ctx: &GameObjectContext) -> Result<Self, ConstructionError>;
}

impl<'a> dyn Feature + 'a {
    /// The feature's id.
    #[must_use]
    pub fn id(&self) -> ObjectId {
        self.context().id()
    }

    /// The owning scope.
    #[must_use]
    pub fn scope(&self) -> &Scope {
        self.context().scope()
    }

    /// The owning session.
    #[must_use]
    pub fn session(&self) -> &SessionHandle {
        self.context().session()
    }

    /// Downcast to a concrete feature type.
    #[must_use]
    pub fn downcast_ref<F: Feature>(&self) -> Option<&F> {
        self.as_any().downcast_ref::<F>()
    }

    /// Downcast to a concrete feature type.
    pub fn downcast_mut<F: Feature>(&mut self) -> Option<&mut F> {
        self.as_any_mut().downcast_mut::<F>()
    }
}
