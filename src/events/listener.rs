//! Registered listeners.

use crate::core::{ObjectId, User};
use crate::session::SessionHandle;

use super::event::{Event, EventKind};
use super::filter::{build_chain, FilterChain};
use super::priority::EventPriority;
use super::subscription::{Handler, HandlerResult, Subscription};

/// A subscription bound to its owner, scope and session.
pub struct RegisteredListener {
    owner: ObjectId,
    scope: ObjectId,
    session: SessionHandle,
    kind: EventKind,
    priority: EventPriority,
    ignore_cancelled: bool,
    filters: FilterChain,
    handler: Handler,
    name: Option<String>,
}

impl RegisteredListener {
    pub(crate) fn new(
        owner: ObjectId,
        scope: ObjectId,
        session: SessionHandle,
        subscription: Subscription,
    ) -> Self {
        Self {
            owner,
            scope,
            session,
            kind: subscription.kind,
            priority: subscription.priority,
            ignore_cancelled: subscription.ignore_cancelled,
            filters: build_chain(&subscription.filters),
            handler: subscription.handler,
            name: subscription.name,
        }
    }

    /// The game object that declared the subscription.
    #[must_use]
    pub fn owner(&self) -> ObjectId {
        self.owner
    }

    /// The scope the owner was registered against.
    #[must_use]
    pub fn scope(&self) -> ObjectId {
        self.scope
    }

    /// The session the owner belongs to.
    #[must_use]
    pub fn session(&self) -> &SessionHandle {
        &self.session
    }

    /// The subscribed kind.
    #[must_use]
    pub fn kind(&self) -> EventKind {
        self.kind
    }

    #[must_use]
    pub fn priority(&self) -> EventPriority {
        self.priority
    }

    #[must_use]
    pub fn ignores_cancelled(&self) -> bool {
        self.ignore_cancelled
    }

    /// Number of handler parameters.
    #[must_use]
    pub fn arity(&self) -> usize {
        self.handler.arity()
    }

    /// Log name: the declared name, or the kind.
    #[must_use]
    pub fn name(&self) -> String {
        self.name
            .clone()
            .unwrap_or_else(|| format!("{}@{}", self.kind, self.owner))
    }

    /// Short-circuit AND over the filter chain.
    pub(crate) fn accepts(&self, event: &dyn Event, actor: Option<&User>) -> bool {
        self.filters
            .iter()
            .all(|filter| filter.filter(event, self, actor))
    }

    pub(crate) fn has_filters(&self) -> bool {
        !self.filters.is_empty()
    }

    pub(crate) fn invoke(&self, event: &dyn Event, actor: Option<&User>) -> HandlerResult {
        self.handler.invoke(event, actor)
    }
}

impl std::fmt::Debug for RegisteredListener {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegisteredListener")
            .field("owner", &self.owner)
            .field("scope", &self.scope)
            .field("kind", &self.kind)
            .field("priority", &self.priority)
            .field("ignore_cancelled", &self.ignore_cancelled)
            .field("filters", &self.filters.len())
            .field("handler", &self.handler)
            .finish()
    }
}
