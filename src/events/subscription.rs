//! Subscription declarations.
//!
//! Game objects that want events implement [`Listenable`] and return a
//! table of [`Subscription`]s. Each subscription names the event kind, its
//! priority, whether cancelled events are skipped, the filter chain and the
//! handler closure.
//!
//! ```
//! use rust_gamelib::events::{
//!     EventKind, EventPriority, FilterTag, Listenable, Subscription,
//! };
//!
//! const BLOCK_BREAK: EventKind = EventKind::new("host:block-break");
//!
//! struct NoBuild;
//!
//! impl Listenable for NoBuild {
//!     fn subscriptions(&self) -> Vec<Subscription> {
//!         vec![Subscription::on(BLOCK_BREAK, |_event| Ok(()))
//!             .with_priority(EventPriority::High)
//!             .ignore_cancelled()
//!             .with_filters([FilterTag::Participants])]
//!     }
//! }
//!
//! assert_eq!(NoBuild.subscriptions().len(), 1);
//! ```

use crate::core::User;

use super::event::{Event, EventKind, TypedEvent};
use super::filter::FilterTag;
use super::priority::EventPriority;

/// Outcome of a handler. Errors are logged and isolated to the handler.
pub type HandlerResult = Result<(), Box<dyn std::error::Error>>;

/// A handler taking the event, or the event and the resolved actor.
pub enum Handler {
    /// `(event)`
    Event(Box<dyn Fn(&dyn Event) -> HandlerResult>),
    /// `(event, actor)`
    EventWithActor(Box<dyn Fn(&dyn Event, Option<&User>) -> HandlerResult>),
}

impl Handler {
    /// Number of parameters the handler takes.
    #[must_use]
    pub fn arity(&self) -> usize {
        match self {
            Self::Event(_) => 1,
            Self::EventWithActor(_) => 2,
        }
    }

    pub(crate) fn invoke(&self, event: &dyn Event, actor: Option<&User>) -> HandlerResult {
        match self {
            Self::Event(handler) => handler(event),
            Self::EventWithActor(handler) => handler(event, actor),
        }
    }
}

impl std::fmt::Debug for Handler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Handler(arity = {})", self.arity())
    }
}

/// A declared event subscription.
#[derive(Debug)]
pub struct Subscription {
    pub(crate) kind: EventKind,
    pub(crate) priority: EventPriority,
    pub(crate) ignore_cancelled: bool,
    pub(crate) filters: Vec<FilterTag>,
    pub(crate) handler: Handler,
    pub(crate) name: Option<String>,
}

impl Subscription {
    fn with_handler(kind: EventKind, handler: Handler) -> Self {
        Self {
            kind,
            priority: EventPriority::default(),
            ignore_cancelled: false,
            filters: vec![FilterTag::default()],
            handler,
            name: None,
        }
    }

    /// Subscribe to `kind` with a one-argument handler.
    pub fn on(kind: EventKind, handler: impl Fn(&dyn Event) -> HandlerResult + 'static) -> Self {
        Self::with_handler(kind, Handler::Event(Box::new(handler)))
    }

    /// Subscribe to `kind` with a handler receiving the resolved actor.
    pub fn on_with_actor(
        kind: EventKind,
        handler: impl Fn(&dyn Event, Option<&User>) -> HandlerResult + 'static,
    ) -> Self {
        Self::with_handler(kind, Handler::EventWithActor(Box::new(handler)))
    }

    /// Subscribe to a typed event.
    ///
    /// Events of descendant kinds that are not of type `E` are skipped.
    pub fn typed<E: TypedEvent>(handler: impl Fn(&E) -> HandlerResult + 'static) -> Self {
        Self::on(E::KIND, move |event| match event.downcast_ref::<E>() {
            Some(event) => handler(event),
            None => Ok(()),
        })
    }

    /// Subscribe to a typed event with the resolved actor.
    pub fn typed_with_actor<E: TypedEvent>(
        handler: impl Fn(&E, Option<&User>) -> HandlerResult + 'static,
    ) -> Self {
        Self::on_with_actor(E::KIND, move |event, actor| {
            match event.downcast_ref::<E>() {
                Some(event) => handler(event, actor),
                None => Ok(()),
            }
        })
    }

    /// Set the priority (builder pattern).
    #[must_use]
    pub fn with_priority(mut self, priority: EventPriority) -> Self {
        self.priority = priority;
        self
    }

    /// Skip cancelled events (builder pattern).
    #[must_use]
    pub fn ignore_cancelled(mut self) -> Self {
        self.ignore_cancelled = true;
        self
    }

    /// Replace the filter chain (builder pattern).
    #[must_use]
    pub fn with_filters(mut self, filters: impl IntoIterator<Item = FilterTag>) -> Self {
        self.filters = filters.into_iter().collect();
        self
    }

    /// Remove every filter (builder pattern).
    #[must_use]
    pub fn unfiltered(mut self) -> Self {
        self.filters.clear();
        self
    }

    /// Name used in logs (builder pattern).
    #[must_use]
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// The subscribed kind.
    #[must_use]
    pub fn kind(&self) -> EventKind {
        self.kind
    }

    /// The priority.
    #[must_use]
    pub fn priority(&self) -> EventPriority {
        self.priority
    }

    /// The declared filters.
    #[must_use]
    pub fn filters(&self) -> &[FilterTag] {
        &self.filters
    }
}

/// An object that declares event subscriptions.
pub trait Listenable {
    /// The subscriptions of this object. Called once per registration.
    fn subscriptions(&self) -> Vec<Subscription>;
}
