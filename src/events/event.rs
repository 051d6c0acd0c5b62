//! Event types.
//!
//! Events are posted by the host (or by the library itself) and routed to
//! game objects by the [`EventDispatcher`](super::EventDispatcher).
//!
//! ## Event kinds and lineage
//!
//! Every event has an [`EventKind`] and may declare parent kinds, nearest
//! first. A listener subscribed to a parent kind receives events of every
//! descendant kind, unless a listener for a nearer kind exists:
//!
//! ```text
//! gamelib:user-joined -> gamelib:user -> gamelib:game
//! ```
//!
//! ## Actors
//!
//! Events expose the user that caused them through up to three optional
//! accessors, tried in order: [`Event::user`], [`Event::player`] and
//! [`Event::entity`]. Players and player entities are mapped to users
//! through the host's user directory.

use std::cell::Cell;

use crate::core::{AsAny, EntityRef, PlayerId, User};

/// Identifier of an event type.
///
/// Kinds are namespaced strings, e.g. `"gamelib:user-joined"`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EventKind(&'static str);

impl EventKind {
    /// Create an event kind.
    #[must_use]
    pub const fn new(name: &'static str) -> Self {
        Self(name)
    }

    /// The kind's name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        self.0
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.0)
    }
}

/// Root kind of every event posted by the library.
pub const GAME_EVENT: EventKind = EventKind::new("gamelib:game");

/// An event.
pub trait Event: AsAny {
    /// The concrete kind of this event.
    fn kind(&self) -> EventKind;

    /// Parent kinds, nearest first.
    fn parent_kinds(&self) -> &'static [EventKind] {
        &[]
    }

    /// Whether another handler cancelled the event.
    fn is_cancelled(&self) -> bool {
        false
    }

    /// The user that caused the event.
    fn user(&self) -> Option<&User> {
        None
    }

    /// The player that caused the event.
    fn player(&self) -> Option<PlayerId> {
        None
    }

    /// The entity that caused the event.
    fn entity(&self) -> Option<EntityRef> {
        None
    }
}

/// An event type with a statically known kind.
///
/// Lets listeners subscribe to the concrete Rust type and receive the
/// downcast event.
pub trait TypedEvent: Event + Sized {
    /// Kind of every instance of this type.
    const KIND: EventKind;
}

impl<'a> dyn Event + 'a {
    /// Downcast to a concrete event type.
    #[must_use]
    pub fn downcast_ref<E: Event>(&self) -> Option<&E> {
        self.as_any().downcast_ref::<E>()
    }

    /// The event's kind followed by its parent kinds.
    #[must_use]
    pub fn lineage(&self) -> Vec<EventKind> {
        let parents = self.parent_kinds();
        let mut lineage = Vec::with_capacity(parents.len() + 1);
        lineage.push(self.kind());
        lineage.extend_from_slice(parents);
        lineage
    }
}

/// A general purpose event for hosts that have no typed event model.
///
/// ```
/// use rust_gamelib::core::PlayerId;
/// use rust_gamelib::events::{Event, EventKind, GenericEvent};
///
/// const DAMAGE: EventKind = EventKind::new("host:entity-damage");
///
/// let player = PlayerId::random();
/// let event = GenericEvent::new(DAMAGE)
///     .with_player(player)
///     .with_value(4)
///     .with_tag("fall");
///
/// assert_eq!(event.player(), Some(player));
/// assert!(event.has_tag("fall"));
/// event.cancel();
/// assert!(event.is_cancelled());
/// ```
#[derive(Clone, Debug, Default)]
pub struct GenericEvent {
    kind: Option<EventKind>,
    parents: &'static [EventKind],
    user: Option<User>,
    player: Option<PlayerId>,
    entity: Option<EntityRef>,
    /// Numeric payload. The host defines the meaning of each index.
    pub values: Vec<i64>,
    /// String tags for host specific filtering.
    pub tags: Vec<String>,
    cancelled: Cell<bool>,
}

impl GenericEvent {
    /// Create an event of `kind`.
    #[must_use]
    pub fn new(kind: EventKind) -> Self {
        Self {
            kind: Some(kind),
            ..Self::default()
        }
    }

    /// Set the parent kinds (builder pattern).
    #[must_use]
    pub fn with_parents(mut self, parents: &'static [EventKind]) -> Self {
        self.parents = parents;
        self
    }

    /// Set the acting user (builder pattern).
    #[must_use]
    pub fn with_user(mut self, user: User) -> Self {
        self.user = Some(user);
        self
    }

    /// Set the acting player (builder pattern).
    #[must_use]
    pub fn with_player(mut self, player: PlayerId) -> Self {
        self.player = Some(player);
        self
    }

    /// Set the acting entity (builder pattern).
    #[must_use]
    pub fn with_entity(mut self, entity: EntityRef) -> Self {
        self.entity = Some(entity);
        self
    }

    /// Add a numeric value (builder pattern).
    #[must_use]
    pub fn with_value(mut self, value: i64) -> Self {
        self.values.push(value);
        self
    }

    /// Add a tag (builder pattern).
    #[must_use]
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    /// Get a value by index.
    #[must_use]
    pub fn value(&self, index: usize) -> Option<i64> {
        self.values.get(index).copied()
    }

    /// Check if the event has a tag.
    #[must_use]
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    /// Cancel the event.
    pub fn cancel(&self) {
        self.cancelled.set(true);
    }

    /// Set the cancelled flag.
    pub fn set_cancelled(&self, cancelled: bool) {
        self.cancelled.set(cancelled);
    }
}

impl Event for GenericEvent {
    fn kind(&self) -> EventKind {
        self.kind.unwrap_or(GAME_EVENT)
    }

    fn parent_kinds(&self) -> &'static [EventKind] {
        self.parents
    }

    fn is_cancelled(&self) -> bool {
        self.cancelled.get()
    }

    fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    fn player(&self) -> Option<PlayerId> {
        self.player
    }

    fn entity(&self) -> Option<EntityRef> {
        self.entity
    }
}
