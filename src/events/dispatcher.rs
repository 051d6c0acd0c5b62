//! Event dispatcher.
//!
//! The dispatcher routes host events to game objects. Game objects are
//! registered with their subscription table; the dispatcher keeps two
//! indexes over the resulting [`RegisteredListener`]s:
//!
//! - by event kind, for dispatch
//! - by scope id, for bulk teardown when a phase or session ends
//!
//! The first listener of a kind attaches one forwarding subscription to
//! the host bus. Forwarders stay attached for the dispatcher's lifetime,
//! even after the last listener of their kind is gone.
//!
//! ## Dispatch
//!
//! For an event, the dispatcher walks the event's lineage from the concrete
//! kind to the most general one and uses the first kind that has listeners.
//! Listeners of broader kinds are not called for that event. Each listener
//! then runs, in registration order, through:
//!
//! 1. the cancelled check (`ignore_cancelled`)
//! 2. actor resolution, done at most once per event: direct user, direct
//!    player, then the cached fallback accessor of the kind
//! 3. the filter chain
//! 4. the handler, whose errors and panics are logged and isolated

use std::cell::{OnceCell, RefCell};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::rc::{Rc, Weak};

use im::Vector;
use indexmap::IndexSet;
use rustc_hash::FxHashMap;
use tracing::{debug, error, trace};

use crate::core::{ObjectId, Scope, User, UserDirectory};

use super::bus::HostEventBus;
use super::event::{Event, EventKind};
use super::listener::RegisteredListener;
use super::subscription::Listenable;

/// Accessor used to find the actor of an event.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ActorAccessor {
    /// [`Event::user`]
    User,
    /// [`Event::player`], mapped through the user directory.
    Player,
    /// [`Event::entity`], if it is a player.
    Entity,
}

impl ActorAccessor {
    /// Accessors in resolution order.
    pub const ALL: [Self; 3] = [Self::User, Self::Player, Self::Entity];

    /// Accessors the event answers directly; always tried first, never cached.
    pub const DIRECT: [Self; 2] = [Self::User, Self::Player];
}

/// Routes host events to registered game objects.
pub struct EventDispatcher {
    this: Weak<EventDispatcher>,
    bus: Rc<dyn HostEventBus>,
    users: Rc<dyn UserDirectory>,
    by_kind: RefCell<FxHashMap<EventKind, Vector<Rc<RegisteredListener>>>>,
    by_scope: RefCell<FxHashMap<ObjectId, Vec<Rc<RegisteredListener>>>>,
    forwarded: RefCell<IndexSet<EventKind>>,
    lineages: RefCell<FxHashMap<EventKind, Rc<[EventKind]>>>,
    accessors: RefCell<FxHashMap<EventKind, ActorAccessor>>,
}

impl EventDispatcher {
    /// Create a dispatcher forwarding from `bus` and resolving actors
    /// through `users`.
    pub fn new(bus: Rc<dyn HostEventBus>, users: Rc<dyn UserDirectory>) -> Rc<Self> {
        Rc::new_cyclic(|this| Self {
            this: this.clone(),
            bus,
            users,
            by_kind: RefCell::new(FxHashMap::default()),
            by_scope: RefCell::new(FxHashMap::default()),
            forwarded: RefCell::new(IndexSet::new()),
            lineages: RefCell::new(FxHashMap::default()),
            accessors: RefCell::new(FxHashMap::default()),
        })
    }

    /// Register the subscriptions of `owner` against `scope`.
    ///
    /// Returns the number of listeners added.
    pub fn register_events(&self, owner: ObjectId, listenable: &dyn Listenable, scope: &Scope) -> usize {
        let subscriptions = listenable.subscriptions();
        let count = subscriptions.len();
        let mut new_kinds = Vec::new();

        {
            let mut by_kind = self.by_kind.borrow_mut();
            let mut by_scope = self.by_scope.borrow_mut();
            let forwarded = self.forwarded.borrow();

            for subscription in subscriptions {
                let listener = Rc::new(RegisteredListener::new(
                    owner,
                    scope.id(),
                    scope.session_handle().clone(),
                    subscription,
                ));
                let kind = listener.kind();

                if !forwarded.contains(&kind) && !new_kinds.iter().any(|(k, _)| *k == kind) {
                    new_kinds.push((kind, listener.priority()));
                }

                by_scope
                    .entry(scope.id())
                    .or_default()
                    .push(Rc::clone(&listener));
                by_kind.entry(kind).or_default().push_back(listener);
            }
        }

        for (kind, priority) in new_kinds {
            self.forwarded.borrow_mut().insert(kind);
            let this = self.this.clone();
            self.bus.subscribe(
                kind,
                priority,
                false,
                None,
                Rc::new(move |event: &dyn Event| {
                    if let Some(dispatcher) = this.upgrade() {
                        dispatcher.forward(kind, event);
                    }
                }),
            );
            debug!(kind = %kind, ?priority, "attached bus forwarder");
        }

        debug!(owner = %owner, scope = %scope, listeners = count, "registered events");
        count
    }

    /// Remove every listener of `owner` and detach it from the host bus.
    ///
    /// Returns the number of listeners removed.
    pub fn unregister(&self, owner: ObjectId, scope: &Scope) -> usize {
        let removed = self.remove_where(|listener| listener.owner() == owner);

        {
            let mut by_scope = self.by_scope.borrow_mut();
            if let Some(listeners) = by_scope.get_mut(&scope.id()) {
                listeners.retain(|listener| listener.owner() != owner);
                if listeners.is_empty() {
                    by_scope.remove(&scope.id());
                }
            }
        }

        self.bus.detach(owner);
        if removed > 0 {
            debug!(owner = %owner, scope = %scope, removed, "unregistered events");
        }
        removed
    }

    /// Remove every listener registered against a scope.
    pub fn unregister_scope(&self, scope: ObjectId) -> usize {
        let Some(listeners) = self.by_scope.borrow_mut().remove(&scope) else {
            return 0;
        };

        let owners: IndexSet<ObjectId> = listeners.iter().map(|l| l.owner()).collect();
        let removed = self.remove_where(|listener| listener.scope() == scope);
        for owner in owners {
            self.bus.detach(owner);
        }
        debug!(scope = %scope, removed, "unregistered scope");
        removed
    }

    fn remove_where(&self, predicate: impl Fn(&RegisteredListener) -> bool) -> usize {
        let mut removed = 0;
        for listeners in self.by_kind.borrow_mut().values_mut() {
            let before = listeners.len();
            listeners.retain(|listener| !predicate(listener));
            removed += before - listeners.len();
        }
        removed
    }

    fn forward(&self, kind: EventKind, event: &dyn Event) {
        // Every forwarder in the lineage sees the event; only the nearest
        // one dispatches it.
        let lineage = self.lineage_of(event);
        let nearest = {
            let forwarded = self.forwarded.borrow();
            lineage.iter().copied().find(|k| forwarded.contains(k))
        };
        if nearest == Some(kind) {
            self.call_event(event);
        }
    }

    /// Deliver `event` to the listeners of the nearest kind in its lineage.
    ///
    /// Returns the number of handlers that completed successfully.
    pub fn call_event(&self, event: &dyn Event) -> usize {
        let lineage = self.lineage_of(event);
        let listeners = {
            let by_kind = self.by_kind.borrow();
            lineage
                .iter()
                .find_map(|kind| by_kind.get(kind).filter(|l| !l.is_empty()).cloned())
        };
        let Some(listeners) = listeners else {
            trace!(kind = %event.kind(), "no listeners");
            return 0;
        };

        let actor = LazyActor::default();
        let mut delivered = 0;

        for listener in listeners.iter() {
            if listener.ignores_cancelled() && event.is_cancelled() {
                continue;
            }

            let resolved = if listener.has_filters() || listener.arity() == 2 {
                actor.get(|| self.resolve_actor(event))
            } else {
                None
            };

            if !listener.accepts(event, resolved) {
                trace!(listener = %listener.name(), "filtered");
                continue;
            }

            match catch_unwind(AssertUnwindSafe(|| listener.invoke(event, resolved))) {
                Ok(Ok(())) => delivered += 1,
                Ok(Err(err)) => error!(
                    listener = %listener.name(),
                    kind = %event.kind(),
                    error = %err,
                    "error while calling event handler"
                ),
                Err(panic) => error!(
                    listener = %listener.name(),
                    kind = %event.kind(),
                    panic = panic_message(&*panic),
                    "event handler panicked"
                ),
            }
        }

        delivered
    }

    /// Resolve the user that caused `event`.
    ///
    /// A user the event exposes directly wins, then a directly exposed
    /// player. Otherwise the remaining accessors are tried, and the first
    /// one that produced a user for a kind is remembered and tried first for
    /// later events of that kind.
    pub fn resolve_actor(&self, event: &dyn Event) -> Option<User> {
        for accessor in ActorAccessor::DIRECT {
            if let Some(user) = self.try_accessor(accessor, event) {
                return Some(user);
            }
        }

        let kind = event.kind();
        let cached = self.accessors.borrow().get(&kind).copied();
        let order = cached.into_iter().chain(
            ActorAccessor::ALL
                .into_iter()
                .filter(|a| !ActorAccessor::DIRECT.contains(a) && Some(*a) != cached),
        );
        for accessor in order {
            if let Some(user) = self.try_accessor(accessor, event) {
                if cached.is_none() {
                    self.accessors.borrow_mut().insert(kind, accessor);
                }
                return Some(user);
            }
        }

        debug!(kind = %kind, "could not resolve the user of event");
        None
    }

    fn try_accessor(&self, accessor: ActorAccessor, event: &dyn Event) -> Option<User> {
        match accessor {
            ActorAccessor::User => event.user().cloned(),
            ActorAccessor::Player => event.player().and_then(|id| self.users.resolve(id)),
            ActorAccessor::Entity => event
                .entity()
                .and_then(|entity| entity.as_player())
                .and_then(|id| self.users.resolve(id)),
        }
    }

    fn lineage_of(&self, event: &dyn Event) -> Rc<[EventKind]> {
        let kind = event.kind();
        if let Some(lineage) = self.lineages.borrow().get(&kind) {
            return Rc::clone(lineage);
        }
        let lineage: Rc<[EventKind]> = event.lineage().into();
        self.lineages
            .borrow_mut()
            .insert(kind, Rc::clone(&lineage));
        lineage
    }

    /// The cached fallback accessor for a kind, if one has won before.
    #[must_use]
    pub fn cached_accessor(&self, kind: EventKind) -> Option<ActorAccessor> {
        self.accessors.borrow().get(&kind).copied()
    }

    /// Number of listeners registered for exactly `kind`.
    #[must_use]
    pub fn listener_count(&self, kind: EventKind) -> usize {
        self.by_kind.borrow().get(&kind).map_or(0, Vector::len)
    }

    /// Number of listeners registered against a scope.
    #[must_use]
    pub fn scope_listener_count(&self, scope: ObjectId) -> usize {
        self.by_scope.borrow().get(&scope).map_or(0, Vec::len)
    }

    /// Kinds with an attached bus forwarder, in attachment order.
    #[must_use]
    pub fn forwarded_kinds(&self) -> Vec<EventKind> {
        self.forwarded.borrow().iter().copied().collect()
    }

    /// The host bus.
    #[must_use]
    pub fn bus(&self) -> &Rc<dyn HostEventBus> {
        &self.bus
    }
}

impl std::fmt::Debug for EventDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventDispatcher")
            .field("kinds", &self.by_kind.borrow().len())
            .field("scopes", &self.by_scope.borrow().len())
            .field("forwarded", &self.forwarded.borrow().len())
            .finish()
    }
}

/// Actor of the event being dispatched, resolved on first use.
#[derive(Default)]
struct LazyActor {
    user: OnceCell<Option<User>>,
}

impl LazyActor {
    fn get(&self, resolve: impl FnOnce() -> Option<User>) -> Option<&User> {
        self.user.get_or_init(resolve).as_ref()
    }
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> &str {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message
    } else {
        "unknown panic"
    }
}
