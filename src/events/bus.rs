//! Host event bus.
//!
//! The library never delivers host events on its own. It subscribes
//! forwarding callbacks to the host's bus and posts its own informational
//! events there. [`LocalEventBus`] is an in-memory implementation for hosts
//! without an event system, and for tests.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use tracing::trace;

use crate::core::ObjectId;

use super::event::{Event, EventKind};
use super::priority::EventPriority;

/// Callback attached to the host bus.
pub type BusCallback = Rc<dyn Fn(&dyn Event)>;

/// Identifier of one bus subscription.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BusSubscriptionId(pub u64);

/// The host's event bus.
pub trait HostEventBus {
    /// Attach `callback` for events whose lineage contains `kind`.
    ///
    /// `owner` groups subscriptions so they can be detached together.
    fn subscribe(
        &self,
        kind: EventKind,
        priority: EventPriority,
        ignore_cancelled: bool,
        owner: Option<ObjectId>,
        callback: BusCallback,
    ) -> BusSubscriptionId;

    /// Detach every subscription of `owner`. Returns how many were removed.
    fn detach(&self, owner: ObjectId) -> usize;

    /// Deliver an event to every matching subscription.
    fn post(&self, event: &dyn Event);
}

struct BusEntry {
    id: BusSubscriptionId,
    kind: EventKind,
    priority: EventPriority,
    ignore_cancelled: bool,
    owner: Option<ObjectId>,
    callback: BusCallback,
}

/// Synchronous in-memory event bus.
///
/// Subscriptions run ordered by priority, then by subscription order.
/// Subscribing or detaching from inside a callback affects the next post.
///
/// ```
/// use std::cell::Cell;
/// use std::rc::Rc;
/// use rust_gamelib::events::{
///     Event, EventKind, EventPriority, GenericEvent, HostEventBus, LocalEventBus,
/// };
///
/// const TICK: EventKind = EventKind::new("host:tick");
///
/// let bus = LocalEventBus::new();
/// let ticks = Rc::new(Cell::new(0));
/// let counter = Rc::clone(&ticks);
/// bus.subscribe(TICK, EventPriority::Normal, false, None, Rc::new(move |_: &dyn Event| {
///     counter.set(counter.get() + 1);
/// }));
///
/// bus.post(&GenericEvent::new(TICK));
/// assert_eq!(ticks.get(), 1);
/// ```
#[derive(Default)]
pub struct LocalEventBus {
    entries: RefCell<Vec<BusEntry>>,
    next_id: Cell<u64>,
}

impl LocalEventBus {
    /// Create an empty bus.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of attached subscriptions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    /// Check if nothing is attached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    /// Number of subscriptions attached for exactly `kind`.
    #[must_use]
    pub fn subscriptions_for(&self, kind: EventKind) -> usize {
        self.entries
            .borrow()
            .iter()
            .filter(|entry| entry.kind == kind)
            .count()
    }

    /// Remove a single subscription.
    pub fn unsubscribe(&self, id: BusSubscriptionId) -> bool {
        let mut entries = self.entries.borrow_mut();
        let before = entries.len();
        entries.retain(|entry| entry.id != id);
        entries.len() != before
    }
}

impl HostEventBus for LocalEventBus {
    fn subscribe(
        &self,
        kind: EventKind,
        priority: EventPriority,
        ignore_cancelled: bool,
        owner: Option<ObjectId>,
        callback: BusCallback,
    ) -> BusSubscriptionId {
        let id = BusSubscriptionId(self.next_id.get());
        self.next_id.set(id.0 + 1);
        self.entries.borrow_mut().push(BusEntry {
            id,
            kind,
            priority,
            ignore_cancelled,
            owner,
            callback,
        });
        trace!(kind = %kind, ?priority, "bus subscription attached");
        id
    }

    fn detach(&self, owner: ObjectId) -> usize {
        let mut entries = self.entries.borrow_mut();
        let before = entries.len();
        entries.retain(|entry| entry.owner != Some(owner));
        before - entries.len()
    }

    fn post(&self, event: &dyn Event) {
        let lineage = event.lineage();
        let mut matching: Vec<(EventPriority, BusSubscriptionId, bool, BusCallback)> = self
            .entries
            .borrow()
            .iter()
            .filter(|entry| lineage.contains(&entry.kind))
            .map(|entry| {
                (
                    entry.priority,
                    entry.id,
                    entry.ignore_cancelled,
                    Rc::clone(&entry.callback),
                )
            })
            .collect();
        matching.sort_by_key(|(priority, id, _, _)| (*priority, *id));

        trace!(kind = %event.kind(), subscribers = matching.len(), "posting event");
        for (_, _, ignore_cancelled, callback) in matching {
            if ignore_cancelled && event.is_cancelled() {
                continue;
            }
            callback(event);
        }
    }
}

impl std::fmt::Debug for LocalEventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalEventBus")
            .field("subscriptions", &self.len())
            .finish()
    }
}
