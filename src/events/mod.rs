//! Contextual event dispatch.
//!
//! Host events are generic: a damage event knows an entity, not a game.
//! This module turns them into filtered, actor-resolved callbacks on the
//! game objects of a session.
//!
//! ## Pieces
//!
//! - [`Event`] / [`EventKind`]: the event model, with kind lineage
//! - [`Subscription`] / [`Listenable`]: what a game object listens to
//! - [`EventFilter`] / [`FilterTag`]: per-listener gates
//! - [`HostEventBus`]: the host's bus, [`LocalEventBus`] in memory
//! - [`EventDispatcher`]: indexes listeners and routes events

pub mod bus;
pub mod dispatcher;
pub mod event;
pub mod filter;
pub mod listener;
pub mod priority;
pub mod subscription;

pub use bus::{BusCallback, BusSubscriptionId, HostEventBus, LocalEventBus};
pub use dispatcher::{ActorAccessor, EventDispatcher};
pub use event::{Event, EventKind, GenericEvent, TypedEvent, GAME_EVENT};
pub use filter::{
    build_chain, AcceptAll, AnonymousPolicy, EventFilter, FilterChain, FilterTag, Membership,
    MembershipFilter,
};
pub use listener::RegisteredListener;
pub use priority::EventPriority;
pub use subscription::{Handler, HandlerResult, Listenable, Subscription};
