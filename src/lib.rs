//! # rust-gamelib
//!
//! A framework for composing multiplayer game modes out of sequential
//! phases and pluggable features.
//!
//! ## Design Principles
//!
//! 1. **Composition**: Phases and features embed a `GameObjectContext`
//!    (id, scope, session) instead of inheriting from base types.
//!
//! 2. **Configuration Over Code**: Every feature and phase declares its
//!    options. Values are read from the game config, scoped per phase:
//!    `[phases/<phase-tag>/]features/<feature-tag>/<option>`.
//!
//! 3. **Explicit Subscriptions**: Game objects list their event
//!    subscriptions as data. Nothing is discovered at runtime.
//!
//! ## Architecture
//!
//! ```text
//! GameManager ── registries, dispatcher, host bus, users, clock
//!   └─ Game ── definition + config
//!        └─ Session ── members, game-level features
//!             └─ Phase ── features
//! ```
//!
//! Everything runs on the host's main thread. Shared state uses `Rc` and
//! `RefCell`; the dispatcher iterates snapshots so handlers may register
//! and unregister listeners while an event is being dispatched.
//!
//! ## Modules
//!
//! - `core`: ids, users, clock, durations, contexts and errors
//! - `config`: YAML config tree, options and bindings
//! - `registry`: tag registries and configured object factories
//! - `features`: the feature trait and feature sets
//! - `phases`: phase behaviors and the phase state machine
//! - `events`: event model, filters, host bus and the dispatcher
//! - `session`: sessions, membership and membership listeners
//! - `game`: game definitions, games and the game manager

pub mod core;
pub mod config;
pub mod registry;
pub mod features;
pub mod phases;
pub mod events;
pub mod session;
pub mod game;

// Re-export commonly used types
pub use crate::core::{
    Clock, ConstructionError, GameError, GameObjectContext, ManualClock, ObjectId, Player,
    PlayerId, Scope, SystemClock, User, UserDirectory, UserId,
};

pub use crate::config::{ConfigOption, Configurable, GameConfig, OptionKind, OptionValue};

pub use crate::registry::{FeatureRegistry, PhaseRegistry};

pub use crate::features::{Feature, FeatureType};

pub use crate::phases::{Phase, PhaseBehavior, PhaseSetup, PhaseState, PhaseType};

pub use crate::events::{
    Event, EventDispatcher, EventKind, EventPriority, FilterTag, HostEventBus, Listenable,
    LocalEventBus, Subscription, TypedEvent,
};

pub use crate::session::{JoinResult, Session, SessionHandle, SessionState};

pub use crate::game::{Game, GameDefinition, GameManager};
