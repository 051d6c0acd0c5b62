//! Core types: ids, users, clock, durations, contexts and errors.
//!
//! This module contains the building blocks every other module depends on.
//! Host collaborators (user directory, clock) are traits here so that the
//! rest of the crate never talks to a concrete platform.

pub mod any;
pub mod clock;
pub mod context;
pub mod duration;
pub mod error;
pub mod id;
pub mod user;

pub use any::AsAny;
pub use clock::{Clock, ManualClock, SystemClock};
pub use context::{GameObjectContext, Scope, ScopeKind};
pub use duration::{parse_iso_duration, DurationParseError};
pub use error::{
    BindingError, ConfigError, ConstructionError, GameError, LifecycleError, RegistryError,
};
pub use id::ObjectId;
pub use user::{EntityRef, InMemoryUserDirectory, Player, PlayerId, User, UserDirectory, UserId};
