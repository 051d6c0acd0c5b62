//! Sessions: one play-through of a game.
//!
//! - [`Session`] drives the phases and the game-level features.
//! - [`SessionHandle`] is the shared view game objects hold: membership,
//!   membership listeners, join guards.

pub mod events;
pub mod handle;
pub mod listeners;
#[allow(clippy::module_inception)]
pub mod session;

pub use events::{
    SessionEndedEvent, SessionStartedEvent, UserJoinedEvent, UserQuitEvent, UserSpectatingEvent,
    SESSION_EVENT, USER_EVENT,
};
pub use handle::{Admission, JoinKind, JoinResult, SessionHandle, SessionState};
pub use listeners::ListenerKind;
pub use session::Session;
