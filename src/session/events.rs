//! Events posted by sessions.
//!
//! All of them are informational: they are posted after the fact and
//! cannot be cancelled. Admission control goes through join guards.

use crate::core::{ObjectId, User};
use crate::events::{Event, EventKind, TypedEvent, GAME_EVENT};

/// Parent kind of every membership event.
pub const USER_EVENT: EventKind = EventKind::new("gamelib:user");

/// Parent kind of every session lifecycle event.
pub const SESSION_EVENT: EventKind = EventKind::new("gamelib:session");

const USER_LINEAGE: &[EventKind] = &[USER_EVENT, GAME_EVENT];
const SESSION_LINEAGE: &[EventKind] = &[SESSION_EVENT, GAME_EVENT];

/// A user joined a session as a player.
#[derive(Clone, Debug)]
pub struct UserJoinedEvent {
    pub session: ObjectId,
    pub user: User,
}

impl UserJoinedEvent {
    pub fn new(session: ObjectId, user: User) -> Self {
        Self { session, user }
    }
}

impl TypedEvent for UserJoinedEvent {
    const KIND: EventKind = EventKind::new("gamelib:user-joined");
}

impl Event for UserJoinedEvent {
    fn kind(&self) -> EventKind {
        Self::KIND
    }

    fn parent_kinds(&self) -> &'static [EventKind] {
        USER_LINEAGE
    }

    fn user(&self) -> Option<&User> {
        Some(&self.user)
    }
}

/// A user started spectating a session.
#[derive(Clone, Debug)]
pub struct UserSpectatingEvent {
    pub session: ObjectId,
    pub user: User,
}

impl UserSpectatingEvent {
    pub fn new(session: ObjectId, user: User) -> Self {
        Self { session, user }
    }
}

impl TypedEvent for UserSpectatingEvent {
    const KIND: EventKind = EventKind::new("gamelib:user-spectating");
}

impl Event for UserSpectatingEvent {
    fn kind(&self) -> EventKind {
        Self::KIND
    }

    fn parent_kinds(&self) -> &'static [EventKind] {
        USER_LINEAGE
    }

    fn user(&self) -> Option<&User> {
        Some(&self.user)
    }
}

/// A user left a session.
#[derive(Clone, Debug)]
pub struct UserQuitEvent {
    pub session: ObjectId,
    pub user: User,
}

impl UserQuitEvent {
    pub fn new(session: ObjectId, user: User) -> Self {
        Self { session, user }
    }
}

impl TypedEvent for UserQuitEvent {
    const KIND: EventKind = EventKind::new("gamelib:user-quit");
}

impl Event for UserQuitEvent {
    fn kind(&self) -> EventKind {
        Self::KIND
    }

    fn parent_kinds(&self) -> &'static [EventKind] {
        USER_LINEAGE
    }

    fn user(&self) -> Option<&User> {
        Some(&self.user)
    }
}

/// A session started its first phase.
#[derive(Clone, Debug)]
pub struct SessionStartedEvent {
    pub session: ObjectId,
}

impl TypedEvent for SessionStartedEvent {
    const KIND: EventKind = EventKind::new("gamelib:session-started");
}

impl Event for SessionStartedEvent {
    fn kind(&self) -> EventKind {
        Self::KIND
    }

    fn parent_kinds(&self) -> &'static [EventKind] {
        SESSION_LINEAGE
    }
}

/// A session ended.
#[derive(Clone, Debug)]
pub struct SessionEndedEvent {
    pub session: ObjectId,
    /// Whether the session ran out of phases rather than being ended early.
    pub completed: bool,
}

impl TypedEvent for SessionEndedEvent {
    const KIND: EventKind = EventKind::new("gamelib:session-ended");
}

impl Event for SessionEndedEvent {
    fn kind(&self) -> EventKind {
        Self::KIND
    }

    fn parent_kinds(&self) -> &'static [EventKind] {
        SESSION_LINEAGE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_event_lineage() {
        let event = UserJoinedEvent::new(ObjectId::nil(), User::new("Alex"));
        let event: &dyn Event = &event;
        assert_eq!(
            event.lineage(),
            vec![UserJoinedEvent::KIND, USER_EVENT, GAME_EVENT]
        );
        assert_eq!(event.user().map(|u| u.name.as_str()), Some("Alex"));
    }

    #[test]
    fn test_session_events_have_no_actor() {
        let event = SessionEndedEvent {
            session: ObjectId::nil(),
            completed: true,
        };
        assert!(event.user().is_none());
        assert!(event.player().is_none());
        assert_eq!(event.parent_kinds(), SESSION_LINEAGE);
    }
}
