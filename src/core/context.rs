//! Scopes and the game object context.
//!
//! ## Scope
//!
//! Features live either in a session (game-level features) or in a phase.
//! The owner is the feature's *scope*. A scope has a stable id, used as the
//! key for configuration bindings and listener bookkeeping, and a
//! configuration path:
//!
//! - session scope: `[]`
//! - phase scope: `["phases", <phase-tag>]`
//!
//! ## GameObjectContext
//!
//! Every feature and phase embeds one `GameObjectContext`: its own id, its
//! scope and (through the scope) the owning session. All derived views
//! (game, manager, clock, users, players) go through the context.

use std::rc::Rc;

use crate::core::{Clock, ObjectId, Player, User};
use crate::game::{Game, GameManager};
use crate::session::SessionHandle;

/// Kind of scope.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ScopeKind {
    /// Game-level scope.
    Session,
    /// A phase, identified in configuration by its tag.
    Phase {
        /// The phase tag.
        tag: String,
    },
}

/// The session or phase owning a feature namespace.
#[derive(Clone)]
pub struct Scope {
    id: ObjectId,
    kind: ScopeKind,
    session: SessionHandle,
}

impl Scope {
    /// Session-level scope.
    pub fn session(session: &SessionHandle) -> Self {
        Self {
            id: session.id(),
            kind: ScopeKind::Session,
            session: session.clone(),
        }
    }

    /// Phase-level scope.
    pub fn phase(id: ObjectId, tag: impl Into<String>, session: &SessionHandle) -> Self {
        Self {
            id,
            kind: ScopeKind::Phase { tag: tag.into() },
            session: session.clone(),
        }
    }

    /// Stable id used as the cache and listener key.
    #[must_use]
    pub fn id(&self) -> ObjectId {
        self.id
    }

    /// Scope kind.
    #[must_use]
    pub fn kind(&self) -> &ScopeKind {
        &self.kind
    }

    /// The owning session.
    #[must_use]
    pub fn session_handle(&self) -> &SessionHandle {
        &self.session
    }

    /// True for phase scopes.
    #[must_use]
    pub fn is_phase(&self) -> bool {
        matches!(self.kind, ScopeKind::Phase { .. })
    }

    /// Phase tag, for phase scopes.
    #[must_use]
    pub fn phase_tag(&self) -> Option<&str> {
        match &self.kind {
            ScopeKind::Phase { tag } => Some(tag),
            ScopeKind::Session => None,
        }
    }

    /// Configuration path of this scope.
    #[must_use]
    pub fn config_path(&self) -> Vec<String> {
        match &self.kind {
            ScopeKind::Session => Vec::new(),
            ScopeKind::Phase { tag } => vec!["phases".to_string(), tag.clone()],
        }
    }
}

impl std::fmt::Debug for Scope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scope")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .field("session", &self.session.id())
            .finish()
    }
}

impl std::fmt::Display for Scope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.kind {
            ScopeKind::Session => write!(f, "session {}", self.id.uuid()),
            ScopeKind::Phase { tag } => write!(f, "phase '{}' {}", tag, self.id.uuid()),
        }
    }
}

/// Identity and scope shared by every feature and phase.
#[derive(Clone, Debug)]
pub struct GameObjectContext {
    id: ObjectId,
    scope: Scope,
}

impl GameObjectContext {
    /// Create a context for a new object in `scope`.
    pub fn new(id: ObjectId, scope: Scope) -> Self {
        Self { id, scope }
    }

    /// The object's own id.
    #[must_use]
    pub fn id(&self) -> ObjectId {
        self.id
    }

    /// The owning scope.
    #[must_use]
    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    /// The owning session.
    #[must_use]
    pub fn session(&self) -> &SessionHandle {
        self.scope.session_handle()
    }

    /// The game the session was created from.
    #[must_use]
    pub fn game(&self) -> &Rc<Game> {
        self.session().game()
    }

    /// The manager holding registries and the dispatcher.
    #[must_use]
    pub fn manager(&self) -> &Rc<GameManager> {
        self.game().manager()
    }

    /// The host clock.
    #[must_use]
    pub fn clock(&self) -> &Rc<dyn Clock> {
        self.manager().clock()
    }

    /// Users currently playing (spectators excluded).
    #[must_use]
    pub fn users(&self) -> Vec<User> {
        self.session().users(false)
    }

    /// Players currently playing (spectators excluded).
    #[must_use]
    pub fn players(&self) -> Vec<Player> {
        self.session().players(false)
    }

    /// Called for every user that joins, and immediately for current users.
    pub fn on_join(&self, callback: impl Fn(&User) + 'static) {
        self.session().on_join(self.id, callback);
    }

    /// Like [`Self::on_join`] with the resolved player.
    pub fn on_player_join(&self, callback: impl Fn(&Player) + 'static) {
        self.session().on_player_join(self.id, callback);
    }

    /// Called for every user that quits, and for current members when this
    /// object deactivates.
    pub fn on_quit(&self, callback: impl Fn(&User) + 'static) {
        self.session().on_quit(self.id, callback);
    }

    /// Like [`Self::on_quit`] with the resolved player.
    pub fn on_player_quit(&self, callback: impl Fn(&Player) + 'static) {
        self.session().on_player_quit(self.id, callback);
    }

    /// Called for every user that starts spectating, and immediately for
    /// current spectators.
    pub fn on_spectate(&self, callback: impl Fn(&User) + 'static) {
        self.session().on_spectate(self.id, callback);
    }

    /// Like [`Self::on_spectate`] with the resolved player.
    pub fn on_player_spectate(&self, callback: impl Fn(&Player) + 'static) {
        self.session().on_player_spectate(self.id, callback);
    }
}
