//! Shared session state.
//!
//! A [`SessionHandle`] is the part of a session that game objects can reach
//! through their context: identity, state, membership and the membership
//! listeners. The phase list lives in [`Session`](super::Session), which
//! owns the handle.
//!
//! ## Membership
//!
//! Users are either playing or spectating, never both. Joining moves a user
//! out of the spectators and vice versa.
//!
//! ```text
//! join(user)
//!   ├─ session ended?          -> GameEnded
//!   ├─ any guard rejects?      -> Cancelled(reason), nothing changed
//!   ├─ move into players
//!   ├─ notify user listeners, then player listeners
//!   └─ post UserJoinedEvent    -> Success
//! ```

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::core::{ObjectId, Player, User};
use crate::events::Event;
use crate::game::{Game, GameManager};

use super::events::{UserJoinedEvent, UserQuitEvent, UserSpectatingEvent};
use super::listeners::{ListenerKind, SessionListeners};

/// Lifecycle state of a session.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SessionState {
    #[default]
    NotStarted,
    Loading,
    Active,
    Ended,
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::NotStarted => "not started",
            Self::Loading => "loading",
            Self::Active => "active",
            Self::Ended => "ended",
        };
        f.write_str(name)
    }
}

/// Outcome of [`SessionHandle::join`] and [`SessionHandle::spectate`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum JoinResult {
    Success,
    /// A join guard rejected the user.
    Cancelled(String),
    /// The session has already ended.
    GameEnded,
}

impl JoinResult {
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }
}

/// Verdict of a join guard.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Admission {
    Accepted,
    Rejected(String),
}

impl Admission {
    /// Reject with a reason.
    pub fn reject(reason: impl Into<String>) -> Self {
        Self::Rejected(reason.into())
    }
}

/// How a user wants to take part.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum JoinKind {
    Play,
    Spectate,
}

pub(crate) struct SessionCore {
    id: ObjectId,
    game: Rc<Game>,
    state: Cell<SessionState>,
    users: RefCell<IndexSet<User>>,
    spectators: RefCell<IndexSet<User>>,
    listeners: RefCell<SessionListeners>,
}

/// Cheap, clonable reference to a session.
#[derive(Clone)]
pub struct SessionHandle(Rc<SessionCore>);

impl SessionHandle {
    pub(crate) fn new(game: Rc<Game>) -> Self {
        Self(Rc::new(SessionCore {
            id: ObjectId::random(),
            game,
            state: Cell::new(SessionState::NotStarted),
            users: RefCell::new(IndexSet::new()),
            spectators: RefCell::new(IndexSet::new()),
            listeners: RefCell::new(SessionListeners::default()),
        }))
    }

    pub(crate) fn downgrade(&self) -> Weak<SessionCore> {
        Rc::downgrade(&self.0)
    }

    pub(crate) fn from_weak(weak: &Weak<SessionCore>) -> Option<Self> {
        weak.upgrade().map(Self)
    }

    #[must_use]
    pub fn id(&self) -> ObjectId {
        self.0.id
    }

    #[must_use]
    pub fn game(&self) -> &Rc<Game> {
        &self.0.game
    }

    #[must_use]
    pub fn manager(&self) -> &Rc<GameManager> {
        self.0.game.manager()
    }

    #[must_use]
    pub fn state(&self) -> SessionState {
        self.0.state.get()
    }

    pub(crate) fn set_state(&self, state: SessionState) {
        let previous = self.0.state.replace(state);
        if previous != state {
            debug!(session = %self.id(), from = %previous, to = %state, "session state changed");
        }
    }

    // ========================================================================
    // Membership
    // ========================================================================

    /// Current players, optionally followed by the spectators.
    #[must_use]
    pub fn users(&self, include_spectators: bool) -> Vec<User> {
        let mut users: Vec<User> = self.0.users.borrow().iter().cloned().collect();
        if include_spectators {
            users.extend(self.0.spectators.borrow().iter().cloned());
        }
        users
    }

    #[must_use]
    pub fn spectators(&self) -> Vec<User> {
        self.0.spectators.borrow().iter().cloned().collect()
    }

    /// Player handles of the users that have one.
    #[must_use]
    pub fn players(&self, include_spectators: bool) -> Vec<Player> {
        self.users(include_spectators)
            .into_iter()
            .filter_map(|user| user.player)
            .collect()
    }

    #[must_use]
    pub fn is_playing(&self, user: &User) -> bool {
        self.0.users.borrow().contains(user)
    }

    #[must_use]
    pub fn is_spectating(&self, user: &User) -> bool {
        self.0.spectators.borrow().contains(user)
    }

    #[must_use]
    pub fn is_member(&self, user: &User) -> bool {
        self.is_playing(user) || self.is_spectating(user)
    }

    /// Add `user` to the players.
    pub fn join(&self, user: User) -> JoinResult {
        self.admit(user, JoinKind::Play)
    }

    /// Add `user` to the spectators.
    pub fn spectate(&self, user: User) -> JoinResult {
        self.admit(user, JoinKind::Spectate)
    }

    /// Remove `user` from the session.
    ///
    /// Quit listeners run while the user is still a member. Returns whether
    /// the user was a member; non-members are ignored.
    pub fn leave(&self, user: &User) -> bool {
        if !self.is_member(user) {
            return false;
        }

        self.notify(ListenerKind::Quit, user);
        self.0.users.borrow_mut().shift_remove(user);
        self.0.spectators.borrow_mut().shift_remove(user);

        self.post(&UserQuitEvent::new(self.id(), user.clone()));
        info!(session = %self.id(), user = %user.name, "user left session");
        true
    }

    fn admit(&self, user: User, kind: JoinKind) -> JoinResult {
        if self.state() == SessionState::Ended {
            return JoinResult::GameEnded;
        }

        let guards = self.0.listeners.borrow().guards();
        for guard in guards {
            if let Admission::Rejected(reason) = guard(&user, kind) {
                debug!(session = %self.id(), user = %user.name, %reason, "join cancelled");
                return JoinResult::Cancelled(reason);
            }
        }

        let (target, other, listener_kind) = match kind {
            JoinKind::Play => (&self.0.users, &self.0.spectators, ListenerKind::Join),
            JoinKind::Spectate => (&self.0.spectators, &self.0.users, ListenerKind::Spectate),
        };
        if target.borrow().contains(&user) {
            return JoinResult::Success;
        }
        other.borrow_mut().shift_remove(&user);
        target.borrow_mut().insert(user.clone());

        self.notify(listener_kind, &user);
        match kind {
            JoinKind::Play => self.post(&UserJoinedEvent::new(self.id(), user.clone())),
            JoinKind::Spectate => self.post(&UserSpectatingEvent::new(self.id(), user.clone())),
        }
        info!(session = %self.id(), user = %user.name, ?kind, "user admitted");
        JoinResult::Success
    }

    /// Run the user listeners, then the player listeners, of `kind`.
    fn notify(&self, kind: ListenerKind, user: &User) {
        let (user_callbacks, player_callbacks) = {
            let listeners = self.0.listeners.borrow();
            (listeners.user_callbacks(kind), listeners.player_callbacks(kind))
        };
        for callback in user_callbacks {
            callback(user);
        }
        if let Some(player) = user.player() {
            for callback in player_callbacks {
                callback(player);
            }
        }
    }

    // ========================================================================
    // Listeners
    // ========================================================================

    /// Called for every user that joins. Current players are replayed
    /// immediately.
    pub fn on_join(&self, owner: ObjectId, callback: impl Fn(&User) + 'static) {
        let callback: Rc<dyn Fn(&User)> = Rc::new(callback);
        self.0
            .listeners
            .borrow_mut()
            .add_user(ListenerKind::Join, owner, Rc::clone(&callback));
        for user in self.users(false) {
            callback(&user);
        }
    }

    /// Player variant of [`Self::on_join`].
    pub fn on_player_join(&self, owner: ObjectId, callback: impl Fn(&Player) + 'static) {
        let callback: Rc<dyn Fn(&Player)> = Rc::new(callback);
        self.0
            .listeners
            .borrow_mut()
            .add_player(ListenerKind::Join, owner, Rc::clone(&callback));
        for player in self.players(false) {
            callback(&player);
        }
    }

    /// Called for every user that leaves, and for every member when the
    /// owner's listeners are removed.
    pub fn on_quit(&self, owner: ObjectId, callback: impl Fn(&User) + 'static) {
        self.0
            .listeners
            .borrow_mut()
            .add_user(ListenerKind::Quit, owner, Rc::new(callback));
    }

    /// Player variant of [`Self::on_quit`].
    pub fn on_player_quit(&self, owner: ObjectId, callback: impl Fn(&Player) + 'static) {
        self.0
            .listeners
            .borrow_mut()
            .add_player(ListenerKind::Quit, owner, Rc::new(callback));
    }

    /// Called for every user that starts spectating. Current spectators are
    /// replayed immediately.
    pub fn on_spectate(&self, owner: ObjectId, callback: impl Fn(&User) + 'static) {
        let callback: Rc<dyn Fn(&User)> = Rc::new(callback);
        self.0
            .listeners
            .borrow_mut()
            .add_user(ListenerKind::Spectate, owner, Rc::clone(&callback));
        for user in self.spectators() {
            callback(&user);
        }
    }

    /// Player variant of [`Self::on_spectate`].
    pub fn on_player_spectate(&self, owner: ObjectId, callback: impl Fn(&Player) + 'static) {
        let callback: Rc<dyn Fn(&Player)> = Rc::new(callback);
        self.0
            .listeners
            .borrow_mut()
            .add_player(ListenerKind::Spectate, owner, Rc::clone(&callback));
        for player in self.spectators().into_iter().filter_map(|user| user.player) {
            callback(&player);
        }
    }

    /// Synchronous pre-check run before every join and spectate.
    pub fn add_join_guard(
        &self,
        owner: ObjectId,
        guard: impl Fn(&User, JoinKind) -> Admission + 'static,
    ) {
        self.0.listeners.borrow_mut().add_guard(owner, Rc::new(guard));
    }

    /// Drop every listener and guard of `owner`.
    ///
    /// The owner's quit listeners run once for every current member first,
    /// so objects can undo whatever they did on join.
    pub fn remove_listeners(&self, owner: ObjectId) -> usize {
        let (user_callbacks, player_callbacks) = {
            let listeners = self.0.listeners.borrow();
            (
                listeners.owner_user_callbacks(ListenerKind::Quit, owner),
                listeners.owner_player_callbacks(ListenerKind::Quit, owner),
            )
        };
        if !user_callbacks.is_empty() || !player_callbacks.is_empty() {
            for user in self.users(true) {
                for callback in &user_callbacks {
                    callback(&user);
                }
                if let Some(player) = user.player() {
                    for callback in &player_callbacks {
                        callback(player);
                    }
                }
            }
        }

        let removed = self.0.listeners.borrow_mut().remove_owner(owner);
        if removed > 0 {
            debug!(session = %self.id(), %owner, removed, "session listeners removed");
        }
        removed
    }

    /// Number of listeners and guards registered by `owner`.
    #[must_use]
    pub fn listener_count(&self, owner: ObjectId) -> usize {
        self.0.listeners.borrow().count(owner)
    }

    /// Post an event to the host bus.
    pub fn post(&self, event: &dyn Event) {
        self.manager().bus().post(event);
    }
}

impl PartialEq for SessionHandle {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for SessionHandle {}

impl std::fmt::Debug for SessionHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionHandle")
            .field("id", &self.0.id)
            .field("state", &self.0.state.get())
            .field("users", &self.0.users.borrow().len())
            .field("spectators", &self.0.spectators.borrow().len())
            .finish()
    }
}
