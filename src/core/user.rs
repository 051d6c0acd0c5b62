//! Users, players and the user directory.
//!
//! ## User vs. Player
//!
//! A `User` is the domain-level participant of a game session. A `Player`
//! is the host platform's handle for a connected client. Every player maps
//! to a user through the [`UserDirectory`]; a user may exist without a
//! player (offline, bot, or a host that has no player concept).
//!
//! ## Entities
//!
//! Host events often only carry an entity. An [`EntityRef`] is either a
//! player or some other host object; only player entities resolve to users.

use std::cell::RefCell;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// External (host-assigned) player identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlayerId(pub Uuid);

impl PlayerId {
    /// Create a new random player ID.
    #[must_use]
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }
}

impl std::fmt::Display for PlayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Player({})", self.0)
    }
}

/// Host handle for a connected player.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Player {
    /// Host-assigned identifier.
    pub id: PlayerId,
    /// Display name.
    pub name: String,
}

impl Player {
    /// Create a new player handle.
    pub fn new(id: PlayerId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

/// Domain user identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub Uuid);

impl UserId {
    /// Create a new random user ID.
    #[must_use]
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "User({})", self.0)
    }
}

/// A participant of a game session.
///
/// Equality and hashing only consider the id so that a user whose player
/// handle changed is still the same member of a session.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct User {
    /// Unique identifier.
    pub id: UserId,
    /// Display name.
    pub name: String,
    /// The player handle, if the user is currently connected.
    pub player: Option<Player>,
}

impl User {
    /// Create a user without a player handle.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: UserId::random(),
            name: name.into(),
            player: None,
        }
    }

    /// Create a user backed by a connected player.
    pub fn from_player(player: Player) -> Self {
        Self {
            id: UserId::random(),
            name: player.name.clone(),
            player: Some(player),
        }
    }

    /// Set the player handle (builder pattern).
    #[must_use]
    pub fn with_player(mut self, player: Player) -> Self {
        self.player = Some(player);
        self
    }

    /// The resolved player handle, if any.
    #[must_use]
    pub fn player(&self) -> Option<&Player> {
        self.player.as_ref()
    }
}

impl PartialEq for User {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for User {}

impl std::hash::Hash for User {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

/// A host entity referenced by an event.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityRef {
    /// The entity is a player.
    Player(PlayerId),
    /// Any other host object (mob, item, block, ...).
    Other(Uuid),
}

impl EntityRef {
    /// The player id if this entity is a player.
    #[must_use]
    pub const fn as_player(self) -> Option<PlayerId> {
        match self {
            Self::Player(id) => Some(id),
            Self::Other(_) => None,
        }
    }
}

/// Host directory mapping external player ids to domain users.
pub trait UserDirectory {
    /// Resolve the user behind a player, if known.
    fn resolve(&self, player: PlayerId) -> Option<User>;
}

/// Simple in-memory [`UserDirectory`].
///
/// ```
/// use rust_gamelib::core::{InMemoryUserDirectory, Player, PlayerId, User, UserDirectory};
///
/// let directory = InMemoryUserDirectory::new();
/// let player = Player::new(PlayerId::random(), "Steve");
/// let user = directory.insert(User::from_player(player.clone()));
///
/// assert_eq!(directory.resolve(player.id), Some(user));
/// assert_eq!(directory.resolve(PlayerId::random()), None);
/// ```
#[derive(Debug, Default)]
pub struct InMemoryUserDirectory {
    users: RefCell<FxHashMap<PlayerId, User>>,
}

impl InMemoryUserDirectory {
    /// Create an empty directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a user, indexed by its player id. Users without a player
    /// handle cannot be resolved and are returned unchanged.
    pub fn insert(&self, user: User) -> User {
        if let Some(player) = user.player() {
            self.users.borrow_mut().insert(player.id, user.clone());
        }
        user
    }

    /// Forget the user behind a player.
    pub fn remove(&self, player: PlayerId) -> Option<User> {
        self.users.borrow_mut().remove(&player)
    }

    /// Number of resolvable users.
    #[must_use]
    pub fn len(&self) -> usize {
        self.users.borrow().len()
    }

    /// Check if the directory is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.users.borrow().is_empty()
    }
}

impl UserDirectory for InMemoryUserDirectory {
    fn resolve(&self, player: PlayerId) -> Option<User> {
        self.users.borrow().get(&player).cloned()
    }
}
