//! A configured game mode.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use tracing::debug;

use crate::config::GameConfig;
use crate::core::{GameError, ObjectId};
use crate::session::handle::SessionCore;
use crate::session::{Session, SessionHandle, SessionState};

use super::definition::GameDefinition;
use super::manager::GameManager;

/// A [`GameDefinition`] bound to a [`GameConfig`]. Can be played any
/// number of times by creating sessions.
pub struct Game {
    id: ObjectId,
    manager: Rc<GameManager>,
    definition: GameDefinition,
    config: GameConfig,
    sessions: RefCell<Vec<Weak<SessionCore>>>,
}

impl Game {
    pub(crate) fn new(
        manager: Rc<GameManager>,
        definition: GameDefinition,
        config: GameConfig,
    ) -> Rc<Self> {
        Rc::new(Self {
            id: ObjectId::random(),
            manager,
            definition,
            config,
            sessions: RefCell::new(Vec::new()),
        })
    }

    #[must_use]
    pub fn id(&self) -> ObjectId {
        self.id
    }

    #[must_use]
    pub fn manager(&self) -> &Rc<GameManager> {
        &self.manager
    }

    #[must_use]
    pub fn definition(&self) -> &GameDefinition {
        &self.definition
    }

    #[must_use]
    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Create and initialize a new session.
    ///
    /// Call [`Session::start`] to start the first phase.
    pub fn create_session(self: &Rc<Self>) -> Result<Session, GameError> {
        let mut session = self.new_session();
        session.initialize()?;
        Ok(session)
    }

    /// Create a session without initializing it.
    pub fn new_session(self: &Rc<Self>) -> Session {
        let handle = SessionHandle::new(Rc::clone(self));
        self.sessions.borrow_mut().push(handle.downgrade());
        debug!(game = %self.id, session = %handle.id(), "session created");
        Session::new(handle)
    }

    /// Live sessions that have not ended.
    #[must_use]
    pub fn sessions(&self) -> Vec<SessionHandle> {
        self.all_sessions()
            .into_iter()
            .filter(|session| session.state() != SessionState::Ended)
            .collect()
    }

    /// Every live session regardless of state. Dropped sessions are
    /// forgotten.
    #[must_use]
    pub fn all_sessions(&self) -> Vec<SessionHandle> {
        let mut sessions = self.sessions.borrow_mut();
        sessions.retain(|session| session.strong_count() > 0);
        sessions.iter().filter_map(SessionHandle::from_weak).collect()
    }
}

impl std::fmt::Debug for Game {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Game")
            .field("id", &self.id)
            .field("definition", &self.definition)
            .field("sessions", &self.sessions.borrow().len())
            .finish()
    }
}
