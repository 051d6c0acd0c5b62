//! The session driver.
//!
//! A `Session` owns the phases and the game-level features of one
//! play-through and moves through them in declaration order:
//!
//! ```text
//! NotStarted --initialize--> Loading --> NotStarted
//!            --start-------> Active (first phase started)
//!            --next_phase--> Active (previous ended, next started)
//!            --next_phase--> Ended  (no phase left)
//!            --end---------> Ended
//! ```

use std::rc::Rc;

use tracing::{debug, info, warn};

use crate::core::{GameError, LifecycleError, ObjectId, Player, Scope, User};
use crate::features::{Feature, FeatureSet};
use crate::phases::Phase;

use super::events::{SessionEndedEvent, SessionStartedEvent};
use super::handle::{Admission, JoinKind, JoinResult, SessionHandle, SessionState};

/// One play-through of a game.
pub struct Session {
    handle: SessionHandle,
    phases: Vec<Phase>,
    features: FeatureSet,
    current: Option<usize>,
    initialized: bool,
}

impl Session {
    pub(crate) fn new(handle: SessionHandle) -> Self {
        Self {
            handle,
            phases: Vec::new(),
            features: FeatureSet::new(),
            current: None,
            initialized: false,
        }
    }

    /// Build the declared phases and game-level features.
    ///
    /// Phases are created through the phase registry in declaration order,
    /// customized, then initialized. A phase whose configured duration is
    /// malformed keeps its default duration. A phase tag that cannot be
    /// created aborts initialization and releases what the phases built so
    /// far cached. Calling this again does nothing.
    pub fn initialize(&mut self) -> Result<(), GameError> {
        if self.initialized {
            return Ok(());
        }
        if self.state() == SessionState::Ended {
            return Err(self.invalid_transition("initialize").into());
        }

        self.handle.set_state(SessionState::Loading);
        let built = self.build();
        self.handle.set_state(SessionState::NotStarted);
        built?;

        self.initialized = true;
        info!(
            session = %self.id(),
            phases = self.phases.len(),
            features = self.features.len(),
            "session initialized"
        );
        Ok(())
    }

    fn build(&mut self) -> Result<(), GameError> {
        let scope = self.scope();
        let game = Rc::clone(self.handle.game());
        let definition = game.definition();
        let registry = game.manager().phases();

        let mut phases = Vec::with_capacity(definition.phases().len());
        for declaration in definition.phases() {
            let mut phase = match registry.create(declaration.tag(), &scope) {
                Ok(phase) => phase,
                Err(err) => {
                    self.release_scopes(&phases);
                    return Err(err);
                }
            };
            declaration.customize(&mut phase);
            if let Err(err) = phase.initialize() {
                warn!(
                    session = %self.id(),
                    phase = %declaration.tag(),
                    error = %err,
                    "invalid phase configuration, keeping defaults"
                );
            }
            phases.push(*phase);
        }

        for declaration in definition.features() {
            self.features
                .attach(&scope, declaration.tag(), |feature| declaration.customize(feature));
        }
        self.phases = phases;
        Ok(())
    }

    /// Enable the game-level features and start the first phase.
    ///
    /// A session without phases ends right away.
    pub fn start(&mut self) -> Result<(), GameError> {
        if !self.initialized {
            return Err(LifecycleError::NotInitialized {
                object: self.describe(),
            }
            .into());
        }
        if self.state() != SessionState::NotStarted {
            return Err(self.invalid_transition("start").into());
        }

        self.handle.set_state(SessionState::Active);
        self.features.activate();
        self.handle.post(&SessionStartedEvent { session: self.id() });
        info!(session = %self.id(), "session started");

        self.next_phase()?;
        Ok(())
    }

    /// End the current phase and start the next one.
    ///
    /// Returns `false` when there was no next phase; the session has then
    /// ended.
    pub fn next_phase(&mut self) -> Result<bool, GameError> {
        if self.state() != SessionState::Active {
            return Err(self.invalid_transition("advance").into());
        }

        if let Some(phase) = self.current_phase_mut() {
            if phase.is_active() {
                phase.end()?;
            }
        }

        let next = self.current.map_or(0, |index| index + 1);
        match self.phases.get_mut(next) {
            Some(phase) => {
                self.current = Some(next);
                phase.start()?;
                Ok(true)
            }
            None => {
                self.finish(true);
                Ok(false)
            }
        }
    }

    /// End the session early.
    ///
    /// Ends the active phase, disables the game-level features and drops
    /// every dispatcher listener of the session.
    pub fn end(&mut self) -> Result<(), GameError> {
        if self.state() == SessionState::Ended {
            return Err(self.invalid_transition("end").into());
        }
        self.finish(false);
        Ok(())
    }

    fn finish(&mut self, completed: bool) {
        let id = self.id();
        if let Some(phase) = self.current_phase_mut() {
            if phase.is_active() {
                if let Err(err) = phase.end() {
                    warn!(session = %id, error = %err, "failed to end phase");
                }
            }
        }
        self.features.deactivate();

        let removed = self.release_scopes(&self.phases);

        self.handle.set_state(SessionState::Ended);
        self.handle.post(&SessionEndedEvent {
            session: id,
            completed,
        });
        info!(session = %id, completed, listeners = removed, "session ended");
    }

    /// Unregister the listeners of the session and `phases`, forget their
    /// cached bindings and drop the session's membership listeners.
    fn release_scopes(&self, phases: &[Phase]) -> usize {
        let id = self.id();
        let manager = Rc::clone(self.handle.manager());
        let dispatcher = manager.dispatcher();
        let mut removed = dispatcher.unregister_scope(id);
        for phase in phases {
            removed += dispatcher.unregister_scope(phase.id());
            manager.features().forget_scope(phase.id());
        }
        manager.features().forget_scope(id);
        manager.phases().forget_scope(id);
        self.handle.remove_listeners(id);
        removed
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    #[must_use]
    pub fn id(&self) -> ObjectId {
        self.handle.id()
    }

    /// Shared handle, as seen by game objects.
    #[must_use]
    pub fn handle(&self) -> &SessionHandle {
        &self.handle
    }

    /// The session-level scope.
    #[must_use]
    pub fn scope(&self) -> Scope {
        Scope::session(&self.handle)
    }

    #[must_use]
    pub fn state(&self) -> SessionState {
        self.handle.state()
    }

    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Phases in declaration order.
    #[must_use]
    pub fn phases(&self) -> &[Phase] {
        &self.phases
    }

    #[must_use]
    pub fn phase(&self, index: usize) -> Option<&Phase> {
        self.phases.get(index)
    }

    pub fn phase_mut(&mut self, index: usize) -> Option<&mut Phase> {
        self.phases.get_mut(index)
    }

    /// The first phase declared as `tag`.
    #[must_use]
    pub fn phase_by_tag(&self, tag: &str) -> Option<&Phase> {
        self.phases.iter().find(|phase| phase.tag() == tag)
    }

    /// Index of the phase that was started last.
    #[must_use]
    pub fn current_index(&self) -> Option<usize> {
        self.current
    }

    #[must_use]
    pub fn current_phase(&self) -> Option<&Phase> {
        self.current.and_then(|index| self.phases.get(index))
    }

    pub fn current_phase_mut(&mut self) -> Option<&mut Phase> {
        self.current.and_then(|index| self.phases.get_mut(index))
    }

    /// Game-level features.
    #[must_use]
    pub fn features(&self) -> &FeatureSet {
        &self.features
    }

    /// The first game-level feature of type `F`.
    #[must_use]
    pub fn feature<F: Feature>(&self) -> Option<&F> {
        self.features.get_as::<F>()
    }

    // ========================================================================
    // Membership
    // ========================================================================

    pub fn join(&self, user: User) -> JoinResult {
        self.handle.join(user)
    }

    pub fn spectate(&self, user: User) -> JoinResult {
        self.handle.spectate(user)
    }

    pub fn leave(&self, user: &User) -> bool {
        self.handle.leave(user)
    }

    #[must_use]
    pub fn users(&self, include_spectators: bool) -> Vec<User> {
        self.handle.users(include_spectators)
    }

    #[must_use]
    pub fn spectators(&self) -> Vec<User> {
        self.handle.spectators()
    }

    #[must_use]
    pub fn players(&self, include_spectators: bool) -> Vec<Player> {
        self.handle.players(include_spectators)
    }

    /// Register a session-wide join guard.
    pub fn add_join_guard(&self, guard: impl Fn(&User, JoinKind) -> Admission + 'static) {
        self.handle.add_join_guard(self.id(), guard);
    }

    fn describe(&self) -> String {
        format!("session {}", self.id().uuid())
    }

    fn invalid_transition(&self, action: &'static str) -> LifecycleError {
        LifecycleError::InvalidTransition {
            object: self.describe(),
            action,
            state: self.state().to_string(),
        }
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        if self.state() != SessionState::Ended {
            let removed = self.release_scopes(&self.phases);
            debug!(session = %self.id(), listeners = removed, "session dropped before ending");
        }
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.id())
            .field("state", &self.state())
            .field("phases", &self.phases)
            .field("current", &self.current)
            .field("features", &self.features)
            .finish()
    }
}
