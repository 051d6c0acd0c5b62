//! The game manager.
//!
//! One manager per host. It owns the registries, the event dispatcher and
//! the host collaborators, and creates [`Game`]s.
//!
//! ## Usage
//!
//! ```
//! use std::rc::Rc;
//! use rust_gamelib::core::{InMemoryUserDirectory, ManualClock};
//! use rust_gamelib::config::GameConfig;
//! use rust_gamelib::game::{GameDefinition, GameManager};
//!
//! let manager = GameManager::builder()
//!     .with_users(Rc::new(InMemoryUserDirectory::new()))
//!     .with_clock(Rc::new(ManualClock::new()))
//!     .build();
//!
//! let game = manager.create_game(GameDefinition::new("Empty"), GameConfig::new());
//! assert_eq!(game.definition().name(), "Empty");
//! assert!(game.sessions().is_empty());
//! ```

use std::rc::Rc;

use tracing::info;

use crate::config::GameConfig;
use crate::core::{Clock, InMemoryUserDirectory, SystemClock, UserDirectory};
use crate::events::{EventDispatcher, HostEventBus, LocalEventBus};
use crate::registry::{FeatureRegistry, PhaseRegistry};

use super::definition::GameDefinition;
use super::game::Game;

/// Registries, dispatcher and host collaborators.
pub struct GameManager {
    features: FeatureRegistry,
    phases: PhaseRegistry,
    dispatcher: Rc<EventDispatcher>,
    bus: Rc<dyn HostEventBus>,
    users: Rc<dyn UserDirectory>,
    clock: Rc<dyn Clock>,
}

impl GameManager {
    /// Create a manager on top of the host's collaborators.
    pub fn new(
        bus: Rc<dyn HostEventBus>,
        users: Rc<dyn UserDirectory>,
        clock: Rc<dyn Clock>,
    ) -> Rc<Self> {
        let dispatcher = EventDispatcher::new(Rc::clone(&bus), Rc::clone(&users));
        Rc::new(Self {
            features: FeatureRegistry::new(),
            phases: PhaseRegistry::new(),
            dispatcher,
            bus,
            users,
            clock,
        })
    }

    /// In-memory manager: local bus, empty user directory, wall clock.
    #[must_use]
    pub fn local() -> Rc<Self> {
        Self::builder().build()
    }

    #[must_use]
    pub fn builder() -> GameManagerBuilder {
        GameManagerBuilder::default()
    }

    #[must_use]
    pub fn features(&self) -> &FeatureRegistry {
        &self.features
    }

    #[must_use]
    pub fn phases(&self) -> &PhaseRegistry {
        &self.phases
    }

    #[must_use]
    pub fn dispatcher(&self) -> &Rc<EventDispatcher> {
        &self.dispatcher
    }

    #[must_use]
    pub fn bus(&self) -> &Rc<dyn HostEventBus> {
        &self.bus
    }

    #[must_use]
    pub fn users(&self) -> &Rc<dyn UserDirectory> {
        &self.users
    }

    #[must_use]
    pub fn clock(&self) -> &Rc<dyn Clock> {
        &self.clock
    }

    /// Configure a game mode.
    pub fn create_game(self: &Rc<Self>, definition: GameDefinition, config: GameConfig) -> Rc<Game> {
        let game = Game::new(Rc::clone(self), definition, config);
        info!(game = %game.id(), name = %game.definition().name(), "game created");
        game
    }
}

impl std::fmt::Debug for GameManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GameManager")
            .field("features", &self.features)
            .field("phases", &self.phases)
            .finish_non_exhaustive()
    }
}

/// Builder for [`GameManager`]. Missing collaborators get in-memory
/// defaults.
#[derive(Default)]
pub struct GameManagerBuilder {
    bus: Option<Rc<dyn HostEventBus>>,
    users: Option<Rc<dyn UserDirectory>>,
    clock: Option<Rc<dyn Clock>>,
}

impl GameManagerBuilder {
    #[must_use]
    pub fn with_bus(mut self, bus: Rc<dyn HostEventBus>) -> Self {
        self.bus = Some(bus);
        self
    }

    #[must_use]
    pub fn with_users(mut self, users: Rc<dyn UserDirectory>) -> Self {
        self.users = Some(users);
        self
    }

    #[must_use]
    pub fn with_clock(mut self, clock: Rc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    #[must_use]
    pub fn build(self) -> Rc<GameManager> {
        GameManager::new(
            self.bus.unwrap_or_else(|| Rc::new(LocalEventBus::new())),
            self.users
                .unwrap_or_else(|| Rc::new(InMemoryUserDirectory::new())),
            self.clock.unwrap_or_else(|| Rc::new(SystemClock)),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_manager_is_empty() {
        let manager = GameManager::local();
        assert!(manager.features().is_empty());
        assert!(manager.phases().is_empty());
        assert!(manager.dispatcher().forwarded_kinds().is_empty());
    }

    #[test]
    fn test_registries_are_per_manager() {
        let a = GameManager::local();
        let b = GameManager::local();
        a.phases()
            .register_behavior("lobby", |_ctx| {
                Err(crate::core::ConstructionError::new("unused"))
            })
            .unwrap();
        assert!(a.phases().contains("lobby"));
        assert!(!b.phases().contains("lobby"));
    }
}
