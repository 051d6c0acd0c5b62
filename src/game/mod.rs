//! Game definitions, games and the game manager.

pub mod definition;
#[allow(clippy::module_inception)]
pub mod game;
pub mod manager;

pub use definition::{FeatureCustomizer, FeatureDeclaration, GameDefinition, PhaseCustomizer, PhaseDeclaration};
pub use game::Game;
pub use manager::{GameManager, GameManagerBuilder};
