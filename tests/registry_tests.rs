//! Registry tests.
//!
//! These tests verify the single-registration discipline and the cleanup
//! of tags whose conventional constructor fails.

mod common;

use common::{Harness, MaxHealth};
use rust_gamelib::config::Configurable;
use rust_gamelib::core::{ConstructionError, GameError, GameObjectContext, RegistryError};
use rust_gamelib::features::{Feature, FeatureType};
use rust_gamelib::game::GameDefinition;
use rust_gamelib::registry::FeatureRegistry;

/// Registering a tag twice fails and keeps the first registration.
#[test]
fn test_registration_conflict() {
    let harness = Harness::new();
    let registry = harness.manager.features();
    let before = registry.get("max-health").unwrap();

    let err = registry.register_type::<MaxHealth>().err().unwrap();
    assert!(matches!(
        err,
        RegistryError::RegistrationConflict { kind: "feature", ref tag } if tag == "max-health"
    ));

    let after = registry.get("max-health").unwrap();
    assert!(std::rc::Rc::ptr_eq(&before, &after));
    assert!(after.is_conventional());
}

/// Phase and feature tags live in separate registries.
#[test]
fn test_registries_are_separate() {
    let harness = Harness::new();
    assert!(harness.manager.features().contains("max-health"));
    assert!(!harness.manager.phases().contains("max-health"));
    assert_eq!(harness.manager.phases().all_types(), vec!["intro", "lobby"]);
}

struct Broken {
    ctx: GameObjectContext,
}

impl Configurable for Broken {}

impl Feature for Broken {
    fn context(&self) -> &GameObjectContext {
        &self.ctx
    }

    fn enable(&mut self) {}

    fn disable(&mut self) {}
}

impl FeatureType for Broken {
    const TAG: &'static str = "broken";

    fn construct(_ctx: &GameObjectContext) -> Result<Self, ConstructionError> {
        Err(ConstructionError::new("no default constructor"))
    }
}

/// A failing conventional constructor unregisters its tag.
#[test]
fn test_constructor_failure_unregisters_tag() {
    let harness = Harness::new();
    let registry = harness.manager.features();
    registry.register_type::<Broken>().unwrap();
    let game = harness.game(GameDefinition::new("Broken"), "{}");
    let session = game.new_session();

    let err = registry.create("broken", &session.scope()).err().unwrap();
    match err {
        GameError::Registry(RegistryError::ConstructorResolutionFailure { tag, reason, .. }) => {
            assert_eq!(tag, "broken");
            assert_eq!(reason, "no default constructor");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(!registry.contains("broken"));

    let err = registry.create("broken", &session.scope()).err().unwrap();
    assert!(matches!(
        err,
        GameError::Registry(RegistryError::NotRegistered { .. })
    ));

    // The tag is free again.
    registry.register_type::<Broken>().unwrap();
    assert!(registry.contains("broken"));
}

/// A phase tag that is not registered aborts session initialization.
#[test]
fn test_unknown_phase_fails_initialization() {
    let harness = Harness::new();
    let game = harness.game(
        GameDefinition::new("Unknown")
            .with_phase("intro")
            .with_phase("finale"),
        "{}",
    );

    let err = game.create_session().err().unwrap();
    assert!(matches!(
        err,
        GameError::Registry(RegistryError::NotRegistered { kind: "phase", ref tag }) if tag == "finale"
    ));
}

#[test]
fn test_unregister_and_len() {
    let registry = FeatureRegistry::new();
    assert!(registry.is_empty());
    registry.register_type::<MaxHealth>().unwrap();
    registry.register_type::<Broken>().unwrap();
    assert_eq!(registry.len(), 2);
    assert_eq!(registry.all_types(), vec!["max-health", "broken"]);

    assert!(registry.unregister("max-health"));
    assert!(!registry.unregister("max-health"));
    assert_eq!(registry.all_types(), vec!["broken"]);
}
