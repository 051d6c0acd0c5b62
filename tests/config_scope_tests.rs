//! Scope-aware configuration binding tests.
//!
//! These tests verify:
//! - Phase-scoped values win over session-scoped ones for phase features
//! - Instances in different scopes bind independently
//! - Bindings are cached per scope, and only on success
//! - Lookup never falls back from a phase section to the session section

mod common;

use common::{Harness, Intro, MaxHealth};
use rust_gamelib::config::{ConfigOption, Configurable, OptionKind, OptionValue};
use rust_gamelib::core::{
    BindingError, ConstructionError, GameError, GameObjectContext,
};
use rust_gamelib::features::Feature;
use rust_gamelib::game::GameDefinition;

const PRECEDENCE_CONFIG: &str = r"
features:
  max-health:
    max_health: 5
phases:
  intro:
    features:
      max-health:
        max_health: 10
";

/// A phase-scoped value beats the session-scoped value.
#[test]
fn test_phase_value_takes_precedence() {
    let harness = Harness::new();
    let game = harness.game(
        GameDefinition::new("Precedence").with_phase_type::<Intro>(),
        PRECEDENCE_CONFIG,
    );

    let session = game.create_session().unwrap();
    let intro = session.phase_by_tag("intro").expect("intro phase");
    let feature = intro.feature::<MaxHealth>().expect("max-health attached");

    assert_eq!(feature.max_health, 10);
}

/// Game-level features read the session section.
#[test]
fn test_session_feature_reads_session_section() {
    let harness = Harness::new();
    let game = harness.game(
        GameDefinition::new("Precedence")
            .with_phase_type::<Intro>()
            .with_feature_type::<MaxHealth>(),
        PRECEDENCE_CONFIG,
    );

    let session = game.create_session().unwrap();
    assert_eq!(session.feature::<MaxHealth>().unwrap().max_health, 5);
    let intro = session.phase_by_tag("intro").unwrap();
    assert_eq!(intro.feature::<MaxHealth>().unwrap().max_health, 10);
}

/// A phase without its own value gets the default, not the session value.
#[test]
fn test_no_fallback_to_session_section() {
    let harness = Harness::new();
    let game = harness.game(
        GameDefinition::new("Strict").with_phase_type::<Intro>(),
        "features:\n  max-health:\n    max_health: 5\n",
    );

    let session = game.create_session().unwrap();
    let intro = session.phase_by_tag("intro").unwrap();
    assert_eq!(intro.feature::<MaxHealth>().unwrap().max_health, 20);
}

/// Two scopes with different overrides do not leak into each other.
#[test]
fn test_scope_isolation() {
    let harness = Harness::new();
    let red = harness.game(
        GameDefinition::new("Red"),
        "features:\n  max-health:\n    max_health: 7\n",
    );
    let blue = harness.game(
        GameDefinition::new("Blue"),
        "features:\n  max-health:\n    max_health: 9\n",
    );
    let red_session = red.new_session();
    let blue_session = blue.new_session();
    let registry = harness.manager.features();

    let a = registry.create("max-health", &red_session.scope()).unwrap();
    let b = registry.create("max-health", &blue_session.scope()).unwrap();
    let again = registry.create("max-health", &red_session.scope()).unwrap();

    assert_eq!(a.downcast_ref::<MaxHealth>().unwrap().max_health, 7);
    assert_eq!(b.downcast_ref::<MaxHealth>().unwrap().max_health, 9);
    assert_eq!(again.downcast_ref::<MaxHealth>().unwrap().max_health, 7);
}

/// Each create builds an independent instance.
#[test]
fn test_instances_are_independent() {
    let harness = Harness::new();
    let game = harness.game(GameDefinition::new("Fresh"), "{}");
    let session = game.new_session();
    let registry = harness.manager.features();

    let mut first = registry.create("max-health", &session.scope()).unwrap();
    let second = registry.create("max-health", &session.scope()).unwrap();
    first.downcast_mut::<MaxHealth>().unwrap().max_health = 1;

    assert_ne!(first.id(), second.id());
    assert_eq!(second.downcast_ref::<MaxHealth>().unwrap().max_health, 20);
}

// ============================================================================
// Binding cache
// ============================================================================

struct Arena {
    ctx: GameObjectContext,
    radius: i64,
}

impl Configurable for Arena {
    fn options(&self) -> Vec<ConfigOption> {
        vec![ConfigOption::new("radius", OptionKind::Integer).required()]
    }

    fn set_option(&mut self, name: &str, value: &OptionValue) {
        if name == "radius" {
            self.radius = value.as_i64().unwrap_or_default();
        }
    }
}

impl Feature for Arena {
    fn context(&self) -> &GameObjectContext {
        &self.ctx
    }

    fn enable(&mut self) {}

    fn disable(&mut self) {}
}

fn register_arena(harness: &Harness) {
    harness
        .manager
        .features()
        .register("arena", |ctx: &GameObjectContext| {
            Ok(Box::new(Arena {
                ctx: ctx.clone(),
                radius: 0,
            }) as Box<dyn Feature>)
        })
        .unwrap();
}

/// A failed binding is not cached; fixing the config lets a retry succeed.
#[test]
fn test_binding_cached_only_on_success() {
    let harness = Harness::new();
    register_arena(&harness);
    let game = harness.game(GameDefinition::new("Arena"), "{}");
    let session = game.new_session();
    let scope = session.scope();
    let factory = harness.manager.features().get("arena").unwrap();

    let err = factory.create(&scope).err().expect("radius is required");
    assert!(matches!(
        err,
        GameError::Binding(BindingError::MissingOption { ref option, .. }) if option == "radius"
    ));
    assert!(factory.cached_binding(scope.id()).is_none());

    game.config().set("features/arena/radius", 12);
    let arena = factory.create(&scope).unwrap();
    assert_eq!(arena.downcast_ref::<Arena>().unwrap().radius, 12);
    assert!(factory.cached_binding(scope.id()).is_some());
}

/// Once bound, a scope keeps its values even if the config changes.
#[test]
fn test_binding_cached_per_scope() {
    let harness = Harness::new();
    register_arena(&harness);
    let game = harness.game(GameDefinition::new("Arena"), "features:\n  arena:\n    radius: 12\n");
    let first = game.new_session();
    let factory = harness.manager.features().get("arena").unwrap();

    factory.create(&first.scope()).unwrap();
    game.config().set("features/arena/radius", 30);

    let cached = factory.create(&first.scope()).unwrap();
    assert_eq!(cached.downcast_ref::<Arena>().unwrap().radius, 12);

    let second = game.new_session();
    let fresh = factory.create(&second.scope()).unwrap();
    assert_eq!(fresh.downcast_ref::<Arena>().unwrap().radius, 30);

    factory.forget_scope(first.id());
    let rebound = factory.create(&first.scope()).unwrap();
    assert_eq!(rebound.downcast_ref::<Arena>().unwrap().radius, 30);
}

/// A value of the wrong type is reported with its section.
#[test]
fn test_invalid_value_reports_section() {
    let harness = Harness::new();
    register_arena(&harness);
    let game = harness.game(GameDefinition::new("Arena"), "features:\n  arena:\n    radius: huge\n");
    let session = game.new_session();

    let err = harness
        .manager
        .features()
        .create("arena", &session.scope())
        .err()
        .unwrap();
    match err {
        GameError::Binding(BindingError::InvalidValue { section, option, .. }) => {
            assert_eq!(section, "features/arena");
            assert_eq!(option, "radius");
        }
        other => panic!("unexpected error: {other}"),
    }
}

/// A failing feature is left out of its phase; the phase still builds.
#[test]
fn test_misconfigured_feature_is_skipped() {
    let harness = Harness::new();
    register_arena(&harness);
    harness
        .manager
        .phases()
        .register_behavior("arena-phase", |_ctx: &GameObjectContext| {
            Ok(Box::new(ArenaPhase) as Box<dyn rust_gamelib::phases::PhaseBehavior>)
        })
        .unwrap();
    let game = harness.game(GameDefinition::new("Arena").with_phase("arena-phase"), "{}");

    let session = game.create_session().unwrap();
    let phase = session.phase(0).unwrap();
    assert!(phase.features().contains("max-health"));
    assert!(!phase.features().contains("arena"));
    assert!(!phase.features().contains("missing"));
}

struct ArenaPhase;

impl Configurable for ArenaPhase {}

impl rust_gamelib::phases::PhaseBehavior for ArenaPhase {
    fn configure(&mut self, setup: &mut rust_gamelib::phases::PhaseSetup<'_>) {
        setup
            .add_feature("arena")
            .add_feature("missing")
            .add::<MaxHealth>();
    }
}

/// Construction errors from custom strategies surface as binding errors.
#[test]
fn test_custom_strategy_failure_keeps_tag() {
    let harness = Harness::new();
    harness
        .manager
        .features()
        .register("flaky", |_ctx: &GameObjectContext| {
            Err(ConstructionError::new("not today"))
        })
        .unwrap();
    let game = harness.game(GameDefinition::new("Flaky"), "{}");
    let session = game.new_session();

    let err = harness
        .manager
        .features()
        .create("flaky", &session.scope())
        .err()
        .unwrap();
    assert!(matches!(err, GameError::Binding(BindingError::Construction(_))));
    assert!(harness.manager.features().contains("flaky"));
}
