//! Fixtures shared by the integration suites.
//!
//! - `MaxHealth`: a feature with one integer option
//! - `Recorder`: a listenable feature writing its lifecycle to a log
//! - `Intro` / `Lobby`: phase behaviors attaching those features
//! - `Harness`: a manager on an in-memory bus, directory and manual clock

#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;

use chrono::TimeDelta;
use rust_gamelib::config::{ConfigOption, Configurable, GameConfig, OptionKind, OptionValue};
use rust_gamelib::core::{
    ConstructionError, GameObjectContext, InMemoryUserDirectory, ManualClock, Player, PlayerId,
    User,
};
use rust_gamelib::events::{
    Event, EventKind, FilterTag, Listenable, LocalEventBus, Subscription,
};
use rust_gamelib::features::{Feature, FeatureType};
use rust_gamelib::game::{Game, GameDefinition, GameManager};
use rust_gamelib::phases::{PhaseBehavior, PhaseSetup, PhaseType};

pub type Log = Rc<RefCell<Vec<String>>>;

pub fn new_log() -> Log {
    Rc::new(RefCell::new(Vec::new()))
}

pub fn entries(log: &Log) -> Vec<String> {
    log.borrow().clone()
}

pub const ENTITY_DAMAGE: EventKind = EventKind::new("host:entity-damage");
pub const PLAYER_DAMAGE: EventKind = EventKind::new("host:player-damage");
pub const PLAYER_DAMAGE_LINEAGE: &[EventKind] = &[ENTITY_DAMAGE];

// ============================================================================
// Features
// ============================================================================

pub struct MaxHealth {
    ctx: GameObjectContext,
    pub max_health: i64,
    pub enabled: bool,
}

impl Configurable for MaxHealth {
    fn options(&self) -> Vec<ConfigOption> {
        vec![ConfigOption::new("max_health", OptionKind::Integer).with_default(20i64)]
    }

    fn set_option(&mut self, name: &str, value: &OptionValue) {
        if name == "max_health" {
            if let Some(max_health) = value.as_i64() {
                self.max_health = max_health;
            }
        }
    }
}

impl Feature for MaxHealth {
    fn context(&self) -> &GameObjectContext {
        &self.ctx
    }

    fn enable(&mut self) {
        self.enabled = true;
    }

    fn disable(&mut self) {
        self.enabled = false;
    }
}

impl FeatureType for MaxHealth {
    const TAG: &'static str = "max-health";

    fn construct(ctx: &GameObjectContext) -> Result<Self, ConstructionError> {
        Ok(Self {
            ctx: ctx.clone(),
            max_health: 0,
            enabled: false,
        })
    }
}

/// Writes `load`, `enable`, `disable`, membership changes and damage events
/// to its log.
pub struct Recorder {
    ctx: GameObjectContext,
    pub log: Log,
}

impl Recorder {
    fn push(&self, entry: String) {
        self.log.borrow_mut().push(entry);
    }
}

impl Configurable for Recorder {}

impl Feature for Recorder {
    fn context(&self) -> &GameObjectContext {
        &self.ctx
    }

    fn load(&mut self) {
        self.push("load".to_string());
    }

    fn enable(&mut self) {
        self.push("enable".to_string());
        let log = Rc::clone(&self.log);
        self.ctx
            .on_join(move |user: &User| log.borrow_mut().push(format!("join:{}", user.name)));
        let log = Rc::clone(&self.log);
        self.ctx
            .on_quit(move |user: &User| log.borrow_mut().push(format!("quit:{}", user.name)));
    }

    fn disable(&mut self) {
        self.push("disable".to_string());
    }

    fn as_listenable(&self) -> Option<&dyn Listenable> {
        Some(self)
    }
}

impl Listenable for Recorder {
    fn subscriptions(&self) -> Vec<Subscription> {
        let log = Rc::clone(&self.log);
        vec![Subscription::on_with_actor(ENTITY_DAMAGE, move |_event, actor| {
            let name = actor.map_or("-", |user| user.name.as_str());
            log.borrow_mut().push(format!("damage:{name}"));
            Ok(())
        })
        .with_filters([FilterTag::PlayersOrAnonymous])
        .named("recorder-damage")]
    }
}

impl FeatureType for Recorder {
    const TAG: &'static str = "recorder";

    fn construct(ctx: &GameObjectContext) -> Result<Self, ConstructionError> {
        Ok(Self {
            ctx: ctx.clone(),
            log: new_log(),
        })
    }
}

// ============================================================================
// Phases
// ============================================================================

/// Five minutes by default, attaches `MaxHealth`.
pub struct Intro {
    pub configured: usize,
    pub log: Log,
}

impl Configurable for Intro {}

impl PhaseBehavior for Intro {
    fn configure(&mut self, setup: &mut PhaseSetup<'_>) {
        self.configured += 1;
        setup.set_duration(TimeDelta::minutes(5)).add::<MaxHealth>();
    }

    fn on_start(&mut self, _ctx: &GameObjectContext) {
        self.log.borrow_mut().push("intro:start".to_string());
    }

    fn on_end(&mut self, _ctx: &GameObjectContext) {
        self.log.borrow_mut().push("intro:end".to_string());
    }
}

impl PhaseType for Intro {
    const TAG: &'static str = "intro";

    fn construct(_ctx: &GameObjectContext) -> Result<Self, ConstructionError> {
        Ok(Self {
            configured: 0,
            log: new_log(),
        })
    }
}

/// Attaches a `Recorder` sharing the lobby's log.
pub struct Lobby {
    pub log: Log,
}

impl Configurable for Lobby {}

impl PhaseBehavior for Lobby {
    fn configure(&mut self, setup: &mut PhaseSetup<'_>) {
        let log = Rc::clone(&self.log);
        setup.add_with::<Recorder>(move |recorder| recorder.log = log);
    }

    fn on_start(&mut self, _ctx: &GameObjectContext) {
        self.log.borrow_mut().push("lobby:start".to_string());
    }

    fn on_end(&mut self, _ctx: &GameObjectContext) {
        self.log.borrow_mut().push("lobby:end".to_string());
    }
}

impl PhaseType for Lobby {
    const TAG: &'static str = "lobby";

    fn construct(_ctx: &GameObjectContext) -> Result<Self, ConstructionError> {
        Ok(Self { log: new_log() })
    }
}

// ============================================================================
// Harness
// ============================================================================

pub struct Harness {
    pub manager: Rc<GameManager>,
    pub clock: Rc<ManualClock>,
    pub users: Rc<InMemoryUserDirectory>,
    pub bus: Rc<LocalEventBus>,
}

impl Harness {
    /// A manager with every fixture registered.
    pub fn new() -> Self {
        let clock = Rc::new(ManualClock::new());
        let users = Rc::new(InMemoryUserDirectory::new());
        let bus = Rc::new(LocalEventBus::new());
        let manager = GameManager::builder()
            .with_bus(bus.clone())
            .with_users(users.clone())
            .with_clock(clock.clone())
            .build();

        manager.features().register_type::<MaxHealth>().unwrap();
        manager.features().register_type::<Recorder>().unwrap();
        manager.phases().register_type::<Intro>().unwrap();
        manager.phases().register_type::<Lobby>().unwrap();

        Self {
            manager,
            clock,
            users,
            bus,
        }
    }

    pub fn game(&self, definition: GameDefinition, yaml: &str) -> Rc<Game> {
        let config = GameConfig::from_yaml_str(yaml).unwrap();
        self.manager.create_game(definition, config)
    }

    /// A user with a player handle, known to the user directory.
    pub fn online_user(&self, name: &str) -> User {
        let player = Player::new(PlayerId::random(), name);
        self.users.insert(User::from_player(player))
    }

    pub fn post(&self, event: &dyn Event) {
        use rust_gamelib::events::HostEventBus;
        self.bus.post(event);
    }
}
