//! The phase state machine.
//!
//! ```text
//! Created -> Configuring -> Initialized -> Active -> Ended
//! ```
//!
//! - `initialize` runs the behavior's `configure` once and applies the
//!   configured `duration` option.
//! - `start` enables the features, registers listenable ones with the
//!   dispatcher and calls `on_start`.
//! - `end` calls `on_end`, then unregisters and disables the features.
//!
//! Phase duration is advisory. Nothing in the phase ends it automatically;
//! the host polls [`Phase::remaining_duration`] and calls `end`.

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::{ConfigOption, Configurable, OptionKind, OptionValue};
use crate::core::{
    parse_iso_duration, BindingError, GameObjectContext, LifecycleError, ObjectId, Scope,
};
use crate::features::{Feature, FeatureSet};

use super::behavior::{PhaseBehavior, PhaseSetup};

/// Name of the declarative duration option.
pub const DURATION_OPTION: &str = "duration";

/// Lifecycle state of a phase.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PhaseState {
    /// Built, `configure` not run yet.
    Created,
    /// Inside `configure`.
    Configuring,
    /// Features attached, ready to start.
    Initialized,
    /// Started; features enabled.
    Active,
    /// Ended; timing is frozen.
    Ended,
}

impl std::fmt::Display for PhaseState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Created => "created",
            Self::Configuring => "configuring",
            Self::Initialized => "initialized",
            Self::Active => "active",
            Self::Ended => "ended",
        };
        f.write_str(name)
    }
}

/// A time-boxed stage of a session.
pub struct Phase {
    ctx: GameObjectContext,
    tag: String,
    behavior: Box<dyn PhaseBehavior>,
    state: PhaseState,
    duration_option: Option<String>,
    configured_duration: TimeDelta,
    started_at: Option<DateTime<Utc>>,
    ended_at: Option<DateTime<Utc>>,
    features: FeatureSet,
}

impl Phase {
    /// Wrap a behavior. `ctx` must carry the phase's own scope.
    pub fn new(
        ctx: GameObjectContext,
        tag: impl Into<String>,
        behavior: Box<dyn PhaseBehavior>,
    ) -> Self {
        Self {
            ctx,
            tag: tag.into(),
            behavior,
            state: PhaseState::Created,
            duration_option: None,
            configured_duration: TimeDelta::zero(),
            started_at: None,
            ended_at: None,
            features: FeatureSet::new(),
        }
    }

    /// Configure the phase once.
    ///
    /// Calls the behavior's `configure`, then applies the `duration`
    /// option. A malformed duration is reported while the phase stays
    /// initialized with its default duration. Later calls do nothing.
    pub fn initialize(&mut self) -> Result<(), BindingError> {
        if self.state != PhaseState::Created {
            return Ok(());
        }

        self.state = PhaseState::Configuring;
        {
            let mut setup =
                PhaseSetup::new(&self.ctx, &mut self.features, &mut self.configured_duration);
            self.behavior.configure(&mut setup);
        }
        self.state = PhaseState::Initialized;
        debug!(phase = %self.tag, features = self.features.len(), "phase configured");

        match self.duration_option.clone() {
            Some(text) => self.apply_duration(&text),
            None => Ok(()),
        }
    }

    /// Parse `text` and use it as the configured duration.
    ///
    /// Blank text, zero and negative durations keep the current value.
    pub fn apply_duration(&mut self, text: &str) -> Result<(), BindingError> {
        if let Some(duration) = parse_iso_duration(text)? {
            if duration > TimeDelta::zero() {
                self.configured_duration = duration;
            }
        }
        Ok(())
    }

    /// Start the phase.
    pub fn start(&mut self) -> Result<(), LifecycleError> {
        match self.state {
            PhaseState::Initialized => {}
            PhaseState::Created | PhaseState::Configuring => {
                return Err(LifecycleError::NotInitialized {
                    object: self.describe(),
                })
            }
            PhaseState::Active | PhaseState::Ended => {
                return Err(self.invalid_transition("start"));
            }
        }

        self.started_at = Some(self.ctx.clock().now());
        self.state = PhaseState::Active;

        self.features.activate();
        if let Some(listenable) = self.behavior.as_listenable() {
            self.ctx
                .manager()
                .dispatcher()
                .register_events(self.ctx.id(), listenable, self.ctx.scope());
        }
        self.behavior.on_start(&self.ctx);

        info!(phase = %self.tag, id = %self.ctx.id(), "phase started");
        Ok(())
    }

    /// End the phase.
    pub fn end(&mut self) -> Result<(), LifecycleError> {
        if self.state != PhaseState::Active {
            return Err(self.invalid_transition("end"));
        }

        self.ended_at = Some(self.ctx.clock().now());
        self.state = PhaseState::Ended;

        self.behavior.on_end(&self.ctx);
        self.features.deactivate();
        if self.behavior.as_listenable().is_some() {
            self.ctx
                .manager()
                .dispatcher()
                .unregister(self.ctx.id(), self.ctx.scope());
        }
        self.ctx.session().remove_listeners(self.ctx.id());

        info!(phase = %self.tag, id = %self.ctx.id(), elapsed = %self.duration(), "phase ended");
        Ok(())
    }

    /// Elapsed time: zero before start, running while active, frozen
    /// once ended.
    #[must_use]
    pub fn duration(&self) -> TimeDelta {
        match (self.started_at, self.ended_at) {
            (None, _) => TimeDelta::zero(),
            (Some(start), None) => self.ctx.clock().now() - start,
            (Some(start), Some(end)) => end - start,
        }
    }

    /// Configured duration minus elapsed time. May be negative.
    #[must_use]
    pub fn remaining_duration(&self) -> TimeDelta {
        self.configured_duration - self.duration()
    }

    /// The configured duration; zero means the phase ends manually.
    #[must_use]
    pub fn configured_duration(&self) -> TimeDelta {
        self.configured_duration
    }

    /// Override the configured duration.
    pub fn set_configured_duration(&mut self, duration: TimeDelta) {
        self.configured_duration = duration;
    }

    /// Phase id, also the id of its scope.
    #[must_use]
    pub fn id(&self) -> ObjectId {
        self.ctx.id()
    }

    /// The registered tag this phase was created from.
    #[must_use]
    pub fn tag(&self) -> &str {
        &self.tag
    }

    #[must_use]
    pub fn context(&self) -> &GameObjectContext {
        &self.ctx
    }

    /// The scope features of this phase live in.
    #[must_use]
    pub fn as_scope(&self) -> &Scope {
        self.ctx.scope()
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> PhaseState {
        self.state
    }

    #[must_use]
    pub fn is_initialized(&self) -> bool {
        !matches!(self.state, PhaseState::Created | PhaseState::Configuring)
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.state == PhaseState::Active
    }

    #[must_use]
    pub fn has_ended(&self) -> bool {
        self.state == PhaseState::Ended
    }

    #[must_use]
    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    #[must_use]
    pub fn ended_at(&self) -> Option<DateTime<Utc>> {
        self.ended_at
    }

    /// The configured `duration` option text, if any.
    #[must_use]
    pub fn duration_option(&self) -> Option<&str> {
        self.duration_option.as_deref()
    }

    /// Attached features.
    #[must_use]
    pub fn features(&self) -> &FeatureSet {
        &self.features
    }

    /// The first feature of type `F`.
    #[must_use]
    pub fn feature<F: Feature>(&self) -> Option<&F> {
        self.features.get_as::<F>()
    }

    /// The first feature of type `F`.
    pub fn feature_mut<F: Feature>(&mut self) -> Option<&mut F> {
        self.features.get_as_mut::<F>()
    }

    /// The feature attached as `tag`.
    #[must_use]
    pub fn feature_by_tag(&self, tag: &str) -> Option<&dyn Feature> {
        self.features.get(tag)
    }

    /// The behavior as its concrete type.
    #[must_use]
    pub fn behavior<P: PhaseBehavior>(&self) -> Option<&P> {
        self.behavior.downcast_ref::<P>()
    }

    /// The behavior as its concrete type.
    pub fn behavior_mut<P: PhaseBehavior>(&mut self) -> Option<&mut P> {
        self.behavior.downcast_mut::<P>()
    }

    fn describe(&self) -> String {
        format!("phase '{}'", self.tag)
    }

    fn invalid_transition(&self, action: &'static str) -> LifecycleError {
        LifecycleError::InvalidTransition {
            object: self.describe(),
            action,
            state: self.state.to_string(),
        }
    }
}

impl Configurable for Phase {
    fn options(&self) -> Vec<ConfigOption> {
        let mut options = vec![ConfigOption::new(DURATION_OPTION, OptionKind::Text).describe(
            "Duration of the phase in ISO-8601 format, e.g. P1DT2H3M4.5S. \
             Zero or empty ends the phase manually.",
        )];
        options.extend(self.behavior.options());
        options
    }

    fn set_option(&mut self, name: &str, value: &OptionValue) {
        if name == DURATION_OPTION {
            self.duration_option = value.as_str().map(str::to_string);
        } else {
            self.behavior.set_option(name, value);
        }
    }
}

impl std::fmt::Debug for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Phase")
            .field("id", &self.ctx.id())
            .field("tag", &self.tag)
            .field("state", &self.state)
            .field("configured_duration", &self.configured_duration)
            .field("features", &self.features)
            .finish()
    }
}
