//! Phase behaviors.
//!
//! A [`Phase`](super::Phase) is driven by the framework; what happens in it
//! is decided by its behavior. The behavior attaches features and sets the
//! default duration in `configure`, and may hook the start and end of the
//! phase.

use chrono::TimeDelta;

use crate::config::Configurable;
use crate::core::{AsAny, ConstructionError, GameObjectContext, ObjectId};
use crate::events::Listenable;
use crate::features::{Feature, FeatureSet, FeatureType};

/// What a phase does.
pub trait PhaseBehavior: Configurable + AsAny {
    /// Attach features and adjust the default duration. Runs once.
    fn configure(&mut self, setup: &mut PhaseSetup<'_>);

    /// Runs after every feature of the phase has been enabled.
    fn on_start(&mut self, ctx: &GameObjectContext) {
        let _ = ctx;
    }

    /// Runs before the features of the phase are disabled.
    fn on_end(&mut self, ctx: &GameObjectContext) {
        let _ = ctx;
    }

    /// Event subscriptions of the phase itself.
    fn as_listenable(&self) -> Option<&dyn Listenable> {
        None
    }
}

/// A phase behavior registered by convention under a static tag.
pub trait PhaseType: PhaseBehavior + Sized + 'static {
    /// Registry tag, also the configuration key below `phases/`.
    const TAG: &'static str;

    /// Build a bare behavior. Configuration is applied afterwards.
    fn construct(ctx: &GameObjectContext) -> Result<Self, ConstructionError>;
}

impl<'a> dyn PhaseBehavior + 'a {
    /// Downcast to a concrete behavior.
    #[must_use]
    pub fn downcast_ref<P: PhaseBehavior>(&self) -> Option<&P> {
        self.as_any().downcast_ref::<P>()
    }

    /// Downcast to a concrete behavior.
    pub fn downcast_mut<P: PhaseBehavior>(&mut self) -> Option<&mut P> {
        self.as_any_mut().downcast_mut::<P>()
    }
}

/// Handed to [`PhaseBehavior::configure`].
///
/// ```ignore
/// fn configure(&mut self, setup: &mut PhaseSetup<'_>) {
///     setup
///         .set_duration(TimeDelta::minutes(5))
///         .add::<MaxHealth>()
///         .add_feature("no-pvp");
/// }
/// ```
pub struct PhaseSetup<'a> {
    ctx: &'a GameObjectContext,
    features: &'a mut FeatureSet,
    duration: &'a mut TimeDelta,
}

impl<'a> PhaseSetup<'a> {
    pub(crate) fn new(
        ctx: &'a GameObjectContext,
        features: &'a mut FeatureSet,
        duration: &'a mut TimeDelta,
    ) -> Self {
        Self {
            ctx,
            features,
            duration,
        }
    }

    /// The phase's context.
    #[must_use]
    pub fn context(&self) -> &GameObjectContext {
        self.ctx
    }

    /// Attach the feature registered as `tag`.
    pub fn add_feature(&mut self, tag: &str) -> &mut Self {
        self.add_feature_with(tag, |_| {})
    }

    /// Attach the feature registered as `tag` and customize it.
    pub fn add_feature_with(
        &mut self,
        tag: &str,
        customize: impl FnOnce(&mut dyn Feature),
    ) -> &mut Self {
        self.features.attach(self.ctx.scope(), tag, customize);
        self
    }

    /// Attach a feature type.
    pub fn add<F: FeatureType>(&mut self) -> &mut Self {
        self.add_feature(F::TAG)
    }

    /// Attach a feature type and customize it.
    pub fn add_with<F: FeatureType>(&mut self, customize: impl FnOnce(&mut F)) -> &mut Self {
        self.add_feature_with(F::TAG, |feature| {
            if let Some(feature) = feature.downcast_mut::<F>() {
                customize(feature);
            }
        })
    }

    /// Set the default duration. Zero means the phase ends manually.
    pub fn set_duration(&mut self, duration: TimeDelta) -> &mut Self {
        *self.duration = duration;
        self
    }

    /// The current default duration.
    #[must_use]
    pub fn duration(&self) -> TimeDelta {
        *self.duration
    }

    /// Features attached so far.
    #[must_use]
    pub fn features(&self) -> &FeatureSet {
        self.features
    }

    /// Id of the feature attached as `tag`.
    #[must_use]
    pub fn feature_id(&self, tag: &str) -> Option<ObjectId> {
        self.features.get(tag).map(|feature| feature.id())
    }
}
