//! Game definitions.
//!
//! A `GameDefinition` describes a game mode: its metadata, the ordered list
//! of phases every session plays through, and the game-level features that
//! stay enabled for the whole session. Phases and features are referenced by
//! registry tag; the definition itself never constructs anything.

use std::rc::Rc;

use crate::features::{Feature, FeatureType};
use crate::phases::{Phase, PhaseType};

/// Customizer applied to a freshly created phase.
pub type PhaseCustomizer = Rc<dyn Fn(&mut Phase)>;

/// Customizer applied to a freshly created feature.
pub type FeatureCustomizer = Rc<dyn Fn(&mut dyn Feature)>;

/// A phase of the game mode, by tag.
#[derive(Clone)]
pub struct PhaseDeclaration {
    tag: String,
    customizer: Option<PhaseCustomizer>,
}

impl PhaseDeclaration {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            customizer: None,
        }
    }

    #[must_use]
    pub fn with_customizer(mut self, customizer: impl Fn(&mut Phase) + 'static) -> Self {
        self.customizer = Some(Rc::new(customizer));
        self
    }

    #[must_use]
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Run the customizer, if any.
    pub fn customize(&self, phase: &mut Phase) {
        if let Some(customizer) = &self.customizer {
            customizer(phase);
        }
    }
}

impl std::fmt::Debug for PhaseDeclaration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PhaseDeclaration")
            .field("tag", &self.tag)
            .field("customized", &self.customizer.is_some())
            .finish()
    }
}

/// A game-level feature, by tag.
#[derive(Clone)]
pub struct FeatureDeclaration {
    tag: String,
    customizer: Option<FeatureCustomizer>,
}

impl FeatureDeclaration {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            customizer: None,
        }
    }

    #[must_use]
    pub fn with_customizer(mut self, customizer: impl Fn(&mut dyn Feature) + 'static) -> Self {
        self.customizer = Some(Rc::new(customizer));
        self
    }

    #[must_use]
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Run the customizer, if any.
    pub fn customize(&self, feature: &mut dyn Feature) {
        if let Some(customizer) = &self.customizer {
            customizer(feature);
        }
    }
}

impl std::fmt::Debug for FeatureDeclaration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FeatureDeclaration")
            .field("tag", &self.tag)
            .field("customized", &self.customizer.is_some())
            .finish()
    }
}

/// Blueprint of a game mode.
///
/// ```
/// use rust_gamelib::game::GameDefinition;
///
/// let definition = GameDefinition::new("Spleef")
///     .with_author("Alex")
///     .with_phase("lobby")
///     .with_phase("arena")
///     .with_feature("no-hunger");
///
/// assert_eq!(definition.description(), "N/A");
/// assert_eq!(definition.phase_tags(), vec!["lobby", "arena"]);
/// ```
#[derive(Clone, Debug)]
pub struct GameDefinition {
    name: String,
    description: String,
    author: String,
    phases: Vec<PhaseDeclaration>,
    features: Vec<FeatureDeclaration>,
}

impl GameDefinition {
    /// Create a definition with no phases.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: "N/A".to_string(),
            author: "N/A".to_string(),
            phases: Vec::new(),
            features: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    #[must_use]
    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = author.into();
        self
    }

    /// Append the phase registered as `tag`.
    #[must_use]
    pub fn with_phase(mut self, tag: impl Into<String>) -> Self {
        self.phases.push(PhaseDeclaration::new(tag));
        self
    }

    /// Append the phase registered as `tag` with a customizer.
    #[must_use]
    pub fn with_phase_customized(
        mut self,
        tag: impl Into<String>,
        customizer: impl Fn(&mut Phase) + 'static,
    ) -> Self {
        self.phases
            .push(PhaseDeclaration::new(tag).with_customizer(customizer));
        self
    }

    /// Append a phase type.
    #[must_use]
    pub fn with_phase_type<P: PhaseType>(self) -> Self {
        self.with_phase(P::TAG)
    }

    /// Append a phase type and customize its behavior.
    #[must_use]
    pub fn with_phase_configured<P: PhaseType>(
        self,
        customizer: impl Fn(&mut P) + 'static,
    ) -> Self {
        self.with_phase_customized(P::TAG, move |phase: &mut Phase| {
            if let Some(behavior) = phase.behavior_mut::<P>() {
                customizer(behavior);
            }
        })
    }

    /// Add a game-level feature registered as `tag`.
    #[must_use]
    pub fn with_feature(mut self, tag: impl Into<String>) -> Self {
        self.features.push(FeatureDeclaration::new(tag));
        self
    }

    /// Add a game-level feature type.
    #[must_use]
    pub fn with_feature_type<F: FeatureType>(self) -> Self {
        self.with_feature(F::TAG)
    }

    /// Add a game-level feature type and customize it.
    #[must_use]
    pub fn with_feature_configured<F: FeatureType>(
        mut self,
        customizer: impl Fn(&mut F) + 'static,
    ) -> Self {
        self.features.push(FeatureDeclaration::new(F::TAG).with_customizer(
            move |feature: &mut dyn Feature| {
                if let Some(feature) = feature.downcast_mut::<F>() {
                    customizer(feature);
                }
            },
        ));
        self
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    #[must_use]
    pub fn author(&self) -> &str {
        &self.author
    }

    /// Phase declarations in play order.
    #[must_use]
    pub fn phases(&self) -> &[PhaseDeclaration] {
        &self.phases
    }

    #[must_use]
    pub fn phase_tags(&self) -> Vec<&str> {
        self.phases.iter().map(PhaseDeclaration::tag).collect()
    }

    /// Game-level feature declarations.
    #[must_use]
    pub fn features(&self) -> &[FeatureDeclaration] {
        &self.features
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_order_is_kept() {
        let definition = GameDefinition::new("Test")
            .with_phase("b")
            .with_phase("a")
            .with_phase("b");
        assert_eq!(definition.phase_tags(), vec!["b", "a", "b"]);
    }

    #[test]
    fn test_metadata_defaults() {
        let definition = GameDefinition::new("Test").with_description("A test");
        assert_eq!(definition.name(), "Test");
        assert_eq!(definition.description(), "A test");
        assert_eq!(definition.author(), "N/A");
        assert!(definition.features().is_empty());
    }
}
