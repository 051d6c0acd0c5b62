//! Configuration bindings.
//!
//! A binding is the resolved list of option values for one scope. It is
//! computed the first time an object is created in that scope and cached by
//! the factory; every later instance in the same scope receives the same
//! values. Failed resolutions are never cached.

use tracing::trace;

use crate::config::option::{ConfigOption, Configurable, OptionValue};
use crate::config::section::ConfigSection;
use crate::core::BindingError;

/// Resolved option values for one scope.
#[derive(Clone, Debug, PartialEq)]
pub struct ConfigBinding {
    section: String,
    values: Vec<(String, OptionValue)>,
}

impl ConfigBinding {
    /// Resolve `options` against `section`.
    ///
    /// Unset options fall back to their default; unset options without a
    /// default are skipped unless required.
    pub fn resolve(section: &ConfigSection, options: &[ConfigOption]) -> Result<Self, BindingError> {
        let path = section.path();
        let mut values = Vec::with_capacity(options.len());

        for option in options {
            match section.get(&option.name) {
                Some(raw) if !raw.is_null() => {
                    let value = option.kind.parse(&raw).ok_or_else(|| BindingError::InvalidValue {
                        section: path.clone(),
                        option: option.name.clone(),
                        expected: option.kind.expected(),
                        found: render(&raw),
                    })?;
                    values.push((option.name.clone(), value));
                }
                _ => {
                    if let Some(default) = &option.default {
                        values.push((option.name.clone(), default.clone()));
                    } else if option.required {
                        return Err(BindingError::MissingOption {
                            section: path,
                            option: option.name.clone(),
                        });
                    }
                }
            }
        }

        trace!(section = %path, bound = values.len(), "resolved configuration binding");
        Ok(Self {
            section: path,
            values,
        })
    }

    /// Section path the binding was read from.
    #[must_use]
    pub fn section(&self) -> &str {
        &self.section
    }

    /// Resolved value of an option.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&OptionValue> {
        self.values
            .iter()
            .find(|(option, _)| option == name)
            .map(|(_, value)| value)
    }

    /// All resolved values, in declaration order.
    pub fn values(&self) -> impl Iterator<Item = (&str, &OptionValue)> {
        self.values.iter().map(|(name, value)| (name.as_str(), value))
    }

    /// Number of resolved values.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if nothing was resolved.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Hand every resolved value to `target`.
    pub fn apply_to<T: Configurable + ?Sized>(&self, target: &mut T) {
        for (name, value) in &self.values {
            target.set_option(name, value);
        }
    }
}

fn render(value: &serde_yaml::Value) -> String {
    serde_yaml::to_string(value)
        .map(|text| text.trim_end().to_string())
        .unwrap_or_else(|_| crate::config::section::describe(value).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{GameConfig, OptionKind};

    #[derive(Default)]
    struct Health {
        max_health: i64,
        regen: bool,
    }

    impl Configurable for Health {
        fn options(&self) -> Vec<ConfigOption> {
            vec![
                ConfigOption::new("max_health", OptionKind::Integer).required(),
                ConfigOption::new("regen", OptionKind::Bool).with_default(true),
                ConfigOption::new("label", OptionKind::Text),
            ]
        }

        fn set_option(&mut self, name: &str, value: &OptionValue) {
            match name {
                "max_health" => self.max_health = value.as_i64().unwrap_or_default(),
                "regen" => self.regen = value.as_bool().unwrap_or_default(),
                _ => {}
            }
        }
    }

    #[test]
    fn test_resolve_and_apply() {
        let config = GameConfig::new();
        config.set("features/health/max_health", 10);
        let section = config.feature_section(&[], "health");

        let mut health = Health::default();
        let binding = ConfigBinding::resolve(&section, &health.options()).unwrap();
        assert_eq!(binding.section(), "features/health");
        assert_eq!(binding.len(), 2);
        assert_eq!(binding.get("label"), None);

        binding.apply_to(&mut health);
        assert_eq!(health.max_health, 10);
        assert!(health.regen);
    }

    #[test]
    fn test_missing_required_option() {
        let config = GameConfig::new();
        let section = config.feature_section(&[], "health");
        let err = ConfigBinding::resolve(&section, &Health::default().options()).unwrap_err();
        assert!(matches!(
            err,
            BindingError::MissingOption { ref option, .. } if option == "max_health"
        ));
    }

    #[test]
    fn test_invalid_value() {
        let config = GameConfig::new();
        config.set("features/health/max_health", "lots");
        let section = config.feature_section(&[], "health");
        let err = ConfigBinding::resolve(&section, &Health::default().options()).unwrap_err();
        match err {
            BindingError::InvalidValue {
                section,
                expected,
                found,
                ..
            } => {
                assert_eq!(section, "features/health");
                assert_eq!(expected, "an integer");
                assert_eq!(found, "lots");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_phase_section_does_not_fall_back() {
        let config = GameConfig::new();
        config.set("features/health/max_health", 5);
        let section = config.feature_section(&["phases".into(), "intro".into()], "health");
        assert!(ConfigBinding::resolve(&section, &Health::default().options()).is_err());
    }
}
