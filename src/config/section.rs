//! Game configuration tree.
//!
//! A `GameConfig` wraps a YAML mapping. Configuration for phases and
//! features is addressed by path:
//!
//! ```text
//! [phases/<phase-tag>/]features/<feature-tag>/<option-name>
//! phases/<phase-tag>/<option-name>
//! ```
//!
//! Sections are live views into the shared tree. Accessing a section that
//! does not exist creates it as an empty mapping; a missing section is never
//! an error.

use std::cell::RefCell;
use std::rc::Rc;

use serde_yaml::{Mapping, Value};
use tracing::warn;

use crate::core::ConfigError;

/// Separator used in configuration paths.
pub const PATH_SEPARATOR: char = '/';

/// The configuration of a game.
///
/// Cloning is cheap and yields another view onto the same tree.
///
/// ## Example
///
/// ```
/// use rust_gamelib::config::GameConfig;
///
/// let config = GameConfig::from_yaml_str(
///     "phases:\n  intro:\n    duration: PT10M\n",
/// ).unwrap();
///
/// let intro = config.phase_section("intro");
/// assert_eq!(intro.get("duration").unwrap().as_str(), Some("PT10M"));
/// ```
#[derive(Clone, Debug)]
pub struct GameConfig {
    root: Rc<RefCell<Value>>,
}

impl GameConfig {
    /// Create an empty configuration.
    #[must_use]
    pub fn new() -> Self {
        Self {
            root: Rc::new(RefCell::new(Value::Mapping(Mapping::new()))),
        }
    }

    /// Parse a configuration from YAML text.
    ///
    /// An empty document yields an empty configuration.
    pub fn from_yaml_str(text: &str) -> Result<Self, ConfigError> {
        let value: Value = serde_yaml::from_str(text)?;
        Self::from_value(value)
    }

    /// Wrap an already parsed YAML value. The root must be a mapping.
    pub fn from_value(value: Value) -> Result<Self, ConfigError> {
        let root = match value {
            Value::Null => Value::Mapping(Mapping::new()),
            Value::Mapping(_) => value,
            other => {
                return Err(ConfigError::NotAMapping {
                    found: describe(&other),
                })
            }
        };
        Ok(Self {
            root: Rc::new(RefCell::new(root)),
        })
    }

    /// Set a value at a `/`-separated path, creating intermediate sections.
    ///
    /// Scalars standing in the way of the path are replaced by sections.
    pub fn set(&self, path: &str, value: impl Into<Value>) {
        let mut segments = split_path(path);
        let Some(key) = segments.pop() else {
            return;
        };
        let mut root = self.root.borrow_mut();
        if let Some(mapping) = ensure_mapping(&mut root, &segments, true) {
            mapping.insert(Value::String(key), value.into());
        }
    }

    /// Read the value at a `/`-separated path.
    #[must_use]
    pub fn get(&self, path: &str) -> Option<Value> {
        let segments = split_path(path);
        lookup(&self.root.borrow(), &segments).cloned()
    }

    /// The section at `path`, created if absent.
    #[must_use]
    pub fn section(&self, path: &[String]) -> ConfigSection {
        {
            let mut root = self.root.borrow_mut();
            if ensure_mapping(&mut root, path, false).is_none() {
                warn!(
                    section = %path.join("/"),
                    "configuration path is blocked by a scalar value, treating section as empty"
                );
            }
        }
        ConfigSection {
            root: Rc::clone(&self.root),
            path: path.to_vec(),
        }
    }

    /// The root section.
    #[must_use]
    pub fn root(&self) -> ConfigSection {
        self.section(&[])
    }

    /// The section configuring a phase: `phases/<tag>`.
    #[must_use]
    pub fn phase_section(&self, tag: &str) -> ConfigSection {
        self.section(&["phases".to_string(), tag.to_string()])
    }

    /// The section configuring a feature below a scope path:
    /// `<scope-path>/features/<tag>`.
    #[must_use]
    pub fn feature_section(&self, scope_path: &[String], tag: &str) -> ConfigSection {
        let mut path = scope_path.to_vec();
        path.push("features".to_string());
        path.push(tag.to_string());
        self.section(&path)
    }

    /// Render the whole tree as YAML.
    pub fn to_yaml_string(&self) -> Result<String, ConfigError> {
        Ok(serde_yaml::to_string(&*self.root.borrow())?)
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// A live view onto one section of a [`GameConfig`].
#[derive(Clone, Debug)]
pub struct ConfigSection {
    root: Rc<RefCell<Value>>,
    path: Vec<String>,
}

impl ConfigSection {
    /// The `/`-separated path of this section.
    #[must_use]
    pub fn path(&self) -> String {
        self.path.join("/")
    }

    /// Path segments of this section.
    #[must_use]
    pub fn segments(&self) -> &[String] {
        &self.path
    }

    /// Read a direct child value.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<Value> {
        let root = self.root.borrow();
        lookup(&root, &self.path)
            .and_then(Value::as_mapping)
            .and_then(|mapping| mapping.get(key))
            .cloned()
    }

    /// Check whether a direct child exists.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Set a direct child value.
    pub fn set(&self, key: &str, value: impl Into<Value>) {
        let mut root = self.root.borrow_mut();
        if let Some(mapping) = ensure_mapping(&mut root, &self.path, true) {
            mapping.insert(Value::String(key.to_string()), value.into());
        }
    }

    /// Keys of the direct children, in document order.
    #[must_use]
    pub fn keys(&self) -> Vec<String> {
        let root = self.root.borrow();
        lookup(&root, &self.path)
            .and_then(Value::as_mapping)
            .map(|mapping| {
                mapping
                    .keys()
                    .filter_map(|key| key.as_str().map(str::to_string))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// A child section, created if absent.
    #[must_use]
    pub fn section(&self, key: &str) -> ConfigSection {
        let mut path = self.path.clone();
        path.push(key.to_string());
        {
            let mut root = self.root.borrow_mut();
            let _ = ensure_mapping(&mut root, &path, false);
        }
        ConfigSection {
            root: Rc::clone(&self.root),
            path,
        }
    }
}

fn split_path(path: &str) -> Vec<String> {
    path.split(PATH_SEPARATOR)
        .filter(|segment| !segment.is_empty())
        .map(str::to_string)
        .collect()
}

fn lookup<'a>(value: &'a Value, path: &[String]) -> Option<&'a Value> {
    path.iter().try_fold(value, |current, segment| {
        current.as_mapping().and_then(|mapping| mapping.get(segment.as_str()))
    })
}

/// Walk `path`, creating empty mappings for missing segments.
///
/// When `overwrite` is false, a scalar in the way aborts the walk.
fn ensure_mapping<'a>(
    value: &'a mut Value,
    path: &[String],
    overwrite: bool,
) -> Option<&'a mut Mapping> {
    let mut current = value;
    for segment in path {
        if !current.is_mapping() {
            if !overwrite && !current.is_null() {
                return None;
            }
            *current = Value::Mapping(Mapping::new());
        }
        let mapping = current.as_mapping_mut()?;
        if !mapping.contains_key(segment.as_str()) {
            mapping.insert(
                Value::String(segment.clone()),
                Value::Mapping(Mapping::new()),
            );
        }
        current = mapping.get_mut(segment.as_str())?;
    }
    if !current.is_mapping() {
        if !overwrite && !current.is_null() {
            return None;
        }
        *current = Value::Mapping(Mapping::new());
    }
    current.as_mapping_mut()
}

/// Short description of a YAML value kind, for error messages.
pub(crate) fn describe(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Sequence(_) => "a sequence",
        Value::Mapping(_) => "a mapping",
        Value::Tagged(_) => "a tagged value",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path(segments: &[&str]) -> Vec<String> {
        segments.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_set_and_get() {
        let config = GameConfig::new();
        config.set("phases/test/features/dummy/test", "foobar");
        assert_eq!(
            config.get("phases/test/features/dummy/test"),
            Some(Value::String("foobar".into()))
        );
        assert_eq!(config.get("phases/other"), None);
    }

    #[test]
    fn test_feature_section_inside_phase() {
        let config = GameConfig::new();
        config.set("phases/test/features/dummy/test", "foobar");

        let section = config.feature_section(&path(&["phases", "test"]), "dummy");
        assert_eq!(section.path(), "phases/test/features/dummy");
        assert_eq!(section.get("test").unwrap().as_str(), Some("foobar"));
    }

    #[test]
    fn test_feature_section_at_game_level() {
        let config = GameConfig::new();
        config.set("features/dummy/test", "foobar");

        let section = config.feature_section(&[], "dummy");
        assert_eq!(section.path(), "features/dummy");
        assert_eq!(section.get("test").unwrap().as_str(), Some("foobar"));
    }

    #[test]
    fn test_missing_sections_are_created() {
        let config = GameConfig::new();
        let section = config.feature_section(&path(&["phases", "lobby"]), "pvp");
        assert!(section.keys().is_empty());
        assert!(config.get("phases/lobby/features/pvp").unwrap().is_mapping());
    }

    #[test]
    fn test_sections_are_live_views() {
        let config = GameConfig::new();
        let section = config.phase_section("intro");
        config.set("phases/intro/duration", "PT1M");
        assert_eq!(section.get("duration").unwrap().as_str(), Some("PT1M"));

        section.set("duration", "PT2M");
        assert_eq!(
            config.get("phases/intro/duration").unwrap().as_str(),
            Some("PT2M")
        );
    }

    #[test]
    fn test_scalar_blocks_section_creation() {
        let config = GameConfig::new();
        config.set("phases", 5);
        let section = config.phase_section("intro");
        assert_eq!(section.get("duration"), None);
        assert_eq!(config.get("phases").unwrap().as_i64(), Some(5));
    }

    #[test]
    fn test_from_yaml() {
        let config = GameConfig::from_yaml_str(
            "features:\n  max-health:\n    max_health: 5\n",
        )
        .unwrap();
        let section = config.feature_section(&[], "max-health");
        assert_eq!(section.get("max_health").unwrap().as_i64(), Some(5));
        assert_eq!(section.keys(), vec!["max_health".to_string()]);
    }

    #[test]
    fn test_from_yaml_empty_document() {
        let config = GameConfig::from_yaml_str("").unwrap();
        assert!(config.root().keys().is_empty());
    }

    #[test]
    fn test_from_yaml_rejects_scalar_root() {
        let err = GameConfig::from_yaml_str("42").unwrap_err();
        assert!(matches!(err, ConfigError::NotAMapping { .. }));
    }

    #[test]
    fn test_from_yaml_rejects_garbage() {
        let err = GameConfig::from_yaml_str("a: [1, 2").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
