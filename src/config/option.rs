//! Declared configuration options.
//!
//! Features and phases declare the options they accept by implementing
//! [`Configurable`]. The factory resolves each declared option against the
//! configuration section of the object's scope and hands the converted
//! values back through [`Configurable::set_option`].

use serde::{Deserialize, Serialize};
use serde_yaml::Value;

/// Type of a configuration option.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OptionKind {
    /// `true` / `false`.
    Bool,
    /// Signed integer.
    Integer,
    /// Floating point number; integers are accepted.
    Float,
    /// Text; scalars of any type are accepted and rendered as text.
    Text,
}

impl OptionKind {
    /// Human readable name, used in error messages.
    #[must_use]
    pub const fn expected(self) -> &'static str {
        match self {
            Self::Bool => "a boolean",
            Self::Integer => "an integer",
            Self::Float => "a number",
            Self::Text => "a string",
        }
    }

    /// Convert a YAML value into an option value of this kind.
    #[must_use]
    pub fn parse(self, value: &Value) -> Option<OptionValue> {
        match (self, value) {
            (Self::Bool, Value::Bool(b)) => Some(OptionValue::Bool(*b)),
            (Self::Integer, Value::Number(n)) => n.as_i64().map(OptionValue::Integer),
            (Self::Float, Value::Number(n)) => n.as_f64().map(OptionValue::Float),
            (Self::Text, Value::String(s)) => Some(OptionValue::Text(s.clone())),
            (Self::Text, Value::Number(n)) => Some(OptionValue::Text(n.to_string())),
            (Self::Text, Value::Bool(b)) => Some(OptionValue::Text(b.to_string())),
            _ => None,
        }
    }
}

/// A resolved option value.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum OptionValue {
    /// Boolean value.
    Bool(bool),
    /// Integer value.
    Integer(i64),
    /// Floating point value.
    Float(f64),
    /// Text value.
    Text(String),
}

impl OptionValue {
    /// Kind of this value.
    #[must_use]
    pub const fn kind(&self) -> OptionKind {
        match self {
            Self::Bool(_) => OptionKind::Bool,
            Self::Integer(_) => OptionKind::Integer,
            Self::Float(_) => OptionKind::Float,
            Self::Text(_) => OptionKind::Text,
        }
    }

    /// The flag, if this is a boolean.
    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// The number, if this is an integer.
    #[must_use]
    pub const fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Integer(n) => Some(*n),
            _ => None,
        }
    }

    /// The number, if this is a float or an integer. Integers widen to floats.
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Float(n) => Some(*n),
            Self::Integer(n) => Some(*n as f64),
            _ => None,
        }
    }

    /// The text, if this is a text value.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl std::fmt::Display for OptionValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Integer(n) => write!(f, "{n}"),
            Self::Float(n) => write!(f, "{n}"),
            Self::Text(s) => write!(f, "{s}"),
        }
    }
}

impl From<bool> for OptionValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for OptionValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<f64> for OptionValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for OptionValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for OptionValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

/// A declared configuration option.
///
/// ```
/// use rust_gamelib::config::{ConfigOption, OptionKind};
///
/// let option = ConfigOption::new("max_health", OptionKind::Integer)
///     .with_default(20_i64)
///     .describe("Maximum health of every player");
/// assert!(!option.required);
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ConfigOption {
    /// Key inside the object's section.
    pub name: String,
    /// Expected value type.
    pub kind: OptionKind,
    /// A required option without a value fails the binding.
    pub required: bool,
    /// Value used when the section does not set the option.
    pub default: Option<OptionValue>,
    /// Free text description.
    pub description: Option<String>,
}

impl ConfigOption {
    /// An optional option without default.
    pub fn new(name: impl Into<String>, kind: OptionKind) -> Self {
        Self {
            name: name.into(),
            kind,
            required: false,
            default: None,
            description: None,
        }
    }

    /// Mark the option as required.
    #[must_use]
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Set the default value.
    #[must_use]
    pub fn with_default(mut self, value: impl Into<OptionValue>) -> Self {
        self.default = Some(value.into());
        self
    }

    /// Set the description.
    #[must_use]
    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// An object that declares configuration options.
///
/// Both methods default to "no options", so objects without configuration
/// only need an empty `impl Configurable for T {}`.
pub trait Configurable {
    /// The options this object accepts.
    fn options(&self) -> Vec<ConfigOption> {
        Vec::new()
    }

    /// Receive a resolved option value.
    fn set_option(&mut self, name: &str, value: &OptionValue) {
        let _ = (name, value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_strict_kinds() {
        assert_eq!(
            OptionKind::Bool.parse(&Value::Bool(true)),
            Some(OptionValue::Bool(true))
        );
        assert_eq!(OptionKind::Bool.parse(&Value::String("yes".into())), None);
        assert_eq!(
            OptionKind::Integer.parse(&Value::from(10)),
            Some(OptionValue::Integer(10))
        );
        assert_eq!(OptionKind::Integer.parse(&Value::from(1.5)), None);
        assert_eq!(OptionKind::Integer.parse(&Value::String("10".into())), None);
    }

    #[test]
    fn test_parse_float_accepts_integers() {
        assert_eq!(
            OptionKind::Float.parse(&Value::from(3)),
            Some(OptionValue::Float(3.0))
        );
    }

    #[test]
    fn test_parse_text_is_lenient() {
        assert_eq!(
            OptionKind::Text.parse(&Value::from(600)),
            Some(OptionValue::Text("600".into()))
        );
        assert_eq!(
            OptionKind::Text.parse(&Value::Bool(false)),
            Some(OptionValue::Text("false".into()))
        );
        assert_eq!(OptionKind::Text.parse(&Value::Null), None);
    }

    #[test]
    fn test_option_value_accessors() {
        assert_eq!(OptionValue::Integer(4).as_f64(), Some(4.0));
        assert_eq!(OptionValue::Text("a".into()).as_i64(), None);
        assert_eq!(OptionValue::from("PT1M").as_str(), Some("PT1M"));
        assert_eq!(OptionValue::Float(0.5).kind(), OptionKind::Float);
    }

    #[test]
    fn test_option_serialization() {
        let option = ConfigOption::new("pvp", OptionKind::Bool).with_default(false);
        let json = serde_json::to_string(&option).unwrap();
        let back: ConfigOption = serde_json::from_str(&json).unwrap();
        assert_eq!(back, option);
    }
}
