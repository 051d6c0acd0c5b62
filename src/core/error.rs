//! Error types.
//!
//! Construction-time failures (registration, binding, lifecycle misuse) are
//! returned synchronously to the caller. Dispatch-time failures never reach
//! this module: they are logged and isolated per listener.

use thiserror::Error;

use super::duration::DurationParseError;

// ============================================================================
// Registry Errors
// ============================================================================

/// Registration and lookup failures of the type-tag registries.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// The tag has already been registered.
    #[error("{kind} '{tag}' is already registered")]
    RegistrationConflict {
        /// Object kind ("feature" or "phase").
        kind: &'static str,
        /// The conflicting tag.
        tag: String,
    },

    /// The conventional constructor failed; the tag has been unregistered.
    #[error("failed to construct {kind} '{tag}', removed it from the registry: {reason}")]
    ConstructorResolutionFailure {
        /// Object kind ("feature" or "phase").
        kind: &'static str,
        /// The removed tag.
        tag: String,
        /// Why construction failed.
        reason: String,
    },

    /// No strategy is registered for the tag.
    #[error("no {kind} registered for '{tag}'")]
    NotRegistered {
        /// Object kind ("feature" or "phase").
        kind: &'static str,
        /// The missing tag.
        tag: String,
    },
}

// ============================================================================
// Configuration Errors
// ============================================================================

/// Configuration binding failures.
///
/// A binding error aborts a single `create` call. Nothing is cached, so a
/// later attempt against a fixed configuration can succeed.
#[derive(Debug, Error)]
pub enum BindingError {
    /// A required option has no value in its section.
    #[error("missing required option '{option}' in section '{section}'")]
    MissingOption {
        /// Section path, `/`-separated.
        section: String,
        /// Option name.
        option: String,
    },

    /// An option value could not be converted.
    #[error("invalid value for option '{option}' in section '{section}': expected {expected}, got {found}")]
    InvalidValue {
        /// Section path, `/`-separated.
        section: String,
        /// Option name.
        option: String,
        /// Description of the expected type.
        expected: &'static str,
        /// Rendering of the rejected value.
        found: String,
    },

    /// The configured phase duration is malformed.
    #[error(transparent)]
    InvalidDurationFormat(#[from] DurationParseError),

    /// A custom construction strategy refused to build the instance.
    #[error(transparent)]
    Construction(#[from] ConstructionError),
}

/// Raised by construction strategies.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ConstructionError {
    /// Human readable reason.
    pub message: String,
}

impl ConstructionError {
    /// Create a construction error.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// The configuration text could not be parsed.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// YAML parsing failed.
    #[error("failed to parse game config: {0}")]
    Parse(#[from] serde_yaml::Error),

    /// The document root is not a mapping.
    #[error("game config root must be a mapping, got {found}")]
    NotAMapping {
        /// Kind of value found at the root.
        found: &'static str,
    },
}

// ============================================================================
// Lifecycle Errors
// ============================================================================

/// Misuse of the session or phase state machines.
#[derive(Debug, Error)]
pub enum LifecycleError {
    /// The object must be initialized first.
    #[error("{object} has not been initialized")]
    NotInitialized {
        /// Description of the object.
        object: String,
    },

    /// The requested transition is not allowed from the current state.
    #[error("cannot {action} {object} while it is {state}")]
    InvalidTransition {
        /// Description of the object.
        object: String,
        /// Attempted action.
        action: &'static str,
        /// Current state.
        state: String,
    },
}

// ============================================================================
// Umbrella
// ============================================================================

/// Any error surfaced by the game library.
#[derive(Debug, Error)]
pub enum GameError {
    /// See [`RegistryError`].
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// See [`BindingError`].
    #[error(transparent)]
    Binding(#[from] BindingError),

    /// See [`LifecycleError`].
    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),
}

impl From<DurationParseError> for GameError {
    fn from(err: DurationParseError) -> Self {
        Self::Binding(err.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_error_messages() {
        let err = RegistryError::RegistrationConflict {
            kind: "feature",
            tag: "max-health".into(),
        };
        assert_eq!(err.to_string(), "feature 'max-health' is already registered");

        let err = RegistryError::NotRegistered {
            kind: "phase",
            tag: "lobby".into(),
        };
        assert_eq!(err.to_string(), "no phase registered for 'lobby'");
    }

    #[test]
    fn test_binding_error_messages() {
        let err = BindingError::MissingOption {
            section: "features/max-health".into(),
            option: "max_health".into(),
        };
        assert_eq!(
            err.to_string(),
            "missing required option 'max_health' in section 'features/max-health'"
        );
    }

    #[test]
    fn test_duration_error_converts_to_game_error() {
        let err: GameError = DurationParseError {
            input: "soon".into(),
        }
        .into();
        assert!(matches!(
            err,
            GameError::Binding(BindingError::InvalidDurationFormat(_))
        ));
    }
}
