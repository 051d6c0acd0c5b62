//! Registries and configured object factories.
//!
//! ## Lifecycle of a registered tag
//!
//! 1. A feature or phase is registered under a tag, either with an explicit
//!    construction strategy or through its type (`register_type`).
//! 2. Sessions and phases ask the registry for the tag's factory and call
//!    `create(scope)`.
//! 3. The factory builds a fresh instance, resolves its configuration
//!    binding once per scope and applies it.

pub mod factory;
pub mod kind;
#[allow(clippy::module_inception)]
pub mod registry;

pub use crate::core::RegistryError;
pub use factory::{ConfiguredObjectFactory, Strategy};
pub use kind::{FeatureKind, ObjectKind, PhaseKind};
pub use registry::{FeatureRegistry, PhaseRegistry, Registry};
