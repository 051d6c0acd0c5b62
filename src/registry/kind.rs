//! Object kinds managed by the registries.
//!
//! Features and phases share one registry and factory implementation. The
//! differences (what is built, where its configuration lives, what context
//! the new object gets) are captured by an [`ObjectKind`].

use crate::config::Configurable;
use crate::core::{GameObjectContext, ObjectId, Scope};
use crate::features::Feature;
use crate::phases::Phase;

/// A kind of configurable game object.
pub trait ObjectKind: 'static {
    /// The object built by the factory.
    type Object: ?Sized + Configurable + 'static;

    /// Name used in errors and logs.
    const LABEL: &'static str;

    /// Context of a new object with `tag`, created in `scope`.
    fn object_context(scope: &Scope, tag: &str) -> GameObjectContext;

    /// Configuration section of an object with `tag` created in `scope`.
    fn section_path(scope: &Scope, tag: &str) -> Vec<String>;
}

/// Features: `<scope-path>/features/<tag>`.
#[derive(Debug)]
pub enum FeatureKind {}

impl ObjectKind for FeatureKind {
    type Object = dyn Feature;

    const LABEL: &'static str = "feature";

    fn object_context(scope: &Scope, _tag: &str) -> GameObjectContext {
        GameObjectContext::new(ObjectId::random(), scope.clone())
    }

    fn section_path(scope: &Scope, tag: &str) -> Vec<String> {
        let mut path = scope.config_path();
        path.push("features".to_string());
        path.push(tag.to_string());
        path
    }
}

/// Phases: `phases/<tag>`, created in a session scope.
///
/// A new phase is its own scope; its context points at a phase scope that
/// shares the phase's id.
#[derive(Debug)]
pub enum PhaseKind {}

impl ObjectKind for PhaseKind {
    type Object = Phase;

    const LABEL: &'static str = "phase";

    fn object_context(scope: &Scope, tag: &str) -> GameObjectContext {
        let id = ObjectId::random();
        GameObjectContext::new(id, Scope::phase(id, tag, scope.session_handle()))
    }

    fn section_path(_scope: &Scope, tag: &str) -> Vec<String> {
        vec!["phases".to_string(), tag.to_string()]
    }
}
