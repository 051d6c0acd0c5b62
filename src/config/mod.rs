//! Game configuration: the YAML tree, declared options and bindings.

pub mod binding;
pub mod option;
pub mod section;

pub use binding::ConfigBinding;
pub use option::{ConfigOption, Configurable, OptionKind, OptionValue};
pub use section::{ConfigSection, GameConfig, PATH_SEPARATOR};
