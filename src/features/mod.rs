//! Features: the smallest configurable behavior units.

pub mod feature;
pub mod set;

pub use feature::{Feature, FeatureType};
pub use set::FeatureSet;
