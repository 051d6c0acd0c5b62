//! Phases: the sequential stages of a session.

pub mod behavior;
pub mod phase;

pub use behavior::{PhaseBehavior, PhaseSetup, PhaseType};
pub use phase::{Phase, PhaseState, DURATION_OPTION};
