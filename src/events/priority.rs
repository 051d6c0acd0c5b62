//! Listener priorities.

use serde::{Deserialize, Serialize};

/// Priority of a subscription on the host event bus.
///
/// Handlers run from [`EventPriority::Lowest`] to [`EventPriority::Monitor`].
/// Monitor handlers observe the outcome and should not modify the event.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum EventPriority {
    /// Runs first; has the least say over the outcome.
    Lowest,
    /// Runs before normal handlers.
    Low,
    /// Default for subscriptions that set no priority.
    #[default]
    Normal,
    /// Runs after normal handlers.
    High,
    /// Runs last among handlers that may change the event.
    Highest,
    /// Observes the final outcome.
    Monitor,
}

impl EventPriority {
    /// All priorities in execution order.
    pub const ALL: [Self; 6] = [
        Self::Lowest,
        Self::Low,
        Self::Normal,
        Self::High,
        Self::Highest,
        Self::Monitor,
    ];
}
