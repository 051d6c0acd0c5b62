//! Game object identification.
//!
//! Every session, phase and feature carries a unique `ObjectId`.
//! The id doubles as the scope key: configuration bindings, dispatcher
//! listeners and session listeners are all indexed by it.
//!
//! ## Usage
//!
//! ```
//! use rust_gamelib::core::ObjectId;
//!
//! let a = ObjectId::random();
//! let b = ObjectId::random();
//! assert_ne!(a, b);
//! assert_eq!(ObjectId::from(a.uuid()), a);
//! ```

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for any game object.
///
/// Sessions, phases and features all have ObjectIds. Ids are random
/// (uuid v4) and never reused.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ObjectId(pub Uuid);

impl ObjectId {
    /// Allocate a fresh random id.
    #[must_use]
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// The nil id. Useful as a placeholder in tests.
    #[must_use]
    pub const fn nil() -> Self {
        Self(Uuid::nil())
    }

    /// Get the underlying uuid.
    #[must_use]
    pub const fn uuid(self) -> Uuid {
        self.0
    }
}

impl From<Uuid> for ObjectId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for ObjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Object({})", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_ids_are_distinct() {
        let ids: Vec<_> = (0..16).map(|_| ObjectId::random()).collect();
        for (i, a) in ids.iter().enumerate() {
            for b in &ids[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn test_display() {
        let id = ObjectId::nil();
        assert_eq!(
            format!("{}", id),
            "Object(00000000-0000-0000-0000-000000000000)"
        );
    }

    #[test]
    fn test_serialization() {
        let id = ObjectId::random();
        let json = serde_json::to_string(&id).unwrap();
        let deserialized: ObjectId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, deserialized);
    }
}
