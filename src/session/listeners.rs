//! Membership listener bookkeeping.
//!
//! Callbacks are indexed by `(kind, owner)` so that all callbacks of a
//! deactivated game object can be dropped at once. Callers always take a
//! snapshot before invoking, so callbacks may register or remove listeners.

use std::rc::Rc;

use indexmap::IndexMap;
use rustc_hash::FxHashMap;

use crate::core::{ObjectId, Player, User};

use super::handle::{Admission, JoinKind};

/// Membership change a listener is interested in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ListenerKind {
    Join,
    Quit,
    Spectate,
}

pub(crate) type UserCallback = Rc<dyn Fn(&User)>;
pub(crate) type PlayerCallback = Rc<dyn Fn(&Player)>;
pub(crate) type JoinGuard = Rc<dyn Fn(&User, JoinKind) -> Admission>;

type Index<T> = FxHashMap<ListenerKind, IndexMap<ObjectId, Vec<T>>>;

#[derive(Default)]
pub(crate) struct SessionListeners {
    user: Index<UserCallback>,
    player: Index<PlayerCallback>,
    guards: IndexMap<ObjectId, Vec<JoinGuard>>,
}

impl SessionListeners {
    pub(crate) fn add_user(&mut self, kind: ListenerKind, owner: ObjectId, callback: UserCallback) {
        self.user
            .entry(kind)
            .or_default()
            .entry(owner)
            .or_default()
            .push(callback);
    }

    pub(crate) fn add_player(
        &mut self,
        kind: ListenerKind,
        owner: ObjectId,
        callback: PlayerCallback,
    ) {
        self.player
            .entry(kind)
            .or_default()
            .entry(owner)
            .or_default()
            .push(callback);
    }

    pub(crate) fn add_guard(&mut self, owner: ObjectId, guard: JoinGuard) {
        self.guards.entry(owner).or_default().push(guard);
    }

    pub(crate) fn user_callbacks(&self, kind: ListenerKind) -> Vec<UserCallback> {
        flatten(self.user.get(&kind), None)
    }

    pub(crate) fn player_callbacks(&self, kind: ListenerKind) -> Vec<PlayerCallback> {
        flatten(self.player.get(&kind), None)
    }

    pub(crate) fn owner_user_callbacks(
        &self,
        kind: ListenerKind,
        owner: ObjectId,
    ) -> Vec<UserCallback> {
        flatten(self.user.get(&kind), Some(owner))
    }

    pub(crate) fn owner_player_callbacks(
        &self,
        kind: ListenerKind,
        owner: ObjectId,
    ) -> Vec<PlayerCallback> {
        flatten(self.player.get(&kind), Some(owner))
    }

    pub(crate) fn guards(&self) -> Vec<JoinGuard> {
        self.guards.values().flatten().cloned().collect()
    }

    /// Drop everything registered by `owner`. Returns the number of
    /// callbacks and guards removed.
    pub(crate) fn remove_owner(&mut self, owner: ObjectId) -> usize {
        let mut removed = 0;
        for by_owner in self.user.values_mut() {
            removed += by_owner.shift_remove(&owner).map_or(0, |v| v.len());
        }
        for by_owner in self.player.values_mut() {
            removed += by_owner.shift_remove(&owner).map_or(0, |v| v.len());
        }
        removed += self.guards.shift_remove(&owner).map_or(0, |v| v.len());
        removed
    }

    /// Number of callbacks and guards registered by `owner`.
    pub(crate) fn count(&self, owner: ObjectId) -> usize {
        let user: usize = self
            .user
            .values()
            .filter_map(|by_owner| by_owner.get(&owner))
            .map(Vec::len)
            .sum();
        let player: usize = self
            .player
            .values()
            .filter_map(|by_owner| by_owner.get(&owner))
            .map(Vec::len)
            .sum();
        user + player + self.guards.get(&owner).map_or(0, Vec::len)
    }
}

fn flatten<T: Clone>(index: Option<&IndexMap<ObjectId, Vec<T>>>, owner: Option<ObjectId>) -> Vec<T> {
    let Some(index) = index else {
        return Vec::new();
    };
    match owner {
        Some(owner) => index.get(&owner).cloned().unwrap_or_default(),
        None => index.values().flatten().cloned().collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_index_by_kind_and_owner() {
        let mut listeners = SessionListeners::default();
        let a = ObjectId::random();
        let b = ObjectId::random();
        let calls = Rc::new(Cell::new(0));

        let counter = Rc::clone(&calls);
        listeners.add_user(ListenerKind::Join, a, Rc::new(move |_: &User| counter.set(counter.get() + 1)));
        listeners.add_user(ListenerKind::Quit, a, Rc::new(|_: &User| {}));
        listeners.add_user(ListenerKind::Join, b, Rc::new(|_: &User| {}));

        assert_eq!(listeners.user_callbacks(ListenerKind::Join).len(), 2);
        assert_eq!(listeners.owner_user_callbacks(ListenerKind::Join, a).len(), 1);
        assert_eq!(listeners.user_callbacks(ListenerKind::Spectate).len(), 0);

        for callback in listeners.owner_user_callbacks(ListenerKind::Join, a) {
            callback(&User::new("Alex"));
        }
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_remove_owner() {
        let mut listeners = SessionListeners::default();
        let a = ObjectId::random();
        let b = ObjectId::random();

        listeners.add_user(ListenerKind::Join, a, Rc::new(|_: &User| {}));
        listeners.add_player(ListenerKind::Quit, a, Rc::new(|_: &Player| {}));
        listeners.add_guard(a, Rc::new(|_: &User, _: JoinKind| Admission::Accepted));
        listeners.add_user(ListenerKind::Join, b, Rc::new(|_: &User| {}));

        assert_eq!(listeners.count(a), 3);
        assert_eq!(listeners.remove_owner(a), 3);
        assert_eq!(listeners.count(a), 0);
        assert_eq!(listeners.user_callbacks(ListenerKind::Join).len(), 1);
        assert!(listeners.guards().is_empty());
    }
}
