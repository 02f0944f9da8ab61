// registry/tourney.rs — extra tourney-client sessions for a principal
// (spec §4.2 "a tourney client stream is allowed up to 8 parallel
// sessions for the same principal"; §4.7 "deliver to each of them except
// the one bound to the same remote port").
//
// The main `PlayerRegistry` is one-session-per-id (spec §3 invariant:
// "every session with logged_in=true ... present in the player registry
// exactly once"). Tourney clients beyond the first authenticated session
// for a principal are tracked here instead, keyed by principal id, so
// that invariant stays true while still letting the messaging/teardown
// paths reach every live session for that principal.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::session::Session;

pub const MAX_TOURNEY_SESSIONS: usize = 8;

#[derive(Default)]
pub struct TourneyRegistry {
    by_owner: RwLock<HashMap<i32, Vec<Arc<Session>>>>,
}

impl TourneyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current extra-session count for `owner` (not counting the primary
    /// session held in `PlayerRegistry`).
    pub fn count(&self, owner: i32) -> usize {
        self.by_owner.read().get(&owner).map(Vec::len).unwrap_or(0)
    }

    pub fn add(&self, owner: i32, session: Arc<Session>) {
        self.by_owner.write().entry(owner).or_default().push(session);
    }

    pub fn remove(&self, owner: i32, remote_addr: &str) {
        if let Some(list) = self.by_owner.write().get_mut(&owner) {
            list.retain(|s| s.remote_addr() != remote_addr);
        }
    }

    /// Every extra session for `owner` except the one at `exclude_addr`
    /// (spec §4.7: never double-deliver to the session that sent it).
    pub fn others(&self, owner: i32, exclude_addr: &str) -> Vec<Arc<Session>> {
        self.by_owner
            .read()
            .get(&owner)
            .map(|list| {
                list.iter()
                    .filter(|s| s.remote_addr() != exclude_addr)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn all(&self, owner: i32) -> Vec<Arc<Session>> {
        self.by_owner.read().get(&owner).cloned().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::Session;

    #[test]
    fn others_excludes_the_matching_remote_addr() {
        let reg = TourneyRegistry::new();
        let (tx_a, _rx_a) = crossbeam::channel::unbounded();
        let (tx_b, _rx_b) = crossbeam::channel::unbounded();
        let a = Session::new("127.0.0.1:1001".to_string(), tx_a);
        let b = Session::new("127.0.0.1:1002".to_string(), tx_b);
        a.set_id(5);
        b.set_id(5);
        reg.add(5, a.clone());
        reg.add(5, b.clone());
        assert_eq!(reg.count(5), 2);
        assert_eq!(reg.others(5, a.remote_addr()).len(), 1);
    }
}
