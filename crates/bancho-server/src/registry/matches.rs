// registry/matches.rs — multiplayer lobby registry (spec §4.3)
//
// Allocates the lowest free id in `[1, MAX_MATCHES]`, rejecting overflow,
// same discipline as `PlayerRegistry`/`ChannelRegistry`. Each match is
// additionally guarded by its own lock (design note §9 "per-match
// serialization"), so the registry lock is only ever held long enough to
// look up or insert the `Arc<Mutex<Match>>`, never while mutating a
// match's contents.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use parking_lot::RwLock;

use crate::multiplayer::match_::Match;

pub const MAX_MATCHES: i32 = 256;

#[derive(Default)]
pub struct MatchRegistry {
    by_id: RwLock<HashMap<i32, Arc<Mutex<Match>>>>,
}

impl MatchRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocates the lowest free id and inserts `build(id)`'s result.
    /// Returns `None` if every id in `[1, MAX_MATCHES]` is taken.
    pub fn create(&self, build: impl FnOnce(i32) -> Match) -> Option<Arc<Mutex<Match>>> {
        let mut map = self.by_id.write();
        let id = (1..=MAX_MATCHES).find(|id| !map.contains_key(id))?;
        let handle = Arc::new(Mutex::new(build(id)));
        map.insert(id, handle.clone());
        Some(handle)
    }

    pub fn get(&self, id: i32) -> Option<Arc<Mutex<Match>>> {
        self.by_id.read().get(&id).cloned()
    }

    pub fn remove(&self, id: i32) -> Option<Arc<Mutex<Match>>> {
        self.by_id.write().remove(&id)
    }

    pub fn snapshot(&self) -> Vec<Arc<Mutex<Match>>> {
        self.by_id.read().values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.by_id.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allocates_lowest_free_id() {
        let reg = MatchRegistry::new();
        let a = reg.create(|id| Match::new(id, "a".into(), String::new(), 1)).unwrap();
        let b = reg.create(|id| Match::new(id, "b".into(), String::new(), 2)).unwrap();
        assert_eq!(a.lock().id, 1);
        assert_eq!(b.lock().id, 2);

        reg.remove(1);
        let c = reg.create(|id| Match::new(id, "c".into(), String::new(), 3)).unwrap();
        assert_eq!(c.lock().id, 1);
    }

    #[test]
    fn rejects_overflow_past_max_matches() {
        let reg = MatchRegistry::new();
        for i in 0..MAX_MATCHES {
            reg.create(|id| Match::new(id, "m".into(), String::new(), i + 1))
                .unwrap();
        }
        assert!(reg
            .create(|id| Match::new(id, "overflow".into(), String::new(), 999))
            .is_none());
    }
}
