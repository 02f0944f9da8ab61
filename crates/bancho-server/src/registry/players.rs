// registry/players.rs — process-wide player registry (spec §4.3)
//
// Grounded on the teacher's `Server.clients: Vec<Client>` plus the
// `Client_Find`-style lookups in sv_user.rs, generalized from a
// fixed-size array indexed by slot to an id-keyed map since sessions here
// come and go at arbitrary rates rather than filling `maxclients` slots
// up front. Single `RwLock` per spec §4.3/§5.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::session::Session;

#[derive(Default)]
pub struct PlayerRegistry {
    by_id: RwLock<HashMap<i32, Arc<Session>>>,
    name_index: RwLock<HashMap<String, i32>>,
}

impl PlayerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, session: Arc<Session>) {
        let id = session.id();
        let name_key = session.username().to_lowercase();
        self.by_id.write().insert(id, session);
        self.name_index.write().insert(name_key, id);
    }

    pub fn remove(&self, id: i32) -> Option<Arc<Session>> {
        let removed = self.by_id.write().remove(&id);
        if let Some(session) = &removed {
            self.name_index.write().remove(&session.username().to_lowercase());
        }
        removed
    }

    pub fn by_id(&self, id: i32) -> Option<Arc<Session>> {
        self.by_id.read().get(&id).cloned()
    }

    pub fn by_name(&self, name: &str) -> Option<Arc<Session>> {
        let id = *self.name_index.read().get(&name.to_lowercase())?;
        self.by_id(id)
    }

    /// Stable snapshot for fan-out (spec §4.3, §5 "broadcast reads a
    /// stable snapshot").
    pub fn snapshot(&self) -> Vec<Arc<Session>> {
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
    use crate::session::test_support::test_session;

    #[test]
    fn insert_then_lookup_by_id_and_name() {
        let reg = PlayerRegistry::new();
        let session = test_session(5, "peppy");
        reg.insert(session.clone());

        assert_eq!(reg.by_id(5).unwrap().id(), 5);
        assert_eq!(reg.by_name("PEPPY").unwrap().id(), 5);
        assert_eq!(reg.snapshot().len(), 1);
    }

    #[test]
    fn remove_clears_both_indexes() {
        let reg = PlayerRegistry::new();
        reg.insert(test_session(5, "peppy"));
        reg.remove(5);

        assert!(reg.by_id(5).is_none());
        assert!(reg.by_name("peppy").is_none());
        assert!(reg.is_empty());
    }
}
