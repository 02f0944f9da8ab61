// registry/lobby.rs — tracks sessions currently browsing the multiplayer
// lobby (spec §4.2 login epilogue, `JOIN_LOBBY`/`PART_LOBBY`).
//
// Not itself a spec.md entity — the lobby is a server-wide broadcast
// group for match list updates (`NEW_MATCH`/`UPDATE_MATCH`/
// `DISBAND_MATCH`) rather than a named `Channel`, so it gets its own tiny
// id-set registry with the same `RwLock` discipline as the other three
// (spec §4.3, §5).

use std::collections::HashSet;

use parking_lot::RwLock;

#[derive(Default)]
pub struct LobbyRegistry {
    members: RwLock<HashSet<i32>>,
}

impl LobbyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn join(&self, id: i32) -> bool {
        self.members.write().insert(id)
    }

    pub fn part(&self, id: i32) -> bool {
        self.members.write().remove(&id)
    }

    pub fn contains(&self, id: i32) -> bool {
        self.members.read().contains(&id)
    }

    pub fn members(&self) -> Vec<i32> {
        self.members.read().iter().copied().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn join_and_part_are_idempotent() {
        let lobby = LobbyRegistry::new();
        assert!(lobby.join(1));
        assert!(!lobby.join(1));
        assert!(lobby.part(1));
        assert!(!lobby.part(1));
    }
}
