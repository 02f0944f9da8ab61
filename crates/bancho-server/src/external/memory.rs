// external/memory.rs — in-process collaborator backend (SPEC_FULL §10)
//
// The persistence layer proper (spec §1's "relational store of
// users/beatmaps/scores/matches/messages") is an external collaborator by
// design, reached only through the traits in `external.rs`. This module
// supplies a working, non-persistent implementation of those traits so
// `bancho-net`'s binary has something concrete to run against out of the
// box; a real deployment wires its own `Collaborators` (every field is
// `pub`) backed by whatever store it already runs.

use std::collections::{HashMap, HashSet};
use std::time::Duration;

use parking_lot::Mutex;

use bancho_common::match_types::EventKind;
use bancho_common::status::GameMode;

use super::{
    ClientLedger, Collaborators, DbUser, EventLog, HardwareRecord, InfringementAction,
    InfringementLog, LoginLog, MatchStore, MessageStore, PresenceCache, RelationshipStore, Score,
    ScoreStore, UserFields, UserStore,
};

#[derive(Default)]
pub struct InMemoryUserStore {
    pub by_id: Mutex<HashMap<i64, DbUser>>,
}

impl UserStore for InMemoryUserStore {
    fn fetch_by_id(&self, id: i64) -> Option<DbUser> {
        self.by_id.lock().get(&id).cloned()
    }

    fn fetch_by_name(&self, name: &str) -> Option<DbUser> {
        self.by_id.lock().values().find(|u| u.name == name).cloned()
    }

    fn update(&self, id: i64, fields: UserFields) {
        if let Some(u) = self.by_id.lock().get_mut(&id) {
            if let Some(r) = fields.restricted {
                u.restricted = r;
            }
            if let Some(p) = fields.permissions {
                u.permissions = p;
            }
            if let Some(s) = fields.silence_end {
                u.silence_end = s;
            }
            if let Some(s) = fields.supporter_end {
                u.supporter_end = s;
            }
            if let Some(c) = fields.country {
                u.country = c;
            }
        }
    }
}

#[derive(Default)]
pub struct InMemoryScoreStore {
    pub personal_bests: Mutex<HashMap<(String, i64, GameMode), Score>>,
}

impl ScoreStore for InMemoryScoreStore {
    fn fetch_personal_best(&self, beatmap_md5: &str, user: i64, mode: GameMode) -> Option<Score> {
        self.personal_bests
            .lock()
            .get(&(beatmap_md5.to_string(), user, mode))
            .cloned()
    }

    fn hide_all(&self, _user: i64) {}
    fn restore_hidden_scores(&self, _user: i64) {}
}

#[derive(Default)]
pub struct InMemoryMatchStore {
    next_id: Mutex<i64>,
    rows: Mutex<HashMap<i64, (String, String)>>,
    ended: Mutex<std::collections::HashSet<i64>>,
}

impl MatchStore for InMemoryMatchStore {
    fn create(&self, name: &str, _host: i64) -> i64 {
        let mut next = self.next_id.lock();
        *next += 1;
        let id = *next;
        self.rows.lock().insert(id, (name.to_string(), String::new()));
        id
    }

    fn update(&self, match_id: i64, name: &str, beatmap_md5: &str) {
        if let Some(row) = self.rows.lock().get_mut(&match_id) {
            row.0 = name.to_string();
            row.1 = beatmap_md5.to_string();
        }
    }

    fn delete(&self, match_id: i64) {
        self.rows.lock().remove(&match_id);
    }

    fn mark_ended(&self, match_id: i64) {
        self.ended.lock().insert(match_id);
    }

    fn fetch_by_id(&self, match_id: i64) -> Option<(i64, String)> {
        self.rows.lock().get(&match_id).map(|(name, _)| (match_id, name.clone()))
    }
}

#[derive(Default)]
pub struct InMemoryEventLog {
    events: Mutex<Vec<(i64, EventKind, String)>>,
}

impl EventLog for InMemoryEventLog {
    fn create(&self, match_id: i64, kind: EventKind, data: String) {
        self.events.lock().push((match_id, kind, data));
    }

    fn fetch_last_by_type(&self, match_id: i64, kind: EventKind) -> Option<String> {
        self.events
            .lock()
            .iter()
            .rev()
            .find(|(m, k, _)| *m == match_id && *k == kind)
            .map(|(_, _, d)| d.clone())
    }
}

#[derive(Default)]
pub struct InMemoryMessageStore {
    messages: Mutex<Vec<(i64, String, String)>>,
}

impl MessageStore for InMemoryMessageStore {
    fn create(&self, sender: i64, target: &str, text: &str) {
        self.messages.lock().push((sender, target.to_string(), text.to_string()));
    }
}

#[derive(Default)]
pub struct InMemoryRelationshipStore {
    edges: Mutex<HashSet<(i64, i64)>>,
}

impl RelationshipStore for InMemoryRelationshipStore {
    fn create(&self, user_id: i64, target_id: i64) {
        self.edges.lock().insert((user_id, target_id));
    }

    fn delete(&self, user_id: i64, target_id: i64) {
        self.edges.lock().remove(&(user_id, target_id));
    }

    fn friends_of(&self, user_id: i64) -> Vec<i64> {
        self.edges
            .lock()
            .iter()
            .filter(|(u, _)| *u == user_id)
            .map(|(_, t)| *t)
            .collect()
    }
}

#[derive(Default)]
pub struct InMemoryClientLedger {
    records: Mutex<Vec<HardwareRecord>>,
}

impl ClientLedger for InMemoryClientLedger {
    fn fetch_without_executable(&self, osu_md5: &str, user: i64) -> Vec<HardwareRecord> {
        self.records
            .lock()
            .iter()
            .filter(|r| r.osu_md5 == osu_md5 && r.user_id != user)
            .cloned()
            .collect()
    }

    fn create(&self, record: HardwareRecord) {
        self.records.lock().push(record);
    }

    fn update_all(&self, user: i64, record: &HardwareRecord) {
        for existing in self.records.lock().iter_mut().filter(|r| r.user_id == user) {
            existing.adapters_md5 = record.adapters_md5.clone();
            existing.uninstall_id = record.uninstall_id.clone();
            existing.diskdrive_signature = record.diskdrive_signature.clone();
        }
    }
}

#[derive(Default)]
pub struct InMemoryInfringementLog {
    active: Mutex<HashMap<(i64, u8), i64>>,
}

impl InfringementLog for InMemoryInfringementLog {
    fn create(
        &self,
        user: i64,
        action: InfringementAction,
        length: Duration,
        _description: &str,
        is_permanent: bool,
    ) {
        let until = if is_permanent {
            i64::MAX
        } else {
            crate::time::unix_now() + length.as_secs() as i64
        };
        self.active.lock().insert((user, action as u8), until);
    }

    fn active_until(&self, user: i64, action: InfringementAction) -> Option<i64> {
        self.active.lock().get(&(user, action as u8)).copied()
    }
}

#[derive(Default)]
pub struct InMemoryLoginLog {
    rows: Mutex<Vec<(i64, String, String)>>,
}

impl LoginLog for InMemoryLoginLog {
    fn create(&self, user: i64, host: &str, version: &str) {
        self.rows.lock().push((user, host.to_string(), version.to_string()));
    }
}

#[derive(Default)]
pub struct InMemoryPresenceCache {
    usercount: std::sync::atomic::AtomicI64,
}

impl PresenceCache for InMemoryPresenceCache {
    fn update_leaderboard(&self, _user: i64, _mode: GameMode, _rank_score: i64) {}
    fn update_status(&self, _user: i64, _text: &str) {}

    fn incr_usercount(&self) {
        self.usercount.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
    }

    fn decr_usercount(&self) {
        self.usercount.fetch_sub(1, std::sync::atomic::Ordering::Relaxed);
    }
}

/// Builds a `Collaborators` bundle backed entirely by in-process maps.
/// Suitable for local development or a single-process deployment that
/// doesn't need the state to survive a restart; swap any field out for a
/// real store as needed.
pub fn in_memory_collaborators() -> Collaborators {
    Collaborators {
        users: Box::new(InMemoryUserStore::default()),
        scores: Box::new(InMemoryScoreStore::default()),
        matches: Box::new(InMemoryMatchStore::default()),
        events: Box::new(InMemoryEventLog::default()),
        messages: Box::new(InMemoryMessageStore::default()),
        relationships: Box::new(InMemoryRelationshipStore::default()),
        clients: Box::new(InMemoryClientLedger::default()),
        infringements: Box::new(InMemoryInfringementLog::default()),
        logins: Box::new(InMemoryLoginLog::default()),
        presence_cache: Box::new(InMemoryPresenceCache::default()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_store_round_trips_updates() {
        let store = InMemoryUserStore::default();
        store.by_id.lock().insert(
            1,
            DbUser {
                id: 1,
                name: "peppy".into(),
                password_bcrypt: String::new(),
                country: "US".into(),
                permissions: 1,
                silence_end: 0,
                supporter_end: 0,
                restricted: false,
            },
        );
        store.update(1, UserFields { restricted: Some(true), ..Default::default() });
        assert!(store.fetch_by_id(1).unwrap().restricted);
        assert_eq!(store.fetch_by_name("peppy").unwrap().id, 1);
    }

    #[test]
    fn client_ledger_excludes_the_requesting_user() {
        let ledger = InMemoryClientLedger::default();
        ledger.create(HardwareRecord {
            user_id: 2,
            osu_md5: "abc".into(),
            adapters_md5: String::new(),
            uninstall_id: String::new(),
            diskdrive_signature: String::new(),
        });
        assert_eq!(ledger.fetch_without_executable("abc", 1).len(), 1);
        assert_eq!(ledger.fetch_without_executable("abc", 2).len(), 0);
    }

    #[test]
    fn infringement_log_tracks_active_until() {
        let log = InMemoryInfringementLog::default();
        log.create(1, InfringementAction::Silence, Duration::from_secs(60), "spam", false);
        assert!(log.active_until(1, InfringementAction::Silence).is_some());
        assert!(log.active_until(1, InfringementAction::Restriction).is_none());
    }
}
