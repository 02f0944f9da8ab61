// external.rs — persistence & cache collaborators (spec §6, SPEC_FULL §10)
//
// Grounded on spec.md §6's "external interfaces" table. The teacher has
// no database layer to imitate (Quake II's "external collaborator" is
// the game DLL, called through `ServerGameImport`/`ServerGameExport`
// function-pointer tables in `game_ffi.rs`/`server_game_import.rs`); the
// same "narrow trait at the boundary, fake impl under cfg(test)" shape is
// reused here, generalized from an FFI vtable to ordinary Rust traits
// since there's no foreign ABI to cross.

use std::time::Duration;

use bancho_common::match_types::EventKind;
use bancho_common::status::GameMode;

pub mod memory;

#[derive(Debug, Clone)]
pub struct DbUser {
    pub id: i64,
    pub name: String,
    pub password_bcrypt: String,
    pub country: String,
    pub permissions: u32,
    pub silence_end: i64,
    pub supporter_end: i64,
    pub restricted: bool,
}

#[derive(Debug, Clone, Default)]
pub struct UserFields {
    pub restricted: Option<bool>,
    pub permissions: Option<u32>,
    pub silence_end: Option<i64>,
    pub supporter_end: Option<i64>,
    pub country: Option<String>,
    pub latest_activity: Option<i64>,
}

#[derive(Debug, Clone)]
pub struct Score {
    pub user_id: i64,
    pub beatmap_md5: String,
    pub mode: GameMode,
    pub total_score: i64,
    pub pp: f32,
}

#[derive(Debug, Clone, Copy)]
pub enum InfringementAction {
    Restriction = 0,
    Silence = 1,
    Ban = 2,
}

#[derive(Debug, Clone)]
pub struct HardwareRecord {
    pub user_id: i64,
    pub osu_md5: String,
    pub adapters_md5: String,
    pub uninstall_id: String,
    pub diskdrive_signature: String,
}

pub trait UserStore: Send + Sync {
    fn fetch_by_id(&self, id: i64) -> Option<DbUser>;
    fn fetch_by_name(&self, name: &str) -> Option<DbUser>;
    fn update(&self, id: i64, fields: UserFields);
}

pub trait ScoreStore: Send + Sync {
    fn fetch_personal_best(&self, beatmap_md5: &str, user: i64, mode: GameMode) -> Option<Score>;
    fn hide_all(&self, user: i64);
    fn restore_hidden_scores(&self, user: i64);
}

pub trait MatchStore: Send + Sync {
    fn create(&self, name: &str, host: i64) -> i64;
    fn update(&self, match_id: i64, name: &str, beatmap_md5: &str);
    fn delete(&self, match_id: i64);
    /// Marks an archived match as ended rather than deleting its record
    /// (spec §4.5 Leave: once a `Start` event has been archived, the
    /// match's history is kept rather than removed).
    fn mark_ended(&self, match_id: i64);
    fn fetch_by_id(&self, match_id: i64) -> Option<(i64, String)>;
}

pub trait EventLog: Send + Sync {
    fn create(&self, match_id: i64, kind: EventKind, data: String);
    fn fetch_last_by_type(&self, match_id: i64, kind: EventKind) -> Option<String>;
}

pub trait MessageStore: Send + Sync {
    fn create(&self, sender: i64, target: &str, text: &str);
}

/// `relationships.create/delete(user_id, target_id)` (spec §6).
pub trait RelationshipStore: Send + Sync {
    fn create(&self, user_id: i64, target_id: i64);
    fn delete(&self, user_id: i64, target_id: i64);
    fn friends_of(&self, user_id: i64) -> Vec<i64>;
}

pub trait ClientLedger: Send + Sync {
    fn fetch_without_executable(&self, osu_md5: &str, user: i64) -> Vec<HardwareRecord>;
    fn create(&self, record: HardwareRecord);
    fn update_all(&self, user: i64, record: &HardwareRecord);
}

pub trait InfringementLog: Send + Sync {
    fn create(
        &self,
        user: i64,
        action: InfringementAction,
        length: Duration,
        description: &str,
        is_permanent: bool,
    );
    /// Source of truth for restriction/silence expiry (Open Question 3):
    /// `Some(until_unix_secs)` if an active row exists for this action.
    fn active_until(&self, user: i64, action: InfringementAction) -> Option<i64>;
}

pub trait LoginLog: Send + Sync {
    fn create(&self, user: i64, host: &str, version: &str);
}

pub trait PresenceCache: Send + Sync {
    fn update_leaderboard(&self, user: i64, mode: GameMode, rank_score: i64);
    fn update_status(&self, user: i64, text: &str);
    fn incr_usercount(&self);
    fn decr_usercount(&self);
}

/// Bundles every collaborator trait object the session engine needs.
/// Cloned cheaply (an `Arc` in practice) and handed to each session.
pub struct Collaborators {
    pub users: Box<dyn UserStore>,
    pub scores: Box<dyn ScoreStore>,
    pub matches: Box<dyn MatchStore>,
    pub events: Box<dyn EventLog>,
    pub messages: Box<dyn MessageStore>,
    pub relationships: Box<dyn RelationshipStore>,
    pub clients: Box<dyn ClientLedger>,
    pub infringements: Box<dyn InfringementLog>,
    pub logins: Box<dyn LoginLog>,
    pub presence_cache: Box<dyn PresenceCache>,
}

#[cfg(test)]
pub mod fakes {
    use super::*;
    use parking_lot::Mutex;
    use std::collections::HashMap;

    #[derive(Default)]
    pub struct FakeUserStore {
        pub by_id: Mutex<HashMap<i64, DbUser>>,
    }

    impl UserStore for FakeUserStore {
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
    pub struct NullScoreStore;
    impl ScoreStore for NullScoreStore {
        fn fetch_personal_best(&self, _: &str, _: i64, _: GameMode) -> Option<Score> {
            None
        }
        fn hide_all(&self, _: i64) {}
        fn restore_hidden_scores(&self, _: i64) {}
    }

    #[derive(Default)]
    pub struct FakeMatchStore {
        pub next_id: Mutex<i64>,
    }
    impl MatchStore for FakeMatchStore {
        fn create(&self, _name: &str, _host: i64) -> i64 {
            let mut n = self.next_id.lock();
            *n += 1;
            *n
        }
        fn update(&self, _match_id: i64, _name: &str, _beatmap_md5: &str) {}
        fn delete(&self, _match_id: i64) {}
        fn mark_ended(&self, _match_id: i64) {}
        fn fetch_by_id(&self, _match_id: i64) -> Option<(i64, String)> {
            None
        }
    }

    #[derive(Default)]
    pub struct FakeEventLog {
        pub events: Mutex<Vec<(i64, EventKind, String)>>,
    }
    impl EventLog for FakeEventLog {
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
    pub struct FakeMessageStore {
        pub messages: Mutex<Vec<(i64, String, String)>>,
    }
    impl MessageStore for FakeMessageStore {
        fn create(&self, sender: i64, target: &str, text: &str) {
            self.messages
                .lock()
                .push((sender, target.to_string(), text.to_string()));
        }
    }

    #[derive(Default)]
    pub struct FakeRelationshipStore {
        pub edges: Mutex<std::collections::HashSet<(i64, i64)>>,
    }
    impl RelationshipStore for FakeRelationshipStore {
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
    pub struct NullClientLedger;
    impl ClientLedger for NullClientLedger {
        fn fetch_without_executable(&self, _: &str, _: i64) -> Vec<HardwareRecord> {
            Vec::new()
        }
        fn create(&self, _record: HardwareRecord) {}
        fn update_all(&self, _user: i64, _record: &HardwareRecord) {}
    }

    #[derive(Default)]
    pub struct NullInfringementLog;
    impl InfringementLog for NullInfringementLog {
        fn create(&self, _: i64, _: InfringementAction, _: Duration, _: &str, _: bool) {}
        fn active_until(&self, _: i64, _: InfringementAction) -> Option<i64> {
            None
        }
    }

    #[derive(Default)]
    pub struct NullLoginLog;
    impl LoginLog for NullLoginLog {
        fn create(&self, _: i64, _: &str, _: &str) {}
    }

    #[derive(Default)]
    pub struct NullPresenceCache;
    impl PresenceCache for NullPresenceCache {
        fn update_leaderboard(&self, _: i64, _: GameMode, _: i64) {}
        fn update_status(&self, _: i64, _: &str) {}
        fn incr_usercount(&self) {}
        fn decr_usercount(&self) {}
    }

    pub fn null_collaborators() -> Collaborators {
        Collaborators {
            users: Box::new(FakeUserStore::default()),
            scores: Box::new(NullScoreStore),
            matches: Box::new(FakeMatchStore::default()),
            events: Box::new(FakeEventLog::default()),
            messages: Box::new(FakeMessageStore::default()),
            relationships: Box::new(FakeRelationshipStore::default()),
            clients: Box::new(NullClientLedger),
            infringements: Box::new(NullInfringementLog),
            logins: Box::new(NullLoginLog),
            presence_cache: Box::new(NullPresenceCache),
        }
    }
}
