// multiplayer/match_.rs — the multiplayer lobby state machine (spec §4.5)
//
// Grounded on the teacher's single-struct-per-entity idiom (`Client`,
// `edict_t`) generalized to a match; state transitions are plain methods
// on `Match` rather than free functions mutating an indexed array, since
// each match is already behind its own lock (design note §9 "per-match
// serialization: a single mutex ... is the simplest correct design").

use std::collections::HashSet;

use bancho_common::match_types::{EventKind, ScoringMode, SlotStatus, SlotTeam, TeamMode};
use bancho_common::mods::Mods;
use bancho_common::status::{GameMode, ScoreFrame};

use super::slot::Slot;

pub const SLOT_COUNT: usize = 8;
pub const MAX_MATCH_NAME_LEN: usize = 50;
pub const MAX_START_TIMER_SECS: u32 = 300;

#[derive(Debug, Clone, Default)]
pub struct BeatmapRef {
    pub id: i32,
    pub md5: String,
    pub name: String,
}

pub struct Match {
    pub id: i32,
    pub name: String,
    pub password: String,
    pub host: i32,
    pub beatmap: BeatmapRef,
    pub previous_beatmap: BeatmapRef,
    pub mods: Mods,
    pub freemod: bool,
    pub team_mode: TeamMode,
    pub scoring_mode: ScoringMode,
    pub mode: GameMode,
    pub slots: [Slot; SLOT_COUNT],
    pub banned: HashSet<i32>,
    pub in_progress: bool,
    /// Bumped on every cancel; a stale start-timer firing with a
    /// mismatched epoch is a no-op (spec §5, §9 start-timer cancellation).
    pub start_epoch: u64,
    pub archive_id: Option<i64>,
    pub last_activity: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinError {
    BadPassword,
    Banned,
    Full,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockEffect {
    Toggled,
    KickedPlayer(i32),
    HostCannotLockSelf,
}

impl Match {
    pub fn new(id: i32, name: String, password: String, host_id: i32) -> Self {
        let mut m = Match {
            id,
            name,
            password,
            host: host_id,
            beatmap: BeatmapRef::default(),
            previous_beatmap: BeatmapRef::default(),
            mods: Mods::empty(),
            freemod: false,
            team_mode: TeamMode::HeadToHead,
            scoring_mode: ScoringMode::Score,
            mode: GameMode::Osu,
            slots: Default::default(),
            banned: HashSet::new(),
            in_progress: false,
            start_epoch: 0,
            archive_id: None,
            last_activity: 0,
        };
        let team = if m.team_mode.is_team_mode() {
            SlotTeam::Red
        } else {
            SlotTeam::Neutral
        };
        m.slots[0] = Slot {
            status: SlotStatus::NotReady,
            team,
            player: Some(host_id),
            ..Default::default()
        };
        m
    }

    pub fn channel_name(&self) -> String {
        format!("#multi_{}", self.id)
    }

    pub fn find_player_slot(&self, player: i32) -> Option<usize> {
        self.slots.iter().position(|s| s.player == Some(player))
    }

    pub fn free_slot(&self) -> Option<usize> {
        self.slots.iter().position(|s| s.is_open())
    }

    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(|s| !s.has_player())
    }

    pub fn player_ids(&self) -> Vec<i32> {
        self.slots.iter().filter_map(|s| s.player).collect()
    }

    /// Spec §4.5 "Join": password check (host bypasses), ban check, free
    /// slot required.
    pub fn join(&mut self, player: i32, password: &str) -> Result<usize, JoinError> {
        if self.banned.contains(&player) {
            return Err(JoinError::Banned);
        }
        if player != self.host && self.password != password {
            return Err(JoinError::BadPassword);
        }
        let idx = self.free_slot().ok_or(JoinError::Full)?;
        let team = if self.team_mode.is_team_mode() {
            SlotTeam::Red
        } else {
            SlotTeam::Neutral
        };
        self.slots[idx] = Slot {
            status: SlotStatus::NotReady,
            team,
            player: Some(player),
            ..Default::default()
        };
        Ok(idx)
    }

    /// Spec §4.5 "Leave". Returns whether the host rotated, and to whom.
    pub fn leave(&mut self, player: i32) -> LeaveOutcome {
        let Some(idx) = self.find_player_slot(player) else {
            return LeaveOutcome {
                disbanded: false,
                host_rotated_to: None,
                restored_previous_beatmap: false,
            };
        };
        let keep_locked = self.slots[idx].is_locked();
        self.slots[idx].clear(keep_locked);

        let mut restored = false;
        if player == self.host && self.beatmap.id == -1 {
            self.beatmap = self.previous_beatmap.clone();
            restored = true;
        }

        if self.is_empty() {
            return LeaveOutcome {
                disbanded: true,
                host_rotated_to: None,
                restored_previous_beatmap: restored,
            };
        }

        let mut rotated_to = None;
        if player == self.host {
            if let Some(next_idx) = self.slots.iter().position(|s| s.has_player()) {
                self.host = self.slots[next_idx].player.unwrap();
                rotated_to = Some(self.host);
            }
        }

        LeaveOutcome {
            disbanded: false,
            host_rotated_to: rotated_to,
            restored_previous_beatmap: restored,
        }
    }

    /// `MATCH_CHANGE_SLOT` (spec §4.5 "Slot ops").
    pub fn change_slot(&mut self, player: i32, target: usize) -> bool {
        let Some(from) = self.find_player_slot(player) else {
            return false;
        };
        if target >= SLOT_COUNT || from == target || !self.slots[target].is_open() {
            return false;
        }
        let moved = self.slots[from].clone();
        self.slots[target].copy_from(&moved);
        self.slots[from].clear(false);
        true
    }

    /// `MATCH_LOCK` (spec §4.5): toggles empty slots; kicks a non-host
    /// occupant; the host may not lock themselves.
    pub fn lock_slot(&mut self, requester: i32, slot_id: usize) -> Option<LockEffect> {
        if requester != self.host || slot_id >= SLOT_COUNT {
            return None;
        }
        if self.slots[slot_id].player == Some(self.host) {
            return Some(LockEffect::HostCannotLockSelf);
        }
        if let Some(occupant) = self.slots[slot_id].player {
            self.slots[slot_id].clear(false);
            return Some(LockEffect::KickedPlayer(occupant));
        }
        self.slots[slot_id].status = if self.slots[slot_id].is_locked() {
            SlotStatus::Open
        } else {
            SlotStatus::Locked
        };
        Some(LockEffect::Toggled)
    }

    /// `MATCH_CHANGE_TEAM`: swaps Red/Blue, only in free-for-all modes.
    pub fn change_team(&mut self, player: i32) -> bool {
        if self.team_mode.is_team_mode() {
            return false;
        }
        let Some(idx) = self.find_player_slot(player) else {
            return false;
        };
        self.slots[idx].team = match self.slots[idx].team {
            SlotTeam::Red => SlotTeam::Blue,
            _ => SlotTeam::Red,
        };
        true
    }

    pub fn normalize_mods(&mut self) {
        self.mods = self.mods.normalize();
        if self.freemod {
            self.mods = self.mods.match_wide_under_freemod();
            for slot in &mut self.slots {
                slot.mods = slot.mods.slot_under_freemod();
            }
        } else {
            for slot in &mut self.slots {
                slot.mods = Mods::empty();
            }
        }
    }

    /// Any settings/mod/beatmap change unreadies the affected players
    /// (spec §4.5 "Settings changes").
    pub fn unready_all(&mut self) {
        for slot in &mut self.slots {
            if slot.status == SlotStatus::Ready || slot.status == SlotStatus::NoMap {
                slot.status = SlotStatus::NotReady;
            }
        }
    }

    /// Host-only. No player may currently be playing (spec §4.5 "Start").
    pub fn start(&mut self) -> bool {
        if self.in_progress {
            return false;
        }
        let mut started_any = false;
        for slot in &mut self.slots {
            if slot.has_player() {
                slot.status = SlotStatus::Playing;
                slot.loaded = false;
                slot.skipped = false;
                slot.failed = false;
                started_any = true;
            }
        }
        if started_any {
            self.in_progress = true;
        }
        started_any
    }

    pub fn cancel_start_timer(&mut self) {
        self.start_epoch += 1;
    }

    pub fn all_playing_loaded(&self) -> bool {
        self.slots
            .iter()
            .filter(|s| s.is_playing())
            .all(|s| s.loaded)
    }

    pub fn all_playing_skipped(&self) -> bool {
        self.slots
            .iter()
            .filter(|s| s.is_playing())
            .all(|s| s.skipped)
    }

    pub fn no_slot_playing(&self) -> bool {
        self.slots.iter().all(|s| !s.is_playing())
    }

    /// `MATCH_SCORE_UPDATE`: overwrites `slot_id` with the sender's slot
    /// index and stores it as the slot's last frame (spec §4.5).
    pub fn record_score_frame(&mut self, player: i32, mut frame: ScoreFrame) -> Option<ScoreFrame> {
        let idx = self.find_player_slot(player)?;
        frame.slot_id = idx as u8;
        self.slots[idx].last_frame = Some(frame.clone());
        Some(frame)
    }

    /// Transitions to `Complete`; `true` once no slot remains `Playing`.
    pub fn complete_slot(&mut self, player: i32) -> bool {
        if let Some(idx) = self.find_player_slot(player) {
            self.slots[idx].status = SlotStatus::Complete;
        }
        self.no_slot_playing()
    }

    /// Runs once the match is fully complete: unreadies completed slots
    /// and clears `in_progress`.
    pub fn finish(&mut self) {
        self.in_progress = false;
        for slot in &mut self.slots {
            if slot.status == SlotStatus::Complete {
                slot.status = SlotStatus::NotReady;
            }
        }
    }

    /// Ranked list of (player id, sort key) for the `Result` event,
    /// keyed by scoring mode (spec §4.5 "Complete").
    pub fn ranked_results(&self) -> Vec<(i32, i64)> {
        let mut results: Vec<(i32, i64)> = self
            .slots
            .iter()
            .filter_map(|s| {
                let player = s.player?;
                let frame = s.last_frame.as_ref()?;
                let key = match self.scoring_mode {
                    ScoringMode::Score | ScoringMode::ScoreV2 => frame.total_score as i64,
                    ScoringMode::Accuracy => (frame.accuracy * 1000.0) as i64,
                    ScoringMode::Combo => frame.max_combo as i64,
                };
                Some((player, key))
            })
            .collect();
        results.sort_by(|a, b| b.1.cmp(&a.1));
        results
    }

    pub fn ban(&mut self, player: i32) {
        self.banned.insert(player);
    }
}

pub struct LeaveOutcome {
    pub disbanded: bool,
    pub host_rotated_to: Option<i32>,
    pub restored_previous_beatmap: bool,
}

pub const ARCHIVED_EVENT_KINDS: [EventKind; 6] = [
    EventKind::Join,
    EventKind::Leave,
    EventKind::Host,
    EventKind::Start,
    EventKind::Disband,
    EventKind::Result,
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_seats_host_in_slot_zero() {
        let m = Match::new(1, "test".to_string(), String::new(), 5);
        assert_eq!(m.slots[0].player, Some(5));
        assert_eq!(m.find_player_slot(5), Some(0));
    }

    #[test]
    fn join_rejects_wrong_password_but_host_bypasses() {
        let mut m = Match::new(1, "test".to_string(), "secret".to_string(), 5);
        assert_eq!(m.join(6, "wrong"), Err(JoinError::BadPassword));
        assert_eq!(m.join(6, "secret"), Ok(1));
    }

    #[test]
    fn join_rejects_banned_players() {
        let mut m = Match::new(1, "test".to_string(), String::new(), 5);
        m.ban(6);
        assert_eq!(m.join(6, ""), Err(JoinError::Banned));
    }

    #[test]
    fn leave_rotates_host_to_next_slot_with_a_player() {
        let mut m = Match::new(1, "test".to_string(), String::new(), 5);
        m.join(6, "").unwrap();
        let outcome = m.leave(5);
        assert!(!outcome.disbanded);
        assert_eq!(outcome.host_rotated_to, Some(6));
        assert_eq!(m.host, 6);
    }

    #[test]
    fn leave_last_player_disbands() {
        let mut m = Match::new(1, "test".to_string(), String::new(), 5);
        let outcome = m.leave(5);
        assert!(outcome.disbanded);
    }

    #[test]
    fn lock_host_cannot_lock_self() {
        let mut m = Match::new(1, "test".to_string(), String::new(), 5);
        assert_eq!(m.lock_slot(5, 0), Some(LockEffect::HostCannotLockSelf));
    }

    #[test]
    fn lock_kicks_non_host_occupant() {
        let mut m = Match::new(1, "test".to_string(), String::new(), 5);
        m.join(6, "").unwrap();
        assert_eq!(m.lock_slot(5, 1), Some(LockEffect::KickedPlayer(6)));
        assert!(!m.slots[1].has_player());
    }

    #[test]
    fn start_transitions_every_occupied_slot_to_playing() {
        let mut m = Match::new(1, "test".to_string(), String::new(), 5);
        m.join(6, "").unwrap();
        assert!(m.start());
        assert!(m.slots[0].is_playing());
        assert!(m.slots[1].is_playing());
        assert!(!m.start());
    }

    #[test]
    fn all_playing_loaded_true_once_every_slot_reports() {
        let mut m = Match::new(1, "test".to_string(), String::new(), 5);
        m.join(6, "").unwrap();
        m.start();
        assert!(!m.all_playing_loaded());
        m.slots[0].loaded = true;
        assert!(!m.all_playing_loaded());
        m.slots[1].loaded = true;
        assert!(m.all_playing_loaded());
    }

    #[test]
    fn score_frame_slot_id_is_overwritten_from_sender() {
        let mut m = Match::new(1, "test".to_string(), String::new(), 5);
        m.join(6, "").unwrap();
        m.start();
        let frame = ScoreFrame {
            slot_id: 99,
            ..Default::default()
        };
        let recorded = m.record_score_frame(6, frame).unwrap();
        assert_eq!(recorded.slot_id, 1);
    }

    #[test]
    fn complete_waits_for_every_playing_slot() {
        let mut m = Match::new(1, "test".to_string(), String::new(), 5);
        m.join(6, "").unwrap();
        m.start();
        assert!(!m.complete_slot(5));
        assert!(m.complete_slot(6));
    }

    #[test]
    fn double_time_and_nightcore_never_coexist_after_normalize() {
        let mut m = Match::new(1, "test".to_string(), String::new(), 5);
        m.mods = Mods::DOUBLE_TIME | Mods::NIGHTCORE;
        m.normalize_mods();
        assert!(m.mods.contains(Mods::NIGHTCORE));
        assert!(!m.mods.contains(Mods::DOUBLE_TIME));
    }

    #[test]
    fn cancel_start_timer_bumps_epoch() {
        let mut m = Match::new(1, "test".to_string(), String::new(), 5);
        let before = m.start_epoch;
        m.cancel_start_timer();
        assert_eq!(m.start_epoch, before + 1);
    }
}
