// status.rs — presence/activity and scoring value types shared by the
// wire codec (bancho-protocol) and the session engine (bancho-server).
//
// Grounded on spec.md §3 (Status / Slot entities) and §GLOSSARY
// (presence vs. stats vs. score frame).

/// What a player is currently doing, sent in `CHANGE_STATUS` / presence
/// packets (spec §3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum Action {
    #[default]
    Idle = 0,
    Afk = 1,
    Playing = 2,
    Editing = 3,
    Modding = 4,
    Multiplayer = 5,
    Watching = 6,
    Unknown = 7,
    Testing = 8,
    Submitting = 9,
    Paused = 10,
    Lobby = 11,
    Multiplaying = 12,
    OsuDirect = 13,
}

impl Action {
    pub fn from_u8(v: u8) -> Action {
        match v {
            0 => Action::Idle,
            1 => Action::Afk,
            2 => Action::Playing,
            3 => Action::Editing,
            4 => Action::Modding,
            5 => Action::Multiplayer,
            6 => Action::Watching,
            8 => Action::Testing,
            9 => Action::Submitting,
            10 => Action::Paused,
            11 => Action::Lobby,
            12 => Action::Multiplaying,
            13 => Action::OsuDirect,
            _ => Action::Unknown,
        }
    }
}

/// Ruleset a player/match is using.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum GameMode {
    #[default]
    Osu = 0,
    Taiko = 1,
    Fruits = 2,
    Mania = 3,
}

impl GameMode {
    pub fn from_u8(v: u8) -> GameMode {
        match v {
            1 => GameMode::Taiko,
            2 => GameMode::Fruits,
            3 => GameMode::Mania,
            _ => GameMode::Osu,
        }
    }
}

/// Static per-player activity state (spec §3 `Status`).
#[derive(Debug, Clone, Default)]
pub struct Status {
    pub action: Action,
    pub text: String,
    pub beatmap_md5: String,
    pub beatmap_id: i32,
    pub mods: crate::mods::Mods,
    pub mode: GameMode,
}

/// Rank-relevant per-mode aggregate stats (spec GLOSSARY: distinct from
/// `Status`/presence).
#[derive(Debug, Clone, Default)]
pub struct Stats {
    pub mode: GameMode,
    pub rank_score: i64,
    pub accuracy: f32,
    pub play_count: i32,
    pub total_score: i64,
    pub global_rank: i32,
    pub pp: i16,
}

/// A periodic in-match play-state snapshot (spec GLOSSARY "score frame").
/// `slot_id` is overwritten server-side with the sender's slot index
/// (spec §4.5) regardless of what the client put there.
#[derive(Debug, Clone, Default)]
pub struct ScoreFrame {
    pub time: i32,
    pub id: u8,
    pub total_score: i32,
    pub max_combo: u16,
    pub current_combo: u16,
    pub accuracy: f32,
    pub hp: f32,
    pub tag: u8,
    pub using_scorev2: bool,
    pub count_300: u16,
    pub count_100: u16,
    pub count_50: u16,
    pub count_geki: u16,
    pub count_katu: u16,
    pub count_miss: u16,
    pub slot_id: u8,
    pub passed: bool,
}
