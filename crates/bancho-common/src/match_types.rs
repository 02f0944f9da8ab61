// match_types.rs — wire-level enums for the multiplayer match/slot model
// (spec §3, §4.5). Shared between the codec (bancho-protocol) and the
// match state machine (bancho-server).

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum SlotStatus {
    #[default]
    Open = 1,
    Locked = 2,
    NotReady = 4,
    Ready = 8,
    NoMap = 16,
    Playing = 32,
    Complete = 64,
    Quit = 128,
}

impl SlotStatus {
    pub fn has_player(self) -> bool {
        !matches!(self, SlotStatus::Open | SlotStatus::Locked)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum SlotTeam {
    #[default]
    Neutral = 0,
    Red = 1,
    Blue = 2,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum TeamMode {
    #[default]
    HeadToHead = 0,
    TagCoop = 1,
    TeamVs = 2,
    TagTeamVs = 3,
}

impl TeamMode {
    pub fn is_team_mode(self) -> bool {
        matches!(self, TeamMode::TeamVs | TeamMode::TagTeamVs)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum ScoringMode {
    #[default]
    Score = 0,
    Accuracy = 1,
    Combo = 2,
    ScoreV2 = 3,
}

/// Archived match-lifecycle event kinds (spec §4.5, §6).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    Join,
    Leave,
    Host,
    Start,
    Disband,
    Result,
}
