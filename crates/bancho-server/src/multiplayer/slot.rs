// multiplayer/slot.rs — one seat in a match (spec §3 "Slot", §4.5)

use bancho_common::match_types::{SlotStatus, SlotTeam};
use bancho_common::mods::Mods;
use bancho_common::status::ScoreFrame;

#[derive(Debug, Clone, Default)]
pub struct Slot {
    pub status: SlotStatus,
    pub team: SlotTeam,
    pub mods: Mods,
    pub player: Option<i32>,
    pub loaded: bool,
    pub skipped: bool,
    pub failed: bool,
    pub last_frame: Option<ScoreFrame>,
}

impl Slot {
    pub fn is_open(&self) -> bool {
        self.status == SlotStatus::Open
    }

    pub fn is_locked(&self) -> bool {
        self.status == SlotStatus::Locked
    }

    pub fn has_player(&self) -> bool {
        self.player.is_some()
    }

    pub fn is_playing(&self) -> bool {
        self.status == SlotStatus::Playing
    }

    /// Resets to an empty, open seat (spec §4.5 "Leave": mark `Open` (or
    /// keep `Locked`)).
    pub fn clear(&mut self, keep_locked: bool) {
        let was_locked = self.is_locked();
        *self = Slot::default();
        if keep_locked && was_locked {
            self.status = SlotStatus::Locked;
        }
    }

    /// `MATCH_CHANGE_SLOT`: the target slot copies the mover's seat.
    pub fn copy_from(&mut self, other: &Slot) {
        self.status = SlotStatus::NotReady;
        self.team = other.team;
        self.mods = other.mods;
        self.player = other.player;
        self.loaded = other.loaded;
        self.skipped = other.skipped;
        self.failed = other.failed;
        self.last_frame = other.last_frame.clone();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clear_preserves_lock_when_requested() {
        let mut slot = Slot {
            status: SlotStatus::Locked,
            player: Some(5),
            ..Default::default()
        };
        slot.clear(true);
        assert_eq!(slot.status, SlotStatus::Locked);
        assert!(slot.player.is_none());
    }

    #[test]
    fn clear_without_keep_locked_opens_the_seat() {
        let mut slot = Slot {
            status: SlotStatus::Locked,
            ..Default::default()
        };
        slot.clear(false);
        assert_eq!(slot.status, SlotStatus::Open);
    }
}
