pub mod match_;
pub mod slot;

use bancho_protocol::encode::{MatchPayload, SlotSnapshot};

use match_::{Match, SLOT_COUNT};

/// Bridges the pure match model onto the wire-level payload shape
/// (`bancho-protocol::encode::MatchPayload`). Kept separate from
/// `match_.rs` so the state machine has no wire-codec dependency.
pub fn to_payload(m: &Match) -> MatchPayload {
    let slots: [SlotSnapshot; SLOT_COUNT] = std::array::from_fn(|i| {
        let slot = &m.slots[i];
        SlotSnapshot {
            status: slot.status,
            team: slot.team,
            mods: slot.mods,
            player_id: slot.player,
        }
    });
    MatchPayload {
        id: m.id,
        in_progress: m.in_progress,
        mods: m.mods,
        name: m.name.clone(),
        password_set: !m.password.is_empty(),
        beatmap_name: m.beatmap.name.clone(),
        beatmap_id: m.beatmap.id,
        beatmap_md5: m.beatmap.md5.clone(),
        slots,
        host_id: m.host,
        mode: m.mode,
        team_mode: m.team_mode,
        scoring_mode: m.scoring_mode,
        freemod: m.freemod,
        seed: m.id,
    }
}
