// cohorts/legacy.rs — override cohorts for older clients (spec §4.1).
//
// Each cohort below only registers what actually differs from its
// parent; everything else resolves by walking the chain (registry.rs
// `resolve`/`walk`). Grounded on spec.md §4.1's enumerated shape
// differences and cross-checked against original_source/app/protocol.py
// (the b323 gzip-framing boundary, `connection_timeout`).

use bancho_common::packets::ResponseKind;

use crate::cohorts::modern::MODERN_KEY;
use crate::registry::{Capabilities, Cohort};

/// b20121223: `USER_PRESENCE_SINGLE`/`USER_PRESENCE_BUNDLE` don't exist
/// yet; presence updates for individual users ride the legacy
/// `UserPresence` id instead.
pub const PRE_BUNDLE_KEY: i32 = 20121223;

/// b1710: no `MatchInvite` packet; inviting a player degrades to a
/// private message from the inviter (handled at the session layer, not
/// here — this cohort just turns the capability flag off).
pub const PRE_INVITE_KEY: i32 = 1710;

/// b1700: presence and stats are still one combined packet.
pub const PRE_SPLIT_PRESENCE_KEY: i32 = 1700;

/// b590: `LOGIN_REPLY` negative codes below -2 get clamped to -1 by the
/// client, so the server must not send anything more specific.
pub const CLAMP_LOGIN_ERRORS_KEY: i32 = 590;

/// b558: same clamp behavior one cohort further back; kept distinct
/// because it predates b590's unrelated IRC bridging changes.
pub const CLAMP_LOGIN_ERRORS_LEGACY_KEY: i32 = 558;

/// b323: gzip-compressed framing with no explicit compressed-flag byte,
/// and `bMatch` has no per-slot mods/freemod/seed fields. This is the
/// boundary original_source/app/protocol.py checks explicitly
/// (`if retention_version <= 323: data = gzip.compress(data)`).
pub const GZIP_FRAMING_KEY: i32 = 323;

/// b319: the combined presence+stats packet also carries an extra
/// leading "has this player's info changed" bool the modern cohorts
/// dropped once presence/stats split out.
pub const COMBINED_UPDATE_FLAG_KEY: i32 = 319;

pub fn build_all() -> Vec<Cohort> {
    vec![
        Cohort::new(PRE_BUNDLE_KEY, Some(MODERN_KEY)).with_capabilities(Capabilities {
            presence_bundle: false,
            ..Default::default()
        }),
        Cohort::new(PRE_INVITE_KEY, Some(PRE_BUNDLE_KEY)).with_capabilities(Capabilities {
            presence_bundle: false,
            invite_packet: false,
            // spec §4.1: IRC_JOIN/IRC_QUIT represent departures on every
            // cohort <= 1710, including 1710 itself.
            irc_bot_packets: true,
            ..Default::default()
        }),
        Cohort::new(PRE_SPLIT_PRESENCE_KEY, Some(PRE_INVITE_KEY))
            .with_capabilities(Capabilities {
                presence_bundle: false,
                invite_packet: false,
                split_presence: false,
                irc_bot_packets: true,
                ..Default::default()
            })
            // Combined cohorts route presence through the UserPresence id;
            // UserStats id is unused but left mapped so dispatcher lookups
            // by kind never hit a hole.
            .override_response_id(ResponseKind::UserPresence, 59),
        Cohort::new(CLAMP_LOGIN_ERRORS_KEY, Some(PRE_SPLIT_PRESENCE_KEY))
            .with_capabilities(Capabilities {
                presence_bundle: false,
                invite_packet: false,
                split_presence: false,
                irc_bot_packets: true,
                clamp_login_errors: true,
                ..Default::default()
            }),
        Cohort::new(
            CLAMP_LOGIN_ERRORS_LEGACY_KEY,
            Some(CLAMP_LOGIN_ERRORS_KEY),
        )
        .with_capabilities(Capabilities {
            presence_bundle: false,
            invite_packet: false,
            split_presence: false,
            irc_bot_packets: true,
            clamp_login_errors: true,
            ..Default::default()
        }),
        Cohort::new(GZIP_FRAMING_KEY, Some(CLAMP_LOGIN_ERRORS_LEGACY_KEY))
            .with_capabilities(Capabilities {
                presence_bundle: false,
                invite_packet: false,
                split_presence: false,
                irc_bot_packets: true,
                clamp_login_errors: true,
                legacy_compressed_framing: true,
                match_slot_count: 8,
                match_has_freemod_fields: false,
            }),
        Cohort::new(COMBINED_UPDATE_FLAG_KEY, Some(GZIP_FRAMING_KEY))
            .with_capabilities(Capabilities {
                presence_bundle: false,
                invite_packet: false,
                split_presence: false,
                irc_bot_packets: true,
                clamp_login_errors: true,
                legacy_compressed_framing: true,
                combined_has_update_flag: true,
                match_slot_count: 8,
                match_has_freemod_fields: false,
            }),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cohorts::modern;
    use crate::registry::Registry;

    fn build_registry() -> Registry {
        let mut reg = Registry::new();
        reg.register(modern::build());
        for cohort in build_all() {
            reg.register(cohort);
        }
        reg
    }

    #[test]
    fn oldest_cohort_inherits_modern_request_ids() {
        let reg = build_registry();
        let resolved = reg.resolve(COMBINED_UPDATE_FLAG_KEY);
        assert!(resolved
            .id_by_request
            .get(&bancho_common::packets::RequestKind::Logout)
            .is_some());
    }

    #[test]
    fn gzip_boundary_capability_is_set_from_323_downward() {
        let reg = build_registry();
        assert!(reg.capabilities(GZIP_FRAMING_KEY).legacy_compressed_framing);
        assert!(reg
            .capabilities(COMBINED_UPDATE_FLAG_KEY)
            .legacy_compressed_framing);
        assert!(!reg
            .capabilities(CLAMP_LOGIN_ERRORS_LEGACY_KEY)
            .legacy_compressed_framing);
    }
}
