// handlers/presence.rs — status/presence request handlers (spec §4.2, §4.3)

use std::sync::Arc;

use bancho_common::error::HandlerError;
use bancho_common::packets::ResponseKind;
use bancho_protocol::decode::DecodedArgs;
use bancho_protocol::encode::{EncodePayload, PresencePayload, StatsPayload};

use crate::session::Session;
use crate::state::ServerState;

pub fn presence_payload(session: &Session) -> PresencePayload {
    PresencePayload {
        user_id: session.id(),
        username: session.username(),
        utc_offset: session.utc_offset() as i8,
        country_code: 0,
        permissions_icon: session.permissions().bits() as u8,
        longitude: 0.0,
        latitude: 0.0,
        global_rank: session.stats().global_rank,
    }
}

pub fn stats_payload(session: &Session) -> StatsPayload {
    StatsPayload {
        user_id: session.id(),
        status: session.status(),
        stats: session.stats(),
    }
}

/// Sends `target`'s presence+stats to `to`, respecting per-cohort shape
/// (spec §4.1: legacy cohorts get the combined packet instead of the two
/// split ones).
pub fn send_presence(state: &Arc<ServerState>, to: &Session, target: &Session) {
    let caps = to.table().capabilities;
    if caps.split_presence {
        to.send(
            &state.protocol,
            ResponseKind::UserPresence,
            &EncodePayload::UserPresence(presence_payload(target)),
        );
        to.send(
            &state.protocol,
            ResponseKind::UserStats,
            &EncodePayload::UserStats(stats_payload(target)),
        );
    } else {
        // Legacy combined packet degrades onto the same logical kind;
        // the cohort's own encoder table produces the merged wire shape.
        to.send(
            &state.protocol,
            ResponseKind::UserStats,
            &EncodePayload::UserStats(stats_payload(target)),
        );
    }
}

pub fn change_action(
    state: &Arc<ServerState>,
    session: &Arc<Session>,
    args: DecodedArgs,
) -> Result<(), HandlerError> {
    let DecodedArgs::ChangeAction(status) = args else {
        return Ok(());
    };
    session.set_status(status);
    for other in state.registries.players.snapshot() {
        if other.id() == session.id() {
            continue;
        }
        send_presence(state, &other, session);
    }
    Ok(())
}

pub fn request_status_update(
    state: &Arc<ServerState>,
    session: &Arc<Session>,
    _args: DecodedArgs,
) -> Result<(), HandlerError> {
    session.send(
        &state.protocol,
        ResponseKind::UserStats,
        &EncodePayload::UserStats(stats_payload(session)),
    );
    Ok(())
}

/// `PONG`: no reply of its own. `last_response` is already stamped by the
/// transport on every inbound frame (spec §4.2 "LIVE loop"); this handler
/// exists only so the request kind has a registered entry.
pub fn pong(
    _state: &Arc<ServerState>,
    _session: &Arc<Session>,
    _args: DecodedArgs,
) -> Result<(), HandlerError> {
    Ok(())
}

pub fn user_presence_request(
    state: &Arc<ServerState>,
    session: &Arc<Session>,
    args: DecodedArgs,
) -> Result<(), HandlerError> {
    let DecodedArgs::UserPresenceRequest(ids) = args else {
        return Ok(());
    };
    for id in ids {
        if let Some(target) = state.registries.players.by_id(id) {
            send_presence(state, session, &target);
        }
    }
    Ok(())
}

pub fn user_presence_request_all(
    state: &Arc<ServerState>,
    session: &Arc<Session>,
    _args: DecodedArgs,
) -> Result<(), HandlerError> {
    for target in state.registries.players.snapshot() {
        if target.id() == session.id() {
            continue;
        }
        send_presence(state, session, &target);
    }
    Ok(())
}

/// `ERROR_REPORT`: client-side crash/stack-trace telemetry. Nothing in
/// scope here consumes it beyond the access log.
pub fn error_report(
    _state: &Arc<ServerState>,
    session: &Arc<Session>,
    args: DecodedArgs,
) -> Result<(), HandlerError> {
    if let DecodedArgs::ErrorReport(report) = args {
        log::warn!("client error report from {}: {}", session.username(), report);
    }
    Ok(())
}

pub fn toggle_block_nonfriend_dm(
    _state: &Arc<ServerState>,
    session: &Arc<Session>,
    args: DecodedArgs,
) -> Result<(), HandlerError> {
    if let DecodedArgs::UserToggleBlockNonFriendDm(blocked) = args {
        session.set_blocks_nonfriend_dms(blocked);
    }
    Ok(())
}
