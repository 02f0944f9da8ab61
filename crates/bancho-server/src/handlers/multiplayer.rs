// handlers/multiplayer.rs — multiplayer match request handlers (spec §4.5)
//
// Each handler takes the per-match lock just long enough to run one
// `Match` state-machine method (design note §9 "per-match
// serialization"), then re-derives the wire payload and fans it out:
// `UpdateMatch` to everyone browsing the lobby and to the match's own
// `#multi_<id>` channel, so a participant's own client and the lobby
// list stay in sync from the same snapshot.

use std::sync::Arc;

use bancho_common::error::HandlerError;
use bancho_common::match_types::EventKind;
use bancho_common::packets::ResponseKind;
use bancho_protocol::decode::DecodedArgs;
use bancho_protocol::encode::EncodePayload;

use crate::channel::Channel;
use crate::multiplayer::match_::{BeatmapRef, JoinError, LockEffect, Match};
use crate::multiplayer::to_payload;
use crate::session::Session;
use crate::state::ServerState;

fn match_channel_name(id: i32) -> String {
    format!("#multi_{}", id)
}

fn ensure_match_channel(state: &ServerState, id: i32) -> Arc<Channel> {
    let name = match_channel_name(id);
    if let Some(existing) = state.registries.channels.get(&name) {
        return existing;
    }
    let channel = Arc::new(Channel::new(name, "multiplayer", false));
    state.registries.channels.insert(channel.clone());
    channel
}

/// Sends the match's current snapshot to every lobby browser and to
/// every session already seated in its channel.
fn broadcast_update(state: &ServerState, id: i32, m: &Match) {
    let payload = to_payload(m);
    for lobby_id in state.registries.lobby.members() {
        if let Some(player) = state.registries.players.by_id(lobby_id) {
            player.send(
                &state.protocol,
                ResponseKind::UpdateMatch,
                &EncodePayload::UpdateMatch(payload.clone()),
            );
        }
    }
    if let Some(channel) = state.registries.channels.get(&match_channel_name(id)) {
        for member_id in channel.members() {
            if let Some(player) = state.registries.players.by_id(member_id) {
                player.send(
                    &state.protocol,
                    ResponseKind::UpdateMatch,
                    &EncodePayload::UpdateMatch(payload.clone()),
                );
            }
        }
    }
}

fn broadcast_to_participants(state: &ServerState, id: i32, kind: ResponseKind, payload: &EncodePayload) {
    if let Some(channel) = state.registries.channels.get(&match_channel_name(id)) {
        for member_id in channel.members() {
            if let Some(player) = state.registries.players.by_id(member_id) {
                player.send(&state.protocol, kind, payload);
            }
        }
    }
}

fn disband(state: &ServerState, id: i32) {
    state.registries.matches.remove(id);
    if let Some(channel) = state.registries.channels.remove(&match_channel_name(id)) {
        for member_id in channel.members() {
            if let Some(player) = state.registries.players.by_id(member_id) {
                player.set_match_id(None);
            }
        }
    }
    if state
        .collaborators
        .events
        .fetch_last_by_type(id as i64, EventKind::Start)
        .is_some()
    {
        state.collaborators.matches.mark_ended(id as i64);
    } else {
        state.collaborators.matches.delete(id as i64);
    }
    for lobby_id in state.registries.lobby.members() {
        if let Some(player) = state.registries.players.by_id(lobby_id) {
            player.send(
                &state.protocol,
                ResponseKind::DisbandMatch,
                &EncodePayload::DisbandMatch(id),
            );
        }
    }
}

pub fn create_match(
    state: &Arc<ServerState>,
    session: &Arc<Session>,
    args: DecodedArgs,
) -> Result<(), HandlerError> {
    let DecodedArgs::CreateMatch(new) = args else {
        return Ok(());
    };
    let host_id = session.id();
    let name = new.name.clone();
    let handle = state
        .registries
        .matches
        .create(move |id| {
            let mut m = Match::new(id, new.name, new.password, host_id);
            m.beatmap = BeatmapRef {
                id: new.beatmap_id,
                md5: new.beatmap_md5,
                name: new.beatmap_name,
            };
            m.mode = new.mode;
            m.team_mode = new.team_mode;
            m.scoring_mode = new.scoring_mode;
            m.mods = new.mods;
            m
        })
        .ok_or(HandlerError::Rejected("no free match slots"))?;

    let id = handle.lock().id;
    let channel = ensure_match_channel(state, id);
    channel.add(session, &state.registries.players, &state.protocol);
    session.set_match_id(Some(id));
    state.collaborators.matches.create(&name, host_id as i64);
    state.collaborators.events.create(id as i64, EventKind::Join, host_id.to_string());

    let payload = to_payload(&handle.lock());
    session.send(
        &state.protocol,
        ResponseKind::MatchJoinSuccess,
        &EncodePayload::MatchJoinSuccess(payload.clone()),
    );
    for lobby_id in state.registries.lobby.members() {
        if let Some(player) = state.registries.players.by_id(lobby_id) {
            player.send(
                &state.protocol,
                ResponseKind::NewMatch,
                &EncodePayload::NewMatch(payload.clone()),
            );
        }
    }
    Ok(())
}

pub fn join_match(
    state: &Arc<ServerState>,
    session: &Arc<Session>,
    args: DecodedArgs,
) -> Result<(), HandlerError> {
    let DecodedArgs::JoinMatch { match_id, password } = args else {
        return Ok(());
    };
    let Some(handle) = state.registries.matches.get(match_id) else {
        session.send(&state.protocol, ResponseKind::MatchJoinFail, &EncodePayload::MatchJoinFail);
        return Ok(());
    };
    let join_result = handle.lock().join(session.id(), &password);
    match join_result {
        Ok(_) => {
            let channel = ensure_match_channel(state, match_id);
            channel.add(session, &state.registries.players, &state.protocol);
            session.set_match_id(Some(match_id));
            state
                .collaborators
                .events
                .create(match_id as i64, EventKind::Join, session.id().to_string());

            let payload = to_payload(&handle.lock());
            session.send(
                &state.protocol,
                ResponseKind::MatchJoinSuccess,
                &EncodePayload::MatchJoinSuccess(payload),
            );
            broadcast_update(state, match_id, &handle.lock());
            Ok(())
        }
        Err(JoinError::BadPassword | JoinError::Banned | JoinError::Full) => {
            session.send(&state.protocol, ResponseKind::MatchJoinFail, &EncodePayload::MatchJoinFail);
            Ok(())
        }
    }
}

pub fn part_match(
    state: &Arc<ServerState>,
    session: &Arc<Session>,
    _args: DecodedArgs,
) -> Result<(), HandlerError> {
    let Some(match_id) = session.match_id() else {
        return Ok(());
    };
    let Some(handle) = state.registries.matches.get(match_id) else {
        session.set_match_id(None);
        return Ok(());
    };
    let outcome = handle.lock().leave(session.id());
    session.set_match_id(None);
    if let Some(channel) = state.registries.channels.get(&match_channel_name(match_id)) {
        channel.remove(session);
    }
    state
        .collaborators
        .events
        .create(match_id as i64, EventKind::Leave, session.id().to_string());

    if outcome.disbanded {
        state
            .collaborators
            .events
            .create(match_id as i64, EventKind::Disband, String::new());
        disband(state, match_id);
    } else {
        if let Some(new_host) = outcome.host_rotated_to {
            state
                .collaborators
                .events
                .create(match_id as i64, EventKind::Host, new_host.to_string());
            broadcast_to_participants(
                state,
                match_id,
                ResponseKind::MatchTransferHost,
                &EncodePayload::MatchTransferHost,
            );
        }
        broadcast_update(state, match_id, &handle.lock());
    }
    Ok(())
}

/// Looks up the match the caller is currently seated in, or rejects.
fn seated_match(state: &ServerState, session: &Session) -> Result<(i32, Arc<parking_lot::Mutex<Match>>), HandlerError> {
    let match_id = session
        .match_id()
        .ok_or(HandlerError::Rejected("not in a match"))?;
    let handle = state
        .registries
        .matches
        .get(match_id)
        .ok_or(HandlerError::Rejected("match no longer exists"))?;
    Ok((match_id, handle))
}

pub fn change_slot(
    state: &Arc<ServerState>,
    session: &Arc<Session>,
    args: DecodedArgs,
) -> Result<(), HandlerError> {
    let DecodedArgs::MatchChangeSlot(target) = args else {
        return Ok(());
    };
    let (id, handle) = seated_match(state, session)?;
    handle.lock().change_slot(session.id(), target as usize);
    broadcast_update(state, id, &handle.lock());
    Ok(())
}

pub fn match_lock(
    state: &Arc<ServerState>,
    session: &Arc<Session>,
    args: DecodedArgs,
) -> Result<(), HandlerError> {
    let DecodedArgs::MatchLock(slot_id) = args else {
        return Ok(());
    };
    let (id, handle) = seated_match(state, session)?;
    let effect = handle.lock().lock_slot(session.id(), slot_id as usize);
    if let Some(LockEffect::KickedPlayer(kicked)) = effect {
        if let Some(kicked_session) = state.registries.players.by_id(kicked) {
            kicked_session.set_match_id(None);
            if let Some(channel) = state.registries.channels.get(&match_channel_name(id)) {
                channel.remove(&kicked_session);
            }
        }
    }
    broadcast_update(state, id, &handle.lock());
    Ok(())
}

pub fn change_team(
    state: &Arc<ServerState>,
    session: &Arc<Session>,
    _args: DecodedArgs,
) -> Result<(), HandlerError> {
    let (id, handle) = seated_match(state, session)?;
    handle.lock().change_team(session.id());
    broadcast_update(state, id, &handle.lock());
    Ok(())
}

pub fn change_password(
    state: &Arc<ServerState>,
    session: &Arc<Session>,
    args: DecodedArgs,
) -> Result<(), HandlerError> {
    let DecodedArgs::MatchChangePassword(password) = args else {
        return Ok(());
    };
    let (id, handle) = seated_match(state, session)?;
    {
        let mut m = handle.lock();
        if m.host == session.id() {
            m.password = password;
        }
    }
    broadcast_update(state, id, &handle.lock());
    Ok(())
}

pub fn change_settings(
    state: &Arc<ServerState>,
    session: &Arc<Session>,
    args: DecodedArgs,
) -> Result<(), HandlerError> {
    let DecodedArgs::MatchChangeSettings(settings) = args else {
        return Ok(());
    };
    let (id, handle) = seated_match(state, session)?;
    {
        let mut m = handle.lock();
        if m.host != session.id() {
            return Err(HandlerError::Rejected("only the host may change settings"));
        }
        if m.beatmap.id != settings.beatmap_id {
            m.previous_beatmap = m.beatmap.clone();
        }
        m.name = settings.name;
        m.password = settings.password;
        m.beatmap = BeatmapRef {
            id: settings.beatmap_id,
            md5: settings.beatmap_md5,
            name: settings.beatmap_name,
        };
        m.mode = settings.mode;
        m.team_mode = settings.team_mode;
        m.scoring_mode = settings.scoring_mode;
        m.freemod = settings.freemod;
        m.normalize_mods();
        m.unready_all();
    }
    broadcast_update(state, id, &handle.lock());
    Ok(())
}

pub fn change_mods(
    state: &Arc<ServerState>,
    session: &Arc<Session>,
    args: DecodedArgs,
) -> Result<(), HandlerError> {
    let DecodedArgs::MatchChangeMods(mods) = args else {
        return Ok(());
    };
    let (id, handle) = seated_match(state, session)?;
    {
        let mut m = handle.lock();
        if m.freemod && m.host != session.id() {
            if let Some(idx) = m.find_player_slot(session.id()) {
                m.slots[idx].mods = mods;
            }
        } else if m.host == session.id() {
            m.mods = mods;
        }
        m.normalize_mods();
        m.unready_all();
    }
    broadcast_update(state, id, &handle.lock());
    Ok(())
}

pub fn match_ready(
    state: &Arc<ServerState>,
    session: &Arc<Session>,
    _args: DecodedArgs,
) -> Result<(), HandlerError> {
    set_slot_status_ready(state, session, true)
}

pub fn match_not_ready(
    state: &Arc<ServerState>,
    session: &Arc<Session>,
    _args: DecodedArgs,
) -> Result<(), HandlerError> {
    set_slot_status_ready(state, session, false)
}

fn set_slot_status_ready(state: &Arc<ServerState>, session: &Arc<Session>, ready: bool) -> Result<(), HandlerError> {
    use bancho_common::match_types::SlotStatus;
    let (id, handle) = seated_match(state, session)?;
    {
        let mut m = handle.lock();
        if let Some(idx) = m.find_player_slot(session.id()) {
            m.slots[idx].status = if ready { SlotStatus::Ready } else { SlotStatus::NotReady };
        }
    }
    broadcast_update(state, id, &handle.lock());
    Ok(())
}

pub fn match_start(
    state: &Arc<ServerState>,
    session: &Arc<Session>,
    _args: DecodedArgs,
) -> Result<(), HandlerError> {
    let (id, handle) = seated_match(state, session)?;
    let started = {
        let mut m = handle.lock();
        if m.host != session.id() {
            return Err(HandlerError::Rejected("only the host may start the match"));
        }
        m.start()
    };
    if started {
        state
            .collaborators
            .events
            .create(id as i64, EventKind::Start, String::new());
        let payload = to_payload(&handle.lock());
        broadcast_to_participants(state, id, ResponseKind::MatchStart, &EncodePayload::MatchStart(payload));
    }
    Ok(())
}

pub fn match_load_complete(
    state: &Arc<ServerState>,
    session: &Arc<Session>,
    _args: DecodedArgs,
) -> Result<(), HandlerError> {
    let (id, handle) = seated_match(state, session)?;
    {
        let mut m = handle.lock();
        if let Some(idx) = m.find_player_slot(session.id()) {
            m.slots[idx].loaded = true;
        }
    }
    if handle.lock().all_playing_loaded() {
        broadcast_to_participants(state, id, ResponseKind::MatchAllPlayersLoaded, &EncodePayload::MatchAllPlayersLoaded);
    }
    Ok(())
}

pub fn match_skip_request(
    state: &Arc<ServerState>,
    session: &Arc<Session>,
    _args: DecodedArgs,
) -> Result<(), HandlerError> {
    let (id, handle) = seated_match(state, session)?;
    let slot_idx = {
        let mut m = handle.lock();
        let idx = m.find_player_slot(session.id());
        if let Some(idx) = idx {
            m.slots[idx].skipped = true;
        }
        idx
    };
    if let Some(idx) = slot_idx {
        broadcast_to_participants(
            state,
            id,
            ResponseKind::MatchPlayerSkipped,
            &EncodePayload::MatchPlayerSkipped(idx as i32),
        );
    }
    if handle.lock().all_playing_skipped() {
        broadcast_to_participants(state, id, ResponseKind::MatchSkip, &EncodePayload::MatchSkip);
    }
    Ok(())
}

pub fn match_failed(
    state: &Arc<ServerState>,
    session: &Arc<Session>,
    _args: DecodedArgs,
) -> Result<(), HandlerError> {
    let (id, handle) = seated_match(state, session)?;
    let slot_idx = {
        let mut m = handle.lock();
        let idx = m.find_player_slot(session.id());
        if let Some(idx) = idx {
            m.slots[idx].failed = true;
        }
        idx
    };
    if let Some(idx) = slot_idx {
        broadcast_to_participants(
            state,
            id,
            ResponseKind::MatchPlayerFailed,
            &EncodePayload::MatchPlayerFailed(idx as i32),
        );
    }
    Ok(())
}

pub fn match_no_beatmap(
    state: &Arc<ServerState>,
    session: &Arc<Session>,
    _args: DecodedArgs,
) -> Result<(), HandlerError> {
    use bancho_common::match_types::SlotStatus;
    let (id, handle) = seated_match(state, session)?;
    {
        let mut m = handle.lock();
        if let Some(idx) = m.find_player_slot(session.id()) {
            m.slots[idx].status = SlotStatus::NoMap;
        }
    }
    broadcast_update(state, id, &handle.lock());
    Ok(())
}

pub fn match_has_beatmap(
    state: &Arc<ServerState>,
    session: &Arc<Session>,
    _args: DecodedArgs,
) -> Result<(), HandlerError> {
    use bancho_common::match_types::SlotStatus;
    let (id, handle) = seated_match(state, session)?;
    {
        let mut m = handle.lock();
        if let Some(idx) = m.find_player_slot(session.id()) {
            if m.slots[idx].status == SlotStatus::NoMap {
                m.slots[idx].status = SlotStatus::NotReady;
            }
        }
    }
    broadcast_update(state, id, &handle.lock());
    Ok(())
}

/// Stays on the read path (spec §5) to preserve per-sender frame
/// ordering; the dispatcher registers this with `Dispatch::Inline`.
pub fn score_update(
    state: &Arc<ServerState>,
    session: &Arc<Session>,
    args: DecodedArgs,
) -> Result<(), HandlerError> {
    let DecodedArgs::MatchScoreUpdate(frame) = args else {
        return Ok(());
    };
    let (id, handle) = seated_match(state, session)?;
    let recorded = handle.lock().record_score_frame(session.id(), frame);
    if let Some(frame) = recorded {
        broadcast_to_participants(state, id, ResponseKind::MatchScoreUpdate, &EncodePayload::MatchScoreUpdate(frame));
    }
    Ok(())
}

pub fn match_complete(
    state: &Arc<ServerState>,
    session: &Arc<Session>,
    _args: DecodedArgs,
) -> Result<(), HandlerError> {
    let (id, handle) = seated_match(state, session)?;
    let all_done = handle.lock().complete_slot(session.id());
    if all_done {
        let results = {
            let mut m = handle.lock();
            let results = m.ranked_results();
            m.finish();
            results
        };
        state.collaborators.events.create(
            id as i64,
            EventKind::Result,
            results
                .iter()
                .map(|(player, score)| format!("{player}:{score}"))
                .collect::<Vec<_>>()
                .join(","),
        );
        broadcast_to_participants(state, id, ResponseKind::MatchComplete, &EncodePayload::MatchComplete);
    }
    Ok(())
}

pub fn transfer_host(
    state: &Arc<ServerState>,
    session: &Arc<Session>,
    args: DecodedArgs,
) -> Result<(), HandlerError> {
    let DecodedArgs::MatchTransferHost(new_host) = args else {
        return Ok(());
    };
    let (id, handle) = seated_match(state, session)?;
    {
        let mut m = handle.lock();
        if m.host != session.id() {
            return Err(HandlerError::Rejected("only the host may transfer host"));
        }
        if m.find_player_slot(new_host).is_none() {
            return Err(HandlerError::Rejected("target is not seated in this match"));
        }
        m.host = new_host;
    }
    state
        .collaborators
        .events
        .create(id as i64, EventKind::Host, new_host.to_string());
    broadcast_to_participants(state, id, ResponseKind::MatchTransferHost, &EncodePayload::MatchTransferHost);
    broadcast_update(state, id, &handle.lock());
    Ok(())
}

/// Beatmap metadata lookup is delegated to an external collaborator not
/// modeled here (spec Non-goals); the reply is an empty acknowledgement.
pub fn beatmap_info_request(
    state: &Arc<ServerState>,
    session: &Arc<Session>,
    _args: DecodedArgs,
) -> Result<(), HandlerError> {
    session.send(&state.protocol, ResponseKind::BeatmapInfoReply, &EncodePayload::BeatmapInfoReply);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::external::fakes::null_collaborators;
    use crate::session::test_support::test_session;
    use bancho_common::config::ServerConfig;
    use bancho_protocol::decode::NewMatchArgs;

    fn state() -> Arc<ServerState> {
        Arc::new(ServerState::new(
            ServerConfig {
                ports: vec![13381],
                domain: "t".into(),
                debug: false,
                maintenance: false,
                free_supporter: false,
                menu_icon: None,
                autojoin_channels: vec![],
                min_client_version: 323,
                max_client_version: 20130815,
                http_probe_body: "ok".into(),
            },
            null_collaborators(),
        ))
    }

    #[test]
    fn create_then_join_then_part_disbands_when_last_player_leaves() {
        let st = state();
        let host = test_session(1, "host");
        let guest = test_session(2, "guest");
        st.registries.players.insert(host.clone());
        st.registries.players.insert(guest.clone());

        create_match(&st, &host, DecodedArgs::CreateMatch(NewMatchArgs { name: "m".into(), ..Default::default() })).unwrap();
        assert_eq!(host.match_id(), Some(1));

        join_match(&st, &guest, DecodedArgs::JoinMatch { match_id: 1, password: String::new() }).unwrap();
        assert_eq!(guest.match_id(), Some(1));

        part_match(&st, &guest, DecodedArgs::PartMatch).unwrap();
        assert!(st.registries.matches.get(1).is_some());

        part_match(&st, &host, DecodedArgs::PartMatch).unwrap();
        assert!(st.registries.matches.get(1).is_none());
    }

    #[test]
    fn join_wrong_password_sends_join_fail_not_an_error() {
        let st = state();
        let host = test_session(1, "host");
        let guest = test_session(2, "guest");
        st.registries.players.insert(host.clone());
        st.registries.players.insert(guest.clone());
        create_match(
            &st,
            &host,
            DecodedArgs::CreateMatch(NewMatchArgs {
                name: "m".into(),
                password: "secret".into(),
                ..Default::default()
            }),
        )
        .unwrap();

        join_match(
            &st,
            &guest,
            DecodedArgs::JoinMatch { match_id: 1, password: "wrong".into() },
        )
        .unwrap();
        assert_eq!(guest.match_id(), None);
    }

    #[test]
    fn non_host_cannot_start_match() {
        let st = state();
        let host = test_session(1, "host");
        let guest = test_session(2, "guest");
        st.registries.players.insert(host.clone());
        st.registries.players.insert(guest.clone());
        create_match(&st, &host, DecodedArgs::CreateMatch(NewMatchArgs { name: "m".into(), ..Default::default() })).unwrap();
        join_match(&st, &guest, DecodedArgs::JoinMatch { match_id: 1, password: String::new() }).unwrap();

        assert!(match_start(&st, &guest, DecodedArgs::MatchStart).is_err());
        assert!(match_start(&st, &host, DecodedArgs::MatchStart).is_ok());
    }
}
