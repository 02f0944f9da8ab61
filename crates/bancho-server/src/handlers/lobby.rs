// handlers/lobby.rs — lobby membership, friends and logout (spec §4.2, §4.3)

use std::sync::Arc;

use bancho_common::error::HandlerError;
use bancho_common::packets::ResponseKind;
use bancho_protocol::decode::DecodedArgs;
use bancho_protocol::encode::EncodePayload;

use crate::handlers::multiplayer;
use crate::multiplayer::to_payload;
use crate::session::Session;
use crate::spectator;
use crate::state::ServerState;

/// `JOIN_LOBBY`: marks the session as a lobby browser and replays every
/// live match as a `NEW_MATCH` so the client's match list starts in
/// sync (spec §4.3).
pub fn join_lobby(
    state: &Arc<ServerState>,
    session: &Arc<Session>,
    _args: DecodedArgs,
) -> Result<(), HandlerError> {
    state.registries.lobby.join(session.id());
    for m in state.registries.matches.snapshot() {
        let payload = to_payload(&m.lock());
        session.send(&state.protocol, ResponseKind::NewMatch, &EncodePayload::NewMatch(payload));
    }
    Ok(())
}

pub fn part_lobby(
    state: &Arc<ServerState>,
    session: &Arc<Session>,
    _args: DecodedArgs,
) -> Result<(), HandlerError> {
    state.registries.lobby.part(session.id());
    Ok(())
}

pub fn friend_add(
    state: &Arc<ServerState>,
    session: &Arc<Session>,
    args: DecodedArgs,
) -> Result<(), HandlerError> {
    let DecodedArgs::FriendAdd(target_id) = args else {
        return Ok(());
    };
    session.add_friend(target_id);
    state
        .collaborators
        .relationships
        .create(session.id() as i64, target_id as i64);
    Ok(())
}

pub fn friend_remove(
    state: &Arc<ServerState>,
    session: &Arc<Session>,
    args: DecodedArgs,
) -> Result<(), HandlerError> {
    let DecodedArgs::FriendRemove(target_id) = args else {
        return Ok(());
    };
    session.remove_friend(target_id);
    state
        .collaborators
        .relationships
        .delete(session.id() as i64, target_id as i64);
    Ok(())
}

/// `LOGOUT` (spec §4.2 epilogue): leaves every joined channel, tears
/// down spectating in both directions, leaves the lobby and any seated
/// match, and removes the session from the player registry before
/// broadcasting the departure to everyone else still connected (unless
/// another tourney client of the same principal remains, spec §4.2).
pub fn logout(
    state: &Arc<ServerState>,
    session: &Arc<Session>,
    _args: DecodedArgs,
) -> Result<(), HandlerError> {
    for name in session.joined_channels() {
        if let Some(channel) = state.registries.channels.get(&name) {
            channel.remove(session);
        }
    }
    spectator::stop_spectating(state, session);
    spectator::detach_all_observers(state, session);
    if session.match_id().is_some() {
        multiplayer::part_match(state, session, DecodedArgs::PartMatch)?;
    }
    state.registries.lobby.part(session.id());
    state.registries.players.remove(session.id());
    state.registries.tourney.remove(session.id(), session.remote_addr());

    if state.registries.tourney.count(session.id()) == 0 {
        for other in state.registries.players.snapshot() {
            let caps = other.table().capabilities;
            if caps.irc_bot_packets {
                other.send(
                    &state.protocol,
                    ResponseKind::IrcQuit,
                    &EncodePayload::IrcQuit(session.username()),
                );
            } else {
                other.send(
                    &state.protocol,
                    ResponseKind::UserLogout,
                    &EncodePayload::UserLogout(session.id()),
                );
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::external::fakes::null_collaborators;
    use crate::session::test_support::test_session;
    use bancho_common::config::ServerConfig;

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
    fn join_then_part_lobby_toggles_membership() {
        let st = state();
        let s = test_session(1, "a");
        join_lobby(&st, &s, DecodedArgs::JoinLobby).unwrap();
        assert!(st.registries.lobby.contains(1));
        part_lobby(&st, &s, DecodedArgs::PartLobby).unwrap();
        assert!(!st.registries.lobby.contains(1));
    }

    #[test]
    fn friend_add_remove_round_trips() {
        let st = state();
        let s = test_session(1, "a");
        friend_add(&st, &s, DecodedArgs::FriendAdd(2)).unwrap();
        assert!(s.is_friend(2));
        friend_remove(&st, &s, DecodedArgs::FriendRemove(2)).unwrap();
        assert!(!s.is_friend(2));
    }

    #[test]
    fn logout_removes_session_from_registry() {
        let st = state();
        let s = test_session(1, "a");
        st.registries.players.insert(s.clone());
        logout(&st, &s, DecodedArgs::Logout).unwrap();
        assert!(st.registries.players.by_id(1).is_none());
    }
}
