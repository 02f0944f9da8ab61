// handlers/channel.rs — channel join/part request handlers (spec §4.4)

use std::sync::Arc;

use bancho_common::error::HandlerError;
use bancho_protocol::decode::DecodedArgs;

use crate::session::Session;
use crate::state::ServerState;

pub fn channel_join(
    state: &Arc<ServerState>,
    session: &Arc<Session>,
    args: DecodedArgs,
) -> Result<(), HandlerError> {
    let DecodedArgs::ChannelJoin(name) = args else {
        return Ok(());
    };
    let Some(channel) = state.registries.channels.get(&name) else {
        return Err(HandlerError::Rejected("no such channel"));
    };
    channel.add(session, &state.registries.players, &state.protocol);
    Ok(())
}

pub fn channel_part(
    _state: &Arc<ServerState>,
    session: &Arc<Session>,
    args: DecodedArgs,
) -> Result<(), HandlerError> {
    let DecodedArgs::ChannelPart(name) = args else {
        return Ok(());
    };
    if let Some(channel) = _state.registries.channels.get(&name) {
        channel.remove(session);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::Channel;
    use crate::external::fakes::null_collaborators;
    use crate::session::test_support::test_session;
    use bancho_common::config::ServerConfig;
    use std::sync::Arc;

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
    fn join_then_part_round_trips_membership() {
        let st = state();
        st.registries
            .channels
            .insert(Arc::new(Channel::new("#osu", "general", true)));
        let s = test_session(1, "peppy");
        st.registries.players.insert(s.clone());

        channel_join(&st, &s, DecodedArgs::ChannelJoin("#osu".into())).unwrap();
        assert!(st.registries.channels.get("#osu").unwrap().has_member(1));

        channel_part(&st, &s, DecodedArgs::ChannelPart("#osu".into())).unwrap();
        assert!(!st.registries.channels.get("#osu").unwrap().has_member(1));
    }

    #[test]
    fn join_unknown_channel_is_rejected() {
        let st = state();
        let s = test_session(1, "peppy");
        assert!(channel_join(&st, &s, DecodedArgs::ChannelJoin("#nope".into())).is_err());
    }
}
