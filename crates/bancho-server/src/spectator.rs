// spectator.rs — spectator group attach/detach (spec §4.6)
//
// Per SPEC_FULL §12 Open Question 1: teardown is routed directly through
// this module rather than through string-matched channel-name
// comparison. The `#spec_<host>` channel is created on first attach and
// dropped once the host's observer set is empty, mirroring the
// teacher's create-on-demand idiom for dynamic per-entity state (e.g.
// per-client download state created on first use in sv_user.rs).

use std::sync::Arc;

use bancho_common::packets::ResponseKind;
use bancho_protocol::encode::EncodePayload;

use crate::channel::Channel;
use crate::session::Session;
use crate::state::ServerState;

fn spec_channel_name(host: i32) -> String {
    format!("#spec_{}", host)
}

fn ensure_spec_channel(state: &ServerState, host: &Session) -> Arc<Channel> {
    let name = spec_channel_name(host.id());
    if let Some(existing) = state.registries.channels.get(&name) {
        return existing;
    }
    let channel = Arc::new(Channel::new(name, "spectator chat", false));
    state.registries.channels.insert(channel.clone());
    channel
}

/// `START_SPECTATING(id)` (spec §4.6). If the caller is already
/// spectating someone, or is already one of `host`'s observers, this is
/// treated as a stop-spectating instead.
pub fn start_spectating(state: &ServerState, observer: &Arc<Session>, host_id: i32) {
    if observer.spectating().is_some() || observer.is_spectating_of(host_id) {
        stop_spectating(state, observer);
        return;
    }
    let Some(host) = state.registries.players.by_id(host_id) else {
        return;
    };

    let channel = ensure_spec_channel(state, &host);
    if !channel.has_member(host.id()) {
        channel.add(&host, &state.registries.players, &state.protocol);
    }
    channel.add(observer, &state.registries.players, &state.protocol);

    for existing_id in host.spectators() {
        if let Some(existing) = state.registries.players.by_id(existing_id) {
            existing.send(
                &state.protocol,
                ResponseKind::FellowSpectatorJoined,
                &EncodePayload::FellowSpectatorJoined(observer.id()),
            );
        }
    }

    host.add_spectator(observer.id());
    observer.set_spectating(Some(host_id));
    host.send(
        &state.protocol,
        ResponseKind::SpectatorJoined,
        &EncodePayload::SpectatorJoined(observer.id()),
    );
}

/// `STOP_SPECTATING` (spec §4.6).
pub fn stop_spectating(state: &ServerState, observer: &Arc<Session>) {
    let Some(host_id) = observer.spectating() else {
        return;
    };
    observer.set_spectating(None);
    let Some(host) = state.registries.players.by_id(host_id) else {
        return;
    };

    let now_empty = host.remove_spectator(observer.id());
    if let Some(channel) = state.registries.channels.get(&spec_channel_name(host_id)) {
        channel.remove(observer);
        if now_empty {
            channel.remove(&host);
        }
    }

    host.send(
        &state.protocol,
        ResponseKind::SpectatorLeft,
        &EncodePayload::SpectatorLeft(observer.id()),
    );
    for remaining_id in host.spectators() {
        if let Some(remaining) = state.registries.players.by_id(remaining_id) {
            remaining.send(
                &state.protocol,
                ResponseKind::FellowSpectatorLeft,
                &EncodePayload::FellowSpectatorLeft(observer.id()),
            );
        }
    }
}

/// `CANT_SPECTATE(id)`: broadcast to the host and fellow observers (spec
/// §4.6).
pub fn cant_spectate(state: &ServerState, observer: &Session, host_id: i32) {
    let Some(host) = state.registries.players.by_id(host_id) else {
        return;
    };
    host.send(
        &state.protocol,
        ResponseKind::SpectatorCantSpectate,
        &EncodePayload::SpectatorCantSpectate(observer.id()),
    );
    for fellow_id in host.spectators() {
        if fellow_id == observer.id() {
            continue;
        }
        if let Some(fellow) = state.registries.players.by_id(fellow_id) {
            fellow.send(
                &state.protocol,
                ResponseKind::SpectatorCantSpectate,
                &EncodePayload::SpectatorCantSpectate(observer.id()),
            );
        }
    }
}

/// `SEND_FRAMES(bundle)`: fan the bundle to every observer unmodified
/// (spec §4.6).
pub fn relay_frames(state: &ServerState, host: &Session, bundle: Vec<u8>) {
    for observer_id in host.spectators() {
        if let Some(observer) = state.registries.players.by_id(observer_id) {
            observer.send(
                &state.protocol,
                ResponseKind::SpectateFrames,
                &EncodePayload::SpectateFrames(bundle.clone()),
            );
        }
    }
}

/// Host disconnect teardown (spec §4.2 "if spectating ... kick the host
/// out of `#spec_*` if it became empty", and scenario 6).
pub fn detach_all_observers(state: &ServerState, host: &Session) {
    for observer_id in host.spectators() {
        if let Some(observer) = state.registries.players.by_id(observer_id) {
            observer.set_spectating(None);
            observer.send(
                &state.protocol,
                ResponseKind::SpectatorLeft,
                &EncodePayload::SpectatorLeft(host.id()),
            );
        }
    }
    state.registries.channels.remove(&spec_channel_name(host.id()));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::external::fakes::null_collaborators;
    use crate::session::test_support::test_session;
    use bancho_common::config::ServerConfig;

    fn state() -> ServerState {
        ServerState::new(
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
        )
    }

    #[test]
    fn attach_then_detach_leaves_no_spectator_channel() {
        let st = state();
        let host = test_session(1, "host");
        let observer = test_session(2, "observer");
        st.registries.players.insert(host.clone());
        st.registries.players.insert(observer.clone());

        start_spectating(&st, &observer, 1);
        assert!(host.has_spectators());
        assert!(st.registries.channels.contains("#spec_1"));

        stop_spectating(&st, &observer);
        assert!(!host.has_spectators());
        assert!(!st.registries.channels.contains("#spec_1"));
    }

    #[test]
    fn second_start_spectating_call_is_treated_as_stop() {
        let st = state();
        let host = test_session(1, "host");
        let observer = test_session(2, "observer");
        st.registries.players.insert(host.clone());
        st.registries.players.insert(observer.clone());

        start_spectating(&st, &observer, 1);
        start_spectating(&st, &observer, 1);
        assert!(!host.has_spectators());
    }
}
