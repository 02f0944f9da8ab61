// handlers/messaging.rs — public/private chat request handlers (spec §4.7)
//
// Public messages go through `Channel::send_message`, which already
// owns the `!`-command skip, write-permission check, moderated-mode
// suppression, CTCP rewrite and truncation (spec §4.4). This module
// adds the parts that sit above a single channel: the sender's own
// rate limit/silence gate, persistence, and private-message delivery
// (target silenced/blocked/away, tourney-duplicate fan-out).

use std::sync::Arc;

use bancho_common::error::HandlerError;
use bancho_common::packets::ResponseKind;
use bancho_protocol::decode::DecodedArgs;
use bancho_protocol::encode::EncodePayload;

use crate::external::InfringementAction;
use crate::session::Session;
use crate::state::ServerState;
use crate::time::unix_now;

const SPAM_SILENCE_SECS: i64 = 60;

/// Spends one chat token; on exhaustion the sender is auto-silenced for
/// `SPAM_SILENCE_SECS` and the message is dropped (spec §4.7 token
/// bucket / silence escalation).
fn admit_chat(state: &Arc<ServerState>, session: &Arc<Session>) -> bool {
    let now = unix_now();
    if session.is_silenced(now) {
        return false;
    }
    if session.spend_chat_token(now) {
        return true;
    }
    let until = now + SPAM_SILENCE_SECS;
    session.set_silence_end(until);
    state.collaborators.infringements.create(
        session.id() as i64,
        InfringementAction::Silence,
        std::time::Duration::from_secs(SPAM_SILENCE_SECS as u64),
        "Chat spamming",
        false,
    );
    session.send(
        &state.protocol,
        ResponseKind::SilenceEnd,
        &EncodePayload::SilenceEnd(SPAM_SILENCE_SECS as i32),
    );
    for other in state.registries.players.snapshot() {
        if other.id() == session.id() {
            continue;
        }
        other.send(
            &state.protocol,
            ResponseKind::UserSilenced,
            &EncodePayload::UserSilenced(session.id()),
        );
    }
    false
}

/// Relays a sent message to every other live session the same principal
/// owns (tourney clients beyond the primary session), skipping the
/// connection that actually sent it.
fn echo_to_own_tourney_sessions(state: &Arc<ServerState>, sender: &Session, payload: &EncodePayload) {
    for dup in state.registries.tourney.others(sender.id(), sender.remote_addr()) {
        dup.send(&state.protocol, ResponseKind::SendMessage, payload);
    }
}

pub fn send_public_message(
    state: &Arc<ServerState>,
    session: &Arc<Session>,
    args: DecodedArgs,
) -> Result<(), HandlerError> {
    let DecodedArgs::SendPublicMessage { target, text } = args else {
        return Ok(());
    };
    if text.starts_with('!') {
        // Routed to the chat-command interpreter, an external
        // collaborator out of scope here (spec §4.7 Non-goals).
        return Ok(());
    }
    if !admit_chat(state, session) {
        return Ok(());
    }
    let Some(channel) = state.registries.channels.get(&target) else {
        return Err(HandlerError::Rejected("no such channel"));
    };
    if !channel.send_message(session, &text, &state.registries.players, &state.protocol) {
        return Ok(());
    }
    state
        .collaborators
        .messages
        .create(session.id() as i64, &target, &text);
    echo_to_own_tourney_sessions(
        state,
        session,
        &EncodePayload::SendMessage {
            sender: session.username(),
            sender_id: session.id(),
            text,
            target,
        },
    );
    Ok(())
}

pub fn send_private_message(
    state: &Arc<ServerState>,
    session: &Arc<Session>,
    args: DecodedArgs,
) -> Result<(), HandlerError> {
    let DecodedArgs::SendPrivateMessage { target, text } = args else {
        return Ok(());
    };
    if text.starts_with('!') {
        return Ok(());
    }
    if !admit_chat(state, session) {
        return Ok(());
    }
    let Some(recipient) = state.registries.players.by_name(&target) else {
        return Err(HandlerError::Rejected("unknown recipient"));
    };

    let now = unix_now();
    if recipient.is_silenced(now) {
        session.send(
            &state.protocol,
            ResponseKind::TargetIsSilenced,
            &EncodePayload::TargetIsSilenced(target),
        );
        return Ok(());
    }
    if recipient.blocks_nonfriend_dms()
        && !recipient.is_friend(session.id())
        && !session.permissions().is_staff()
    {
        session.send(
            &state.protocol,
            ResponseKind::UserDmBlocked,
            &EncodePayload::UserDmBlocked(target),
        );
        return Ok(());
    }

    let payload = EncodePayload::SendMessage {
        sender: session.username(),
        sender_id: session.id(),
        text: text.clone(),
        target: target.clone(),
    };
    recipient.send(&state.protocol, ResponseKind::SendMessage, &payload);
    for dup in state.registries.tourney.all(recipient.id()) {
        dup.send(&state.protocol, ResponseKind::SendMessage, &payload);
    }

    state
        .collaborators
        .messages
        .create(session.id() as i64, &target, &text);

    if let Some(away) = recipient.away_message() {
        session.send(
            &state.protocol,
            ResponseKind::SendMessage,
            &EncodePayload::SendMessage {
                sender: recipient.username(),
                sender_id: recipient.id(),
                text: away,
                target: session.username(),
            },
        );
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
    fn public_message_to_unknown_channel_is_rejected() {
        let st = state();
        let s = test_session(1, "peppy");
        st.registries.players.insert(s.clone());
        let result = send_public_message(
            &st,
            &s,
            DecodedArgs::SendPublicMessage {
                target: "#nope".into(),
                text: "hi".into(),
            },
        );
        assert!(result.is_err());
    }

    #[test]
    fn public_message_delivers_and_persists() {
        let st = state();
        st.registries
            .channels
            .insert(Arc::new(Channel::new("#osu", "general", true)));
        let sender = test_session(1, "sender");
        let listener = test_session(2, "listener");
        st.registries.players.insert(sender.clone());
        st.registries.players.insert(listener.clone());
        st.registries.channels.get("#osu").unwrap().add(&sender, &st.registries.players, &st.protocol);
        st.registries.channels.get("#osu").unwrap().add(&listener, &st.registries.players, &st.protocol);

        send_public_message(
            &st,
            &sender,
            DecodedArgs::SendPublicMessage {
                target: "#osu".into(),
                text: "hello".into(),
            },
        )
        .unwrap();
    }

    #[test]
    fn private_message_to_unknown_user_is_rejected() {
        let st = state();
        let s = test_session(1, "sender");
        st.registries.players.insert(s.clone());
        let result = send_private_message(
            &st,
            &s,
            DecodedArgs::SendPrivateMessage {
                target: "ghost".into(),
                text: "hi".into(),
            },
        );
        assert!(result.is_err());
    }

    #[test]
    fn private_message_blocked_when_not_friends() {
        let st = state();
        let sender = test_session(1, "sender");
        let recipient = test_session(2, "recipient");
        recipient.set_blocks_nonfriend_dms(true);
        st.registries.players.insert(sender.clone());
        st.registries.players.insert(recipient.clone());

        send_private_message(
            &st,
            &sender,
            DecodedArgs::SendPrivateMessage {
                target: "recipient".into(),
                text: "hi".into(),
            },
        )
        .unwrap();
    }

    #[test]
    fn private_message_silenced_sender_is_dropped() {
        let st = state();
        let sender = test_session(1, "sender");
        sender.set_silence_end(unix_now() + 100);
        let recipient = test_session(2, "recipient");
        st.registries.players.insert(sender.clone());
        st.registries.players.insert(recipient.clone());

        send_private_message(
            &st,
            &sender,
            DecodedArgs::SendPrivateMessage {
                target: "recipient".into(),
                text: "hi".into(),
            },
        )
        .unwrap();
    }
}
