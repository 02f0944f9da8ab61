// channel.rs — named chat room (spec §4.4)
//
// Grounded on the teacher's `sv_multicast`/`sv_broadcast_printf`
// (sv_send.rs): resolve a member list, then push the same encoded bytes
// to each. Members are stored as session ids per the spec's "registry
// cycles" design note (§9) and resolved through the player registry at
// fan-out time rather than held as owning references.

use std::collections::HashSet;

use parking_lot::RwLock;

use bancho_common::packets::ResponseKind;
use bancho_common::permissions::Permissions;
use bancho_protocol::encode::EncodePayload;

use crate::registry::players::PlayerRegistry;
use crate::session::Session;

const MAX_MESSAGE_BYTES: usize = 512;
const TRUNCATION_MARKER: &str = "... (truncated)";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelMessage<'a> {
    /// A chat line, already stripped of the `!`-command prefix behavior
    /// that routes to the command interpreter instead.
    Chat(&'a str),
}

pub struct Channel {
    pub name: String,
    pub topic: String,
    pub owner: String,
    pub read_perm: Permissions,
    pub write_perm: Permissions,
    pub public: bool,
    pub moderated: RwLock<bool>,
    members: RwLock<HashSet<i32>>,
}

impl Channel {
    pub fn new(name: impl Into<String>, topic: impl Into<String>, public: bool) -> Self {
        Channel {
            name: name.into(),
            topic: topic.into(),
            owner: "bancho".to_string(),
            read_perm: Permissions::PLAYER,
            write_perm: Permissions::PLAYER,
            public,
            moderated: RwLock::new(false),
            members: RwLock::new(HashSet::new()),
        }
    }

    pub fn member_count(&self) -> usize {
        self.members.read().len()
    }

    pub fn members(&self) -> Vec<i32> {
        self.members.read().iter().copied().collect()
    }

    pub fn has_member(&self, id: i32) -> bool {
        self.members.read().contains(&id)
    }

    /// `add` validates read permission, inserts the session, notifies the
    /// joiner and refreshes the channel panel for every member.
    pub fn add(&self, session: &Session, players: &PlayerRegistry, protocol: &bancho_protocol::Registry) -> bool {
        if !session.permissions().intersects(self.read_perm) {
            return false;
        }
        self.members.write().insert(session.id());
        session.note_channel_joined(&self.name);
        session.send(
            protocol,
            ResponseKind::ChannelJoinSuccess,
            &EncodePayload::ChannelJoinSuccess(self.name.clone()),
        );
        self.broadcast_availability(players, protocol);
        true
    }

    /// Idempotent (spec §4.4).
    pub fn remove(&self, session: &Session) {
        self.members.write().remove(&session.id());
        session.note_channel_left(&self.name);
    }

    fn broadcast_availability(&self, players: &PlayerRegistry, protocol: &bancho_protocol::Registry) {
        for id in self.members() {
            if let Some(member) = players.by_id(id) {
                member.send(
                    protocol,
                    ResponseKind::ChannelAvailable,
                    &EncodePayload::ChannelAvailable {
                        name: self.name.clone(),
                        topic: self.topic.clone(),
                        member_count: self.member_count() as i16,
                    },
                );
            }
        }
    }

    /// Rewrites `/me <action>` into the CTCP-style action form (spec
    /// §4.4).
    fn rewrite_ctcp(text: &str) -> String {
        if let Some(rest) = text.strip_prefix("/me ") {
            format!("\x01ACTION {}\x01", rest)
        } else {
            text.to_string()
        }
    }

    fn truncate(text: String) -> String {
        if text.len() <= MAX_MESSAGE_BYTES {
            return text;
        }
        let cut = text
            .char_indices()
            .take_while(|(i, _)| *i <= MAX_MESSAGE_BYTES - TRUNCATION_MARKER.len())
            .last()
            .map(|(i, c)| i + c.len_utf8())
            .unwrap_or(0);
        format!("{}{}", &text[..cut], TRUNCATION_MARKER)
    }

    /// `send_message` validates write permission and moderated mode, then
    /// fans the message out to every member except the sender. Returns
    /// `true` if the message was actually delivered (i.e. not a `!`
    /// command, which the caller routes to the command interpreter
    /// instead and never persists through this path).
    #[allow(clippy::too_many_arguments)]
    pub fn send_message(
        &self,
        sender: &Session,
        text: &str,
        players: &PlayerRegistry,
        protocol: &bancho_protocol::Registry,
    ) -> bool {
        if text.starts_with('!') {
            return false;
        }
        if !sender.permissions().intersects(self.write_perm) {
            return false;
        }
        if *self.moderated.read() && !sender.permissions().is_staff() {
            return false;
        }

        let body = Self::truncate(Self::rewrite_ctcp(text));
        let sender_id = sender.id();
        let sender_name = sender.username();

        for member_id in self.members() {
            if member_id == sender_id {
                continue;
            }
            if let Some(member) = players.by_id(member_id) {
                member.send(
                    protocol,
                    ResponseKind::SendMessage,
                    &EncodePayload::SendMessage {
                        sender: sender_name.clone(),
                        sender_id,
                        text: body.clone(),
                        target: self.name.clone(),
                    },
                );
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::test_support::test_session;

    #[test]
    fn add_is_idempotent_remove() {
        let channel = Channel::new("#osu", "general chat", true);
        let players = PlayerRegistry::new();
        let protocol = bancho_protocol::build_registry();
        let s = test_session(1, "peppy");
        players.insert(s.clone());

        assert!(channel.add(&s, &players, &protocol));
        assert!(channel.has_member(1));
        channel.remove(&s);
        channel.remove(&s);
        assert!(!channel.has_member(1));
    }

    #[test]
    fn bang_commands_are_not_delivered() {
        let channel = Channel::new("#osu", "", true);
        let players = PlayerRegistry::new();
        let protocol = bancho_protocol::build_registry();
        let s = test_session(1, "peppy");
        players.insert(s.clone());
        channel.add(&s, &players, &protocol);

        assert!(!channel.send_message(&s, "!roll", &players, &protocol));
    }

    #[test]
    fn me_action_is_rewritten_and_long_messages_truncated() {
        assert_eq!(Channel::rewrite_ctcp("/me waves"), "\x01ACTION waves\x01");
        let long = "x".repeat(600);
        let truncated = Channel::truncate(long);
        assert!(truncated.ends_with(TRUNCATION_MARKER));
        assert!(truncated.len() <= MAX_MESSAGE_BYTES);
    }

    #[test]
    fn moderated_channel_suppresses_non_staff() {
        let channel = Channel::new("#announce", "", true);
        *channel.moderated.write() = true;
        let players = PlayerRegistry::new();
        let protocol = bancho_protocol::build_registry();
        let s = test_session(1, "regular");
        players.insert(s.clone());
        channel.add(&s, &players, &protocol);

        assert!(!channel.send_message(&s, "hello", &players, &protocol));
    }
}
