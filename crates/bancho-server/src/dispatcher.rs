// dispatcher.rs — request dispatcher (spec §2 item 8, §4.2, §9)
//
// Grounded on the teacher's `svcmd_t` table in sv_user.rs (an array of
// {name, handler fn-pointer} pairs walked by `SV_ExecuteClientMessage`),
// generalized from a linear scan over a fixed C-style table to a
// `HashMap<RequestKind, HandlerEntry>` keyed by the logical packet kind.

use std::collections::HashMap;
use std::sync::Arc;

use bancho_common::error::HandlerError;
use bancho_common::packets::RequestKind;
use bancho_protocol::decode::DecodedArgs;

use crate::session::Session;
use crate::state::ServerState;

/// Per spec §5/§9: most handlers are offloaded to the worker pool so the
/// I/O thread never blocks on business logic. `MATCH_SCORE_UPDATE` and
/// `SEND_MESSAGE` stay on the read path to preserve per-sender ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    Inline,
    Worker,
}

pub type HandlerFn = fn(&Arc<ServerState>, &Arc<Session>, DecodedArgs) -> Result<(), HandlerError>;

#[derive(Clone, Copy)]
pub struct HandlerEntry {
    pub handler: HandlerFn,
    pub dispatch: Dispatch,
}

pub struct Dispatcher {
    table: HashMap<RequestKind, HandlerEntry>,
}

impl Dispatcher {
    pub fn new() -> Self {
        Dispatcher {
            table: HashMap::new(),
        }
    }

    pub fn register(&mut self, kind: RequestKind, dispatch: Dispatch, handler: HandlerFn) {
        self.table.insert(kind, HandlerEntry { handler, dispatch });
    }

    pub fn get(&self, kind: RequestKind) -> Option<HandlerEntry> {
        self.table.get(&kind).copied()
    }

    /// Dispatches a decoded request immediately, ignoring its `Dispatch`
    /// tag. Callers that care about read-path-vs-worker placement (the
    /// I/O loop) should branch on `get(kind).dispatch` themselves and
    /// either call the handler inline or hand it to the worker pool.
    pub fn invoke(
        &self,
        state: &Arc<ServerState>,
        session: &Arc<Session>,
        kind: RequestKind,
        args: DecodedArgs,
    ) -> Result<(), HandlerError> {
        match self.get(kind) {
            Some(entry) => (entry.handler)(state, session, args),
            None => Err(HandlerError::Rejected("no handler registered for this request")),
        }
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}

/// Assembles the full request table. Everything runs on the worker pool
/// except `MATCH_SCORE_UPDATE` and the two `SEND_*_MESSAGE` packets,
/// which stay on the read thread to preserve per-sender ordering
/// (spec §5, §9).
pub fn build() -> Dispatcher {
    use crate::handlers::{channel, lobby, messaging, multiplayer, presence, spectator};

    let mut d = Dispatcher::new();

    d.register(RequestKind::ChangeAction, Dispatch::Worker, presence::change_action);
    d.register(RequestKind::RequestStatusUpdate, Dispatch::Worker, presence::request_status_update);
    d.register(RequestKind::Pong, Dispatch::Worker, presence::pong);
    d.register(RequestKind::UserPresenceRequest, Dispatch::Worker, presence::user_presence_request);
    d.register(RequestKind::UserPresenceRequestAll, Dispatch::Worker, presence::user_presence_request_all);
    d.register(RequestKind::ErrorReport, Dispatch::Worker, presence::error_report);
    d.register(
        RequestKind::UserToggleBlockNonFriendDm,
        Dispatch::Worker,
        presence::toggle_block_nonfriend_dm,
    );

    d.register(RequestKind::SendPublicMessage, Dispatch::Inline, messaging::send_public_message);
    d.register(RequestKind::SendPrivateMessage, Dispatch::Inline, messaging::send_private_message);

    d.register(RequestKind::JoinLobby, Dispatch::Worker, lobby::join_lobby);
    d.register(RequestKind::PartLobby, Dispatch::Worker, lobby::part_lobby);
    d.register(RequestKind::FriendAdd, Dispatch::Worker, lobby::friend_add);
    d.register(RequestKind::FriendRemove, Dispatch::Worker, lobby::friend_remove);
    d.register(RequestKind::Logout, Dispatch::Worker, lobby::logout);

    d.register(RequestKind::ChannelJoin, Dispatch::Worker, channel::channel_join);
    d.register(RequestKind::ChannelPart, Dispatch::Worker, channel::channel_part);

    d.register(RequestKind::StartSpectating, Dispatch::Worker, spectator::start_spectating);
    d.register(RequestKind::StopSpectating, Dispatch::Worker, spectator::stop_spectating);
    d.register(RequestKind::CantSpectate, Dispatch::Worker, spectator::cant_spectate);
    d.register(RequestKind::SpectateFrames, Dispatch::Worker, spectator::spectate_frames);

    d.register(RequestKind::CreateMatch, Dispatch::Worker, multiplayer::create_match);
    d.register(RequestKind::JoinMatch, Dispatch::Worker, multiplayer::join_match);
    d.register(RequestKind::PartMatch, Dispatch::Worker, multiplayer::part_match);
    d.register(RequestKind::MatchChangeSlot, Dispatch::Worker, multiplayer::change_slot);
    d.register(RequestKind::MatchLock, Dispatch::Worker, multiplayer::match_lock);
    d.register(RequestKind::MatchChangeTeam, Dispatch::Worker, multiplayer::change_team);
    d.register(RequestKind::MatchChangePassword, Dispatch::Worker, multiplayer::change_password);
    d.register(RequestKind::MatchChangeSettings, Dispatch::Worker, multiplayer::change_settings);
    d.register(RequestKind::MatchChangeMods, Dispatch::Worker, multiplayer::change_mods);
    d.register(RequestKind::MatchReady, Dispatch::Worker, multiplayer::match_ready);
    d.register(RequestKind::MatchNotReady, Dispatch::Worker, multiplayer::match_not_ready);
    d.register(RequestKind::MatchStart, Dispatch::Worker, multiplayer::match_start);
    d.register(RequestKind::MatchLoadComplete, Dispatch::Worker, multiplayer::match_load_complete);
    d.register(RequestKind::MatchSkipRequest, Dispatch::Worker, multiplayer::match_skip_request);
    d.register(RequestKind::MatchFailed, Dispatch::Worker, multiplayer::match_failed);
    d.register(RequestKind::MatchNoBeatmap, Dispatch::Worker, multiplayer::match_no_beatmap);
    d.register(RequestKind::MatchHasBeatmap, Dispatch::Worker, multiplayer::match_has_beatmap);
    d.register(RequestKind::MatchScoreUpdate, Dispatch::Inline, multiplayer::score_update);
    d.register(RequestKind::MatchComplete, Dispatch::Worker, multiplayer::match_complete);
    d.register(RequestKind::MatchTransferHost, Dispatch::Worker, multiplayer::transfer_host);
    d.register(RequestKind::BeatmapInfoRequest, Dispatch::Worker, multiplayer::beatmap_info_request);

    d
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop(_: &Arc<ServerState>, _: &Arc<Session>, _: DecodedArgs) -> Result<(), HandlerError> {
        Ok(())
    }

    #[test]
    fn unregistered_kind_is_rejected() {
        let d = Dispatcher::new();
        assert!(d.get(RequestKind::Logout).is_none());
    }

    #[test]
    fn registered_kind_carries_its_dispatch_tag() {
        let mut d = Dispatcher::new();
        d.register(RequestKind::MatchScoreUpdate, Dispatch::Inline, noop);
        d.register(RequestKind::ChannelJoin, Dispatch::Worker, noop);
        assert_eq!(d.get(RequestKind::MatchScoreUpdate).unwrap().dispatch, Dispatch::Inline);
        assert_eq!(d.get(RequestKind::ChannelJoin).unwrap().dispatch, Dispatch::Worker);
    }

    #[test]
    fn built_dispatcher_keeps_score_update_and_messages_on_the_read_path() {
        let d = build();
        assert_eq!(d.get(RequestKind::MatchScoreUpdate).unwrap().dispatch, Dispatch::Inline);
        assert_eq!(d.get(RequestKind::SendPublicMessage).unwrap().dispatch, Dispatch::Inline);
        assert_eq!(d.get(RequestKind::SendPrivateMessage).unwrap().dispatch, Dispatch::Inline);
        assert_eq!(d.get(RequestKind::JoinMatch).unwrap().dispatch, Dispatch::Worker);
        assert_eq!(d.get(RequestKind::ChannelJoin).unwrap().dispatch, Dispatch::Worker);
    }

    #[test]
    fn built_dispatcher_covers_every_decodable_request_kind() {
        let d = build();
        let decodable = [
            RequestKind::ChangeAction,
            RequestKind::SendPublicMessage,
            RequestKind::Logout,
            RequestKind::RequestStatusUpdate,
            RequestKind::Pong,
            RequestKind::StartSpectating,
            RequestKind::StopSpectating,
            RequestKind::SpectateFrames,
            RequestKind::ErrorReport,
            RequestKind::CantSpectate,
            RequestKind::SendPrivateMessage,
            RequestKind::PartLobby,
            RequestKind::JoinLobby,
            RequestKind::CreateMatch,
            RequestKind::JoinMatch,
            RequestKind::PartMatch,
            RequestKind::MatchChangeSlot,
            RequestKind::MatchReady,
            RequestKind::MatchLock,
            RequestKind::MatchChangeSettings,
            RequestKind::MatchStart,
            RequestKind::MatchScoreUpdate,
            RequestKind::MatchComplete,
            RequestKind::MatchChangeMods,
            RequestKind::MatchLoadComplete,
            RequestKind::MatchNoBeatmap,
            RequestKind::MatchNotReady,
            RequestKind::MatchFailed,
            RequestKind::MatchHasBeatmap,
            RequestKind::MatchSkipRequest,
            RequestKind::ChannelJoin,
            RequestKind::ChannelPart,
            RequestKind::BeatmapInfoRequest,
            RequestKind::MatchTransferHost,
            RequestKind::FriendAdd,
            RequestKind::FriendRemove,
            RequestKind::MatchChangeTeam,
            RequestKind::MatchChangePassword,
            RequestKind::UserPresenceRequest,
            RequestKind::UserPresenceRequestAll,
            RequestKind::UserToggleBlockNonFriendDm,
        ];
        for kind in decodable {
            assert!(d.get(kind).is_some(), "missing handler for {kind:?}");
        }
    }
}
