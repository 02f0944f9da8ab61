// cohorts/modern.rs — the root cohort (no parent), numeric ids as they
// stood from roughly b20130815 onward.
//
// Grounded on spec.md §6's packet catalog. Ids below follow the shape
// Bancho-family protocols have settled into since the 2013-era client;
// they are the base every older cohort in `legacy.rs` overrides from.

use bancho_common::packets::{RequestKind, ResponseKind};

use crate::decode as d;
use crate::encode as e;
use crate::registry::Cohort;

pub const MODERN_KEY: i32 = 20130815;

pub fn build() -> Cohort {
    let mut cohort = Cohort::new(MODERN_KEY, None);

    cohort = cohort
        .override_request_id(RequestKind::ChangeAction, 0)
        .override_request_id(RequestKind::SendPublicMessage, 1)
        .override_request_id(RequestKind::Logout, 2)
        .override_request_id(RequestKind::RequestStatusUpdate, 3)
        .override_request_id(RequestKind::Pong, 4)
        .override_request_id(RequestKind::StartSpectating, 16)
        .override_request_id(RequestKind::StopSpectating, 17)
        .override_request_id(RequestKind::SpectateFrames, 18)
        .override_request_id(RequestKind::ErrorReport, 20)
        .override_request_id(RequestKind::CantSpectate, 21)
        .override_request_id(RequestKind::SendPrivateMessage, 25)
        .override_request_id(RequestKind::PartLobby, 29)
        .override_request_id(RequestKind::JoinLobby, 30)
        .override_request_id(RequestKind::CreateMatch, 31)
        .override_request_id(RequestKind::JoinMatch, 32)
        .override_request_id(RequestKind::PartMatch, 33)
        .override_request_id(RequestKind::MatchChangeSlot, 38)
        .override_request_id(RequestKind::MatchReady, 39)
        .override_request_id(RequestKind::MatchLock, 40)
        .override_request_id(RequestKind::MatchChangeSettings, 41)
        .override_request_id(RequestKind::MatchStart, 44)
        .override_request_id(RequestKind::MatchScoreUpdate, 47)
        .override_request_id(RequestKind::MatchComplete, 49)
        .override_request_id(RequestKind::MatchChangeMods, 51)
        .override_request_id(RequestKind::MatchLoadComplete, 52)
        .override_request_id(RequestKind::MatchNoBeatmap, 54)
        .override_request_id(RequestKind::MatchNotReady, 55)
        .override_request_id(RequestKind::MatchFailed, 56)
        .override_request_id(RequestKind::MatchHasBeatmap, 61)
        .override_request_id(RequestKind::MatchSkipRequest, 63)
        .override_request_id(RequestKind::ChannelJoin, 63 + 1)
        .override_request_id(RequestKind::ChannelPart, 78)
        .override_request_id(RequestKind::BeatmapInfoRequest, 68)
        .override_request_id(RequestKind::MatchTransferHost, 70)
        .override_request_id(RequestKind::FriendAdd, 73)
        .override_request_id(RequestKind::FriendRemove, 74)
        .override_request_id(RequestKind::MatchChangeTeam, 77)
        .override_request_id(RequestKind::ChannelMessageInfoRequest, 80)
        .override_request_id(RequestKind::MatchChangePassword, 82)
        .override_request_id(RequestKind::TournamentMatchInfoRequest, 93)
        .override_request_id(RequestKind::UserPresenceRequest, 85)
        .override_request_id(RequestKind::UserPresenceRequestAll, 86)
        .override_request_id(RequestKind::UserToggleBlockNonFriendDm, 87)
        .override_request_id(RequestKind::TournamentJoinMatchChannel, 90)
        .override_request_id(RequestKind::TournamentLeaveMatchChannel, 91);

    cohort = cohort
        .override_decoder(RequestKind::ChangeAction, d::decode_change_action)
        .override_decoder(RequestKind::SendPublicMessage, d::decode_send_public_message)
        .override_decoder(RequestKind::Logout, d::decode_logout)
        .override_decoder(RequestKind::RequestStatusUpdate, d::decode_request_status_update)
        .override_decoder(RequestKind::Pong, d::decode_pong)
        .override_decoder(RequestKind::StartSpectating, d::decode_start_spectating)
        .override_decoder(RequestKind::StopSpectating, d::decode_stop_spectating)
        .override_decoder(RequestKind::SpectateFrames, d::decode_spectate_frames)
        .override_decoder(RequestKind::ErrorReport, d::decode_error_report)
        .override_decoder(RequestKind::CantSpectate, d::decode_cant_spectate)
        .override_decoder(RequestKind::SendPrivateMessage, d::decode_send_private_message)
        .override_decoder(RequestKind::PartLobby, d::decode_part_lobby)
        .override_decoder(RequestKind::JoinLobby, d::decode_join_lobby)
        .override_decoder(RequestKind::CreateMatch, d::decode_create_match)
        .override_decoder(RequestKind::JoinMatch, d::decode_join_match)
        .override_decoder(RequestKind::PartMatch, d::decode_part_match)
        .override_decoder(RequestKind::MatchChangeSlot, d::decode_match_change_slot)
        .override_decoder(RequestKind::MatchReady, d::decode_match_ready)
        .override_decoder(RequestKind::MatchLock, d::decode_match_lock)
        .override_decoder(RequestKind::MatchChangeSettings, d::decode_match_change_settings)
        .override_decoder(RequestKind::MatchStart, d::decode_match_start)
        .override_decoder(RequestKind::MatchScoreUpdate, d::decode_score_update)
        .override_decoder(RequestKind::MatchComplete, d::decode_match_complete)
        .override_decoder(RequestKind::MatchChangeMods, d::decode_match_change_mods)
        .override_decoder(RequestKind::MatchLoadComplete, d::decode_match_load_complete)
        .override_decoder(RequestKind::MatchNoBeatmap, d::decode_match_no_beatmap)
        .override_decoder(RequestKind::MatchNotReady, d::decode_match_not_ready)
        .override_decoder(RequestKind::MatchFailed, d::decode_match_failed)
        .override_decoder(RequestKind::MatchHasBeatmap, d::decode_match_has_beatmap)
        .override_decoder(RequestKind::MatchSkipRequest, d::decode_match_skip_request)
        .override_decoder(RequestKind::ChannelJoin, d::decode_channel_join)
        .override_decoder(RequestKind::ChannelPart, d::decode_channel_part)
        .override_decoder(RequestKind::BeatmapInfoRequest, d::decode_beatmap_info_request)
        .override_decoder(RequestKind::MatchTransferHost, d::decode_match_transfer_host)
        .override_decoder(RequestKind::FriendAdd, d::decode_friend_add)
        .override_decoder(RequestKind::FriendRemove, d::decode_friend_remove)
        .override_decoder(RequestKind::MatchChangeTeam, d::decode_match_change_team)
        .override_decoder(RequestKind::MatchChangePassword, d::decode_match_change_password)
        .override_decoder(RequestKind::UserPresenceRequest, d::decode_user_presence_request)
        .override_decoder(RequestKind::UserPresenceRequestAll, d::decode_user_presence_request_all)
        .override_decoder(RequestKind::UserToggleBlockNonFriendDm, d::decode_toggle_block_dm);

    cohort = cohort
        .override_response_id(ResponseKind::UserId, 5)
        .override_response_id(ResponseKind::SendMessage, 7)
        .override_response_id(ResponseKind::Ping, 8)
        .override_response_id(ResponseKind::HandleIrcChangeUsername, 9)
        .override_response_id(ResponseKind::HandleIrcQuit, 10)
        .override_response_id(ResponseKind::UserStats, 11)
        .override_response_id(ResponseKind::UserLogout, 12)
        .override_response_id(ResponseKind::SpectatorJoined, 13)
        .override_response_id(ResponseKind::SpectatorLeft, 14)
        .override_response_id(ResponseKind::SpectateFrames, 15)
        .override_response_id(ResponseKind::VersionUpdate, 19)
        .override_response_id(ResponseKind::SpectatorCantSpectate, 22)
        .override_response_id(ResponseKind::GetAttention, 23)
        .override_response_id(ResponseKind::Notification, 24)
        .override_response_id(ResponseKind::UpdateMatch, 26)
        .override_response_id(ResponseKind::NewMatch, 27)
        .override_response_id(ResponseKind::DisbandMatch, 28)
        .override_response_id(ResponseKind::LobbyJoin, 34)
        .override_response_id(ResponseKind::LobbyPart, 35)
        .override_response_id(ResponseKind::MatchJoinSuccess, 36)
        .override_response_id(ResponseKind::MatchJoinFail, 37)
        .override_response_id(ResponseKind::FellowSpectatorJoined, 42)
        .override_response_id(ResponseKind::FellowSpectatorLeft, 43)
        .override_response_id(ResponseKind::MatchStart, 46)
        .override_response_id(ResponseKind::MatchScoreUpdate, 48)
        .override_response_id(ResponseKind::MatchTransferHost, 50)
        .override_response_id(ResponseKind::MatchAllPlayersLoaded, 53)
        .override_response_id(ResponseKind::MatchPlayerFailed, 57)
        .override_response_id(ResponseKind::MatchComplete, 58)
        .override_response_id(ResponseKind::MatchSkip, 61)
        .override_response_id(ResponseKind::UserPresenceSingle, 83)
        .override_response_id(ResponseKind::UserPresenceBundle, 84)
        .override_response_id(ResponseKind::UserPresence, 59)
        .override_response_id(ResponseKind::SilenceEnd, 60)
        .override_response_id(ResponseKind::UserSilenced, 62)
        .override_response_id(ResponseKind::UserPresenceAll, 71)
        .override_response_id(ResponseKind::UserDmBlocked, 72)
        .override_response_id(ResponseKind::TargetIsSilenced, 92)
        .override_response_id(ResponseKind::VersionUpdateForced, 75)
        .override_response_id(ResponseKind::SwitchServer, 76)
        .override_response_id(ResponseKind::AccountRestricted, 79)
        .override_response_id(ResponseKind::RtxPlaying, 81)
        .override_response_id(ResponseKind::MatchAbort, 88)
        .override_response_id(ResponseKind::SwitchTournamentServer, 89)
        .override_response_id(ResponseKind::LoginReply, 5)
        .override_response_id(ResponseKind::ChannelInfoComplete, 65)
        .override_response_id(ResponseKind::ChannelAvailable, 64)
        .override_response_id(ResponseKind::ChannelJoinSuccess, 66)
        .override_response_id(ResponseKind::ChannelInfo, 67)
        .override_response_id(ResponseKind::ChannelRevoked, 69)
        .override_response_id(ResponseKind::ChannelAutoJoinAvailable, 94)
        .override_response_id(ResponseKind::BeatmapInfoReply, 101)
        .override_response_id(ResponseKind::LoginPermissions, 102)
        .override_response_id(ResponseKind::FriendsList, 103)
        .override_response_id(ResponseKind::ProtocolVersion, 104)
        .override_response_id(ResponseKind::MainMenuIcon, 105)
        .override_response_id(ResponseKind::MonitorNotification, 106)
        .override_response_id(ResponseKind::MatchPlayerSkipped, 107)
        .override_response_id(ResponseKind::UserPresenceBundleCompact, 108)
        .override_response_id(ResponseKind::UserRestricted, 109)
        .override_response_id(ResponseKind::MatchInvite, 110)
        .override_response_id(ResponseKind::ChannelInfoEnd, 111)
        .override_response_id(ResponseKind::ChannelKicked, 112)
        .override_response_id(ResponseKind::IrcJoin, 113)
        .override_response_id(ResponseKind::IrcQuit, 114);

    cohort = cohort
        .override_encoder(ResponseKind::UserId, e::encode_user_id)
        .override_encoder(ResponseKind::SendMessage, e::encode_send_message)
        .override_encoder(ResponseKind::Ping, e::encode_ping)
        .override_encoder(ResponseKind::UserStats, e::encode_user_stats)
        .override_encoder(ResponseKind::UserLogout, e::encode_user_logout)
        .override_encoder(ResponseKind::SpectatorJoined, e::encode_spectator_joined)
        .override_encoder(ResponseKind::SpectatorLeft, e::encode_spectator_left)
        .override_encoder(ResponseKind::SpectateFrames, e::encode_spectate_frames)
        .override_encoder(ResponseKind::SpectatorCantSpectate, e::encode_spectator_cant_spectate)
        .override_encoder(ResponseKind::Notification, e::encode_notification)
        .override_encoder(ResponseKind::UpdateMatch, e::encode_update_match)
        .override_encoder(ResponseKind::NewMatch, e::encode_new_match)
        .override_encoder(ResponseKind::DisbandMatch, e::encode_disband_match)
        .override_encoder(ResponseKind::LobbyJoin, e::encode_lobby_join)
        .override_encoder(ResponseKind::LobbyPart, e::encode_lobby_part)
        .override_encoder(ResponseKind::MatchJoinSuccess, e::encode_match_join_success)
        .override_encoder(ResponseKind::MatchJoinFail, e::encode_match_join_fail)
        .override_encoder(ResponseKind::FellowSpectatorJoined, e::encode_fellow_spectator_joined)
        .override_encoder(ResponseKind::FellowSpectatorLeft, e::encode_fellow_spectator_left)
        .override_encoder(ResponseKind::MatchStart, e::encode_match_start)
        .override_encoder(ResponseKind::MatchScoreUpdate, e::encode_match_score_update)
        .override_encoder(ResponseKind::MatchTransferHost, e::encode_match_transfer_host)
        .override_encoder(ResponseKind::MatchAllPlayersLoaded, e::encode_match_all_players_loaded)
        .override_encoder(ResponseKind::MatchPlayerFailed, e::encode_match_player_failed)
        .override_encoder(ResponseKind::MatchComplete, e::encode_match_complete)
        .override_encoder(ResponseKind::MatchSkip, e::encode_match_skip)
        .override_encoder(ResponseKind::UserPresenceSingle, e::encode_user_presence_single)
        .override_encoder(ResponseKind::UserPresenceBundle, e::encode_user_presence_bundle)
        .override_encoder(ResponseKind::UserPresence, e::encode_user_presence)
        .override_encoder(ResponseKind::SilenceEnd, e::encode_silence_end)
        .override_encoder(ResponseKind::UserSilenced, e::encode_user_silenced)
        .override_encoder(ResponseKind::UserDmBlocked, e::encode_user_dm_blocked)
        .override_encoder(ResponseKind::TargetIsSilenced, e::encode_target_is_silenced)
        .override_encoder(ResponseKind::LoginReply, e::encode_login_reply)
        .override_encoder(ResponseKind::ChannelInfoComplete, e::encode_channel_info_complete)
        .override_encoder(ResponseKind::ChannelAvailable, e::encode_channel_available)
        .override_encoder(ResponseKind::ChannelJoinSuccess, e::encode_channel_join_success)
        .override_encoder(ResponseKind::ChannelRevoked, e::encode_channel_revoked)
        .override_encoder(ResponseKind::BeatmapInfoReply, e::encode_beatmap_info_reply)
        .override_encoder(ResponseKind::LoginPermissions, e::encode_login_permissions)
        .override_encoder(ResponseKind::FriendsList, e::encode_friends_list)
        .override_encoder(ResponseKind::ProtocolVersion, e::encode_protocol_version)
        .override_encoder(ResponseKind::MainMenuIcon, e::encode_main_menu_icon)
        .override_encoder(ResponseKind::MatchPlayerSkipped, e::encode_match_player_skipped)
        .override_encoder(ResponseKind::MatchInvite, e::encode_match_invite)
        .override_encoder(ResponseKind::IrcJoin, e::encode_irc_join)
        .override_encoder(ResponseKind::IrcQuit, e::encode_irc_quit);

    cohort
}
