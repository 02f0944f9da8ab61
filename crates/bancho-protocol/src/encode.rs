// encode.rs — canonical outbound payload shapes + default encoders
//
// Mirrors decode.rs: one normalized payload per logical response packet,
// with cohort-specific wire-shape differences implemented as table
// overrides in `cohorts/*.rs`, not as extra variants here.

use bancho_common::buf::PacketWriter;
use bancho_common::match_types::{ScoringMode, SlotStatus, SlotTeam, TeamMode};
use bancho_common::mods::Mods;
use bancho_common::status::{GameMode, ScoreFrame, Stats, Status};

#[derive(Debug, Clone)]
pub struct PresencePayload {
    pub user_id: i32,
    pub username: String,
    pub utc_offset: i8,
    pub country_code: u8,
    pub permissions_icon: u8,
    pub longitude: f32,
    pub latitude: f32,
    pub global_rank: i32,
}

#[derive(Debug, Clone)]
pub struct StatsPayload {
    pub user_id: i32,
    pub status: Status,
    pub stats: Stats,
}

#[derive(Debug, Clone)]
pub struct SlotSnapshot {
    pub status: SlotStatus,
    pub team: SlotTeam,
    pub mods: Mods,
    pub player_id: Option<i32>,
}

#[derive(Debug, Clone)]
pub struct MatchPayload {
    pub id: i32,
    pub in_progress: bool,
    pub mods: Mods,
    pub name: String,
    pub password_set: bool,
    pub beatmap_name: String,
    pub beatmap_id: i32,
    pub beatmap_md5: String,
    pub slots: [SlotSnapshot; 8],
    pub host_id: i32,
    pub mode: GameMode,
    pub team_mode: TeamMode,
    pub scoring_mode: ScoringMode,
    pub freemod: bool,
    pub seed: i32,
}

#[derive(Debug, Clone)]
pub enum EncodePayload {
    UserId(i32),
    SendMessage { sender: String, sender_id: i32, text: String, target: String },
    Ping,
    UserStats(StatsPayload),
    UserLogout(i32),
    SpectatorJoined(i32),
    SpectatorLeft(i32),
    SpectateFrames(Vec<u8>),
    SpectatorCantSpectate(i32),
    Notification(String),
    UpdateMatch(MatchPayload),
    NewMatch(MatchPayload),
    DisbandMatch(i32),
    LobbyJoin(i32),
    LobbyPart(i32),
    MatchJoinSuccess(MatchPayload),
    MatchJoinFail,
    FellowSpectatorJoined(i32),
    FellowSpectatorLeft(i32),
    MatchStart(MatchPayload),
    MatchScoreUpdate(ScoreFrame),
    MatchTransferHost,
    MatchAllPlayersLoaded,
    MatchPlayerFailed(i32),
    MatchComplete,
    MatchSkip,
    MatchPlayerSkipped(i32),
    UserPresenceSingle(PresencePayload),
    UserPresenceBundle(Vec<PresencePayload>),
    UserPresence(PresencePayload),
    SilenceEnd(i32),
    UserSilenced(i32),
    UserDmBlocked(String),
    TargetIsSilenced(String),
    LoginReply(i32),
    ChannelInfoComplete,
    ChannelAvailable { name: String, topic: String, member_count: i16 },
    ChannelJoinSuccess(String),
    ChannelRevoked(String),
    BeatmapInfoReply,
    LoginPermissions(u32),
    FriendsList(Vec<i32>),
    ProtocolVersion(i32),
    MainMenuIcon(String),
    MatchInvite { sender: String, text: String },
    IrcJoin(String),
    IrcQuit(String),
}

pub type EncodeFn = fn(&mut PacketWriter, &EncodePayload);

pub fn encode_user_id(w: &mut PacketWriter, p: &EncodePayload) {
    if let EncodePayload::UserId(id) = p {
        w.write_i32(*id);
    }
}

pub fn encode_send_message(w: &mut PacketWriter, p: &EncodePayload) {
    if let EncodePayload::SendMessage { sender, sender_id, text, target } = p {
        w.write_string(sender);
        w.write_string(text);
        w.write_string(target);
        w.write_i32(*sender_id);
    }
}

pub fn encode_ping(_w: &mut PacketWriter, _p: &EncodePayload) {}

pub fn encode_presence(w: &mut PacketWriter, p: &PresencePayload) {
    w.write_i32(p.user_id);
    w.write_string(&p.username);
    w.write_i8(p.utc_offset);
    w.write_u8(p.country_code);
    w.write_u8(p.permissions_icon);
    w.write_f32(p.longitude);
    w.write_f32(p.latitude);
    w.write_i32(p.global_rank);
}

pub fn encode_user_presence_single(w: &mut PacketWriter, p: &EncodePayload) {
    if let EncodePayload::UserPresenceSingle(presence) = p {
        encode_presence(w, presence);
    }
}

pub fn encode_user_presence(w: &mut PacketWriter, p: &EncodePayload) {
    if let EncodePayload::UserPresence(presence) = p {
        encode_presence(w, presence);
    }
}

pub fn encode_user_presence_bundle(w: &mut PacketWriter, p: &EncodePayload) {
    if let EncodePayload::UserPresenceBundle(list) = p {
        w.write_list16(list, |w, presence| encode_presence(w, presence));
    }
}

fn encode_status(w: &mut PacketWriter, s: &Status) {
    w.write_u8(s.action as u8);
    w.write_string(&s.text);
    w.write_string(&s.beatmap_md5);
    w.write_u32(s.mods.bits());
    w.write_u8(s.mode as u8);
    w.write_i32(s.beatmap_id);
}

fn encode_stats(w: &mut PacketWriter, stats: &Stats) {
    w.write_i64(stats.rank_score);
    w.write_f32(stats.accuracy);
    w.write_i32(stats.play_count);
    w.write_i64(stats.total_score);
    w.write_i32(stats.global_rank);
    w.write_i16(stats.pp);
}

pub fn encode_user_stats(w: &mut PacketWriter, p: &EncodePayload) {
    if let EncodePayload::UserStats(stats_payload) = p {
        w.write_i32(stats_payload.user_id);
        encode_status(w, &stats_payload.status);
        encode_stats(w, &stats_payload.stats);
    }
}

pub fn encode_user_logout(w: &mut PacketWriter, p: &EncodePayload) {
    if let EncodePayload::UserLogout(id) = p {
        w.write_i32(*id);
        w.write_u8(0);
    }
}

pub fn encode_i32_payload(w: &mut PacketWriter, v: i32) {
    w.write_i32(v);
}

pub fn encode_spectator_joined(w: &mut PacketWriter, p: &EncodePayload) {
    if let EncodePayload::SpectatorJoined(id) = p {
        encode_i32_payload(w, *id);
    }
}
pub fn encode_spectator_left(w: &mut PacketWriter, p: &EncodePayload) {
    if let EncodePayload::SpectatorLeft(id) = p {
        encode_i32_payload(w, *id);
    }
}
pub fn encode_fellow_spectator_joined(w: &mut PacketWriter, p: &EncodePayload) {
    if let EncodePayload::FellowSpectatorJoined(id) = p {
        encode_i32_payload(w, *id);
    }
}
pub fn encode_fellow_spectator_left(w: &mut PacketWriter, p: &EncodePayload) {
    if let EncodePayload::FellowSpectatorLeft(id) = p {
        encode_i32_payload(w, *id);
    }
}
pub fn encode_spectator_cant_spectate(w: &mut PacketWriter, p: &EncodePayload) {
    if let EncodePayload::SpectatorCantSpectate(id) = p {
        encode_i32_payload(w, *id);
    }
}
pub fn encode_lobby_join(w: &mut PacketWriter, p: &EncodePayload) {
    if let EncodePayload::LobbyJoin(id) = p {
        encode_i32_payload(w, *id);
    }
}
pub fn encode_lobby_part(w: &mut PacketWriter, p: &EncodePayload) {
    if let EncodePayload::LobbyPart(id) = p {
        encode_i32_payload(w, *id);
    }
}
pub fn encode_disband_match(w: &mut PacketWriter, p: &EncodePayload) {
    if let EncodePayload::DisbandMatch(id) = p {
        encode_i32_payload(w, *id);
    }
}
pub fn encode_match_player_failed(w: &mut PacketWriter, p: &EncodePayload) {
    if let EncodePayload::MatchPlayerFailed(slot) = p {
        encode_i32_payload(w, *slot);
    }
}
pub fn encode_match_player_skipped(w: &mut PacketWriter, p: &EncodePayload) {
    if let EncodePayload::MatchPlayerSkipped(slot) = p {
        encode_i32_payload(w, *slot);
    }
}
pub fn encode_login_reply(w: &mut PacketWriter, p: &EncodePayload) {
    if let EncodePayload::LoginReply(code) = p {
        encode_i32_payload(w, *code);
    }
}
pub fn encode_silence_end(w: &mut PacketWriter, p: &EncodePayload) {
    if let EncodePayload::SilenceEnd(secs) = p {
        encode_i32_payload(w, *secs);
    }
}
pub fn encode_user_silenced(w: &mut PacketWriter, p: &EncodePayload) {
    if let EncodePayload::UserSilenced(id) = p {
        encode_i32_payload(w, *id);
    }
}
pub fn encode_protocol_version(w: &mut PacketWriter, p: &EncodePayload) {
    if let EncodePayload::ProtocolVersion(v) = p {
        encode_i32_payload(w, *v);
    }
}
pub fn encode_login_permissions(w: &mut PacketWriter, p: &EncodePayload) {
    if let EncodePayload::LoginPermissions(bits) = p {
        w.write_u32(*bits);
    }
}

pub fn encode_string_payload(w: &mut PacketWriter, s: &str) {
    w.write_string(s);
}
pub fn encode_notification(w: &mut PacketWriter, p: &EncodePayload) {
    if let EncodePayload::Notification(s) = p {
        encode_string_payload(w, s);
    }
}
pub fn encode_main_menu_icon(w: &mut PacketWriter, p: &EncodePayload) {
    if let EncodePayload::MainMenuIcon(s) = p {
        encode_string_payload(w, s);
    }
}
pub fn encode_channel_join_success(w: &mut PacketWriter, p: &EncodePayload) {
    if let EncodePayload::ChannelJoinSuccess(s) = p {
        encode_string_payload(w, s);
    }
}
pub fn encode_channel_revoked(w: &mut PacketWriter, p: &EncodePayload) {
    if let EncodePayload::ChannelRevoked(s) = p {
        encode_string_payload(w, s);
    }
}
pub fn encode_user_dm_blocked(w: &mut PacketWriter, p: &EncodePayload) {
    if let EncodePayload::UserDmBlocked(s) = p {
        encode_string_payload(w, s);
    }
}
pub fn encode_target_is_silenced(w: &mut PacketWriter, p: &EncodePayload) {
    if let EncodePayload::TargetIsSilenced(s) = p {
        encode_string_payload(w, s);
    }
}
pub fn encode_irc_join(w: &mut PacketWriter, p: &EncodePayload) {
    if let EncodePayload::IrcJoin(s) = p {
        encode_string_payload(w, s);
    }
}
pub fn encode_irc_quit(w: &mut PacketWriter, p: &EncodePayload) {
    if let EncodePayload::IrcQuit(s) = p {
        encode_string_payload(w, s);
    }
}

pub fn encode_channel_available(w: &mut PacketWriter, p: &EncodePayload) {
    if let EncodePayload::ChannelAvailable { name, topic, member_count } = p {
        w.write_string(name);
        w.write_string(topic);
        w.write_i16(*member_count);
    }
}

pub fn encode_channel_info_complete(_w: &mut PacketWriter, _p: &EncodePayload) {}
pub fn encode_match_join_fail(_w: &mut PacketWriter, _p: &EncodePayload) {}
pub fn encode_match_transfer_host(_w: &mut PacketWriter, _p: &EncodePayload) {}
pub fn encode_match_all_players_loaded(_w: &mut PacketWriter, _p: &EncodePayload) {}
pub fn encode_match_complete(_w: &mut PacketWriter, _p: &EncodePayload) {}
pub fn encode_match_skip(_w: &mut PacketWriter, _p: &EncodePayload) {}
pub fn encode_beatmap_info_reply(_w: &mut PacketWriter, _p: &EncodePayload) {}

pub fn encode_friends_list(w: &mut PacketWriter, p: &EncodePayload) {
    if let EncodePayload::FriendsList(ids) = p {
        w.write_list16(ids, |w, id| w.write_i32(*id));
    }
}

/// Modern (>= ~2013) match wire shape: 8 slots, freemod + seed present.
/// See spec §4.1 — `b323` lacks freemod/seed/per-slot mods, overridden in
/// `cohorts/legacy.rs`.
pub fn encode_match_body(w: &mut PacketWriter, m: &MatchPayload) {
    w.write_i16(m.id as i16);
    w.write_bool(m.in_progress);
    w.write_u8(0);
    w.write_u32(m.mods.bits());
    w.write_string(&m.name);
    w.write_string(if m.password_set { "x" } else { "" });
    w.write_u8(m.mode as u8);
    w.write_string(&m.beatmap_name);
    w.write_i32(m.beatmap_id);
    w.write_string(&m.beatmap_md5);
    for slot in &m.slots {
        w.write_u8(slot.status as u8);
    }
    for slot in &m.slots {
        w.write_u8(slot.team as u8);
    }
    for slot in &m.slots {
        if let Some(id) = slot.player_id {
            w.write_i32(id);
        }
    }
    w.write_i32(m.host_id);
    w.write_u8(m.team_mode as u8);
    w.write_u8(m.scoring_mode as u8);
    w.write_bool(m.freemod);
    if m.freemod {
        for slot in &m.slots {
            w.write_u32(slot.mods.bits());
        }
    }
    w.write_i32(m.seed);
}

macro_rules! match_payload_encoder {
    ($fn_name:ident, $variant:ident) => {
        pub fn $fn_name(w: &mut PacketWriter, p: &EncodePayload) {
            if let EncodePayload::$variant(m) = p {
                encode_match_body(w, m);
            }
        }
    };
}

match_payload_encoder!(encode_update_match, UpdateMatch);
match_payload_encoder!(encode_new_match, NewMatch);
match_payload_encoder!(encode_match_join_success, MatchJoinSuccess);
match_payload_encoder!(encode_match_start, MatchStart);

pub fn encode_match_score_update(w: &mut PacketWriter, p: &EncodePayload) {
    if let EncodePayload::MatchScoreUpdate(frame) = p {
        w.write_i32(frame.time);
        w.write_u8(frame.id);
        w.write_u16(frame.count_300);
        w.write_u16(frame.count_100);
        w.write_u16(frame.count_50);
        w.write_u16(frame.count_geki);
        w.write_u16(frame.count_katu);
        w.write_u16(frame.count_miss);
        w.write_i32(frame.total_score);
        w.write_u16(frame.max_combo);
        w.write_u16(frame.current_combo);
        w.write_bool(frame.passed);
        w.write_u8((frame.hp * 200.0) as u8);
        w.write_u8(frame.tag);
        w.write_bool(frame.using_scorev2);
        w.write_u8(frame.slot_id);
    }
}

pub fn encode_spectate_frames(w: &mut PacketWriter, p: &EncodePayload) {
    if let EncodePayload::SpectateFrames(bytes) = p {
        w.write_bytes(bytes);
    }
}

pub fn encode_match_invite(w: &mut PacketWriter, p: &EncodePayload) {
    if let EncodePayload::MatchInvite { sender, text } = p {
        w.write_string(sender);
        w.write_string(text);
    }
}
