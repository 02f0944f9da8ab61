// decode.rs — canonical decoded argument shapes + default decoders
//
// Grounded on spec.md §4.1 ("decoder table") and §6 (packet catalog). A
// decoder always normalizes onto one of these variants regardless of the
// cohort that produced the bytes; per-cohort wire-shape differences (slot
// counts, legacy score-frame fields) live in `cohorts/*.rs` as table
// overrides, not as extra `DecodedArgs` variants.

use bancho_common::buf::PacketReader;
use bancho_common::error::ProtocolError;
use bancho_common::match_types::{ScoringMode, SlotTeam, TeamMode};
use bancho_common::mods::Mods;
use bancho_common::status::{Action, GameMode, ScoreFrame, Status};

#[derive(Debug, Clone)]
pub enum DecodedArgs {
    ChangeAction(Status),
    SendPublicMessage { target: String, text: String },
    SendPrivateMessage { target: String, text: String },
    Logout,
    RequestStatusUpdate,
    Pong,
    StartSpectating(i32),
    StopSpectating,
    SpectateFrames(Vec<u8>),
    CantSpectate(i32),
    JoinLobby,
    PartLobby,
    CreateMatch(NewMatchArgs),
    JoinMatch { match_id: i32, password: String },
    PartMatch,
    MatchChangeSlot(i32),
    MatchReady,
    MatchNotReady,
    MatchLock(i32),
    MatchChangeSettings(MatchSettingsArgs),
    MatchChangeMods(Mods),
    MatchStart,
    MatchScoreUpdate(ScoreFrame),
    MatchComplete,
    MatchLoadComplete,
    MatchNoBeatmap,
    MatchHasBeatmap,
    MatchSkipRequest,
    MatchFailed,
    MatchTransferHost(i32),
    MatchChangeTeam,
    MatchChangePassword(String),
    ChannelJoin(String),
    ChannelPart(String),
    FriendAdd(i32),
    FriendRemove(i32),
    UserPresenceRequest(Vec<i32>),
    UserPresenceRequestAll,
    UserToggleBlockNonFriendDm(bool),
    BeatmapInfoRequest { filenames: Vec<String>, ids: Vec<i32> },
    ErrorReport(String),
}

#[derive(Debug, Clone, Default)]
pub struct NewMatchArgs {
    pub name: String,
    pub password: String,
    pub beatmap_name: String,
    pub beatmap_id: i32,
    pub beatmap_md5: String,
    pub mode: GameMode,
    pub mods: Mods,
    pub team_mode: TeamMode,
    pub scoring_mode: ScoringMode,
}

#[derive(Debug, Clone, Default)]
pub struct MatchSettingsArgs {
    pub name: String,
    pub password: String,
    pub beatmap_name: String,
    pub beatmap_id: i32,
    pub beatmap_md5: String,
    pub mode: GameMode,
    pub team_mode: TeamMode,
    pub scoring_mode: ScoringMode,
    pub freemod: bool,
    pub mods: Mods,
}

pub type DecodeFn = fn(&mut PacketReader) -> Result<DecodedArgs, ProtocolError>;

pub fn decode_change_action(r: &mut PacketReader) -> Result<DecodedArgs, ProtocolError> {
    let action = Action::from_u8(r.read_u8()?);
    let text = r.read_string()?;
    let beatmap_md5 = r.read_string()?;
    let mods = Mods::from_bits_truncate(r.read_u32()?);
    let mode = GameMode::from_u8(r.read_u8()?);
    let beatmap_id = r.read_i32()?;
    Ok(DecodedArgs::ChangeAction(Status {
        action,
        text,
        beatmap_md5,
        beatmap_id,
        mods,
        mode,
    }))
}

pub fn decode_send_public_message(r: &mut PacketReader) -> Result<DecodedArgs, ProtocolError> {
    let _sender = r.read_string()?;
    let text = r.read_string()?;
    let target = r.read_string()?;
    let _sender_id = r.read_i32()?;
    Ok(DecodedArgs::SendPublicMessage { target, text })
}

pub fn decode_send_private_message(r: &mut PacketReader) -> Result<DecodedArgs, ProtocolError> {
    let _sender = r.read_string()?;
    let text = r.read_string()?;
    let target = r.read_string()?;
    let _sender_id = r.read_i32()?;
    Ok(DecodedArgs::SendPrivateMessage { target, text })
}

pub fn decode_i32_arg(r: &mut PacketReader) -> Result<i32, ProtocolError> {
    r.read_i32()
}

pub fn decode_start_spectating(r: &mut PacketReader) -> Result<DecodedArgs, ProtocolError> {
    Ok(DecodedArgs::StartSpectating(r.read_i32()?))
}

pub fn decode_cant_spectate(r: &mut PacketReader) -> Result<DecodedArgs, ProtocolError> {
    Ok(DecodedArgs::CantSpectate(r.read_i32()?))
}

pub fn decode_spectate_frames(r: &mut PacketReader) -> Result<DecodedArgs, ProtocolError> {
    let rest = r.read_bytes(r.remaining())?;
    Ok(DecodedArgs::SpectateFrames(rest.to_vec()))
}

pub fn decode_join_match(r: &mut PacketReader) -> Result<DecodedArgs, ProtocolError> {
    let match_id = r.read_i32()?;
    let password = r.read_string()?;
    Ok(DecodedArgs::JoinMatch { match_id, password })
}

pub fn decode_match_change_slot(r: &mut PacketReader) -> Result<DecodedArgs, ProtocolError> {
    Ok(DecodedArgs::MatchChangeSlot(r.read_i32()?))
}

pub fn decode_match_lock(r: &mut PacketReader) -> Result<DecodedArgs, ProtocolError> {
    Ok(DecodedArgs::MatchLock(r.read_i32()?))
}

pub fn decode_match_transfer_host(r: &mut PacketReader) -> Result<DecodedArgs, ProtocolError> {
    Ok(DecodedArgs::MatchTransferHost(r.read_i32()?))
}

pub fn decode_match_change_mods(r: &mut PacketReader) -> Result<DecodedArgs, ProtocolError> {
    Ok(DecodedArgs::MatchChangeMods(Mods::from_bits_truncate(
        r.read_u32()?,
    )))
}

pub fn decode_match_change_password(r: &mut PacketReader) -> Result<DecodedArgs, ProtocolError> {
    Ok(DecodedArgs::MatchChangePassword(r.read_string()?))
}

pub fn decode_channel_name(r: &mut PacketReader) -> Result<String, ProtocolError> {
    r.read_string()
}

pub fn decode_channel_join(r: &mut PacketReader) -> Result<DecodedArgs, ProtocolError> {
    Ok(DecodedArgs::ChannelJoin(r.read_string()?))
}

pub fn decode_channel_part(r: &mut PacketReader) -> Result<DecodedArgs, ProtocolError> {
    Ok(DecodedArgs::ChannelPart(r.read_string()?))
}

pub fn decode_friend_add(r: &mut PacketReader) -> Result<DecodedArgs, ProtocolError> {
    Ok(DecodedArgs::FriendAdd(r.read_i32()?))
}

pub fn decode_friend_remove(r: &mut PacketReader) -> Result<DecodedArgs, ProtocolError> {
    Ok(DecodedArgs::FriendRemove(r.read_i32()?))
}

pub fn decode_user_presence_request(r: &mut PacketReader) -> Result<DecodedArgs, ProtocolError> {
    let ids = r.read_list32(|r| r.read_i32())?;
    Ok(DecodedArgs::UserPresenceRequest(ids))
}

pub fn decode_toggle_block_dm(r: &mut PacketReader) -> Result<DecodedArgs, ProtocolError> {
    Ok(DecodedArgs::UserToggleBlockNonFriendDm(r.read_i32()? != 0))
}

pub fn decode_error_report(r: &mut PacketReader) -> Result<DecodedArgs, ProtocolError> {
    Ok(DecodedArgs::ErrorReport(r.read_string()?))
}

/// Modern (>= ~2013) match-creation / match-settings wire shape: 8 slots,
/// full mod/team/scoring fields. See spec §4.1 "match packets have
/// differently sized slot tables" — legacy cohorts override this entry in
/// `cohorts/legacy.rs`.
pub fn decode_create_match(r: &mut PacketReader) -> Result<DecodedArgs, ProtocolError> {
    Ok(DecodedArgs::CreateMatch(decode_new_match_body(r, 8)?))
}

pub(crate) fn decode_new_match_body(
    r: &mut PacketReader,
    _slots: usize,
) -> Result<NewMatchArgs, ProtocolError> {
    let _id = r.read_i16()?;
    let _in_progress = r.read_bool()?;
    let _match_type = r.read_u8()?;
    let mods = Mods::from_bits_truncate(r.read_u32()?);
    let name = r.read_string()?;
    let password = r.read_string()?;
    let beatmap_name = r.read_string()?;
    let beatmap_id = r.read_i32()?;
    let beatmap_md5 = r.read_string()?;
    Ok(NewMatchArgs {
        name,
        password,
        beatmap_name,
        beatmap_id,
        beatmap_md5,
        mode: GameMode::Osu,
        mods,
        team_mode: TeamMode::HeadToHead,
        scoring_mode: ScoringMode::Score,
    })
}

pub fn decode_match_change_settings(r: &mut PacketReader) -> Result<DecodedArgs, ProtocolError> {
    let new = decode_new_match_body(r, 8)?;
    Ok(DecodedArgs::MatchChangeSettings(MatchSettingsArgs {
        name: new.name,
        password: new.password,
        beatmap_name: new.beatmap_name,
        beatmap_id: new.beatmap_id,
        beatmap_md5: new.beatmap_md5,
        mode: new.mode,
        team_mode: new.team_mode,
        scoring_mode: new.scoring_mode,
        freemod: false,
        mods: new.mods,
    }))
}

/// Modern score-frame wire shape. Legacy cohorts omit `using_scorev2`;
/// overridden in `cohorts/legacy.rs`.
pub fn decode_score_update(r: &mut PacketReader) -> Result<DecodedArgs, ProtocolError> {
    let frame = decode_score_frame_body(r)?;
    Ok(DecodedArgs::MatchScoreUpdate(frame))
}

pub(crate) fn decode_score_frame_body(
    r: &mut PacketReader,
) -> Result<ScoreFrame, ProtocolError> {
    let time = r.read_i32()?;
    let id = r.read_u8()?;
    let count_300 = r.read_u16()?;
    let count_100 = r.read_u16()?;
    let count_50 = r.read_u16()?;
    let count_geki = r.read_u16()?;
    let count_katu = r.read_u16()?;
    let count_miss = r.read_u16()?;
    let total_score = r.read_i32()?;
    let max_combo = r.read_u16()?;
    let current_combo = r.read_u16()?;
    let passed = r.read_bool()?;
    let hp = r.read_u8()? as f32 / 200.0;
    let tag = r.read_u8()?;
    let using_scorev2 = r.read_bool()?;
    Ok(ScoreFrame {
        time,
        id,
        total_score,
        max_combo,
        current_combo,
        accuracy: 0.0,
        hp,
        tag,
        using_scorev2,
        count_300,
        count_100,
        count_50,
        count_geki,
        count_katu,
        count_miss,
        slot_id: 0,
        passed,
    })
}

pub fn decode_beatmap_info_request(r: &mut PacketReader) -> Result<DecodedArgs, ProtocolError> {
    let filenames = r.read_list32(|r| r.read_string())?;
    Ok(DecodedArgs::BeatmapInfoRequest {
        filenames,
        ids: Vec::new(),
    })
}

macro_rules! no_arg_decoder {
    ($fn_name:ident, $variant:expr) => {
        pub fn $fn_name(_r: &mut PacketReader) -> Result<DecodedArgs, ProtocolError> {
            Ok($variant)
        }
    };
}

no_arg_decoder!(decode_logout, DecodedArgs::Logout);
no_arg_decoder!(decode_request_status_update, DecodedArgs::RequestStatusUpdate);
no_arg_decoder!(decode_pong, DecodedArgs::Pong);
no_arg_decoder!(decode_stop_spectating, DecodedArgs::StopSpectating);
no_arg_decoder!(decode_join_lobby, DecodedArgs::JoinLobby);
no_arg_decoder!(decode_part_lobby, DecodedArgs::PartLobby);
no_arg_decoder!(decode_part_match, DecodedArgs::PartMatch);
no_arg_decoder!(decode_match_ready, DecodedArgs::MatchReady);
no_arg_decoder!(decode_match_not_ready, DecodedArgs::MatchNotReady);
no_arg_decoder!(decode_match_start, DecodedArgs::MatchStart);
no_arg_decoder!(decode_match_complete, DecodedArgs::MatchComplete);
no_arg_decoder!(decode_match_load_complete, DecodedArgs::MatchLoadComplete);
no_arg_decoder!(decode_match_no_beatmap, DecodedArgs::MatchNoBeatmap);
no_arg_decoder!(decode_match_has_beatmap, DecodedArgs::MatchHasBeatmap);
no_arg_decoder!(decode_match_skip_request, DecodedArgs::MatchSkipRequest);
no_arg_decoder!(decode_match_failed, DecodedArgs::MatchFailed);
no_arg_decoder!(decode_match_change_team, DecodedArgs::MatchChangeTeam);
no_arg_decoder!(decode_user_presence_request_all, DecodedArgs::UserPresenceRequestAll);
