// login.rs — handshake epilogue: login body parsing, authentication and
// the post-login packet sequence (spec §4.2, SPEC_FULL §4)
//
// Grounded on `original_source/app/clients/handler.py`'s `login` coroutine
// and `app/objects/player.py`'s `Version`/tourney-stream handling. The
// teacher has no analogous "accept a credential, mutate shared state,
// reply with a packet burst" path (Quake II's connect handshake
// (`SVC_New`/`SV_ClientConnect` in sv_main.rs/sv_user.rs) is unauthenticated);
// the shape below follows spec.md's own ordering for the epilogue instead.

use std::sync::Arc;

use bancho_common::error::AuthError;
use bancho_common::packets::ResponseKind;
use bancho_common::permissions::{Permissions, PresenceFilter};
use bancho_common::status::{Stats, Status};
use bancho_protocol::encode::{EncodePayload, PresencePayload, StatsPayload};

use crate::external::{DbUser, HardwareRecord};
use crate::registry::tourney::MAX_TOURNEY_SESSIONS;
use crate::session::{HardwareInfo, Session, SessionState};
use crate::state::ServerState;
use crate::time::unix_now;

/// The date-stamp plus optional release-stream suffix a client reports at
/// login (e.g. `b20130815` vs. the `tourney` stream used by the
/// multi-client-per-principal tournament build).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientVersion {
    pub date: i32,
    pub stream: String,
}

fn parse_client_version(raw: &str) -> ClientVersion {
    let digits_end = raw
        .char_indices()
        .skip_while(|(_, c)| !c.is_ascii_digit())
        .take_while(|(_, c)| c.is_ascii_digit())
        .last()
        .map(|(i, c)| i + c.len_utf8())
        .unwrap_or(0);
    let date = raw[..digits_end]
        .chars()
        .filter(|c| c.is_ascii_digit())
        .collect::<String>()
        .parse()
        .unwrap_or(0);
    ClientVersion {
        date,
        stream: raw[digits_end..].to_string(),
    }
}

/// The parsed login body (spec §6 "Login body"): three `\n`-separated
/// lines, the third itself `|`-separated into a version/locale descriptor
/// whose fourth field is the `:`-separated adapters quintuple.
#[derive(Debug, Clone)]
pub struct LoginBody {
    pub username: String,
    pub password_md5: String,
    pub version: ClientVersion,
    pub utc_offset: i32,
    pub display_city: String,
    pub hardware: HardwareInfo,
    pub block_nonfriend_dms: bool,
}

pub fn parse_login_body(raw: &str) -> Result<LoginBody, AuthError> {
    let mut lines = raw.split('\n');
    let username = lines.next().unwrap_or("").trim().to_string();
    let password_md5 = lines.next().unwrap_or("").trim().to_string();
    let descriptor = lines.next().unwrap_or("").trim();

    let mut fields = descriptor.split('|');
    let version = parse_client_version(fields.next().unwrap_or(""));
    let utc_offset: i32 = fields.next().unwrap_or("0").parse().unwrap_or(0);
    let display_city = fields.next().unwrap_or("").to_string();
    let adapters = fields.next().unwrap_or("");
    let block_nonfriend_dms = fields.next().unwrap_or("0").trim() == "1";

    let mut adapter_fields = adapters.split(':');
    let hardware = HardwareInfo {
        osu_md5: adapter_fields.next().unwrap_or("").to_string(),
        adapters_string: adapter_fields.next().unwrap_or("").to_string(),
        adapters_md5: adapter_fields.next().unwrap_or("").to_string(),
        uninstall_id: adapter_fields.next().unwrap_or("").to_string(),
        diskdrive_signature: adapter_fields.next().unwrap_or("").to_string(),
    };

    if username.is_empty() || password_md5.is_empty() {
        return Err(AuthError::Server("malformed login body".to_string()));
    }

    Ok(LoginBody {
        username,
        password_md5,
        version,
        utc_offset,
        display_city,
        hardware,
        block_nonfriend_dms,
    })
}

/// Whether this login should be treated as an additional tourney-client
/// session rather than the principal's singleton ordinary session (spec
/// §4.2, `original_source/app/objects/player.py::is_tourney_client`).
fn is_tourney_stream(version: &ClientVersion) -> bool {
    version.stream.eq_ignore_ascii_case("tourney")
}

/// Verifies credentials, hardware fingerprint and account standing
/// against the external collaborators. Does not mutate `Session` or the
/// registries; callers apply side effects only once this returns `Ok`.
fn authenticate(state: &ServerState, body: &LoginBody) -> Result<DbUser, AuthError> {
    let user = state
        .collaborators
        .users
        .fetch_by_name(&body.username)
        .ok_or(AuthError::UnknownUser)?;

    if !bancho_common::hashing::verify_password(&body.password_md5, &user.password_bcrypt) {
        return Err(AuthError::BadPassword);
    }

    let expected_adapters_md5 = bancho_common::hashing::md5_hex(&body.hardware.adapters_string);
    if expected_adapters_md5 != body.hardware.adapters_md5 {
        return Err(AuthError::BadAdapters);
    }

    if !state.config.version_in_range(body.version.date) {
        return Err(AuthError::UnsupportedVersion);
    }

    let permissions = Permissions::from_bits_truncate(user.permissions);
    if permissions.is_empty() {
        return Err(AuthError::NotActivated);
    }

    if state.config.maintenance && !permissions.is_admin() {
        return Err(AuthError::Maintenance);
    }

    if user.restricted {
        return Err(AuthError::Restricted);
    }

    let conflicting = state
        .collaborators
        .clients
        .fetch_without_executable(&body.hardware.osu_md5, user.id);
    if conflicting.iter().any(|r| r.user_id != user.id) {
        return Err(AuthError::Restricted);
    }

    Ok(user)
}

/// Clamps a `LOGIN_REPLY` error code per spec §4.1 ("legacy cohorts clamp
/// error codes below -2 to -1").
fn clamp_reply_code(code: i32, clamp: bool) -> i32 {
    if clamp && code < -2 {
        -1
    } else {
        code
    }
}

fn send_login_failure(state: &Arc<ServerState>, session: &Arc<Session>, err: &AuthError) {
    let clamp = session.table().capabilities.clamp_login_errors;
    let code = clamp_reply_code(err.login_reply_code(), clamp);
    session.send(
        &state.protocol,
        ResponseKind::LoginReply,
        &EncodePayload::LoginReply(code),
    );
}

/// Replaces an existing singleton session of the same principal (spec
/// §4.2 "terminate the *other* session ... before taking its place").
fn evict_existing_session(state: &Arc<ServerState>, user_id: i32) {
    if let Some(old) = state.registries.players.by_id(user_id) {
        old.send(
            &state.protocol,
            ResponseKind::Notification,
            &EncodePayload::Notification(
                "You have been logged in from another location.".to_string(),
            ),
        );
        old.set_state(SessionState::Closing);
        state.registries.players.remove(user_id);
    }
}

/// Sends the full login epilogue (spec §4.2) once authentication and
/// registry bookkeeping have both succeeded.
fn send_login_epilogue(state: &Arc<ServerState>, session: &Arc<Session>, user: &DbUser) {
    session.send(
        &state.protocol,
        ResponseKind::ProtocolVersion,
        &EncodePayload::ProtocolVersion(session.cohort_key()),
    );
    session.send(
        &state.protocol,
        ResponseKind::LoginReply,
        &EncodePayload::LoginReply(user.id as i32),
    );
    if let Some(icon) = &state.config.menu_icon {
        session.send(
            &state.protocol,
            ResponseKind::MainMenuIcon,
            &EncodePayload::MainMenuIcon(icon.clone()),
        );
    }
    session.send(
        &state.protocol,
        ResponseKind::LoginPermissions,
        &EncodePayload::LoginPermissions(session.permissions().bits()),
    );

    session.send(
        &state.protocol,
        ResponseKind::UserPresence,
        &EncodePayload::UserPresence(PresencePayload {
            user_id: session.id(),
            username: session.username(),
            utc_offset: session.utc_offset() as i8,
            country_code: 0,
            permissions_icon: session.permissions().bits() as u8,
            longitude: 0.0,
            latitude: 0.0,
            global_rank: 0,
        }),
    );
    session.send(
        &state.protocol,
        ResponseKind::UserStats,
        &EncodePayload::UserStats(StatsPayload {
            user_id: session.id(),
            status: session.status(),
            stats: session.stats(),
        }),
    );

    let friends = state.collaborators.relationships.friends_of(user.id);
    session.set_friends(friends.iter().map(|&id| id as i32));
    session.send(
        &state.protocol,
        ResponseKind::FriendsList,
        &EncodePayload::FriendsList(friends.into_iter().map(|id| id as i32).collect()),
    );

    for channel in state.registries.channels.public_channels() {
        if !session.permissions().intersects(channel.read_perm) {
            continue;
        }
        session.send(
            &state.protocol,
            ResponseKind::ChannelAvailable,
            &EncodePayload::ChannelAvailable {
                name: channel.name.clone(),
                topic: channel.topic.clone(),
                member_count: channel.member_count() as i16,
            },
        );
        if state.config.autojoin_channels.iter().any(|n| n == &channel.name) {
            channel.add(session, &state.registries.players, &state.protocol);
        }
    }
    session.send(&state.protocol, ResponseKind::ChannelInfoComplete, &EncodePayload::ChannelInfoComplete);

    let now = unix_now();
    if session.is_silenced(now) {
        session.send(
            &state.protocol,
            ResponseKind::SilenceEnd,
            &EncodePayload::SilenceEnd((session.silence_end() - now) as i32),
        );
    }

    for member_id in state.registries.lobby.members() {
        session.send(
            &state.protocol,
            ResponseKind::LobbyJoin,
            &EncodePayload::LobbyJoin(member_id),
        );
    }
}

/// Full login flow: parse, authenticate, bind the negotiated cohort,
/// register the session and send the epilogue. Returns `Err` (with the
/// failure already written to the socket) when the connection should be
/// dropped instead of promoted to `LIVE`.
pub fn handle_login(
    state: &Arc<ServerState>,
    session: &Arc<Session>,
    raw_body: &str,
) -> Result<(), AuthError> {
    let body = parse_login_body(raw_body)?;
    session.bind_cohort(&state.protocol, body.version.date);
    session.set_utc_offset(body.utc_offset);
    session.set_display_city(&body.display_city);
    session.set_hardware(body.hardware.clone());
    session.set_blocks_nonfriend_dms(body.block_nonfriend_dms);
    session.set_tourney_client(is_tourney_stream(&body.version));

    let user = match authenticate(state, &body) {
        Ok(user) => user,
        Err(err) => {
            send_login_failure(state, session, &err);
            return Err(err);
        }
    };

    if session.is_tourney_client() {
        let supporter = state.config.free_supporter || user.supporter_end > unix_now();
        if !supporter {
            let err = AuthError::Restricted;
            send_login_failure(state, session, &err);
            return Err(err);
        }
        if state.registries.tourney.count(user.id as i32) >= MAX_TOURNEY_SESSIONS {
            let err = AuthError::Server("too many tourney client sessions".to_string());
            send_login_failure(state, session, &err);
            return Err(err);
        }
    } else {
        evict_existing_session(state, user.id as i32);
    }

    session.set_id(user.id as i32);
    session.set_username(&user.name);
    session.set_permissions(Permissions::from_bits_truncate(user.permissions));
    session.set_presence_filter(PresenceFilter::ALL);
    session.set_silence_end(user.silence_end);
    session.set_supporter_end(user.supporter_end);
    session.set_restricted(user.restricted);
    session.set_status(Status::default());
    session.set_stats(Stats::default());
    session.mark_logged_in();
    session.set_state(SessionState::Live);
    session.touch(unix_now());

    state.collaborators.clients.create(HardwareRecord {
        user_id: user.id,
        osu_md5: body.hardware.osu_md5.clone(),
        adapters_md5: body.hardware.adapters_md5.clone(),
        uninstall_id: body.hardware.uninstall_id.clone(),
        diskdrive_signature: body.hardware.diskdrive_signature.clone(),
    });
    state.collaborators.logins.create(
        user.id,
        session.remote_addr(),
        &body.version.date.to_string(),
    );
    state.collaborators.presence_cache.incr_usercount();

    if session.is_tourney_client() {
        state.registries.tourney.add(user.id as i32, session.clone());
    } else {
        state.registries.players.insert(session.clone());
    }

    send_login_epilogue(state, session, &user);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::external::fakes::{null_collaborators, FakeUserStore};
    use crate::external::{DbUser, UserStore};
    use bancho_common::config::ServerConfig;

    fn body(username: &str) -> String {
        let pass = bancho_common::hashing::md5_hex("hunter2");
        let md5 = bancho_common::hashing::md5_hex("adapters");
        format!("{username}\n{pass}\n20130815|0|city|osumd5:adapters:{md5}:uid:disk|0\n")
    }

    fn state_with_user(user: DbUser) -> (Arc<ServerState>, Arc<FakeUserStore>) {
        let store = Arc::new(FakeUserStore::default());
        store.by_id.lock().insert(user.id, user);
        let mut collaborators = null_collaborators();
        collaborators.users = Box::new(ClonedUserStore(store.clone()));
        let st = Arc::new(ServerState::new(
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
            collaborators,
        ));
        (st, store)
    }

    struct ClonedUserStore(Arc<FakeUserStore>);
    impl UserStore for ClonedUserStore {
        fn fetch_by_id(&self, id: i64) -> Option<DbUser> {
            self.0.fetch_by_id(id)
        }
        fn fetch_by_name(&self, name: &str) -> Option<DbUser> {
            self.0.fetch_by_name(name)
        }
        fn update(&self, id: i64, fields: crate::external::UserFields) {
            self.0.update(id, fields)
        }
    }

    fn fresh_session(port: u16) -> Arc<Session> {
        let (tx, _rx) = crossbeam::channel::unbounded();
        Session::new(format!("127.0.0.1:{port}"), tx)
    }

    fn active_user(name: &str) -> DbUser {
        DbUser {
            id: 7,
            name: name.to_string(),
            password_bcrypt: bancho_common::hashing::hash_password(&bancho_common::hashing::md5_hex("hunter2")).unwrap(),
            country: "US".to_string(),
            permissions: Permissions::PLAYER.bits(),
            silence_end: 0,
            supporter_end: 0,
            restricted: false,
        }
    }

    #[test]
    fn parses_login_body_into_fields() {
        let parsed = parse_login_body(&body("peppy")).unwrap();
        assert_eq!(parsed.username, "peppy");
        assert_eq!(parsed.version.date, 20130815);
        assert_eq!(parsed.display_city, "city");
    }

    #[test]
    fn unknown_username_fails_with_clamped_reply() {
        let (st, _store) = state_with_user(active_user("peppy"));
        let session = fresh_session(4001);
        let result = handle_login(&st, &session, &body("ghost"));
        assert!(matches!(result, Err(AuthError::UnknownUser)));
        assert!(!session.logged_in());
    }

    #[test]
    fn valid_login_registers_session_and_marks_live() {
        let (st, _store) = state_with_user(active_user("peppy"));
        let session = fresh_session(4002);
        handle_login(&st, &session, &body("peppy")).unwrap();
        assert!(session.logged_in());
        assert_eq!(session.state(), SessionState::Live);
        assert_eq!(st.registries.players.by_id(7).unwrap().id(), 7);
    }

    #[test]
    fn restricted_account_is_rejected() {
        let mut user = active_user("peppy");
        user.restricted = true;
        let (st, _store) = state_with_user(user);
        let session = fresh_session(4003);
        let result = handle_login(&st, &session, &body("peppy"));
        assert!(matches!(result, Err(AuthError::Restricted)));
    }

    #[test]
    fn not_activated_account_with_zero_permissions_is_rejected() {
        let mut user = active_user("peppy");
        user.permissions = 0;
        let (st, _store) = state_with_user(user);
        let session = fresh_session(4004);
        let result = handle_login(&st, &session, &body("peppy"));
        assert!(matches!(result, Err(AuthError::NotActivated)));
    }

    #[test]
    fn second_ordinary_login_evicts_the_first_session() {
        let (st, _store) = state_with_user(active_user("peppy"));
        let first = fresh_session(4005);
        handle_login(&st, &first, &body("peppy")).unwrap();
        assert_eq!(first.state(), SessionState::Live);

        let second = fresh_session(4006);
        handle_login(&st, &second, &body("peppy")).unwrap();
        assert_eq!(first.state(), SessionState::Closing);
        assert_eq!(st.registries.players.by_id(7).unwrap().remote_addr(), second.remote_addr());
    }

    #[test]
    fn client_version_parses_date_and_stream_suffix() {
        let v = parse_client_version("b20130815tourney");
        assert_eq!(v.date, 20130815);
        assert_eq!(v.stream, "tourney");
        assert!(is_tourney_stream(&v));
    }
}
