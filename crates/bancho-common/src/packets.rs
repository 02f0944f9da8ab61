// packets.rs — the logical packet catalog (spec §6)
//
// No direct teacher precedent — Quake II has one fixed `SvcOps`/`ClcOps`
// pair (qcommon.rs) rather than a versioned catalog of logical names with
// per-cohort numeric ids. These two enums *are* the per-cohort-independent
// contract §4.1 describes: numeric ids are assigned by each cohort's
// table in `bancho-protocol`, never hard-coded here.

/// Packets a client sends to the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestKind {
    ChangeAction,
    SendPublicMessage,
    Logout,
    RequestStatusUpdate,
    Pong,
    StartSpectating,
    StopSpectating,
    SpectateFrames,
    ErrorReport,
    CantSpectate,
    SendPrivateMessage,
    PartLobby,
    JoinLobby,
    CreateMatch,
    JoinMatch,
    PartMatch,
    MatchChangeSlot,
    MatchReady,
    MatchLock,
    MatchChangeSettings,
    MatchStart,
    MatchScoreUpdate,
    MatchComplete,
    MatchChangeMods,
    MatchLoadComplete,
    MatchNoBeatmap,
    MatchNotReady,
    MatchFailed,
    MatchHasBeatmap,
    MatchSkipRequest,
    ChannelJoin,
    ChannelPart,
    BeatmapInfoRequest,
    MatchTransferHost,
    FriendAdd,
    FriendRemove,
    MatchChangeTeam,
    ChannelMessageInfoRequest,
    MatchChangePassword,
    TournamentMatchInfoRequest,
    UserPresenceRequest,
    UserPresenceRequestAll,
    UserToggleBlockNonFriendDm,
    TournamentJoinMatchChannel,
    TournamentLeaveMatchChannel,
}

/// Packets the server sends to a client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResponseKind {
    UserId,
    SendMessage,
    Ping,
    HandleIrcChangeUsername,
    HandleIrcQuit,
    UserStats,
    UserLogout,
    SpectatorJoined,
    SpectatorLeft,
    SpectateFrames,
    VersionUpdate,
    SpectatorCantSpectate,
    GetAttention,
    Notification,
    UpdateMatch,
    NewMatch,
    DisbandMatch,
    LobbyJoin,
    LobbyPart,
    MatchJoinSuccess,
    MatchJoinFail,
    FellowSpectatorJoined,
    FellowSpectatorLeft,
    MatchStart,
    MatchScoreUpdate,
    MatchTransferHost,
    MatchAllPlayersLoaded,
    MatchPlayerFailed,
    MatchComplete,
    MatchSkip,
    UserPresenceSingle,
    UserPresenceBundle,
    UserPresence,
    SilenceEnd,
    UserSilenced,
    UserPresenceAll,
    UserDmBlocked,
    TargetIsSilenced,
    VersionUpdateForced,
    SwitchServer,
    AccountRestricted,
    RtxPlaying,
    MatchAbort,
    SwitchTournamentServer,
    LoginReply,
    ChannelInfoComplete,
    ChannelAvailable,
    ChannelJoinSuccess,
    ChannelInfo,
    ChannelRevoked,
    ChannelAutoJoinAvailable,
    BeatmapInfoReply,
    LoginPermissions,
    FriendsList,
    ProtocolVersion,
    MainMenuIcon,
    MonitorNotification,
    MatchPlayerSkipped,
    UserPresenceBundleCompact,
    UserRestricted,
    MatchInvite,
    ChannelInfoEnd,
    ChannelKicked,
    IrcJoin,
    IrcQuit,
}

/// A single logical packet kind, tagged by direction. Used for the
/// dispatcher table key and the cohort override map key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PacketKind {
    Request(RequestKind),
    Response(ResponseKind),
}

impl From<RequestKind> for PacketKind {
    fn from(v: RequestKind) -> Self {
        PacketKind::Request(v)
    }
}

impl From<ResponseKind> for PacketKind {
    fn from(v: ResponseKind) -> Self {
        PacketKind::Response(v)
    }
}
