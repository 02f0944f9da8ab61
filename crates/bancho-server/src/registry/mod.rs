// registry/mod.rs — the three process-wide registries (spec §4.3)

pub mod channels;
pub mod lobby;
pub mod matches;
pub mod players;
pub mod tourney;

pub use channels::ChannelRegistry;
pub use lobby::LobbyRegistry;
pub use matches::MatchRegistry;
pub use players::PlayerRegistry;
pub use tourney::TourneyRegistry;

#[derive(Default)]
pub struct Registries {
    pub players: PlayerRegistry,
    pub channels: ChannelRegistry,
    pub matches: MatchRegistry,
    pub lobby: LobbyRegistry,
    pub tourney: TourneyRegistry,
}

impl Registries {
    pub fn new() -> Self {
        Self::default()
    }
}
