// Server module — session engine, registries and match state machine for
// the chat/multiplayer coordination service.
//
// The module layout mirrors the teacher's `server/` tree (`sv_main`,
// `sv_user`, `sv_send` split by concern) but regrouped around this
// domain's concerns instead of a game server's entity/world simulation.

pub mod channel;
pub mod dispatcher;
pub mod external;
pub mod handlers;
pub mod login;
pub mod multiplayer;
pub mod registry;
pub mod session;
pub mod silence;
pub mod spectator;
pub mod time;

mod state;
pub use state::ServerState;
