// state.rs — the shared server context handed to every session and handler
//
// Grounded on the teacher's `ServerContext` (sv_main.rs/sv_user.rs): one
// struct threading together the registries, configuration, and external
// collaborators that every per-connection operation needs. The teacher
// passes `&mut ServerContext` down a single-threaded frame loop; this
// server instead hands out `Arc<ServerState>` to many worker threads, with
// each piece of mutable state guarded by its own lock (spec §5) rather
// than by one big mutable borrow.

use bancho_common::config::ServerConfig;
use bancho_protocol::Registry as ProtocolRegistry;

use crate::external::Collaborators;
use crate::registry::Registries;

pub struct ServerState {
    pub protocol: ProtocolRegistry,
    pub registries: Registries,
    pub collaborators: Collaborators,
    pub config: ServerConfig,
}

impl ServerState {
    pub fn new(config: ServerConfig, collaborators: Collaborators) -> Self {
        ServerState {
            protocol: bancho_protocol::build_registry(),
            registries: Registries::new(),
            collaborators,
            config,
        }
    }
}
