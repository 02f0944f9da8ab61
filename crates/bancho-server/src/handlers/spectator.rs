// handlers/spectator.rs — spectator request handlers (spec §4.6)
//
// Thin wrappers: all the actual state transitions live in
// `crate::spectator`, which is shared with the disconnect-teardown path.

use std::sync::Arc;

use bancho_common::error::HandlerError;
use bancho_protocol::decode::DecodedArgs;

use crate::session::Session;
use crate::spectator as spec;
use crate::state::ServerState;

pub fn start_spectating(
    state: &Arc<ServerState>,
    session: &Arc<Session>,
    args: DecodedArgs,
) -> Result<(), HandlerError> {
    if let DecodedArgs::StartSpectating(host_id) = args {
        spec::start_spectating(state, session, host_id);
    }
    Ok(())
}

pub fn stop_spectating(
    state: &Arc<ServerState>,
    session: &Arc<Session>,
    _args: DecodedArgs,
) -> Result<(), HandlerError> {
    spec::stop_spectating(state, session);
    Ok(())
}

pub fn cant_spectate(
    state: &Arc<ServerState>,
    session: &Arc<Session>,
    args: DecodedArgs,
) -> Result<(), HandlerError> {
    if let DecodedArgs::CantSpectate(host_id) = args {
        spec::cant_spectate(state, session, host_id);
    }
    Ok(())
}

pub fn spectate_frames(
    state: &Arc<ServerState>,
    session: &Arc<Session>,
    args: DecodedArgs,
) -> Result<(), HandlerError> {
    if let DecodedArgs::SpectateFrames(bundle) = args {
        spec::relay_frames(state, session, bundle);
    }
    Ok(())
}
