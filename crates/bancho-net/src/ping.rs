// ping.rs — periodic stale-session sweep
//
// Grounded on the teacher's `sv_check_timeouts` (sv_main.rs): a background
// tick compares each client's `lastmessage` against the configured timeout
// and zombie thresholds, dropping whichever have gone quiet. Generalized
// here from the engine's own frame clock to a dedicated sweep thread, since
// there's no central game loop driving time forward.

use std::sync::Arc;
use std::time::Duration;

use bancho_common::packets::ResponseKind;
use bancho_protocol::encode::EncodePayload;

use bancho_server::session::SessionState;
use bancho_server::time::unix_now;
use bancho_server::ServerState;

const PING_INTERVAL: Duration = Duration::from_secs(20);
const STALE_AFTER_SECS: i64 = 60;

/// Runs forever on its own thread: every tick, pings every live session and
/// marks anything that hasn't answered in `STALE_AFTER_SECS` as `Closing`.
/// The owning I/O thread notices on its next read timeout and tears the
/// connection down (spec §4.2 "LIVE loop" / §5 "periodic ping job").
pub fn run(state: Arc<ServerState>) {
    loop {
        std::thread::sleep(PING_INTERVAL);
        let now = unix_now();
        let droppoint = now - STALE_AFTER_SECS;
        for session in state.registries.players.snapshot() {
            if session.state() != SessionState::Live {
                continue;
            }
            if session.last_response() < droppoint {
                log::info!("dropping stale session {} ({})", session.username(), session.remote_addr());
                session.set_state(SessionState::Closing);
                continue;
            }
            session.send(&state.protocol, ResponseKind::Ping, &EncodePayload::Ping);
        }
    }
}
