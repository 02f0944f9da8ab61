// time.rs — wall-clock helper
//
// The teacher reads its clock off the engine's own frame timer
// (`Sys_Milliseconds` in sv_main.rs); there's no game loop here, so
// handlers that need a timestamp (silence expiry, chat rate limiting,
// `last_response`) read the system clock directly instead.

use std::time::{SystemTime, UNIX_EPOCH};

pub fn unix_now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}
