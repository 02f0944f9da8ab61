// handlers/mod.rs — request handler catalog (spec §4, §5)
//
// Grouped by the same concerns the teacher splits its `svcmd_t` table
// into across sv_user.rs (movement, chat, userinfo): one file per
// functional area rather than one handler per packet.

pub mod channel;
pub mod lobby;
pub mod messaging;
pub mod multiplayer;
pub mod presence;
pub mod spectator;
