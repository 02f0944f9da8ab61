// permissions.rs — player permission bitmask
//
// Same rationale as mods.rs: bitflags, grounded on the teacher's own
// dependency on the crate for this role.

use bitflags::bitflags;

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Permissions: u32 {
        const PLAYER          = 1 << 0;
        const SUPPORTER       = 1 << 2;
        const MODERATOR       = 1 << 3;
        const ADMIN           = 1 << 4;
        const DEVELOPER       = 1 << 5;
        const BAT             = 1 << 7;
        const TOURNAMENT_MANAGER = 1 << 10;
    }
}

impl Permissions {
    pub fn is_staff(self) -> bool {
        self.intersects(Permissions::MODERATOR | Permissions::ADMIN | Permissions::DEVELOPER)
    }

    pub fn is_admin(self) -> bool {
        self.intersects(Permissions::ADMIN | Permissions::DEVELOPER)
    }

    pub fn is_supporter(self) -> bool {
        self.contains(Permissions::SUPPORTER)
    }
}

bitflags! {
    /// Controls which players a session receives presence/status updates from.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct PresenceFilter: u8 {
        const NONE    = 0;
        const ALL     = 1 << 0;
        const FRIENDS = 1 << 1;
    }
}
