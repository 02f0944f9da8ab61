// mods.rs — gameplay mod bitmask
//
// Grounded on the teacher's own `bitflags` dependency (myq2-common's
// Cargo.toml) used for exactly this kind of bitmask domain type.

use bitflags::bitflags;

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Mods: u32 {
        const NO_FAIL        = 1 << 0;
        const EASY           = 1 << 1;
        const NO_VIDEO       = 1 << 2;
        const HIDDEN         = 1 << 3;
        const HARD_ROCK      = 1 << 4;
        const SUDDEN_DEATH   = 1 << 5;
        const DOUBLE_TIME    = 1 << 6;
        const RELAX          = 1 << 7;
        const HALF_TIME      = 1 << 8;
        const NIGHTCORE      = 1 << 9;
        const FLASHLIGHT     = 1 << 10;
        const AUTOPLAY       = 1 << 11;
        const SPUN_OUT       = 1 << 12;
        const AUTOPILOT      = 1 << 13;
        const PERFECT        = 1 << 14;
        const KEY4           = 1 << 15;
        const KEY5           = 1 << 16;
        const KEY6           = 1 << 17;
        const KEY7           = 1 << 18;
        const KEY8           = 1 << 19;
        const FADE_IN        = 1 << 20;
        const RANDOM         = 1 << 21;
        const CINEMA         = 1 << 22;
        const TARGET         = 1 << 23;
        const KEY9           = 1 << 24;
        const KEY_COOP       = 1 << 25;
        const KEY1           = 1 << 26;
        const KEY3           = 1 << 27;
        const KEY2           = 1 << 28;
        const SCORE_V2       = 1 << 29;
        const LAST_MOD       = 1 << 30;
    }
}

impl Mods {
    pub const SPEED_MODS: Mods = Mods::from_bits_truncate(
        Mods::DOUBLE_TIME.bits() | Mods::HALF_TIME.bits() | Mods::NIGHTCORE.bits(),
    );

    pub const FREE_MOD_ALLOWED: Mods = Mods::from_bits_truncate(
        Mods::NO_FAIL.bits()
            | Mods::EASY.bits()
            | Mods::HIDDEN.bits()
            | Mods::HARD_ROCK.bits()
            | Mods::SUDDEN_DEATH.bits()
            | Mods::FLASHLIGHT.bits()
            | Mods::FADE_IN.bits()
            | Mods::RELAX.bits()
            | Mods::AUTOPILOT.bits()
            | Mods::SPUN_OUT.bits(),
    );

    /// Invariant from spec §3: DoubleTime and Nightcore can't both be set;
    /// Nightcore wins.
    pub fn normalize(self) -> Mods {
        if self.contains(Mods::DOUBLE_TIME) && self.contains(Mods::NIGHTCORE) {
            self & !Mods::DOUBLE_TIME
        } else {
            self
        }
    }

    /// Match-wide mods retain only speed mods when freemod is on (spec §3).
    pub fn match_wide_under_freemod(self) -> Mods {
        self & Mods::SPEED_MODS
    }

    /// Per-slot mods under freemod may only carry freemod-allowed bits.
    pub fn slot_under_freemod(self) -> Mods {
        self & Mods::FREE_MOD_ALLOWED
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nightcore_wins_over_double_time() {
        let mods = (Mods::DOUBLE_TIME | Mods::NIGHTCORE).normalize();
        assert!(mods.contains(Mods::NIGHTCORE));
        assert!(!mods.contains(Mods::DOUBLE_TIME));
    }

    #[test]
    fn double_time_alone_is_untouched() {
        let mods = Mods::DOUBLE_TIME.normalize();
        assert!(mods.contains(Mods::DOUBLE_TIME));
    }
}
