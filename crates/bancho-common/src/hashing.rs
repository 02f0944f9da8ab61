// hashing.rs — password and hardware-fingerprint hashing
//
// Grounded on `original_source/app/objects/player.py`, which verifies the
// client-supplied password md5 against a stored bcrypt hash via the
// `bcrypt` package, and hashes the adapters string with md5 for the
// hardware-ban check. `bcrypt` and `md-5` are the direct Rust analogues.

use md5::{Digest, Md5};

/// Hashes `input` (already-hex md5 of the user's real password, per the
/// login body in spec §6) and returns it hex-encoded. The wire protocol
/// always sends an md5 of the password, never the plaintext, so this is
/// also what gets re-hashed for hardware/adapters fingerprints.
pub fn md5_hex(input: &str) -> String {
    let mut hasher = Md5::new();
    hasher.update(input.as_bytes());
    hex::encode(hasher.finalize())
}

/// Verifies a client-supplied password md5 against a stored bcrypt hash.
pub fn verify_password(password_md5: &str, stored_bcrypt_hash: &str) -> bool {
    bcrypt::verify(password_md5, stored_bcrypt_hash).unwrap_or(false)
}

/// Hashes a plaintext-md5 password into a bcrypt hash suitable for storage.
pub fn hash_password(password_md5: &str) -> Result<String, bcrypt::BcryptError> {
    bcrypt::hash(password_md5, bcrypt::DEFAULT_COST)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn md5_is_deterministic() {
        assert_eq!(md5_hex("hunter2"), md5_hex("hunter2"));
        assert_ne!(md5_hex("hunter2"), md5_hex("hunter3"));
    }

    #[test]
    fn bcrypt_round_trip() {
        let hash = hash_password("deadbeef").unwrap();
        assert!(verify_password("deadbeef", &hash));
        assert!(!verify_password("wrong", &hash));
    }
}
