// error.rs — crate-wide error types
//
// The teacher (myq2-common/src/common.rs) handles engine errors with
// `com_error`, which panics on ERR_FATAL. That is the right call for a
// single-player game client but wrong here: one malformed frame from one
// player must never bring the whole server down. Every fallible path in
// this crate returns a typed error instead.

use thiserror::Error;

/// Errors raised while decoding or encoding a wire-format value.
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("unexpected end of buffer: wanted {wanted} bytes, {remaining} left")]
    UnexpectedEof { wanted: usize, remaining: usize },

    #[error("string length {0} exceeds maximum of {1}")]
    StringTooLong(usize, usize),

    #[error("invalid string presence tag {0:#04x}")]
    BadStringTag(u8),

    #[error("varint length prefix overflowed")]
    VarintOverflow,

    #[error("gzip payload failed to inflate: {0}")]
    Gzip(#[from] std::io::Error),

    #[error("payload length {0} exceeds the maximum frame size")]
    FrameTooLarge(u32),
}

/// Errors raised while authenticating a connecting client.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("unknown username")]
    UnknownUser,

    #[error("password mismatch")]
    BadPassword,

    #[error("adapters hash mismatch")]
    BadAdapters,

    #[error("account is restricted")]
    Restricted,

    #[error("account is not activated")]
    NotActivated,

    #[error("server is in maintenance mode")]
    Maintenance,

    #[error("client version is not supported")]
    UnsupportedVersion,

    #[error("server error: {0}")]
    Server(String),
}

impl AuthError {
    /// Maps an auth failure onto the `LOGIN_REPLY` integer code from spec §6.
    pub fn login_reply_code(&self) -> i32 {
        match self {
            AuthError::UnknownUser | AuthError::BadPassword | AuthError::BadAdapters => -1,
            AuthError::UnsupportedVersion => -2,
            AuthError::Restricted => -3,
            AuthError::NotActivated => -6,
            AuthError::Maintenance | AuthError::Server(_) => -5,
        }
    }
}

/// Errors raised by a request handler. Per spec §7, these never tear down
/// the connection; the dispatcher logs them and moves on.
#[derive(Debug, Error)]
pub enum HandlerError {
    #[error("no decoder registered for this packet on the negotiated cohort")]
    MissingDecoder,

    #[error("business rule rejected the request: {0}")]
    Rejected(&'static str),

    #[error(transparent)]
    Protocol(#[from] ProtocolError),
}
