// frame.rs — packet framing over the raw byte stream
//
// Grounded on original_source/app/protocol.py `dataReceived`/
// `packetDataReceived`/`send_packet`: a `u16` id, an optional `u8`
// compressed flag (absent for the gzip-everything legacy cohorts), then
// a `u32` little-endian length, then the body. Compression at the b323
// boundary wraps the *entire* body in gzip rather than per-field, same
// as the Twisted server it's grounded on.

use bancho_common::compression::{gzip_compress, gzip_decompress};
use bancho_common::error::ProtocolError;

use crate::registry::Capabilities;

/// Server accepts frames up to 16 MiB; anything larger almost certainly
/// means a desynced stream rather than a legitimate oversized payload
/// (the largest legitimate body is a multiplayer beatmap-info batch).
const MAX_FRAME_LEN: u32 = 16 * 1024 * 1024;

pub struct RawFrame {
    pub id: u16,
    pub body: Vec<u8>,
}

/// Attempts to pull one complete frame off the front of `buf`. Returns
/// `Ok(None)` when more bytes are needed; on success the consumed prefix
/// is drained from `buf`.
pub fn try_parse_frame(
    buf: &mut Vec<u8>,
    capabilities: Capabilities,
) -> Result<Option<RawFrame>, ProtocolError> {
    let header_len = if capabilities.legacy_compressed_framing {
        2 + 4
    } else {
        2 + 1 + 4
    };
    if buf.len() < header_len {
        return Ok(None);
    }

    let id = u16::from_le_bytes([buf[0], buf[1]]);
    let (compressed, len_offset) = if capabilities.legacy_compressed_framing {
        (true, 2)
    } else {
        (buf[2] != 0, 3)
    };
    let len = u32::from_le_bytes([
        buf[len_offset],
        buf[len_offset + 1],
        buf[len_offset + 2],
        buf[len_offset + 3],
    ]);
    if len > MAX_FRAME_LEN {
        return Err(ProtocolError::FrameTooLarge(len));
    }

    let total = header_len + len as usize;
    if buf.len() < total {
        return Ok(None);
    }

    let mut body = buf[header_len..total].to_vec();
    if compressed {
        body = gzip_decompress(&body)?;
    }
    buf.drain(..total);
    Ok(Some(RawFrame { id, body }))
}

/// Builds the wire bytes for one outbound frame.
pub fn write_frame(id: u16, body: &[u8], capabilities: Capabilities) -> Result<Vec<u8>, ProtocolError> {
    let mut out = Vec::with_capacity(body.len() + 8);
    out.extend_from_slice(&id.to_le_bytes());

    if capabilities.legacy_compressed_framing {
        let compressed = gzip_compress(body)?;
        out.extend_from_slice(&(compressed.len() as u32).to_le_bytes());
        out.extend_from_slice(&compressed);
    } else {
        out.push(0);
        out.extend_from_slice(&(body.len() as u32).to_le_bytes());
        out.extend_from_slice(body);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_modern_frame_and_drains_buffer() {
        let caps = Capabilities::default();
        let mut buf = write_frame(5, b"hello", caps).unwrap();
        buf.extend_from_slice(b"trailing");
        let frame = try_parse_frame(&mut buf, caps).unwrap().unwrap();
        assert_eq!(frame.id, 5);
        assert_eq!(frame.body, b"hello");
        assert_eq!(buf, b"trailing");
    }

    #[test]
    fn returns_none_on_incomplete_frame() {
        let caps = Capabilities::default();
        let mut buf = write_frame(5, b"hello world", caps).unwrap();
        buf.truncate(buf.len() - 3);
        assert!(try_parse_frame(&mut buf, caps).unwrap().is_none());
    }

    #[test]
    fn legacy_framing_round_trips_through_gzip() {
        let caps = Capabilities {
            legacy_compressed_framing: true,
            ..Capabilities::default()
        };
        let mut buf = write_frame(7, b"legacy body", caps).unwrap();
        let frame = try_parse_frame(&mut buf, caps).unwrap().unwrap();
        assert_eq!(frame.id, 7);
        assert_eq!(frame.body, b"legacy body");
    }

    #[test]
    fn oversized_length_is_rejected() {
        let caps = Capabilities::default();
        let mut buf = vec![0u8, 0, 0];
        buf.extend_from_slice(&(MAX_FRAME_LEN + 1).to_le_bytes());
        assert!(try_parse_frame(&mut buf, caps).is_err());
    }
}
