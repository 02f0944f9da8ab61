// compression.rs -- gzip framing for legacy (cohort <= b323) packets
//
// The teacher's compression.rs (myq2-common/src/compression.rs) wraps
// `flate2`'s raw-deflate encoder for the Q2Pro protocol's zlib packets.
// The wire format this crate targets uses plain gzip instead (see
// `original_source/app/protocol.py`, which calls `gzip.decompress` /
// `gzip.compress` directly), so this module swaps in `flate2::read::{GzDecoder,GzEncoder}`
// but keeps the same "decode on the way in, encode on the way out" shape.

use std::io::{Read, Write};

use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;

use crate::error::ProtocolError;

pub const MAX_DECOMPRESSED_SIZE: usize = 4 * 1024 * 1024;

/// Gzip-compresses `data`, used when writing to a cohort `<= b323`.
pub fn gzip_compress(data: &[u8]) -> Result<Vec<u8>, ProtocolError> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data)?;
    Ok(encoder.finish()?)
}

/// Gzip-decompresses `data`, used when reading from a cohort `<= b323`.
/// Bounded by `MAX_DECOMPRESSED_SIZE` to avoid a decompression bomb from a
/// hostile legacy client.
pub fn gzip_decompress(data: &[u8]) -> Result<Vec<u8>, ProtocolError> {
    let mut decoder = GzDecoder::new(data);
    let mut out = Vec::new();
    decoder
        .by_ref()
        .take(MAX_DECOMPRESSED_SIZE as u64)
        .read_to_end(&mut out)?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips() {
        let original = b"the quick brown fox jumps over the lazy dog".repeat(8);
        let compressed = gzip_compress(&original).unwrap();
        let decompressed = gzip_decompress(&compressed).unwrap();
        assert_eq!(decompressed, original);
    }
}
