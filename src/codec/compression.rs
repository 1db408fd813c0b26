//! Compression Module
//!
//! zlib framing over deflate via flate2. Inflation also accepts gzip streams.

use std::io::{Read, Write};

use flate2::read::{GzDecoder, ZlibDecoder};
use flate2::write::ZlibEncoder;
use flate2::Compression;

use crate::error::{CacheError, Result};

/// Leading bytes of a gzip member.
const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

// == Compress ==
/// Deflates `bytes` into a zlib stream (header, deflate data, Adler-32 trailer).
pub fn compress(bytes: &[u8], level: Compression) -> Result<Vec<u8>> {
    let mut encoder = ZlibEncoder::new(Vec::with_capacity(bytes.len() / 4 + 16), level);
    encoder
        .write_all(bytes)
        .map_err(|e| CacheError::Internal(format!("deflate failed: {}", e)))?;
    encoder
        .finish()
        .map_err(|e| CacheError::Internal(format!("deflate failed: {}", e)))
}

// == Decompress ==
/// Inflates a zlib or gzip stream.
///
/// An empty input is not a valid stream and is rejected along with any
/// corrupt input.
pub fn decompress(bytes: &[u8]) -> Result<Vec<u8>> {
    if bytes.is_empty() {
        return Err(CacheError::MalformedPayload(
            "empty compressed stream".to_string(),
        ));
    }

    let mut out = Vec::with_capacity(bytes.len() * 4);
    let read = if bytes.starts_with(&GZIP_MAGIC) {
        GzDecoder::new(bytes).read_to_end(&mut out)
    } else {
        ZlibDecoder::new(bytes).read_to_end(&mut out)
    };

    read.map_err(|e| CacheError::MalformedPayload(format!("inflate failed: {}", e)))?;
    Ok(out)
}
