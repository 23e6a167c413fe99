//! Brotli codec using the `brotli` crate.

use std::io::{Read, Write};

use crate::error::{LiveError, Result};

const BUFFER_SIZE: usize = 4096;
const QUALITY: u32 = 5;
const WINDOW_BITS: u32 = 22;

/// Brotli codec for protocol version 3 bodies.
pub struct BrotliCodec;

impl BrotliCodec {
    /// Decompress a brotli stream.
    ///
    /// # Errors
    ///
    /// Returns [`LiveError::Protocol`] if the stream is corrupt or truncated.
    pub fn decompress(data: &[u8]) -> Result<Vec<u8>> {
        Self::decompress_limited(data, usize::MAX)
    }

    /// Decompress, refusing output larger than `max` bytes.
    pub fn decompress_limited(data: &[u8], max: usize) -> Result<Vec<u8>> {
        let mut out = Vec::with_capacity(data.len().saturating_mul(4).min(max));
        brotli::Decompressor::new(data, BUFFER_SIZE)
            .take((max as u64).saturating_add(1))
            .read_to_end(&mut out)
            .map_err(|e| LiveError::Protocol(format!("brotli: {e}")))?;
        if out.len() > max {
            return Err(LiveError::Protocol(format!(
                "brotli: decompressed body exceeds {max} bytes"
            )));
        }
        Ok(out)
    }

    /// Compress into a brotli stream.
    pub fn compress(data: &[u8]) -> Result<Vec<u8>> {
        let mut writer = brotli::CompressorWriter::new(Vec::new(), BUFFER_SIZE, QUALITY, WINDOW_BITS);
        writer
            .write_all(data)
            .map_err(|e| LiveError::Protocol(format!("brotli: {e}")))?;
        Ok(writer.into_inner())
    }
}
