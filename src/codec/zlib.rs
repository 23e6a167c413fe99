//! Zlib codec using `flate2`.

use std::io::{Read, Write};

use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use flate2::Compression;

use crate::error::{LiveError, Result};

/// Zlib codec for protocol version 2 bodies.
pub struct ZlibCodec;

impl ZlibCodec {
    /// Inflate a zlib stream.
    ///
    /// # Errors
    ///
    /// Returns [`LiveError::Protocol`] if the stream is corrupt or truncated.
    pub fn decompress(data: &[u8]) -> Result<Vec<u8>> {
        Self::decompress_limited(data, usize::MAX)
    }

    /// Inflate a zlib stream, refusing output larger than `max` bytes.
    ///
    /// # Errors
    ///
    /// Returns [`LiveError::Protocol`] if the stream is corrupt, truncated or
    /// inflates past `max`.
    pub fn decompress_limited(data: &[u8], max: usize) -> Result<Vec<u8>> {
        let mut out = Vec::with_capacity(data.len().saturating_mul(4).min(max));
        ZlibDecoder::new(data)
            .take((max as u64).saturating_add(1))
            .read_to_end(&mut out)
            .map_err(|e| LiveError::Protocol(format!("zlib: {e}")))?;
        if out.len() > max {
            return Err(LiveError::Protocol(format!(
                "zlib: inflated body exceeds {max} bytes"
            )));
        }
        Ok(out)
    }

    /// Deflate into a zlib stream.
    pub fn compress(data: &[u8]) -> Result<Vec<u8>> {
        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
        encoder
            .write_all(data)
            .map_err(|e| LiveError::Protocol(format!("zlib: {e}")))?;
        encoder
            .finish()
            .map_err(|e| LiveError::Protocol(format!("zlib: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compress_decompress() {
        let data = br#"{"cmd":"DANMU_MSG","info":[]}"#.repeat(20);
        let packed = ZlibCodec::compress(&data).unwrap();
        assert!(packed.len() < data.len());
        assert_eq!(ZlibCodec::decompress(&packed).unwrap(), data);
    }

    #[test]
    fn test_decompress_limit() {
        let data = vec![b'a'; 4096];
        let packed = ZlibCodec::compress(&data).unwrap();

        assert_eq!(ZlibCodec::decompress_limited(&packed, 4096).unwrap(), data);
        let err = ZlibCodec::decompress_limited(&packed, 4095).unwrap_err();
        assert!(err.to_string().contains("exceeds 4095 bytes"));
    }

    #[test]
    fn test_decompress_garbage() {
        let err = ZlibCodec::decompress(b"\x00\x01\x02garbage").unwrap_err();
        assert!(err.to_string().starts_with("Protocol error: zlib"));
    }
}
