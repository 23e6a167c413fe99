//! Batch decoder for inbound WebSocket messages.
//!
//! One WebSocket binary message holds one or more concatenated frames. Frames
//! with protocol version 2 (zlib) or 3 (brotli) carry a compressed body that is
//! itself a concatenation of frames, so decoding recurses into it.
//!
//! Decoding fails fast: the first malformed frame stops the batch. Packets
//! decoded before the failure are kept in the output vector, in wire order.
//!
//! Every body, plain or inflated, is capped at the decoder's payload limit so
//! a small compressed frame cannot expand without bound.
//!
//! # Example
//!
//! ```
//! use bililive_engine::protocol::{encode_with, BatchDecoder, Operation, ProtocolVersion};
//!
//! let mut wire = encode_with(ProtocolVersion::Plain, Operation::Message, br#"{"cmd":"A"}"#).to_vec();
//! wire.extend_from_slice(&encode_with(ProtocolVersion::Plain, Operation::Message, br#"{"cmd":"B"}"#));
//!
//! let mut packets = Vec::new();
//! BatchDecoder::new().decode_into(wire.into(), &mut packets).unwrap();
//! assert_eq!(packets.len(), 2);
//! ```

use bytes::Bytes;

use super::frame::Packet;
use super::wire_format::{Header, ProtocolVersion, HEADER_SIZE};
use crate::codec::{BrotliCodec, ZlibCodec};
use crate::error::{LiveError, Result};

/// Default limit on compressed-batch nesting.
pub const MAX_NESTING: usize = 8;

/// Default limit on one body, before or after decompression (8 MiB).
pub const DEFAULT_MAX_PAYLOAD_SIZE: usize = 8 * 1024 * 1024;

/// Splits wire messages into packets, decompressing batches recursively.
#[derive(Debug, Clone, Copy)]
pub struct BatchDecoder {
    max_depth: usize,
    max_payload_size: usize,
}

impl BatchDecoder {
    /// Create a decoder with the default limits.
    pub fn new() -> Self {
        Self {
            max_depth: MAX_NESTING,
            max_payload_size: DEFAULT_MAX_PAYLOAD_SIZE,
        }
    }

    /// Create a decoder with a custom nesting limit.
    pub fn with_max_depth(max_depth: usize) -> Self {
        Self {
            max_depth,
            ..Self::new()
        }
    }

    /// Create a decoder with a custom payload limit.
    pub fn with_max_payload(max_payload_size: usize) -> Self {
        Self {
            max_payload_size,
            ..Self::new()
        }
    }

    pub fn max_payload_size(&self) -> usize {
        self.max_payload_size
    }

    /// Decode every frame in `buf`, appending packets to `out`.
    ///
    /// # Errors
    ///
    /// Returns [`LiveError::Protocol`] on a truncated header, a length field
    /// that disagrees with the buffer, an unknown protocol version, a
    /// decompression failure, a body larger than the payload limit or nesting
    /// beyond the configured depth. Packets
    /// appended before the error stay in `out`.
    pub fn decode_into(&self, buf: Bytes, out: &mut Vec<Packet>) -> Result<()> {
        self.decode_level(buf, out, 0)
    }

    fn decode_level(&self, buf: Bytes, out: &mut Vec<Packet>, depth: usize) -> Result<()> {
        if depth > self.max_depth {
            return Err(LiveError::Protocol(format!(
                "compressed batches nested deeper than {}",
                self.max_depth
            )));
        }

        let mut offset = 0;
        while offset < buf.len() {
            let remaining = buf.len() - offset;
            let header = Header::decode(&buf[offset..]).ok_or_else(|| {
                LiveError::Protocol(format!(
                    "truncated header: {} bytes left, need {}",
                    remaining, HEADER_SIZE
                ))
            })?;
            header.validate(remaining)?;
            if header.body_len() > self.max_payload_size {
                return Err(LiveError::Protocol(format!(
                    "payload size {} exceeds maximum {}",
                    header.body_len(),
                    self.max_payload_size
                )));
            }

            let body_start = offset + header.header_length as usize;
            let body_end = offset + header.total_length as usize;
            let body = buf.slice(body_start..body_end);

            let version = header.version().ok_or_else(|| {
                LiveError::Protocol(format!(
                    "unknown protocol version {}",
                    header.protocol_version
                ))
            })?;

            match version {
                ProtocolVersion::Plain | ProtocolVersion::Popularity => {
                    out.push(Packet::new(header.operation(), body));
                }
                ProtocolVersion::Zlib => {
                    let inflated = ZlibCodec::decompress_limited(&body, self.max_payload_size)?;
                    self.decode_level(Bytes::from(inflated), out, depth + 1)?;
                }
                ProtocolVersion::Brotli => {
                    let inflated = BrotliCodec::decompress_limited(&body, self.max_payload_size)?;
                    self.decode_level(Bytes::from(inflated), out, depth + 1)?;
                }
            }

            offset = body_end;
        }

        Ok(())
    }
}

impl Default for BatchDecoder {
    fn default() -> Self {
        Self::new()
    }
}

/// Decode with the default decoder, appending to `out`.
#[inline]
pub fn decode_into(buf: Bytes, out: &mut Vec<Packet>) -> Result<()> {
    BatchDecoder::new().decode_into(buf, out)
}

/// Decode with the default decoder into a fresh vector.
///
/// Unlike [`decode_into`], packets decoded before an error are discarded.
pub fn decode_packets(buf: Bytes) -> Result<Vec<Packet>> {
    let mut out = Vec::new();
    decode_into(buf, &mut out)?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{encode_with, Operation};

    fn plain(body: &str) -> Vec<u8> {
        encode_with(ProtocolVersion::Plain, Operation::Message, body.as_bytes()).to_vec()
    }

    #[test]
    fn test_single_plain_frame() {
        let packets = decode_packets(Bytes::from(plain(r#"{"cmd":"LIVE"}"#))).unwrap();
        assert_eq!(packets.len(), 1);
        assert_eq!(packets[0].operation, Operation::Message);
        assert_eq!(packets[0].body(), br#"{"cmd":"LIVE"}"#);
    }

    #[test]
    fn test_empty_buffer_yields_nothing() {
        assert!(decode_packets(Bytes::new()).unwrap().is_empty());
    }

    #[test]
    fn test_zlib_batch_preserves_order() {
        let mut inner = plain(r#"{"cmd":"A"}"#);
        inner.extend(plain(r#"{"cmd":"B"}"#));
        inner.extend(plain(r#"{"cmd":"C"}"#));
        let compressed = ZlibCodec::compress(&inner).unwrap();
        let wire = encode_with(ProtocolVersion::Zlib, Operation::Message, &compressed);

        let packets = decode_packets(wire).unwrap();
        let bodies: Vec<&[u8]> = packets.iter().map(|p| p.body()).collect();
        assert_eq!(
            bodies,
            vec![
                &br#"{"cmd":"A"}"#[..],
                &br#"{"cmd":"B"}"#[..],
                &br#"{"cmd":"C"}"#[..]
            ]
        );
    }

    #[test]
    fn test_brotli_batch() {
        let mut inner = plain(r#"{"cmd":"X"}"#);
        inner.extend(plain(r#"{"cmd":"Y"}"#));
        let compressed = BrotliCodec::compress(&inner).unwrap();
        let wire = encode_with(ProtocolVersion::Brotli, Operation::Message, &compressed);

        let packets = decode_packets(wire).unwrap();
        assert_eq!(packets.len(), 2);
        assert_eq!(packets[1].body(), br#"{"cmd":"Y"}"#);
    }

    #[test]
    fn test_plain_frame_after_compressed_batch() {
        let inner = plain(r#"{"cmd":"A"}"#);
        let compressed = ZlibCodec::compress(&inner).unwrap();
        let mut wire = encode_with(ProtocolVersion::Zlib, Operation::Message, &compressed).to_vec();
        wire.extend(plain(r#"{"cmd":"B"}"#));

        let packets = decode_packets(Bytes::from(wire)).unwrap();
        assert_eq!(packets.len(), 2);
        assert_eq!(packets[1].body(), br#"{"cmd":"B"}"#);
    }

    #[test]
    fn test_truncated_header_keeps_earlier_packets() {
        let mut wire = plain(r#"{"cmd":"A"}"#);
        wire.extend_from_slice(&[0, 0, 0]);

        let mut out = Vec::new();
        let err = decode_into(Bytes::from(wire), &mut out).unwrap_err();
        assert!(matches!(err, LiveError::Protocol(_)));
        assert_eq!(out.len(), 1);
    }

    #[test]
    fn test_length_past_buffer_is_error() {
        let mut wire = plain(r#"{"cmd":"A"}"#);
        wire.truncate(wire.len() - 2);
        assert!(decode_packets(Bytes::from(wire)).is_err());
    }

    #[test]
    fn test_unknown_protocol_version_is_error() {
        let mut wire = plain(r#"{"cmd":"A"}"#);
        wire[7] = 9;
        let err = decode_packets(Bytes::from(wire)).unwrap_err();
        assert!(err.to_string().contains("unknown protocol version 9"));
    }

    #[test]
    fn test_corrupt_zlib_body_is_error() {
        let wire = encode_with(ProtocolVersion::Zlib, Operation::Message, b"not zlib at all");
        assert!(matches!(
            decode_packets(wire),
            Err(LiveError::Protocol(_))
        ));
    }

    #[test]
    fn test_nesting_limit() {
        let mut wire = plain(r#"{"cmd":"DEEP"}"#);
        for _ in 0..3 {
            let compressed = ZlibCodec::compress(&wire).unwrap();
            wire = encode_with(ProtocolVersion::Zlib, Operation::Message, &compressed).to_vec();
        }

        let mut out = Vec::new();
        assert!(BatchDecoder::with_max_depth(2)
            .decode_into(Bytes::from(wire.clone()), &mut out)
            .is_err());
        assert!(out.is_empty());

        BatchDecoder::with_max_depth(3)
            .decode_into(Bytes::from(wire), &mut out)
            .unwrap();
        assert_eq!(out.len(), 1);
    }

    #[test]
    fn test_inflated_batch_over_limit_is_error() {
        let inner = plain(&format!(r#"{{"cmd":"BIG","pad":"{}"}}"#, "x".repeat(64 * 1024)));
        let compressed = ZlibCodec::compress(&inner).unwrap();
        assert!(compressed.len() < 1024);
        let wire = encode_with(ProtocolVersion::Zlib, Operation::Message, &compressed);

        let err = BatchDecoder::with_max_payload(1024)
            .decode_into(wire.clone(), &mut Vec::new())
            .unwrap_err();
        assert!(err.to_string().contains("exceeds 1024 bytes"));

        let mut out = Vec::new();
        BatchDecoder::with_max_payload(inner.len())
            .decode_into(wire, &mut out)
            .unwrap();
        assert_eq!(out.len(), 1);
    }

    #[test]
    fn test_brotli_batch_over_limit_is_error() {
        let inner = plain(&"y".repeat(8 * 1024));
        let compressed = BrotliCodec::compress(&inner).unwrap();
        let wire = encode_with(ProtocolVersion::Brotli, Operation::Message, &compressed);

        assert!(matches!(
            BatchDecoder::with_max_payload(512).decode_into(wire, &mut Vec::new()),
            Err(LiveError::Protocol(_))
        ));
    }

    #[test]
    fn test_plain_body_over_limit_keeps_earlier_packets() {
        let mut wire = plain(r#"{"cmd":"A"}"#);
        wire.extend(plain(&"z".repeat(100)));

        let mut out = Vec::new();
        let err = BatchDecoder::with_max_payload(64)
            .decode_into(Bytes::from(wire), &mut out)
            .unwrap_err();
        assert!(err.to_string().contains("payload size 100 exceeds maximum 64"));
        assert_eq!(out.len(), 1);
    }

    #[test]
    fn test_default_limits() {
        let decoder = BatchDecoder::default();
        assert_eq!(decoder.max_payload_size(), DEFAULT_MAX_PAYLOAD_SIZE);
        assert_eq!(BatchDecoder::with_max_depth(2).max_payload_size(), DEFAULT_MAX_PAYLOAD_SIZE);
    }

    #[test]
    fn test_heartbeat_reply_packet() {
        let wire = encode_with(
            ProtocolVersion::Popularity,
            Operation::HeartbeatReply,
            &1234u32.to_be_bytes(),
        );
        let packets = decode_packets(wire).unwrap();
        assert_eq!(packets[0].operation, Operation::HeartbeatReply);
        assert_eq!(packets[0].body(), &1234u32.to_be_bytes());
    }
}
