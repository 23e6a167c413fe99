//! Packet type and outbound frame building.
//!
//! A [`Packet`] is one decoded, uncompressed unit: its operation code and body.
//! Uses `bytes::Bytes` so bodies share the receive buffer instead of copying.
//!
//! # Example
//!
//! ```
//! use bililive_engine::protocol::{encode, decode_packets, Operation, HEARTBEAT_BODY};
//!
//! let frame = encode(Operation::Heartbeat, HEARTBEAT_BODY);
//! let packets = decode_packets(frame).unwrap();
//!
//! assert_eq!(packets[0].operation, Operation::Heartbeat);
//! assert_eq!(packets[0].body(), HEARTBEAT_BODY);
//! ```

use bytes::{BufMut, Bytes, BytesMut};

use super::wire_format::{Header, Operation, ProtocolVersion, HEADER_SIZE};

/// Body of every heartbeat frame.
pub const HEARTBEAT_BODY: &[u8] = b"[object Object]";

/// One decoded packet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Packet {
    /// Operation from the packet header.
    pub operation: Operation,
    /// Packet body (zero-copy via `bytes::Bytes`).
    pub body: Bytes,
}

impl Packet {
    /// Create a packet.
    pub fn new(operation: Operation, body: Bytes) -> Self {
        Self { operation, body }
    }

    /// Get a reference to the body bytes.
    #[inline]
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Get the body length.
    #[inline]
    pub fn body_len(&self) -> usize {
        self.body.len()
    }
}

/// Header bytes followed by `payload`, with the header taken as given.
///
/// Unlike [`encode_with`], the lengths in `header` are not recomputed, so a
/// caller can describe a compressed body or a deliberately bad frame.
pub fn build_frame(header: &Header, payload: &[u8]) -> Vec<u8> {
    [&header.encode()[..], payload].concat()
}

/// Encode a client frame: protocol version 1, sequence 1.
pub fn encode(operation: Operation, payload: &[u8]) -> Bytes {
    encode_with(ProtocolVersion::Popularity, operation, payload)
}

/// Encode a frame with an explicit protocol version.
///
/// Server-side shapes (compressed batches, heartbeat replies) are built with
/// this, which is how the in-memory transport replays traffic.
pub fn encode_with(version: ProtocolVersion, operation: Operation, payload: &[u8]) -> Bytes {
    let header = Header::new(version, operation, payload.len());
    let mut buf = BytesMut::with_capacity(HEADER_SIZE + payload.len());
    buf.put_slice(&header.encode());
    buf.put_slice(payload);
    buf.freeze()
}

/// The heartbeat frame sent on every tick.
pub fn heartbeat_frame() -> Bytes {
    encode(Operation::Heartbeat, HEARTBEAT_BODY)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::decode_packets;

    #[test]
    fn test_heartbeat_frame_layout() {
        let frame = heartbeat_frame();
        assert_eq!(frame.len(), 31);

        let header = Header::decode(&frame).unwrap();
        assert_eq!(header.total_length, 31);
        assert_eq!(header.header_length, 16);
        assert_eq!(header.protocol_version, 1);
        assert_eq!(header.operation, 2);
        assert_eq!(header.sequence, 1);
        assert_eq!(&frame[HEADER_SIZE..], b"[object Object]");
    }

    #[test]
    fn test_build_frame() {
        let header = Header::new(ProtocolVersion::Plain, Operation::Message, 5);
        let bytes = build_frame(&header, b"hello");

        assert_eq!(bytes.len(), HEADER_SIZE + 5);
        assert_eq!(Header::decode(&bytes).unwrap(), header);
        assert_eq!(&bytes[HEADER_SIZE..], b"hello");
    }

    #[test]
    fn test_build_frame_header_only() {
        let header = Header::new(ProtocolVersion::Plain, Operation::JoinReply, 0);
        let bytes = build_frame(&header, b"");
        assert_eq!(bytes.len(), HEADER_SIZE);
    }

    #[test]
    fn test_encode_with_version() {
        let frame = encode_with(ProtocolVersion::Zlib, Operation::Message, b"xyz");
        let header = Header::decode(&frame).unwrap();
        assert_eq!(header.version(), Some(ProtocolVersion::Zlib));
        assert_eq!(header.operation(), Operation::Message);
        assert_eq!(header.body_len(), 3);
    }

    #[test]
    fn test_packet_accessors() {
        let packet = Packet::new(Operation::Message, Bytes::from_static(b"{}"));
        assert_eq!(packet.body(), b"{}");
        assert_eq!(packet.body_len(), 2);
    }

    #[test]
    fn test_encode_then_decode_every_operation() {
        let cases: [(Operation, &[u8]); 6] = [
            (Operation::Heartbeat, HEARTBEAT_BODY),
            (Operation::HeartbeatReply, &[0, 0, 16, 0]),
            (Operation::Message, br#"{"cmd":"LIVE"}"#),
            (Operation::Join, br#"{"roomid":1}"#),
            (Operation::JoinReply, b""),
            (Operation::Other(42), b"opaque"),
        ];

        for (operation, payload) in cases {
            let packets = decode_packets(encode(operation, payload)).unwrap();
            assert_eq!(packets.len(), 1, "{operation:?}");
            assert_eq!(packets[0].operation, operation);
            assert_eq!(packets[0].body(), payload);
        }
    }
}
