//! Wire format encoding and decoding.
//!
//! Implements the 16-byte frame header:
//! ```text
//! ┌──────────┬──────────┬──────────┬──────────┬──────────┐
//! │ Total len│ Head len │ Protover │ Operation│ Sequence │
//! │ 4 bytes  │ 2 bytes  │ 2 bytes  │ 4 bytes  │ 4 bytes  │
//! │ uint32 BE│ uint16 BE│ uint16 BE│ uint32 BE│ uint32 BE│
//! └──────────┴──────────┴──────────┴──────────┴──────────┘
//! ```
//!
//! `total_length` covers header plus body. Integers are big-endian on the wire.

use crate::error::{LiveError, Result};

/// Header size in bytes (fixed, exactly 16).
pub const HEADER_SIZE: usize = 16;

/// Value written into the header-length field.
pub const HEADER_LENGTH: u16 = HEADER_SIZE as u16;

/// Sequence number carried by every client frame.
pub const CLIENT_SEQUENCE: u32 = 1;

/// Frame operation code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// Client keep-alive (2).
    Heartbeat,
    /// Server reply to a heartbeat, body is a 4-byte popularity count (3).
    HeartbeatReply,
    /// Command message, body is JSON (5).
    Message,
    /// Client join request (7).
    Join,
    /// Server acknowledgement of the join request (8).
    JoinReply,
    /// Any code the engine does not know.
    Other(u32),
}

impl Operation {
    /// Numeric code on the wire.
    pub const fn code(self) -> u32 {
        match self {
            Operation::Heartbeat => 2,
            Operation::HeartbeatReply => 3,
            Operation::Message => 5,
            Operation::Join => 7,
            Operation::JoinReply => 8,
            Operation::Other(code) => code,
        }
    }

    /// Map a wire code to an operation.
    pub const fn from_code(code: u32) -> Self {
        match code {
            2 => Operation::Heartbeat,
            3 => Operation::HeartbeatReply,
            5 => Operation::Message,
            7 => Operation::Join,
            8 => Operation::JoinReply,
            other => Operation::Other(other),
        }
    }
}

/// Body encoding announced by the header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ProtocolVersion {
    /// Uncompressed JSON (0).
    Plain,
    /// Uncompressed, used by heartbeat replies and client frames (1).
    Popularity,
    /// Body is a zlib-compressed batch of frames (2).
    Zlib,
    /// Body is a brotli-compressed batch of frames (3).
    #[default]
    Brotli,
}

impl ProtocolVersion {
    /// Numeric code on the wire.
    pub const fn code(self) -> u16 {
        match self {
            ProtocolVersion::Plain => 0,
            ProtocolVersion::Popularity => 1,
            ProtocolVersion::Zlib => 2,
            ProtocolVersion::Brotli => 3,
        }
    }

    /// Map a wire code to a version; unknown codes yield `None`.
    pub const fn from_code(code: u16) -> Option<Self> {
        match code {
            0 => Some(ProtocolVersion::Plain),
            1 => Some(ProtocolVersion::Popularity),
            2 => Some(ProtocolVersion::Zlib),
            3 => Some(ProtocolVersion::Brotli),
            _ => None,
        }
    }

    /// Whether the body must be decompressed into nested frames.
    #[inline]
    pub const fn is_compressed(self) -> bool {
        matches!(self, ProtocolVersion::Zlib | ProtocolVersion::Brotli)
    }
}

/// Decoded header from wire format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    /// Length of header plus body.
    pub total_length: u32,
    /// Length of the header, 16 on every observed frame.
    pub header_length: u16,
    /// Body encoding code (see [`ProtocolVersion`]).
    pub protocol_version: u16,
    /// Operation code (see [`Operation`]).
    pub operation: u32,
    /// Sequence number.
    pub sequence: u32,
}

impl Header {
    /// Create a header for a body of `body_len` bytes.
    pub fn new(version: ProtocolVersion, operation: Operation, body_len: usize) -> Self {
        Self {
            total_length: (HEADER_SIZE + body_len) as u32,
            header_length: HEADER_LENGTH,
            protocol_version: version.code(),
            operation: operation.code(),
            sequence: CLIENT_SEQUENCE,
        }
    }

    /// The 16 header bytes as they appear on the wire.
    ///
    /// # Example
    ///
    /// ```
    /// use bililive_engine::protocol::{Header, Operation, ProtocolVersion};
    ///
    /// let header = Header::new(ProtocolVersion::Popularity, Operation::Heartbeat, 15);
    /// let bytes = header.encode();
    /// assert_eq!(&bytes[..4], &[0, 0, 0, 31]);
    /// ```
    pub fn encode(&self) -> [u8; HEADER_SIZE] {
        let mut buf = [0u8; HEADER_SIZE];
        self.encode_into(&mut buf);
        buf
    }

    /// Write the header into the first 16 bytes of `buf`.
    ///
    /// # Panics
    ///
    /// Panics if `buf` is shorter than [`HEADER_SIZE`].
    pub fn encode_into(&self, buf: &mut [u8]) {
        debug_assert!(buf.len() >= HEADER_SIZE);
        buf[0..4].copy_from_slice(&self.total_length.to_be_bytes());
        buf[4..6].copy_from_slice(&self.header_length.to_be_bytes());
        buf[6..8].copy_from_slice(&self.protocol_version.to_be_bytes());
        buf[8..12].copy_from_slice(&self.operation.to_be_bytes());
        buf[12..16].copy_from_slice(&self.sequence.to_be_bytes());
    }

    /// Read a header from the first 16 bytes of `buf`.
    ///
    /// Returns `None` if buffer is too short.
    pub fn decode(buf: &[u8]) -> Option<Self> {
        if buf.len() < HEADER_SIZE {
            return None;
        }
        Some(Self {
            total_length: u32::from_be_bytes([buf[0], buf[1], buf[2], buf[3]]),
            header_length: u16::from_be_bytes([buf[4], buf[5]]),
            protocol_version: u16::from_be_bytes([buf[6], buf[7]]),
            operation: u32::from_be_bytes([buf[8], buf[9], buf[10], buf[11]]),
            sequence: u32::from_be_bytes([buf[12], buf[13], buf[14], buf[15]]),
        })
    }

    /// Validate the header against the bytes remaining in its buffer.
    ///
    /// Checks:
    /// - Header length is at least 16
    /// - Total length is not smaller than header length
    /// - Total length does not run past `available`
    pub fn validate(&self, available: usize) -> Result<()> {
        if (self.header_length as usize) < HEADER_SIZE {
            return Err(LiveError::Protocol(format!(
                "header length {} is below {}",
                self.header_length, HEADER_SIZE
            )));
        }

        if self.total_length < self.header_length as u32 {
            return Err(LiveError::Protocol(format!(
                "total length {} is smaller than header length {}",
                self.total_length, self.header_length
            )));
        }

        if self.total_length as usize > available {
            return Err(LiveError::Protocol(format!(
                "total length {} exceeds remaining {} bytes",
                self.total_length, available
            )));
        }

        Ok(())
    }

    /// Typed operation.
    #[inline]
    pub fn operation(&self) -> Operation {
        Operation::from_code(self.operation)
    }

    /// Typed protocol version, `None` when unknown.
    #[inline]
    pub fn version(&self) -> Option<ProtocolVersion> {
        ProtocolVersion::from_code(self.protocol_version)
    }

    /// Body length implied by the two length fields.
    #[inline]
    pub fn body_len(&self) -> usize {
        (self.total_length as usize).saturating_sub(self.header_length as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_fields_are_network_order() {
        let header = Header {
            total_length: 0x0102_0304,
            header_length: 0x0506,
            protocol_version: 0x0708,
            operation: 0x090A_0B0C,
            sequence: 0x0D0E_0F10,
        };
        let bytes = header.encode();
        assert_eq!(
            bytes,
            [
                0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08, 0x09, 0x0A, 0x0B, 0x0C, 0x0D,
                0x0E, 0x0F, 0x10
            ]
        );
        assert_eq!(Header::decode(&bytes), Some(header));
    }

    #[test]
    fn test_new_header_fields() {
        let header = Header::new(ProtocolVersion::Popularity, Operation::Join, 40);
        assert_eq!(header.total_length, 56);
        assert_eq!(header.header_length, 16);
        assert_eq!(header.protocol_version, 1);
        assert_eq!(header.operation, 7);
        assert_eq!(header.sequence, 1);
        assert_eq!(header.body_len(), 40);
    }

    #[test]
    fn test_header_needs_sixteen_bytes() {
        let buf = [0u8; 15];
        assert!(Header::decode(&buf).is_none());
    }

    #[test]
    fn test_validate_total_below_header() {
        let mut header = Header::new(ProtocolVersion::Plain, Operation::Message, 0);
        header.total_length = 10;
        let err = header.validate(100).unwrap_err();
        assert!(err.to_string().contains("smaller than header length"));
    }

    #[test]
    fn test_validate_total_exceeds_buffer() {
        let header = Header::new(ProtocolVersion::Plain, Operation::Message, 100);
        let err = header.validate(50).unwrap_err();
        assert!(err.to_string().contains("exceeds remaining"));
        assert!(header.validate(116).is_ok());
    }

    #[test]
    fn test_validate_short_header_length() {
        let mut header = Header::new(ProtocolVersion::Plain, Operation::Message, 0);
        header.header_length = 8;
        assert!(header.validate(16).is_err());
    }

    #[test]
    fn test_operation_codes() {
        for op in [
            Operation::Heartbeat,
            Operation::HeartbeatReply,
            Operation::Message,
            Operation::Join,
            Operation::JoinReply,
        ] {
            assert_eq!(Operation::from_code(op.code()), op);
        }
        assert_eq!(Operation::from_code(42), Operation::Other(42));
        assert_eq!(Operation::Other(42).code(), 42);
    }

    #[test]
    fn test_protocol_version_codes() {
        assert_eq!(ProtocolVersion::from_code(2), Some(ProtocolVersion::Zlib));
        assert_eq!(ProtocolVersion::from_code(3), Some(ProtocolVersion::Brotli));
        assert_eq!(ProtocolVersion::from_code(9), None);
        assert!(ProtocolVersion::Zlib.is_compressed());
        assert!(!ProtocolVersion::Popularity.is_compressed());
        assert_eq!(ProtocolVersion::default(), ProtocolVersion::Brotli);
    }
}
