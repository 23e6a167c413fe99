//! Join request builder.
//!
//! The join frame is the first frame a client writes after the socket opens.
//! It names the room and the protocol version the client wants the server to
//! use for message batches.
//!
//! # Example
//!
//! ```
//! use bililive_engine::protocol::JoinRequest;
//!
//! let json = JoinRequest::new(545068, 0).to_json().unwrap();
//! let text = String::from_utf8(json).unwrap();
//! assert!(text.contains(r#""roomid":545068"#));
//! assert!(!text.contains("key"));
//! ```

use bytes::Bytes;
use serde::Serialize;

use super::frame::encode;
use super::wire_format::{Operation, ProtocolVersion};
use crate::codec::JsonCodec;
use crate::error::Result;

/// Platform string sent by browser clients.
pub const DEFAULT_PLATFORM: &str = "web";

/// Client type sent in every join request.
pub const CLIENT_TYPE: u8 = 2;

/// Body of the join frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JoinRequest {
    /// Viewer uid, 0 for anonymous.
    pub uid: i64,
    /// Numeric (long) room id.
    pub roomid: i64,
    /// Requested batch compression.
    pub protover: u16,
    /// Client platform.
    pub platform: String,
    /// Client type.
    #[serde(rename = "type")]
    pub client_type: u8,
    /// Authentication token; omitted from the body when empty.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub key: String,
}

impl JoinRequest {
    /// Create a join request with brotli batches and the web platform.
    pub fn new(roomid: i64, uid: i64) -> Self {
        Self {
            uid,
            roomid,
            protover: ProtocolVersion::Brotli.code(),
            platform: DEFAULT_PLATFORM.to_string(),
            client_type: CLIENT_TYPE,
            key: String::new(),
        }
    }

    /// Set the authentication token.
    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.key = key.into();
        self
    }

    /// Set the batch compression requested from the server.
    pub fn protover(mut self, version: ProtocolVersion) -> Self {
        self.protover = version.code();
        self
    }

    /// Set the platform string.
    pub fn platform(mut self, platform: impl Into<String>) -> Self {
        self.platform = platform.into();
        self
    }

    /// Serialize the body.
    pub fn to_json(&self) -> Result<Vec<u8>> {
        JsonCodec::encode(self)
    }

    /// Serialize and frame with operation 7.
    pub fn to_frame(&self) -> Result<Bytes> {
        Ok(encode(Operation::Join, &self.to_json()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{decode_packets, HEADER_SIZE};
    use serde_json::Value;

    #[test]
    fn test_join_body_fields() {
        let json = JoinRequest::new(545068, 123456).to_json().unwrap();
        let value: Value = serde_json::from_slice(&json).unwrap();

        assert_eq!(value["uid"], 123456);
        assert_eq!(value["roomid"], 545068);
        assert_eq!(value["protover"], 3);
        assert_eq!(value["platform"], "web");
        assert_eq!(value["type"], 2);
        assert!(value.get("key").is_none());
    }

    #[test]
    fn test_join_body_with_key() {
        let json = JoinRequest::new(1, 2)
            .key("token-abc")
            .protover(ProtocolVersion::Zlib)
            .to_json()
            .unwrap();
        let value: Value = serde_json::from_slice(&json).unwrap();

        assert_eq!(value["key"], "token-abc");
        assert_eq!(value["protover"], 2);
    }

    #[test]
    fn test_join_frame_header() {
        let frame = JoinRequest::new(7, 0).to_frame().unwrap();
        let packets = decode_packets(frame.clone()).unwrap();

        assert_eq!(packets.len(), 1);
        assert_eq!(packets[0].operation, Operation::Join);
        assert_eq!(frame.len(), HEADER_SIZE + packets[0].body_len());
        // protocol version 1, sequence 1
        assert_eq!(&frame[6..8], &[0, 1]);
        assert_eq!(&frame[12..16], &[0, 0, 0, 1]);
    }
}
