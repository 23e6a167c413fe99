//! Protocol module - wire format, framing, and batch decoding.
//!
//! This module implements the binary framing used by the live socket:
//! - 16-byte header encoding/decoding
//! - Client frame building (join request, heartbeat)
//! - Recursive decoding of zlib/brotli compressed batches

mod decoder;
mod frame;
mod join;
mod wire_format;

pub use decoder::{
    decode_into, decode_packets, BatchDecoder, DEFAULT_MAX_PAYLOAD_SIZE, MAX_NESTING,
};
pub use frame::{build_frame, encode, encode_with, heartbeat_frame, Packet, HEARTBEAT_BODY};
pub use join::{JoinRequest, CLIENT_TYPE, DEFAULT_PLATFORM};
pub use wire_format::{
    Header, Operation, ProtocolVersion, CLIENT_SEQUENCE, HEADER_LENGTH, HEADER_SIZE,
};
