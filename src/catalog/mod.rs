//! Message catalog - classification of decoded packets.
//!
//! [`classify`] turns a [`Packet`] into a [`Message`]:
//!
//! - operation 3 → [`Message::HeartbeatReply`] (4-byte popularity count)
//! - operation 8 → [`Message::JoinReply`]
//! - operation 5 → the kind registered for the body's `cmd`, or
//!   [`Message::Generic`] when the command is unknown
//!
//! Only the `cmd` field is read during classification. Typed decoding happens
//! when the consumer calls `parse()` on a kind, every time it is called.
//!
//! # Example
//!
//! ```
//! use bililive_engine::catalog::{classify, Message};
//! use bililive_engine::protocol::{Operation, Packet};
//! use bytes::Bytes;
//!
//! let body = Bytes::from_static(br#"{"cmd":"WATCHED_CHANGE","data":{"num":3}}"#);
//! let message = classify(Packet::new(Operation::Message, body)).unwrap();
//!
//! match message {
//!     Message::WatchedChange(m) => assert_eq!(m.parse().unwrap().num, 3),
//!     other => panic!("unexpected {}", other.cmd()),
//! }
//! ```

mod danmaku;
mod records;
mod registry;

use std::borrow::Cow;

use bytes::Bytes;
use serde::Deserialize;

use crate::error::{LiveError, Result};
use crate::protocol::{Operation, Packet};

pub use danmaku::Danmaku;
pub use records::*;
pub use registry::*;

/// Popularity count sent in reply to a heartbeat.
#[derive(Debug, Clone)]
pub struct HeartbeatReply {
    raw: Bytes,
    hot: u32,
}

impl HeartbeatReply {
    /// Command string reported for heartbeat replies.
    pub const CMD: &'static str = "HEARTBEAT_REPLY";

    fn from_body(raw: Bytes) -> Result<Self> {
        let hot = raw
            .get(..4)
            .and_then(|b| <[u8; 4]>::try_from(b).ok())
            .map(u32::from_be_bytes)
            .ok_or_else(|| {
                LiveError::Protocol(format!(
                    "heartbeat reply body is {} bytes, need 4",
                    raw.len()
                ))
            })?;
        Ok(Self { raw, hot })
    }

    #[inline]
    pub fn cmd(&self) -> &str {
        Self::CMD
    }

    #[inline]
    pub fn raw(&self) -> &[u8] {
        &self.raw
    }

    /// Room popularity, big-endian u32 from the body.
    #[inline]
    pub fn hot(&self) -> u32 {
        self.hot
    }
}

/// Server acknowledgement of the join request.
#[derive(Debug, Clone)]
pub struct JoinReply {
    raw: Bytes,
}

#[derive(Deserialize)]
struct ReplyCode {
    code: i64,
}

impl JoinReply {
    /// Command string reported for join replies.
    pub const CMD: &'static str = "JOIN_REPLY";

    #[inline]
    pub fn cmd(&self) -> &str {
        Self::CMD
    }

    #[inline]
    pub fn raw(&self) -> &[u8] {
        &self.raw
    }

    /// The `code` field of the reply body, if present.
    pub fn code(&self) -> Option<i64> {
        serde_json::from_slice::<ReplyCode>(&self.raw)
            .ok()
            .map(|r| r.code)
    }

    /// Whether the server accepted the join (`{"code":0}`).
    pub fn is_accepted(&self) -> bool {
        self.code() == Some(0)
    }
}

/// A message whose command has no registered kind.
#[derive(Debug, Clone)]
pub struct Generic {
    cmd: String,
    raw: Bytes,
}

impl Generic {
    /// The command as sent, suffix included; empty if the body had none.
    #[inline]
    pub fn cmd(&self) -> &str {
        &self.cmd
    }

    #[inline]
    pub fn raw(&self) -> &[u8] {
        &self.raw
    }
}

#[derive(Deserialize)]
struct CmdField<'a> {
    #[serde(borrow)]
    cmd: Cow<'a, str>,
}

/// Strip the `:`-separated suffix some commands carry (`DANMU_MSG:4:0:2:2:2:0`).
#[inline]
pub fn base_cmd(cmd: &str) -> &str {
    cmd.split_once(':').map_or(cmd, |(base, _)| base)
}

/// Classify a decoded packet.
///
/// # Errors
///
/// [`LiveError::Protocol`] for a heartbeat reply shorter than 4 bytes. An
/// unparsable message body is not an error: it becomes [`Message::Generic`]
/// with an empty command.
pub fn classify(packet: Packet) -> Result<Message> {
    let Packet { operation, body } = packet;
    match operation {
        Operation::HeartbeatReply => HeartbeatReply::from_body(body).map(Message::HeartbeatReply),
        Operation::JoinReply => Ok(Message::JoinReply(JoinReply { raw: body })),
        Operation::Message => Ok(dispatch(body)),
        _ => Ok(Message::Generic(Generic {
            cmd: String::new(),
            raw: body,
        })),
    }
}

fn dispatch(raw: Bytes) -> Message {
    let found = match serde_json::from_slice::<CmdField<'_>>(&raw) {
        Ok(head) => match registry::lookup(base_cmd(&head.cmd)) {
            Some(build) => Ok(build),
            None => Err(head.cmd.into_owned()),
        },
        Err(_) => Err(String::new()),
    };

    match found {
        Ok(build) => build(raw),
        Err(cmd) => Message::Generic(Generic { cmd, raw }),
    }
}
