//! Transport module - the socket the engine talks through.
//!
//! The engine only needs whole wire frames in and out, so the seam is three
//! small traits:
//!
//! - [`Dialer`] opens a connection and returns its two halves
//! - [`FrameRead`] yields one wire frame per call (`None` when the peer closed)
//! - [`FrameWrite`] sends one wire frame, and closes the connection
//!
//! Implementations:
//! - [`WsDialer`] - WebSocket via tokio-tungstenite, one binary message per frame
//! - [`MemoryDialer`] - in-process pair for tests and offline replay

pub mod memory;
mod ws;

use std::future::Future;
use std::io;

use bytes::Bytes;

pub use memory::{pair, MemoryDialer, MemoryReader, MemoryServer, MemoryWriter};
pub use ws::{WsDialer, WsReader, WsWriter};

/// Platform endpoint for the event stream.
pub const DEFAULT_HOST: &str = "wss://broadcastlv.chat.bilibili.com/sub";

/// Read half of a connection.
pub trait FrameRead: Send + 'static {
    /// Read the next wire frame. `Ok(None)` means the peer closed the stream.
    fn read_frame(&mut self) -> impl Future<Output = io::Result<Option<Bytes>>> + Send;
}

/// Write half of a connection.
pub trait FrameWrite: Send + 'static {
    /// Send one wire frame.
    fn write_frame(&mut self, frame: Bytes) -> impl Future<Output = io::Result<()>> + Send;

    /// Close the connection. The engine calls this exactly once.
    fn close(&mut self) -> impl Future<Output = io::Result<()>> + Send;
}

/// Opens connections.
pub trait Dialer: Send + Sync {
    type Reader: FrameRead;
    type Writer: FrameWrite;

    /// Connect to `host` and split the connection.
    fn dial(&self, host: &str)
        -> impl Future<Output = io::Result<(Self::Reader, Self::Writer)>> + Send;
}
