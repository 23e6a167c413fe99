//! # bililive-engine
//!
//! Client engine for the bilibili live "danmaku" event socket.
//!
//! The platform pushes room events (chat, gifts, fan counts, ...) over a
//! WebSocket carrying a length-prefixed binary framing protocol. Frames may be
//! zlib or brotli compressed batches of further frames, whose bodies are JSON
//! documents tagged with a `cmd` string.
//!
//! ## Architecture
//!
//! - **protocol**: 16-byte header, frame building, batch decoding
//! - **catalog**: `cmd` registry and lazily parsed typed messages
//! - **channel**: bounded, ordered envelope conduit to the consumer
//! - **transport**: socket abstraction (WebSocket and in-memory)
//! - **live**: dial / enter lifecycle, heartbeat scheduler, receive loop
//!
//! ## Example
//!
//! ```ignore
//! use bililive_engine::transport::{WsDialer, DEFAULT_HOST};
//! use bililive_engine::{CancellationToken, LiveBuilder, Message};
//!
//! #[tokio::main]
//! async fn main() -> bililive_engine::Result<()> {
//!     let (mut live, mut events) = LiveBuilder::new().channel_capacity(64).build();
//!     live.dial(&WsDialer::new(), DEFAULT_HOST).await?;
//!
//!     let cancel = CancellationToken::new();
//!     let session = tokio::spawn(async move { live.enter(cancel, 545068, "", 0).await });
//!
//!     while let Some(envelope) = events.recv().await {
//!         if let Some(Message::Danmaku(dm)) = envelope.message() {
//!             println!("{}", dm.parse()?.content);
//!         }
//!     }
//!     session.await.unwrap()
//! }
//! ```

pub mod catalog;
pub mod channel;
pub mod codec;
pub mod error;
pub mod protocol;
pub mod transport;

mod heartbeat;
mod live;
mod receiver;
mod supervisor;

pub use catalog::Message;
pub use channel::{Envelope, EnvelopeReceiver};
pub use error::{LiveError, Result};
pub use live::{
    ConnectionState, Live, LiveBuilder, LiveConfig, Session, DEFAULT_CHANNEL_CAPACITY,
    DEFAULT_HEARTBEAT_INTERVAL,
};
pub use supervisor::FaultHandler;
pub use tokio_util::sync::CancellationToken;
