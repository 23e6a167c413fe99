//! In-process transport.
//!
//! [`pair`] returns a [`MemoryDialer`] for the engine and a [`MemoryServer`]
//! that plays the platform: it pushes wire frames to the client, sees every
//! frame the client writes, and can inject failures.
//!
//! ```
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> std::io::Result<()> {
//! use bililive_engine::protocol::{encode, Operation};
//! use bililive_engine::transport::{pair, Dialer, FrameRead};
//!
//! let (dialer, server) = pair();
//! let (mut reader, _writer) = dialer.dial("memory").await?;
//!
//! server.send_frame(encode(Operation::Message, br#"{"cmd":"LIVE"}"#))?;
//! assert!(reader.read_frame().await?.is_some());
//! # Ok(())
//! # }
//! ```

use std::io;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use bytes::Bytes;
use tokio::sync::mpsc;

use super::{Dialer, FrameRead, FrameWrite};

#[derive(Debug, Default)]
struct Shared {
    close_count: AtomicUsize,
    fail_writes: AtomicBool,
}

/// Create a connected dialer/server pair. The dialer connects once.
pub fn pair() -> (MemoryDialer, MemoryServer) {
    let (to_client, from_server) = mpsc::unbounded_channel();
    let (to_server, from_client) = mpsc::unbounded_channel();
    let shared = Arc::new(Shared::default());

    let reader = MemoryReader { rx: from_server };
    let writer = MemoryWriter {
        tx: Some(to_server),
        shared: shared.clone(),
    };

    let dialer = MemoryDialer {
        halves: Mutex::new(Some((reader, writer))),
    };
    let server = MemoryServer {
        tx: Some(to_client),
        rx: from_client,
        shared,
    };
    (dialer, server)
}

/// Dialer side of an in-process connection.
#[derive(Debug)]
pub struct MemoryDialer {
    halves: Mutex<Option<(MemoryReader, MemoryWriter)>>,
}

impl MemoryDialer {
    /// A dialer whose every dial is refused.
    pub fn refusing() -> Self {
        Self {
            halves: Mutex::new(None),
        }
    }
}

impl Dialer for MemoryDialer {
    type Reader = MemoryReader;
    type Writer = MemoryWriter;

    async fn dial(&self, host: &str) -> io::Result<(MemoryReader, MemoryWriter)> {
        let halves = self
            .halves
            .lock()
            .map_err(|_| io::Error::other("memory dialer lock poisoned"))?
            .take();

        halves.ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::ConnectionRefused,
                format!("no connection available for {}", host),
            )
        })
    }
}

/// Client read half.
#[derive(Debug)]
pub struct MemoryReader {
    rx: mpsc::UnboundedReceiver<io::Result<Bytes>>,
}

impl FrameRead for MemoryReader {
    async fn read_frame(&mut self) -> io::Result<Option<Bytes>> {
        self.rx.recv().await.transpose()
    }
}

/// Client write half.
#[derive(Debug)]
pub struct MemoryWriter {
    tx: Option<mpsc::UnboundedSender<Bytes>>,
    shared: Arc<Shared>,
}

impl FrameWrite for MemoryWriter {
    async fn write_frame(&mut self, frame: Bytes) -> io::Result<()> {
        if self.shared.fail_writes.load(Ordering::Acquire) {
            return Err(io::Error::new(io::ErrorKind::BrokenPipe, "write refused"));
        }
        let tx = self
            .tx
            .as_ref()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotConnected, "writer closed"))?;
        tx.send(frame)
            .map_err(|_| io::Error::new(io::ErrorKind::BrokenPipe, "server gone"))
    }

    async fn close(&mut self) -> io::Result<()> {
        self.shared.close_count.fetch_add(1, Ordering::AcqRel);
        self.tx = None;
        Ok(())
    }
}

/// Server side of an in-process connection.
#[derive(Debug)]
pub struct MemoryServer {
    tx: Option<mpsc::UnboundedSender<io::Result<Bytes>>>,
    rx: mpsc::UnboundedReceiver<Bytes>,
    shared: Arc<Shared>,
}

impl MemoryServer {
    /// Push one wire frame to the client.
    pub fn send_frame(&self, frame: impl Into<Bytes>) -> io::Result<()> {
        self.push(Ok(frame.into()))
    }

    /// Make the client's next read fail with `error`.
    pub fn fail_read(&self, error: io::Error) -> io::Result<()> {
        self.push(Err(error))
    }

    fn push(&self, item: io::Result<Bytes>) -> io::Result<()> {
        let tx = self
            .tx
            .as_ref()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotConnected, "server hung up"))?;
        tx.send(item)
            .map_err(|_| io::Error::new(io::ErrorKind::BrokenPipe, "client gone"))
    }

    /// Next frame written by the client; `None` once the client closed.
    pub async fn recv_frame(&mut self) -> Option<Bytes> {
        self.rx.recv().await
    }

    /// Close the server side. The client reads end-of-stream after any
    /// frames already sent.
    pub fn hang_up(&mut self) {
        self.tx = None;
    }

    /// Make every subsequent client write fail (`false` restores writes).
    pub fn fail_writes(&self, fail: bool) {
        self.shared.fail_writes.store(fail, Ordering::Release);
    }

    /// How many times the client called `close`.
    pub fn close_count(&self) -> usize {
        self.shared.close_count.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_frames_flow_both_ways() {
        let (dialer, mut server) = pair();
        let (mut reader, mut writer) = dialer.dial("memory").await.unwrap();

        server.send_frame(Bytes::from_static(b"down")).unwrap();
        assert_eq!(reader.read_frame().await.unwrap().unwrap(), "down");

        writer.write_frame(Bytes::from_static(b"up")).await.unwrap();
        assert_eq!(server.recv_frame().await.unwrap(), "up");
    }

    #[tokio::test]
    async fn test_dial_once() {
        let (dialer, _server) = pair();
        assert!(dialer.dial("memory").await.is_ok());

        let err = dialer.dial("memory").await.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::ConnectionRefused);
    }

    #[tokio::test]
    async fn test_hang_up_ends_stream_after_pending_frames() {
        let (dialer, mut server) = pair();
        let (mut reader, _writer) = dialer.dial("memory").await.unwrap();

        server.send_frame(Bytes::from_static(b"last")).unwrap();
        server.hang_up();

        assert!(reader.read_frame().await.unwrap().is_some());
        assert!(reader.read_frame().await.unwrap().is_none());
        assert!(server.send_frame(Bytes::new()).is_err());
    }

    #[tokio::test]
    async fn test_injected_failures() {
        let (dialer, server) = pair();
        let (mut reader, mut writer) = dialer.dial("memory").await.unwrap();

        server
            .fail_read(io::Error::new(io::ErrorKind::ConnectionReset, "reset"))
            .unwrap();
        let err = reader.read_frame().await.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::ConnectionReset);

        server.fail_writes(true);
        let err = writer.write_frame(Bytes::new()).await.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
    }

    #[tokio::test]
    async fn test_close_is_counted() {
        let (dialer, mut server) = pair();
        let (_reader, mut writer) = dialer.dial("memory").await.unwrap();

        writer.close().await.unwrap();
        assert_eq!(server.close_count(), 1);
        assert!(server.recv_frame().await.is_none());
        assert!(writer.write_frame(Bytes::new()).await.is_err());
    }

    #[tokio::test]
    async fn test_refusing_dialer() {
        let err = MemoryDialer::refusing().dial("memory").await.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::ConnectionRefused);
    }
}
