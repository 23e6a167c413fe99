//! WebSocket transport.
//!
//! Each wire frame travels as one binary WebSocket message. Text, ping and
//! pong messages carry nothing for the engine and are skipped; tungstenite
//! answers pings on its own.

use std::io;

use bytes::Bytes;
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::{Error as WsError, Message};
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

use super::{Dialer, FrameRead, FrameWrite};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Dials `ws://` and `wss://` endpoints.
#[derive(Debug, Clone, Copy, Default)]
pub struct WsDialer;

impl WsDialer {
    pub fn new() -> Self {
        Self
    }
}

impl Dialer for WsDialer {
    type Reader = WsReader;
    type Writer = WsWriter;

    async fn dial(&self, host: &str) -> io::Result<(WsReader, WsWriter)> {
        let (stream, response) = connect_async(host).await.map_err(into_io)?;
        tracing::debug!(host, status = %response.status(), "websocket connected");

        let (sink, stream) = stream.split();
        Ok((WsReader { stream }, WsWriter { sink }))
    }
}

/// Read half of a WebSocket connection.
pub struct WsReader {
    stream: SplitStream<WsStream>,
}

impl FrameRead for WsReader {
    async fn read_frame(&mut self) -> io::Result<Option<Bytes>> {
        loop {
            match self.stream.next().await {
                Some(Ok(Message::Binary(data))) => return Ok(Some(Bytes::from(data))),
                Some(Ok(Message::Close(frame))) => {
                    tracing::debug!(?frame, "websocket closed by peer");
                    return Ok(None);
                }
                Some(Ok(_)) => continue,
                Some(Err(WsError::ConnectionClosed | WsError::AlreadyClosed)) | None => {
                    return Ok(None)
                }
                Some(Err(e)) => return Err(into_io(e)),
            }
        }
    }
}

/// Write half of a WebSocket connection.
pub struct WsWriter {
    sink: SplitSink<WsStream, Message>,
}

impl FrameWrite for WsWriter {
    async fn write_frame(&mut self, frame: Bytes) -> io::Result<()> {
        self.sink
            .send(Message::Binary(frame.to_vec()))
            .await
            .map_err(into_io)
    }

    async fn close(&mut self) -> io::Result<()> {
        match self.sink.close().await {
            Ok(()) | Err(WsError::ConnectionClosed | WsError::AlreadyClosed) => Ok(()),
            Err(e) => Err(into_io(e)),
        }
    }
}

fn into_io(error: WsError) -> io::Error {
    match error {
        WsError::Io(e) => e,
        other => io::Error::other(other),
    }
}
