//! Ordered conduit between the receive loop and the consumer.
//!
//! The engine pushes [`Envelope`]s in arrival order; the consumer pulls them
//! with [`EnvelopeReceiver::recv`] or as a [`Stream`].
//!
//! # Capacity
//!
//! - `C >= 1`: up to `C` envelopes are buffered, the next send waits until
//!   the consumer takes one.
//! - `0`: rendezvous. A send completes only after the consumer has taken the
//!   envelope, so the receive loop never runs ahead of the consumer.
//!
//! Backpressure stalls the receive loop only. The heartbeat runs on its own
//! task and keeps the connection alive while the consumer is slow.

use std::pin::Pin;
use std::task::{Context, Poll};

use futures_util::Stream;
use tokio::sync::mpsc;

use crate::catalog::Message;
use crate::error::{LiveError, Result};

/// One item on the channel: a message or a non-fatal stream error.
#[derive(Debug)]
pub enum Envelope {
    Message(Message),
    Error(LiveError),
}

impl Envelope {
    /// The message, if this envelope carries one.
    pub fn message(&self) -> Option<&Message> {
        match self {
            Envelope::Message(m) => Some(m),
            Envelope::Error(_) => None,
        }
    }

    /// The error, if this envelope carries one.
    pub fn error(&self) -> Option<&LiveError> {
        match self {
            Envelope::Message(_) => None,
            Envelope::Error(e) => Some(e),
        }
    }

    pub fn into_result(self) -> Result<Message> {
        match self {
            Envelope::Message(m) => Ok(m),
            Envelope::Error(e) => Err(e),
        }
    }
}

impl From<Message> for Envelope {
    fn from(message: Message) -> Self {
        Envelope::Message(message)
    }
}

impl From<LiveError> for Envelope {
    fn from(error: LiveError) -> Self {
        Envelope::Error(error)
    }
}

/// Create a channel with the given capacity (0 = rendezvous).
pub fn channel(capacity: usize) -> (EnvelopeSender, EnvelopeReceiver) {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    (
        EnvelopeSender {
            tx,
            rendezvous: capacity == 0,
        },
        EnvelopeReceiver { rx },
    )
}

/// Sending half, owned by the receive loop.
#[derive(Debug, Clone)]
pub struct EnvelopeSender {
    tx: mpsc::Sender<Envelope>,
    rendezvous: bool,
}

impl EnvelopeSender {
    /// Send an envelope, waiting while the channel is full.
    ///
    /// On a rendezvous channel this also waits until the consumer has taken
    /// the envelope.
    ///
    /// # Errors
    ///
    /// [`LiveError::ConnectionClosed`] if the receiver has been dropped.
    pub async fn send(&self, envelope: Envelope) -> Result<()> {
        self.tx
            .send(envelope)
            .await
            .map_err(|_| LiveError::ConnectionClosed)?;

        if self.rendezvous {
            // The single slot frees up once the consumer has taken the envelope.
            let permit = self
                .tx
                .reserve()
                .await
                .map_err(|_| LiveError::ConnectionClosed)?;
            drop(permit);
        }
        Ok(())
    }

    /// Whether the receiver has been dropped.
    #[inline]
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Receiving half, owned by the consumer.
///
/// Yields envelopes until the engine drops the sender, which happens when
/// `enter` returns.
#[derive(Debug)]
pub struct EnvelopeReceiver {
    rx: mpsc::Receiver<Envelope>,
}

impl EnvelopeReceiver {
    /// Wait for the next envelope; `None` once the stream has ended.
    pub async fn recv(&mut self) -> Option<Envelope> {
        self.rx.recv().await
    }

    /// Take an envelope if one is ready.
    pub fn try_recv(&mut self) -> Option<Envelope> {
        self.rx.try_recv().ok()
    }

    /// Stop accepting envelopes; pending sends fail with `ConnectionClosed`.
    pub fn close(&mut self) {
        self.rx.close();
    }
}

impl Stream for EnvelopeReceiver {
    type Item = Envelope;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Envelope>> {
        self.get_mut().rx.poll_recv(cx)
    }
}
