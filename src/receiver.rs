//! Receive loop.
//!
//! Reads one wire frame at a time, splits it into packets, classifies each
//! packet and hands the results to the consumer channel in arrival order.
//!
//! Per-frame failures (bad header, corrupt compression) are delivered as an
//! error envelope after the packets decoded before the failure; the next
//! wire frame starts clean because framing follows WebSocket messages.

use tokio_util::sync::CancellationToken;

use crate::catalog::{classify, Message};
use crate::channel::{Envelope, EnvelopeSender};
use crate::error::{LiveError, Result};
use crate::protocol::{BatchDecoder, Packet};
use crate::supervisor::{contain, FaultHandler};
use crate::transport::FrameRead;

pub(crate) struct Receiver<R> {
    reader: R,
    sender: EnvelopeSender,
    shutdown: CancellationToken,
    on_fault: FaultHandler,
    decoder: BatchDecoder,
    debug: bool,
}

impl<R: FrameRead> Receiver<R> {
    pub(crate) fn new(
        reader: R,
        sender: EnvelopeSender,
        decoder: BatchDecoder,
        shutdown: CancellationToken,
        on_fault: FaultHandler,
        debug: bool,
    ) -> Self {
        Self {
            reader,
            sender,
            shutdown,
            on_fault,
            decoder,
            debug,
        }
    }

    /// Run until shutdown (`Ok`) or a fatal error.
    ///
    /// Fatal: a read error, the peer closing the socket, or the consumer
    /// dropping its receiver.
    pub(crate) async fn run(mut self) -> Result<()> {
        let mut packets: Vec<Packet> = Vec::new();

        loop {
            let frame = tokio::select! {
                biased;
                _ = self.shutdown.cancelled() => return Ok(()),
                read = self.reader.read_frame() => match read {
                    Ok(Some(frame)) => frame,
                    Ok(None) => return Err(LiveError::ConnectionClosed),
                    Err(e) => return Err(LiveError::Read(e)),
                },
            };

            let decoded = self.decoder.decode_into(frame, &mut packets);

            for packet in packets.drain(..) {
                if self.debug {
                    tracing::debug!(
                        operation = ?packet.operation,
                        len = packet.body_len(),
                        "packet received"
                    );
                }

                let Some(classified) = contain("classify", &self.on_fault, || classify(packet))
                else {
                    continue;
                };
                let envelope = match classified {
                    Ok(message) => {
                        if let Message::JoinReply(reply) = &message {
                            tracing::debug!(code = ?reply.code(), "join acknowledged");
                        }
                        Envelope::Message(message)
                    }
                    Err(e) => Envelope::Error(e),
                };

                if !deliver(&self.shutdown, &self.sender, envelope).await? {
                    return Ok(());
                }
            }

            if let Err(e) = decoded {
                tracing::debug!(error = %e, "dropping rest of frame");
                if !deliver(&self.shutdown, &self.sender, Envelope::Error(e)).await? {
                    return Ok(());
                }
            }
        }
    }
}

/// Send one envelope. `Ok(false)` means shutdown fired first.
async fn deliver(
    shutdown: &CancellationToken,
    sender: &EnvelopeSender,
    envelope: Envelope,
) -> Result<bool> {
    tokio::select! {
        biased;
        _ = shutdown.cancelled() => Ok(false),
        sent = sender.send(envelope) => sent.map(|()| true),
    }
}
