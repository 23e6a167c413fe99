//! Connection engine.
//!
//! [`LiveBuilder`] configures the engine and returns a [`Live`] handle plus the
//! [`EnvelopeReceiver`] the consumer reads from. The lifecycle is:
//!
//! 1. [`Live::dial`] opens the socket
//! 2. [`Live::enter`] sends the join frame, then runs the heartbeat scheduler
//!    and the receive loop as two tasks until the caller cancels or a fatal
//!    error occurs
//! 3. the socket is closed once both tasks have stopped, and the consumer's
//!    stream ends
//!
//! # Example
//!
//! ```ignore
//! use bililive_engine::transport::{WsDialer, DEFAULT_HOST};
//! use bililive_engine::{CancellationToken, LiveBuilder};
//!
//! let (mut live, mut events) = LiveBuilder::new().channel_capacity(64).build();
//! live.dial(&WsDialer::new(), DEFAULT_HOST).await?;
//!
//! let cancel = CancellationToken::new();
//! tokio::spawn(async move {
//!     while let Some(envelope) = events.recv().await {
//!         println!("{:?}", envelope.message().map(|m| m.cmd()));
//!     }
//! });
//! live.enter(cancel, 545068, "", 0).await?;
//! ```

use std::fmt;
use std::time::Duration;

use tokio::task::JoinError;
use tokio_util::sync::CancellationToken;

use crate::channel::{channel, EnvelopeReceiver, EnvelopeSender};
use crate::error::{LiveError, Result};
use crate::heartbeat;
use crate::protocol::{
    BatchDecoder, JoinRequest, ProtocolVersion, DEFAULT_MAX_PAYLOAD_SIZE, DEFAULT_PLATFORM,
};
use crate::receiver::Receiver;
use crate::supervisor::{supervise, FaultHandler};
use crate::transport::{Dialer, FrameWrite};

/// Default interval between heartbeats.
pub const DEFAULT_HEARTBEAT_INTERVAL: Duration = Duration::from_secs(30);

/// Default channel capacity (rendezvous).
pub const DEFAULT_CHANNEL_CAPACITY: usize = 0;

/// Engine configuration.
#[derive(Debug, Clone)]
pub struct LiveConfig {
    /// Log every received packet at debug level.
    pub debug: bool,
    /// Interval between heartbeats. Must be non-zero.
    pub heartbeat_interval: Duration,
    /// Channel capacity; 0 hands each envelope over synchronously.
    pub channel_capacity: usize,
    /// Batch compression requested in the join frame.
    pub join_protover: ProtocolVersion,
    /// Platform string sent in the join frame.
    pub platform: String,
    /// Largest body accepted from the server, before or after decompression.
    pub max_payload_size: usize,
    /// Receives every recovered fault.
    pub on_fault: FaultHandler,
}

impl Default for LiveConfig {
    fn default() -> Self {
        Self {
            debug: false,
            heartbeat_interval: DEFAULT_HEARTBEAT_INTERVAL,
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
            join_protover: ProtocolVersion::Brotli,
            platform: DEFAULT_PLATFORM.to_string(),
            max_payload_size: DEFAULT_MAX_PAYLOAD_SIZE,
            on_fault: FaultHandler::default(),
        }
    }
}

/// Fluent builder for [`Live`].
#[derive(Debug, Default)]
pub struct LiveBuilder {
    config: LiveConfig,
}

impl LiveBuilder {
    /// Create a builder with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Log every received packet at debug level.
    ///
    /// Default: off
    pub fn debug(mut self, enabled: bool) -> Self {
        self.config.debug = enabled;
        self
    }

    /// Set the interval between heartbeats.
    ///
    /// Default: 30 seconds
    pub fn heartbeat_interval(mut self, interval: Duration) -> Self {
        self.config.heartbeat_interval = interval;
        self
    }

    /// Set the channel capacity. 0 makes every send wait for the consumer.
    ///
    /// Default: 0
    pub fn channel_capacity(mut self, capacity: usize) -> Self {
        self.config.channel_capacity = capacity;
        self
    }

    /// Set the batch compression requested from the server.
    ///
    /// Default: brotli
    pub fn join_protover(mut self, version: ProtocolVersion) -> Self {
        self.config.join_protover = version;
        self
    }

    /// Set the platform string sent in the join frame.
    ///
    /// Default: `"web"`
    pub fn platform(mut self, platform: impl Into<String>) -> Self {
        self.config.platform = platform.into();
        self
    }

    /// Set the largest inbound body. Frames over it become error envelopes.
    ///
    /// Default: 8 MiB
    pub fn max_payload_size(mut self, max: usize) -> Self {
        self.config.max_payload_size = max;
        self
    }

    /// Set the handler for recovered faults.
    ///
    /// Default: log with `tracing::error!`
    pub fn on_fault<F>(mut self, handler: F) -> Self
    where
        F: Fn(&LiveError) + Send + Sync + 'static,
    {
        self.config.on_fault = FaultHandler::new(handler);
        self
    }

    /// Build the engine and the consumer's receiver.
    pub fn build<D: Dialer>(self) -> (Live<D>, EnvelopeReceiver) {
        Live::new(self.config)
    }
}

/// Lifecycle state of a [`Live`] engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Idle,
    Dialing,
    Dialed,
    Entering,
    Active,
    Closing,
    Closed,
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ConnectionState::Idle => "idle",
            ConnectionState::Dialing => "dialing",
            ConnectionState::Dialed => "dialed",
            ConnectionState::Entering => "entering",
            ConnectionState::Active => "active",
            ConnectionState::Closing => "closing",
            ConnectionState::Closed => "closed",
        };
        f.write_str(name)
    }
}

/// The room a connection joined.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub room_id: i64,
    pub key: String,
    pub uid: i64,
}

/// A single connection to the event stream.
pub struct Live<D: Dialer> {
    config: LiveConfig,
    state: ConnectionState,
    conn: Option<(D::Reader, D::Writer)>,
    sender: Option<EnvelopeSender>,
    session: Option<Session>,
}

impl<D: Dialer> Live<D> {
    /// Create an engine from a configuration.
    pub fn new(config: LiveConfig) -> (Self, EnvelopeReceiver) {
        let (sender, receiver) = channel(config.channel_capacity);
        let live = Self {
            config,
            state: ConnectionState::Idle,
            conn: None,
            sender: Some(sender),
            session: None,
        };
        (live, receiver)
    }

    /// Current lifecycle state.
    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// The joined room, once `enter` has sent the join frame.
    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn config(&self) -> &LiveConfig {
        &self.config
    }

    /// Open the socket.
    ///
    /// # Errors
    ///
    /// - [`LiveError::InvalidState`] unless the engine is idle
    /// - [`LiveError::Connect`] if dialing fails; the engine is then closed
    ///   and the consumer's stream ends
    pub async fn dial(&mut self, dialer: &D, host: &str) -> Result<()> {
        self.expect_state(ConnectionState::Idle)?;
        self.state = ConnectionState::Dialing;
        tracing::debug!(host, "dialing");

        match dialer.dial(host).await {
            Ok(halves) => {
                self.conn = Some(halves);
                self.state = ConnectionState::Dialed;
                Ok(())
            }
            Err(e) => {
                tracing::error!(host, error = %e, "dial failed");
                self.sender = None;
                self.state = ConnectionState::Closed;
                Err(LiveError::Connect(e))
            }
        }
    }

    /// Join `room_id` and stream its events until `cancel` fires or the
    /// connection fails.
    ///
    /// Returns `Ok(())` after cancellation. In every case the socket has been
    /// closed exactly once, the state is `Closed` and the consumer's stream
    /// has ended by the time this returns.
    ///
    /// # Errors
    ///
    /// - [`LiveError::InvalidState`] unless the engine has dialed
    /// - [`LiveError::Config`] for a zero heartbeat interval
    /// - [`LiveError::Write`] if the join frame or a heartbeat cannot be sent
    /// - [`LiveError::Read`] or [`LiveError::ConnectionClosed`] when the
    ///   socket fails or the peer closes it
    /// - [`LiveError::RecoveredFault`] if a background task panicked
    pub async fn enter(
        &mut self,
        cancel: CancellationToken,
        room_id: i64,
        key: &str,
        uid: i64,
    ) -> Result<()> {
        self.expect_state(ConnectionState::Dialed)?;
        let period = self.config.heartbeat_interval;
        if period.is_zero() {
            return Err(LiveError::Config(
                "heartbeat interval must be non-zero".to_string(),
            ));
        }

        let (Some((reader, mut writer)), Some(sender)) = (self.conn.take(), self.sender.take())
        else {
            return Err(LiveError::InvalidState {
                expected: ConnectionState::Dialed,
                actual: self.state,
            });
        };
        self.state = ConnectionState::Entering;

        let join = JoinRequest::new(room_id, uid)
            .key(key)
            .protover(self.config.join_protover)
            .platform(self.config.platform.clone());
        let sent = match join.to_frame() {
            Ok(frame) => writer.write_frame(frame).await.map_err(LiveError::Write),
            Err(e) => Err(e),
        };
        if let Err(e) = sent {
            tracing::error!(room_id, error = %e, "join failed");
            self.state = ConnectionState::Closing;
            close_writer(&mut writer).await;
            self.state = ConnectionState::Closed;
            return Err(e);
        }

        self.session = Some(Session {
            room_id,
            key: key.to_string(),
            uid,
        });
        self.state = ConnectionState::Active;
        tracing::debug!(room_id, uid, "join sent");

        let shutdown = cancel.child_token();
        // Stops both tasks if this future is dropped before they finish.
        let _stop_on_drop = shutdown.clone().drop_guard();
        let on_fault = self.config.on_fault.clone();

        // The heartbeat task owns the writer and hands it back for the close.
        let heartbeat = tokio::spawn({
            let on_fault = on_fault.clone();
            let shutdown = shutdown.clone();
            async move {
                let beats = heartbeat::run(&mut writer, period, shutdown.clone());
                let result = guarded("heartbeat", on_fault, shutdown, beats).await;
                (writer, result)
            }
        });
        let receive = tokio::spawn(guarded(
            "receive",
            on_fault.clone(),
            shutdown.clone(),
            Receiver::new(
                reader,
                sender,
                BatchDecoder::with_max_payload(self.config.max_payload_size),
                shutdown.clone(),
                on_fault.clone(),
                self.config.debug,
            )
            .run(),
        ));

        let (heartbeat, receive) = tokio::join!(heartbeat, receive);
        self.state = ConnectionState::Closing;

        let receive = joined("receive", receive, &on_fault);
        let heartbeat = match heartbeat {
            Ok((mut writer, result)) => {
                close_writer(&mut writer).await;
                result
            }
            // An aborted task drops the writer without a close frame.
            Err(e) => joined("heartbeat", Err(e), &on_fault),
        };
        self.state = ConnectionState::Closed;
        tracing::debug!(room_id, "connection closed");

        receive.and(heartbeat)
    }

    fn expect_state(&self, expected: ConnectionState) -> Result<()> {
        if self.state == expected {
            Ok(())
        } else {
            Err(LiveError::InvalidState {
                expected,
                actual: self.state,
            })
        }
    }
}

impl<D: Dialer> fmt::Debug for Live<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Live")
            .field("state", &self.state)
            .field("session", &self.session)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Run a task under the supervisor, then stop its sibling.
async fn guarded<F>(
    task: &'static str,
    on_fault: FaultHandler,
    shutdown: CancellationToken,
    work: F,
) -> Result<()>
where
    F: std::future::Future<Output = Result<()>>,
{
    let result = supervise(task, &on_fault, work).await;
    if let Err(e) = &result {
        tracing::error!(task, error = %e, "task failed");
    }
    shutdown.cancel();
    result
}

fn joined(
    task: &'static str,
    outcome: std::result::Result<Result<()>, JoinError>,
    on_fault: &FaultHandler,
) -> Result<()> {
    outcome.unwrap_or_else(|e| {
        let fault = LiveError::RecoveredFault(format!("{} task aborted: {}", task, e));
        on_fault.report(&fault);
        Err(fault)
    })
}

async fn close_writer<W: FrameWrite>(writer: &mut W) {
    if let Err(e) = writer.close().await {
        tracing::debug!(error = %e, "close failed");
    }
}
