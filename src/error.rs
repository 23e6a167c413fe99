//! Error types for bililive-engine.

use thiserror::Error;

use crate::live::ConnectionState;

/// Main error type for all engine operations.
#[derive(Debug, Error)]
pub enum LiveError {
    /// Opening the socket failed.
    #[error("Connect error: {0}")]
    Connect(#[source] std::io::Error),

    /// Malformed frame header, compression or length mismatch.
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// A message body did not match the typed record for its command.
    #[error("Decode error for {cmd}: {source}")]
    Decode {
        cmd: String,
        #[source]
        source: serde_json::Error,
    },

    /// A positional message body (e.g. danmaku `info`) had an unexpected shape.
    #[error("Decode error for {cmd}: {reason}")]
    Shape { cmd: String, reason: String },

    /// Sending the join or a heartbeat frame failed.
    #[error("Write error: {0}")]
    Write(#[source] std::io::Error),

    /// Reading from the socket failed.
    #[error("Read error: {0}")]
    Read(#[source] std::io::Error),

    /// The peer closed the socket or the consumer dropped its receiver.
    #[error("Connection closed")]
    ConnectionClosed,

    /// A panic inside a background task, captured and converted.
    #[error("Recovered fault: {0}")]
    RecoveredFault(String),

    /// Lifecycle method called in the wrong state.
    #[error("Invalid state: expected {expected}, found {actual}")]
    InvalidState {
        expected: ConnectionState,
        actual: ConnectionState,
    },

    /// Rejected configuration value.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// JSON serialization error (join body).
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl LiveError {
    /// Whether the error ends the connection.
    ///
    /// Protocol and decode errors concern one frame or message and leave the
    /// stream usable.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            LiveError::Connect(_)
                | LiveError::Write(_)
                | LiveError::Read(_)
                | LiveError::ConnectionClosed
                | LiveError::RecoveredFault(_)
        )
    }
}

/// Result type alias using LiveError.
pub type Result<T> = std::result::Result<T, LiveError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fatal_classification() {
        assert!(!LiveError::Protocol("bad".into()).is_fatal());
        assert!(!LiveError::Shape {
            cmd: "DANMU_MSG".into(),
            reason: "info missing".into()
        }
        .is_fatal());
        assert!(LiveError::ConnectionClosed.is_fatal());
        assert!(LiveError::RecoveredFault("boom".into()).is_fatal());
    }

    #[test]
    fn test_invalid_state_message() {
        let err = LiveError::InvalidState {
            expected: ConnectionState::Dialed,
            actual: ConnectionState::Idle,
        };
        assert_eq!(
            err.to_string(),
            "Invalid state: expected dialed, found idle"
        );
    }
}
