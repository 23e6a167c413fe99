//! Heartbeat scheduler.
//!
//! Sends a heartbeat frame immediately and then once per interval until the
//! shutdown token fires. The server drops clients that stay silent for about
//! a minute; the reply (operation 3) arrives through the receive loop.
//!
//! After the join the heartbeat is the only writer, so the task borrows the
//! write half for its whole run and a consumer that stops draining the
//! channel never delays a beat.

use std::time::Duration;

use tokio::time::{interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::error::{LiveError, Result};
use crate::protocol::heartbeat_frame;
use crate::transport::FrameWrite;

/// Run until `shutdown` fires (`Ok`) or a write fails (`LiveError::Write`).
///
/// `period` must be non-zero.
pub(crate) async fn run<W: FrameWrite>(
    writer: &mut W,
    period: Duration,
    shutdown: CancellationToken,
) -> Result<()> {
    let frame = heartbeat_frame();
    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            _ = shutdown.cancelled() => return Ok(()),
            _ = ticker.tick() => {}
        }

        tokio::select! {
            biased;
            _ = shutdown.cancelled() => return Ok(()),
            sent = writer.write_frame(frame.clone()) => sent.map_err(LiveError::Write)?,
        }
        tracing::trace!("heartbeat sent");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{decode_packets, Operation, HEARTBEAT_BODY};
    use crate::transport::{pair, Dialer};

    #[tokio::test(start_paused = true)]
    async fn test_first_beat_is_immediate_then_periodic() {
        let (dialer, mut server) = pair();
        let (_reader, mut writer) = dialer.dial("memory").await.unwrap();
        let shutdown = CancellationToken::new();

        let stop = shutdown.clone();
        let task = tokio::spawn(async move {
            run(&mut writer, Duration::from_secs(30), stop).await
        });

        for _ in 0..3 {
            let frame = server.recv_frame().await.unwrap();
            let packets = decode_packets(frame).unwrap();
            assert_eq!(packets[0].operation, Operation::Heartbeat);
            assert_eq!(packets[0].body(), HEARTBEAT_BODY);
        }

        shutdown.cancel();
        assert!(task.await.unwrap().is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn test_write_failure_is_fatal() {
        let (dialer, server) = pair();
        let (_reader, mut writer) = dialer.dial("memory").await.unwrap();
        server.fail_writes(true);

        let result = run(&mut writer, Duration::from_secs(30), CancellationToken::new()).await;

        assert!(matches!(result, Err(LiveError::Write(_))));
    }

    #[tokio::test]
    async fn test_cancelled_before_start() {
        let (dialer, mut server) = pair();
        let (_reader, mut writer) = dialer.dial("memory").await.unwrap();
        let shutdown = CancellationToken::new();
        shutdown.cancel();

        run(&mut writer, Duration::from_secs(30), shutdown)
            .await
            .unwrap();

        writer.close().await.unwrap();
        assert!(server.recv_frame().await.is_none());
    }
}
