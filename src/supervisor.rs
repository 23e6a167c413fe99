//! Fault containment for background work.
//!
//! A panic inside the heartbeat or receive task must not take the process
//! down or leave the connection half-alive. [`supervise`] wraps a task future
//! and turns a panic into [`LiveError::RecoveredFault`]; [`contain`] does the
//! same for one synchronous step so the caller can skip it and carry on.
//! Either way the fault is passed to the configured [`FaultHandler`].

use std::any::Any;
use std::fmt;
use std::future::Future;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use futures_util::FutureExt;

use crate::error::{LiveError, Result};

/// Callback invoked with every recovered fault.
///
/// The default handler logs the fault with `tracing::error!`.
#[derive(Clone)]
pub struct FaultHandler(Arc<dyn Fn(&LiveError) + Send + Sync>);

impl FaultHandler {
    pub fn new<F>(handler: F) -> Self
    where
        F: Fn(&LiveError) + Send + Sync + 'static,
    {
        Self(Arc::new(handler))
    }

    /// Pass a fault to the handler.
    pub fn report(&self, fault: &LiveError) {
        (self.0)(fault)
    }
}

impl Default for FaultHandler {
    fn default() -> Self {
        Self::new(|fault| tracing::error!(error = %fault, "recovered fault"))
    }
}

impl fmt::Debug for FaultHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("FaultHandler(..)")
    }
}

/// Run a task future, converting a panic into a `RecoveredFault` error.
pub(crate) async fn supervise<F>(
    task: &'static str,
    on_fault: &FaultHandler,
    work: F,
) -> Result<()>
where
    F: Future<Output = Result<()>>,
{
    match AssertUnwindSafe(work).catch_unwind().await {
        Ok(result) => result,
        Err(payload) => {
            let fault = LiveError::RecoveredFault(format!(
                "{} task panicked: {}",
                task,
                panic_message(payload.as_ref())
            ));
            tracing::warn!(task, "background task panicked");
            on_fault.report(&fault);
            Err(fault)
        }
    }
}

/// Run one step, returning `None` if it panicked.
pub(crate) fn contain<T>(
    step: &str,
    on_fault: &FaultHandler,
    work: impl FnOnce() -> T,
) -> Option<T> {
    match catch_unwind(AssertUnwindSafe(work)) {
        Ok(value) => Some(value),
        Err(payload) => {
            let fault = LiveError::RecoveredFault(format!(
                "{} panicked: {}",
                step,
                panic_message(payload.as_ref())
            ));
            tracing::warn!(step, "step panicked, skipping");
            on_fault.report(&fault);
            None
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        *s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "non-string panic payload"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    fn recording() -> (FaultHandler, Arc<Mutex<Vec<String>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let handler = FaultHandler::new(move |fault| {
            sink.lock().unwrap().push(fault.to_string());
        });
        (handler, seen)
    }

    #[tokio::test]
    async fn test_supervise_passes_result_through() {
        let (handler, seen) = recording();

        let ok = supervise("ok", &handler, async { Ok::<(), LiveError>(()) }).await;
        assert!(ok.is_ok());
        let err = supervise("fails", &handler, async {
            Err::<(), LiveError>(LiveError::ConnectionClosed)
        })
        .await
        .unwrap_err();

        assert!(matches!(err, LiveError::ConnectionClosed));
        assert!(seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_supervise_converts_panic() {
        let (handler, seen) = recording();

        let err = supervise("heartbeat", &handler, async {
            if true {
                panic!("boom");
            }
            Ok::<(), LiveError>(())
        })
        .await
        .unwrap_err();

        match err {
            LiveError::RecoveredFault(msg) => {
                assert!(msg.contains("heartbeat"));
                assert!(msg.contains("boom"));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(seen.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_contain() {
        let (handler, seen) = recording();

        assert_eq!(contain("add", &handler, || 1 + 1), Some(2));
        let skipped: Option<u32> = contain("classify", &handler, || panic!("bad {}", 7));

        assert!(skipped.is_none());
        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert!(seen[0].contains("bad 7"));
    }
}
