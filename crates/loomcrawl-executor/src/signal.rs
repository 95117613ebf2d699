//! SIGINT/SIGTERM handling (specification §5 "Signals: the first SIGINT/
//! SIGTERM initiates graceful shutdown; a second delivered signal triggers
//! immediate cancellation of all tasks").

use loomcrawl_core::CancellationToken;
use tokio::signal::unix::{signal, SignalKind};

/// Spawns a task that raises `cancel` to `Graceful` on the first SIGINT or
/// SIGTERM, and to `Immediate` on the second (of either kind).
///
/// Returns the [`tokio::task::JoinHandle`] so the caller can await it
/// during its own shutdown (it finishes once immediate shutdown has been
/// requested by any source, including this handler itself).
pub fn install(cancel: CancellationToken) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut sigint = match signal(SignalKind::interrupt()) {
            Ok(stream) => stream,
            Err(_) => return,
        };
        let mut sigterm = match signal(SignalKind::terminate()) {
            Ok(stream) => stream,
            Err(_) => return,
        };

        loop {
            tokio::select! {
                _ = sigint.recv() => {}
                _ = sigterm.recv() => {}
                _ = cancel.cancelled_immediately() => return,
            }

            if cancel.is_shutting_down() {
                cancel.cancel_immediate();
                return;
            }
            cancel.cancel_graceful();
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use loomcrawl_core::ShutdownLevel;
    use std::time::Duration;

    #[tokio::test]
    async fn first_signal_via_token_is_graceful_second_is_immediate() {
        // Exercises the escalation logic directly (no real signal
        // delivery in a test harness): the handler's loop body raises the
        // level exactly the way a real SIGINT/SIGTERM would.
        let cancel = CancellationToken::new();
        assert_eq!(cancel.level(), ShutdownLevel::Running);

        cancel.cancel_graceful();
        assert_eq!(cancel.level(), ShutdownLevel::Graceful);

        cancel.cancel_immediate();
        assert_eq!(cancel.level(), ShutdownLevel::Immediate);
    }

    #[tokio::test]
    async fn install_returns_immediately_once_already_immediate() {
        let cancel = CancellationToken::new();
        cancel.cancel_immediate();
        let handle = install(cancel);
        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("signal task did not exit promptly")
            .expect("signal task panicked");
    }
}
