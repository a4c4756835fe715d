//! Cooperative shutdown controller.
//!
//! OS signals are turned into a shutdown request by [`listen_for_signals`];
//! the scheduler only ever sees the controller, so tests can stop a run
//! without sending signals. A second signal during a pending stop ends the
//! listener so the binary can exit at once.

use std::future::Future;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use tokio::sync::Notify;
use tracing::{error, info, warn};

/// Cooperative cancellation token shared between the signal handler and the
/// polling loop.
#[derive(Clone, Debug, Default)]
pub struct ShutdownController {
    inner: Arc<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    requested: AtomicBool,
    notify: Notify,
}

impl ShutdownController {
    /// Returns true if shutdown has been requested.
    pub fn is_shutdown_requested(&self) -> bool {
        self.inner.requested.load(Ordering::SeqCst)
    }

    /// Request shutdown and wake all waiters.
    pub fn request_shutdown(&self) {
        self.inner.requested.store(true, Ordering::SeqCst);
        self.inner.notify.notify_waiters();
    }

    /// Wait until shutdown is requested.
    pub async fn wait(&self) {
        let notified = self.inner.notify.notified();
        tokio::pin!(notified);
        // Register before checking the flag so a request in between is not lost.
        notified.as_mut().enable();
        if self.is_shutdown_requested() {
            return;
        }
        notified.await;
    }
}

/// Wait for Ctrl+C / SIGTERM and turn it into a shutdown request.
///
/// The first signal requests a graceful stop. The future completes only when
/// a second signal arrives while that stop is still pending; the caller should
/// then exit without waiting for the scheduler.
pub async fn listen_for_signals(shutdown: ShutdownController) {
    handle_signals(shutdown, wait_for_os_signal).await;
}

/// Drive `shutdown` from a stream of signals produced by `next_signal`.
///
/// The first signal requests shutdown. If shutdown was already requested
/// elsewhere the first signal is skipped. Returns on the next signal after
/// shutdown was requested.
pub async fn handle_signals<F, Fut>(shutdown: ShutdownController, mut next_signal: F)
where
    F: FnMut() -> Fut,
    Fut: Future<Output = &'static str>,
{
    tokio::select! {
        name = next_signal() => {
            info!("Received {}, shutting down...", name);
            shutdown.request_shutdown();
        }
        _ = shutdown.wait() => {}
    }

    let name = next_signal().await;
    warn!("Received {} again, exiting immediately", name);
}

async fn wait_for_os_signal() -> &'static str {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => "Ctrl+C",
        _ = terminate => "SIGTERM",
    }
}
