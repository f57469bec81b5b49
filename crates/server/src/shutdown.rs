//! Shutdown coordination.
//!
//! A [`ShutdownContext`] is cloned into the accept loop and every connection
//! task. Once triggered, the accept loop stops and in-flight connections are
//! dropped, which closes their sockets.

use std::io;

use tokio::task::JoinHandle;
use tokio_util::sync::{CancellationToken, WaitForCancellationFuture};
use tracing::{error, info};

#[derive(Debug, Clone, Default)]
pub struct ShutdownContext {
    token: CancellationToken,
}

impl ShutdownContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts shutting down everything holding a clone of this context.
    pub fn trigger(&self) {
        self.token.cancel();
    }

    pub fn is_triggered(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Completes once [`trigger`](Self::trigger) has been called.
    pub fn triggered(&self) -> WaitForCancellationFuture<'_> {
        self.token.cancelled()
    }

    /// Triggers this context on SIGINT or SIGTERM.
    pub fn listen_for_signals(&self) -> JoinHandle<()> {
        let shutdown = self.clone();
        tokio::spawn(async move {
            match wait_for_signal().await {
                Ok(signal) => {
                    info!(signal, "received signal, shutting down");
                    shutdown.trigger();
                }
                Err(e) => error!(cause = %e, "can't install signal handler"),
            }
        })
    }
}

#[cfg(unix)]
async fn wait_for_signal() -> io::Result<&'static str> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut terminate = signal(SignalKind::terminate())?;
    tokio::select! {
        result = tokio::signal::ctrl_c() => result.map(|()| "SIGINT"),
        _ = terminate.recv() => Ok("SIGTERM"),
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() -> io::Result<&'static str> {
    tokio::signal::ctrl_c().await.map(|()| "ctrl-c")
}
