//! Accepting connections, optionally with a wait budget.

use std::io;
use std::net::SocketAddr;
use std::time::Duration;

use futures::FutureExt;
use thiserror::Error;
use tokio::net::{TcpListener, TcpStream};
use tracing::trace;

#[derive(Error, Debug)]
pub enum AcceptError {
    #[error("no connection arrived within {waited:?}")]
    Timeout { waited: Duration },

    #[error("accept failed: {source}")]
    Io {
        #[from]
        source: io::Error,
    },
}

impl AcceptError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }

    pub fn os_code(&self) -> Option<i32> {
        match self {
            Self::Io { source } => source.raw_os_error(),
            Self::Timeout { .. } => None,
        }
    }
}

pub async fn accept(listener: &TcpListener) -> Result<(TcpStream, SocketAddr), AcceptError> {
    Ok(listener.accept().await?)
}

/// Poll-sleep-retry accept.
///
/// Each attempt polls `accept` once without waiting. When nothing is pending
/// the task sleeps `poll_interval` and tries again, failing with
/// [`AcceptError::Timeout`] once the slept total exceeds `timeout`.
pub async fn accept_with_timeout(
    listener: &TcpListener,
    poll_interval: Duration,
    timeout: Duration,
) -> Result<(TcpStream, SocketAddr), AcceptError> {
    let mut waited = Duration::ZERO;
    loop {
        match listener.accept().now_or_never() {
            Some(Ok(accepted)) => return Ok(accepted),
            Some(Err(e)) if e.kind() != io::ErrorKind::WouldBlock => return Err(e.into()),
            _ => {}
        }

        if waited > timeout {
            return Err(AcceptError::Timeout { waited });
        }

        trace!(?waited, "no pending connection, sleeping");
        tokio::time::sleep(poll_interval).await;
        waited += poll_interval;
    }
}
