//! The accept loop.
//!
//! Each accepted connection runs receive, parse, handle and respond on its own
//! task, then closes. A semaphore bounds how many connections are processed
//! at once, and each connection gets a fixed time to finish so a silent client
//! cannot hold its permit forever. Accept failures and timeouts are logged and
//! the loop keeps going; only the [`ShutdownContext`] stops it.

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use ingest_http::connection::{DEFAULT_RECV_CAPACITY, HttpConnection};
use ingest_http::handler::Handler;
use thiserror::Error;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Semaphore;
use tracing::{Instrument, debug, error, info, info_span, warn};

use crate::config::{AcceptTimeout, DEFAULT_MAX_CONNECTIONS, DEFAULT_REQUEST_TIMEOUT_MS, ServerConfig};
use crate::listener::{AcceptError, accept, accept_with_timeout};
use crate::shutdown::ShutdownContext;

#[derive(Debug)]
pub struct ServerBuilder<H> {
    address: Option<SocketAddr>,
    handler: Option<H>,
    recv_buffer: usize,
    accept_timeout: Option<AcceptTimeout>,
    max_connections: usize,
    request_timeout: Duration,
}

impl<H: Handler + 'static> ServerBuilder<H> {
    fn new() -> Self {
        Self {
            address: None,
            handler: None,
            recv_buffer: DEFAULT_RECV_CAPACITY,
            accept_timeout: None,
            max_connections: DEFAULT_MAX_CONNECTIONS,
            request_timeout: Duration::from_millis(DEFAULT_REQUEST_TIMEOUT_MS),
        }
    }

    pub fn address(mut self, address: impl Into<SocketAddr>) -> Self {
        self.address = Some(address.into());
        self
    }

    pub fn handler(mut self, handler: H) -> Self {
        self.handler = Some(handler);
        self
    }

    pub fn recv_buffer(mut self, capacity: usize) -> Self {
        self.recv_buffer = capacity;
        self
    }

    pub fn accept_timeout(mut self, accept_timeout: AcceptTimeout) -> Self {
        self.accept_timeout = Some(accept_timeout);
        self
    }

    pub fn max_connections(mut self, max_connections: usize) -> Self {
        self.max_connections = max_connections;
        self
    }

    /// Time a connection gets to deliver its request and receive the response.
    pub fn request_timeout(mut self, request_timeout: Duration) -> Self {
        self.request_timeout = request_timeout;
        self
    }

    /// Applies every setting of `config` except the handler.
    pub fn config(mut self, config: &ServerConfig) -> Self {
        self.address = Some(config.address);
        self.recv_buffer = config.recv_buffer;
        self.accept_timeout = config.accept_timeout;
        self.max_connections = config.max_connections;
        self.request_timeout = config.request_timeout;
        self
    }

    pub fn build(self) -> Result<Server<H>, ServerBuildError> {
        let address = self.address.ok_or(ServerBuildError::MissingAddress)?;
        let handler = self.handler.ok_or(ServerBuildError::MissingHandler)?;
        if self.max_connections == 0 {
            return Err(ServerBuildError::NoConnectionsAllowed);
        }
        if self.request_timeout.is_zero() {
            return Err(ServerBuildError::ZeroRequestTimeout);
        }

        Ok(Server {
            address,
            handler: Arc::new(handler),
            recv_buffer: self.recv_buffer,
            accept_timeout: self.accept_timeout,
            max_connections: self.max_connections,
            request_timeout: self.request_timeout,
        })
    }
}

#[derive(Error, Debug)]
pub enum ServerBuildError {
    #[error("address must be set")]
    MissingAddress,
    #[error("handler must be set")]
    MissingHandler,
    #[error("max connections must be at least 1")]
    NoConnectionsAllowed,
    #[error("request timeout must be greater than zero")]
    ZeroRequestTimeout,
}

#[derive(Error, Debug)]
pub enum ServerError {
    #[error("can't bind {address}: {source}")]
    Bind { address: SocketAddr, source: io::Error },
}

#[derive(Debug)]
pub struct Server<H> {
    address: SocketAddr,
    handler: Arc<H>,
    recv_buffer: usize,
    accept_timeout: Option<AcceptTimeout>,
    max_connections: usize,
    request_timeout: Duration,
}

impl<H: Handler + 'static> Server<H> {
    pub fn builder() -> ServerBuilder<H> {
        ServerBuilder::new()
    }

    pub fn address(&self) -> SocketAddr {
        self.address
    }

    /// Binds the configured address and serves until `shutdown` fires.
    pub async fn start(self, shutdown: ShutdownContext) -> Result<(), ServerError> {
        info!(address = %self.address, "start listening");
        let tcp_listener = match TcpListener::bind(self.address).await {
            Ok(tcp_listener) => tcp_listener,
            Err(e) => {
                error!(cause = %e, "bind server error");
                return Err(ServerError::Bind { address: self.address, source: e });
            }
        };

        self.serve(tcp_listener, shutdown).await;
        Ok(())
    }

    /// Runs the accept loop on an already bound listener until `shutdown` fires.
    pub async fn serve(self, tcp_listener: TcpListener, shutdown: ShutdownContext) {
        let permits = Arc::new(Semaphore::new(self.max_connections));

        loop {
            let permit = tokio::select! {
                () = shutdown.triggered() => break,
                permit = Arc::clone(&permits).acquire_owned() => match permit {
                    Ok(permit) => permit,
                    Err(_closed) => break,
                },
            };

            let accepted = tokio::select! {
                () = shutdown.triggered() => break,
                accepted = self.accept(&tcp_listener) => accepted,
            };

            let (tcp_stream, peer) = match accepted {
                Ok(stream_and_addr) => stream_and_addr,
                Err(e) if e.is_timeout() => {
                    debug!(cause = %e, "accept timed out, polling again");
                    continue;
                }
                Err(e) => {
                    warn!(cause = %e, os_code = e.os_code(), "failed to accept");
                    continue;
                }
            };

            let handler = Arc::clone(&self.handler);
            let shutdown = shutdown.clone();
            let recv_buffer = self.recv_buffer;
            let request_timeout = self.request_timeout;

            tokio::spawn(
                async move {
                    let _permit = permit;
                    tokio::select! {
                        () = shutdown.triggered() => {
                            info!("shutting down, dropping connection");
                        }
                        () = process(tcp_stream, recv_buffer, request_timeout, handler) => {}
                    }
                }
                .instrument(info_span!("connection", %peer)),
            );
        }

        info!("accept loop stopped");
    }

    async fn accept(&self, tcp_listener: &TcpListener) -> Result<(TcpStream, SocketAddr), AcceptError> {
        match self.accept_timeout {
            Some(AcceptTimeout { poll_interval, timeout }) => {
                accept_with_timeout(tcp_listener, poll_interval, timeout).await
            }
            None => accept(tcp_listener).await,
        }
    }
}

async fn process<H: Handler>(tcp_stream: TcpStream, recv_buffer: usize, request_timeout: Duration, handler: Arc<H>) {
    let (reader, writer) = tcp_stream.into_split();
    let connection = HttpConnection::with_capacity(recv_buffer, reader, writer);
    match tokio::time::timeout(request_timeout, connection.process(handler)).await {
        Ok(Ok(())) => {
            info!("finished process, connection shutdown");
        }
        Ok(Err(e)) => {
            error!(cause = %e, "service has error, connection shutdown");
        }
        Err(_elapsed) => {
            warn!(timeout = ?request_timeout, "request timed out, dropping connection");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::CannedHandler;

    #[test]
    fn build_requires_address_and_handler() {
        let err = Server::<CannedHandler>::builder().handler(CannedHandler::default()).build().err().unwrap();
        assert!(matches!(err, ServerBuildError::MissingAddress));

        let err = Server::<CannedHandler>::builder().address(([127, 0, 0, 1], 0)).build().err().unwrap();
        assert!(matches!(err, ServerBuildError::MissingHandler));
    }

    #[test]
    fn build_rejects_zero_connections() {
        let err = Server::builder()
            .address(([127, 0, 0, 1], 0))
            .handler(CannedHandler::default())
            .max_connections(0)
            .build()
            .err()
            .unwrap();
        assert!(matches!(err, ServerBuildError::NoConnectionsAllowed));
    }

    #[test]
    fn build_rejects_zero_request_timeout() {
        let err = Server::builder()
            .address(([127, 0, 0, 1], 0))
            .handler(CannedHandler::default())
            .request_timeout(Duration::ZERO)
            .build()
            .err()
            .unwrap();
        assert!(matches!(err, ServerBuildError::ZeroRequestTimeout));
    }

    #[test]
    fn builder_and_server_are_debug() {
        let builder = Server::builder().address(([127, 0, 0, 1], 8080)).handler(CannedHandler::new(true));
        assert!(format!("{builder:?}").starts_with("ServerBuilder {"));

        let server = builder.build().unwrap();
        let debug = format!("{server:?}");
        assert!(debug.starts_with("Server {"));
        assert!(debug.contains("127.0.0.1:8080"));
    }

    #[test]
    fn config_is_applied() {
        let config = ServerConfig {
            address: ([127, 0, 0, 1], 4445).into(),
            request_timeout: Duration::from_millis(250),
            ..ServerConfig::default()
        };
        let server = Server::builder().config(&config).handler(CannedHandler::new(config.echo)).build().unwrap();
        assert_eq!(server.address(), config.address);
        assert_eq!(server.request_timeout, Duration::from_millis(250));
    }

    #[tokio::test]
    async fn start_reports_bind_failure() {
        let taken = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = taken.local_addr().unwrap();

        let server = Server::builder().address(address).handler(CannedHandler::default()).build().unwrap();
        let err = server.start(ShutdownContext::new()).await.unwrap_err();
        assert!(matches!(err, ServerError::Bind { address: a, .. } if a == address));
    }
}
