//! Command line options and the server configuration derived from them.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

use clap::Parser;
use ingest_http::connection::DEFAULT_RECV_CAPACITY;
use tracing::Level;

pub const DEFAULT_PORT: u16 = 80;
pub const DEFAULT_MAX_CONNECTIONS: usize = 64;
pub const DEFAULT_ACCEPT_POLL_MS: u64 = 10;
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 30_000;

#[derive(Parser, Debug, Clone)]
#[command(name = "ingest-server", version)]
#[command(about = "Answers HTTP/1.x requests with canned responses", long_about = None)]
pub struct Options {
    /// Port to listen on
    #[arg(short, long, default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Address to bind
    #[arg(long, default_value_t = IpAddr::V4(Ipv4Addr::UNSPECIFIED))]
    pub host: IpAddr,

    /// Log at debug level, including every raw request
    #[arg(short, long)]
    pub verbose: bool,

    /// Answer every request with its own raw text
    #[arg(long)]
    pub echo: bool,

    /// Initial receive buffer size in bytes
    #[arg(long, default_value_t = DEFAULT_RECV_CAPACITY)]
    pub recv_buffer: usize,

    /// Sleep between accept attempts when an accept timeout is set
    #[arg(long, default_value_t = DEFAULT_ACCEPT_POLL_MS, value_parser = clap::value_parser!(u64).range(1..))]
    pub accept_poll_ms: u64,

    /// Give up waiting for a connection after this long, then poll again
    #[arg(long)]
    pub accept_timeout_ms: Option<u64>,

    /// Connections processed at the same time
    #[arg(long, default_value_t = DEFAULT_MAX_CONNECTIONS)]
    pub max_connections: usize,

    /// Drop a connection that has not been answered after this long
    #[arg(long, default_value_t = DEFAULT_REQUEST_TIMEOUT_MS, value_parser = clap::value_parser!(u64).range(1..))]
    pub request_timeout_ms: u64,
}

impl Options {
    pub fn max_level(&self) -> Level {
        if self.verbose { Level::DEBUG } else { Level::INFO }
    }
}

/// Poll-sleep-retry accept parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AcceptTimeout {
    pub poll_interval: Duration,
    pub timeout: Duration,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub address: SocketAddr,
    pub echo: bool,
    pub recv_buffer: usize,
    /// `None` accepts with a plain blocking wait.
    pub accept_timeout: Option<AcceptTimeout>,
    pub max_connections: usize,
    pub request_timeout: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            address: SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), DEFAULT_PORT),
            echo: false,
            recv_buffer: DEFAULT_RECV_CAPACITY,
            accept_timeout: None,
            max_connections: DEFAULT_MAX_CONNECTIONS,
            request_timeout: Duration::from_millis(DEFAULT_REQUEST_TIMEOUT_MS),
        }
    }
}

impl From<Options> for ServerConfig {
    fn from(options: Options) -> Self {
        let accept_timeout = options.accept_timeout_ms.map(|timeout_ms| AcceptTimeout {
            poll_interval: Duration::from_millis(options.accept_poll_ms),
            timeout: Duration::from_millis(timeout_ms),
        });

        Self {
            address: SocketAddr::new(options.host, options.port),
            echo: options.echo,
            recv_buffer: options.recv_buffer,
            accept_timeout,
            max_connections: options.max_connections,
            request_timeout: Duration::from_millis(options.request_timeout_ms),
        }
    }
}
