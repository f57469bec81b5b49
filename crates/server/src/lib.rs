//! A small HTTP/1.x server built on [`ingest_http`].
//!
//! It accepts connections, reads one request from each, answers with a canned
//! response and closes the connection. Shutdown is driven by a
//! [`ShutdownContext`] that the binary wires to SIGINT and SIGTERM.
//!
//! # Example
//!
//! ```no_run
//! use ingest_server::{CannedHandler, Server, ShutdownContext};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let shutdown = ShutdownContext::new();
//!     shutdown.listen_for_signals();
//!
//!     let server = Server::builder().address(([127, 0, 0, 1], 8080)).handler(CannedHandler::new(false)).build()?;
//!     server.start(shutdown).await?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod handler;
pub mod listener;
pub mod server;
pub mod shutdown;

pub use config::{AcceptTimeout, Options, ServerConfig};
pub use handler::CannedHandler;
pub use listener::AcceptError;
pub use server::{Server, ServerBuildError, ServerBuilder, ServerError};
pub use shutdown::ShutdownContext;
