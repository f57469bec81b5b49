//! HTTP/1.x request ingestion
//!
//! This crate pulls the bytes of one request off a connected socket, parses
//! them into a structured request and writes a response back. It is built for
//! the simple one-request-per-connection model: no keep-alive, no pipelining,
//! no chunked transfer-encoding.
//!
//! # Pipeline
//!
//! ```text
//! socket -> SocketReceiver -> GrowableBuffer -> RequestParser -> HttpRequest
//! ```
//!
//! - [`buffer::GrowableBuffer`]: owned bytes with a fixed, observable doubling rule
//! - [`connection::SocketReceiver`]: short-read driven receive into a growing buffer
//! - [`codec::RequestParser`]: request line, headers and body, with rollback on error
//! - [`protocol::HttpRequest`]: method, URI, version, ordered headers and body
//! - [`connection::HttpConnection`]: ties it together with a [`handler::Handler`]
//!
//! # Example
//!
//! ```no_run
//! use std::convert::Infallible;
//! use std::sync::Arc;
//!
//! use bytes::Bytes;
//! use http::Response;
//! use tokio::net::TcpListener;
//! use tracing::{error, info};
//! use ingest_http::connection::HttpConnection;
//! use ingest_http::handler::make_handler;
//! use ingest_http::protocol::HttpRequest;
//!
//! #[tokio::main]
//! async fn main() {
//!     let handler = Arc::new(make_handler(|req: HttpRequest, _raw: Bytes| async move {
//!         Ok::<_, Infallible>(Response::new(Bytes::from(format!("you asked for {}", req.uri()))))
//!     }));
//!
//!     let tcp_listener = match TcpListener::bind("127.0.0.1:8080").await {
//!         Ok(tcp_listener) => tcp_listener,
//!         Err(e) => {
//!             error!(cause = %e, "bind server error");
//!             return;
//!         }
//!     };
//!
//!     loop {
//!         let (tcp_stream, peer) = match tcp_listener.accept().await {
//!             Ok(accepted) => accepted,
//!             Err(e) => {
//!                 error!(cause = %e, "failed to accept");
//!                 continue;
//!             }
//!         };
//!
//!         let handler = Arc::clone(&handler);
//!         tokio::spawn(async move {
//!             let (reader, writer) = tcp_stream.into_split();
//!             if let Err(e) = HttpConnection::new(reader, writer).process(handler).await {
//!                 info!(%peer, cause = %e, "connection ended with error");
//!             }
//!         });
//!     }
//! }
//! ```

pub mod buffer;
pub mod codec;
pub mod connection;
pub mod handler;
pub mod protocol;

mod utils;
pub(crate) use utils::ensure;
