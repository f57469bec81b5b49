//! Socket-facing side of the crate.
//!
//! - [`SocketReceiver`]: reads one request's bytes into a growable buffer,
//!   with an async and a blocking flavour
//! - [`HttpConnection`]: receive, parse, handle and respond for a single
//!   request, then close

mod http_connection;
mod receiver;

pub use http_connection::HttpConnection;
pub use receiver::{DEFAULT_RECV_CAPACITY, SocketReceiver};
