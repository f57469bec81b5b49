//! Request parsing and response encoding.
//!
//! - [`RequestParser`]: buffer of one complete request to [`HttpRequest`](crate::protocol::HttpRequest)
//! - [`ResponseEncoder`]: `http::Response<Bytes>` to wire bytes, usable with
//!   `tokio_util::codec::FramedWrite`
//!
//! # Example
//!
//! ```
//! use bytes::{Bytes, BytesMut};
//! use ingest_http::codec::{RequestParser, ResponseEncoder};
//! use ingest_http::protocol::HttpRequest;
//! use tokio_util::codec::Encoder;
//!
//! let mut request = HttpRequest::new();
//! RequestParser::new().parse(b"GET / HTTP/1.0\n\n", &mut request).unwrap();
//!
//! let response = http::Response::builder()
//!     .version(http::Version::HTTP_10)
//!     .body(Bytes::from_static(b"ok"))
//!     .unwrap();
//! let mut dst = BytesMut::new();
//! ResponseEncoder::new().encode(response, &mut dst).unwrap();
//! assert!(dst.starts_with(b"HTTP/1.0 200 OK\r\n"));
//! ```

mod lines;
mod request_parser;
mod response_encoder;

pub use request_parser::RequestParser;
pub use response_encoder::ResponseEncoder;
