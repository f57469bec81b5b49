//! HTTP/1.x response encoder
//!
//! Serializes an `http::Response<Bytes>` as status line, headers, blank line
//! and body. A `content-length` header is set whenever the body is non-empty;
//! an empty body adds no framing headers, which is what a HEAD answer needs.
//!
//! Only HTTP/1.0 and HTTP/1.1 responses can be written.

use std::io;
use std::io::Write;

use bytes::{BufMut, Bytes, BytesMut};
use http::{header, Response, Version};
use tokio_util::codec::Encoder;
use tracing::error;

use crate::protocol::SendError;

/// Initial buffer size allocated for header serialization
const INIT_HEADER_SIZE: usize = 1024;

/// Encoder for complete responses implementing the [`Encoder`] trait.
#[derive(Debug, Default, Clone, Copy)]
pub struct ResponseEncoder;

impl ResponseEncoder {
    pub fn new() -> Self {
        Self
    }
}

impl Encoder<Response<Bytes>> for ResponseEncoder {
    type Error = SendError;

    /// Encodes `item` into `dst`.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - the response version is neither HTTP/1.0 nor HTTP/1.1
    /// - writing to the buffer fails
    fn encode(&mut self, item: Response<Bytes>, dst: &mut BytesMut) -> Result<(), Self::Error> {
        let (mut parts, body) = item.into_parts();

        let version = match parts.version {
            Version::HTTP_10 => "HTTP/1.0",
            Version::HTTP_11 => "HTTP/1.1",
            v => {
                error!(http_version = ?v, "unsupported http version");
                return Err(SendError::UnsupportedVersion(v));
            }
        };

        dst.reserve(INIT_HEADER_SIZE + body.len());
        write!(
            FastWrite(dst),
            "{} {} {}\r\n",
            version,
            parts.status.as_str(),
            parts.status.canonical_reason().unwrap_or("Unknown")
        )?;

        if !body.is_empty() {
            parts.headers.insert(header::CONTENT_LENGTH, body.len().into());
        }

        // Write all headers
        for (header_name, header_value) in &parts.headers {
            dst.put_slice(header_name.as_ref());
            dst.put_slice(b": ");
            dst.put_slice(header_value.as_ref());
            dst.put_slice(b"\r\n");
        }
        dst.put_slice(b"\r\n");
        dst.put_slice(&body);
        Ok(())
    }
}

/// Fast writer implementation for writing to BytesMut.
///
/// Space has already been reserved, so writes go straight to `put_slice`.
struct FastWrite<'a>(&'a mut BytesMut);

impl Write for FastWrite<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.put_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
