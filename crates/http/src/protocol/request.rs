//! Parsed HTTP request.
//!
//! [`HttpRequest`] is the structure the parser fills in and the routing layer
//! reads. It owns all of its data, so one object can be parsed into, freed and
//! parsed into again across many connections without anything leaking from
//! one request into the next.

use crate::buffer::GrowableBuffer;
use crate::codec::RequestParser;
use crate::protocol::{HeaderTable, HttpMethod, HttpVersion, ParseError};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HttpRequest {
    pub(crate) version: HttpVersion,
    pub(crate) method: HttpMethod,
    pub(crate) uri: GrowableBuffer,
    pub(crate) headers: HeaderTable,
    pub(crate) body: Option<GrowableBuffer>,
}

impl HttpRequest {
    /// A request in the init state: unknown method and version, nothing allocated.
    pub const fn new() -> Self {
        Self {
            version: HttpVersion::Unknown,
            method: HttpMethod::Unknown,
            uri: GrowableBuffer::new(),
            headers: HeaderTable::new(),
            body: None,
        }
    }

    /// Parses a fresh request out of `src`.
    pub fn from_bytes(src: &[u8]) -> Result<Self, ParseError> {
        let mut request = Self::new();
        request.parse(src)?;
        Ok(request)
    }

    /// Replaces the contents of this request with the one parsed from `src`.
    ///
    /// See [`RequestParser::parse`].
    pub fn parse(&mut self, src: &[u8]) -> Result<(), ParseError> {
        RequestParser::new().parse(src, self)
    }

    /// Releases every owned field and returns to the init state.
    pub fn free(&mut self) {
        self.version = HttpVersion::Unknown;
        self.method = HttpMethod::Unknown;
        self.uri.release();
        self.headers.release();
        self.body = None;
    }

    pub fn version(&self) -> HttpVersion {
        self.version
    }

    pub fn method(&self) -> HttpMethod {
        self.method
    }

    pub fn uri(&self) -> &GrowableBuffer {
        &self.uri
    }

    pub fn headers(&self) -> &HeaderTable {
        &self.headers
    }

    pub fn num_headers(&self) -> usize {
        self.headers.len()
    }

    /// The body bytes; empty when there is none.
    pub fn body(&self) -> &[u8] {
        match &self.body {
            Some(body) => body.as_bytes(),
            None => &[],
        }
    }

    /// `None` until a parse succeeds.
    pub fn body_buffer(&self) -> Option<&GrowableBuffer> {
        self.body.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_request_is_in_init_state() {
        let request = HttpRequest::new();
        assert_eq!(request.method(), HttpMethod::Unknown);
        assert_eq!(request.version(), HttpVersion::Unknown);
        assert!(request.uri().is_empty());
        assert_eq!(request.num_headers(), 0);
        assert!(request.body_buffer().is_none());
        assert_eq!(request, HttpRequest::default());
    }

    #[test]
    fn free_returns_to_init_state() {
        let mut request = HttpRequest::from_bytes(b"POST /form HTTP/1.1\nHost: x\n\na=1").unwrap();
        assert_eq!(request.body(), b"a=1");

        request.free();
        assert_eq!(request, HttpRequest::new());
        assert_eq!(request.uri().capacity(), 0);
        assert_eq!(request.headers().capacity(), 0);
    }

    #[test]
    fn reuse_across_many_requests() {
        let mut request = HttpRequest::new();

        for i in 0..50 {
            let src = format!("GET /item/{i} HTTP/1.1\nX-Seq: {i}\n\n");
            request.parse(src.as_bytes()).unwrap();
            assert_eq!(request.uri().to_string(), format!("/item/{i}"));
            assert_eq!(request.num_headers(), 1);
            request.free();
        }

        assert_eq!(request, HttpRequest::new());
    }
}
