//! HTTP/1.x request parser
//!
//! Turns a buffer believed to hold one complete request into an
//! [`HttpRequest`]. Parsing is a three-state machine over the input lines:
//!
//! 1. **Request line**: exactly three whitespace-separated tokens, method, URI
//!    and version. Method and version must be known.
//! 2. **Headers**: every line up to the first blank one is split on its first
//!    `:`; key and value are trimmed. A line without `:` fails the parse, and
//!    the entry appended for it is popped first. Running out of input before
//!    the blank line also fails.
//! 3. **Body**: the bytes after the blank line, copied verbatim.
//!
//! Both `\n` and `\r\n` line endings are accepted.
//!
//! # Limits
//!
//! - `Content-Length` is not checked against the body
//! - chunked transfer encoding is not decoded
//! - one request per buffer, no pipelining
//!
//! # Example
//!
//! ```
//! use ingest_http::codec::RequestParser;
//! use ingest_http::protocol::{HttpMethod, HttpRequest};
//!
//! let mut request = HttpRequest::new();
//! RequestParser::new().parse(b"GET / HTTP/1.1\r\nHost: localhost\r\n\r\n", &mut request).unwrap();
//! assert_eq!(request.method(), HttpMethod::Get);
//! assert_eq!(request.num_headers(), 1);
//! ```

use tracing::{debug, trace};

use crate::buffer::GrowableBuffer;
use crate::codec::lines::{Line, Lines};
use crate::ensure;
use crate::protocol::{Header, HeaderTable, HttpMethod, HttpRequest, HttpVersion, ParseError};
use crate::utils::is_space;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    RequestLine,
    Headers,
    Body,
}

/// Stateless parser; every call starts from a clean request.
#[derive(Debug, Default, Clone, Copy)]
pub struct RequestParser;

impl RequestParser {
    pub fn new() -> Self {
        Self
    }

    /// Parses `src` into `request`.
    ///
    /// Whatever `request` held before is freed first. On error `request` is
    /// left in its init state, so a failed parse never exposes partial data.
    ///
    /// # Errors
    ///
    /// - [`ParseError::EmptyRequest`] for empty input
    /// - [`ParseError::InvalidRequestLine`], [`ParseError::UnknownMethod`] or
    ///   [`ParseError::UnknownVersion`] for a bad first line
    /// - [`ParseError::MissingColon`] for a header line without `:`
    /// - [`ParseError::UnterminatedHeaders`] when the blank line never comes
    /// - [`ParseError::Buffer`] when a field cannot be allocated
    pub fn parse(&self, src: &[u8], request: &mut HttpRequest) -> Result<(), ParseError> {
        request.free();

        let result = parse_into(src, request);
        match &result {
            Ok(()) => trace!(
                method = %request.method(),
                uri = %request.uri(),
                version = %request.version(),
                headers = request.num_headers(),
                "parsed request"
            ),
            Err(e) => {
                debug!(cause = %e, "failed to parse request");
                request.free();
            }
        }

        result
    }
}

fn parse_into(src: &[u8], request: &mut HttpRequest) -> Result<(), ParseError> {
    ensure!(!src.is_empty(), ParseError::EmptyRequest);

    let mut lines = Lines::new(src);
    let mut state = State::RequestLine;

    loop {
        state = match state {
            State::RequestLine => {
                let line = lines.next().ok_or(ParseError::EmptyRequest)?;
                parse_request_line(line, request)?;
                State::Headers
            }

            State::Headers => match lines.next() {
                None => return Err(ParseError::unterminated_headers(lines.consumed() + 1)),
                Some(line) if line.is_blank() => State::Body,
                Some(line) => {
                    parse_header_line(line, &mut request.headers)?;
                    State::Headers
                }
            },

            State::Body => {
                let body = lines.remainder();
                trace!(body_size = body.len(), "parsed body size");
                request.body = Some(GrowableBuffer::from_bytes(body)?);
                return Ok(());
            }
        };
    }
}

fn parse_request_line(line: Line<'_>, request: &mut HttpRequest) -> Result<(), ParseError> {
    let mut tokens = line.bytes.split(|b| is_space(*b)).filter(|token| !token.is_empty());

    let (Some(method), Some(uri), Some(version)) = (tokens.next(), tokens.next(), tokens.next()) else {
        return Err(ParseError::invalid_request_line(line.number, "expected method, uri and version"));
    };
    ensure!(tokens.next().is_none(), ParseError::invalid_request_line(line.number, "unexpected token after version"));

    let method_value = HttpMethod::from_token(method);
    ensure!(method_value.is_known(), ParseError::unknown_method(method));

    let version_value = HttpVersion::from_token(version);
    ensure!(version_value.is_known(), ParseError::unknown_version(version));

    request.method = method_value;
    request.version = version_value;
    request.uri.set(uri)?;
    Ok(())
}

/// Appends an entry for `line`; on failure the entry is popped again.
fn parse_header_line(line: Line<'_>, headers: &mut HeaderTable) -> Result<(), ParseError> {
    let entry = headers.push_empty()?;

    if let Err(e) = fill_header(entry, line) {
        headers.pop();
        return Err(e);
    }

    Ok(())
}

fn fill_header(entry: &mut Header, line: Line<'_>) -> Result<(), ParseError> {
    let colon = line
        .bytes
        .iter()
        .position(|b| *b == b':')
        .ok_or(ParseError::missing_colon(line.number))?;

    entry.set_key(&line.bytes[..colon])?;
    entry.set_value(&line.bytes[colon + 1..])?;
    Ok(())
}
