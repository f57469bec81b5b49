use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HttpError {
    #[error("request error: {source}")]
    RequestError {
        #[from]
        source: ParseError,
    },

    #[error("transport error: {source}")]
    TransportError {
        #[from]
        source: TransportError,
    },

    #[error("response error: {source}")]
    ResponseError {
        #[from]
        source: SendError,
    },
}

/// Failure to grow a [`GrowableBuffer`](crate::buffer::GrowableBuffer).
///
/// Growth goes through `try_reserve_exact`, so running out of memory is
/// reported here instead of aborting the process.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferError {
    #[error("failed to allocate buffer capacity of {requested} bytes")]
    AllocationFailed { requested: usize },
}

impl BufferError {
    pub fn allocation_failed(requested: usize) -> Self {
        Self::AllocationFailed { requested }
    }
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ParseError {
    #[error("empty request")]
    EmptyRequest,

    #[error("invalid request line (line {line}): {reason}")]
    InvalidRequestLine { line: usize, reason: String },

    #[error("unknown http method: {0:?}")]
    UnknownMethod(String),

    #[error("unknown http version: {0:?}")]
    UnknownVersion(String),

    #[error("invalid header (line {line}): missing ':' separator")]
    MissingColon { line: usize },

    #[error("unexpected end of input at line {line} before the end of headers")]
    UnterminatedHeaders { line: usize },

    #[error("buffer error: {source}")]
    Buffer {
        #[from]
        source: BufferError,
    },
}

impl ParseError {
    pub fn invalid_request_line<S: ToString>(line: usize, reason: S) -> Self {
        Self::InvalidRequestLine { line, reason: reason.to_string() }
    }

    pub fn unknown_method(token: &[u8]) -> Self {
        Self::UnknownMethod(String::from_utf8_lossy(token).into_owned())
    }

    pub fn unknown_version(token: &[u8]) -> Self {
        Self::UnknownVersion(String::from_utf8_lossy(token).into_owned())
    }

    pub fn missing_colon(line: usize) -> Self {
        Self::MissingColon { line }
    }

    pub fn unterminated_headers(line: usize) -> Self {
        Self::UnterminatedHeaders { line }
    }

    /// The 1-based input line the error points at, if it points at one.
    pub fn line(&self) -> Option<usize> {
        match self {
            Self::InvalidRequestLine { line, .. } | Self::MissingColon { line } | Self::UnterminatedHeaders { line } => Some(*line),
            Self::UnknownMethod(_) | Self::UnknownVersion(_) => Some(1),
            Self::EmptyRequest | Self::Buffer { .. } => None,
        }
    }
}

#[derive(Error, Debug)]
pub enum TransportError {
    #[error("socket io error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },

    #[error("buffer error: {source}")]
    Buffer {
        #[from]
        source: BufferError,
    },
}

impl TransportError {
    pub fn io<E: Into<io::Error>>(e: E) -> Self {
        Self::Io { source: e.into() }
    }

    /// The operating system error code of the failed syscall, when there is one.
    pub fn os_code(&self) -> Option<i32> {
        match self {
            Self::Io { source } => source.raw_os_error(),
            Self::Buffer { .. } => None,
        }
    }
}

#[derive(Error, Debug)]
pub enum SendError {
    #[error("unsupported http version {0:?} for a response")]
    UnsupportedVersion(http::Version),

    #[error("io error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },
}

impl SendError {
    pub fn io<E: Into<io::Error>>(e: E) -> Self {
        Self::Io { source: e.into() }
    }
}
