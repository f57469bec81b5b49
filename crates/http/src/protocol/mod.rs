//! Core HTTP protocol types.
//!
//! - **Request**: [`HttpRequest`], the parsed method, URI,
//!   version, headers and body
//! - **Headers**: [`Header`] and the ordered [`HeaderTable`]
//! - **Enums**: [`HttpMethod`] and [`HttpVersion`] with their wire tokens
//! - **Errors**: [`BufferError`], [`ParseError`], [`TransportError`],
//!   [`SendError`] and the umbrella [`HttpError`]

mod error;
pub use error::BufferError;
pub use error::HttpError;
pub use error::ParseError;
pub use error::SendError;
pub use error::TransportError;

mod header;
pub use header::Header;
pub use header::HeaderTable;
pub use header::INITIAL_HEADER_CAPACITY;

mod method;
pub use method::HttpMethod;

mod version;
pub use version::HttpVersion;

mod request;
pub use request::HttpRequest;
