//! Canned responses.
//!
//! | method            | response                              |
//! |-------------------|---------------------------------------|
//! | `GET`             | 200 with a small HTML page            |
//! | `HEAD`            | 200, headers only                     |
//! | anything else     | 501 Not Implemented                   |
//!
//! In echo mode every request is answered with 200 and its own raw text.
//! All responses are HTTP/1.0 and carry `server: webserver`.

use std::convert::Infallible;

use async_trait::async_trait;
use bytes::Bytes;
use http::header::{CONTENT_TYPE, SERVER};
use http::{HeaderValue, Response, StatusCode, Version};
use ingest_http::handler::Handler;
use ingest_http::protocol::{HttpMethod, HttpRequest};

pub const HELLO_PAGE: &str = "<html><head></head><body><p>Hello World!</p></body></html>\n";
pub const SERVER_NAME: &str = "webserver";

#[derive(Debug, Clone, Copy, Default)]
pub struct CannedHandler {
    echo: bool,
}

impl CannedHandler {
    pub fn new(echo: bool) -> Self {
        Self { echo }
    }

    pub fn echo(&self) -> bool {
        self.echo
    }

    pub fn respond(&self, request: &HttpRequest, raw: Bytes) -> Response<Bytes> {
        if self.echo {
            return canned(StatusCode::OK, Some("text/plain"), raw);
        }

        match request.method() {
            HttpMethod::Get => canned(StatusCode::OK, Some("text/html"), Bytes::from_static(HELLO_PAGE.as_bytes())),
            HttpMethod::Head => canned(StatusCode::OK, None, Bytes::new()),
            HttpMethod::Post | HttpMethod::Put | HttpMethod::Delete | HttpMethod::Unknown => {
                canned(StatusCode::NOT_IMPLEMENTED, None, Bytes::new())
            }
        }
    }
}

#[async_trait]
impl Handler for CannedHandler {
    type Error = Infallible;

    async fn call(&self, req: HttpRequest, raw: Bytes) -> Result<Response<Bytes>, Self::Error> {
        Ok(self.respond(&req, raw))
    }
}

fn canned(status: StatusCode, content_type: Option<&'static str>, body: Bytes) -> Response<Bytes> {
    let mut response = Response::new(body);
    *response.status_mut() = status;
    *response.version_mut() = Version::HTTP_10;

    let headers = response.headers_mut();
    headers.insert(SERVER, HeaderValue::from_static(SERVER_NAME));
    if let Some(content_type) = content_type {
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
    }
    response
}
