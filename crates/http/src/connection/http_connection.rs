use std::error::Error;
use std::fmt;
use std::sync::Arc;

use bytes::Bytes;
use futures::SinkExt;
use http::{Response, StatusCode, Version};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio_util::codec::FramedWrite;
use tracing::{debug, error, info, warn};

use crate::codec::{RequestParser, ResponseEncoder};
use crate::connection::SocketReceiver;
use crate::handler::Handler;
use crate::protocol::{HttpError, HttpRequest};

/// One request/response exchange over a connected stream.
///
/// The connection reads a single request with [`SocketReceiver`], parses it,
/// hands it to a [`Handler`] and writes the response. There is no keep-alive:
/// once `process` returns, the connection is done and both halves are dropped.
///
/// # Type Parameters
///
/// * `R`: The async readable stream type
/// * `W`: The async writable stream type
pub struct HttpConnection<R, W> {
    receiver: SocketReceiver<R>,
    framed_write: FramedWrite<W, ResponseEncoder>,
    parser: RequestParser,
}

impl<R, W> HttpConnection<R, W>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    pub fn new(reader: R, writer: W) -> Self {
        Self::with_capacity(super::DEFAULT_RECV_CAPACITY, reader, writer)
    }

    /// `capacity` is the initial receive buffer size.
    pub fn with_capacity(capacity: usize, reader: R, writer: W) -> Self {
        Self {
            receiver: SocketReceiver::with_capacity(capacity, reader),
            framed_write: FramedWrite::new(writer, ResponseEncoder::new()),
            parser: RequestParser::new(),
        }
    }

    /// Runs the exchange to completion.
    ///
    /// An empty receive means the peer went away without sending a request;
    /// nothing is written back. A request that fails to parse is answered with
    /// `400 Bad Request` and the parse error is returned.
    pub async fn process<H>(mut self, handler: Arc<H>) -> Result<(), HttpError>
    where
        H: Handler,
    {
        let buffer = self.receiver.receive().await?;
        if buffer.is_empty() {
            info!("got no data, closing connection");
            return Ok(());
        }
        debug!(size = buffer.size(), request = %buffer, "received request");

        let mut request = HttpRequest::new();
        if let Err(e) = self.parser.parse(&buffer, &mut request) {
            warn!(cause = %e, "can't parse request");
            self.do_send_response(build_error_response(StatusCode::BAD_REQUEST)).await?;
            return Err(e.into());
        }

        info!(method = %request.method(), uri = %request.uri(), version = %request.version(), "request");

        let raw = Bytes::copy_from_slice(&buffer);
        let response = match handler.call(request, raw).await {
            Ok(response) => response,
            Err(e) => {
                let cause: Box<dyn Error + Send + Sync> = e.into();
                error!(cause = %cause, "handle request error");
                build_error_response(StatusCode::INTERNAL_SERVER_ERROR)
            }
        };

        self.do_send_response(response).await
    }

    async fn do_send_response(&mut self, response: Response<Bytes>) -> Result<(), HttpError> {
        // send flushes the underlying io, there is nothing more to write afterwards
        self.framed_write.send(response).await?;
        Ok(())
    }
}

impl<R, W> fmt::Debug for HttpConnection<R, W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpConnection")
            .field("recv_capacity", &self.receiver.initial_capacity())
            .finish_non_exhaustive()
    }
}

fn build_error_response(status_code: StatusCode) -> Response<Bytes> {
    let mut response = Response::new(Bytes::new());
    *response.status_mut() = status_code;
    *response.version_mut() = Version::HTTP_10;
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::make_handler;
    use crate::protocol::{HttpMethod, ParseError};
    use indoc::indoc;
    use std::convert::Infallible;
    use tokio::io::AsyncReadExt;

    fn hello_handler() -> impl Handler {
        make_handler(|req: HttpRequest, _raw: Bytes| async move {
            let body = format!("{} {}", req.method(), req.uri());
            let mut response = Response::new(Bytes::from(body));
            *response.version_mut() = Version::HTTP_10;
            Ok::<_, Infallible>(response)
        })
    }

    async fn exchange<H: Handler>(request: &[u8], handler: H) -> (Result<(), HttpError>, String) {
        let (mut client, server) = tokio::io::duplex(4096);
        tokio::io::AsyncWriteExt::write_all(&mut client, request).await.unwrap();

        let (reader, writer) = tokio::io::split(server);
        let result = HttpConnection::new(reader, writer).process(Arc::new(handler)).await;

        let mut written = Vec::new();
        client.read_to_end(&mut written).await.unwrap();
        (result, String::from_utf8(written).unwrap())
    }

    #[test]
    fn debug_shows_receive_capacity() {
        let (_client, server) = tokio::io::duplex(64);
        let (reader, writer) = tokio::io::split(server);
        let connection = HttpConnection::with_capacity(64, reader, writer);
        assert_eq!(format!("{connection:?}"), "HttpConnection { recv_capacity: 64, .. }");
    }

    #[tokio::test]
    async fn request_is_handled_and_answered() {
        let request = indoc! {"
            GET /index.html HTTP/1.1
            Host: example.com

        "};

        let (result, written) = exchange(request.as_bytes(), hello_handler()).await;
        result.unwrap();
        assert_eq!(written, "HTTP/1.0 200 OK\r\ncontent-length: 15\r\n\r\nGET /index.html");
    }

    #[tokio::test]
    async fn malformed_request_gets_bad_request() {
        let (result, written) = exchange(b"GET /\n", hello_handler()).await;

        assert!(matches!(result, Err(HttpError::RequestError { source: ParseError::InvalidRequestLine { .. } })));
        assert_eq!(written, "HTTP/1.0 400 Bad Request\r\n\r\n");
    }

    #[tokio::test]
    async fn handler_error_becomes_internal_server_error() {
        let failing = make_handler(|req: HttpRequest, _raw: Bytes| async move {
            assert_eq!(req.method(), HttpMethod::Delete);
            Err::<Response<Bytes>, _>("boom")
        });

        let (result, written) = exchange(b"DELETE /x HTTP/1.0\r\n\r\n", failing).await;
        result.unwrap();
        assert_eq!(written, "HTTP/1.0 500 Internal Server Error\r\n\r\n");
    }
}
