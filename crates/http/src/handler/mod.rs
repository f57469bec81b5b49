//! Request handlers.
//!
//! A [`Handler`] turns one parsed [`HttpRequest`] into a response. The raw bytes
//! the request was parsed from travel alongside it so handlers can echo or log
//! the request exactly as it was received.

use std::error::Error;
use std::future::Future;

use async_trait::async_trait;
use bytes::Bytes;
use http::Response;

use crate::protocol::HttpRequest;

#[async_trait]
pub trait Handler: Send + Sync {
    type Error: Into<Box<dyn Error + Send + Sync>>;

    async fn call(&self, req: HttpRequest, raw: Bytes) -> Result<Response<Bytes>, Self::Error>;
}

#[derive(Debug)]
pub struct HandlerFn<F> {
    f: F,
}

#[async_trait]
impl<Err, F, Fut> Handler for HandlerFn<F>
where
    F: Fn(HttpRequest, Bytes) -> Fut + Send + Sync,
    Err: Into<Box<dyn Error + Send + Sync>>,
    Fut: Future<Output = Result<Response<Bytes>, Err>> + Send,
{
    type Error = Err;

    async fn call(&self, req: HttpRequest, raw: Bytes) -> Result<Response<Bytes>, Self::Error> {
        (self.f)(req, raw).await
    }
}

pub fn make_handler<F, Err, Ret>(f: F) -> HandlerFn<F>
where
    Err: Into<Box<dyn Error + Send + Sync>>,
    Ret: Future<Output = Result<Response<Bytes>, Err>>,
    F: Fn(HttpRequest, Bytes) -> Ret,
{
    HandlerFn { f }
}
