//! Handler-chaining abstraction.
//!
//! A [`Handler`] produces its response by writing through a
//! [`ResponseWriter`]: headers first, then an optional explicit status, then
//! body bytes. The first body write implies `200 OK` when no status was set.
//! Middleware wrap one handler and return another, so chains compose freely.

use async_trait::async_trait;
use axum::body::Bytes;
use axum::http::{HeaderMap, Request, StatusCode};
use std::io;
use std::sync::Arc;

/// Sink for a single HTTP response.
pub trait ResponseWriter: Send {
    // ---
    /// Response headers, forwarded with the response when it is produced.
    fn headers_mut(&mut self) -> &mut HeaderMap;

    /// Send the response status. Only the first call takes effect.
    fn write_header(&mut self, status: StatusCode);

    /// Append body bytes, sending `200 OK` first if no status was sent.
    fn write(&mut self, buf: &[u8]) -> io::Result<usize>;
}

/// Request handler producing its response through a [`ResponseWriter`].
#[async_trait]
pub trait Handler: Send + Sync + 'static {
    async fn serve(&self, w: &mut dyn ResponseWriter, req: &Request<Bytes>);
}

#[async_trait]
impl<H: Handler + ?Sized> Handler for Arc<H> {
    async fn serve(&self, w: &mut dyn ResponseWriter, req: &Request<Bytes>) {
        (**self).serve(w, req).await
    }
}

#[async_trait]
impl<H: Handler + ?Sized> Handler for Box<H> {
    async fn serve(&self, w: &mut dyn ResponseWriter, req: &Request<Bytes>) {
        (**self).serve(w, req).await
    }
}
