use super::ResponseBuffer;
use crate::domain::Handler;
use axum::body::{to_bytes, Body};
use axum::http::Request;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use futures::future::BoxFuture;
use std::convert::Infallible;
use std::sync::Arc;
use std::task::{Context, Poll};
use tower::Service;

/// Default limit on buffered request bodies (2 MiB).
pub const DEFAULT_MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

/// Serves a [`Handler`] as a tower service.
///
/// The request body is collected up to `max_body_bytes` (larger bodies get
/// `413 Payload Too Large` without reaching the handler), the handler
/// writes into a [`ResponseBuffer`], and the buffer becomes the response.
/// Mount it with `Router::route_service`.
pub struct HandlerService<H: ?Sized> {
    handler: Arc<H>,
    max_body_bytes: usize,
}

impl<H: Handler> HandlerService<H> {
    // ---
    pub fn new(handler: H) -> Self {
        Self::from_arc(Arc::new(handler))
    }
}

impl<H: Handler + ?Sized> HandlerService<H> {
    // ---
    pub fn from_arc(handler: Arc<H>) -> Self {
        HandlerService {
            handler,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }

    pub fn max_body_bytes(mut self, limit: usize) -> Self {
        self.max_body_bytes = limit;
        self
    }
}

impl<H: ?Sized> Clone for HandlerService<H> {
    fn clone(&self) -> Self {
        HandlerService {
            handler: Arc::clone(&self.handler),
            max_body_bytes: self.max_body_bytes,
        }
    }
}

impl<H: Handler + ?Sized> Service<Request<Body>> for HandlerService<H> {
    type Response = Response;
    type Error = Infallible;
    type Future = BoxFuture<'static, Result<Response, Infallible>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        // ---
        let handler = Arc::clone(&self.handler);
        let limit = self.max_body_bytes;

        Box::pin(async move {
            let (parts, body) = req.into_parts();
            let bytes = match to_bytes(body, limit).await {
                Ok(bytes) => bytes,
                Err(err) => {
                    tracing::debug!("Rejecting request body: {err}");
                    return Ok(StatusCode::PAYLOAD_TOO_LARGE.into_response());
                }
            };

            let req = Request::from_parts(parts, bytes);
            let mut buffer = ResponseBuffer::new();
            handler.serve(&mut buffer, &req).await;

            Ok(buffer.into_response())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ResponseWriter;
    use async_trait::async_trait;
    use axum::body::Bytes;
    use tower::ServiceExt;

    struct Echo;

    #[async_trait]
    impl Handler for Echo {
        async fn serve(&self, w: &mut dyn ResponseWriter, req: &Request<Bytes>) {
            w.write_header(StatusCode::ACCEPTED);
            w.write(req.body()).unwrap();
        }
    }

    #[tokio::test]
    async fn handler_output_becomes_response() {
        let response = HandlerService::new(Echo)
            .oneshot(Request::new(Body::from("ping")))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::ACCEPTED);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"ping");
    }

    #[tokio::test]
    async fn oversized_body_is_rejected() {
        let response = HandlerService::new(Echo)
            .max_body_bytes(2)
            .oneshot(Request::new(Body::from("too long")))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }
}
