use crate::domain::ResponseWriter;
use axum::body::Body;
use axum::http::{HeaderMap, StatusCode};
use axum::response::Response;
use std::io;

/// In-memory [`ResponseWriter`] turned into an axum [`Response`] once the
/// handler is done.
///
/// Follows the usual writer rules: the first status sent wins, a body write
/// without a prior status sends `200 OK`, and a handler that writes nothing
/// at all also ends up as `200 OK` with an empty body.
#[derive(Debug, Default)]
pub struct ResponseBuffer {
    status: Option<StatusCode>,
    headers: HeaderMap,
    body: Vec<u8>,
}

impl ResponseBuffer {
    // ---
    pub fn new() -> Self {
        Self::default()
    }

    /// Status sent so far, `None` if the handler sent none.
    pub fn status(&self) -> Option<StatusCode> {
        self.status
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    pub fn into_response(self) -> Response {
        // ---
        let mut response = Response::new(Body::from(self.body));
        *response.status_mut() = self.status.unwrap_or(StatusCode::OK);
        *response.headers_mut() = self.headers;
        response
    }
}

impl ResponseWriter for ResponseBuffer {
    // ---
    fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    fn write_header(&mut self, status: StatusCode) {
        // ---
        match self.status {
            Some(sent) => {
                tracing::warn!(%sent, ignored = %status, "superfluous write_header call");
            }
            None => self.status = Some(status),
        }
    }

    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        // ---
        if self.status.is_none() {
            self.status = Some(StatusCode::OK);
        }
        self.body.extend_from_slice(buf);
        Ok(buf.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_status_is_kept() {
        let mut buffer = ResponseBuffer::new();
        buffer.write_header(StatusCode::CREATED);
        buffer.write_header(StatusCode::BAD_REQUEST);

        assert_eq!(buffer.into_response().status(), StatusCode::CREATED);
    }

    #[test]
    fn empty_response_defaults_to_ok() {
        let buffer = ResponseBuffer::new();
        assert_eq!(buffer.status(), None);
        assert_eq!(buffer.into_response().status(), StatusCode::OK);
    }

    #[test]
    fn headers_survive_conversion() {
        let mut buffer = ResponseBuffer::new();
        buffer
            .headers_mut()
            .insert("content-type", "text/plain".parse().unwrap());
        buffer.write(b"hi").unwrap();

        let response = buffer.into_response();
        assert_eq!(response.headers()["content-type"], "text/plain");
    }

    #[test]
    fn headers_set_after_status_are_sent() {
        let mut buffer = ResponseBuffer::new();
        buffer.write_header(StatusCode::ACCEPTED);
        buffer.write(b"queued").unwrap();
        buffer
            .headers_mut()
            .insert("x-request-id", "42".parse().unwrap());

        let response = buffer.into_response();
        assert_eq!(response.status(), StatusCode::ACCEPTED);
        assert_eq!(response.headers()["x-request-id"], "42");
    }
}
