use crate::domain::{Handler, ResponseWriter};
use async_trait::async_trait;
use axum::body::Bytes;
use axum::http::{Request, StatusCode};

/// Handler for `GET /status/{code}`.
///
/// - Responds with `{code}` and its canonical reason phrase as the body.
/// - Statuses that forbid a body (`204`, `304`) are sent without one.
/// - Responds with `400 Bad Request` if `{code}` is not a valid final
///   status (informational `1xx` codes included).
pub struct Status;

#[async_trait]
impl Handler for Status {
    async fn serve(&self, w: &mut dyn ResponseWriter, req: &Request<Bytes>) {
        // ---
        let param = super::trailing_param(req);
        let status = match param.parse::<u16>().map(StatusCode::from_u16) {
            Ok(Ok(status)) if !status.is_informational() => status,
            _ => {
                tracing::debug!(param, "Rejecting invalid status code");
                w.write_header(StatusCode::BAD_REQUEST);
                return;
            }
        };

        w.write_header(status);
        if status == StatusCode::NO_CONTENT || status == StatusCode::NOT_MODIFIED {
            return;
        }

        let reason = status.canonical_reason().unwrap_or("Unknown");
        if let Err(err) = w.write(reason.as_bytes()) {
            tracing::error!("Failed to write status body: {err}");
        }
    }
}

/// Fallback for unknown routes: `404 Not Found` with an empty body.
pub struct NotFound;

#[async_trait]
impl Handler for NotFound {
    async fn serve(&self, w: &mut dyn ResponseWriter, _req: &Request<Bytes>) {
        w.write_header(StatusCode::NOT_FOUND);
    }
}
