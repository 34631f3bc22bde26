use crate::domain::{Handler, ResponseWriter};
use async_trait::async_trait;
use axum::body::Bytes;
use axum::http::{header, HeaderValue, Request, StatusCode};

#[derive(serde::Serialize)]
pub struct HealthResponse {
    status: &'static str,
}

/// Responds with the health status of the server.
///
/// # Responses
/// - `200 OK` with `{ "status": "ok" }` while the server is running.
pub struct Health;

#[async_trait]
impl Handler for Health {
    async fn serve(&self, w: &mut dyn ResponseWriter, _req: &Request<Bytes>) {
        // ---
        let body = match serde_json::to_vec(&HealthResponse { status: "ok" }) {
            Ok(body) => body,
            Err(err) => {
                tracing::error!("Failed to encode health response: {err}");
                w.write_header(StatusCode::INTERNAL_SERVER_ERROR);
                return;
            }
        };

        w.headers_mut().insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        w.write_header(StatusCode::OK);
        if let Err(err) = w.write(&body) {
            tracing::error!("Failed to write health response: {err}");
        }
    }
}
