use crate::domain::{Handler, ResponseWriter};
use async_trait::async_trait;
use axum::body::Bytes;
use axum::http::{header, HeaderValue, Request};

/// Landing page. Writes only a body, so the status is the implicit `200 OK`.
pub struct Root;

#[async_trait]
impl Handler for Root {
    async fn serve(&self, w: &mut dyn ResponseWriter, _req: &Request<Bytes>) {
        // ---
        let version = env!("CARGO_PKG_VERSION");
        let body = format!(
            r#"Request Duration demo 👋
Version: {version}

Available endpoints:
  - GET /                 - This page
  - GET /health           - Health check
  - GET /status/{{code}}    - Respond with the given status code
  - GET /sleep/{{millis}}   - Respond after sleeping (max {max_ms} ms)
  - GET /metrics          - Recorded request durations

Every endpoint except /metrics is measured into the request_duration_millis histogram.
"#,
            max_ms = super::MAX_SLEEP_MS,
        );

        w.headers_mut().insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("text/plain; charset=utf-8"),
        );
        if let Err(err) = w.write(body.as_bytes()) {
            tracing::error!("Failed to write root page: {err}");
        }
    }
}
