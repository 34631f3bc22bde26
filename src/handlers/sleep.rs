use crate::domain::{Handler, ResponseWriter};
use async_trait::async_trait;
use axum::body::Bytes;
use axum::http::{Request, StatusCode};
use std::time::Duration;

/// Upper bound on `/sleep/{millis}`.
pub const MAX_SLEEP_MS: u64 = 10_000;

/// Handler for `GET /sleep/{millis}`: waits, then answers `200 OK`.
///
/// Responds with `400 Bad Request` when `{millis}` is not a number or is
/// above [`MAX_SLEEP_MS`].
pub struct Sleep;

#[async_trait]
impl Handler for Sleep {
    async fn serve(&self, w: &mut dyn ResponseWriter, req: &Request<Bytes>) {
        // ---
        let millis = match super::trailing_param(req).parse::<u64>() {
            Ok(millis) if millis <= MAX_SLEEP_MS => millis,
            _ => {
                w.write_header(StatusCode::BAD_REQUEST);
                return;
            }
        };

        tokio::time::sleep(Duration::from_millis(millis)).await;

        w.write_header(StatusCode::OK);
        if let Err(err) = w.write(format!("slept {millis} ms").as_bytes()) {
            tracing::error!("Failed to write sleep body: {err}");
        }
    }
}
