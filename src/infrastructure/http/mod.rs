//! Bridge between [`Handler`](crate::domain::Handler) chains and axum.

mod handler_service;
mod response_buffer;

pub use handler_service::{HandlerService, DEFAULT_MAX_BODY_BYTES};
pub use response_buffer::ResponseBuffer;
