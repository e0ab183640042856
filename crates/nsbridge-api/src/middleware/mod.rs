//! Axum middleware for metrics and request logging.

use std::time::Instant;

use axum::extract::Request;
use axum::middleware::Next;
use axum::response::Response;
use http::HeaderValue;
use tracing::{info_span, Instrument};
use uuid::Uuid;

use crate::metrics::record_request;

/// Response header carrying the request ID.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Metrics and logging middleware.
///
/// This middleware:
/// - Generates a unique request ID and returns it in `x-request-id`
/// - Creates a tracing span for the request
/// - Records request metrics after the handler returns
pub async fn request_layer(request: Request, next: Next) -> Response {
    let start = Instant::now();
    let request_id = Uuid::new_v4().to_string();

    let span = info_span!(
        "http_request",
        request_id = %request_id,
        method = %request.method(),
        path = %request.uri().path(),
    );

    let mut response = next.run(request).instrument(span).await;

    // Streamed bodies keep flowing after this point; the duration covers
    // the time to response headers only.
    record_request(response.status().as_u16(), start.elapsed());

    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }

    response
}
