// Copyright 2026 The nsbridge Authors
// SPDX-License-Identifier: Apache-2.0

//! Health probe handlers.

use axum::http::StatusCode;
use axum::response::IntoResponse;

/// `GET /health/live` - Liveness probe.
///
/// Returns 200 OK if the server is running.
pub async fn health_live() -> impl IntoResponse {
    StatusCode::OK
}

/// `GET /health/ready` - Readiness probe.
///
/// Returns 200 OK once the router is serving. The metadata service is not
/// probed; its failures are reported per request.
pub async fn health_ready() -> impl IntoResponse {
    StatusCode::OK
}
