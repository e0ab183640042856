//! API error types and XML error response formatting.
//!
//! Only failures that happen before the summary document starts streaming
//! use this path. Failures of the metadata call itself are reported inside
//! the document.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use nsbridge_core::error::{Error as CoreError, ErrorCode};

use crate::xml::escape_text;

/// API-level error that can be converted to an HTTP response.
#[derive(Debug)]
pub struct ApiError {
    /// Error code.
    pub code: ErrorCode,
    /// Human-readable message.
    pub message: String,
    /// Resource that caused the error (request path).
    pub resource: Option<String>,
}

impl ApiError {
    /// Create a new API error.
    #[must_use]
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self { code, message: message.into(), resource: None }
    }

    /// Add resource information to the error.
    #[must_use]
    pub fn with_resource(mut self, resource: impl Into<String>) -> Self {
        self.resource = Some(resource.into());
        self
    }

    /// Get the HTTP status code for this error.
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        self.code.status_code()
    }

    /// Convert to XML error response body.
    #[must_use]
    pub fn to_xml(&self) -> String {
        let resource = self
            .resource
            .as_deref()
            .map_or(String::new(), |r| format!("<Resource>{}</Resource>", escape_text(r)));

        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<Error><Code>{}</Code><Message>{}</Message>{resource}</Error>
"#,
            self.code.as_str(),
            escape_text(&self.message),
        )
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = self.to_xml();

        (status, [("Content-Type", "application/xml; charset=utf-8")], body).into_response()
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        ApiError::new(err.code(), err.to_string())
    }
}
