// Copyright 2026 The nsbridge Authors
// SPDX-License-Identifier: Apache-2.0

//! Error types for nsbridge with stable error codes.

use thiserror::Error;

/// A specialized `Result` type for nsbridge operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error codes reported in non-document error responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// The caller is not allowed to use the endpoint.
    AccessDenied,
    /// A request argument could not be understood.
    InvalidArgument,
    /// No route matches the request.
    NotFound,
    /// Internal server error.
    InternalError,
}

impl ErrorCode {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn http_status(&self) -> u16 {
        match self {
            Self::AccessDenied => 403,
            Self::InvalidArgument => 400,
            Self::NotFound => 404,
            Self::InternalError => 500,
        }
    }

    /// Returns the HTTP status code as an `http::StatusCode`.
    #[must_use]
    pub fn status_code(&self) -> http::StatusCode {
        http::StatusCode::from_u16(self.http_status())
            .unwrap_or(http::StatusCode::INTERNAL_SERVER_ERROR)
    }

    /// Returns the error code string.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::AccessDenied => "AccessDenied",
            Self::InvalidArgument => "InvalidArgument",
            Self::NotFound => "NotFound",
            Self::InternalError => "InternalError",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Errors that can occur in nsbridge outside of the metadata call itself.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The caller identity could not be resolved.
    #[error("invalid identity: {0}")]
    InvalidIdentity(String),

    /// Identity is required but the request did not carry one.
    #[error("missing identity: {0}")]
    MissingIdentity(String),

    /// A content summary violates its field invariants.
    #[error("invalid content summary: {0}")]
    InvalidSummary(String),
}

impl Error {
    /// Returns the error code reported to HTTP callers.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::InvalidIdentity(_) | Self::InvalidSummary(_) => ErrorCode::InvalidArgument,
            Self::MissingIdentity(_) => ErrorCode::AccessDenied,
            Self::Config(_) | Self::Io(_) => ErrorCode::InternalError,
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn http_status(&self) -> u16 {
        self.code().http_status()
    }
}
