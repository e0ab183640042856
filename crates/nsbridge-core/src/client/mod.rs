// Copyright 2026 The nsbridge Authors
// SPDX-License-Identifier: Apache-2.0

//! Clients for the remote metadata service.
//!
//! The bridge only ever issues one call per request, so the seam is small:
//! a [`ClientFactory`] binds a [`MetadataClient`] to the caller's identity,
//! and the client answers [`MetadataClient::get_content_summary`].

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::types::{ContentSummary, Identity};

pub mod memory;
pub mod webhdfs;

pub use memory::MemoryNamespace;
pub use webhdfs::{WebHdfsClient, WebHdfsClientFactory};

/// Failures raised by the metadata service or the path to it.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The service rejected the call with an exception of its own.
    #[error("{exception}: {message}")]
    Remote {
        /// Classification reported by the service.
        exception: String,
        /// Human-readable message.
        message: String,
    },

    /// The path cannot be addressed by this client.
    #[error("Invalid file name: {0}")]
    InvalidPath(String),

    /// The request never produced a response.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The response could not be understood.
    #[error("protocol error: {0}")]
    Protocol(String),
}

impl ClientError {
    /// Creates a remote exception error.
    #[must_use]
    pub fn remote(exception: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Remote { exception: exception.into(), message: message.into() }
    }

    /// Classification string used in fault envelopes.
    #[must_use]
    pub fn category(&self) -> &str {
        match self {
            Self::Remote { exception, .. } => exception,
            Self::InvalidPath(_) => "InvalidPathException",
            Self::Transport(_) => "TransportException",
            Self::Protocol(_) => "ProtocolException",
        }
    }

    /// Message without the classification prefix.
    #[must_use]
    pub fn message(&self) -> String {
        match self {
            Self::Remote { message, .. } => message.clone(),
            Self::InvalidPath(path) => format!("Invalid file name: {path}"),
            Self::Transport(e) => e.to_string(),
            Self::Protocol(msg) => msg.clone(),
        }
    }
}

/// Fault descriptor rendered into the response document.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{category}: {message}")]
pub struct RemoteFailure {
    /// Origin failure classification.
    pub category: String,
    /// Human-readable message.
    pub message: String,
}

impl RemoteFailure {
    /// Creates a new failure descriptor.
    #[must_use]
    pub fn new(category: impl Into<String>, message: impl Into<String>) -> Self {
        Self { category: category.into(), message: message.into() }
    }

    /// Single-line message for the fault envelope.
    ///
    /// Keeps the first line, drops a leading `"<category>:"` prefix and never
    /// returns an empty string.
    #[must_use]
    pub fn summary_message(&self) -> String {
        let first_line = self.message.lines().next().unwrap_or_default();
        let unprefixed = first_line
            .strip_prefix(self.category.as_str())
            .and_then(|rest| rest.strip_prefix(':'))
            .unwrap_or(first_line)
            .trim();
        if unprefixed.is_empty() {
            self.category.clone()
        } else {
            unprefixed.to_string()
        }
    }
}

impl From<&ClientError> for RemoteFailure {
    fn from(err: &ClientError) -> Self {
        Self::new(err.category(), err.message())
    }
}

impl From<ClientError> for RemoteFailure {
    fn from(err: ClientError) -> Self {
        Self::from(&err)
    }
}

/// A connection to the metadata service bound to one caller identity.
#[async_trait]
pub trait MetadataClient: Send + Sync {
    /// Returns the aggregate summary of the subtree at `path`.
    ///
    /// `Ok(None)` means the service had nothing to report for the path.
    async fn get_content_summary(&self, path: &str)
        -> Result<Option<ContentSummary>, ClientError>;
}

/// Creates metadata clients bound to a caller identity.
pub trait ClientFactory: Send + Sync {
    /// Returns a client that acts on behalf of `identity`.
    ///
    /// # Errors
    ///
    /// Returns an error if no client can be created for the identity.
    fn connect(&self, identity: &Identity) -> Result<Arc<dyn MetadataClient>, ClientError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_from_remote_error() {
        let err = ClientError::remote("AccessControlException", "Permission denied: user=bob");
        let failure = RemoteFailure::from(&err);
        assert_eq!(failure.category, "AccessControlException");
        assert_eq!(failure.summary_message(), "Permission denied: user=bob");
    }

    #[test]
    fn test_failure_from_invalid_path() {
        let failure = RemoteFailure::from(ClientError::InvalidPath("non-relative".into()));
        assert_eq!(failure.category, "InvalidPathException");
        assert_eq!(failure.summary_message(), "Invalid file name: non-relative");
    }

    #[test]
    fn test_summary_message_keeps_first_line_only() {
        let failure = RemoteFailure::new("IOException", "IOException: disk gone\n\tat frame");
        assert_eq!(failure.summary_message(), "disk gone");
    }

    #[test]
    fn test_summary_message_keeps_inner_colons() {
        let failure = RemoteFailure::new("IOException", "Invalid file name: a:b");
        assert_eq!(failure.summary_message(), "Invalid file name: a:b");
    }

    #[test]
    fn test_summary_message_never_empty() {
        let failure = RemoteFailure::new("SafeModeException", "");
        assert_eq!(failure.summary_message(), "SafeModeException");
    }
}
