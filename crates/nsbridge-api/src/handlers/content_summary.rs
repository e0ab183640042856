// Copyright 2026 The nsbridge Authors
// SPDX-License-Identifier: Apache-2.0

//! Content summary handler.
//!
//! `GET /contentSummary/{path}` answers with a streamed XML document:
//!
//! ```text
//! <?xml version="1.0" encoding="UTF-8"?>
//! <ContentSummary length="0" fileCount="0" directoryCount="1" quota="-1"
//!     spaceConsumed="0" spaceQuota="-1"/>
//! ```
//!
//! An absent result yields `<ContentSummary/>`; a failed metadata call
//! yields the root with a nested fault envelope. All three answer `200 OK`.

use std::sync::Arc;
use std::time::Instant;

use axum::body::Body;
use axum::extract::rejection::PathRejection;
use axum::extract::{Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::Response;
use nsbridge_core::error::ErrorCode;
use nsbridge_core::{ClientError, ClientFactory, ContentSummary, Identity, RemoteFailure};
use serde::Deserialize;
use tokio::io::AsyncWrite;
use tokio_util::io::ReaderStream;
use tracing::{debug, warn, Instrument, Span};

use crate::error::ApiError;
use crate::identity::IdentityResolver;
use crate::metrics::{record_remote_call, record_summary, SummaryOutcome};
use crate::xml::{write_remote_failure, XmlError, XmlWriter, CONTENT_SUMMARY_TAG};

/// Capacity of the pipe between the document writer and the response body.
const STREAM_BUFFER_SIZE: usize = 8 * 1024;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Creates metadata clients bound to a caller identity.
    pub clients: Arc<dyn ClientFactory>,
    /// Resolves the caller identity of a request.
    pub identity: IdentityResolver,
}

impl AppState {
    /// Creates the shared state.
    #[must_use]
    pub fn new(clients: Arc<dyn ClientFactory>, identity: IdentityResolver) -> Self {
        Self { clients, identity }
    }
}

/// Query parameters of the content summary endpoint.
#[derive(Debug, Deserialize, Default)]
pub struct SummaryQuery {
    /// Caller identity as `user,group,...`.
    pub ugi: Option<String>,
}

/// `GET /contentSummary/{*path}` - Summary of the subtree at `/{path}`.
///
/// A path that does not decode to UTF-8 is answered with `InvalidArgument`.
pub async fn get_content_summary(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
    Query(query): Query<SummaryQuery>,
) -> Result<Response, ApiError> {
    let Path(path) =
        path.map_err(|e| ApiError::new(ErrorCode::InvalidArgument, e.body_text()))?;
    stream_content_summary(state, format!("/{path}"), query).await
}

/// `GET /contentSummary` - Summary of the whole namespace.
pub async fn get_root_content_summary(
    State(state): State<AppState>,
    Query(query): Query<SummaryQuery>,
) -> Result<Response, ApiError> {
    stream_content_summary(state, "/".to_string(), query).await
}

async fn stream_content_summary(
    state: AppState,
    path: String,
    query: SummaryQuery,
) -> Result<Response, ApiError> {
    let identity = state
        .identity
        .resolve(query.ugi.as_deref())
        .map_err(|e| ApiError::from(e).with_resource(path.as_str()))?;

    let (writer, reader) = tokio::io::duplex(STREAM_BUFFER_SIZE);
    let clients = Arc::clone(&state.clients);

    tokio::spawn(
        async move {
            let mut xml = XmlWriter::new(writer);
            if let Err(e) =
                write_content_summary(&mut xml, &path, clients.as_ref(), &identity).await
            {
                debug!(path = %path, error = %e, "Content summary stream aborted");
            }
        }
        .instrument(Span::current()),
    );

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "application/xml; charset=utf-8")
        .body(Body::from_stream(ReaderStream::new(reader)))
        .map_err(|e| ApiError::new(ErrorCode::InternalError, e.to_string()))
}

/// Writes the complete content summary document for `path` to `xml`.
///
/// Issues exactly one metadata call. Whatever the call returns, the document
/// is closed with [`XmlWriter::end_document`]; only a failing output stream
/// stops it early.
///
/// # Errors
///
/// Returns an error if the output stream fails.
pub async fn write_content_summary<W>(
    xml: &mut XmlWriter<W>,
    path: &str,
    clients: &dyn ClientFactory,
    identity: &Identity,
) -> Result<SummaryOutcome, XmlError>
where
    W: AsyncWrite + Unpin,
{
    xml.declaration().await?;

    let started = Instant::now();
    let result = fetch_content_summary(path, clients, identity).await;
    record_remote_call(started.elapsed());

    xml.start_tag(CONTENT_SUMMARY_TAG).await?;
    let outcome = match result {
        Ok(Some(summary)) => {
            for (name, value) in summary.fields() {
                xml.attribute(name, &value.to_string()).await?;
            }
            SummaryOutcome::Summary
        }
        Ok(None) => SummaryOutcome::Empty,
        Err(err) => {
            warn!(path, user = %identity.user, error = %err, "Metadata call failed");
            write_remote_failure(xml, path, &RemoteFailure::from(&err)).await?;
            SummaryOutcome::Fault
        }
    };
    xml.end_tag().await?;
    xml.end_document().await?;

    record_summary(outcome);
    Ok(outcome)
}

async fn fetch_content_summary(
    path: &str,
    clients: &dyn ClientFactory,
    identity: &Identity,
) -> Result<Option<ContentSummary>, ClientError> {
    let client = clients.connect(identity)?;
    client.get_content_summary(path).await
}
