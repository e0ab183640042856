// Copyright 2026 The nsbridge Authors
// SPDX-License-Identifier: Apache-2.0

//! Metadata client speaking the WebHDFS REST dialect.
//!
//! One request per summary:
//! `GET {endpoint}/webhdfs/v1{path}?op=GETCONTENTSUMMARY&user.name={user}`.
//! Successful replies carry `{"ContentSummary": {...}}`; failures carry
//! `{"RemoteException": {"exception", "javaClassName", "message"}}`.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use super::{ClientError, ClientFactory, MetadataClient};
use crate::config::MetadataConfig;
use crate::types::{ContentSummary, Identity};

/// Characters escaped inside a path segment.
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Characters escaped inside a query value.
const QUERY_VALUE: &AsciiSet = &PATH_SEGMENT.add(b'&').add(b'=').add(b'+');

#[derive(Debug, Deserialize)]
struct SummaryReply {
    #[serde(rename = "ContentSummary")]
    content_summary: Option<ContentSummary>,
}

#[derive(Debug, Deserialize)]
struct ExceptionReply {
    #[serde(rename = "RemoteException")]
    remote_exception: RemoteExceptionBody,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RemoteExceptionBody {
    exception: Option<String>,
    java_class_name: Option<String>,
    #[serde(default)]
    message: String,
}

/// Builds [`WebHdfsClient`]s that share one connection pool.
#[derive(Debug, Clone)]
pub struct WebHdfsClientFactory {
    http: Client,
    endpoint: String,
}

impl WebHdfsClientFactory {
    /// Creates a factory for the configured endpoint.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: &MetadataConfig) -> Result<Self, ClientError> {
        let http = Client::builder().timeout(Duration::from_secs(config.timeout_secs)).build()?;
        Ok(Self::with_client(http, &config.endpoint))
    }

    /// Creates a factory around an existing HTTP client.
    #[must_use]
    pub fn with_client(http: Client, endpoint: &str) -> Self {
        Self { http, endpoint: endpoint.trim_end_matches('/').to_string() }
    }

    /// Base URL requests are sent to.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl ClientFactory for WebHdfsClientFactory {
    fn connect(&self, identity: &Identity) -> Result<Arc<dyn MetadataClient>, ClientError> {
        Ok(Arc::new(WebHdfsClient {
            http: self.http.clone(),
            endpoint: self.endpoint.clone(),
            user: identity.user.clone(),
        }))
    }
}

/// A WebHDFS client acting on behalf of one user.
#[derive(Debug, Clone)]
pub struct WebHdfsClient {
    http: Client,
    endpoint: String,
    user: String,
}

impl WebHdfsClient {
    fn summary_url(&self, path: &str) -> Result<String, ClientError> {
        if !path.starts_with('/') {
            return Err(ClientError::InvalidPath(path.to_string()));
        }
        let encoded_path: String = path
            .split('/')
            .map(|segment| utf8_percent_encode(segment, PATH_SEGMENT).to_string())
            .collect::<Vec<_>>()
            .join("/");
        Ok(format!(
            "{}/webhdfs/v1{}?op=GETCONTENTSUMMARY&user.name={}",
            self.endpoint,
            encoded_path,
            utf8_percent_encode(&self.user, QUERY_VALUE)
        ))
    }
}

#[async_trait]
impl MetadataClient for WebHdfsClient {
    async fn get_content_summary(
        &self,
        path: &str,
    ) -> Result<Option<ContentSummary>, ClientError> {
        let url = self.summary_url(path)?;
        debug!(%url, user = %self.user, "Requesting content summary");

        let response = self.http.get(&url).send().await?;
        let status = response.status();
        let body = response.bytes().await?;

        if !status.is_success() {
            return Err(match serde_json::from_slice::<ExceptionReply>(&body) {
                Ok(reply) => {
                    let e = reply.remote_exception;
                    let exception = e
                        .java_class_name
                        .or(e.exception)
                        .unwrap_or_else(|| "RemoteException".to_string());
                    ClientError::Remote { exception, message: e.message }
                }
                Err(_) => ClientError::Protocol(format!("HTTP {status}")),
            });
        }

        let reply: SummaryReply = serde_json::from_slice(&body)
            .map_err(|e| ClientError::Protocol(format!("invalid summary reply: {e}")))?;

        match reply.content_summary {
            Some(summary) => {
                summary.validate().map_err(|e| ClientError::Protocol(e.to_string()))?;
                Ok(Some(summary))
            }
            None => Ok(None),
        }
    }
}
