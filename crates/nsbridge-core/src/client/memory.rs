//! In-memory metadata namespace.
//!
//! Serves canned answers per path. Used by tests and by `serve --memory`
//! for local development without a metadata service.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;

use super::{ClientError, ClientFactory, MetadataClient};
use crate::types::{ContentSummary, Identity};

#[derive(Debug, Clone)]
enum Entry {
    Summary(ContentSummary),
    Absent,
    Failure { exception: String, message: String },
}

#[derive(Debug, Default)]
struct Inner {
    entries: HashMap<String, Entry>,
    denied_users: HashSet<String>,
    calls: AtomicUsize,
}

impl Clone for Inner {
    fn clone(&self) -> Self {
        Self {
            entries: self.entries.clone(),
            denied_users: self.denied_users.clone(),
            calls: AtomicUsize::new(self.calls.load(Ordering::SeqCst)),
        }
    }
}

/// A clonable, in-memory [`ClientFactory`].
///
/// Clones share entries and the call counter once building is done. A builder
/// method called on a clone gives that clone its own copy of the entries.
#[derive(Debug, Clone, Default)]
pub struct MemoryNamespace {
    inner: Arc<Inner>,
}

impl MemoryNamespace {
    /// Creates an empty namespace.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a namespace whose root is an empty directory.
    #[must_use]
    pub fn with_root() -> Self {
        Self::new().with_summary("/", ContentSummary::empty_directory())
    }

    /// Answers `path` with `summary`.
    #[must_use]
    pub fn with_summary(self, path: impl Into<String>, summary: ContentSummary) -> Self {
        self.with_entry(path.into(), Entry::Summary(summary))
    }

    /// Answers `path` with an absent result.
    #[must_use]
    pub fn with_absent(self, path: impl Into<String>) -> Self {
        self.with_entry(path.into(), Entry::Absent)
    }

    /// Fails calls for `path` with a remote exception.
    #[must_use]
    pub fn with_failure(
        self,
        path: impl Into<String>,
        exception: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        let entry = Entry::Failure { exception: exception.into(), message: message.into() };
        self.with_entry(path.into(), entry)
    }

    /// Refuses to connect on behalf of `user`.
    #[must_use]
    pub fn deny_user(mut self, user: impl Into<String>) -> Self {
        self.inner_mut().denied_users.insert(user.into());
        self
    }

    /// Number of summary calls served so far, across all clones.
    #[must_use]
    pub fn calls(&self) -> usize {
        self.inner.calls.load(Ordering::SeqCst)
    }

    fn with_entry(mut self, path: String, entry: Entry) -> Self {
        self.inner_mut().entries.insert(path, entry);
        self
    }

    fn inner_mut(&mut self) -> &mut Inner {
        Arc::make_mut(&mut self.inner)
    }
}

impl ClientFactory for MemoryNamespace {
    fn connect(&self, identity: &Identity) -> Result<Arc<dyn MetadataClient>, ClientError> {
        if self.inner.denied_users.contains(&identity.user) {
            return Err(ClientError::remote(
                "AccessControlException",
                format!("Permission denied: user={}", identity.user),
            ));
        }
        Ok(Arc::new(MemoryClient { inner: Arc::clone(&self.inner) }))
    }
}

struct MemoryClient {
    inner: Arc<Inner>,
}

#[async_trait]
impl MetadataClient for MemoryClient {
    async fn get_content_summary(
        &self,
        path: &str,
    ) -> Result<Option<ContentSummary>, ClientError> {
        self.inner.calls.fetch_add(1, Ordering::SeqCst);

        if !path.starts_with('/') {
            return Err(ClientError::remote(
                "InvalidPathException",
                format!("Invalid file name: {path}"),
            ));
        }

        match self.inner.entries.get(path) {
            Some(Entry::Summary(summary)) => Ok(Some(*summary)),
            Some(Entry::Absent) | None => Ok(None),
            Some(Entry::Failure { exception, message }) => {
                Err(ClientError::remote(exception.clone(), message.clone()))
            }
        }
    }
}
