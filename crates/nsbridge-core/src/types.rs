// Copyright 2026 The nsbridge Authors
// SPDX-License-Identifier: Apache-2.0

//! Common types used throughout nsbridge.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Aggregate usage of the subtree rooted at a path.
///
/// Built fresh by the metadata service for every request and discarded once
/// rendered. Counts are non-negative; the two quota fields may also hold
/// [`ContentSummary::UNLIMITED`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentSummary {
    /// Total byte size of all files under the path.
    pub length: i64,
    /// Number of files under the path.
    pub file_count: i64,
    /// Number of directories under the path, including the path itself.
    pub directory_count: i64,
    /// Maximum number of namespace entries permitted under the path.
    pub quota: i64,
    /// Storage actually consumed, including replication overhead.
    pub space_consumed: i64,
    /// Maximum storage space permitted under the path.
    pub space_quota: i64,
}

impl ContentSummary {
    /// Quota sentinel meaning "no limit set".
    pub const UNLIMITED: i64 = -1;

    /// Wire names of the fields, in emission order.
    pub const FIELD_NAMES: [&'static str; 6] =
        ["length", "fileCount", "directoryCount", "quota", "spaceConsumed", "spaceQuota"];

    /// Summary of an empty directory with no quotas.
    #[must_use]
    pub const fn empty_directory() -> Self {
        Self {
            length: 0,
            file_count: 0,
            directory_count: 1,
            quota: Self::UNLIMITED,
            space_consumed: 0,
            space_quota: Self::UNLIMITED,
        }
    }

    /// Returns `(wire name, value)` pairs in emission order.
    ///
    /// The order is part of the wire contract and never changes.
    #[must_use]
    pub fn fields(&self) -> [(&'static str, i64); 6] {
        let names = Self::FIELD_NAMES;
        [
            (names[0], self.length),
            (names[1], self.file_count),
            (names[2], self.directory_count),
            (names[3], self.quota),
            (names[4], self.space_consumed),
            (names[5], self.space_quota),
        ]
    }

    /// Checks the field invariants.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidSummary`] naming the first offending field.
    pub fn validate(&self) -> Result<()> {
        for (name, value) in self.fields() {
            let is_quota = name == "quota" || name == "spaceQuota";
            let valid = value >= 0 || (is_quota && value == Self::UNLIMITED);
            if !valid {
                return Err(Error::InvalidSummary(format!("{name} must not be {value}")));
            }
        }
        Ok(())
    }
}

/// Caller identity forwarded to the metadata service.
///
/// Opaque to the bridge itself: authorization happens remotely. The textual
/// form is `user,group1,group2`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    /// User name.
    pub user: String,
    /// Group names, in the order given by the caller.
    pub groups: Vec<String>,
}

impl Identity {
    /// Creates an identity with no groups.
    #[must_use]
    pub fn new(user: impl Into<String>) -> Self {
        Self { user: user.into(), groups: Vec::new() }
    }

    /// Adds a group.
    #[must_use]
    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.groups.push(group.into());
        self
    }
}

impl FromStr for Identity {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let mut parts = s.split(',').map(str::trim);
        let user = parts.next().unwrap_or_default();
        if user.is_empty() {
            return Err(Error::InvalidIdentity(format!("no user name in {s:?}")));
        }
        let groups = parts.filter(|g| !g.is_empty()).map(ToString::to_string).collect();
        Ok(Self { user: user.to_string(), groups })
    }
}

impl std::fmt::Display for Identity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.user)?;
        for group in &self.groups {
            write!(f, ",{group}")?;
        }
        Ok(())
    }
}
