//! Caller identity resolution.
//!
//! The identity is read from the `ugi` query parameter in its
//! `user,group1,group2` form. Requests without one run as the configured
//! default identity unless anonymous access is disabled.

use nsbridge_core::config::IdentityConfig;
use nsbridge_core::{Error, Identity, Result};

/// Resolves the identity a request acts as.
#[derive(Debug, Clone)]
pub struct IdentityResolver {
    default: Identity,
    allow_anonymous: bool,
}

impl IdentityResolver {
    /// Creates a resolver from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured default identity is invalid.
    pub fn new(config: &IdentityConfig) -> Result<Self> {
        Ok(Self { default: config.default_ugi.parse()?, allow_anonymous: config.allow_anonymous })
    }

    /// Resolves the identity for a request's `ugi` parameter.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidIdentity`] for an unparsable value and
    /// [`Error::MissingIdentity`] when none is given and anonymous access is
    /// disabled.
    pub fn resolve(&self, ugi: Option<&str>) -> Result<Identity> {
        match ugi {
            Some(ugi) => ugi.parse(),
            None if self.allow_anonymous => Ok(self.default.clone()),
            None => Err(Error::MissingIdentity("request has no ugi parameter".to_string())),
        }
    }
}
