//! HTTP layer for nsbridge.
//!
//! This crate provides:
//! - The content summary endpoint, streaming XML straight to the client
//! - An incremental XML writer and the matching document reader
//! - Caller identity resolution
//! - Request middleware and metrics

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod handlers;
pub mod identity;
pub mod metrics;
pub mod middleware;
pub mod router;
pub mod xml;

pub use error::ApiError;
pub use handlers::content_summary::AppState;
pub use identity::IdentityResolver;
pub use metrics::init_metrics;
pub use router::create_router;
