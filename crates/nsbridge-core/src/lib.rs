//! Core types and utilities for nsbridge.
//!
//! This crate provides the building blocks shared by the HTTP layer and the
//! server binary:
//! - Configuration management
//! - Error types with stable error codes
//! - The content summary and caller identity types
//! - Clients for the remote metadata service

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod client;
pub mod config;
pub mod error;
pub mod types;

pub use client::{ClientError, ClientFactory, MetadataClient, RemoteFailure};
pub use config::Config;
pub use error::{Error, ErrorCode, Result};
pub use types::{ContentSummary, Identity};
