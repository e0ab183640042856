// Copyright 2026 The nsbridge Authors
// SPDX-License-Identifier: Apache-2.0

//! HTTP request handlers.

pub mod content_summary;
pub mod health;
