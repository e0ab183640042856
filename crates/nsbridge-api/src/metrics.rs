// Copyright 2026 The nsbridge Authors
// SPDX-License-Identifier: Apache-2.0

//! Endpoint metrics definitions.
//!
//! This module provides Prometheus-compatible metrics for the bridge.

use std::time::Duration;

use metrics::{counter, describe_counter, describe_histogram, histogram};

/// How a content summary request was answered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SummaryOutcome {
    /// Populated summary.
    Summary,
    /// Empty root element.
    Empty,
    /// Fault envelope.
    Fault,
}

impl SummaryOutcome {
    /// Returns the outcome name as a string for metric labels.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Summary => "summary",
            Self::Empty => "empty",
            Self::Fault => "fault",
        }
    }
}

/// Initialize metric descriptions (call once at startup).
pub fn init_metrics() {
    describe_counter!("nsbridge_requests_total", "Total number of HTTP requests");
    describe_histogram!(
        "nsbridge_request_duration_seconds",
        "Time until response headers were produced, in seconds"
    );
    describe_counter!("nsbridge_summaries_total", "Content summary documents by outcome");
    describe_histogram!(
        "nsbridge_remote_call_duration_seconds",
        "Metadata service call duration in seconds"
    );
}

/// Record a completed request.
pub fn record_request(status_code: u16, duration: Duration) {
    let status = status_class(status_code);
    let success = if status_code < 400 { "true" } else { "false" };

    counter!("nsbridge_requests_total", "status" => status, "success" => success).increment(1);
    histogram!("nsbridge_request_duration_seconds", "status" => status)
        .record(duration.as_secs_f64());
}

/// Record a finished content summary document.
pub fn record_summary(outcome: SummaryOutcome) {
    counter!("nsbridge_summaries_total", "outcome" => outcome.as_str()).increment(1);
}

/// Record the duration of one metadata service call.
pub fn record_remote_call(duration: Duration) {
    histogram!("nsbridge_remote_call_duration_seconds").record(duration.as_secs_f64());
}

/// Convert status code to status class for metric labels.
fn status_class(status_code: u16) -> &'static str {
    match status_code {
        200..=299 => "2xx",
        300..=399 => "3xx",
        400..=499 => "4xx",
        500..=599 => "5xx",
        _ => "other",
    }
}
