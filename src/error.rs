// SPDX-License-Identifier: MIT

//! Collection error types.
//!
//! The taxonomy mirrors how failures propagate through the pipeline:
//! - `AuthRejected` / `AuthTransport` are fatal for a subject: no data
//!   endpoint is called after a failed refresh.
//! - `ScopeMissing` is fatal for a subject and raised before any data call.
//! - `Api` / `Transport` / `MalformedResponse` on data endpoints are
//!   recorded and skipped (best-effort collection).
//! - `Input` / `InvalidRange` are rejected before the pipeline starts.

use chrono::NaiveDate;

/// Error type for the collection pipeline.
#[derive(Debug, thiserror::Error)]
pub enum CollectError {
    #[error("token refresh rejected: HTTP {status}: {body}")]
    AuthRejected { status: u16, body: String },

    #[error("token refresh failed: {0}")]
    AuthTransport(String),

    #[error("credential is missing the required \"{0}\" scope")]
    ScopeMissing(String),

    #[error("Fitbit API error: HTTP {status}: {body}")]
    Api { status: u16, body: String },

    #[error("transport error: {0}")]
    Transport(String),

    #[error("malformed response: {0}")]
    MalformedResponse(String),

    #[error("invalid input: {0}")]
    Input(String),

    #[error("invalid date range: start {start} is after end {end}")]
    InvalidRange { start: NaiveDate, end: NaiveDate },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

/// Result type alias for the pipeline
pub type Result<T> = std::result::Result<T, CollectError>;
