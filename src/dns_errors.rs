// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Error types for zone authorization, provider calls, and deployments.
//!
//! This module provides specialized error types for:
//! - Record set construction (invalid or duplicate names)
//! - Provider API operations (lookup, listing, edits)
//! - Zone authorization (ownership and permission checks)
//! - Deployment runs (aggregated per-stage failures)
//!
//! Errors carry enough structure to be reported per record and serialized into a
//! deployment report.

use serde::Serialize;
use thiserror::Error;

/// Errors raised while building a desired or actual record set.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
pub enum RecordError {
    /// Name is not a syntactically valid DNS name
    #[error("Invalid DNS name '{name}': {reason}")]
    InvalidName {
        /// The offending name as given
        name: String,
        /// Explanation of what is invalid
        reason: String,
    },

    /// Two keys normalize to the same name
    #[error("Duplicate record name '{name}' in record set")]
    DuplicateName {
        /// The normalized name that appears twice
        name: String,
    },

    /// Record lies outside the deployment root
    #[error("Record '{name}' is outside of the managed domain '{domain}'")]
    OutsideNamespace {
        /// The record name
        name: String,
        /// The deployment root domain
        domain: String,
    },
}

/// Errors returned by a DNS provider backend.
///
/// Every concrete provider maps its transport and API failures onto these variants
/// so the orchestrator can decide what to retry and what to report.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
pub enum ProviderError {
    /// Zone or record does not exist (HTTP 404 or empty lookup)
    #[error("{resource} not found")]
    NotFound {
        /// Description of the missing resource
        resource: String,
    },

    /// TXT content exceeds what the provider accepts
    ///
    /// Content is never truncated. A truncated tree node would fail signature or hash
    /// verification on every client.
    #[error("TXT content for '{name}' is {size} characters, provider limit is {limit}")]
    PayloadTooLarge {
        /// Record name
        name: String,
        /// Content length in characters
        size: usize,
        /// Provider limit in characters
        limit: usize,
    },

    /// Retryable failure (connection errors, HTTP 429, HTTP 5xx)
    #[error("Transient failure during {operation}: {reason}")]
    Transient {
        /// Operation that failed (e.g. "list records")
        operation: String,
        /// Underlying cause
        reason: String,
    },

    /// Call did not complete within the configured timeout
    #[error("{operation} timed out after {timeout_ms}ms")]
    Timeout {
        /// Operation that timed out
        operation: String,
        /// Timeout in milliseconds
        timeout_ms: u64,
    },

    /// Non-retryable API error (HTTP 4xx other than 404 and 429)
    #[error("Provider API rejected {operation} (HTTP {status}): {message}")]
    Api {
        /// Operation that failed
        operation: String,
        /// HTTP status code
        status: u16,
        /// Error message returned by the API
        message: String,
    },

    /// Response could not be decoded
    #[error("Invalid provider response during {operation}: {reason}")]
    InvalidResponse {
        /// Operation whose response was malformed
        operation: String,
        /// Decoding error
        reason: String,
    },
}

impl ProviderError {
    /// Returns true if this error is transient and the call may be retried.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transient { .. } | Self::Timeout { .. } => true,
            Self::NotFound { .. }
            | Self::PayloadTooLarge { .. }
            | Self::Api { .. }
            | Self::InvalidResponse { .. } => false,
        }
    }

    /// Returns a stable CamelCase reason code for reports and logs.
    #[must_use]
    pub fn status_reason(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "NotFound",
            Self::PayloadTooLarge { .. } => "PayloadTooLarge",
            Self::Transient { .. } => "TransientNetworkError",
            Self::Timeout { .. } => "Timeout",
            Self::Api { .. } => "ProviderApiError",
            Self::InvalidResponse { .. } => "InvalidResponse",
        }
    }
}

/// Errors that stop a deployment before any record is touched.
///
/// All variants require operator intervention and are never retried.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
pub enum AuthorizationError {
    /// The name to deploy is not a valid DNS name
    #[error("Invalid deployment name '{name}': {reason}")]
    InvalidName {
        /// Name as given
        name: String,
        /// Explanation of what is invalid
        reason: String,
    },

    /// No zone in the account covers the name
    #[error("No zone found for '{name}'")]
    ZoneNotFound {
        /// Name that was looked up
        name: String,
    },

    /// Configured or resolved zone does not contain the name
    #[error("Zone '{zone}' does not match name '{name}' to be deployed")]
    ZoneMismatch {
        /// Domain name of the zone
        zone: String,
        /// Name to be deployed
        name: String,
    },

    /// Credential lacks read or edit capability on the zone
    #[error("Insufficient permissions on zone {zone_id}: missing {}", .missing.join(", "))]
    InsufficientPermission {
        /// Provider zone id
        zone_id: String,
        /// Capabilities that were not granted
        missing: Vec<String>,
    },

    /// Provider call failed while checking the zone
    #[error(transparent)]
    Provider(#[from] ProviderError),
}

impl AuthorizationError {
    /// Returns a stable CamelCase reason code for reports and logs.
    #[must_use]
    pub fn status_reason(&self) -> &'static str {
        match self {
            Self::InvalidName { .. } => "InvalidName",
            Self::ZoneNotFound { .. } => "ZoneNotFound",
            Self::ZoneMismatch { .. } => "ZoneMismatch",
            Self::InsufficientPermission { .. } => "InsufficientPermission",
            Self::Provider(e) => e.status_reason(),
        }
    }
}

/// Cause of a failed deployment stage.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
pub enum DeployError {
    /// Zone authorization failed
    #[error(transparent)]
    Authorization(#[from] AuthorizationError),

    /// Listing the current records failed after the retry budget
    #[error("Failed to fetch records after {attempts} attempt(s): {source}")]
    Fetch {
        /// Number of attempts made
        attempts: u32,
        /// Last error returned by the provider
        source: ProviderError,
    },

    /// One or more edit operations failed
    #[error("{failed} of {total} edit operation(s) failed")]
    Apply {
        /// Number of failed operations
        failed: usize,
        /// Number of dispatched operations
        total: usize,
    },

    /// Deployment was cancelled
    #[error("Deployment cancelled, {skipped} edit operation(s) not dispatched")]
    Cancelled {
        /// Number of operations never sent to the provider
        skipped: usize,
    },
}

impl DeployError {
    /// Returns a stable CamelCase reason code for reports and logs.
    #[must_use]
    pub fn status_reason(&self) -> &'static str {
        match self {
            Self::Authorization(e) => e.status_reason(),
            Self::Fetch { .. } => "FetchFailed",
            Self::Apply { .. } => "PerOpApplyError",
            Self::Cancelled { .. } => "Cancelled",
        }
    }
}

/// Errors raised while loading a discovery tree record file.
#[derive(Error, Debug)]
pub enum TreeError {
    /// File could not be read
    #[error("Failed to read record file '{path}': {source}")]
    Io {
        /// Path of the file
        path: String,
        /// Underlying I/O error
        source: std::io::Error,
    },

    /// File is not a JSON object of strings
    #[error("Invalid record file: {0}")]
    Json(#[from] serde_json::Error),

    /// No root record for the deployment domain
    #[error("Record file has no enrtree-root record for '{domain}'")]
    MissingRoot {
        /// Deployment domain
        domain: String,
    },

    /// Records could not form a valid record set
    #[error(transparent)]
    Record(#[from] RecordError),
}

/// Invalid configuration values.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A required value is missing or empty
    #[error("Missing required configuration value: {0}")]
    Missing(&'static str),

    /// A value is out of range
    #[error("Invalid value for {field}: {reason}")]
    Invalid {
        /// Configuration field
        field: &'static str,
        /// Explanation of what is invalid
        reason: String,
    },
}

#[cfg(test)]
#[path = "dns_errors_tests.rs"]
mod dns_errors_tests;
