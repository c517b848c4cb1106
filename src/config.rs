// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Deployment and provider configuration.
//!
//! Configuration is an explicit value handed to [`crate::deploy::Deployer::new`] and
//! to provider constructors. Nothing is read from process-wide state here, so several
//! deployments with different settings can run side by side. The CLI layer is
//! responsible for filling these values from flags and environment variables.

use std::time::Duration;
use url::Url;

use crate::constants::{
    CLOUDFLARE_API_URL, DEFAULT_APPLY_CONCURRENCY, DEFAULT_FETCH_ATTEMPTS,
    DEFAULT_REQUEST_TIMEOUT_SECS, DEFAULT_RETRY_INITIAL_INTERVAL_MILLIS,
};
use crate::dns_errors::ConfigError;
use crate::records::TtlPolicy;

/// Settings for a deployment run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployConfig {
    /// Pre-known provider zone id; resolved from the domain when absent
    pub zone_id: Option<String>,
    /// Maximum number of edit operations in flight
    pub concurrency: usize,
    /// Timeout applied to every provider call
    pub request_timeout: Duration,
    /// Attempts made when listing records before giving up
    pub fetch_attempts: u32,
    /// Delay before the first fetch retry, doubled on each further retry
    pub retry_initial_interval: Duration,
    /// TTLs for root and tree node records
    pub ttl: TtlPolicy,
}

impl Default for DeployConfig {
    fn default() -> Self {
        Self {
            zone_id: None,
            concurrency: DEFAULT_APPLY_CONCURRENCY,
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            fetch_attempts: DEFAULT_FETCH_ATTEMPTS,
            retry_initial_interval: Duration::from_millis(DEFAULT_RETRY_INITIAL_INTERVAL_MILLIS),
            ttl: TtlPolicy::default(),
        }
    }
}

impl DeployConfig {
    /// Check that every value is usable.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] for zero concurrency, zero attempts, a zero
    /// timeout, zero TTLs, a root TTL above the node TTL, or an empty zone id.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.concurrency == 0 {
            return Err(invalid("concurrency", "must be at least 1"));
        }
        if self.fetch_attempts == 0 {
            return Err(invalid("fetch_attempts", "must be at least 1"));
        }
        if self.request_timeout.is_zero() {
            return Err(invalid("request_timeout", "must be greater than zero"));
        }
        if self.ttl.root_ttl == 0 || self.ttl.node_ttl == 0 {
            return Err(invalid("ttl", "TTLs must be greater than zero"));
        }
        if self.ttl.root_ttl > self.ttl.node_ttl {
            return Err(invalid(
                "ttl",
                format!(
                    "root TTL {} exceeds node TTL {}",
                    self.ttl.root_ttl, self.ttl.node_ttl
                ),
            ));
        }
        if matches!(&self.zone_id, Some(id) if id.trim().is_empty()) {
            return Err(invalid("zone_id", "must not be empty when set"));
        }
        Ok(())
    }
}

/// Credentials and endpoint for the Cloudflare backend.
#[derive(Clone, PartialEq, Eq)]
pub struct CloudflareConfig {
    /// API token with Zone:Read and DNS:Edit permissions
    pub api_token: String,
    /// API base URL
    pub api_url: String,
}

// Keep the token out of logs.
impl std::fmt::Debug for CloudflareConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CloudflareConfig")
            .field("api_token", &"<redacted>")
            .field("api_url", &self.api_url)
            .finish()
    }
}

impl CloudflareConfig {
    /// Configuration for the public Cloudflare API.
    pub fn new(api_token: impl Into<String>) -> Self {
        Self {
            api_token: api_token.into(),
            api_url: CLOUDFLARE_API_URL.to_string(),
        }
    }

    /// Override the API base URL.
    #[must_use]
    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }

    /// Check the token and parse the base URL.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Missing`] for an empty token and
    /// [`ConfigError::Invalid`] for a base URL that is not http(s).
    pub fn validate(&self) -> Result<Url, ConfigError> {
        if self.api_token.trim().is_empty() {
            return Err(ConfigError::Missing("api_token"));
        }
        let url = Url::parse(&self.api_url).map_err(|e| invalid("api_url", e.to_string()))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(invalid(
                "api_url",
                format!("unsupported scheme '{}'", url.scheme()),
            ));
        }
        Ok(url)
    }
}

fn invalid(field: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        field,
        reason: reason.into(),
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod config_tests;
