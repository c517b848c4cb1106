// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! DNS provider capability interface.
//!
//! The reconciliation engine talks to a DNS hosting service only through the
//! [`DnsProvider`] trait. A backend has to be able to:
//!
//! - Resolve a zone id from a domain name
//! - Report zone details, including the permissions of the current credential
//! - List the TXT records under a domain
//! - Apply a single [`EditOp`]
//!
//! No cross-operation transaction is assumed; each edit stands alone.
//!
//! # Backends
//!
//! - [`cloudflare::CloudflareProvider`] - Cloudflare v4 HTTP API
//! - [`memory::MemoryProvider`] - In-memory zones for tests and dry runs

pub mod cloudflare;
pub mod memory;

pub use cloudflare::CloudflareProvider;
pub use memory::MemoryProvider;

use serde::Serialize;

use crate::dns_errors::ProviderError;
use crate::records::{ActualRecordSet, EditOp};

/// Zone metadata as reported by the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ZoneDetails {
    /// Provider zone id
    pub id: String,
    /// Zone apex domain name
    pub name: String,
    /// Capabilities granted to the current credential
    pub permissions: Vec<String>,
}

/// Hard limits a provider places on published records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProviderLimits {
    /// Maximum TXT content length in characters
    pub max_txt_len: usize,
    /// Maximum TTL in seconds, if the provider caps it
    pub max_ttl: Option<u32>,
}

/// Capability contract every DNS backend implements.
#[async_trait::async_trait]
pub trait DnsProvider: Send + Sync {
    /// Short backend name for logs (e.g. "cloudflare").
    fn name(&self) -> &'static str;

    /// Record size and TTL limits of this backend.
    fn limits(&self) -> ProviderLimits;

    /// Resolve the id of the zone whose apex is exactly `name`.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::NotFound`] if no such zone exists, or any transport error.
    async fn zone_id_by_name(&self, name: &str) -> Result<String, ProviderError>;

    /// Fetch zone metadata and the permissions granted on it.
    ///
    /// # Errors
    ///
    /// Returns an error if the zone cannot be read.
    async fn zone_details(&self, zone_id: &str) -> Result<ZoneDetails, ProviderError>;

    /// List TXT records at `domain` and below.
    ///
    /// # Errors
    ///
    /// Returns an error if the records cannot be listed.
    async fn list_records(&self, zone_id: &str, domain: &str)
        -> Result<ActualRecordSet, ProviderError>;

    /// Apply one edit operation.
    ///
    /// Content larger than [`ProviderLimits::max_txt_len`] must be rejected with
    /// [`ProviderError::PayloadTooLarge`], never truncated.
    ///
    /// # Errors
    ///
    /// Returns an error if the provider rejects or fails the change.
    async fn apply_edit(&self, zone_id: &str, op: &EditOp) -> Result<(), ProviderError>;
}

/// Reject content longer than `limit` characters.
///
/// # Errors
///
/// Returns [`ProviderError::PayloadTooLarge`] when the content does not fit.
pub fn check_payload(op: &EditOp, limit: usize) -> Result<(), ProviderError> {
    let Some(content) = op.content() else {
        return Ok(());
    };
    let size = content.chars().count();
    if size > limit {
        return Err(ProviderError::PayloadTooLarge {
            name: op.name().to_string(),
            size,
            limit,
        });
    }
    Ok(())
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod mod_tests;
