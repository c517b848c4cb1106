// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Zone authorization checks.
//!
//! Before any record is touched, the deployer confirms that:
//!
//! 1. The name to deploy is a valid DNS name
//! 2. A zone in the provider account covers that name
//! 3. The current credential can both read and edit that zone
//!
//! The check only reads from the provider and can be repeated freely.

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::constants::{PERMISSION_ZONE_EDIT, PERMISSION_ZONE_READ};
use crate::dns_errors::{AuthorizationError, ProviderError};
use crate::names::{is_within, normalize_name, validate_name, zone_candidates};
use crate::provider::DnsProvider;

/// A zone the current credential is allowed to publish into.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Zone {
    /// Provider zone id
    pub id: String,
    /// Zone apex domain name
    pub name: String,
    /// Capabilities granted on the zone
    pub permissions: Vec<String>,
}

/// Verify that `name` can be published through `provider`.
///
/// When `configured_zone_id` is `None`, the zone is located by trying `name` and then
/// each parent domain (stopping before the TLD) until the provider knows one.
///
/// # Errors
///
/// - [`AuthorizationError::InvalidName`] if `name` is empty or malformed
/// - [`AuthorizationError::ZoneNotFound`] if no candidate zone exists
/// - [`AuthorizationError::ZoneMismatch`] if the zone does not contain `name`
/// - [`AuthorizationError::InsufficientPermission`] if read or edit is not granted
/// - [`AuthorizationError::Provider`] for any other provider failure
pub async fn check_zone(
    name: &str,
    configured_zone_id: Option<&str>,
    provider: &dyn DnsProvider,
) -> Result<Zone, AuthorizationError> {
    let normalized = normalize_name(name);
    validate_name(&normalized).map_err(|reason| AuthorizationError::InvalidName {
        name: name.to_string(),
        reason,
    })?;

    let zone_id = match configured_zone_id {
        Some(id) => id.to_string(),
        None => resolve_zone_id(&normalized, provider).await?,
    };

    let details = provider.zone_details(&zone_id).await?;
    debug!(
        zone_id = %details.id,
        zone = %details.name,
        permissions = ?details.permissions,
        "Fetched zone details"
    );

    let zone_name = normalize_name(&details.name);
    if !is_within(&normalized, &zone_name) {
        return Err(AuthorizationError::ZoneMismatch {
            zone: zone_name,
            name: normalized,
        });
    }

    let missing: Vec<String> = [PERMISSION_ZONE_READ, PERMISSION_ZONE_EDIT]
        .into_iter()
        .filter(|wanted| !has_permission(&details.permissions, wanted))
        .map(ToString::to_string)
        .collect();
    if !missing.is_empty() {
        warn!(zone_id = %details.id, missing = ?missing, "Credential lacks zone permissions");
        return Err(AuthorizationError::InsufficientPermission {
            zone_id: details.id,
            missing,
        });
    }

    info!(zone_id = %details.id, zone = %zone_name, name = %normalized, "Zone authorized");
    Ok(Zone {
        id: details.id,
        name: zone_name,
        permissions: details.permissions,
    })
}

async fn resolve_zone_id(
    name: &str,
    provider: &dyn DnsProvider,
) -> Result<String, AuthorizationError> {
    for candidate in zone_candidates(name) {
        match provider.zone_id_by_name(&candidate).await {
            Ok(id) => {
                debug!(name = %name, zone = %candidate, zone_id = %id, "Resolved zone id");
                return Ok(id);
            }
            Err(ProviderError::NotFound { .. }) => {
                debug!(zone = %candidate, "No zone with this name, trying parent");
            }
            Err(e) => return Err(e.into()),
        }
    }

    Err(AuthorizationError::ZoneNotFound {
        name: name.to_string(),
    })
}

/// Permission strings may carry a leading `#` (Cloudflare reports `#zone:edit`).
fn has_permission(granted: &[String], wanted: &str) -> bool {
    granted
        .iter()
        .any(|p| p.strip_prefix('#').unwrap_or(p) == wanted)
}

#[cfg(test)]
#[path = "authorization_tests.rs"]
mod authorization_tests;
