// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Global constants for dnsdisc-deploy.
//!
//! This module contains all numeric and string constants used throughout the codebase.
//! Constants are organized by category for easy maintenance.

// ============================================================================
// Discovery Tree Constants
// ============================================================================

/// Prefix of the root record content of an EIP-1459 tree
pub const ENRTREE_ROOT_PREFIX: &str = "enrtree-root:";

/// Key used by relative record files to denote the root name
pub const ROOT_RECORD_ALIAS: &str = "@";

// ============================================================================
// TTL Constants
// ============================================================================

/// TTL for the root record (30 minutes). It changes on every tree update.
pub const DEFAULT_ROOT_TTL_SECS: u32 = 30 * 60;

/// TTL for branch and leaf records (4 weeks). Their content is immutable.
pub const DEFAULT_NODE_TTL_SECS: u32 = 4 * 7 * 24 * 60 * 60;

// ============================================================================
// DNS Name Constants
// ============================================================================

/// Maximum length of a presentation-format domain name without the trailing dot
pub const MAX_DNS_NAME_LEN: usize = 253;

/// Maximum length of a single DNS label
pub const MAX_DNS_LABEL_LEN: usize = 63;

// ============================================================================
// Authorization Constants
// ============================================================================

/// Capability marker granting read access to a zone
pub const PERMISSION_ZONE_READ: &str = "zone:read";

/// Capability marker granting edit access to a zone
pub const PERMISSION_ZONE_EDIT: &str = "zone:edit";

// ============================================================================
// Deployment Constants
// ============================================================================

/// Default number of edit operations in flight against the provider
pub const DEFAULT_APPLY_CONCURRENCY: usize = 4;

/// Default timeout for a single provider call (30 seconds)
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Default number of attempts when listing records
pub const DEFAULT_FETCH_ATTEMPTS: u32 = 3;

/// Default delay before the first fetch retry (200ms)
pub const DEFAULT_RETRY_INITIAL_INTERVAL_MILLIS: u64 = 200;

// ============================================================================
// Cloudflare Constants
// ============================================================================

/// Cloudflare v4 API base URL
pub const CLOUDFLARE_API_URL: &str = "https://api.cloudflare.com/client/v4";

/// Environment variable holding the Cloudflare API token
pub const CLOUDFLARE_TOKEN_ENV: &str = "CLOUDFLARE_API_TOKEN";

/// Maximum TXT content length accepted by Cloudflare, in characters
pub const CLOUDFLARE_MAX_TXT_LEN: usize = 2048;

/// Maximum TTL accepted by Cloudflare (1 day)
pub const CLOUDFLARE_MAX_TTL_SECS: u32 = 86400;

/// Page size used when listing DNS records
pub const CLOUDFLARE_PAGE_SIZE: u32 = 100;

// ============================================================================
// In-Memory Provider Constants
// ============================================================================

/// Default TXT content limit of the in-memory provider, in characters
pub const MEMORY_MAX_TXT_LEN: usize = 2048;

// ============================================================================
// Runtime Constants
// ============================================================================

/// Number of worker threads for Tokio runtime
pub const TOKIO_WORKER_THREADS: usize = 4;
