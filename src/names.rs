// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! DNS name normalization and namespace checks.
//!
//! Names are compared in a canonical form: lowercase, without the trailing root dot.
//! Provider APIs and record files disagree on both, so every name entering the
//! reconciliation engine goes through [`normalize_name`] first.

use crate::constants::{MAX_DNS_LABEL_LEN, MAX_DNS_NAME_LEN};

/// Canonical form of a DNS name: trimmed, lowercase, no trailing dot.
#[must_use]
pub fn normalize_name(name: &str) -> String {
    name.trim().trim_end_matches('.').to_ascii_lowercase()
}

/// Validate a normalized DNS name.
///
/// Labels may contain ASCII letters, digits, hyphens and underscores, must be
/// 1-63 characters long, and must not start or end with a hyphen.
///
/// # Errors
///
/// Returns a human-readable reason when the name is not valid.
pub fn validate_name(name: &str) -> Result<(), String> {
    if name.is_empty() {
        return Err("name is empty".into());
    }
    if name.len() > MAX_DNS_NAME_LEN {
        return Err(format!(
            "name is {} characters, maximum is {MAX_DNS_NAME_LEN}",
            name.len()
        ));
    }

    for label in name.split('.') {
        if label.is_empty() {
            return Err("name contains an empty label".into());
        }
        if label.len() > MAX_DNS_LABEL_LEN {
            return Err(format!(
                "label '{label}' is {} characters, maximum is {MAX_DNS_LABEL_LEN}",
                label.len()
            ));
        }
        if label.starts_with('-') || label.ends_with('-') {
            return Err(format!("label '{label}' starts or ends with a hyphen"));
        }
        if let Some(c) = label
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || *c == '-' || *c == '_'))
        {
            return Err(format!("label '{label}' contains invalid character '{c}'"));
        }
    }

    Ok(())
}

/// Returns true if `name` equals `domain` or is a subdomain of it.
///
/// Both arguments must already be normalized. The check is label-aligned, so
/// `badexample.com` is not within `example.com`.
#[must_use]
pub fn is_within(name: &str, domain: &str) -> bool {
    if name == domain {
        return true;
    }
    name.len() > domain.len()
        && name.ends_with(domain)
        && name.as_bytes()[name.len() - domain.len() - 1] == b'.'
}

/// Candidate zone names for `name`, from the name itself up to its
/// second-level parent.
///
/// `a.b.example.com` yields `a.b.example.com`, `b.example.com`, `example.com`.
/// A single-label name yields only itself.
#[must_use]
pub fn zone_candidates(name: &str) -> Vec<String> {
    let labels: Vec<&str> = name.split('.').collect();
    if labels.len() < 2 {
        return vec![name.to_string()];
    }
    (0..labels.len() - 1)
        .map(|start| labels[start..].join("."))
        .collect()
}

#[cfg(test)]
#[path = "names_tests.rs"]
mod names_tests;
