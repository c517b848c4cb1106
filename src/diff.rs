// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Diff engine computing the edit script between desired and actual records.
//!
//! The engine is a pure function over in-memory record sets:
//!
//! 1. **Create** every desired name the provider does not serve
//! 2. **Update** every desired name whose content differs
//! 3. **Delete** every served name inside the deployment domain that is no longer desired
//!
//! Identical content produces no operation, so diffing a zone against the tree it
//! already serves yields an empty script. Records outside the deployment domain are
//! never touched.

use tracing::debug;

use crate::names::is_within;
use crate::records::{ActualRecordSet, DesiredRecordSet, EditOp, EditScript, TtlPolicy};

/// Compute the edit script turning `actual` into `desired`.
///
/// TTLs come from `ttl`: the record at the deployment root gets
/// [`TtlPolicy::root_ttl`], all others get [`TtlPolicy::node_ttl`]. A record whose
/// content already matches is left alone even if its TTL differs.
///
/// The result is sorted by name, so identical inputs always produce an identical
/// script.
///
/// # Example
///
/// ```rust
/// use dnsdisc_deploy::diff::diff;
/// use dnsdisc_deploy::records::{ActualRecord, ActualRecordSet, DesiredRecordSet, TtlPolicy};
///
/// let desired = DesiredRecordSet::new(
///     "example.org",
///     [("example.org", "enrtree-root:v1 e=AAA"), ("aaa.example.org", "enrtree-branch:")],
/// )
/// .unwrap();
/// let actual: ActualRecordSet =
///     [ActualRecord::new("aaa.example.org", "enrtree-branch:", 86400, "r1")]
///         .into_iter()
///         .collect();
///
/// let script = diff(&desired, &actual, &TtlPolicy::default());
/// assert_eq!(script.creates(), 1);
/// assert_eq!(script.len(), 1);
/// ```
#[must_use]
pub fn diff(desired: &DesiredRecordSet, actual: &ActualRecordSet, ttl: &TtlPolicy) -> EditScript {
    let domain = desired.domain();
    let mut ops = Vec::new();

    for (name, content) in desired.iter() {
        let record_ttl = ttl.ttl_for(name, domain);
        match actual.get(name) {
            None => ops.push(EditOp::Create {
                name: name.to_string(),
                content: content.to_string(),
                ttl: record_ttl,
            }),
            Some(existing) if existing.content != content => ops.push(EditOp::Update {
                name: name.to_string(),
                record_id: existing.id.clone(),
                content: content.to_string(),
                ttl: record_ttl,
            }),
            Some(_) => {}
        }
    }

    for record in actual.iter() {
        if is_within(&record.name, domain) && desired.get(&record.name).is_none() {
            ops.push(EditOp::Delete {
                name: record.name.clone(),
                record_id: record.id.clone(),
            });
        }
    }

    // Several TXT records at one managed name: keep only the primary one.
    for record in actual.surplus() {
        if is_within(&record.name, domain) {
            ops.push(EditOp::Delete {
                name: record.name.clone(),
                record_id: record.id.clone(),
            });
        }
    }

    let script = EditScript::new(ops);
    debug!(
        domain = %domain,
        creates = script.creates(),
        updates = script.updates(),
        deletes = script.deletes(),
        "Computed edit script"
    );
    script
}

#[cfg(test)]
#[path = "diff_tests.rs"]
mod diff_tests;
