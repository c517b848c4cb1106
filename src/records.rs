// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Typed record model for the reconciliation engine.
//!
//! - [`DesiredRecordSet`] is what the discovery tree wants published under a domain.
//! - [`ActualRecordSet`] is what a provider currently serves for that domain.
//! - [`EditOp`] and [`EditScript`] describe how to get from one to the other.
//!
//! All names stored in these types are normalized (see [`crate::names`]).

use serde::Serialize;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::fmt;

use crate::constants::{DEFAULT_NODE_TTL_SECS, DEFAULT_ROOT_TTL_SECS};
use crate::dns_errors::RecordError;
use crate::names::{is_within, normalize_name, validate_name};

/// TTL assignment for published records.
///
/// The root record points at the current tree and changes on every update, so it
/// gets a short TTL. Branch and leaf records are content-addressed and never change,
/// so they get the longest TTL the provider allows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TtlPolicy {
    /// TTL for the record at the deployment root
    pub root_ttl: u32,
    /// TTL for every other record
    pub node_ttl: u32,
}

impl Default for TtlPolicy {
    fn default() -> Self {
        Self {
            root_ttl: DEFAULT_ROOT_TTL_SECS,
            node_ttl: DEFAULT_NODE_TTL_SECS,
        }
    }
}

impl TtlPolicy {
    /// TTL for `name` when published under `domain`.
    #[must_use]
    pub fn ttl_for(&self, name: &str, domain: &str) -> u32 {
        if name == domain {
            self.root_ttl
        } else {
            self.node_ttl
        }
    }

    /// Clamp both TTLs to a provider maximum.
    #[must_use]
    pub fn clamped(self, max_ttl: Option<u32>) -> Self {
        match max_ttl {
            Some(max) => Self {
                root_ttl: self.root_ttl.min(max),
                node_ttl: self.node_ttl.min(max),
            },
            None => self,
        }
    }
}

/// Records the discovery tree wants published, keyed by normalized name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DesiredRecordSet {
    domain: String,
    records: BTreeMap<String, String>,
}

impl DesiredRecordSet {
    /// Build a desired set for `domain` from `(name, content)` pairs.
    ///
    /// # Errors
    ///
    /// Returns an error if the domain or any name is invalid, if two names collide
    /// after normalization, or if a name lies outside `domain`.
    pub fn new<I, N, C>(domain: &str, records: I) -> Result<Self, RecordError>
    where
        I: IntoIterator<Item = (N, C)>,
        N: AsRef<str>,
        C: Into<String>,
    {
        let domain_norm = normalize_name(domain);
        validate_name(&domain_norm).map_err(|reason| RecordError::InvalidName {
            name: domain.to_string(),
            reason,
        })?;

        let mut map = BTreeMap::new();
        for (name, content) in records {
            let raw = name.as_ref();
            let name = normalize_name(raw);
            validate_name(&name).map_err(|reason| RecordError::InvalidName {
                name: raw.to_string(),
                reason,
            })?;
            if !is_within(&name, &domain_norm) {
                return Err(RecordError::OutsideNamespace {
                    name,
                    domain: domain_norm,
                });
            }
            if map.insert(name.clone(), content.into()).is_some() {
                return Err(RecordError::DuplicateName { name });
            }
        }

        Ok(Self {
            domain: domain_norm,
            records: map,
        })
    }

    /// Deployment root domain (the managed namespace).
    #[must_use]
    pub fn domain(&self) -> &str {
        &self.domain
    }

    /// Content wanted at `name`, if any.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.records.get(name).map(String::as_str)
    }

    /// Iterate records in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.records.iter().map(|(n, c)| (n.as_str(), c.as_str()))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// SHA-256 digest over the domain and all records, hex encoded.
    ///
    /// Two runs publishing the same tree report the same digest.
    #[must_use]
    pub fn digest(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.domain.as_bytes());
        for (name, content) in &self.records {
            hasher.update([0u8]);
            hasher.update(name.as_bytes());
            hasher.update([0u8]);
            hasher.update(content.as_bytes());
        }
        format!("{:x}", hasher.finalize())
    }
}

/// A TXT record as published by a provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActualRecord {
    /// Normalized record name
    pub name: String,
    /// TXT content
    pub content: String,
    /// TTL in seconds
    pub ttl: u32,
    /// Provider-internal record identifier
    pub id: String,
}

impl ActualRecord {
    pub fn new(
        name: impl AsRef<str>,
        content: impl Into<String>,
        ttl: u32,
        id: impl Into<String>,
    ) -> Self {
        Self {
            name: normalize_name(name.as_ref()),
            content: content.into(),
            ttl,
            id: id.into(),
        }
    }
}

/// Records a provider currently serves, keyed by normalized name.
///
/// Providers may hold several TXT records at one name. The record with the smallest
/// id is kept as the primary record for that name and the rest are kept as surplus,
/// so the diff engine can remove them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActualRecordSet {
    records: BTreeMap<String, ActualRecord>,
    surplus: Vec<ActualRecord>,
}

impl ActualRecordSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a record, demoting one of the two to surplus on a name clash.
    pub fn insert(&mut self, record: ActualRecord) {
        match self.records.get_mut(&record.name) {
            Some(existing) if record.id < existing.id => {
                let demoted = std::mem::replace(existing, record);
                self.surplus.push(demoted);
            }
            Some(_) => self.surplus.push(record),
            None => {
                self.records.insert(record.name.clone(), record);
            }
        }
    }

    /// Primary record at `name`, if any.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ActualRecord> {
        self.records.get(name)
    }

    /// Iterate primary records in name order.
    pub fn iter(&self) -> impl Iterator<Item = &ActualRecord> {
        self.records.values()
    }

    /// Extra records sharing a name with a primary record.
    #[must_use]
    pub fn surplus(&self) -> &[ActualRecord] {
        &self.surplus
    }

    /// Number of distinct names.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl FromIterator<ActualRecord> for ActualRecordSet {
    fn from_iter<T: IntoIterator<Item = ActualRecord>>(iter: T) -> Self {
        let mut set = Self::new();
        for record in iter {
            set.insert(record);
        }
        set
    }
}

/// A single change against a zone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "op", rename_all = "lowercase")]
pub enum EditOp {
    /// Publish a record at a name that has none
    Create {
        name: String,
        content: String,
        ttl: u32,
    },
    /// Replace the content of an existing record
    Update {
        name: String,
        record_id: String,
        content: String,
        ttl: u32,
    },
    /// Remove an existing record
    Delete { name: String, record_id: String },
}

impl EditOp {
    /// Name targeted by this operation.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Create { name, .. } | Self::Update { name, .. } | Self::Delete { name, .. } => {
                name
            }
        }
    }

    /// Content written by this operation, if it writes any.
    #[must_use]
    pub fn content(&self) -> Option<&str> {
        match self {
            Self::Create { content, .. } | Self::Update { content, .. } => Some(content),
            Self::Delete { .. } => None,
        }
    }

    /// TTL written by this operation, if it writes any.
    #[must_use]
    pub fn ttl(&self) -> Option<u32> {
        match self {
            Self::Create { ttl, .. } | Self::Update { ttl, .. } => Some(*ttl),
            Self::Delete { .. } => None,
        }
    }

    /// Lowercase verb for logs.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Create { .. } => "create",
            Self::Update { .. } => "update",
            Self::Delete { .. } => "delete",
        }
    }
}

impl fmt::Display for EditOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Create { name, content, ttl } => {
                write!(f, "create {name} ttl={ttl} {content:?}")
            }
            Self::Update {
                name, content, ttl, ..
            } => write!(f, "update {name} ttl={ttl} {content:?}"),
            Self::Delete { name, record_id } => write!(f, "delete {name} id={record_id}"),
        }
    }
}

/// Ordered list of edit operations, sorted by name then record id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct EditScript(Vec<EditOp>);

impl EditScript {
    /// Sort `ops` into canonical order.
    #[must_use]
    pub fn new(mut ops: Vec<EditOp>) -> Self {
        ops.sort_by(|a, b| {
            a.name()
                .cmp(b.name())
                .then_with(|| sort_key(a).cmp(&sort_key(b)))
        });
        Self(ops)
    }

    #[must_use]
    pub fn ops(&self) -> &[EditOp] {
        &self.0
    }

    #[must_use]
    pub fn into_ops(self) -> Vec<EditOp> {
        self.0
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn creates(&self) -> usize {
        self.count(|op| matches!(op, EditOp::Create { .. }))
    }

    #[must_use]
    pub fn updates(&self) -> usize {
        self.count(|op| matches!(op, EditOp::Update { .. }))
    }

    #[must_use]
    pub fn deletes(&self) -> usize {
        self.count(|op| matches!(op, EditOp::Delete { .. }))
    }

    fn count(&self, pred: impl Fn(&EditOp) -> bool) -> usize {
        self.0.iter().filter(|op| pred(op)).count()
    }
}

impl IntoIterator for EditScript {
    type Item = EditOp;
    type IntoIter = std::vec::IntoIter<EditOp>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

// Create/update sort before deletes at the same name; deletes by id.
fn sort_key(op: &EditOp) -> (u8, &str) {
    match op {
        EditOp::Create { .. } => (0, ""),
        EditOp::Update { record_id, .. } => (1, record_id),
        EditOp::Delete { record_id, .. } => (2, record_id),
    }
}

#[cfg(test)]
#[path = "records_tests.rs"]
mod records_tests;
