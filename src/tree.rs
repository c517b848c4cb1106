// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Loading discovery trees as desired record sets.
//!
//! The deployer does not build or sign trees. It takes the TXT records of an
//! already signed tree from a [`RecordSource`]. [`TxtRecordsFile`] reads the JSON
//! export produced by tree tooling:
//!
//! ```json
//! {
//!   "@": "enrtree-root:v1 e=JWXYDBPXYWG6FX3GMDIBFA6CJ4 l=C7HRFPF3BLGF3YR4DY5KX3SMBE seq=1 sig=...",
//!   "JWXYDBPXYWG6FX3GMDIBFA6CJ4": "enrtree-branch:2XS2367YHAXJFGLZHVAWLQD4ZY,...",
//!   "2XS2367YHAXJFGLZHVAWLQD4ZY.nodes.example.org": "enr:-HW4QO..."
//! }
//! ```
//!
//! Keys may be absolute names under the domain or labels relative to it. `""` and
//! `"@"` both name the root.

use std::collections::BTreeMap;
use std::path::Path;

use tracing::debug;

use crate::constants::{ENRTREE_ROOT_PREFIX, ROOT_RECORD_ALIAS};
use crate::dns_errors::TreeError;
use crate::names::{is_within, normalize_name};
use crate::records::DesiredRecordSet;

/// Anything that can produce the records of a discovery tree for a domain.
pub trait RecordSource {
    /// Build the desired record set for publishing at `domain`.
    ///
    /// # Errors
    ///
    /// Returns an error if the records are unusable for `domain`.
    fn to_record_set(&self, domain: &str) -> Result<DesiredRecordSet, TreeError>;
}

/// TXT records read from a JSON name-to-content map.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TxtRecordsFile {
    entries: BTreeMap<String, String>,
}

impl TxtRecordsFile {
    /// Read and parse a record file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not a JSON object of strings.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, TreeError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| TreeError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let file = Self::from_json_str(&text)?;
        debug!(path = %path.display(), entries = file.entries.len(), "Loaded record file");
        Ok(file)
    }

    /// Parse a record file from a JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if `json` is not an object whose values are strings.
    pub fn from_json_str(json: &str) -> Result<Self, TreeError> {
        let entries: BTreeMap<String, String> = serde_json::from_str(json)?;
        Ok(Self { entries })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl RecordSource for TxtRecordsFile {
    fn to_record_set(&self, domain: &str) -> Result<DesiredRecordSet, TreeError> {
        let domain = normalize_name(domain);
        let records = self
            .entries
            .iter()
            .map(|(key, content)| (absolute_name(key, &domain), content.as_str()));
        let set = DesiredRecordSet::new(&domain, records)?;

        match set.get(set.domain()) {
            Some(root) if root.starts_with(ENRTREE_ROOT_PREFIX) => Ok(set),
            _ => Err(TreeError::MissingRoot { domain }),
        }
    }
}

/// Resolve a file key to an absolute name under `domain`.
fn absolute_name(key: &str, domain: &str) -> String {
    let key = normalize_name(key);
    if key.is_empty() || key == ROOT_RECORD_ALIAS {
        domain.to_string()
    } else if is_within(&key, domain) {
        key
    } else {
        format!("{key}.{domain}")
    }
}

#[cfg(test)]
#[path = "tree_tests.rs"]
mod tree_tests;
