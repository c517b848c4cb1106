// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! In-memory DNS provider.
//!
//! Holds zones and TXT records in process memory and implements the full
//! [`DnsProvider`] contract, including payload limits and TTL ceilings. It also
//! supports fault injection (failed listings, rejected names, apply hooks), so the
//! orchestrator's failure handling can be exercised without a network.

use std::collections::{BTreeMap, HashSet};
use std::sync::{Mutex, MutexGuard};

use tracing::debug;

use super::{check_payload, DnsProvider, ProviderLimits, ZoneDetails};
use crate::constants::MEMORY_MAX_TXT_LEN;
use crate::dns_errors::ProviderError;
use crate::names::{is_within, normalize_name};
use crate::records::{ActualRecord, ActualRecordSet, EditOp};

type ApplyHook = Box<dyn Fn(&EditOp) + Send + Sync>;

#[derive(Debug, Clone)]
struct MemoryZone {
    details: ZoneDetails,
    records: Vec<ActualRecord>,
}

#[derive(Debug, Default)]
struct MemoryState {
    zones: BTreeMap<String, MemoryZone>,
    next_record_id: u64,
    list_failures: u32,
    list_calls: u32,
    mutation_calls: u32,
    applied: Vec<EditOp>,
}

impl MemoryState {
    fn next_id(&mut self) -> String {
        self.next_record_id += 1;
        format!("rec-{:06}", self.next_record_id)
    }

    fn zone_mut(&mut self, zone_id: &str) -> Result<&mut MemoryZone, ProviderError> {
        self.zones
            .get_mut(zone_id)
            .ok_or_else(|| zone_not_found(zone_id))
    }
}

/// DNS provider backed by process memory.
pub struct MemoryProvider {
    state: Mutex<MemoryState>,
    limits: ProviderLimits,
    rejected_names: HashSet<String>,
    apply_hook: Option<ApplyHook>,
}

impl Default for MemoryProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryProvider {
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: Mutex::new(MemoryState::default()),
            limits: ProviderLimits {
                max_txt_len: MEMORY_MAX_TXT_LEN,
                max_ttl: None,
            },
            rejected_names: HashSet::new(),
            apply_hook: None,
        }
    }

    /// Add a zone with the given permissions.
    #[must_use]
    pub fn with_zone(self, id: &str, name: &str, permissions: &[&str]) -> Self {
        self.lock().zones.insert(
            id.to_string(),
            MemoryZone {
                details: ZoneDetails {
                    id: id.to_string(),
                    name: normalize_name(name),
                    permissions: permissions.iter().map(ToString::to_string).collect(),
                },
                records: Vec::new(),
            },
        );
        self
    }

    /// Seed a TXT record into an existing zone.
    ///
    /// # Panics
    ///
    /// Panics if the zone was not added first.
    #[must_use]
    pub fn with_record(self, zone_id: &str, name: &str, content: &str, ttl: u32) -> Self {
        {
            let mut state = self.lock();
            let id = state.next_id();
            let zone = state
                .zones
                .get_mut(zone_id)
                .unwrap_or_else(|| panic!("zone {zone_id} must be added before its records"));
            zone.records.push(ActualRecord::new(name, content, ttl, id));
        }
        self
    }

    /// Override the TXT content limit.
    #[must_use]
    pub fn with_max_txt_len(mut self, max_txt_len: usize) -> Self {
        self.limits.max_txt_len = max_txt_len;
        self
    }

    /// Cap the TTL the provider accepts.
    #[must_use]
    pub fn with_max_ttl(mut self, max_ttl: u32) -> Self {
        self.limits.max_ttl = Some(max_ttl);
        self
    }

    /// Fail the next `count` listings with a transient error.
    #[must_use]
    pub fn with_list_failures(self, count: u32) -> Self {
        self.lock().list_failures = count;
        self
    }

    /// Reject every edit targeting `name` with an API error.
    #[must_use]
    pub fn with_rejected_name(mut self, name: &str) -> Self {
        self.rejected_names.insert(normalize_name(name));
        self
    }

    /// Run `hook` at the start of every edit, before it is applied.
    #[must_use]
    pub fn with_apply_hook(mut self, hook: impl Fn(&EditOp) + Send + Sync + 'static) -> Self {
        self.apply_hook = Some(Box::new(hook));
        self
    }

    /// Snapshot of the records in a zone, sorted by name then id.
    #[must_use]
    pub fn records(&self, zone_id: &str) -> Vec<ActualRecord> {
        let mut records = self
            .lock()
            .zones
            .get(zone_id)
            .map(|z| z.records.clone())
            .unwrap_or_default();
        records.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
        records
    }

    /// Number of `apply_edit` calls received, successful or not.
    #[must_use]
    pub fn mutation_calls(&self) -> u32 {
        self.lock().mutation_calls
    }

    /// Number of `list_records` calls received.
    #[must_use]
    pub fn list_calls(&self) -> u32 {
        self.lock().list_calls
    }

    /// Edits applied successfully, in application order.
    #[must_use]
    pub fn applied(&self) -> Vec<EditOp> {
        self.lock().applied.clone()
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        // A poisoned lock only means a test hook panicked; the state is still usable.
        self.state
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

#[async_trait::async_trait]
impl DnsProvider for MemoryProvider {
    fn name(&self) -> &'static str {
        "memory"
    }

    fn limits(&self) -> ProviderLimits {
        self.limits
    }

    async fn zone_id_by_name(&self, name: &str) -> Result<String, ProviderError> {
        let name = normalize_name(name);
        self.lock()
            .zones
            .values()
            .find(|z| z.details.name == name)
            .map(|z| z.details.id.clone())
            .ok_or_else(|| ProviderError::NotFound {
                resource: format!("zone named '{name}'"),
            })
    }

    async fn zone_details(&self, zone_id: &str) -> Result<ZoneDetails, ProviderError> {
        self.lock()
            .zones
            .get(zone_id)
            .map(|z| z.details.clone())
            .ok_or_else(|| zone_not_found(zone_id))
    }

    async fn list_records(
        &self,
        zone_id: &str,
        domain: &str,
    ) -> Result<ActualRecordSet, ProviderError> {
        let mut state = self.lock();
        state.list_calls += 1;
        if state.list_failures > 0 {
            state.list_failures -= 1;
            return Err(ProviderError::Transient {
                operation: "list records".into(),
                reason: "injected failure".into(),
            });
        }

        let domain = normalize_name(domain);
        let zone = state.zone_mut(zone_id)?;
        Ok(zone
            .records
            .iter()
            .filter(|r| is_within(&r.name, &domain))
            .cloned()
            .collect())
    }

    async fn apply_edit(&self, zone_id: &str, op: &EditOp) -> Result<(), ProviderError> {
        if let Some(hook) = &self.apply_hook {
            hook(op);
        }

        let mut state = self.lock();
        state.mutation_calls += 1;

        check_payload(op, self.limits.max_txt_len)?;
        if let (Some(ttl), Some(max)) = (op.ttl(), self.limits.max_ttl) {
            if ttl > max {
                return Err(ProviderError::Api {
                    operation: format!("{} {}", op.kind(), op.name()),
                    status: 400,
                    message: format!("TTL {ttl} exceeds maximum {max}"),
                });
            }
        }
        if self.rejected_names.contains(op.name()) {
            return Err(ProviderError::Api {
                operation: format!("{} {}", op.kind(), op.name()),
                status: 400,
                message: "rejected by provider".into(),
            });
        }

        let new_id = state.next_id();
        let zone = state.zone_mut(zone_id)?;
        match op {
            EditOp::Create { name, content, ttl } => {
                zone.records
                    .push(ActualRecord::new(name, content.clone(), *ttl, new_id));
            }
            EditOp::Update {
                record_id,
                content,
                ttl,
                ..
            } => {
                let record = zone
                    .records
                    .iter_mut()
                    .find(|r| &r.id == record_id)
                    .ok_or_else(|| record_not_found(record_id))?;
                record.content.clone_from(content);
                record.ttl = *ttl;
            }
            EditOp::Delete { record_id, .. } => {
                let index = zone
                    .records
                    .iter()
                    .position(|r| &r.id == record_id)
                    .ok_or_else(|| record_not_found(record_id))?;
                zone.records.remove(index);
            }
        }

        debug!(zone_id = %zone_id, op = %op, "Applied edit to in-memory zone");
        state.applied.push(op.clone());
        Ok(())
    }
}

fn zone_not_found(zone_id: &str) -> ProviderError {
    ProviderError::NotFound {
        resource: format!("zone {zone_id}"),
    }
}

fn record_not_found(record_id: &str) -> ProviderError {
    ProviderError::NotFound {
        resource: format!("record {record_id}"),
    }
}

#[cfg(test)]
#[path = "memory_tests.rs"]
mod memory_tests;
