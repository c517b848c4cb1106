// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Deployment orchestrator.
//!
//! A deployment runs through fixed stages:
//!
//! ```text
//! Authorizing -> Fetching -> Diffing -> Applying -> Done
//! ```
//!
//! Any stage may instead end the run in `Failed(stage, cause)`. Nothing is written to
//! the provider unless authorization succeeded. Listing records is retried on
//! transient errors. During Applying every edit is attempted even if others fail,
//! with at most `concurrency` edits in flight, and the outcome of each is recorded in
//! the [`DeployReport`].
//!
//! There is no rollback. Re-running a failed deployment converges, because the diff is
//! recomputed from the records the provider actually serves.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use futures::{future, stream, StreamExt};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::authorization::{check_zone, Zone};
use crate::config::DeployConfig;
use crate::diff::diff;
use crate::dns_errors::{AuthorizationError, ConfigError, DeployError, ProviderError};
use crate::names::normalize_name;
use crate::provider::{DnsProvider, ProviderLimits, ZoneDetails};
use crate::records::{ActualRecordSet, DesiredRecordSet, EditOp, EditScript, TtlPolicy};
use crate::report::{DeployOutcome, DeployReport, DeployStage, FailedOp};
use crate::retry::retry_provider_call;

/// Authorized zone and the edits needed to converge it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployPlan {
    /// Zone the records are published into
    pub zone: Zone,
    /// Effective TTL policy after provider limits
    pub ttl: TtlPolicy,
    /// Edits to apply, in order
    pub script: EditScript,
}

/// A stage that ended the run.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{stage} failed: {cause}")]
pub struct StageFailure {
    pub stage: DeployStage,
    pub cause: DeployError,
    /// Zone id, if authorization got far enough to know it
    pub zone_id: Option<String>,
}

impl StageFailure {
    fn new(stage: DeployStage, cause: impl Into<DeployError>) -> Self {
        Self {
            stage,
            cause: cause.into(),
            zone_id: None,
        }
    }

    fn in_zone(mut self, zone: &Zone) -> Self {
        self.zone_id = Some(zone.id.clone());
        self
    }
}

/// Publishes desired record sets through a [`DnsProvider`].
pub struct Deployer {
    provider: Arc<dyn DnsProvider>,
    config: DeployConfig,
}

impl Deployer {
    /// Create a deployer.
    ///
    /// # Errors
    ///
    /// Returns an error if `config` does not validate.
    pub fn new(provider: Arc<dyn DnsProvider>, config: DeployConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { provider, config })
    }

    #[must_use]
    pub fn config(&self) -> &DeployConfig {
        &self.config
    }

    /// Configured TTL policy clamped to what the provider accepts.
    #[must_use]
    pub fn ttl_policy(&self) -> TtlPolicy {
        self.config.ttl.clamped(self.provider.limits().max_ttl)
    }

    /// Deploy `desired` at `name`.
    pub async fn deploy(&self, name: &str, desired: &DesiredRecordSet) -> DeployReport {
        self.deploy_with_cancel(name, desired, &CancellationToken::new())
            .await
    }

    /// Deploy `desired` at `name`, stopping early once `cancel` fires.
    ///
    /// Edits already sent to the provider are allowed to finish. Edits not yet sent are
    /// listed in [`DeployReport::skipped`] and the run fails with
    /// [`DeployError::Cancelled`].
    pub async fn deploy_with_cancel(
        &self,
        name: &str,
        desired: &DesiredRecordSet,
        cancel: &CancellationToken,
    ) -> DeployReport {
        let mut report = DeployReport::started(&normalize_name(name), desired.digest());
        info!(
            domain = %report.domain,
            provider = self.provider.name(),
            records = desired.len(),
            digest = %report.desired_digest,
            "Starting deployment"
        );

        let plan = match self.prepare(name, desired, cancel).await {
            Ok(plan) => plan,
            Err(failure) => {
                error!(
                    domain = %report.domain,
                    stage = %failure.stage,
                    reason = failure.cause.status_reason(),
                    error = %failure.cause,
                    "Deployment failed"
                );
                report.zone_id = failure.zone_id;
                return report.fail(failure.stage, failure.cause);
            }
        };

        report.zone_id = Some(plan.zone.id.clone());
        report.planned = plan.script.len();

        if plan.script.is_empty() {
            info!(domain = %report.domain, zone_id = %plan.zone.id, "Records already up to date");
            return report.finish(DeployOutcome::Done);
        }

        self.apply(&plan.zone, plan.script, cancel, report).await
    }

    /// Run Authorizing, Fetching and Diffing without applying anything.
    ///
    /// # Errors
    ///
    /// Returns the stage that failed and why.
    pub async fn plan(
        &self,
        name: &str,
        desired: &DesiredRecordSet,
    ) -> Result<DeployPlan, StageFailure> {
        self.prepare(name, desired, &CancellationToken::new()).await
    }

    async fn prepare(
        &self,
        name: &str,
        desired: &DesiredRecordSet,
        cancel: &CancellationToken,
    ) -> Result<DeployPlan, StageFailure> {
        let provider = TimeoutProvider {
            inner: self.provider.as_ref(),
            timeout: self.config.request_timeout,
        };

        // Authorizing
        ensure_not_cancelled(cancel, DeployStage::Authorizing)?;
        let normalized = normalize_name(name);
        if normalized != desired.domain() {
            return Err(StageFailure::new(
                DeployStage::Authorizing,
                AuthorizationError::InvalidName {
                    name: name.to_string(),
                    reason: format!("record set was built for '{}'", desired.domain()),
                },
            ));
        }
        let zone = check_zone(&normalized, self.config.zone_id.as_deref(), &provider)
            .await
            .map_err(|e| StageFailure::new(DeployStage::Authorizing, e))?;

        // Fetching
        ensure_not_cancelled(cancel, DeployStage::Fetching).map_err(|f| f.in_zone(&zone))?;
        let fetch = retry_provider_call(
            || provider.list_records(&zone.id, &normalized),
            "list records",
            self.config.fetch_attempts,
            self.config.retry_initial_interval,
        );
        // Listing is read-only, so an interrupted fetch or backoff sleep can be dropped.
        let fetched = tokio::select! {
            biased;
            () = cancel.cancelled() => {
                return Err(StageFailure::new(
                    DeployStage::Fetching,
                    DeployError::Cancelled { skipped: 0 },
                )
                .in_zone(&zone));
            }
            result = fetch => result,
        };
        let actual = fetched.map_err(|failure| {
            StageFailure::new(
                DeployStage::Fetching,
                DeployError::Fetch {
                    attempts: failure.attempts,
                    source: failure.error,
                },
            )
            .in_zone(&zone)
        })?;
        debug!(
            zone_id = %zone.id,
            served = actual.len(),
            surplus = actual.surplus().len(),
            "Fetched records"
        );

        // Diffing
        let ttl = self.ttl_policy();
        if ttl != self.config.ttl {
            info!(
                provider = self.provider.name(),
                root_ttl = ttl.root_ttl,
                node_ttl = ttl.node_ttl,
                "TTLs clamped to provider maximum"
            );
        }
        let script = diff(desired, &actual, &ttl);
        info!(
            zone_id = %zone.id,
            creates = script.creates(),
            updates = script.updates(),
            deletes = script.deletes(),
            "Computed edit script"
        );

        Ok(DeployPlan { zone, ttl, script })
    }

    async fn apply(
        &self,
        zone: &Zone,
        script: EditScript,
        cancel: &CancellationToken,
        mut report: DeployReport,
    ) -> DeployReport {
        let provider = TimeoutProvider {
            inner: self.provider.as_ref(),
            timeout: self.config.request_timeout,
        };
        let provider = &provider;
        let zone_id = zone.id.as_str();
        let ops = script.into_ops();
        let total = ops.len();

        let mut results: Vec<(usize, Result<(), ProviderError>)> =
            stream::iter(ops.iter().enumerate())
                .take_while(|_| future::ready(!cancel.is_cancelled()))
                .map(|(index, op)| async move {
                    let result = provider.apply_edit(zone_id, op).await;
                    match &result {
                        Ok(()) => debug!(zone_id = %zone_id, op = %op, "Edit applied"),
                        Err(e) => warn!(
                            zone_id = %zone_id,
                            op = %op,
                            reason = e.status_reason(),
                            error = %e,
                            "Edit failed"
                        ),
                    }
                    (index, result)
                })
                .buffer_unordered(self.config.concurrency)
                .collect()
                .await;
        results.sort_by_key(|(index, _)| *index);

        let mut dispatched = vec![false; total];
        for (index, result) in results {
            dispatched[index] = true;
            let op = ops[index].clone();
            match result {
                Ok(()) => report.applied.push(op),
                Err(error) => report.failed.push(FailedOp { op, error }),
            }
        }
        report.skipped = ops
            .into_iter()
            .zip(dispatched)
            .filter_map(|(op, sent)| (!sent).then_some(op))
            .collect();

        if !report.skipped.is_empty() {
            warn!(
                zone_id = %zone_id,
                applied = report.applied.len(),
                skipped = report.skipped.len(),
                "Deployment cancelled"
            );
            let skipped = report.skipped.len();
            return report.fail(DeployStage::Applying, DeployError::Cancelled { skipped });
        }

        if !report.failed.is_empty() {
            error!(
                zone_id = %zone_id,
                failed = report.failed.len(),
                total = total,
                "Some edits failed"
            );
            let failed = report.failed.len();
            return report.fail(DeployStage::Applying, DeployError::Apply { failed, total });
        }

        info!(
            zone_id = %zone_id,
            created = report.created(),
            updated = report.updated(),
            deleted = report.deleted(),
            "Deployment complete"
        );
        report.finish(DeployOutcome::Done)
    }
}

fn ensure_not_cancelled(
    cancel: &CancellationToken,
    stage: DeployStage,
) -> Result<(), StageFailure> {
    if cancel.is_cancelled() {
        return Err(StageFailure::new(stage, DeployError::Cancelled { skipped: 0 }));
    }
    Ok(())
}

/// Wraps every provider call in the configured request timeout.
struct TimeoutProvider<'a> {
    inner: &'a dyn DnsProvider,
    timeout: Duration,
}

impl TimeoutProvider<'_> {
    async fn bounded<T>(
        &self,
        operation: &str,
        call: impl Future<Output = Result<T, ProviderError>> + Send,
    ) -> Result<T, ProviderError> {
        match tokio::time::timeout(self.timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(ProviderError::Timeout {
                operation: operation.to_string(),
                timeout_ms: u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX),
            }),
        }
    }
}

#[async_trait::async_trait]
impl DnsProvider for TimeoutProvider<'_> {
    fn name(&self) -> &'static str {
        self.inner.name()
    }

    fn limits(&self) -> ProviderLimits {
        self.inner.limits()
    }

    async fn zone_id_by_name(&self, name: &str) -> Result<String, ProviderError> {
        self.bounded("zone lookup", self.inner.zone_id_by_name(name))
            .await
    }

    async fn zone_details(&self, zone_id: &str) -> Result<ZoneDetails, ProviderError> {
        self.bounded("zone details", self.inner.zone_details(zone_id))
            .await
    }

    async fn list_records(
        &self,
        zone_id: &str,
        domain: &str,
    ) -> Result<ActualRecordSet, ProviderError> {
        self.bounded("list records", self.inner.list_records(zone_id, domain))
            .await
    }

    async fn apply_edit(&self, zone_id: &str, op: &EditOp) -> Result<(), ProviderError> {
        let operation = format!("{} {}", op.kind(), op.name());
        self.bounded(&operation, self.inner.apply_edit(zone_id, op))
            .await
    }
}

#[cfg(test)]
#[path = "deploy_tests.rs"]
mod deploy_tests;
