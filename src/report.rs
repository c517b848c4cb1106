// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Deployment report.
//!
//! A [`DeployReport`] is produced by every deployment, successful or not. It records
//! which stage the run reached, what was planned, and the result of every edit
//! operation, and serializes to JSON for machine consumption.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::dns_errors::{DeployError, ProviderError};
use crate::records::EditOp;

/// Stages of a deployment, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DeployStage {
    Authorizing,
    Fetching,
    Diffing,
    Applying,
    Done,
}

impl fmt::Display for DeployStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Authorizing => "Authorizing",
            Self::Fetching => "Fetching",
            Self::Diffing => "Diffing",
            Self::Applying => "Applying",
            Self::Done => "Done",
        };
        f.write_str(s)
    }
}

/// Terminal state of a deployment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum DeployOutcome {
    /// All stages completed and every edit was applied
    Done,
    /// The run stopped in `stage`
    Failed {
        /// Stage in which the run stopped
        stage: DeployStage,
        /// Why it stopped
        cause: DeployError,
    },
}

/// An edit operation the provider rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailedOp {
    pub op: EditOp,
    pub error: ProviderError,
}

/// Result of one deployment run.
#[derive(Debug, Clone, Serialize)]
pub struct DeployReport {
    /// Deployed domain (normalized)
    pub domain: String,
    /// Zone the records were published into, once authorized
    pub zone_id: Option<String>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    /// SHA-256 digest of the desired record set
    pub desired_digest: String,
    /// Number of operations in the edit script
    pub planned: usize,
    /// Operations applied successfully
    pub applied: Vec<EditOp>,
    /// Operations the provider rejected
    pub failed: Vec<FailedOp>,
    /// Operations never dispatched because the run was cancelled
    pub skipped: Vec<EditOp>,
    pub outcome: DeployOutcome,
}

impl DeployReport {
    pub(crate) fn started(domain: &str, desired_digest: String) -> Self {
        let now = Utc::now();
        Self {
            domain: domain.to_string(),
            zone_id: None,
            started_at: now,
            finished_at: now,
            desired_digest,
            planned: 0,
            applied: Vec::new(),
            failed: Vec::new(),
            skipped: Vec::new(),
            outcome: DeployOutcome::Done,
        }
    }

    pub(crate) fn finish(mut self, outcome: DeployOutcome) -> Self {
        self.finished_at = Utc::now();
        self.outcome = outcome;
        self
    }

    pub(crate) fn fail(self, stage: DeployStage, cause: impl Into<DeployError>) -> Self {
        self.finish(DeployOutcome::Failed {
            stage,
            cause: cause.into(),
        })
    }

    /// Returns true if the run reached `Done`.
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self.outcome, DeployOutcome::Done)
    }

    /// Stage the run stopped in, or [`DeployStage::Done`].
    #[must_use]
    pub fn stage(&self) -> DeployStage {
        match &self.outcome {
            DeployOutcome::Done => DeployStage::Done,
            DeployOutcome::Failed { stage, .. } => *stage,
        }
    }

    /// Number of records created.
    #[must_use]
    pub fn created(&self) -> usize {
        self.count_applied(|op| matches!(op, EditOp::Create { .. }))
    }

    /// Number of records updated.
    #[must_use]
    pub fn updated(&self) -> usize {
        self.count_applied(|op| matches!(op, EditOp::Update { .. }))
    }

    /// Number of records deleted.
    #[must_use]
    pub fn deleted(&self) -> usize {
        self.count_applied(|op| matches!(op, EditOp::Delete { .. }))
    }

    fn count_applied(&self, pred: impl Fn(&EditOp) -> bool) -> usize {
        self.applied.iter().filter(|op| pred(op)).count()
    }
}

impl fmt::Display for DeployReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.outcome {
            DeployOutcome::Done => writeln!(f, "Deployment of {} succeeded", self.domain)?,
            DeployOutcome::Failed { stage, cause } => writeln!(
                f,
                "Deployment of {} failed during {stage} ({}): {cause}",
                self.domain,
                cause.status_reason()
            )?,
        }
        if let Some(zone_id) = &self.zone_id {
            writeln!(f, "  zone:     {zone_id}")?;
        }
        writeln!(f, "  digest:   {}", self.desired_digest)?;
        writeln!(
            f,
            "  planned:  {}, created: {}, updated: {}, deleted: {}",
            self.planned,
            self.created(),
            self.updated(),
            self.deleted()
        )?;
        for failed in &self.failed {
            writeln!(f, "  failed:   {} ({})", failed.op, failed.error)?;
        }
        for op in &self.skipped {
            writeln!(f, "  skipped:  {op}")?;
        }
        let elapsed = self.finished_at - self.started_at;
        write!(f, "  elapsed:  {}ms", elapsed.num_milliseconds())
    }
}

#[cfg(test)]
#[path = "report_tests.rs"]
mod report_tests;
