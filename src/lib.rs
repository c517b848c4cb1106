// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! # dnsdisc-deploy - DNS discovery tree publisher
//!
//! Publishes an EIP-1459 node discovery tree as DNS TXT records through a DNS hosting
//! provider's API, converging the zone to exactly the tree's records.
//!
//! ## Overview
//!
//! A deployment is a reconciliation:
//!
//! 1. Confirm the provider credential may read and edit the zone covering the domain
//! 2. List the TXT records currently served under the domain
//! 3. Diff them against the tree's records into a minimal edit script
//! 4. Apply the script, recording the result of every edit
//!
//! Records outside the domain are never touched, and re-running a deployment against an
//! up-to-date zone changes nothing.
//!
//! ## Modules
//!
//! - [`authorization`] - Zone lookup and permission checks
//! - [`diff`] - Edit script computation
//! - [`deploy`] - Staged deployment orchestrator
//! - [`provider`] - Provider trait with Cloudflare and in-memory backends
//! - [`records`] - Desired and actual record sets, edit operations
//! - [`tree`] - Loading tree records from files
//! - [`report`] - Deployment reports
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use dnsdisc_deploy::config::DeployConfig;
//! use dnsdisc_deploy::deploy::Deployer;
//! use dnsdisc_deploy::provider::MemoryProvider;
//! use dnsdisc_deploy::records::DesiredRecordSet;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let provider = Arc::new(
//!     MemoryProvider::new().with_zone("z1", "example.org", &["#zone:read", "#zone:edit"]),
//! );
//! let deployer = Deployer::new(provider, DeployConfig::default())?;
//!
//! let desired = DesiredRecordSet::new(
//!     "nodes.example.org",
//!     [("nodes.example.org", "enrtree-root:v1 e=AAA l=BBB seq=1 sig=x")],
//! )?;
//! let report = deployer.deploy("nodes.example.org", &desired).await;
//! assert!(report.is_success());
//! # Ok(())
//! # }
//! ```

pub mod authorization;
pub mod cli;
pub mod config;
pub mod constants;
pub mod deploy;
pub mod diff;
pub mod dns_errors;
pub mod names;
pub mod provider;
pub mod records;
pub mod report;
pub mod retry;
pub mod tree;
