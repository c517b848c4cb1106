// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Command-line interface definitions.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::config::{CloudflareConfig, DeployConfig};
use crate::constants::{
    CLOUDFLARE_API_URL, CLOUDFLARE_TOKEN_ENV, DEFAULT_APPLY_CONCURRENCY, DEFAULT_FETCH_ATTEMPTS,
    DEFAULT_NODE_TTL_SECS, DEFAULT_REQUEST_TIMEOUT_SECS, DEFAULT_ROOT_TTL_SECS,
};
use crate::dns_errors::ConfigError;
use crate::records::TtlPolicy;

/// Publish an EIP-1459 node discovery tree as DNS TXT records.
#[derive(Parser, Debug)]
#[command(name = "dnsdisc-deploy")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Log output format
    #[arg(long, env = "RUST_LOG_FORMAT", global = true)]
    #[arg(value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Deploy a tree's TXT records to Cloudflare
    Deploy(DeployArgs),
}

#[derive(Args, Debug, Clone)]
pub struct DeployArgs {
    /// Domain the tree is published at
    #[arg(long)]
    pub domain: String,

    /// JSON file mapping record names to TXT content
    #[arg(long)]
    pub records: PathBuf,

    /// Cloudflare API token
    #[arg(long, env = CLOUDFLARE_TOKEN_ENV, hide_env_values = true)]
    pub token: Option<String>,

    /// Cloudflare zone id; looked up from the domain when omitted
    #[arg(long)]
    pub zone_id: Option<String>,

    /// Cloudflare API base URL
    #[arg(long, default_value = CLOUDFLARE_API_URL)]
    pub api_url: String,

    /// Maximum number of record edits in flight
    #[arg(long, default_value_t = DEFAULT_APPLY_CONCURRENCY)]
    pub concurrency: usize,

    /// Timeout for each API call, in seconds
    #[arg(long, default_value_t = DEFAULT_REQUEST_TIMEOUT_SECS)]
    pub timeout_secs: u64,

    /// Attempts made when listing existing records
    #[arg(long, default_value_t = DEFAULT_FETCH_ATTEMPTS)]
    pub fetch_attempts: u32,

    /// TTL of the root record, in seconds
    #[arg(long, default_value_t = DEFAULT_ROOT_TTL_SECS)]
    pub root_ttl: u32,

    /// TTL of branch and leaf records, in seconds
    #[arg(long, default_value_t = DEFAULT_NODE_TTL_SECS)]
    pub node_ttl: u32,

    /// Compute and print the edit script without applying it
    #[arg(long)]
    pub dry_run: bool,

    /// Report format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub output: OutputFormat,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

impl DeployArgs {
    /// Deployment settings from the flags.
    ///
    /// # Errors
    ///
    /// Returns an error if the resulting configuration does not validate.
    pub fn deploy_config(&self) -> Result<DeployConfig, ConfigError> {
        let config = DeployConfig {
            zone_id: self.zone_id.clone(),
            concurrency: self.concurrency,
            request_timeout: Duration::from_secs(self.timeout_secs),
            fetch_attempts: self.fetch_attempts,
            ttl: TtlPolicy {
                root_ttl: self.root_ttl,
                node_ttl: self.node_ttl,
            },
            ..DeployConfig::default()
        };
        config.validate()?;
        Ok(config)
    }

    /// Cloudflare settings from the flags.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Missing`] if no token was given.
    pub fn cloudflare_config(&self) -> Result<CloudflareConfig, ConfigError> {
        let token = self
            .token
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or(ConfigError::Missing("api_token"))?;
        let config = CloudflareConfig::new(token).with_api_url(self.api_url.clone());
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
#[path = "cli_tests.rs"]
mod cli_tests;
