// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for `cli.rs`

#[cfg(test)]
mod tests {
    use super::super::{Cli, Command, LogFormat, OutputFormat};
    use crate::dns_errors::ConfigError;
    use clap::{CommandFactory, Parser};
    use std::time::Duration;

    fn parse(args: &[&str]) -> Cli {
        let mut argv = vec!["dnsdisc-deploy"];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_deploy_defaults() {
        let cli = parse(&[
            "deploy",
            "--domain",
            "nodes.example.org",
            "--records",
            "tree.json",
            "--token",
            "secret",
        ]);
        let Command::Deploy(args) = cli.command;

        assert_eq!(args.domain, "nodes.example.org");
        assert!(!args.dry_run);
        assert_eq!(args.output, OutputFormat::Text);

        let config = args.deploy_config().unwrap();
        assert_eq!(config.concurrency, 4);
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert_eq!(config.ttl.root_ttl, 1800);
        assert_eq!(config.ttl.node_ttl, 2_419_200);
        assert_eq!(config.zone_id, None);

        let cf = args.cloudflare_config().unwrap();
        assert_eq!(cf.api_token, "secret");
    }

    #[test]
    fn test_deploy_overrides() {
        let cli = parse(&[
            "--log-format",
            "json",
            "deploy",
            "--domain",
            "nodes.example.org",
            "--records",
            "tree.json",
            "--token",
            "secret",
            "--zone-id",
            "z1",
            "--concurrency",
            "8",
            "--timeout-secs",
            "5",
            "--fetch-attempts",
            "5",
            "--root-ttl",
            "60",
            "--node-ttl",
            "3600",
            "--dry-run",
            "--output",
            "json",
        ]);
        assert_eq!(cli.log_format, LogFormat::Json);
        let Command::Deploy(args) = cli.command;
        assert!(args.dry_run);
        assert_eq!(args.output, OutputFormat::Json);

        let config = args.deploy_config().unwrap();
        assert_eq!(config.zone_id.as_deref(), Some("z1"));
        assert_eq!(config.concurrency, 8);
        assert_eq!(config.fetch_attempts, 5);
        assert_eq!(config.request_timeout, Duration::from_secs(5));
        assert_eq!(config.ttl.root_ttl, 60);
        assert_eq!(config.ttl.node_ttl, 3600);
    }

    #[test]
    fn test_blank_token_is_missing() {
        let cli = parse(&[
            "deploy",
            "--domain",
            "nodes.example.org",
            "--records",
            "tree.json",
            "--token",
            "  ",
        ]);
        let Command::Deploy(args) = cli.command;
        assert_eq!(
            args.cloudflare_config().err(),
            Some(ConfigError::Missing("api_token"))
        );
    }

    #[test]
    fn test_invalid_values_rejected() {
        let cli = parse(&[
            "deploy",
            "--domain",
            "nodes.example.org",
            "--records",
            "tree.json",
            "--concurrency",
            "0",
        ]);
        let Command::Deploy(args) = cli.command;
        assert!(args.deploy_config().is_err());
    }

    #[test]
    fn test_domain_is_required() {
        assert!(Cli::try_parse_from(["dnsdisc-deploy", "deploy", "--records", "t.json"]).is_err());
    }
}
