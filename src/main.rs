// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

use anyhow::{Context, Result};
use clap::Parser;
use dnsdisc_deploy::{
    cli::{Cli, Command, DeployArgs, LogFormat, OutputFormat},
    constants::TOKIO_WORKER_THREADS,
    deploy::Deployer,
    provider::CloudflareProvider,
    tree::{RecordSource, TxtRecordsFile},
};
use std::process::ExitCode;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(TOKIO_WORKER_THREADS)
        .thread_name("dnsdisc-deploy")
        .enable_all()
        .build()?;

    runtime.block_on(async_main(cli))
}

async fn async_main(cli: Cli) -> Result<ExitCode> {
    // RUST_LOG selects the level (default INFO), --log-format or RUST_LOG_FORMAT the layout.
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    match cli.log_format {
        LogFormat::Json => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_file(true)
                .with_line_number(true)
                .with_thread_names(true)
                .with_target(false)
                .with_writer(std::io::stderr)
                .json()
                .init();
        }
        LogFormat::Text => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_file(true)
                .with_line_number(true)
                .with_thread_names(true)
                .with_target(false)
                .with_writer(std::io::stderr)
                .with_ansi(true)
                .compact()
                .init();
        }
    }

    debug!("Logging initialized with file and line number tracking");

    match cli.command {
        Command::Deploy(args) => run_deploy(args).await,
    }
}

async fn run_deploy(args: DeployArgs) -> Result<ExitCode> {
    let cloudflare = args
        .cloudflare_config()
        .context("a Cloudflare API token is required (--token or CLOUDFLARE_API_TOKEN)")?;
    let config = args.deploy_config().context("invalid deployment settings")?;

    let desired = TxtRecordsFile::load(&args.records)?
        .to_record_set(&args.domain)
        .with_context(|| {
            format!(
                "cannot deploy {} to {}",
                args.records.display(),
                args.domain
            )
        })?;
    info!(domain = %desired.domain(), records = desired.len(), "Loaded discovery tree");

    let provider = Arc::new(CloudflareProvider::new(&cloudflare)?);
    let deployer = Deployer::new(provider, config)?;

    if args.dry_run {
        return match deployer.plan(&args.domain, &desired).await {
            Ok(plan) => {
                match args.output {
                    OutputFormat::Json => {
                        println!("{}", serde_json::to_string_pretty(&plan.script)?);
                    }
                    OutputFormat::Text => {
                        println!(
                            "Plan for {} in zone {}: {} create(s), {} update(s), {} delete(s)",
                            desired.domain(),
                            plan.zone.id,
                            plan.script.creates(),
                            plan.script.updates(),
                            plan.script.deletes()
                        );
                        for op in plan.script.ops() {
                            println!("  {op}");
                        }
                    }
                }
                Ok(ExitCode::SUCCESS)
            }
            Err(failure) => {
                error!(stage = %failure.stage, error = %failure.cause, "Dry run failed");
                Ok(ExitCode::FAILURE)
            }
        };
    }

    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received, finishing in-flight edits");
            on_signal.cancel();
        }
    });

    let report = deployer
        .deploy_with_cancel(&args.domain, &desired, &cancel)
        .await;

    match args.output {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Text => println!("{report}"),
    }

    Ok(if report.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
