//! CLI entrypoint for repoharvest
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Result, bail};
use clap::Parser;
use harvest_application::{SyncRepositoryInput, SyncRepositoryUseCase};
use harvest_domain::RepoRef;
use harvest_infrastructure::{ConfigLoader, GitHubToolClient, JsonlPageStore, TransportMode};
use harvest_presentation::{Cli, ConsoleFormatter, ProgressReporter, ReportFormat, TransportArg};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity level
    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"), // -vvv or more
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    if cli.show_config {
        ConfigLoader::print_config_sources();
        return Ok(());
    }

    info!("Starting repoharvest");

    // Load configuration, then apply CLI overrides
    let mut config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_ref())?
    };

    for issue in config.validate() {
        warn!("Config: {}", issue);
    }

    if let Some(transport) = cli.transport {
        config.server.mode = match transport {
            TransportArg::OneShot => TransportMode::OneShot,
            TransportArg::Persistent => TransportMode::Persistent,
            TransportArg::Http => TransportMode::Http,
        };
    }
    if let Some(bound) = cli.max_concurrent {
        config.sync.max_concurrent = bound;
    }
    if let Some(path) = &cli.output {
        config.storage.output_path = path.clone();
    }
    if cli.issues {
        config.sync.include_issues = true;
    }
    if cli.pull_requests {
        config.sync.include_pull_requests = true;
    }

    // Repository argument
    let Some(repository) = cli.repository else {
        bail!("Repository is required. Pass a GitHub URL or owner/repo.");
    };
    let mut repo = RepoRef::parse(&repository)?;
    if let Some(branch) = cli.branch {
        repo = repo.with_branch(branch);
    }

    // === Dependency Injection ===
    // Create infrastructure adapters (tool client + page store)
    let client = Arc::new(GitHubToolClient::new(config.to_client_config()));
    if client.is_degraded() && !cli.quiet {
        eprintln!("warning: tool-server binary not found; canned results will be served");
    }

    let store = Arc::new(JsonlPageStore::new(&config.storage.output_path)?);
    let output_path = store.path().to_path_buf();

    if !cli.quiet {
        println!();
        println!("Repository: {}", repo);
        println!("Output:     {}", output_path.display());
        println!();
    }

    // Create use case with injected adapters
    let use_case = SyncRepositoryUseCase::new(client.clone(), store);

    let input = SyncRepositoryInput {
        repo,
        include_issues: config.sync.include_issues,
        include_pull_requests: config.sync.include_pull_requests,
        max_concurrent: config.sync.max_concurrent.max(1),
    };

    // Execute with or without progress reporting
    let result = if cli.quiet {
        use_case.execute(input).await
    } else {
        let progress = ProgressReporter::new();
        use_case.execute_with_progress(input, &progress).await
    };

    // Release the persistent session (if any) regardless of the outcome
    client.shutdown().await;

    let report = result?;

    // Output results
    let output = match cli.report {
        ReportFormat::Summary => ConsoleFormatter::format(&report),
        ReportFormat::Json => ConsoleFormatter::format_json(&report),
    };
    println!("{}", output);

    if !cli.quiet {
        println!("Pages written to {}", output_path.display());
    }

    Ok(())
}
