//! CLI command definitions

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Report format for the sync summary
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ReportFormat {
    /// Human-readable summary
    Summary,
    /// JSON report
    Json,
}

/// Transport mode override for the tool-server
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum TransportArg {
    /// Fresh tool-server process per exchange
    OneShot,
    /// One long-lived tool-server process
    Persistent,
    /// HTTP-fronted tool-server
    Http,
}

/// CLI arguments for repoharvest
#[derive(Parser, Debug)]
#[command(name = "repoharvest")]
#[command(author, version, about = "Sync GitHub repository content into a local page store")]
#[command(long_about = r#"
repoharvest drives an external GitHub tool-server to pull a repository's
documentation, issues, and pull requests into a JSONL page store.

The tool-server is launched as a child process and spoken to over
newline-delimited JSON. Configure the launch command in harvest.toml; the
GitHub credential is taken from GITHUB_TOKEN and injected through the
child's environment.

Configuration files are loaded from (in priority order):
1. --config <path>     Explicit config file
2. HARVEST_* env vars  e.g. HARVEST_SERVER__MODE=persistent
3. ./harvest.toml      Project-level config
4. ~/.config/repoharvest/config.toml   Global config

Example:
  repoharvest acme/widgets
  repoharvest https://github.com/acme/widgets --issues --pull-requests
  repoharvest acme/widgets -b develop --transport persistent -o pages.jsonl
"#)]
pub struct Cli {
    /// Repository to sync: a GitHub URL or `owner/repo` (not required with --show-config)
    pub repository: Option<String>,

    /// Include issues in the sync
    #[arg(long)]
    pub issues: bool,

    /// Include pull requests in the sync
    #[arg(long)]
    pub pull_requests: bool,

    /// Branch to sync (overrides the URL and the default `main`)
    #[arg(short, long, value_name = "BRANCH")]
    pub branch: Option<String>,

    /// Tool-server transport mode override
    #[arg(long, value_enum, value_name = "MODE")]
    pub transport: Option<TransportArg>,

    /// Maximum concurrent file fetches
    #[arg(long, value_name = "N")]
    pub max_concurrent: Option<usize>,

    /// Output file for synced pages (JSONL)
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Report format
    #[arg(short, long, value_enum, default_value = "summary")]
    pub report: ReportFormat,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress progress indicators
    #[arg(short, long)]
    pub quiet: bool,

    /// Path to configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long)]
    pub no_config: bool,

    /// Show configuration file locations and exit
    #[arg(long)]
    pub show_config: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_minimal_invocation() {
        let cli = Cli::try_parse_from(["repoharvest", "acme/widgets"]).unwrap();
        assert_eq!(cli.repository.as_deref(), Some("acme/widgets"));
        assert!(!cli.issues);
        assert!(!cli.pull_requests);
    }

    #[test]
    fn parses_full_invocation() {
        let cli = Cli::try_parse_from([
            "repoharvest",
            "https://github.com/acme/widgets",
            "--issues",
            "--pull-requests",
            "-b",
            "develop",
            "--transport",
            "persistent",
            "-vv",
        ])
        .unwrap();

        assert!(cli.issues);
        assert!(cli.pull_requests);
        assert_eq!(cli.branch.as_deref(), Some("develop"));
        assert!(matches!(cli.transport, Some(TransportArg::Persistent)));
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn show_config_needs_no_repository() {
        let cli = Cli::try_parse_from(["repoharvest", "--show-config"]).unwrap();
        assert!(cli.repository.is_none());
        assert!(cli.show_config);
    }
}
