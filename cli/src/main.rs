//! # Stacks Main Entry Point
//!
//! File: cli/src/main.rs
//!
//! ## Overview
//!
//! Entry point for the Stacks project-scaffolding CLI. It handles:
//! - Command-line argument parsing using Clap
//! - Setting up the logging system based on verbosity flags
//! - Routing execution to the command handlers
//!
//! ## Examples
//!
//! ```bash
//! # Get help
//! stacks --help
//!
//! # Scaffold the projects in ./stacks.toml with progress output
//! stacks -v scaffold
//!
//! # Check a tool version against a constraint
//! stacks version-check --version "$(dotnet --version)" --dotnet 8.0.100 --roll-forward latestFeature
//! ```
//!
//! Command processing flow:
//! 1. Parse command-line args via Clap
//! 2. Configure logging based on verbosity level (`RUST_LOG` takes precedence)
//! 3. Route to the command handler
//! 4. Print any error and exit with status 1
//!
use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

mod commands; // Command handlers (scaffold, version-check, sample-config)
mod common; // Shared utilities (download, fs, process, etc.)
mod core; // Core infrastructure (config, errors, templating, versions)

/// Top-level command-line arguments.
#[derive(Parser, Debug)]
#[command(
    name = "stacks",
    about = "🧱 Stacks: scaffold projects from versioned templates",
    long_about = "Fetch template repositories or packages, check tool versions, run templated\n\
                  operations and prepare CI pipelines for every project in a configuration file.",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

/// All available top-level commands.
#[derive(Parser, Debug)]
enum Commands {
    /// Scaffold every project declared in the configuration
    #[command(alias = "s")]
    Scaffold(commands::scaffold::ScaffoldArgs),
    /// Evaluate a version against a semver range or .NET roll-forward constraint
    VersionCheck(commands::version_check::VersionCheckArgs),
    /// Print an example configuration file
    SampleConfig(commands::sample_config::SampleConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));
    fmt::Subscriber::builder()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();

    tracing::debug!("Parsed CLI arguments: {:?}", cli);

    let command_result = match cli.command {
        Commands::Scaffold(args) => commands::scaffold::handle_scaffold(args).await,
        Commands::VersionCheck(args) => {
            commands::version_check::handle_version_check(args).await
        }
        Commands::SampleConfig(args) => commands::sample_config::handle_sample_config(args).await,
    };

    if let Err(e) = command_result {
        tracing::error!("Command execution failed: {:?}", e);
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }

    Ok(())
}
