//! # Stacks Scaffold Command (`commands::scaffold`)
//!
//! File: cli/src/commands/scaffold/mod.rs
//!
//! ## Overview
//!
//! `stacks scaffold` materialises every project declared in the configuration:
//! it fetches each project's template, checks the tools it needs, runs its
//! `init` and `setup` operations, writes the CI variable file, applies the
//! pipeline replacements and initialises a git repository.
//!
//! ## Architecture
//!
//! - `project`: runtime project state and the `Stage` enum
//! - `settings`: the template's settings document (`stacks.yml`)
//! - `operation`: templated command / render operations and phases
//! - `framework`: tool version checks
//! - `pipeline`: variable file and pattern replacement
//! - `orchestrator`: the per-project state machine and batch loop
//! - `report`: per-project outcomes and the final summary
//!
//! ## Examples
//!
//! ```bash
//! # Use ./stacks.toml (or stacks.yml)
//! stacks scaffold
//!
//! # Explicit configuration, see what would happen without running anything
//! stacks -v scaffold --config ./payments.toml --dry-run
//!
//! # Log every rendered command to <working>/cmdlog.txt
//! stacks scaffold --cmdlog --working-dir ./out
//! ```
//!
//! Individual project failures are reported in the summary and do not change
//! the exit code. Configuration errors and a failed cleanup of the batch temp
//! directory exit with status 1.
//!
use crate::core::config::{self, Config};
use crate::core::error::{Result, StacksError};
use anyhow::{anyhow, Context};
use clap::Parser;
use std::path::PathBuf;
use tracing::{debug, info};

pub mod framework;
pub mod operation;
pub mod orchestrator;
pub mod pipeline;
pub mod project;
pub mod report;
pub mod settings;

/// Arguments for `stacks scaffold`.
#[derive(Parser, Debug)]
pub struct ScaffoldArgs {
    /// Configuration file (TOML, or YAML by extension).
    #[arg(long, short = 'c', env = "STACKS_CONFIG")]
    config: Option<PathBuf>,

    /// Log what would run without executing operations or writing project files.
    #[arg(long)]
    dry_run: bool,

    /// Append every rendered command to `<working dir>/cmdlog.txt`.
    #[arg(long)]
    cmdlog: bool,

    /// Directory in which projects are created (overrides `directory.working`).
    #[arg(long, short = 'w')]
    working_dir: Option<PathBuf>,

    /// Directory for downloads (overrides `directory.temp`).
    #[arg(long)]
    temp_dir: Option<PathBuf>,
}

/// Applies command-line overrides on top of the loaded configuration.
fn apply_overrides(config: &mut Config, args: &ScaffoldArgs) -> Result<()> {
    if args.dry_run {
        config.options.dryrun = true;
    }
    if args.cmdlog {
        config.options.cmdlog = true;
    }
    if let Some(dir) = &args.working_dir {
        config.directory.working = dir.to_string_lossy().into_owned();
    }
    if let Some(dir) = &args.temp_dir {
        config.directory.temp = dir.to_string_lossy().into_owned();
    }
    config::expand_config_paths(config)
}

/// Main handler for `stacks scaffold`.
pub async fn handle_scaffold(args: ScaffoldArgs) -> Result<()> {
    info!("Handling scaffold command...");
    let mut config = config::load_config(args.config.as_deref())?;
    apply_overrides(&mut config, &args).context("Failed to apply command-line overrides")?;
    config::validate_config(&config)?;
    debug!("Effective configuration: {:?}", config);

    let mut report = tokio::task::spawn_blocking(move || orchestrator::run_batch(&config))
        .await
        .map_err(|e| anyhow!(StacksError::FileSystem(format!("scaffold task failed: {}", e))))??;

    println!("{}", report);
    if let Some(err) = report.cleanup_error.take() {
        return Err(anyhow!(err));
    }
    Ok(())
}

// --- Unit Tests ---
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overrides_take_precedence() {
        let mut config = Config::default();
        let args = ScaffoldArgs::parse_from([
            "scaffold",
            "--dry-run",
            "--cmdlog",
            "--working-dir",
            "/srv/out",
            "--temp-dir",
            "/srv/tmp",
        ]);
        apply_overrides(&mut config, &args).unwrap();
        assert!(config.options.dryrun);
        assert!(config.options.cmdlog);
        assert_eq!(config.directory.working, "/srv/out");
        assert_eq!(config.directory.temp, "/srv/tmp");
    }

    #[test]
    fn test_flags_do_not_clear_file_options() {
        let mut config = Config::default();
        config.options.dryrun = true;
        let args = ScaffoldArgs::parse_from(["scaffold"]);
        apply_overrides(&mut config, &args).unwrap();
        assert!(config.options.dryrun);
        assert!(!config.options.cmdlog);
    }
}
