//! # Stacks Version Check Command (`commands::version_check`)
//!
//! File: cli/src/commands/version_check.rs
//!
//! ## Overview
//!
//! Exposes the version resolver directly, which is useful when writing the
//! `framework.commands` section of a template's settings:
//!
//! ```bash
//! stacks version-check --version "git version 2.40.1" --semver ">=2.30"
//! stacks version-check --version 6.0.300 --dotnet 6.0.100 --roll-forward latestFeature
//! stacks version-check --version 8.0.204 --global ./global.json
//! ```
//!
//! Prints `match` or `no match` and exits 0. An invalid pattern, version or
//! constraint is an error (exit 1).
//!
use crate::core::error::Result;
use crate::core::version::{RollForward, Version, DEFAULT_PATTERN};
use anyhow::Context;
use clap::{ArgGroup, Parser};
use tracing::{debug, info};

/// Arguments for `stacks version-check`.
#[derive(Parser, Debug)]
#[command(disable_version_flag = true, group(
    ArgGroup::new("constraint")
        .required(true)
        .args(["semver", "dotnet", "global"])
))]
pub struct VersionCheckArgs {
    /// Version text to evaluate (tool output is accepted; the pattern narrows it).
    #[arg(long = "version", value_name = "TEXT")]
    found: String,

    /// Capture pattern with `major`, `minor`, `feature`, `patch` (and optional `version`) groups.
    #[arg(long, default_value = DEFAULT_PATTERN)]
    pattern: String,

    /// Semantic version range, e.g. ">=1.2, <2 || ^3".
    #[arg(long)]
    semver: Option<String>,

    /// .NET SDK version to compare against using --roll-forward.
    #[arg(long)]
    dotnet: Option<String>,

    /// Roll-forward policy for --dotnet (disable, latestPatch, latestFeature, latestMinor, latestMajor).
    #[arg(long)]
    roll_forward: Option<String>,

    /// Path to (or JSON content of) a global.json supplying the .NET constraint.
    #[arg(long)]
    global: Option<String>,
}

/// Evaluates the arguments, returning whether the version matched.
pub fn evaluate(args: &VersionCheckArgs) -> Result<bool> {
    let mut found = Version::init(&args.found, &args.pattern)?;
    found.split();
    if found.is_split() {
        debug!(
            "Version '{}' split into {}.{}.{}.{} (empty: {})",
            found.raw(),
            found.major,
            found.minor,
            found.feature,
            found.patch,
            found.empty
        );
    }

    let matched = if let Some(range) = &args.semver {
        found.semver(range)?
    } else if let Some(global) = &args.global {
        found.dotnet_global(global)?
    } else if let Some(required) = &args.dotnet {
        let policy: RollForward = args.roll_forward.as_deref().unwrap_or_default().parse()?;
        let constraint = Version::init(required, &args.pattern)?;
        found.dotnet(constraint, policy)?
    } else {
        anyhow::bail!("one of --semver, --dotnet or --global is required");
    };
    if let Some(constraint) = found.constraint() {
        debug!("Evaluated against {}: {}", constraint, matched);
    }
    Ok(matched)
}

/// Main handler for `stacks version-check`.
pub async fn handle_version_check(args: VersionCheckArgs) -> Result<()> {
    info!("Handling version-check command...");
    let matched = evaluate(&args).context("Version check failed")?;
    println!("{}", if matched { "match" } else { "no match" });
    Ok(())
}
