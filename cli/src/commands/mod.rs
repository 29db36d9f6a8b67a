//! # Stacks Command Modules
//!
//! File: cli/src/commands/mod.rs
//!
//! ## Overview
//!
//! Top-level commands of the Stacks CLI. Each module defines its clap
//! arguments and an async `handle_*` function called from `main.rs`.
//!
//! - `scaffold`: materialise the projects declared in the configuration
//! - `version_check`: evaluate a version against a semver or .NET constraint
//! - `sample_config`: print an example configuration
//!

/// Project scaffolding: download, settings, operations, pipeline, version control.
pub mod scaffold;
/// Direct access to the version resolver.
pub mod version_check;
/// Prints the embedded sample configuration.
pub mod sample_config;
