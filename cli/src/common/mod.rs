//! # Stacks Common Utilities (`common`)
//!
//! File: cli/src/common/mod.rs
//!
//! ## Overview
//!
//! Shared utility modules used by the scaffolding commands. Command-specific
//! logic lives in `commands::`, core infrastructure (configuration, errors,
//! templating, versions) in `core::`.
//!
//! - **`archive`**: ZIP extraction for git archives and NuGet packages.
//! - **`download`**: the downloader abstraction and its filesystem, git and NuGet variants.
//! - **`fs`**: copying, file I/O and symlink handling.
//! - **`network`**: blocking HTTP helpers.
//! - **`process`**: argument splitting, platform command wrapping, captured execution.
//!

/// ZIP archive extraction.
pub mod archive;
/// Template source downloaders (filesystem, git, NuGet).
pub mod download;
/// Filesystem operations (copying, I/O, links).
pub mod fs;
/// Blocking HTTP client helpers.
pub mod network;
/// External process execution.
pub mod process;
