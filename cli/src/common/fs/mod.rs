//! # Stacks Filesystem Utilities (`common::fs`)
//!
//! File: cli/src/common/fs/mod.rs
//!
//! ## Overview
//!
//! Filesystem helpers used by the downloaders and the project orchestrator.
//!
//! - **`copy`**: recursive tree copy with exclusions, permissions and symlinks preserved.
//! - **`io`**: directory creation, whole-file reads/writes, line appends, tree removal.
//! - **`links`**: recreation of symbolic links during copies.
//!
//! Import the specific submodule needed, e.g. `crate::common::fs::io::ensure_dir_exists`.
//!

/// Recursive directory copying (`copy_tree`).
pub mod copy;
/// Basic file I/O operations.
pub mod io;
/// Symbolic link replication.
pub mod links;
