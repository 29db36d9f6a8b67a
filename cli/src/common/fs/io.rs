//! # Stacks Filesystem I/O Operations
//!
//! File: cli/src/common/fs/io.rs
//!
//! ## Overview
//!
//! Basic file and directory helpers shared by the scaffolding pipeline:
//! ensuring directories exist, reading and writing whole files, appending lines
//! to the command log, and removing directory trees at the end of a run.
//!
//! Every helper wraps the standard library call with `anyhow` context naming the
//! path involved, so failures surfaced in the batch report are self-explanatory.
//!
use crate::core::error::{Result, StacksError};
use anyhow::Context;
use std::fs;
use std::io::Write;
use std::path::Path;
use tracing::{debug, info};

/// Ensures that a directory exists at the specified path, creating it and any
/// missing parents when needed.
///
/// # Errors
///
/// Returns an `Err` if the path exists but is not a directory, or creation fails.
pub fn ensure_dir_exists(path: &Path) -> Result<()> {
    if !path.exists() {
        fs::create_dir_all(path)
            .with_context(|| format!("Failed to create directory {:?}", path))?;
        info!("Created directory: {:?}", path);
    } else if !path.is_dir() {
        anyhow::bail!(StacksError::FileSystem(format!(
            "Path exists but is not a directory: {:?}",
            path
        )));
    } else {
        debug!("Directory already exists: {:?}", path);
    }
    Ok(())
}

/// Reads the entire content of a file into a string.
pub fn read_file_to_string(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("Failed to read file {:?}", path))
}

/// Writes string content to a file, creating parent directories and replacing
/// any existing content.
pub fn write_string_to_file(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        ensure_dir_exists(parent)?;
    }
    fs::write(path, content).with_context(|| format!("Failed to write to file {:?}", path))?;
    debug!("Wrote content to file: {:?}", path);
    Ok(())
}

/// Appends a single line to a file, creating the file (and its parents) if needed.
pub fn append_line(path: &Path, line: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        ensure_dir_exists(parent)?;
    }
    let mut file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open {:?} for appending", path))?;
    writeln!(file, "{}", line).with_context(|| format!("Failed to append to file {:?}", path))?;
    Ok(())
}

/// Removes a directory tree. A path that does not exist is not an error.
pub fn remove_dir_if_exists(path: &Path) -> Result<()> {
    if path.symlink_metadata().is_err() {
        debug!("Nothing to remove at {:?}", path);
        return Ok(());
    }
    fs::remove_dir_all(path).with_context(|| format!("Failed to remove directory {:?}", path))?;
    info!("Removed directory: {:?}", path);
    Ok(())
}

// --- Unit Tests ---
#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_ensure_dir_exists_creates_new() -> Result<()> {
        let base_dir = tempdir()?;
        let new_dir = base_dir.path().join("new/subdir");
        assert!(!new_dir.exists());
        ensure_dir_exists(&new_dir)?;
        assert!(new_dir.is_dir());
        Ok(())
    }

    #[test]
    fn test_ensure_dir_exists_path_is_file() -> Result<()> {
        let base_dir = tempdir()?;
        let file_path = base_dir.path().join("a_file.txt");
        fs::write(&file_path, "hello")?;
        let result = ensure_dir_exists(&file_path);
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("Path exists but is not a directory"));
        Ok(())
    }

    #[test]
    fn test_read_write_string_to_file() -> Result<()> {
        let base_dir = tempdir()?;
        let file_path = base_dir.path().join("nested/test_rw.txt");
        write_string_to_file(&file_path, "Hello, Stacks!")?;
        assert_eq!(read_file_to_string(&file_path)?, "Hello, Stacks!");
        Ok(())
    }

    #[test]
    fn test_append_line_accumulates() -> Result<()> {
        let base_dir = tempdir()?;
        let log = base_dir.path().join("cmdlog.txt");
        append_line(&log, "git init")?;
        append_line(&log, "git remote add origin x")?;
        assert_eq!(
            read_file_to_string(&log)?,
            "git init\ngit remote add origin x\n"
        );
        Ok(())
    }

    #[test]
    fn test_remove_dir_if_exists() -> Result<()> {
        let base_dir = tempdir()?;
        let victim = base_dir.path().join("victim");
        fs::create_dir_all(victim.join("inner"))?;
        fs::write(victim.join("inner/file"), "x")?;
        remove_dir_if_exists(&victim)?;
        assert!(!victim.exists());
        // Second call is a no-op.
        remove_dir_if_exists(&victim)?;
        Ok(())
    }
}
