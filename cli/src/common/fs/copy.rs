//! # Stacks Filesystem Copy Operations
//!
//! File: cli/src/common/fs/copy.rs
//!
//! ## Overview
//!
//! Recursive directory copying used by the filesystem downloader and by the
//! `setup.copy` step that moves a downloaded template into the project's working
//! directory.
//!
//! ## Architecture
//!
//! `copy_tree` walks the source with `walkdir` (links are not followed) and:
//! - recreates directories,
//! - copies regular files with `std::fs::copy`, which carries permission bits over,
//! - recreates symbolic links as links via `links::replicate_symlink`,
//! - skips any entry whose name is in the exclusion list (e.g. `.git`), including
//!   everything beneath an excluded directory.
//!
//! ## Usage
//!
//! ```rust
//! use crate::common::fs::copy;
//!
//! let copied = copy::copy_tree(&template_dir, &project_dir, &[".git"])?;
//! println!("Copied {} files", copied);
//! ```
//!
use crate::common::fs::{io::ensure_dir_exists, links::replicate_symlink};
use crate::core::error::{Result, StacksError};
use anyhow::{anyhow, Context};
use std::fs;
use std::path::Path;
use tracing::{debug, info};
use walkdir::WalkDir;

/// Copies the contents of `source` into `target`, returning the number of files
/// and links written.
///
/// # Errors
///
/// Returns an `Err` if `source` is missing or not a directory, or if any entry
/// cannot be read or written.
pub fn copy_tree(source: &Path, target: &Path, exclude: &[&str]) -> Result<usize> {
    if !source.is_dir() {
        return Err(anyhow!(StacksError::FileSystem(format!(
            "Source directory does not exist or is not a directory: {:?}",
            source
        ))));
    }
    info!("Starting recursive copy from {:?} to {:?}", source, target);
    ensure_dir_exists(target)?;

    let mut copied = 0usize;
    let walker = WalkDir::new(source)
        .follow_links(false)
        .min_depth(1)
        .into_iter()
        .filter_entry(|entry| {
            let name = entry.file_name().to_string_lossy();
            !exclude.iter().any(|ex| name == *ex)
        });

    for entry_result in walker {
        let entry = entry_result
            .with_context(|| format!("Failed to read entry while copying {:?}", source))?;
        let relative = entry
            .path()
            .strip_prefix(source)
            .with_context(|| format!("Entry {:?} is outside {:?}", entry.path(), source))?;
        let destination = target.join(relative);
        let file_type = entry.file_type();

        if file_type.is_symlink() {
            replicate_symlink(entry.path(), &destination)?;
            copied += 1;
        } else if file_type.is_dir() {
            fs::create_dir_all(&destination)
                .with_context(|| format!("Failed to create directory {:?}", destination))?;
        } else {
            if let Some(parent) = destination.parent() {
                ensure_dir_exists(parent)?;
            }
            fs::copy(entry.path(), &destination).with_context(|| {
                format!("Failed to copy {:?} to {:?}", entry.path(), destination)
            })?;
            copied += 1;
        }
        debug!("Copied {:?}", relative);
    }

    info!(
        "Finished recursive copy from {:?} to {:?} ({} entries)",
        source, target, copied
    );
    Ok(copied)
}

// --- Unit Tests ---
#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_copy_tree_excludes_git() -> Result<()> {
        let source = tempdir()?;
        let target = tempdir()?;
        fs::create_dir_all(source.path().join(".git/objects"))?;
        fs::write(source.path().join(".git/HEAD"), "ref: refs/heads/main")?;
        fs::create_dir_all(source.path().join("src/nested"))?;
        fs::write(source.path().join("src/nested/main.rs"), "fn main() {}")?;
        fs::write(source.path().join(".gitignore"), "target/")?;
        fs::create_dir(source.path().join("empty"))?;

        let copied = copy_tree(source.path(), &target.path().join("out"), &[".git"])?;
        let out = target.path().join("out");

        assert_eq!(copied, 2);
        assert!(out.join("src/nested/main.rs").is_file());
        assert!(out.join(".gitignore").is_file());
        assert!(out.join("empty").is_dir());
        assert!(!out.join(".git").exists());
        Ok(())
    }

    #[test]
    fn test_copy_tree_missing_source() {
        let target = tempdir().unwrap();
        let result = copy_tree(Path::new("/definitely/not/here"), target.path(), &[]);
        assert!(result.unwrap_err().to_string().contains("does not exist"));
    }

    #[cfg(unix)]
    #[test]
    fn test_copy_tree_preserves_permissions_and_links() -> Result<()> {
        use std::os::unix::fs::PermissionsExt;

        let source = tempdir()?;
        let target = tempdir()?;
        let script = source.path().join("build.sh");
        fs::write(&script, "#!/bin/sh\necho hi\n")?;
        fs::set_permissions(&script, fs::Permissions::from_mode(0o755))?;
        std::os::unix::fs::symlink("build.sh", source.path().join("run.sh"))?;

        copy_tree(source.path(), target.path(), &[".git"])?;

        let mode = fs::metadata(target.path().join("build.sh"))?.permissions().mode();
        assert_eq!(mode & 0o777, 0o755);
        let link = target.path().join("run.sh");
        assert!(link.symlink_metadata()?.file_type().is_symlink());
        assert_eq!(fs::read_link(&link)?, Path::new("build.sh"));
        Ok(())
    }
}
