//! # Stacks Symbolic Link Handling
//!
//! File: cli/src/common/fs/links.rs
//!
//! ## Overview
//!
//! Template trees sometimes contain symbolic links (shared pipeline snippets,
//! `latest` pointers). When a tree is copied, links are recreated as links with
//! the same, possibly relative, target instead of being followed. Dangling links
//! are preserved as-is.
//!
use crate::common::fs::io::ensure_dir_exists;
use crate::core::error::Result;
use anyhow::Context;
use std::path::Path;
use tracing::debug;

/// Recreates the symbolic link `link` at `target`, pointing to the same place.
///
/// An existing item at `target` is replaced.
///
/// # Errors
///
/// Returns an `Err` if `link` is not a symlink, the parent of `target` cannot be
/// created, or the platform refuses to create the link.
pub fn replicate_symlink(link: &Path, target: &Path) -> Result<()> {
    let destination = std::fs::read_link(link)
        .with_context(|| format!("Failed to read symlink {:?}", link))?;

    if let Some(parent) = target.parent() {
        ensure_dir_exists(parent)
            .with_context(|| format!("Failed to create parent directory for {:?}", target))?;
    }

    if target.symlink_metadata().is_ok() {
        debug!("Replacing existing item at {:?}", target);
        let is_real_dir = !target.symlink_metadata()?.file_type().is_symlink() && target.is_dir();
        let removal = if is_real_dir {
            std::fs::remove_dir_all(target)
        } else {
            std::fs::remove_file(target)
        };
        removal.with_context(|| format!("Failed to replace existing item at {:?}", target))?;
    }

    #[cfg(unix)]
    {
        std::os::unix::fs::symlink(&destination, target).with_context(|| {
            format!("Failed to create symlink {:?} -> {:?}", target, destination)
        })?;
    }
    #[cfg(windows)]
    {
        // Resolve against the link's directory to decide between file and directory links.
        let resolved = link
            .parent()
            .unwrap_or_else(|| Path::new("."))
            .join(&destination);
        let created = if resolved.is_dir() {
            std::os::windows::fs::symlink_dir(&destination, target)
        } else {
            std::os::windows::fs::symlink_file(&destination, target)
        };
        created.with_context(|| {
            format!("Failed to create symlink {:?} -> {:?}", target, destination)
        })?;
    }
    #[cfg(not(any(unix, windows)))]
    {
        anyhow::bail!(
            "Symlinks are not supported on this platform ({:?} -> {:?})",
            target,
            destination
        );
    }

    debug!("Replicated symlink {:?} -> {:?}", target, destination);
    Ok(())
}
