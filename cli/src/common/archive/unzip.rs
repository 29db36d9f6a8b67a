//! # Stacks ZIP Extraction (`common::archive::unzip`)
//!
//! File: cli/src/common/archive/unzip.rs
//!
//! ## Overview
//!
//! Both remote template formats are ZIP files: git hosting archives
//! (`<repo>/archive/<ref>.zip`, release zipballs) and NuGet packages (`.nupkg`).
//! This module unpacks them with the `zip` crate.
//!
//! Git archives wrap the tree in a single top-level directory
//! (`repo-main/...`); `extract_bytes` reports that directory as the archive root so
//! callers get the template tree itself rather than its wrapper.
//!
use crate::common::fs::io::ensure_dir_exists;
use crate::core::error::Result;
use anyhow::Context;
use std::fs;
use std::io::{Cursor, Read, Seek};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Unpacks an in-memory ZIP archive into `destination` and returns the archive root.
pub fn extract_bytes(bytes: &[u8], destination: &Path) -> Result<PathBuf> {
    extract_reader(Cursor::new(bytes), destination)?;
    single_root(destination)
}

/// Unpacks a ZIP file from disk into `destination`.
pub fn extract_file(archive: &Path, destination: &Path) -> Result<()> {
    let file = fs::File::open(archive)
        .with_context(|| format!("Failed to open archive {:?}", archive))?;
    extract_reader(file, destination)
        .with_context(|| format!("Failed to unpack archive {:?}", archive))
}

fn extract_reader<R: Read + Seek>(reader: R, destination: &Path) -> Result<()> {
    ensure_dir_exists(destination)?;
    let mut archive = zip::ZipArchive::new(reader).context("Invalid or corrupt ZIP archive")?;
    let entries = archive.len();
    archive
        .extract(destination)
        .with_context(|| format!("Failed to extract ZIP archive into {:?}", destination))?;
    info!("Extracted {} entries into {:?}", entries, destination);
    Ok(())
}

/// Returns the only child of `dir` when it is a directory, otherwise `dir` itself.
pub fn single_root(dir: &Path) -> Result<PathBuf> {
    let mut children = fs::read_dir(dir)
        .with_context(|| format!("Failed to list {:?}", dir))?
        .collect::<std::io::Result<Vec<_>>>()
        .with_context(|| format!("Failed to list {:?}", dir))?;
    if children.len() == 1 {
        let only = children.remove(0).path();
        if only.is_dir() {
            debug!("Archive root resolved to {:?}", only);
            return Ok(only);
        }
    }
    Ok(dir.to_path_buf())
}
