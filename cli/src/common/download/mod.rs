//! # Stacks Template Downloaders (`common::download`)
//!
//! File: cli/src/common/download/mod.rs
//!
//! ## Overview
//!
//! A project's template tree comes from one of three sources, selected by the
//! component configured for the project's framework map-key:
//!
//! - **`filesystem`**: a local directory copied into the project's temp directory.
//! - **`git`**: a hosted repository fetched as a ZIP archive over HTTP (no git binary).
//! - **`nuget`**: a NuGet template package resolved through the v3 API and cached locally.
//!
//! All three implement the `Downloader` trait. The orchestrator builds a fresh
//! downloader for every project through `for_component`, attaches its per-project
//! span and calls `fetch`, which returns the directory holding the template tree.
//!
//! ## Usage
//!
//! ```rust
//! let mut downloader = download::for_component(&component, &project.framework.version, &temp_dir);
//! downloader.attach_logger(tracing::info_span!("download", project = %project.name));
//! let tree = downloader.fetch()?;
//! ```
//!
use crate::common::network::HttpError;
use crate::core::config::{Component, SourceKind};
use std::path::{Path, PathBuf};
use thiserror::Error;

pub mod filesystem;
pub mod git;
pub mod nuget;

pub use filesystem::FilesystemDownloader;
pub use git::GitDownloader;
pub use nuget::NugetDownloader;

/// Failure while retrieving a template source.
#[derive(Error, Debug)]
pub enum DownloadError {
    #[error("transport error fetching {url}: {message}")]
    Transport { url: String, message: String },

    #[error("{url} responded with HTTP status {status}")]
    HttpStatus { url: String, status: u16 },

    #[error("archive error: {0}")]
    Archive(String),

    #[error("unexpected response: {0}")]
    Response(String),

    #[error("I/O error: {0}")]
    Io(String),
}

impl From<HttpError> for DownloadError {
    fn from(err: HttpError) -> Self {
        match err {
            HttpError::Transport { url, message } => DownloadError::Transport { url, message },
            HttpError::Status { url, status } => DownloadError::HttpStatus { url, status },
            HttpError::Body { url, message } => {
                DownloadError::Response(format!("{}: {}", url, message))
            }
        }
    }
}

/// A template source that can be materialised on disk.
pub trait Downloader {
    /// Retrieves the source and returns the directory containing the template tree.
    fn fetch(&mut self) -> Result<PathBuf, DownloadError>;

    /// Human-readable description of where the template comes from.
    fn source_identifier(&self) -> String;

    /// Sets the span entered while fetching.
    fn attach_logger(&mut self, span: tracing::Span);
}

/// Builds a downloader for `component` writing into `destination`.
///
/// A non-empty `version` (the project's framework version) overrides the
/// component's git ref or NuGet version.
pub fn for_component(
    component: &Component,
    version: &str,
    destination: &Path,
) -> Box<dyn Downloader> {
    let pick = |configured: &str| {
        if version.trim().is_empty() {
            configured.to_string()
        } else {
            version.trim().to_string()
        }
    };
    match component.kind {
        SourceKind::Filesystem => Box::new(FilesystemDownloader::new(
            PathBuf::from(&component.path),
            destination.to_path_buf(),
        )),
        SourceKind::Git => {
            let mut downloader = GitDownloader::new(
                &component.url,
                &pick(&component.reference),
                destination.to_path_buf(),
            )
            .with_token(component.token.clone());
            if let Some(api) = &component.api {
                downloader = downloader.with_api(api);
            }
            Box::new(downloader)
        }
        SourceKind::Nuget => Box::new(
            NugetDownloader::new(&component.id, &pick(&component.version), destination.to_path_buf())
                .with_feeds(
                    component.registration.as_deref().unwrap_or(nuget::DEFAULT_REGISTRATION),
                    component
                        .flat_container
                        .as_deref()
                        .unwrap_or(nuget::DEFAULT_FLAT_CONTAINER),
                ),
        ),
    }
}
