//! # Filesystem Downloader (`common::download::filesystem`)
//!
//! File: cli/src/common/download/filesystem.rs
//!
//! Copies a local template directory into the destination. The `.git`
//! directory is skipped; permissions and symlinks are preserved by `copy_tree`.
//!
use super::{DownloadError, Downloader};
use crate::common::fs::copy::copy_tree;
use std::path::PathBuf;
use tracing::{info, Span};

#[derive(Debug)]
pub struct FilesystemDownloader {
    source: PathBuf,
    destination: PathBuf,
    span: Span,
}

impl FilesystemDownloader {
    pub fn new(source: PathBuf, destination: PathBuf) -> Self {
        Self {
            source,
            destination,
            span: Span::none(),
        }
    }
}

impl Downloader for FilesystemDownloader {
    fn fetch(&mut self) -> Result<PathBuf, DownloadError> {
        let _entered = self.span.enter();
        if !self.source.is_dir() {
            return Err(DownloadError::Io(format!(
                "template directory {:?} does not exist or is not a directory",
                self.source
            )));
        }
        info!("Copying template from {:?} to {:?}", self.source, self.destination);
        let copied = copy_tree(&self.source, &self.destination, &[".git"])
            .map_err(|e| DownloadError::Io(format!("{:#}", e)))?;
        info!("Copied {} entries", copied);
        Ok(self.destination.clone())
    }

    fn source_identifier(&self) -> String {
        format!("file://{}", self.source.display())
    }

    fn attach_logger(&mut self, span: Span) {
        self.span = span;
    }
}
