//! # Git Archive Downloader (`common::download::git`)
//!
//! File: cli/src/common/download/git.rs
//!
//! ## Overview
//!
//! Fetches a repository snapshot from a git hosting service as a ZIP archive,
//! without a local git installation:
//!
//! - A branch, tag or commit ref downloads `<repo>/archive/<ref>.zip`. An empty ref
//!   means the trunk branch, `main`.
//! - The ref `latest` (or an empty ref when an API token is configured) asks the
//!   releases API for the newest release and downloads its `zipball_url`.
//!
//! Hosting archives wrap the tree in one top-level directory; `fetch` returns that
//! directory.
//!
use super::{DownloadError, Downloader};
use crate::common::archive::unzip;
use crate::common::network::HttpClient;
use serde::Deserialize;
use std::path::PathBuf;
use tracing::{debug, info, Span};

pub const DEFAULT_BRANCH: &str = "main";
pub const DEFAULT_API: &str = "https://api.github.com";
const LATEST: &str = "latest";

#[derive(Deserialize, Debug)]
struct Release {
    #[serde(default)]
    tag_name: String,
    zipball_url: String,
}

#[derive(Debug)]
pub struct GitDownloader {
    repository: String,
    reference: String,
    token: Option<String>,
    api: String,
    destination: PathBuf,
    span: Span,
}

/// Archive URL for `reference` of `repository`.
pub fn archive_url(repository: &str, reference: &str) -> String {
    let reference = if reference.trim().is_empty() {
        DEFAULT_BRANCH
    } else {
        reference.trim()
    };
    format!("{}/archive/{}.zip", strip_git_suffix(repository), reference)
}

fn strip_git_suffix(repository: &str) -> &str {
    let trimmed = repository.trim().trim_end_matches('/');
    trimmed.strip_suffix(".git").unwrap_or(trimmed)
}

/// Splits `https://host/owner/repo(.git)` into `(owner, repo)`.
fn owner_and_repo(repository: &str) -> Option<(String, String)> {
    let mut segments = strip_git_suffix(repository).rsplit('/');
    let repo = segments.next().filter(|s| !s.is_empty())?;
    let owner = segments.next().filter(|s| !s.is_empty() && !s.contains(':'))?;
    Some((owner.to_string(), repo.to_string()))
}

impl GitDownloader {
    pub fn new(repository: &str, reference: &str, destination: PathBuf) -> Self {
        Self {
            repository: repository.trim().to_string(),
            reference: reference.trim().to_string(),
            token: None,
            api: DEFAULT_API.to_string(),
            destination,
            span: Span::none(),
        }
    }

    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token.filter(|t| !t.is_empty());
        self
    }

    pub fn with_api(mut self, api: &str) -> Self {
        self.api = api.trim_end_matches('/').to_string();
        self
    }

    fn wants_latest_release(&self) -> bool {
        self.reference.eq_ignore_ascii_case(LATEST)
            || (self.reference.is_empty() && self.token.is_some())
    }

    fn client(&self) -> HttpClient {
        HttpClient::new().with_token(self.token.clone())
    }

    fn latest_release_url(&self, client: &HttpClient) -> Result<String, DownloadError> {
        let (owner, repo) = owner_and_repo(&self.repository).ok_or_else(|| {
            DownloadError::Response(format!(
                "cannot derive owner/repository from '{}'",
                self.repository
            ))
        })?;
        let url = format!("{}/repos/{}/{}/releases/latest", self.api, owner, repo);
        let release: Release = client.get_json(&url)?;
        info!("Latest release of {}/{} is '{}'", owner, repo, release.tag_name);
        Ok(release.zipball_url)
    }
}

impl Downloader for GitDownloader {
    fn fetch(&mut self) -> Result<PathBuf, DownloadError> {
        let _entered = self.span.enter();
        let client = self.client();
        let url = if self.wants_latest_release() {
            self.latest_release_url(&client)?
        } else {
            archive_url(&self.repository, &self.reference)
        };
        info!("Downloading archive {}", url);
        let bytes = client.get_bytes(&url)?;
        debug!("Downloaded {} bytes", bytes.len());
        unzip::extract_bytes(&bytes, &self.destination)
            .map_err(|e| DownloadError::Archive(format!("{:#}", e)))
    }

    fn source_identifier(&self) -> String {
        if self.wants_latest_release() {
            format!("{}/releases/latest", strip_git_suffix(&self.repository))
        } else {
            archive_url(&self.repository, &self.reference)
        }
    }

    fn attach_logger(&mut self, span: Span) {
        self.span = span;
    }
}
