//! # NuGet Package Downloader (`common::download::nuget`)
//!
//! File: cli/src/common/download/nuget.rs
//!
//! ## Overview
//!
//! Retrieves a template package from a NuGet v3 feed:
//!
//! 1. **Version resolution**: a specific version is used as-is. `latest` (or no version)
//!    reads the registration index `registration5-semver1/<id>/index.json` and takes the
//!    last item of the last page, fetching the page when it is not inlined. An index
//!    with no items falls back to the flat-container listing `<flat>/<id>/index.json`.
//! 2. **Cache**: packages are stored as `<id>.<version>.nupkg` (lower case) in a cache
//!    directory shared across runs. A cached package skips every network call.
//!    Downloads land in a `.part` file renamed into place, and a cached package that
//!    fails to unpack is removed and downloaded again.
//! 3. **Download**: the package URL comes from the registration leaf's `packageContent`.
//! 4. **Unpack**: the `.nupkg` (a ZIP file) is extracted into the destination; the
//!    template tree is `content/templates/<id>` inside it.
//!
//! The cache directory is `$STACKS_CACHE_DIR` when set, else `<user cache>/stacks/nuget`.
//!
use super::{DownloadError, Downloader};
use crate::common::archive::unzip;
use crate::common::network::HttpClient;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn, Span};

pub const DEFAULT_REGISTRATION: &str = "https://api.nuget.org/v3/registration5-semver1";
pub const DEFAULT_FLAT_CONTAINER: &str = "https://api.nuget.org/v3-flatcontainer";
pub const CACHE_DIR_ENV: &str = "STACKS_CACHE_DIR";
const LATEST: &str = "latest";

#[derive(Deserialize, Debug, Default)]
struct RegistrationIndex {
    #[serde(default)]
    items: Vec<RegistrationPage>,
}

#[derive(Deserialize, Debug)]
struct RegistrationPage {
    #[serde(rename = "@id")]
    id: String,
    #[serde(default)]
    items: Option<Vec<RegistrationLeaf>>,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
struct RegistrationLeaf {
    catalog_entry: CatalogEntry,
    #[serde(default)]
    package_content: Option<String>,
}

#[derive(Deserialize, Debug, Clone)]
struct CatalogEntry {
    version: String,
}

/// `<registration>/<id>/<version>.json`
#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct VersionLeaf {
    package_content: String,
}

#[derive(Deserialize, Debug)]
struct FlatVersions {
    #[serde(default)]
    versions: Vec<String>,
}

#[derive(Debug)]
pub struct NugetDownloader {
    id: String,
    version: String,
    destination: PathBuf,
    registration: String,
    flat_container: String,
    cache_dir: PathBuf,
    span: Span,
}

/// Default package cache location.
pub fn default_cache_dir() -> PathBuf {
    if let Ok(dir) = std::env::var(CACHE_DIR_ENV) {
        if !dir.trim().is_empty() {
            return PathBuf::from(shellexpand::tilde(dir.trim()).into_owned());
        }
    }
    dirs::cache_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("stacks")
        .join("nuget")
}

impl NugetDownloader {
    pub fn new(id: &str, version: &str, destination: PathBuf) -> Self {
        Self {
            id: id.trim().to_string(),
            version: version.trim().to_string(),
            destination,
            registration: DEFAULT_REGISTRATION.to_string(),
            flat_container: DEFAULT_FLAT_CONTAINER.to_string(),
            cache_dir: default_cache_dir(),
            span: Span::none(),
        }
    }

    #[cfg(test)]
    pub fn with_cache_dir(mut self, dir: PathBuf) -> Self {
        self.cache_dir = dir;
        self
    }

    pub fn with_feeds(mut self, registration: &str, flat_container: &str) -> Self {
        self.registration = registration.trim_end_matches('/').to_string();
        self.flat_container = flat_container.trim_end_matches('/').to_string();
        self
    }

    fn wants_latest(&self) -> bool {
        self.version.is_empty() || self.version.eq_ignore_ascii_case(LATEST)
    }

    fn lower_id(&self) -> String {
        self.id.to_lowercase()
    }

    fn cache_file(&self, version: &str) -> PathBuf {
        self.cache_dir
            .join(format!("{}.{}.nupkg", self.lower_id(), version.to_lowercase()))
    }

    /// Resolves `latest` to a concrete version, with the package URL when the
    /// registration leaf carried one.
    fn resolve_latest(&self, client: &HttpClient) -> Result<(String, Option<String>), DownloadError> {
        let index_url = format!("{}/{}/index.json", self.registration, self.lower_id());
        let index: RegistrationIndex = client.get_json(&index_url)?;

        if let Some(page) = index.items.last() {
            let leaves = match &page.items {
                Some(items) => items.clone(),
                None => {
                    debug!("Fetching registration page {}", page.id);
                    let fetched: RegistrationPage = client.get_json(&page.id)?;
                    fetched.items.unwrap_or_default()
                }
            };
            if let Some(leaf) = leaves.last() {
                return Ok((leaf.catalog_entry.version.clone(), leaf.package_content.clone()));
            }
        }

        debug!("Registration index for '{}' has no items, using flat container", self.id);
        let flat_url = format!("{}/{}/index.json", self.flat_container, self.lower_id());
        let listing: FlatVersions = client.get_json(&flat_url)?;
        let version = listing.versions.last().cloned().ok_or_else(|| {
            DownloadError::Response(format!("no versions published for package '{}'", self.id))
        })?;
        Ok((version, None))
    }

    fn package_url(&self, client: &HttpClient, version: &str) -> Result<String, DownloadError> {
        let url = format!(
            "{}/{}/{}.json",
            self.registration,
            self.lower_id(),
            version.to_lowercase()
        );
        let leaf: VersionLeaf = client.get_json(&url)?;
        Ok(leaf.package_content)
    }

    fn download_to_cache(
        &self,
        client: &HttpClient,
        url: &str,
        cache_file: &Path,
    ) -> Result<(), DownloadError> {
        info!("Downloading package {}", url);
        let bytes = client.get_bytes(url)?;
        fs::create_dir_all(&self.cache_dir).map_err(|e| {
            DownloadError::Io(format!("failed to create cache {:?}: {}", self.cache_dir, e))
        })?;
        let partial = cache_file.with_extension(format!("nupkg.{}.part", std::process::id()));
        fs::write(&partial, &bytes)
            .and_then(|()| fs::rename(&partial, cache_file))
            .map_err(|e| {
                let _ = fs::remove_file(&partial);
                DownloadError::Io(format!("failed to write {:?}: {}", cache_file, e))
            })
    }

    fn unpack(&self, package: &Path) -> Result<PathBuf, DownloadError> {
        unzip::extract_file(package, &self.destination)
            .map_err(|e| DownloadError::Archive(format!("{:#}", e)))?;
        Ok(self.destination.join("content").join("templates").join(&self.id))
    }

    /// Unpacks a cached package. An unusable one is removed so it can be fetched again.
    fn from_cache(&self, package: &Path) -> Option<PathBuf> {
        if !package.is_file() {
            return None;
        }
        info!("Using cached package {:?}", package);
        match self.unpack(package) {
            Ok(tree) => Some(tree),
            Err(e) => {
                discard(package, &e);
                None
            }
        }
    }
}

fn discard(package: &Path, reason: &DownloadError) {
    warn!("Discarding cached package {:?}: {}", package, reason);
    if let Err(e) = fs::remove_file(package) {
        warn!("Failed to remove {:?}: {}", package, e);
    }
}

impl Downloader for NugetDownloader {
    fn fetch(&mut self) -> Result<PathBuf, DownloadError> {
        let _entered = self.span.enter();

        if !self.wants_latest() {
            if let Some(tree) = self.from_cache(&self.cache_file(&self.version)) {
                return Ok(tree);
            }
        }

        let client = HttpClient::new();
        let (version, content_url) = if self.wants_latest() {
            let resolved = self.resolve_latest(&client)?;
            info!("Resolved latest version of '{}' to {}", self.id, resolved.0);
            resolved
        } else {
            (self.version.clone(), None)
        };
        let package = self.cache_file(&version);
        if self.wants_latest() {
            if let Some(tree) = self.from_cache(&package) {
                return Ok(tree);
            }
        }

        let url = match content_url {
            Some(url) => url,
            None => self.package_url(&client, &version)?,
        };
        self.download_to_cache(&client, &url, &package)?;
        self.unpack(&package).map_err(|e| {
            discard(&package, &e);
            e
        })
    }

    fn source_identifier(&self) -> String {
        let version = if self.wants_latest() {
            LATEST
        } else {
            self.version.as_str()
        };
        format!("nuget:{}@{}", self.id, version)
    }

    fn attach_logger(&mut self, span: Span) {
        self.span = span;
    }
}
