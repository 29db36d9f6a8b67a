//! # Stacks Configuration System
//!
//! File: cli/src/core/config.rs
//!
//! ## Overview
//!
//! This module defines the input configuration consumed by the scaffolding run
//! and handles loading, path expansion and validation. The configuration is a
//! read-mostly document: the orchestrator reads projects and component sources
//! from it, and every field is exposed to templates (operations, variable files)
//! through the serialized `input` object of the template context.
//!
//! ## Architecture
//!
//! - Configuration is loaded from one file, TOML or YAML depending on extension.
//! - When no file is given, `stacks.toml` / `stacks.yml` in the current directory
//!   is used, then `config.toml` in the user's config directory.
//! - Directory roots are expanded (`~`) and made absolute.
//! - Validation runs before the batch starts; a config error is fatal.
//! - Dotted-path access (`Config::lookup`) goes through an explicit accessor table
//!   rather than walking the structure at runtime.
//!
//! ## Examples
//!
//! ```toml
//! pipeline = "azdo"
//!
//! [business]
//! company = "Ensono"
//! domain = "core"
//! component = "backend"
//!
//! [components.dotnet_webapi]
//! kind = "nuget"
//! id = "Ensono.Stacks.Templates"
//!
//! [[project]]
//! name = "orders-api"
//! framework = { type = "dotnet", option = "webapi" }
//! source_control = { type = "github", url = "https://github.com/acme/orders-api.git" }
//! ```
//!
use crate::core::error::{Result, StacksError};
use anyhow::{anyhow, Context};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing::{debug, info, warn};

/// Represents the main configuration structure.
#[derive(Deserialize, Serialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Name of the CI pipeline to generate for every project (e.g. `azdo`, `gha`).
    #[serde(default)]
    pub pipeline: String,
    #[serde(default)]
    pub options: Options,
    #[serde(default)]
    pub directory: DirectoryConfig,
    #[serde(default)]
    pub business: Business,
    #[serde(default)]
    pub cloud: Cloud,
    #[serde(default)]
    pub network: Network,
    #[serde(default)]
    pub terraform: Terraform,
    /// Template sources keyed by framework map-key (`<type>_<option>`).
    #[serde(default)]
    pub components: BTreeMap<String, Component>,
    /// Projects to scaffold, processed in declaration order.
    #[serde(default, rename = "project")]
    pub projects: Vec<ProjectConfig>,
}

/// Run-wide switches.
#[derive(Deserialize, Serialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields)]
pub struct Options {
    /// Append every rendered command to `<working>/cmdlog.txt`.
    #[serde(default)]
    pub cmdlog: bool,
    /// Log disk-mutating steps instead of performing them.
    #[serde(default)]
    pub dryrun: bool,
}

/// Directory roots. Both are absolute once `load_config` returns.
#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(deny_unknown_fields)]
pub struct DirectoryConfig {
    #[serde(default = "default_working_dir")]
    pub working: String,
    #[serde(default = "default_temp_dir")]
    pub temp: String,
}

impl Default for DirectoryConfig {
    fn default() -> Self {
        Self {
            working: default_working_dir(),
            temp: default_temp_dir(),
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields)]
pub struct Business {
    #[serde(default)]
    pub company: String,
    #[serde(default)]
    pub domain: String,
    #[serde(default)]
    pub component: String,
}

#[derive(Deserialize, Serialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields)]
pub struct Cloud {
    #[serde(default)]
    pub platform: String,
    #[serde(default)]
    pub region: String,
    #[serde(default)]
    pub group: String,
}

#[derive(Deserialize, Serialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields)]
pub struct Network {
    #[serde(default)]
    pub base: NetworkBase,
}

#[derive(Deserialize, Serialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields)]
pub struct NetworkBase {
    #[serde(default)]
    pub domain: Domain,
}

#[derive(Deserialize, Serialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields)]
pub struct Domain {
    #[serde(default)]
    pub internal: String,
    #[serde(default)]
    pub external: String,
}

#[derive(Deserialize, Serialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields)]
pub struct Terraform {
    #[serde(default)]
    pub backend: TerraformBackend,
}

/// Remote state settings for generated infrastructure code.
#[derive(Deserialize, Serialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields)]
pub struct TerraformBackend {
    #[serde(default)]
    pub storage: String,
    #[serde(default)]
    pub group: String,
    #[serde(default)]
    pub container: String,
}

/// How a component's template is retrieved.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Git,
    Nuget,
    Filesystem,
}

/// A template source for one framework map-key.
///
/// Which fields matter depends on `kind`: `url`/`ref`/`token`/`api` for git,
/// `id`/`version`/`registration`/`flat_container` for NuGet, `path` for filesystem.
#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(deny_unknown_fields)]
pub struct Component {
    pub kind: SourceKind,
    #[serde(default)]
    pub url: String,
    #[serde(default, rename = "ref")]
    pub reference: String,
    /// Token for the "latest release" API lookup. Never exposed to templates.
    #[serde(default, skip_serializing)]
    pub token: Option<String>,
    /// Base URL of the releases API (defaults to GitHub's).
    #[serde(default)]
    pub api: Option<String>,
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub version: String,
    /// NuGet registration base (defaults to nuget.org's `registration5-semver1`).
    #[serde(default)]
    pub registration: Option<String>,
    /// NuGet flat-container base, used when the registration index is empty.
    #[serde(default)]
    pub flat_container: Option<String>,
    #[serde(default)]
    pub path: String,
}

/// One project entry as declared in the configuration.
#[derive(Deserialize, Serialize, Debug, Clone, Default)]
#[serde(deny_unknown_fields)]
pub struct ProjectConfig {
    pub name: String,
    /// Settings document to read from the downloaded tree instead of `stacks.yml`.
    #[serde(default)]
    pub settings_file: Option<String>,
    #[serde(default)]
    pub framework: Framework,
    #[serde(default)]
    pub platform: Platform,
    #[serde(default)]
    pub source_control: SourceControl,
    #[serde(default)]
    pub cloud: ProjectCloud,
}

#[derive(Deserialize, Serialize, Debug, Clone, Default)]
#[serde(deny_unknown_fields)]
pub struct Framework {
    #[serde(default, rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub option: String,
    /// Overrides the component's ref/version when set.
    #[serde(default)]
    pub version: String,
}

impl Framework {
    /// Composite key used to look up the component source, e.g. `dotnet_webapi`.
    pub fn map_key(&self) -> String {
        format!("{}_{}", self.kind, self.option)
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, Default)]
#[serde(deny_unknown_fields)]
pub struct Platform {
    #[serde(default, rename = "type")]
    pub kind: String,
}

#[derive(Deserialize, Serialize, Debug, Clone, Default)]
#[serde(deny_unknown_fields)]
pub struct SourceControl {
    #[serde(default, rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub url: String,
    #[serde(default, rename = "ref")]
    pub reference: String,
}

#[derive(Deserialize, Serialize, Debug, Clone, Default)]
#[serde(deny_unknown_fields)]
pub struct ProjectCloud {
    #[serde(default)]
    pub region: String,
    #[serde(default)]
    pub group: String,
}

fn default_working_dir() -> String {
    ".".to_string()
}

fn default_temp_dir() -> String {
    std::env::temp_dir().to_string_lossy().into_owned()
}

/// Fields that must be non-empty before a batch may start.
const REQUIRED_FIELDS: &[&str] = &["business.company", "pipeline"];

const CONFIG_FILENAMES: &[&str] = &["stacks.toml", "stacks.yml", "stacks.yaml"];

impl Config {
    /// Resolves a dotted path (e.g. `business.company`) to its string value.
    ///
    /// Only scalar fields are addressable. Returns `None` for unknown paths.
    pub fn lookup(&self, path: &str) -> Option<String> {
        let value = match path {
            "pipeline" => self.pipeline.clone(),
            "options.cmdlog" => self.options.cmdlog.to_string(),
            "options.dryrun" => self.options.dryrun.to_string(),
            "directory.working" => self.directory.working.clone(),
            "directory.temp" => self.directory.temp.clone(),
            "business.company" => self.business.company.clone(),
            "business.domain" => self.business.domain.clone(),
            "business.component" => self.business.component.clone(),
            "cloud.platform" => self.cloud.platform.clone(),
            "cloud.region" => self.cloud.region.clone(),
            "cloud.group" => self.cloud.group.clone(),
            "network.base.domain.internal" => self.network.base.domain.internal.clone(),
            "network.base.domain.external" => self.network.base.domain.external.clone(),
            "terraform.backend.storage" => self.terraform.backend.storage.clone(),
            "terraform.backend.group" => self.terraform.backend.group.clone(),
            "terraform.backend.container" => self.terraform.backend.container.clone(),
            _ => return None,
        };
        Some(value)
    }

    /// Absolute path of the command log file.
    pub fn cmdlog_path(&self) -> PathBuf {
        PathBuf::from(&self.directory.working).join("cmdlog.txt")
    }
}

/// Loads the configuration and expands its directory paths. Validation is separate.
///
/// `explicit` is the `--config` argument; when `None` the default locations are searched.
pub fn load_config(explicit: Option<&Path>) -> Result<Config> {
    let path = match explicit {
        Some(p) => p.to_path_buf(),
        None => find_config_path()?.ok_or_else(|| {
            anyhow!(StacksError::Config(format!(
                "No configuration file found. Create one of {:?} (see `stacks sample-config`) or pass --config.",
                CONFIG_FILENAMES
            )))
        })?,
    };
    info!("Loading configuration from: {}", path.display());
    let mut config = load_config_from_path(&path)?;
    expand_config_paths(&mut config).context("Failed to expand paths in configuration")?;
    debug!("Final loaded configuration: {:?}", config);
    Ok(config)
}

fn find_config_path() -> Result<Option<PathBuf>> {
    let current_dir = std::env::current_dir().context("Failed to get current directory")?;
    for name in CONFIG_FILENAMES {
        let candidate = current_dir.join(name);
        if candidate.is_file() {
            return Ok(Some(candidate));
        }
    }
    if let Some(proj_dirs) = ProjectDirs::from("com", "Stacks", "stacks") {
        let user_config = proj_dirs.config_dir().join("config.toml");
        if user_config.is_file() {
            return Ok(Some(user_config));
        }
        debug!("User configuration not found at {}", user_config.display());
    } else {
        warn!("Could not determine user config directory.");
    }
    Ok(None)
}

pub fn load_config_from_path(path: &Path) -> Result<Config> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read configuration file: {}", path.display()))?;
    let is_yaml = matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yml") | Some("yaml")
    );
    if is_yaml {
        serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse YAML from file: {}", path.display()))
    } else {
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse TOML from file: {}", path.display()))
    }
}

/// Expands `~` and turns relative directory roots into absolute paths.
pub fn expand_config_paths(config: &mut Config) -> Result<()> {
    let cwd = std::env::current_dir().context("Failed to get current directory")?;
    config.directory.working = absolutize(&cwd, &config.directory.working);
    config.directory.temp = absolutize(&cwd, &config.directory.temp);
    debug!(
        "Expanded directories: working={}, temp={}",
        config.directory.working, config.directory.temp
    );
    for component in config.components.values_mut() {
        if component.kind == SourceKind::Filesystem && !component.path.is_empty() {
            component.path = absolutize(&cwd, &component.path);
        }
    }
    Ok(())
}

fn absolutize(base: &Path, raw: &str) -> String {
    let expanded = PathBuf::from(shellexpand::tilde(raw).into_owned());
    let absolute = if expanded.is_absolute() {
        expanded
    } else {
        base.join(expanded)
    };
    absolute.to_string_lossy().into_owned()
}

/// Checks the configuration is usable for a batch run.
pub fn validate_config(config: &Config) -> Result<()> {
    info!("Validating final configuration...");
    if config.projects.is_empty() {
        return Err(anyhow!(StacksError::Config(
            "No projects are declared.".to_string()
        )));
    }
    for field in REQUIRED_FIELDS {
        if config.lookup(field).map_or(true, |v| v.trim().is_empty()) {
            return Err(anyhow!(StacksError::Config(format!(
                "Required setting '{}' is empty.",
                field
            ))));
        }
    }
    let mut seen = HashSet::new();
    for project in &config.projects {
        let name = project.name.trim();
        if name.is_empty() {
            return Err(anyhow!(StacksError::Config(
                "A project has an empty name.".to_string()
            )));
        }
        if name.contains(['/', '\\']) || name == "." || name == ".." {
            return Err(anyhow!(StacksError::Config(format!(
                "Project name '{}' cannot be used as a directory name.",
                name
            ))));
        }
        if !seen.insert(name.to_string()) {
            return Err(anyhow!(StacksError::Config(format!(
                "Project name '{}' is declared more than once.",
                name
            ))));
        }
        let key = project.framework.map_key();
        if !config.components.contains_key(&key) {
            return Err(anyhow!(StacksError::Config(format!(
                "Project '{}' uses framework '{}' but no component source is configured for it.",
                name, key
            ))));
        }
    }
    info!("Configuration validation successful.");
    Ok(())
}
