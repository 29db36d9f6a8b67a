//! # Scaffold Project State (`commands::scaffold::project`)
//!
//! File: cli/src/commands/scaffold/project.rs
//!
//! A `Project` is the runtime view of one `[[project]]` entry: the declared
//! values plus the directories assigned to it for this batch and the settings
//! read from its template tree. It is serialized into the template context as
//! `project`, so `{{ project.name }}` or `{{ project.directory.working }}` work in
//! operation arguments and pipeline templates.
//!
//! Settings are read lazily from the downloaded tree on first access and never
//! change afterwards.
//!
use super::settings::{load_settings, Settings};
use crate::core::config::{Framework, Platform, ProjectCloud, ProjectConfig, SourceControl};
use crate::core::error::Result;
use serde::Serialize;
use std::cell::OnceCell;
use std::fmt;
use std::path::{Path, PathBuf};

/// Directories owned by a project during the batch.
#[derive(Serialize, Debug, Clone, Default)]
pub struct ProjectDirectories {
    /// Download destination, unique per project under the batch temp root.
    pub temp: PathBuf,
    /// Where the project is materialised.
    pub working: PathBuf,
    /// Template tree returned by the downloader (set once downloaded).
    pub download: PathBuf,
}

#[derive(Serialize, Debug, Clone)]
pub struct Project {
    pub name: String,
    pub framework: Framework,
    pub platform: Platform,
    pub source_control: SourceControl,
    pub cloud: ProjectCloud,
    #[serde(skip)]
    pub settings_file: Option<String>,
    pub directory: ProjectDirectories,
    #[serde(skip)]
    settings: OnceCell<Settings>,
}

impl Project {
    /// Builds the runtime project, assigning `<batch_root>/<name>` as its temp
    /// directory and `<working_root>/<name>` as its working directory.
    pub fn new(config: &ProjectConfig, batch_root: &Path, working_root: &Path) -> Self {
        let name = config.name.trim().to_string();
        Self {
            directory: ProjectDirectories {
                temp: batch_root.join(&name),
                working: working_root.join(&name),
                download: PathBuf::new(),
            },
            name,
            framework: config.framework.clone(),
            platform: config.platform.clone(),
            source_control: config.source_control.clone(),
            cloud: config.cloud.clone(),
            settings_file: config
                .settings_file
                .clone()
                .filter(|s| !s.trim().is_empty()),
            settings: OnceCell::new(),
        }
    }

    /// The template settings, read from the download directory on first use.
    pub fn settings(&self) -> Result<&Settings> {
        if let Some(settings) = self.settings.get() {
            return Ok(settings);
        }
        let loaded = load_settings(&self.directory.download, self.settings_file.as_deref())?;
        Ok(self.settings.get_or_init(|| loaded))
    }
}

/// Progress of a project through the materialisation pipeline.
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Resolved,
    Downloaded,
    SettingsLoaded,
    FrameworkChecked,
    InitPhase,
    SetupPhase,
    VariablesWritten,
    PatternsReplaced,
    VcsInitialized,
    Done,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Resolved => "resolve",
            Stage::Downloaded => "download",
            Stage::SettingsLoaded => "settings",
            Stage::FrameworkChecked => "framework check",
            Stage::InitPhase => "init phase",
            Stage::SetupPhase => "setup phase",
            Stage::VariablesWritten => "variable file",
            Stage::PatternsReplaced => "pattern replacement",
            Stage::VcsInitialized => "version control",
            Stage::Done => "done",
        };
        f.write_str(name)
    }
}

// --- Unit Tests ---
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_directories_are_unique_per_project() {
        let root = Path::new("/tmp/stacks-1-1");
        let working = Path::new("/work");
        let a = Project::new(
            &ProjectConfig {
                name: " alpha ".into(),
                ..Default::default()
            },
            root,
            working,
        );
        let b = Project::new(
            &ProjectConfig {
                name: "beta".into(),
                settings_file: Some("  ".into()),
                ..Default::default()
            },
            root,
            working,
        );
        assert_eq!(a.name, "alpha");
        assert_eq!(a.directory.temp, root.join("alpha"));
        assert_eq!(a.directory.working, working.join("alpha"));
        assert_ne!(a.directory.temp, b.directory.temp);
        assert!(b.settings_file.is_none());
    }

    #[test]
    fn test_serialized_view() {
        let project = Project::new(
            &ProjectConfig {
                name: "orders".into(),
                ..Default::default()
            },
            Path::new("/t"),
            Path::new("/w"),
        );
        let value = serde_json::to_value(&project).unwrap();
        assert_eq!(value["name"], "orders");
        assert_eq!(value["directory"]["working"], "/w/orders");
        assert!(value.get("settings").is_none());
    }

    #[test]
    fn test_settings_read_once() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("stacks.yml"), "setup: { copy: true }").unwrap();
        let mut project = Project::new(
            &ProjectConfig {
                name: "orders".into(),
                ..Default::default()
            },
            Path::new("/t"),
            Path::new("/w"),
        );
        project.directory.download = dir.path().to_path_buf();
        assert!(project.settings().unwrap().setup.copy);

        std::fs::remove_file(dir.path().join("stacks.yml")).unwrap();
        assert!(project.settings().unwrap().setup.copy);
    }
}
