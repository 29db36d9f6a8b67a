//! # Template Settings Document (`commands::scaffold::settings`)
//!
//! File: cli/src/commands/scaffold/settings.rs
//!
//! ## Overview
//!
//! Every template tree carries a YAML settings document (`stacks.yml` unless the
//! project overrides the name). It declares:
//!
//! - `framework.commands`: tools that must be installed, with version constraints.
//! - `pipeline`: CI pipelines the template supports, with their variable template,
//!   the files to patch and the literal replacements to apply.
//! - `init` / `setup`: the operations run against the download and working directory.
//!
//! ```yaml
//! framework:
//!   commands:
//!     - name: dotnet
//!       version: "6.0.100"
//!       comparator: dotnet
//!       roll_forward: latestFeature
//! pipeline:
//!   - type: azdo
//!     template: build/variables.yml.tera
//!     variable: build/variables.yml
//!     files: [build/pipeline.yml]
//!     replacements:
//!       - { pattern: "%COMPANY%", value: "{{ input.business.company }}" }
//! init:
//!   operations:
//!     - { action: cmd, cmd: dotnet, args: "new -i .", desc: "Install template" }
//! setup:
//!   copy: false
//!   operations:
//!     - { action: cmd, cmd: dotnet, args: "new stacks-webapi -n {{ project.name }}", desc: "Create project" }
//! ```
//!
//! The document is read once per project and not modified afterwards.
//!
use super::operation::Operation;
use crate::core::error::{Result, StacksError};
use crate::core::resources;
use anyhow::anyhow;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::{debug, info};

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    #[serde(default)]
    pub framework: FrameworkSettings,
    #[serde(default)]
    pub pipeline: Vec<PipelineSettings>,
    #[serde(default)]
    pub init: PhaseSettings,
    #[serde(default)]
    pub setup: PhaseSettings,
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(deny_unknown_fields)]
pub struct FrameworkSettings {
    #[serde(default)]
    pub commands: Vec<ToolRequirement>,
}

/// Which comparator evaluates a tool's version constraint.
#[derive(Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Comparator {
    #[default]
    Semver,
    Dotnet,
}

/// A tool that must be present, e.g. `dotnet` at `>=6.0`.
#[derive(Deserialize, Debug, Clone, Default)]
#[serde(deny_unknown_fields)]
pub struct ToolRequirement {
    pub name: String,
    #[serde(default)]
    pub version: String,
    /// Arguments printing the version (default `--version`).
    #[serde(default)]
    pub args: Option<String>,
    /// Capture pattern for the version output (default `version::DEFAULT_PATTERN`).
    #[serde(default)]
    pub pattern: Option<String>,
    #[serde(default)]
    pub comparator: Comparator,
    #[serde(default)]
    pub roll_forward: Option<String>,
    /// `global.json` inside the template tree supplying a dotnet constraint.
    #[serde(default)]
    pub global: Option<String>,
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(deny_unknown_fields)]
pub struct PipelineSettings {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub template: String,
    #[serde(default)]
    pub variable: String,
    #[serde(default)]
    pub files: Vec<String>,
    #[serde(default)]
    pub replacements: Vec<Replacement>,
}

/// A literal find/replace pair; `value` may reference the template context.
#[derive(Deserialize, Debug, Clone)]
#[serde(deny_unknown_fields)]
pub struct Replacement {
    pub pattern: String,
    #[serde(default)]
    pub value: String,
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(deny_unknown_fields)]
pub struct PhaseSettings {
    /// Copy the download into the working directory before the operations (setup only).
    #[serde(default)]
    pub copy: bool,
    #[serde(default)]
    pub operations: Vec<Operation>,
}

impl Settings {
    /// The pipeline declared for `kind`, if any.
    pub fn pipeline_for(&self, kind: &str) -> Option<&PipelineSettings> {
        self.pipeline
            .iter()
            .find(|p| p.kind.eq_ignore_ascii_case(kind.trim()))
    }
}

/// Reads the settings document from `tree`.
///
/// `override_name` replaces the default file name; it is resolved relative to
/// the tree.
pub fn load_settings(tree: &Path, override_name: Option<&str>) -> Result<Settings> {
    let name = override_name.unwrap_or(resources::default_settings_file());
    let path = tree.join(name);
    info!("Reading settings from {}", path.display());
    let settings_error = |message: String| {
        anyhow!(StacksError::Settings {
            path: path.display().to_string(),
            message,
        })
    };
    let content = fs::read_to_string(&path).map_err(|e| settings_error(e.to_string()))?;
    let settings: Settings =
        serde_yaml::from_str(&content).map_err(|e| settings_error(e.to_string()))?;
    debug!(
        "Settings: {} tool(s), {} pipeline(s), {} init / {} setup operation(s)",
        settings.framework.commands.len(),
        settings.pipeline.len(),
        settings.init.operations.len(),
        settings.setup.operations.len()
    );
    Ok(settings)
}

// --- Unit Tests ---
#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::scaffold::operation::Action;
    use tempfile::tempdir;

    const DOC: &str = r#"
framework:
  commands:
    - name: dotnet
      version: "6.0.100"
      comparator: dotnet
      roll_forward: latestFeature
pipeline:
  - type: azdo
    template: build/vars.tera
    variable: build/vars.yml
    replacements:
      - { pattern: "%CO%", value: "{{ input.business.company }}" }
init:
  operations:
    - { action: cmd, cmd: dotnet, args: "new -i .", desc: "Install" }
setup:
  copy: true
  operations:
    - { action: template, args: "README.md", desc: "Render readme" }
"#;

    #[test]
    fn test_load_default_name() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("stacks.yml"), DOC).unwrap();
        let settings = load_settings(dir.path(), None).unwrap();
        assert_eq!(settings.framework.commands[0].comparator, Comparator::Dotnet);
        assert!(settings.setup.copy);
        assert!(!settings.init.copy);
        assert_eq!(settings.init.operations[0].cmd, "dotnet");
        assert_eq!(settings.setup.operations[0].action, Action::Template);
        assert_eq!(settings.pipeline_for("AZDO").unwrap().variable, "build/vars.yml");
        assert!(settings.pipeline_for("gha").is_none());
    }

    #[test]
    fn test_load_override_name() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("custom.yml"), "init: {}").unwrap();
        let name = String::from("custom.yml");
        let settings = load_settings(dir.path(), Some(name.as_str())).unwrap();
        assert!(settings.init.operations.is_empty());
    }

    #[test]
    fn test_missing_and_invalid_documents() {
        let dir = tempdir().unwrap();
        let err = load_settings(dir.path(), None).unwrap_err();
        assert!(err.to_string().contains("stacks.yml"));

        fs::write(dir.path().join("stacks.yml"), "unexpected: [").unwrap();
        let err = load_settings(dir.path(), None).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<StacksError>(),
            Some(StacksError::Settings { .. })
        ));
    }
}
