//! # CI Pipeline Resolution (`commands::scaffold::pipeline`)
//!
//! File: cli/src/commands/scaffold/pipeline.rs
//!
//! ## Overview
//!
//! After the setup phase the project's CI pipeline is prepared from the pipeline
//! entry matching `input.pipeline` in the template settings:
//!
//! 1. **Variable file**: the entry's `template` is rendered with Tera and written to
//!    `variable`, relative to the working directory. The template is looked up in
//!    the working directory first and then in the download directory.
//! 2. **Pattern replacement**: each `replacements` pair is applied as a literal
//!    find/replace to the entry's `files`. With no files listed, every UTF-8 file in
//!    the working directory outside `.git` is processed. Replacement values may use
//!    template expressions.
//!
//! Per-file replacement problems are returned as warnings; they do not fail the project.
//!
use super::project::Project;
use super::settings::PipelineSettings;
use crate::core::config::Config;
use crate::core::error::{Result, StacksError};
use crate::core::templating::Replacements;
use anyhow::{anyhow, Context};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use walkdir::WalkDir;

/// Outcome of a replacement pass.
#[derive(Debug, Default)]
pub struct ReplaceSummary {
    pub files_changed: usize,
    pub warnings: Vec<String>,
}

/// Finds the pipeline template, preferring the working directory copy.
fn locate_template(template: &str, project: &Project) -> Option<PathBuf> {
    [&project.directory.working, &project.directory.download]
        .iter()
        .map(|dir| dir.join(template))
        .find(|candidate| candidate.is_file())
}

/// Renders the pipeline's variable template into the working directory.
pub fn write_variable_file(
    pipeline: &PipelineSettings,
    config: &Config,
    project: &Project,
) -> Result<PathBuf> {
    if pipeline.template.trim().is_empty() || pipeline.variable.trim().is_empty() {
        return Err(anyhow!(StacksError::Config(format!(
            "pipeline '{}' must declare both 'template' and 'variable'",
            pipeline.kind
        ))));
    }
    let source = locate_template(&pipeline.template, project).ok_or_else(|| {
        anyhow!(StacksError::FileSystem(format!(
            "pipeline template '{}' not found in {} or {}",
            pipeline.template,
            project.directory.working.display(),
            project.directory.download.display()
        )))
    })?;
    let target = project.directory.working.join(&pipeline.variable);
    Replacements::new(config, project)
        .render_file(&source, &target)
        .with_context(|| format!("Failed to write variable file for pipeline '{}'", pipeline.kind))?;
    info!("Wrote variable file {}", target.display());
    Ok(target)
}

/// Applies the pipeline's replacements to its files.
pub fn replace_patterns(
    pipeline: &PipelineSettings,
    config: &Config,
    project: &Project,
) -> Result<ReplaceSummary> {
    let mut summary = ReplaceSummary::default();
    if pipeline.replacements.is_empty() {
        debug!("Pipeline '{}' declares no replacements", pipeline.kind);
        return Ok(summary);
    }

    let replacements = Replacements::new(config, project);
    let mut pairs = Vec::with_capacity(pipeline.replacements.len());
    for replacement in &pipeline.replacements {
        if replacement.pattern.is_empty() {
            summary
                .warnings
                .push("skipped a replacement with an empty pattern".to_string());
            continue;
        }
        let value = replacements.render(&replacement.value).map_err(|e| {
            anyhow!(StacksError::Template { source: e }).context(format!(
                "Failed to render replacement value for '{}'",
                replacement.pattern
            ))
        })?;
        pairs.push((replacement.pattern.as_str(), value));
    }

    let working = &project.directory.working;
    let explicit = !pipeline.files.is_empty();
    let files: Vec<PathBuf> = if explicit {
        pipeline.files.iter().map(|f| working.join(f)).collect()
    } else {
        candidate_files(working)
    };

    for file in files {
        let shown = pathdiff::diff_paths(&file, working).unwrap_or_else(|| file.clone());
        let content = match fs::read_to_string(&file) {
            Ok(content) => content,
            Err(e) => {
                // Non-UTF-8 files are expected when scanning the whole tree.
                if explicit {
                    summary
                        .warnings
                        .push(format!("cannot read {}: {}", shown.display(), e));
                }
                continue;
            }
        };
        let replaced = pairs
            .iter()
            .fold(content.clone(), |text, (pattern, value)| text.replace(pattern, value));
        if replaced == content {
            continue;
        }
        match fs::write(&file, replaced) {
            Ok(()) => {
                debug!("Replaced patterns in {}", file.display());
                summary.files_changed += 1;
            }
            Err(e) => summary
                .warnings
                .push(format!("cannot write {}: {}", shown.display(), e)),
        }
    }
    info!(
        "Pattern replacement changed {} file(s) with {} warning(s)",
        summary.files_changed,
        summary.warnings.len()
    );
    Ok(summary)
}

/// Regular files under `root`, skipping `.git`.
fn candidate_files(root: &Path) -> Vec<PathBuf> {
    WalkDir::new(root)
        .follow_links(false)
        .into_iter()
        .filter_entry(|entry| entry.file_name() != ".git")
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .collect()
}

// --- Unit Tests ---
#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::scaffold::settings::Replacement;
    use crate::core::config::ProjectConfig;
    use tempfile::tempdir;

    fn project_in(root: &Path) -> Project {
        let mut project = Project::new(
            &ProjectConfig {
                name: "orders".into(),
                ..Default::default()
            },
            &root.join("tmp"),
            &root.join("work"),
        );
        project.directory.download = root.join("download");
        fs::create_dir_all(&project.directory.working).unwrap();
        fs::create_dir_all(&project.directory.download).unwrap();
        project
    }

    fn config() -> Config {
        let mut config = Config::default();
        config.pipeline = "azdo".into();
        config.business.company = "Acme".into();
        config
    }

    #[test]
    fn test_variable_file_falls_back_to_download_dir() {
        let root = tempdir().unwrap();
        let project = project_in(root.path());
        fs::create_dir_all(project.directory.download.join("build")).unwrap();
        fs::write(
            project.directory.download.join("build/vars.tera"),
            "company: {{ input.business.company }}\nname: {{ project.name }}\n",
        )
        .unwrap();
        let pipeline = PipelineSettings {
            kind: "azdo".into(),
            template: "build/vars.tera".into(),
            variable: "build/vars.yml".into(),
            ..Default::default()
        };
        let written = write_variable_file(&pipeline, &config(), &project).unwrap();
        assert_eq!(written, project.directory.working.join("build/vars.yml"));
        assert_eq!(
            fs::read_to_string(written).unwrap(),
            "company: Acme\nname: orders\n"
        );
    }

    #[test]
    fn test_missing_template_is_error() {
        let root = tempdir().unwrap();
        let project = project_in(root.path());
        let pipeline = PipelineSettings {
            kind: "azdo".into(),
            template: "nope.tera".into(),
            variable: "vars.yml".into(),
            ..Default::default()
        };
        assert!(write_variable_file(&pipeline, &config(), &project).is_err());
    }

    #[test]
    fn test_replace_all_files_skips_git() {
        let root = tempdir().unwrap();
        let project = project_in(root.path());
        let work = &project.directory.working;
        fs::write(work.join("a.yml"), "owner: %COMPANY%").unwrap();
        fs::create_dir_all(work.join(".git")).unwrap();
        fs::write(work.join(".git/config"), "%COMPANY%").unwrap();
        fs::write(work.join("logo.bin"), [0xff, 0xfe, 0x00]).unwrap();

        let pipeline = PipelineSettings {
            kind: "azdo".into(),
            replacements: vec![Replacement {
                pattern: "%COMPANY%".into(),
                value: "{{ input.business.company }}".into(),
            }],
            ..Default::default()
        };
        let summary = replace_patterns(&pipeline, &config(), &project).unwrap();
        assert_eq!(summary.files_changed, 1);
        assert!(summary.warnings.is_empty());
        assert_eq!(fs::read_to_string(work.join("a.yml")).unwrap(), "owner: Acme");
        assert_eq!(fs::read_to_string(work.join(".git/config")).unwrap(), "%COMPANY%");
    }

    #[test]
    fn test_replace_listed_files_warns_on_missing() {
        let root = tempdir().unwrap();
        let project = project_in(root.path());
        let work = &project.directory.working;
        fs::write(work.join("pipeline.yml"), "x: TOKEN").unwrap();
        fs::write(work.join("other.yml"), "x: TOKEN").unwrap();

        let pipeline = PipelineSettings {
            kind: "azdo".into(),
            files: vec!["pipeline.yml".into(), "missing.yml".into()],
            replacements: vec![Replacement {
                pattern: "TOKEN".into(),
                value: "value".into(),
            }],
            ..Default::default()
        };
        let summary = replace_patterns(&pipeline, &config(), &project).unwrap();
        assert_eq!(summary.files_changed, 1);
        assert_eq!(summary.warnings.len(), 1);
        assert!(summary.warnings[0].contains("missing.yml"));
        assert_eq!(fs::read_to_string(work.join("other.yml")).unwrap(), "x: TOKEN");
    }
}
