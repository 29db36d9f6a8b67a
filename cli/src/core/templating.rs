//! # Stacks Template System
//!
//! File: cli/src/core/templating.rs
//!
//! ## Overview
//!
//! Every templated string in a scaffolding run (operation commands and arguments,
//! CI variable files, files rendered in place by `template` operations) is
//! rendered with Tera against a `Replacements` view. The view serializes to a
//! context with two roots:
//!
//! - `input`: the full input configuration (`{{ input.business.company }}`)
//! - `project`: the project being processed, including its resolved directories
//!   (`{{ project.name }}`, `{{ project.directory.working }}`)
//!
//! The context is rebuilt for each render so later operations see the current
//! project state rather than a snapshot taken when settings were loaded.
//!
//! ## Examples
//!
//! ```rust
//! let replacements = Replacements::new(&config, &project);
//! let rendered = replacements.render("new stacks-webapi -n {{ input.business.company }}.{{ project.name }}")?;
//! replacements.render_file_in_place(&working_dir.join("README.md"))?;
//! ```
//!
use crate::common::fs::io::{read_file_to_string, write_string_to_file};
use crate::core::config::Config;
use crate::core::error::{Result, StacksError};
use anyhow::{anyhow, Context};
use serde::Serialize;
use std::path::Path;
use tera::Tera;
use tracing::debug;

/// Template context: the input configuration plus the current project.
#[derive(Serialize, Debug)]
pub struct Replacements<'a, P: Serialize> {
    pub input: &'a Config,
    pub project: &'a P,
}

impl<'a, P: Serialize> Replacements<'a, P> {
    pub fn new(input: &'a Config, project: &'a P) -> Self {
        Self { input, project }
    }

    /// Builds the Tera context from the current state.
    pub fn context(&self) -> std::result::Result<tera::Context, tera::Error> {
        tera::Context::from_serialize(self)
    }

    /// Renders a single template string. Strings without template markers are
    /// returned unchanged without invoking the engine.
    pub fn render(&self, template: &str) -> std::result::Result<String, tera::Error> {
        if !template.contains("{{") && !template.contains("{%") {
            return Ok(template.to_string());
        }
        let context = self.context()?;
        Tera::one_off(template, &context, false)
    }

    /// Renders `source` and writes the result to `target`, creating parent directories.
    pub fn render_file(&self, source: &Path, target: &Path) -> Result<()> {
        let template_content = read_file_to_string(source)
            .with_context(|| format!("Failed to read template file '{}'", source.display()))?;
        let rendered = self.render(&template_content).map_err(|e| {
            anyhow!(StacksError::Template { source: e }).context(format!(
                "Tera rendering failed for template file '{}'",
                source.display()
            ))
        })?;
        write_string_to_file(target, &rendered)
            .with_context(|| format!("Failed to write rendered file '{}'", target.display()))?;
        debug!(
            "Rendered template '{}' to '{}'",
            source.display(),
            target.display()
        );
        Ok(())
    }

    /// Renders a file and replaces its content with the result.
    pub fn render_file_in_place(&self, path: &Path) -> Result<()> {
        self.render_file(path, path)
    }
}

// --- Unit Tests ---
#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[derive(Serialize)]
    struct FakeProject {
        name: String,
    }

    fn config() -> Config {
        let mut cfg = Config::default();
        cfg.business.company = "Acme".into();
        cfg.cloud.region = "westeurope".into();
        cfg
    }

    #[test]
    fn test_render_dotted_paths() {
        let cfg = config();
        let project = FakeProject {
            name: "orders".into(),
        };
        let r = Replacements::new(&cfg, &project);
        let out = r
            .render("{{ input.business.company }}.{{ project.name }} in {{ input.cloud.region }}")
            .unwrap();
        assert_eq!(out, "Acme.orders in westeurope");
    }

    #[test]
    fn test_render_plain_string_passthrough() {
        let cfg = config();
        let project = FakeProject { name: "x".into() };
        let r = Replacements::new(&cfg, &project);
        assert_eq!(r.render("new -i .").unwrap(), "new -i .");
    }

    #[test]
    fn test_render_unknown_variable_fails() {
        let cfg = config();
        let project = FakeProject { name: "x".into() };
        let r = Replacements::new(&cfg, &project);
        assert!(r.render("{{ input.nothing.here }}").is_err());
    }

    #[test]
    fn test_render_file_in_place() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("README.md");
        fs::write(&path, "# {{ project.name }} by {{ input.business.company }}")?;
        let cfg = config();
        let project = FakeProject {
            name: "orders".into(),
        };
        Replacements::new(&cfg, &project).render_file_in_place(&path)?;
        assert_eq!(fs::read_to_string(&path)?, "# orders by Acme");
        Ok(())
    }

    #[test]
    fn test_render_file_invalid_syntax() -> Result<()> {
        let dir = tempdir()?;
        let source = dir.path().join("invalid.tera");
        fs::write(&source, "Hello {{ project.name")?;
        let cfg = config();
        let project = FakeProject { name: "x".into() };
        let result =
            Replacements::new(&cfg, &project).render_file(&source, &dir.path().join("out"));
        let error_string = result.unwrap_err().to_string();
        assert!(error_string.contains("Tera rendering failed"));
        assert!(!dir.path().join("out").exists());
        Ok(())
    }
}
