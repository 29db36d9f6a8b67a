//! # Stacks CLI Integration Test Common Helpers
//!
//! File: cli/tests/common.rs
//!
//! ## Overview
//!
//! Shared helpers for the integration tests in `cli/tests/`. Each test file
//! declares `mod common;` and drives the compiled `stacks` binary through
//! `assert_cmd`.
//!

// Different test files use different helpers.
#![allow(dead_code)]

use std::fs;
use std::path::Path;

pub use assert_cmd::Command;

/// Returns a command for the `stacks` binary built for this test run.
///
/// Logging is pinned to `warn` so `RUST_LOG` in the caller's environment does
/// not leak into assertions on stderr.
pub fn stacks_cmd() -> Command {
    let mut cmd = Command::cargo_bin("stacks").expect("Failed to find stacks binary for testing");
    cmd.env("RUST_LOG", "warn");
    cmd
}

/// Writes a filesystem template tree with a settings document, a README
/// rendered by a `template` operation and an `azdo` pipeline.
pub fn write_template(root: &Path) {
    fs::create_dir_all(root.join("build")).unwrap();
    fs::write(
        root.join("stacks.yml"),
        r#"
pipeline:
  - type: azdo
    template: build/variables.yml.tera
    variable: build/variables.yml
    replacements:
      - { pattern: "%DOMAIN%", value: "{{ input.business.domain }}" }
setup:
  copy: true
  operations:
    - { action: template, args: "README.md", desc: "Render readme" }
"#,
    )
    .unwrap();
    fs::write(root.join("README.md"), "# {{ project.name }} for %DOMAIN%\n").unwrap();
    fs::write(
        root.join("build/variables.yml.tera"),
        "company: {{ input.business.company }}\nregion: {{ project.cloud.region }}\n",
    )
    .unwrap();
}

pub fn git_available() -> bool {
    std::process::Command::new("git")
        .arg("--version")
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}
