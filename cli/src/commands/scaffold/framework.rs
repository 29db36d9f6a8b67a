//! # Framework Tool Checks (`commands::scaffold::framework`)
//!
//! File: cli/src/commands/scaffold/framework.rs
//!
//! Verifies the tools a template needs (`framework.commands` in its settings)
//! are installed at an acceptable version. Each tool is run with its version
//! arguments, the output is narrowed with the capture pattern and the result is
//! compared with the semver or .NET roll-forward comparator.
//!
use super::settings::{Comparator, ToolRequirement};
use crate::common::process::{build_command, run_captured, Platform, ProcessError};
use crate::core::version::{RollForward, Version, VersionError, DEFAULT_PATTERN};
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info};

const DEFAULT_VERSION_ARGS: &str = "--version";

#[derive(Error, Debug)]
pub enum FrameworkError {
    #[error("required tool '{name}' is not installed or not on PATH")]
    MissingTool { name: String },

    #[error("'{name}' could not be run: {message}")]
    ToolFailed { name: String, message: String },

    #[error("'{name}' version check failed: {source}")]
    Version {
        name: String,
        #[source]
        source: VersionError,
    },

    #[error("'{name}' version {found} does not satisfy '{constraint}'")]
    Unsatisfied {
        name: String,
        found: String,
        constraint: String,
    },
}

/// Checks every requirement, returning the first failure.
pub fn check_tools(requirements: &[ToolRequirement], tree: &Path) -> Result<(), FrameworkError> {
    for requirement in requirements {
        let output = probe(requirement, tree)?;
        let found = evaluate(requirement, &output, tree)?;
        info!("Found {} {} (requires '{}')", requirement.name, found, describe(requirement));
    }
    Ok(())
}

/// Runs the tool and returns its combined output.
fn probe(requirement: &ToolRequirement, tree: &Path) -> Result<String, FrameworkError> {
    let args = requirement
        .args
        .as_deref()
        .filter(|a| !a.trim().is_empty())
        .unwrap_or(DEFAULT_VERSION_ARGS);
    let (program, argv) = build_command(&requirement.name, args, Platform::current());
    let output = run_captured(&program, &argv, tree).map_err(|e| match e {
        ProcessError::NotFound { .. } => FrameworkError::MissingTool {
            name: requirement.name.clone(),
        },
        other => FrameworkError::ToolFailed {
            name: requirement.name.clone(),
            message: other.to_string(),
        },
    })?;
    if !output.success {
        return Err(FrameworkError::ToolFailed {
            name: requirement.name.clone(),
            message: format!("exited with status {:?}: {}", output.code, output.output.trim()),
        });
    }
    Ok(output.output)
}

/// Compares `output` with the requirement and returns the version found.
pub fn evaluate(
    requirement: &ToolRequirement,
    output: &str,
    tree: &Path,
) -> Result<String, FrameworkError> {
    let version_error = |source| FrameworkError::Version {
        name: requirement.name.clone(),
        source,
    };
    let pattern = requirement
        .pattern
        .as_deref()
        .filter(|p| !p.trim().is_empty())
        .unwrap_or(DEFAULT_PATTERN);

    let mut found = Version::init(output.trim(), pattern).map_err(version_error)?;
    found.split();
    debug!("Parsed '{}' version output as {}", requirement.name, found.raw());

    let matched = match requirement.comparator {
        Comparator::Semver => found.semver(&requirement.version),
        Comparator::Dotnet => match requirement.global.as_deref() {
            Some(global) => found.dotnet_global(&tree.join(global).to_string_lossy()),
            None => {
                let policy = requirement
                    .roll_forward
                    .as_deref()
                    .unwrap_or_default()
                    .parse::<RollForward>()
                    .map_err(version_error)?;
                let constraint = Version::init(&requirement.version, pattern).map_err(version_error)?;
                found.dotnet(constraint, policy)
            }
        },
    }
    .map_err(version_error)?;

    if !matched {
        return Err(FrameworkError::Unsatisfied {
            name: requirement.name.clone(),
            found: found.raw().to_string(),
            constraint: describe(requirement),
        });
    }
    Ok(found.raw().to_string())
}

fn describe(requirement: &ToolRequirement) -> String {
    match (&requirement.comparator, &requirement.global) {
        (Comparator::Dotnet, Some(global)) => format!("global.json at {}", global),
        (Comparator::Dotnet, None) => format!(
            "{} (roll forward: {})",
            requirement.version,
            requirement.roll_forward.as_deref().unwrap_or("disable")
        ),
        (Comparator::Semver, _) => requirement.version.clone(),
    }
}

// --- Unit Tests ---
#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn requirement(version: &str, comparator: Comparator) -> ToolRequirement {
        ToolRequirement {
            name: "dotnet".into(),
            version: version.into(),
            comparator,
            ..Default::default()
        }
    }

    #[test]
    fn test_semver_requirement() {
        let tree = tempdir().unwrap();
        let req = requirement(">=2.30", Comparator::Semver);
        let found = evaluate(&req, "git version 2.40.1\n", tree.path()).unwrap();
        assert_eq!(found, "2.40.1");

        let too_new = requirement("<2", Comparator::Semver);
        assert!(matches!(
            evaluate(&too_new, "git version 2.40.1", tree.path()),
            Err(FrameworkError::Unsatisfied { .. })
        ));
    }

    #[test]
    fn test_dotnet_roll_forward_requirement() {
        let tree = tempdir().unwrap();
        let mut req = requirement("6.0.100", Comparator::Dotnet);
        req.roll_forward = Some("latestFeature".into());
        assert!(evaluate(&req, "6.0.300", tree.path()).is_ok());

        req.roll_forward = None;
        assert!(matches!(
            evaluate(&req, "6.0.300", tree.path()),
            Err(FrameworkError::Unsatisfied { .. })
        ));
    }

    #[test]
    fn test_dotnet_global_json_requirement() {
        let tree = tempdir().unwrap();
        fs::write(
            tree.path().join("global.json"),
            r#"{"sdk": {"version": "8.0.100", "rollForward": "latestMinor"}}"#,
        )
        .unwrap();
        let mut req = requirement("", Comparator::Dotnet);
        req.global = Some("global.json".into());
        assert!(evaluate(&req, "8.2.100", tree.path()).is_ok());
        assert!(evaluate(&req, "9.0.100", tree.path()).is_err());
    }

    #[test]
    fn test_invalid_constraint_is_version_error() {
        let tree = tempdir().unwrap();
        let req = requirement("not a range", Comparator::Semver);
        assert!(matches!(
            evaluate(&req, "1.2.3", tree.path()),
            Err(FrameworkError::Version { .. })
        ));
    }

    #[test]
    fn test_missing_tool() {
        let tree = tempdir().unwrap();
        let req = ToolRequirement {
            name: "definitely-not-a-real-binary-4821".into(),
            version: "1".into(),
            ..Default::default()
        };
        let result = check_tools(&[req], tree.path());
        if cfg!(windows) {
            assert!(result.is_err());
        } else {
            assert!(matches!(result, Err(FrameworkError::MissingTool { .. })));
        }
    }
}
