//! # Operation Executor (`commands::scaffold::operation`)
//!
//! File: cli/src/commands/scaffold/operation.rs
//!
//! ## Overview
//!
//! An operation is one templated unit of work declared in the settings document:
//!
//! - `cmd`: run `cmd` with `args` as an external process.
//! - `template`: render the files listed in `args` (relative to the working directory) in place.
//!
//! `cmd` and `args` are rendered with Tera against the live configuration and
//! project just before execution, so values assigned earlier in the run (such as
//! the project's directories) are visible. When command logging is enabled, the
//! rendered command line is appended to the command log before it runs. In
//! dry-run mode nothing is executed or rendered to disk; the operation is logged
//! as skipped.
//!
//! A phase runs its operations in order and stops at the first failure.
//!
use crate::common::fs::io::append_line;
use crate::common::process::{self, build_command, run_captured, split_args, Platform};
use crate::core::config::Config;
use crate::core::templating::Replacements;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Deserialize, Serialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    #[default]
    Cmd,
    Template,
}

#[derive(Deserialize, Serialize, Debug, Clone, Default)]
#[serde(deny_unknown_fields)]
pub struct Operation {
    #[serde(default)]
    pub action: Action,
    #[serde(default)]
    pub cmd: String,
    #[serde(default)]
    pub args: String,
    #[serde(default)]
    pub desc: String,
}

impl Operation {
    /// Description used in logs and errors.
    pub fn label(&self) -> String {
        if !self.desc.trim().is_empty() {
            return self.desc.trim().to_string();
        }
        match self.action {
            Action::Cmd => format!("{} {}", self.cmd, self.args).trim().to_string(),
            Action::Template => format!("render {}", self.args),
        }
    }
}

#[derive(Error, Debug)]
pub enum OperationError {
    #[error("'{desc}': failed to render: {source}")]
    Render {
        desc: String,
        #[source]
        source: tera::Error,
    },

    #[error("'{desc}': {source}")]
    Spawn {
        desc: String,
        #[source]
        source: process::ProcessError,
    },

    #[error("'{desc}': `{command}` exited with status {status}:\n{output}")]
    Failed {
        desc: String,
        command: String,
        status: String,
        output: String,
    },

    #[error("'{desc}': {message}")]
    Template { desc: String, message: String },

    #[error("'{desc}': failed to write command log: {message}")]
    CommandLog { desc: String, message: String },

    #[error("'{desc}': no command given")]
    MissingCommand { desc: String },
}

/// Runs one operation with `working_dir` as its current directory.
pub fn perform_operation<P: Serialize>(
    op: &Operation,
    config: &Config,
    project: &P,
    working_dir: &Path,
) -> Result<(), OperationError> {
    let desc = op.label();
    let replacements = Replacements::new(config, project);
    let render = |text: &str| {
        replacements.render(text).map_err(|source| OperationError::Render {
            desc: desc.clone(),
            source,
        })
    };

    match op.action {
        Action::Template => {
            let files = split_args(&render(&op.args)?);
            for file in files {
                let path = working_dir.join(&file);
                if config.options.dryrun {
                    info!("[dry-run] Skipping render of {}", path.display());
                    continue;
                }
                replacements
                    .render_file_in_place(&path)
                    .map_err(|e| OperationError::Template {
                        desc: desc.clone(),
                        message: format!("{:#}", e),
                    })?;
                debug!("Rendered {}", path.display());
            }
            Ok(())
        }
        Action::Cmd => {
            let command = render(&op.cmd)?.trim().to_string();
            if command.is_empty() {
                return Err(OperationError::MissingCommand { desc });
            }
            let args = render(&op.args)?;
            let line = format!("{} {}", command, args.trim()).trim().to_string();

            if config.options.cmdlog {
                append_line(&config.cmdlog_path(), &line).map_err(|e| {
                    OperationError::CommandLog {
                        desc: desc.clone(),
                        message: format!("{:#}", e),
                    }
                })?;
            }
            if config.options.dryrun {
                info!("[dry-run] Skipping '{}': {}", desc, line);
                return Ok(());
            }

            info!("Running '{}': {}", desc, line);
            let (program, argv) = build_command(&command, &args, Platform::current());
            let output = run_captured(&program, &argv, working_dir).map_err(|source| {
                OperationError::Spawn {
                    desc: desc.clone(),
                    source,
                }
            })?;
            if !output.success {
                return Err(OperationError::Failed {
                    desc,
                    command: line,
                    status: output
                        .code
                        .map_or_else(|| "signal".to_string(), |c| c.to_string()),
                    output: output.output.trim().to_string(),
                });
            }
            Ok(())
        }
    }
}

/// Runs `operations` in order, stopping at the first failure.
pub fn run_phase<P: Serialize>(
    phase: &str,
    operations: &[Operation],
    config: &Config,
    project: &P,
    working_dir: &Path,
) -> Result<(), OperationError> {
    info!(
        "Running {} phase: {} operation(s) in {}",
        phase,
        operations.len(),
        working_dir.display()
    );
    for op in operations {
        perform_operation(op, config, project, working_dir)?;
    }
    Ok(())
}
