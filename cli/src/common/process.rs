//! # Stacks Process Execution Utilities (`common::process`)
//!
//! File: cli/src/common/process.rs
//!
//! ## Overview
//!
//! External command execution for operations, framework version probes and
//! version-control bootstrap:
//!
//! - **Argument splitting**: `split_args` turns a rendered argument string into an argv
//!   array, keeping single- or double-quoted substrings together.
//! - **Platform wrapping**: `build_command` runs the program directly on POSIX systems and
//!   wraps it as `cmd /C <program> <args...>` on Windows, where executables referenced by
//!   name (e.g. `.cmd` shims) do not resolve the same way.
//! - **Capture**: `run_captured` waits for the process and returns its exit status with
//!   stdout and stderr combined.
//!
//! Commands block until they exit. There is no timeout.
//!
//! ## Usage
//!
//! ```rust
//! let (program, argv) = build_command("dotnet", "new -i .", Platform::current());
//! let output = run_captured(&program, &argv, &temp_dir)?;
//! if !output.success { /* ... */ }
//! ```
//!
use std::path::Path;
use std::process::Command;
use thiserror::Error;
use tracing::debug;

/// Target platform family for command construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Windows,
    Posix,
}

impl Platform {
    pub fn current() -> Self {
        if cfg!(windows) {
            Platform::Windows
        } else {
            Platform::Posix
        }
    }
}

#[derive(Error, Debug)]
pub enum ProcessError {
    #[error("command '{program}' was not found (is it installed and on PATH?)")]
    NotFound { program: String },

    #[error("failed to start '{program}': {message}")]
    Spawn { program: String, message: String },
}

/// Result of a finished process.
#[derive(Debug, Clone)]
pub struct CommandOutput {
    pub success: bool,
    /// Exit code, `None` when terminated by a signal.
    pub code: Option<i32>,
    /// stdout followed by stderr.
    pub output: String,
}

/// Splits an argument string on whitespace, honouring single and double quotes.
///
/// Quotes group characters into one token and are removed. An unterminated quote
/// runs to the end of the string.
pub fn split_args(input: &str) -> Vec<String> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut quote: Option<char> = None;
    let mut in_token = false;

    for c in input.chars() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => current.push(c),
            None if c == '"' || c == '\'' => {
                quote = Some(c);
                in_token = true;
            }
            None if c.is_whitespace() => {
                if in_token {
                    args.push(std::mem::take(&mut current));
                    in_token = false;
                }
            }
            None => {
                current.push(c);
                in_token = true;
            }
        }
    }
    if in_token {
        args.push(current);
    }
    args
}

/// Builds the program and argv for `command` with the rendered `args` string.
pub fn build_command(command: &str, args: &str, platform: Platform) -> (String, Vec<String>) {
    let mut argv = split_args(args);
    match platform {
        Platform::Posix => (command.to_string(), argv),
        Platform::Windows => {
            let mut wrapped = vec!["/C".to_string(), command.to_string()];
            wrapped.append(&mut argv);
            ("cmd".to_string(), wrapped)
        }
    }
}

/// Runs `program` in `cwd` and waits for it, capturing combined output.
pub fn run_captured(program: &str, args: &[String], cwd: &Path) -> Result<CommandOutput, ProcessError> {
    debug!("Running {:?} {:?} in {:?}", program, args, cwd);
    let output = Command::new(program)
        .args(args)
        .current_dir(cwd)
        .output()
        .map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => ProcessError::NotFound {
                program: program.to_string(),
            },
            _ => ProcessError::Spawn {
                program: program.to_string(),
                message: e.to_string(),
            },
        })?;

    let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
    combined.push_str(&String::from_utf8_lossy(&output.stderr));
    debug!(
        "{:?} exited with {:?}, output: {}",
        program,
        output.status.code(),
        combined.trim()
    );
    Ok(CommandOutput {
        success: output.status.success(),
        code: output.status.code(),
        output: combined,
    })
}
