//! # Stacks Error Types
//!
//! File: cli/src/core/error.rs
//!
//! ## Overview
//!
//! This module defines the application-level error type used throughout the
//! Stacks CLI. Domain components that need callers to tell failure kinds apart
//! carry their own typed enums next to the code that produces them:
//!
//! - `core::version::VersionError`: unparsable constraints, missing `sdk.version`
//! - `common::download::DownloadError`: transport failures, HTTP status, corrupt archives
//! - `commands::scaffold::operation::OperationError`: render and external command failures
//! - `commands::scaffold::framework::FrameworkError`: missing or out-of-range tools
//!
//! ## Architecture
//!
//! The error system mirrors the rest of the CLI:
//! - `StacksError`: a `thiserror` enum for application-level failures
//! - `Result<T>`: an alias for `anyhow::Result<T>` used by plumbing code that only
//!   needs to attach context and propagate
//!
//! ## Examples
//!
//! ```rust
//! // Return a specific error type
//! if !path.exists() {
//!     return Err(StacksError::FileSystem(format!("Path not found: {}", path.display())))?;
//! }
//!
//! // Typed errors survive the trip through anyhow
//! let cleanup = e.downcast_ref::<StacksError>();
//! ```
//!
use thiserror::Error;

/// Custom error type for the Stacks application.
#[derive(Error, Debug)]
pub enum StacksError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Filesystem error: {0}")]
    FileSystem(String),

    #[error("Settings error in '{path}': {message}")]
    Settings { path: String, message: String },

    #[error("Template rendering error: {source}")]
    Template {
        #[from]
        source: tera::Error,
    },

    #[error("Failed to remove temporary directory '{path}': {message}")]
    TempCleanup { path: String, message: String },
}

/// Type alias for Result using anyhow::Error for broad compatibility.
pub type Result<T> = anyhow::Result<T>;

// --- Unit Tests ---
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let config_err = StacksError::Config("Missing setting 'foo'".to_string());
        assert_eq!(
            config_err.to_string(),
            "Configuration error: Missing setting 'foo'"
        );

        let settings_err = StacksError::Settings {
            path: "/tmp/x/stacks.yml".into(),
            message: "invalid type".into(),
        };
        assert_eq!(
            settings_err.to_string(),
            "Settings error in '/tmp/x/stacks.yml': invalid type"
        );

        let cleanup = StacksError::TempCleanup {
            path: "/tmp/stacks-1".into(),
            message: "permission denied".into(),
        };
        assert!(cleanup.to_string().contains("/tmp/stacks-1"));
    }

    #[test]
    fn test_downcast_from_anyhow() {
        let err: anyhow::Error = StacksError::TempCleanup {
            path: "p".into(),
            message: "m".into(),
        }
        .into();
        assert!(matches!(
            err.downcast_ref::<StacksError>(),
            Some(StacksError::TempCleanup { .. })
        ));
    }
}
