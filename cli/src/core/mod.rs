//! # Stacks Core Infrastructure
//!
//! File: cli/src/core/mod.rs
//!
//! ## Overview
//!
//! Foundational components shared by every command:
//!
//! - `config`: configuration loading, path expansion and validation
//! - `error`: the application error type and `Result` alias
//! - `resources`: files embedded into the binary at compile time
//! - `templating`: Tera rendering against the configuration and project state
//! - `version`: version parsing and constraint evaluation (semver, .NET roll-forward)
//!
//! ```rust
//! use crate::core::config; // For loading configuration
//! use crate::core::error::{StacksError, Result}; // For error handling
//! use crate::core::templating::Replacements; // For rendering operation arguments
//! ```
//!
pub mod config;
pub mod error;
pub mod resources;
pub mod templating;
pub mod version;
