//! # Stacks Archive Utilities Module (`common::archive`)
//!
//! File: cli/src/common/archive/mod.rs
//!
//! ## Overview
//!
//! Archive handling for downloaded templates. Git hosting archives and NuGet
//! packages are both ZIP files, so the module currently has a single submodule:
//!
//! - **`unzip`**: extraction of ZIP data (in memory or on disk) and archive-root detection.
//!
//! ```rust
//! use crate::common::archive::unzip;
//!
//! let root = unzip::extract_bytes(&bytes, &destination)?;
//! ```
//!

pub mod unzip;
