//! # Stacks Sample Configuration Command (`commands::sample_config`)
//!
//! File: cli/src/commands/sample_config.rs
//!
//! Prints the annotated example configuration embedded in the binary:
//!
//! ```bash
//! stacks sample-config > stacks.toml
//! ```
//!
use crate::core::error::{Result, StacksError};
use crate::core::resources;
use anyhow::anyhow;
use clap::Parser;

/// Arguments for `stacks sample-config` (none).
#[derive(Parser, Debug)]
pub struct SampleConfigArgs {}

pub async fn handle_sample_config(_args: SampleConfigArgs) -> Result<()> {
    let sample = resources::get(resources::SAMPLE_CONFIG).ok_or_else(|| {
        anyhow!(StacksError::Config(
            "sample configuration is not embedded in this build".to_string()
        ))
    })?;
    print!("{}", sample);
    Ok(())
}
