//! # Stacks Embedded Resources (`core::resources`)
//!
//! File: cli/src/core/resources.rs
//!
//! Files compiled into the binary, looked up by name.
//!
//! | Name | Content |
//! |---|---|
//! | `settings_file` | default name of the settings document inside a template tree |
//! | `sample_config` | an annotated example configuration |
//!

/// Default settings document name.
pub const SETTINGS_FILE: &str = "settings_file";
/// Example configuration printed by `stacks sample-config`.
pub const SAMPLE_CONFIG: &str = "sample_config";

static RESOURCES: &[(&str, &str)] = &[
    (SETTINGS_FILE, "stacks.yml"),
    (SAMPLE_CONFIG, include_str!("../../resources/sample-config.toml")),
];

/// Returns the embedded resource called `name`.
pub fn get(name: &str) -> Option<&'static str> {
    RESOURCES
        .iter()
        .find(|(key, _)| *key == name)
        .map(|(_, content)| *content)
}

pub fn default_settings_file() -> &'static str {
    get(SETTINGS_FILE).unwrap_or("stacks.yml")
}
