//! # Stacks Version and Constraint Resolver
//!
//! File: cli/src/core/version.rs
//!
//! ## Overview
//!
//! Framework templates declare which tool versions they need (`dotnet`, `java`,
//! `terraform`, ...). This module turns the raw text a tool prints about itself
//! into a `Version` and evaluates it against one of two independent constraint
//! systems:
//!
//! - **Semantic-version ranges** (`~1.2.3`, `>= 1.0, < 2.0`, `^3 || ^4`)
//! - **.NET SDK roll-forward policies**, where the constraint is another `Version`
//!   (typically the `sdk.version` of a `global.json`) and the policy decides how far
//!   the installed SDK may move past it.
//!
//! ## Architecture
//!
//! A `Version` is created with a capture pattern containing named groups:
//! `version` narrows the raw text to the version itself, and `major`, `minor`,
//! `feature`, `patch` provide the numeric segments. `split()` reads the segments;
//! a pattern missing any of the four segment names degrades to an *empty* version
//! (all segments 0) instead of failing.
//!
//! The .NET SDK numbering `6.0.203` is read as major 6, minor 0, feature band 2,
//! patch 03, which is why the default pattern takes a single digit for `feature`.
//!
//! Constraint errors (`VersionError`) are kept separate from a negative match
//! (`Ok(false)`): the former is a defect in the declared requirement, the latter an
//! expected outcome.
//!
//! ## Examples
//!
//! ```rust
//! let mut found = Version::init("8.0.204", DEFAULT_PATTERN)?;
//! found.split();
//! assert!(found.semver(">= 6.0")?);
//!
//! let mut required = Version::init("6.0.200", DEFAULT_PATTERN)?;
//! required.split();
//! assert!(found.dotnet(required, RollForward::LatestMajor)?);
//! ```
//!
use regex::Regex;
use serde_json::Value;
use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

/// Default capture pattern, suitable for `x.y.z` style output such as
/// `git version 2.40.1` or `8.0.204`. The third component is optional.
pub const DEFAULT_PATTERN: &str = r"(?P<version>(?P<major>0|[1-9]\d*)\.(?P<minor>0|[1-9]\d*)(?:\.(?P<feature>[0-9])(?P<patch>[0-9]*))?)";

const SEGMENT_NAMES: [&str; 4] = ["major", "minor", "feature", "patch"];

/// Failures in declared versions or constraints.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VersionError {
    #[error("invalid version pattern '{pattern}': {message}")]
    Pattern { pattern: String, message: String },

    #[error("unable to parse version '{version}': {message}")]
    Version { version: String, message: String },

    #[error("invalid version constraint '{constraint}': {message}")]
    Constraint { constraint: String, message: String },

    #[error("version '{0}' has not been split into segments")]
    NotSplit(String),

    #[error("unknown roll-forward policy '{0}'")]
    UnknownPolicy(String),

    #[error("key '{0}' not found in document")]
    MissingKey(String),

    #[error("unable to parse document: {0}")]
    Parse(String),

    #[error("unable to read '{path}': {message}")]
    Io { path: String, message: String },
}

/// .NET SDK roll-forward policy.
///
/// The `major`/`minor`/`feature`/`patch` spellings used by `global.json` map onto
/// the corresponding `latest*` rule, since only one installed version is compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RollForward {
    /// Raw version strings must be equal.
    #[default]
    Disable,
    LatestMajor,
    LatestMinor,
    LatestFeature,
    LatestPatch,
}

impl FromStr for RollForward {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "disable" => Ok(RollForward::Disable),
            "latestmajor" | "major" => Ok(RollForward::LatestMajor),
            "latestminor" | "minor" => Ok(RollForward::LatestMinor),
            "latestfeature" | "feature" => Ok(RollForward::LatestFeature),
            "latestpatch" | "patch" => Ok(RollForward::LatestPatch),
            _ => Err(VersionError::UnknownPolicy(s.to_string())),
        }
    }
}

impl fmt::Display for RollForward {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RollForward::Disable => "disable",
            RollForward::LatestMajor => "latestMajor",
            RollForward::LatestMinor => "latestMinor",
            RollForward::LatestFeature => "latestFeature",
            RollForward::LatestPatch => "latestPatch",
        };
        f.write_str(name)
    }
}

/// The constraint last evaluated against a `Version`.
#[derive(Debug, Clone)]
pub enum Constraint {
    Semver(String),
    DotNet {
        version: Box<Version>,
        policy: RollForward,
    },
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Constraint::Semver(range) => write!(f, "semver '{}'", range),
            Constraint::DotNet { version, policy } => {
                write!(f, "dotnet {} (rollForward {})", version.raw(), policy)
            }
        }
    }
}

/// The `sdk` section of a `global.json` document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlobalSdk {
    pub version: String,
    pub roll_forward: Option<String>,
}

/// A parsed version string.
#[derive(Debug, Clone)]
pub struct Version {
    raw: String,
    pattern: Regex,
    pub major: u64,
    pub minor: u64,
    pub feature: u64,
    pub patch: u64,
    /// True when the pattern does not name all four segments (or did not match).
    pub empty: bool,
    split: bool,
    constraint: Option<Constraint>,
}

impl Version {
    /// Parses `raw` with `pattern`. When the pattern has a `version` group that
    /// matches, the version text is narrowed to that capture.
    pub fn init(raw: &str, pattern: &str) -> Result<Self, VersionError> {
        let regex = Regex::new(pattern).map_err(|e| VersionError::Pattern {
            pattern: pattern.to_string(),
            message: e.to_string(),
        })?;
        let trimmed = raw.trim();
        let narrowed = regex
            .captures(trimmed)
            .and_then(|caps| caps.name("version"))
            .map(|m| m.as_str().to_string())
            .unwrap_or_else(|| trimmed.to_string());
        Ok(Self {
            raw: narrowed,
            pattern: regex,
            major: 0,
            minor: 0,
            feature: 0,
            patch: 0,
            empty: false,
            split: false,
            constraint: None,
        })
    }

    /// The (narrowed) version text.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn is_split(&self) -> bool {
        self.split
    }

    pub fn constraint(&self) -> Option<&Constraint> {
        self.constraint.as_ref()
    }

    /// Decomposes the version into numeric segments.
    pub fn split(&mut self) {
        self.split = true;
        self.major = 0;
        self.minor = 0;
        self.feature = 0;
        self.patch = 0;

        let names: Vec<&str> = self.pattern.capture_names().flatten().collect();
        if !SEGMENT_NAMES.iter().all(|s| names.contains(s)) {
            self.empty = true;
            return;
        }
        let Some(caps) = self.pattern.captures(&self.raw) else {
            self.empty = true;
            return;
        };
        let segment = |name: &str| {
            caps.name(name)
                .and_then(|m| m.as_str().parse::<u64>().ok())
                .unwrap_or(0)
        };
        self.major = segment("major");
        self.minor = segment("minor");
        self.feature = segment("feature");
        self.patch = segment("patch");
        self.empty = false;
    }

    /// Checks the version against a semantic-version range constraint.
    pub fn semver(&mut self, constraint: &str) -> Result<bool, VersionError> {
        self.constraint = Some(Constraint::Semver(constraint.to_string()));
        let requirements = parse_requirements(constraint)?;
        let version = coerce_semver(&self.raw)?;
        Ok(requirements.iter().any(|req| req.matches(&version)))
    }

    /// Checks the version against another version using a .NET roll-forward policy.
    ///
    /// `self` must already be split. The constraint is split if it has not been.
    pub fn dotnet(&mut self, constraint: Version, policy: RollForward) -> Result<bool, VersionError> {
        if !self.split || self.empty {
            return Err(VersionError::NotSplit(self.raw.clone()));
        }
        let mut required = constraint;
        if !required.split {
            required.split();
        }
        if required.empty {
            return Err(VersionError::NotSplit(required.raw.clone()));
        }

        let matched = match policy {
            RollForward::Disable => self.raw == required.raw,
            RollForward::LatestMajor => self.major >= required.major,
            RollForward::LatestMinor => {
                self.major == required.major && self.minor >= required.minor
            }
            RollForward::LatestFeature => {
                self.major == required.major
                    && self.minor == required.minor
                    && self.feature >= required.feature
            }
            RollForward::LatestPatch => {
                self.major == required.major
                    && self.minor == required.minor
                    && self.feature == required.feature
                    && self.patch >= required.patch
            }
        };
        self.constraint = Some(Constraint::DotNet {
            version: Box::new(required),
            policy,
        });
        Ok(matched)
    }

    /// Checks the version against the `sdk` section of a `global.json` document,
    /// given either as a path or as raw JSON text.
    pub fn dotnet_global(&mut self, content_or_path: &str) -> Result<bool, VersionError> {
        let sdk = parse_global_json(content_or_path)?;
        let policy = match sdk.roll_forward.as_deref() {
            Some(p) => p.parse()?,
            None => RollForward::Disable,
        };
        let mut required = Version::init(&sdk.version, self.pattern.as_str())?;
        required.split();
        self.dotnet(required, policy)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Reads `sdk.version` and `sdk.rollForward` from a `global.json` document.
///
/// A missing `sdk.version` is reported as `MissingKey`; a missing `rollForward`
/// yields `None` so callers can fall back to exact matching.
pub fn parse_global_json(content_or_path: &str) -> Result<GlobalSdk, VersionError> {
    let trimmed = content_or_path.trim_start();
    let text = if trimmed.starts_with('{') {
        trimmed.to_string()
    } else {
        fs::read_to_string(Path::new(content_or_path)).map_err(|e| VersionError::Io {
            path: content_or_path.to_string(),
            message: e.to_string(),
        })?
    };
    let doc: Value = serde_json::from_str(&text).map_err(|e| VersionError::Parse(e.to_string()))?;
    let sdk = doc.get("sdk");
    let version = sdk
        .and_then(|s| s.get("version"))
        .and_then(Value::as_str)
        .ok_or_else(|| VersionError::MissingKey("sdk.version".to_string()))?;
    let roll_forward = sdk
        .and_then(|s| s.get("rollForward"))
        .and_then(Value::as_str)
        .map(str::to_string);
    Ok(GlobalSdk {
        version: version.to_string(),
        roll_forward,
    })
}

/// Parses a constraint string into alternatives (`||`), each a set of ANDed comparators.
fn parse_requirements(constraint: &str) -> Result<Vec<semver::VersionReq>, VersionError> {
    let mut requirements = Vec::new();
    for alternative in constraint.split("||") {
        let normalized = normalize_comparators(alternative);
        if normalized.is_empty() {
            return Err(VersionError::Constraint {
                constraint: constraint.to_string(),
                message: "empty comparator set".to_string(),
            });
        }
        let req = semver::VersionReq::parse(&normalized).map_err(|e| VersionError::Constraint {
            constraint: constraint.to_string(),
            message: e.to_string(),
        })?;
        requirements.push(req);
    }
    Ok(requirements)
}

/// Joins whitespace or comma separated comparators with `, `, re-attaching
/// operators written apart from their version (`>= 1.2` becomes `>=1.2`).
fn normalize_comparators(alternative: &str) -> String {
    let mut comparators: Vec<String> = Vec::new();
    let mut pending_op = String::new();
    for token in alternative
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|t| !t.is_empty())
    {
        if token.chars().all(|c| "=<>~^!".contains(c)) {
            pending_op.push_str(token);
            continue;
        }
        comparators.push(format!("{}{}", pending_op, token));
        pending_op.clear();
    }
    comparators.join(", ")
}

/// Turns tool output such as `v1.8.0_301` or `17.0` into a strict semantic version.
fn coerce_semver(raw: &str) -> Result<semver::Version, VersionError> {
    let cleaned = raw.replace('_', "");
    let cleaned = cleaned.trim().trim_start_matches(['v', 'V']);
    let core_end = cleaned
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(cleaned.len());
    let (core, rest) = cleaned.split_at(core_end);

    let mut parts = Vec::new();
    for part in core.split('.').filter(|p| !p.is_empty()) {
        let number = part.parse::<u64>().map_err(|e| VersionError::Version {
            version: raw.to_string(),
            message: e.to_string(),
        })?;
        parts.push(number.to_string());
    }
    if parts.is_empty() || parts.len() > 3 {
        return Err(VersionError::Version {
            version: raw.to_string(),
            message: "expected one to three numeric components".to_string(),
        });
    }
    while parts.len() < 3 {
        parts.push("0".to_string());
    }

    let candidate = format!("{}{}", parts.join("."), rest);
    semver::Version::parse(&candidate).map_err(|e| VersionError::Version {
        version: raw.to_string(),
        message: e.to_string(),
    })
}

// --- Unit Tests ---
#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const SDK_PATTERN: &str = r"(?P<major>0|[1-9]\d*)\.(?P<minor>0|[1-9]\d*)\.(?P<feature>[0-9]{1})(?P<patch>[0-9]*)";

    fn split(raw: &str, pattern: &str) -> Version {
        let mut v = Version::init(raw, pattern).unwrap();
        v.split();
        v
    }

    #[test]
    fn test_split_segments() {
        let v = split("100.98.99", SDK_PATTERN);
        assert!(!v.empty);
        assert_eq!((v.major, v.minor, v.feature, v.patch), (100, 98, 9, 9));
    }

    #[test]
    fn test_split_missing_group_is_empty() {
        let patterns = [
            r"(?P<major>\d+)\.(?P<minor>\d+)\.(?P<patch>\d+)",
            r"(?P<version>\d+\.\d+)",
            r"\d+",
        ];
        for pattern in patterns {
            let v = split("100.98.99", pattern);
            assert!(v.empty, "pattern {} should produce an empty version", pattern);
            assert_eq!((v.major, v.minor, v.feature, v.patch), (0, 0, 0, 0));
        }
    }

    #[test]
    fn test_version_group_narrows_raw_output() {
        let v = Version::init("git version 2.40.1 (Apple Git-143)", DEFAULT_PATTERN).unwrap();
        assert_eq!(v.raw(), "2.40.1");
    }

    #[test]
    fn test_invalid_pattern() {
        let err = Version::init("1.0.0", "(?P<major>").unwrap_err();
        assert!(matches!(err, VersionError::Pattern { .. }));
    }

    #[test]
    fn test_semver_tilde() {
        let mut v = split("100.98.99", SDK_PATTERN);
        assert!(v.semver("~100.98.99").unwrap());
        assert!(!v.semver("~100.98.100").unwrap());
        assert!(matches!(v.constraint(), Some(Constraint::Semver(c)) if c == "~100.98.100"));
        assert_eq!(v.constraint().unwrap().to_string(), "semver '~100.98.100'");
    }

    #[test]
    fn test_semver_ranges() {
        let mut v = Version::init("1.8.0_301", DEFAULT_PATTERN).unwrap();
        assert!(v.semver(">= 1.8").unwrap());
        let mut node = Version::init("v20.11.1", DEFAULT_PATTERN).unwrap();
        assert!(node.semver(">=18.0.0 <21").unwrap());
        assert!(node.semver("^16 || ^20").unwrap());
        assert!(!node.semver("^16 || ^18").unwrap());
    }

    #[test]
    fn test_semver_errors_are_typed() {
        let mut v = Version::init("1.2.3", DEFAULT_PATTERN).unwrap();
        assert!(matches!(
            v.semver(">>> nonsense"),
            Err(VersionError::Constraint { .. })
        ));
        let mut bad = Version::init("not-a-version", r"(?P<x>x)").unwrap();
        assert!(matches!(
            bad.semver(">= 1.0"),
            Err(VersionError::Version { .. })
        ));
    }

    #[test]
    fn test_dotnet_roll_forward_table() {
        let cases = [
            ("6.0.200", RollForward::LatestMajor, "8.0.200", true),
            ("6.0.200", RollForward::LatestMinor, "6.1.200", true),
            ("6.0.200", RollForward::LatestFeature, "6.0.300", true),
            ("6.0.200", RollForward::LatestPatch, "6.0.250", true),
            ("6.0.250", RollForward::LatestPatch, "6.0.225", false),
            ("6.0.200", RollForward::LatestMinor, "7.0.100", false),
            ("6.0.200", RollForward::LatestFeature, "6.1.300", false),
            ("6.0.200", RollForward::Disable, "6.0.200", true),
            ("6.0.200", RollForward::Disable, "6.0.201", false),
        ];
        for (required, policy, found, expected) in cases {
            let mut v = split(found, SDK_PATTERN);
            let c = split(required, SDK_PATTERN);
            assert_eq!(
                v.dotnet(c, policy).unwrap(),
                expected,
                "found {} against {} with {}",
                found,
                required,
                policy
            );
        }
    }

    #[test]
    fn test_dotnet_requires_split() {
        let mut v = Version::init("6.0.200", SDK_PATTERN).unwrap();
        let c = split("6.0.100", SDK_PATTERN);
        assert!(matches!(
            v.dotnet(c, RollForward::LatestPatch),
            Err(VersionError::NotSplit(_))
        ));
    }

    #[test]
    fn test_roll_forward_parse() {
        assert_eq!("latestMajor".parse::<RollForward>().unwrap(), RollForward::LatestMajor);
        assert_eq!("patch".parse::<RollForward>().unwrap(), RollForward::LatestPatch);
        assert_eq!("".parse::<RollForward>().unwrap(), RollForward::Disable);
        assert!(matches!(
            "sideways".parse::<RollForward>(),
            Err(VersionError::UnknownPolicy(_))
        ));
    }

    #[test]
    fn test_dotnet_global_from_content() {
        let mut v = split("6.0.300", SDK_PATTERN);
        let doc = r#"{ "sdk": { "version": "6.0.200", "rollForward": "latestFeature" } }"#;
        assert!(v.dotnet_global(doc).unwrap());
        assert_eq!(
            v.constraint().unwrap().to_string(),
            "dotnet 6.0.200 (rollForward latestFeature)"
        );
    }

    #[test]
    fn test_dotnet_global_from_path_without_policy() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("global.json");
        std::fs::write(&path, r#"{ "sdk": { "version": "6.0.200" } }"#).unwrap();
        let mut exact = split("6.0.200", SDK_PATTERN);
        assert!(exact.dotnet_global(path.to_str().unwrap()).unwrap());
        let mut newer = split("6.0.201", SDK_PATTERN);
        assert!(!newer.dotnet_global(path.to_str().unwrap()).unwrap());
    }

    #[test]
    fn test_global_json_missing_key_vs_parse_error() {
        assert_eq!(
            parse_global_json(r#"{ "sdk": { "rollForward": "latestMajor" } }"#),
            Err(VersionError::MissingKey("sdk.version".to_string()))
        );
        assert!(matches!(
            parse_global_json("{ not json"),
            Err(VersionError::Parse(_))
        ));
        let sdk = parse_global_json(r#"{"sdk":{"version":"8.0.100"}}"#).unwrap();
        assert_eq!(sdk.roll_forward, None);
    }
}
