//! Per-extension run state
//!
//! The publish context is created once per extension and filled in as the
//! workflow moves from resolution to build to validation. Child processes never
//! read it directly: each build derives a `BuildEnvironment` from it, which is
//! passed explicitly to every command spawned for that build.

use chrono::{DateTime, Utc};
use semver::Version;
use std::collections::BTreeMap;
use std::path::PathBuf;

use super::extension_id::ExtensionId;
use super::target::UNIVERSAL_TARGET;

/// Mutable state for one extension's run
#[derive(Debug, Clone, Default)]
pub struct PublishContext {
    /// Version currently published on the registry
    pub registry_version: Option<Version>,

    /// When the registry entry was last updated
    pub registry_timestamp: Option<DateTime<Utc>>,

    /// Version requested by the catalogue (pinned upstream version)
    pub requested_version: Option<String>,

    /// Latest version known upstream
    pub upstream_version: Option<String>,

    /// Source repository URL
    pub repository: Option<String>,

    /// Git ref to check out
    pub git_ref: Option<String>,

    /// Local checkout of the repository, once materialized
    pub source_dir: Option<PathBuf>,

    /// Resolved semantic version of the built artifact
    pub version: Option<Version>,

    /// Publish even when the registry already has this version
    pub force: bool,

    /// Downloaded pre-built artifacts keyed by target
    pub files: Option<BTreeMap<String, PathBuf>>,
}

/// One build to perform, as produced by the target matrix
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TargetBuild {
    /// Target platform, `None` for a universal build
    pub target: Option<String>,

    /// Environment overrides for this target
    pub env: BTreeMap<String, String>,

    /// Pre-built artifact for this target, skipping the build
    pub file: Option<PathBuf>,
}

impl TargetBuild {
    /// A single build with no target
    pub fn universal() -> Self {
        Self::default()
    }

    /// Label used in logs and error messages
    pub fn label(&self) -> &str {
        self.target.as_deref().unwrap_or(UNIVERSAL_TARGET)
    }
}

/// Packaged artifact produced by a successful build
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildResult {
    /// Path to the finalized artifact in the artifact directory
    pub artifact: PathBuf,

    /// Target platform of the artifact
    pub target: Option<String>,
}

/// Environment variables for one build's child processes
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildEnvironment {
    vars: BTreeMap<String, String>,
}

impl BuildEnvironment {
    /// Identity and version variables for an extension build
    pub fn for_build(id: &ExtensionId, context: &PublishContext, build: &TargetBuild) -> Self {
        let mut vars = BTreeMap::new();
        vars.insert("EXTENSION_ID".to_string(), id.to_string());
        vars.insert("EXTENSION_PUBLISHER".to_string(), id.namespace().to_string());
        vars.insert("EXTENSION_NAME".to_string(), id.name().to_string());

        if let Some(version) = &context.requested_version {
            vars.insert("VERSION".to_string(), version.clone());
        }
        if let Some(version) = &context.upstream_version {
            vars.insert("MS_VERSION".to_string(), version.clone());
        }
        if let Some(version) = &context.registry_version {
            vars.insert("OVSX_VERSION".to_string(), version.to_string());
        }
        if let Some(target) = &build.target {
            vars.insert("TARGET_PLATFORM".to_string(), target.clone());
        }

        vars.extend(build.env.clone());
        Self { vars }
    }

    /// Set or replace a variable
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.vars.insert(key.into(), value.into());
    }

    /// Look up a variable
    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    /// All variables
    pub fn vars(&self) -> &BTreeMap<String, String> {
        &self.vars
    }
}
