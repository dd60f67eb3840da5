//! Target platform types
//!
//! A target is a platform/architecture variant of a packaged extension. The
//! catalogue declares targets either as a bare flag or as a structured entry
//! carrying environment-variable overrides for that target's build.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Target platforms accepted by the registry
pub const KNOWN_TARGETS: &[&str] = &[
    "win32-x64",
    "win32-arm64",
    "linux-x64",
    "linux-arm64",
    "linux-armhf",
    "alpine-x64",
    "alpine-arm64",
    "darwin-x64",
    "darwin-arm64",
    "web",
];

/// Key used in download maps for artifacts that are not platform specific
pub const UNIVERSAL_TARGET: &str = "universal";

/// Check whether a target name is one the registry understands
pub fn is_known_target(target: &str) -> bool {
    KNOWN_TARGETS.contains(&target)
}

/// Per-target configuration in the catalogue
///
/// ```json
/// "target": {
///   "win32-x64": true,
///   "linux-x64": { "env": { "NATIVE_ARCH": "x64" } }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TargetSpec {
    /// `true` enables the target with no overrides; `false` disables it
    Enabled(bool),

    /// Structured target configuration
    Config(TargetConfig),
}

impl TargetSpec {
    /// Whether the target should be built
    pub fn is_enabled(&self) -> bool {
        match self {
            TargetSpec::Enabled(enabled) => *enabled,
            TargetSpec::Config(_) => true,
        }
    }

    /// Environment overrides for this target (empty for flag targets)
    pub fn env(&self) -> BTreeMap<String, String> {
        match self {
            TargetSpec::Enabled(_) => BTreeMap::new(),
            TargetSpec::Config(config) => config.env.clone(),
        }
    }
}

/// Structured target configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetConfig {
    /// Environment variables set for this target's build commands
    #[serde(default)]
    pub env: BTreeMap<String, String>,
}
