//! Extension descriptor types
//!
//! A descriptor is one entry of the extension catalogue. It is immutable for
//! the duration of a run; everything learned while processing an extension
//! lives in the publish context instead.

use super::target::{TargetSpec, UNIVERSAL_TARGET};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Catalogue entry describing how to build one extension
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtensionDescriptor {
    /// Git URL of the extension source
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repository: Option<String>,

    /// Sub-directory of the repository containing the extension
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,

    /// Git ref to check out
    #[serde(default, rename = "ref", skip_serializing_if = "Option::is_none")]
    pub git_ref: Option<String>,

    /// Pinned upstream version
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    /// Custom build command lines, run verbatim in the extension directory
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom: Option<Vec<String>>,

    /// Command run after dependency installation in the standard build
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prepublish: Option<String>,

    /// Explicit artifact path relative to the extension directory
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extension_file: Option<String>,

    /// Declared target platforms
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<BTreeMap<String, TargetSpec>>,

    /// Secondary runtime (python) version required by the build
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub python_version: Option<String>,

    /// Pre-built artifact URLs keyed by target (or `universal`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub downloads: Option<BTreeMap<String, String>>,
}

impl ExtensionDescriptor {
    /// Select the build strategy for this descriptor
    pub fn strategy(&self) -> BuildStrategy {
        if self.downloads.as_ref().is_some_and(|d| !d.is_empty()) {
            return BuildStrategy::Prebuilt;
        }

        match &self.custom {
            Some(commands) => BuildStrategy::Custom {
                commands: commands.clone(),
            },
            None => BuildStrategy::Standard {
                prepublish: self.prepublish.clone(),
            },
        }
    }

    /// Enabled targets with their environment overrides, in name order
    pub fn enabled_targets(&self) -> Vec<(String, BTreeMap<String, String>)> {
        self.target
            .iter()
            .flatten()
            .filter(|(_, spec)| spec.is_enabled())
            .map(|(name, spec)| (name.clone(), spec.env()))
            .collect()
    }

    /// Whether a target is allowed by the descriptor
    ///
    /// Descriptors without a target map allow everything.
    pub fn allows_target(&self, target: &str) -> bool {
        match &self.target {
            None => true,
            Some(targets) => {
                target == UNIVERSAL_TARGET || targets.get(target).is_some_and(|t| t.is_enabled())
            }
        }
    }

    /// Git ref to check out: explicit ref, then `v<version>`, then `HEAD`
    pub fn resolved_ref(&self) -> String {
        if let Some(git_ref) = &self.git_ref {
            return git_ref.clone();
        }
        match &self.version {
            Some(version) => format!("v{}", version),
            None => "HEAD".to_string(),
        }
    }
}

/// How an extension's artifact is produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildStrategy {
    /// Artifacts are downloaded, nothing is built
    Prebuilt,

    /// Descriptor-supplied commands produce the artifact
    Custom { commands: Vec<String> },

    /// Package-manager install, optional prepublish, then packaging
    Standard { prepublish: Option<String> },
}

impl fmt::Display for BuildStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuildStrategy::Prebuilt => write!(f, "prebuilt"),
            BuildStrategy::Custom { .. } => write!(f, "custom"),
            BuildStrategy::Standard { .. } => write!(f, "standard"),
        }
    }
}
