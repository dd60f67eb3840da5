//! Run-wide settings
//!
//! Settings are assembled once by the CLI (flags and environment) and are
//! read-only for the rest of the run.

use std::collections::BTreeSet;
use std::fmt;
use std::path::PathBuf;

/// Default registry endpoint
pub const DEFAULT_REGISTRY_URL: &str = "https://open-vsx.org";

/// Default artifact directory, relative to the working directory
pub const DEFAULT_ARTIFACTS_DIR: &str = "artifacts";

/// Extensions whose owners must publish them; a dependency on one of these
/// cannot be satisfied by this pipeline.
pub const DEFAULT_UNPUBLISHABLE: &[&str] = &[
    "ms-vscode-remote.remote-ssh",
    "ms-vscode-remote.remote-containers",
    "ms-vscode-remote.remote-wsl",
    "ms-vscode.remote-explorer",
    "ms-vscode.cpptools",
    "ms-dotnettools.csharp",
    "ms-dotnettools.vscode-dotnet-runtime",
    "ms-python.vscode-pylance",
    "ms-vsliveshare.vsliveshare",
    "github.copilot",
    "github.copilot-chat",
];

/// Settings for one run of the pipeline
#[derive(Clone)]
pub struct Settings {
    /// Registry base URL
    pub registry_url: String,

    /// Registry access credential
    pub token: Option<String>,

    /// Build and validate only
    pub skip_publish: bool,

    /// Publish even when the registry already has the built version
    pub force: bool,

    /// Require every dependency to exist on the registry, even ones the
    /// catalogue knows about
    pub strict_dependencies: bool,

    /// Where finalized artifacts accumulate
    pub artifacts_dir: PathBuf,

    /// Scratch space for checkouts and downloads
    pub work_dir: PathBuf,

    /// Command confirming a license when no manifest declares one
    pub license_check: Option<String>,

    /// Dependencies that require their own author to publish them
    pub unpublishable: BTreeSet<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            registry_url: DEFAULT_REGISTRY_URL.to_string(),
            token: None,
            skip_publish: false,
            force: false,
            strict_dependencies: false,
            artifacts_dir: PathBuf::from(DEFAULT_ARTIFACTS_DIR),
            work_dir: std::env::temp_dir().join("vsxpub"),
            license_check: None,
            unpublishable: DEFAULT_UNPUBLISHABLE
                .iter()
                .map(|id| id.to_ascii_lowercase())
                .collect(),
        }
    }
}

impl Settings {
    /// Whether a registry credential is configured
    pub fn has_credential(&self) -> bool {
        self.token.as_deref().is_some_and(|t| !t.trim().is_empty())
    }

    /// Whether a dependency is on the cannot-be-auto-published list
    pub fn is_unpublishable(&self, id: &str) -> bool {
        self.unpublishable.contains(&id.to_ascii_lowercase())
    }
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("registry_url", &self.registry_url)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("skip_publish", &self.skip_publish)
            .field("force", &self.force)
            .field("strict_dependencies", &self.strict_dependencies)
            .field("artifacts_dir", &self.artifacts_dir)
            .field("work_dir", &self.work_dir)
            .field("license_check", &self.license_check)
            .field("unpublishable", &self.unpublishable.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.registry_url, DEFAULT_REGISTRY_URL);
        assert!(!settings.has_credential());
        assert!(!settings.skip_publish);
        assert!(!settings.force);
    }

    #[test]
    fn test_blank_token_is_not_a_credential() {
        let settings = Settings {
            token: Some("   ".to_string()),
            ..Default::default()
        };
        assert!(!settings.has_credential());
    }

    #[test]
    fn test_unpublishable_lookup_is_case_insensitive() {
        let settings = Settings::default();
        assert!(settings.is_unpublishable("MS-Vscode-Remote.Remote-SSH"));
        assert!(!settings.is_unpublishable("redhat.java"));
    }

    #[test]
    fn test_debug_redacts_token() {
        let settings = Settings {
            token: Some("super-secret".to_string()),
            ..Default::default()
        };
        let debug = format!("{:?}", settings);
        assert!(!debug.contains("super-secret"));
        assert!(debug.contains("<redacted>"));
    }
}
