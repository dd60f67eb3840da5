//! Error types for the build and publish pipeline

use thiserror::Error;

/// Result type alias using the pipeline's error type
pub type Result<T> = std::result::Result<T, PipelineError>;

/// Marker the registry uses when a version already exists
const ALREADY_PUBLISHED: &str = "is already published";

/// Errors raised while building, validating or publishing an extension
#[derive(Error, Debug)]
pub enum PipelineError {
    /// No registry credential configured
    #[error("Registry access token is not set (OVSX_PAT); publishing requires a credential")]
    MissingCredential,

    /// Descriptor gives us nothing to build from
    #[error("{id}: no repository and no pre-built artifact to build from")]
    MissingSource { id: String },

    /// A child process could not be started
    #[error("Failed to run `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// A child process exited unsuccessfully
    #[error("`{command}` failed ({}): {stderr}", exit_label(.code))]
    CommandFailed {
        command: String,
        code: Option<i32>,
        stderr: String,
    },

    /// Build finished but the expected artifact is not there
    #[error("{id}: no artifact found for target {target} (looked for {pattern})")]
    ArtifactNotFound {
        id: String,
        target: String,
        pattern: String,
    },

    /// Neither manifest form yields a version
    #[error("{id}: could not resolve a version for target {target} from the package manifest or extension.vsixmanifest")]
    MissingVersion { id: String, target: String },

    /// Manifest version is not semver
    #[error("{id}: manifest version '{version}' is not a valid semantic version")]
    InvalidVersion { id: String, version: String },

    /// Registry is ahead of what the catalogue builds
    #[error("{id}: out-of-date configuration, the registry has {registry} which is newer than the built version {resolved}")]
    StaleConfiguration {
        id: String,
        registry: String,
        resolved: String,
    },

    /// No license anywhere
    #[error("{id}: license is missing")]
    LicenseMissing { id: String },

    /// Dependency on an extension only its author may publish
    #[error("{id} depends on {dependency}, which cannot be published automatically; the author of {dependency} has to publish it to the registry first")]
    UnpublishableDependency { id: String, dependency: String },

    /// Dependencies absent from the registry
    #[error("{id}: dependencies missing from the registry: {}", .missing.join(", "))]
    MissingDependencies { id: String, missing: Vec<String> },

    /// Registry already has this exact artifact
    #[error("{id} {version} is already published")]
    AlreadyPublished { id: String, version: String },

    /// Registry answered with an error
    #[error("Registry request failed ({}): {message}", status_label(.status))]
    Registry { status: Option<u16>, message: String },

    /// Pre-built artifact could not be downloaded
    #[error("Download of {url} failed (HTTP {status})")]
    Download { url: String, status: u16 },

    /// Recovery transform failed during a retried install
    #[error("{id}: recovery '{transform}' failed: {source}")]
    RecoveryFailed {
        id: String,
        transform: String,
        #[source]
        source: Box<PipelineError>,
    },

    /// Install failed again after the recovery transform was applied
    #[error("{id}: dependency install still failing after '{transform}' ({source}); first failure: {first_error}")]
    InstallRetryFailed {
        id: String,
        transform: String,
        first_error: String,
        #[source]
        source: Box<PipelineError>,
    },

    /// HTTP transport error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Catalogue or id error from vsxpub-core
    #[error(transparent)]
    Core(#[from] vsxpub_core::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Artifact is not a readable zip archive
    #[error("Archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    /// Blocking task panicked or was cancelled
    #[error("Background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    /// Bad glob pattern
    #[error("Invalid artifact pattern: {0}")]
    Pattern(#[from] glob::PatternError),
}

fn exit_label(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {}", code),
        None => "terminated by signal".to_string(),
    }
}

fn status_label(status: &Option<u16>) -> String {
    match status {
        Some(status) => format!("HTTP {}", status),
        None => "no status".to_string(),
    }
}

impl PipelineError {
    /// Registry error from a response body
    pub fn registry(status: Option<u16>, message: impl Into<String>) -> Self {
        Self::Registry {
            status,
            message: message.into(),
        }
    }

    /// "Already published" is success-equivalent: the registry has the artifact
    pub fn is_benign(&self) -> bool {
        matches!(self, PipelineError::AlreadyPublished { .. })
            || self.to_string().contains(ALREADY_PUBLISHED)
    }

    /// Configuration errors abort the whole run: no credential, or one the
    /// registry refuses
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            PipelineError::MissingCredential
                | PipelineError::Registry {
                    status: Some(401 | 403),
                    ..
                }
        )
    }
}
