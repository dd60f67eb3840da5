//! Fallback license confirmation
//!
//! Consulted by the license gate only when neither manifest declares a license.

use crate::archive::ArchiveReader;
use crate::error::{PipelineError, Result};
use crate::process::{CommandSpec, ProcessRunner};
use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// License files looked for inside an artifact
pub const LICENSE_ENTRIES: &[&str] = &[
    "extension/LICENSE",
    "extension/LICENSE.md",
    "extension/LICENSE.txt",
];

/// Confirms that an artifact ships a license
#[async_trait]
pub trait LicenseChecker: Send + Sync {
    async fn confirm(&self, artifact: &Path, extension_dir: Option<&Path>) -> Result<bool>;
}

/// Looks for a license file inside the artifact
pub struct ArchiveLicenseChecker {
    reader: Arc<dyn ArchiveReader>,
}

impl ArchiveLicenseChecker {
    pub fn new(reader: Arc<dyn ArchiveReader>) -> Self {
        Self { reader }
    }
}

#[async_trait]
impl LicenseChecker for ArchiveLicenseChecker {
    async fn confirm(&self, artifact: &Path, _extension_dir: Option<&Path>) -> Result<bool> {
        for entry in LICENSE_ENTRIES {
            if let Some(content) = self.reader.read_entry(artifact, entry).await? {
                if !content.trim().is_empty() {
                    debug!("License confirmed by {}", entry);
                    return Ok(true);
                }
            }
        }
        Ok(false)
    }
}

/// Runs an external license checker; exit status 0 confirms
pub struct CommandLicenseChecker {
    runner: Arc<dyn ProcessRunner>,
    command: String,
}

impl CommandLicenseChecker {
    pub fn new(runner: Arc<dyn ProcessRunner>, command: impl Into<String>) -> Self {
        Self {
            runner,
            command: command.into(),
        }
    }
}

#[async_trait]
impl LicenseChecker for CommandLicenseChecker {
    async fn confirm(&self, artifact: &Path, extension_dir: Option<&Path>) -> Result<bool> {
        let mut spec = CommandSpec::shell(&self.command)
            .var("ARTIFACT", artifact.to_string_lossy())
            .quiet();
        if let Some(dir) = extension_dir {
            spec = spec.var("EXTENSION_DIR", dir.to_string_lossy()).cwd(dir);
        }

        match self.runner.run(&spec).await {
            Ok(_) => Ok(true),
            Err(PipelineError::CommandFailed { stderr, .. }) => {
                debug!("License check rejected {:?}: {}", artifact, stderr);
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }
}
