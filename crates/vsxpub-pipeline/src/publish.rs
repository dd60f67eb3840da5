//! Publish gate
//!
//! Verifies each artifact's identity against the requested id, makes sure the
//! namespace exists and publishes. Problems with one artifact never stop the
//! others; only a missing credential, or one the registry refuses, stops the
//! gate itself.

use crate::archive::{read_manifest, ArchiveReader};
use crate::error::{PipelineError, Result};
use crate::registry::{PublishedExtension, RegistryClient};
use std::path::PathBuf;
use tracing::{error, info};
use vsxpub_core::types::{BuildResult, ExtensionId};
use vsxpub_core::Settings;

/// What happened to each artifact handed to the gate
#[derive(Debug, Default)]
pub struct PublishReport {
    pub published: Vec<PublishedExtension>,
    /// Artifacts the registry already had
    pub already_published: Vec<PathBuf>,
    /// Artifacts whose manifest names a different extension
    pub mismatched: Vec<PathBuf>,
    pub failed: Vec<(PathBuf, PipelineError)>,
}

impl PublishReport {
    /// Mismatches and non-benign errors fail the run
    pub fn has_failures(&self) -> bool {
        !self.mismatched.is_empty() || !self.failed.is_empty()
    }
}

/// The registry access token, which publishing cannot do without
pub fn credential(settings: &Settings) -> Result<&str> {
    match settings.token.as_deref() {
        Some(token) if settings.has_credential() => Ok(token),
        _ => Err(PipelineError::MissingCredential),
    }
}

pub struct PublishGate<'a> {
    settings: &'a Settings,
    archive: &'a dyn ArchiveReader,
    registry: &'a dyn RegistryClient,
}

impl<'a> PublishGate<'a> {
    pub fn new(
        settings: &'a Settings,
        archive: &'a dyn ArchiveReader,
        registry: &'a dyn RegistryClient,
    ) -> Self {
        Self {
            settings,
            archive,
            registry,
        }
    }

    /// Publish every artifact built for `id`
    pub async fn publish(
        &self,
        id: &ExtensionId,
        artifacts: &[BuildResult],
    ) -> Result<PublishReport> {
        let token = credential(self.settings)?;

        let mut report = PublishReport::default();
        let mut namespace_ready = false;

        for result in artifacts {
            let artifact = &result.artifact;

            let manifest = match read_manifest(self.archive, artifact).await {
                Ok(manifest) => manifest,
                Err(e) => {
                    error!(extension = %id, "Cannot read manifest of {:?}: {}", artifact, e);
                    report.failed.push((artifact.clone(), e));
                    continue;
                }
            };

            let publisher = manifest.publisher.as_deref().unwrap_or_default();
            let name = manifest.name.as_deref().unwrap_or_default();
            if !id.matches(publisher, name) {
                error!(
                    extension = %id,
                    "Identity mismatch in {:?}: manifest declares {}.{}, skipping",
                    artifact, publisher, name
                );
                report.mismatched.push(artifact.clone());
                continue;
            }

            if !namespace_ready {
                if let Err(e) = self.registry.create_namespace(id.namespace(), token).await {
                    if e.is_fatal() {
                        return Err(e);
                    }
                    error!(extension = %id, "Cannot create namespace {}: {}", id.namespace(), e);
                    report.failed.push((artifact.clone(), e));
                    continue;
                }
                namespace_ready = true;
            }

            match self.registry.publish(artifact, token).await {
                Ok(published) => {
                    info!(extension = %id, "Published to {}", published.location);
                    report.published.push(published);
                }
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) if e.is_benign() => {
                    info!(extension = %id, "{}", e);
                    report.already_published.push(artifact.clone());
                }
                Err(e) => {
                    error!(extension = %id, "Publishing {:?} failed: {}", artifact, e);
                    report.failed.push((artifact.clone(), e));
                }
            }
        }

        Ok(report)
    }
}
