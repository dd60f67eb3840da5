//! Validation gates run on a built artifact before it may be published

use crate::error::{PipelineError, Result};
use crate::license::LicenseChecker;
use crate::registry::RegistryClient;
use semver::Version;
use std::cmp::Ordering;
use std::path::Path;
use tracing::{debug, info};
use vsxpub_core::types::{ExtensionId, Manifest};
use vsxpub_core::{Catalogue, Settings};

/// Verdict of the version-freshness gate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Freshness {
    /// Built version should be published
    Publish,
    /// Registry already has this version; nothing to do
    AlreadyCurrent,
}

/// Compare the built version with what the registry has
///
/// A registry version ahead of the build is always an error, `force` only
/// overrides the equal-version skip.
pub fn check_freshness(
    id: &str,
    registry: Option<&Version>,
    resolved: &Version,
    force: bool,
) -> Result<Freshness> {
    let Some(registry) = registry else {
        return Ok(Freshness::Publish);
    };

    match registry.cmp(resolved) {
        Ordering::Less => Ok(Freshness::Publish),
        Ordering::Equal if force => {
            info!("{} {} is already on the registry, forcing publish", id, resolved);
            Ok(Freshness::Publish)
        }
        Ordering::Equal => {
            info!("{} {} is already on the registry, skipping", id, resolved);
            Ok(Freshness::AlreadyCurrent)
        }
        Ordering::Greater => Err(PipelineError::StaleConfiguration {
            id: id.to_string(),
            registry: registry.to_string(),
            resolved: resolved.to_string(),
        }),
    }
}

/// Require a license in the manifest or from the fallback checker
pub async fn check_license(
    id: &str,
    manifest: &Manifest,
    artifact: &Path,
    extension_dir: Option<&Path>,
    checker: &dyn LicenseChecker,
) -> Result<()> {
    if manifest.has_license {
        return Ok(());
    }

    debug!("{}: no license in manifest, asking license checker", id);
    if checker.confirm(artifact, extension_dir).await? {
        return Ok(());
    }

    Err(PipelineError::LicenseMissing { id: id.to_string() })
}

/// Every declared dependency must be publishable and present on the registry
///
/// Missing dependencies are collected and reported together.
pub async fn check_dependencies(
    id: &str,
    dependencies: &[String],
    settings: &Settings,
    catalogue: &Catalogue,
    registry: &dyn RegistryClient,
) -> Result<()> {
    let mut missing = Vec::new();

    for dependency in dependencies {
        let dependency_id = match ExtensionId::parse(dependency) {
            Ok(parsed) => parsed,
            Err(_) => {
                missing.push(dependency.clone());
                continue;
            }
        };

        if dependency_id.is_builtin() {
            continue;
        }

        if settings.is_unpublishable(dependency) {
            return Err(PipelineError::UnpublishableDependency {
                id: id.to_string(),
                dependency: dependency.clone(),
            });
        }

        if settings.skip_publish && !settings.strict_dependencies && catalogue.contains(dependency)
        {
            debug!("{}: dependency {} is in the catalogue", id, dependency);
            continue;
        }

        if registry.lookup(&dependency_id).await?.is_none() {
            missing.push(dependency.clone());
        }
    }

    if missing.is_empty() {
        Ok(())
    } else {
        Err(PipelineError::MissingDependencies {
            id: id.to_string(),
            missing,
        })
    }
}
