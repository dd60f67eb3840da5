//! Publish context resolution
//!
//! Fills a fresh `PublishContext` for one extension: what the registry has,
//! where the source lives and which pre-built artifacts were downloaded.

use crate::error::Result;
use crate::registry::RegistryClient;
use crate::source::SourceResolver;
use semver::Version;
use std::collections::BTreeMap;
use std::path::PathBuf;
use tracing::{debug, info, warn};
use vsxpub_core::types::{ExtensionDescriptor, ExtensionId, PublishContext};
use vsxpub_core::Settings;

/// Placeholder replaced by the pinned version in download URLs
pub const VERSION_PLACEHOLDER: &str = "{version}";

/// Resolve the context for one extension
pub async fn resolve_context(
    id: &ExtensionId,
    descriptor: &ExtensionDescriptor,
    settings: &Settings,
    registry: &dyn RegistryClient,
    sources: &dyn SourceResolver,
) -> Result<PublishContext> {
    let mut context = PublishContext {
        requested_version: descriptor.version.clone(),
        upstream_version: descriptor.version.clone(),
        repository: descriptor.repository.clone(),
        force: settings.force,
        ..Default::default()
    };

    if context.repository.is_some() {
        context.git_ref = Some(descriptor.resolved_ref());
    }

    match registry.lookup(id).await? {
        Some(listing) => {
            match Version::parse(&listing.version) {
                Ok(version) => context.registry_version = Some(version),
                Err(e) => warn!(
                    "{}: registry version '{}' is not semver ({}), treating as unpublished",
                    id, listing.version, e
                ),
            }
            context.registry_timestamp = listing.timestamp;
            info!("{}: registry has {}", id, listing.version);
        }
        None => info!("{}: not on the registry yet", id),
    }

    if let Some(downloads) = descriptor.downloads.as_ref().filter(|d| !d.is_empty()) {
        let files = download_assets(id, descriptor, downloads, settings, sources).await?;
        context.files = Some(files);
    }

    Ok(context)
}

async fn download_assets(
    id: &ExtensionId,
    descriptor: &ExtensionDescriptor,
    downloads: &BTreeMap<String, String>,
    settings: &Settings,
    sources: &dyn SourceResolver,
) -> Result<BTreeMap<String, PathBuf>> {
    let dir = settings.work_dir.join("downloads").join(id.to_string());
    let mut files = BTreeMap::new();

    for (target, url) in downloads {
        let url = match &descriptor.version {
            Some(version) => url.replace(VERSION_PLACEHOLDER, version),
            None => url.clone(),
        };
        let dest = dir.join(format!("{}.vsix", target));

        debug!("{}: fetching {} asset", id, target);
        sources.fetch_asset(&url, &dest).await?;
        files.insert(target.clone(), dest);
    }

    Ok(files)
}
