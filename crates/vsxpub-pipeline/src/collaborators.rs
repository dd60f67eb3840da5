//! The external collaborators a run talks to

use crate::archive::{ArchiveReader, ZipArchiveReader};
use crate::error::Result;
use crate::license::{ArchiveLicenseChecker, CommandLicenseChecker, LicenseChecker};
use crate::packager::{Packager, VscePackager};
use crate::process::{ProcessRunner, TokioProcessRunner};
use crate::registry::{OpenVsxClient, RegistryClient};
use crate::source::{GitSourceResolver, SourceResolver};
use std::sync::Arc;
use vsxpub_core::Settings;

/// Shared handles to every collaborator, cheap to clone
#[derive(Clone)]
pub struct Collaborators {
    pub runner: Arc<dyn ProcessRunner>,
    pub archive: Arc<dyn ArchiveReader>,
    pub packager: Arc<dyn Packager>,
    pub registry: Arc<dyn RegistryClient>,
    pub sources: Arc<dyn SourceResolver>,
    pub license: Arc<dyn LicenseChecker>,
}

impl Collaborators {
    /// Real implementations configured from run settings
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let runner: Arc<dyn ProcessRunner> = Arc::new(TokioProcessRunner::new());
        let archive: Arc<dyn ArchiveReader> = Arc::new(ZipArchiveReader::new());

        let license: Arc<dyn LicenseChecker> = match &settings.license_check {
            Some(command) => Arc::new(CommandLicenseChecker::new(runner.clone(), command.clone())),
            None => Arc::new(ArchiveLicenseChecker::new(archive.clone())),
        };

        Ok(Self {
            packager: Arc::new(VscePackager::new(runner.clone())),
            registry: Arc::new(OpenVsxClient::new(&settings.registry_url)?),
            sources: Arc::new(GitSourceResolver::new(runner.clone())),
            license,
            archive,
            runner,
        })
    }
}
