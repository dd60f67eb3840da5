//! Test harness wiring mocks into the pipeline

#![allow(dead_code)]

use super::fixtures::java_artifact;
use super::mocks::*;
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempDir;
use vsxpub_core::types::ExtensionId;
use vsxpub_core::{Catalogue, Settings};
use vsxpub_pipeline::context::resolve_context;
use vsxpub_pipeline::matrix::build_matrix;
use vsxpub_pipeline::{BuildOrchestrator, Collaborators, Driver, TargetReport};

/// Mocks, settings and a catalogue rooted in a temporary directory
pub struct Harness {
    pub dir: TempDir,
    pub runner: Arc<MockProcessRunner>,
    pub archive: Arc<MockArchive>,
    pub packager: Arc<MockPackager>,
    pub registry: Arc<MockRegistry>,
    pub sources: Arc<MockSource>,
    pub license: Arc<MockLicenseChecker>,
    pub settings: Settings,
    pub catalogue: Catalogue,
}

impl Harness {
    /// Build-only harness; the packager produces `redhat.java` 1.22.0
    pub fn new(catalogue: &str) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings {
            skip_publish: true,
            artifacts_dir: dir.path().join("artifacts"),
            work_dir: dir.path().join("work"),
            ..Default::default()
        };

        Self {
            runner: Arc::new(MockProcessRunner::new()),
            archive: Arc::new(MockArchive),
            packager: Arc::new(MockPackager::new(java_artifact("1.22.0").build())),
            registry: Arc::new(MockRegistry::new()),
            sources: Arc::new(MockSource::new()),
            license: Arc::new(MockLicenseChecker::new(false)),
            catalogue: Catalogue::from_json(catalogue).unwrap(),
            settings,
            dir,
        }
    }

    /// Enable publishing with a credential
    pub fn publishing(mut self) -> Self {
        self.settings.skip_publish = false;
        self.settings.token = Some("ovsx-test-token".to_string());
        self
    }

    pub fn with_settings(mut self, configure: impl FnOnce(&mut Settings)) -> Self {
        configure(&mut self.settings);
        self
    }

    pub fn with_license_checker(mut self, confirms: bool) -> Self {
        self.license = Arc::new(MockLicenseChecker::new(confirms));
        self
    }

    pub fn collaborators(&self) -> Collaborators {
        Collaborators {
            runner: self.runner.clone(),
            archive: self.archive.clone(),
            packager: self.packager.clone(),
            registry: self.registry.clone(),
            sources: self.sources.clone(),
            license: self.license.clone(),
        }
    }

    pub fn driver(&self) -> Driver {
        Driver::new(
            self.settings.clone(),
            self.catalogue.clone(),
            self.collaborators(),
        )
    }

    /// Resolve and build every target of one catalogue entry
    pub async fn build(&self, id: &str) -> Vec<TargetReport> {
        let collaborators = self.collaborators();
        let orchestrator = BuildOrchestrator::new(&self.settings, &self.catalogue, &collaborators);
        let extension_id = ExtensionId::parse(id).unwrap();
        let descriptor = self.catalogue.get(id).unwrap();

        let context = resolve_context(
            &extension_id,
            descriptor,
            &self.settings,
            self.registry.as_ref(),
            self.sources.as_ref(),
        )
        .await
        .unwrap();

        build_matrix(&orchestrator, &extension_id, descriptor, &context).await
    }

    pub fn artifacts_dir(&self) -> PathBuf {
        self.settings.artifacts_dir.clone()
    }

    /// Where the source of `id` is checked out
    pub fn checkout(&self, id: &str) -> PathBuf {
        self.settings.work_dir.join("sources").join(id)
    }

    /// Write a file under the harness directory
    pub fn write(&self, relative: &str, content: &str) -> PathBuf {
        let path = self.dir.path().join(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(&path, content).unwrap();
        path
    }
}
