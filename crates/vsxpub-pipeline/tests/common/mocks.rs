//! Mock collaborators
//!
//! Every mock records what it was asked to do so tests can assert on the
//! pipeline's behaviour without processes, archives or a network.
//!
//! Artifacts are plain JSON files mapping archive entry names to their
//! contents; `MockArchive` reads them back, so a copied artifact still
//! carries its manifest.

#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use vsxpub_core::types::{BuildEnvironment, ExtensionId};
use vsxpub_pipeline::archive::ArchiveReader;
use vsxpub_pipeline::license::LicenseChecker;
use vsxpub_pipeline::packager::{PackageRequest, Packager};
use vsxpub_pipeline::process::{CommandOutput, CommandSpec, ProcessRunner};
use vsxpub_pipeline::registry::{PublishedExtension, RegistryClient, RegistryListing};
use vsxpub_pipeline::source::SourceResolver;
use vsxpub_pipeline::{PipelineError, Result};

type Handler = Box<dyn Fn(&CommandSpec) -> Option<Result<CommandOutput>> + Send + Sync>;

/// Process runner answering from registered handlers, success by default
#[derive(Default)]
pub struct MockProcessRunner {
    handlers: Mutex<Vec<Handler>>,
    invocations: Mutex<Vec<CommandSpec>>,
}

impl MockProcessRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler; the first one returning `Some` answers
    pub fn on<F>(&self, handler: F)
    where
        F: Fn(&CommandSpec) -> Option<Result<CommandOutput>> + Send + Sync + 'static,
    {
        self.handlers.lock().unwrap().push(Box::new(handler));
    }

    /// Fail every command whose display form contains `needle`
    pub fn fail_when(&self, needle: &'static str, stderr: &'static str) {
        self.on(move |spec| {
            spec.display()
                .contains(needle)
                .then(|| Err(command_failed(spec, stderr)))
        });
    }

    pub fn invocations(&self) -> Vec<CommandSpec> {
        self.invocations.lock().unwrap().clone()
    }

    /// Display forms of commands run with `program`
    pub fn commands_for(&self, program: &str) -> Vec<String> {
        self.invocations()
            .iter()
            .filter(|spec| spec.program == program)
            .map(CommandSpec::display)
            .collect()
    }
}

pub fn command_failed(spec: &CommandSpec, stderr: &str) -> PipelineError {
    PipelineError::CommandFailed {
        command: spec.display(),
        code: Some(1),
        stderr: stderr.to_string(),
    }
}

#[async_trait]
impl ProcessRunner for MockProcessRunner {
    async fn run(&self, spec: &CommandSpec) -> Result<CommandOutput> {
        self.invocations.lock().unwrap().push(spec.clone());
        for handler in self.handlers.lock().unwrap().iter() {
            if let Some(result) = handler(spec) {
                return result;
            }
        }
        Ok(CommandOutput::default())
    }
}

/// Archive reader over JSON-encoded artifact files
#[derive(Default)]
pub struct MockArchive;

#[async_trait]
impl ArchiveReader for MockArchive {
    async fn read_entry(&self, archive: &Path, entry: &str) -> Result<Option<String>> {
        let content = tokio::fs::read_to_string(archive).await?;
        let entries: BTreeMap<String, String> = serde_json::from_str(&content)?;
        Ok(entries.get(entry).cloned())
    }
}

/// How the mock registry answers publish calls
#[derive(Debug, Clone)]
pub enum PublishResponse {
    Accept,
    Reject(String),
    /// Reject with a specific HTTP status
    Status(u16, String),
}

/// In-memory registry
pub struct MockRegistry {
    listings: Mutex<BTreeMap<String, String>>,
    namespaces: Mutex<Vec<String>>,
    published: Mutex<Vec<PathBuf>>,
    lookups: Mutex<Vec<String>>,
    response: Mutex<PublishResponse>,
}

impl Default for MockRegistry {
    fn default() -> Self {
        Self {
            listings: Mutex::new(BTreeMap::new()),
            namespaces: Mutex::new(Vec::new()),
            published: Mutex::new(Vec::new()),
            lookups: Mutex::new(Vec::new()),
            response: Mutex::new(PublishResponse::Accept),
        }
    }
}

impl MockRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pretend `id` is published at `version`
    pub fn with_listing(&self, id: &str, version: &str) -> &Self {
        self.listings
            .lock()
            .unwrap()
            .insert(id.to_lowercase(), version.to_string());
        self
    }

    pub fn respond_to_publish(&self, response: PublishResponse) {
        *self.response.lock().unwrap() = response;
    }

    pub fn namespaces(&self) -> Vec<String> {
        self.namespaces.lock().unwrap().clone()
    }

    pub fn published(&self) -> Vec<PathBuf> {
        self.published.lock().unwrap().clone()
    }

    pub fn lookups(&self) -> Vec<String> {
        self.lookups.lock().unwrap().clone()
    }
}

#[async_trait]
impl RegistryClient for MockRegistry {
    async fn lookup(&self, id: &ExtensionId) -> Result<Option<RegistryListing>> {
        self.lookups.lock().unwrap().push(id.to_string());
        Ok(self
            .listings
            .lock()
            .unwrap()
            .get(&id.to_string().to_lowercase())
            .map(|version| RegistryListing {
                namespace: id.namespace().to_string(),
                name: id.name().to_string(),
                version: version.clone(),
                timestamp: None,
            }))
    }

    async fn create_namespace(&self, namespace: &str, _token: &str) -> Result<()> {
        self.namespaces.lock().unwrap().push(namespace.to_string());
        Ok(())
    }

    async fn publish(&self, artifact: &Path, _token: &str) -> Result<PublishedExtension> {
        let response = self.response.lock().unwrap().clone();
        match response {
            PublishResponse::Accept => {
                self.published.lock().unwrap().push(artifact.to_path_buf());
                let stem = artifact
                    .file_stem()
                    .map(|s| s.to_string_lossy().into_owned())
                    .unwrap_or_default();
                Ok(PublishedExtension {
                    namespace: String::new(),
                    name: stem.clone(),
                    version: String::new(),
                    location: format!("https://registry.test/extension/{}", stem),
                })
            }
            PublishResponse::Reject(message) => Err(PipelineError::registry(Some(400), message)),
            PublishResponse::Status(status, message) => {
                Err(PipelineError::registry(Some(status), message))
            }
        }
    }
}

/// Packager writing a fixed artifact body, optionally failing for one target
pub struct MockPackager {
    artifact: Mutex<String>,
    fail_target: Mutex<Option<String>>,
    requests: Mutex<Vec<(PathBuf, Option<String>, BTreeMap<String, String>)>>,
}

impl MockPackager {
    pub fn new(artifact: String) -> Self {
        Self {
            artifact: Mutex::new(artifact),
            fail_target: Mutex::new(None),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn set_artifact(&self, artifact: String) {
        *self.artifact.lock().unwrap() = artifact;
    }

    pub fn fail_for_target(&self, target: &str) {
        *self.fail_target.lock().unwrap() = Some(target.to_string());
    }

    /// Targets packaged so far, `None` for universal
    pub fn targets(&self) -> Vec<Option<String>> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .map(|(_, target, _)| target.clone())
            .collect()
    }

    /// Environment passed to the n-th packaging call
    pub fn env(&self, n: usize) -> BTreeMap<String, String> {
        self.requests.lock().unwrap()[n].2.clone()
    }
}

#[async_trait]
impl Packager for MockPackager {
    async fn package(&self, request: PackageRequest<'_>) -> Result<()> {
        let target = request.target.map(str::to_string);
        self.requests.lock().unwrap().push((
            request.output.to_path_buf(),
            target.clone(),
            request.env.vars().clone(),
        ));

        if target.is_some() && *self.fail_target.lock().unwrap() == target {
            return Err(PipelineError::CommandFailed {
                command: "vsce package".to_string(),
                code: Some(1),
                stderr: "native module failed to compile".to_string(),
            });
        }

        let body = self.artifact.lock().unwrap().clone();
        tokio::fs::write(request.output, body).await?;
        Ok(())
    }
}

/// A `fetch_source` call
#[derive(Debug, Clone)]
pub struct FetchRecord {
    pub repository: String,
    pub git_ref: String,
    pub dest: PathBuf,
    pub env: BTreeMap<String, String>,
}

/// Source resolver that creates directories and serves assets from memory
#[derive(Default)]
pub struct MockSource {
    files: Mutex<BTreeMap<String, String>>,
    assets: Mutex<BTreeMap<String, String>>,
    fetches: Mutex<Vec<FetchRecord>>,
    downloads: Mutex<Vec<String>>,
}

impl MockSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// File written into every checkout, path relative to the checkout root
    pub fn with_file(&self, relative: &str, content: &str) -> &Self {
        self.files
            .lock()
            .unwrap()
            .insert(relative.to_string(), content.to_string());
        self
    }

    /// Asset served for `url`
    pub fn with_asset(&self, url: &str, content: String) -> &Self {
        self.assets.lock().unwrap().insert(url.to_string(), content);
        self
    }

    pub fn fetches(&self) -> Vec<FetchRecord> {
        self.fetches.lock().unwrap().clone()
    }

    pub fn downloads(&self) -> Vec<String> {
        self.downloads.lock().unwrap().clone()
    }
}

#[async_trait]
impl SourceResolver for MockSource {
    async fn fetch_source(
        &self,
        repository: &str,
        git_ref: &str,
        dest: &Path,
        env: &BuildEnvironment,
    ) -> Result<()> {
        self.fetches.lock().unwrap().push(FetchRecord {
            repository: repository.to_string(),
            git_ref: git_ref.to_string(),
            dest: dest.to_path_buf(),
            env: env.vars().clone(),
        });

        if dest.exists() {
            std::fs::remove_dir_all(dest)?;
        }
        std::fs::create_dir_all(dest)?;

        let files = self.files.lock().unwrap().clone();
        for (relative, content) in files {
            let path = dest.join(relative);
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(path, content)?;
        }
        Ok(())
    }

    async fn fetch_asset(&self, url: &str, dest: &Path) -> Result<()> {
        self.downloads.lock().unwrap().push(url.to_string());
        let content = self.assets.lock().unwrap().get(url).cloned();
        match content {
            Some(content) => {
                if let Some(parent) = dest.parent() {
                    std::fs::create_dir_all(parent)?;
                }
                std::fs::write(dest, content)?;
                Ok(())
            }
            None => Err(PipelineError::Download {
                url: url.to_string(),
                status: 404,
            }),
        }
    }
}

/// License checker with a fixed answer
pub struct MockLicenseChecker {
    confirms: bool,
    calls: Mutex<usize>,
}

impl MockLicenseChecker {
    pub fn new(confirms: bool) -> Self {
        Self {
            confirms,
            calls: Mutex::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        *self.calls.lock().unwrap()
    }
}

#[async_trait]
impl LicenseChecker for MockLicenseChecker {
    async fn confirm(&self, _artifact: &Path, _extension_dir: Option<&Path>) -> Result<bool> {
        *self.calls.lock().unwrap() += 1;
        Ok(self.confirms)
    }
}
