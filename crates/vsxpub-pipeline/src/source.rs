//! Source and pre-built artifact acquisition

use crate::error::{PipelineError, Result};
use crate::process::{CommandSpec, ProcessRunner};
use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;
use tokio::fs;
use tracing::{debug, info};
use vsxpub_core::types::BuildEnvironment;

/// Materializes sources and downloads release assets
#[async_trait]
pub trait SourceResolver: Send + Sync {
    /// Clone `repository` into `dest` and check out `git_ref`
    ///
    /// `dest` is replaced if it already exists.
    async fn fetch_source(
        &self,
        repository: &str,
        git_ref: &str,
        dest: &Path,
        env: &BuildEnvironment,
    ) -> Result<()>;

    /// Download a pre-built artifact to `dest`
    async fn fetch_asset(&self, url: &str, dest: &Path) -> Result<()>;
}

/// `SourceResolver` using `git` and HTTP downloads
pub struct GitSourceResolver {
    runner: Arc<dyn ProcessRunner>,
    client: reqwest::Client,
}

impl GitSourceResolver {
    pub fn new(runner: Arc<dyn ProcessRunner>) -> Self {
        Self {
            runner,
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl SourceResolver for GitSourceResolver {
    async fn fetch_source(
        &self,
        repository: &str,
        git_ref: &str,
        dest: &Path,
        env: &BuildEnvironment,
    ) -> Result<()> {
        if fs::try_exists(dest).await? {
            fs::remove_dir_all(dest).await?;
        }
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent).await?;
        }

        info!("Cloning {} at {}", repository, git_ref);
        let clone = CommandSpec::new("git")
            .args(["clone", "--recurse-submodules", repository])
            .path_arg(dest)
            .with_env(env);
        self.runner.run(&clone).await?;

        if git_ref != "HEAD" {
            let checkout = CommandSpec::new("git")
                .args(["checkout", git_ref])
                .cwd(dest)
                .with_env(env);
            self.runner.run(&checkout).await?;

            let submodules = CommandSpec::new("git")
                .args(["submodule", "update", "--init", "--recursive"])
                .cwd(dest)
                .with_env(env)
                .quiet();
            self.runner.run(&submodules).await?;
        }

        Ok(())
    }

    async fn fetch_asset(&self, url: &str, dest: &Path) -> Result<()> {
        debug!("Downloading {} to {:?}", url, dest);
        let response = self.client.get(url).send().await?;

        if !response.status().is_success() {
            return Err(PipelineError::Download {
                url: url.to_string(),
                status: response.status().as_u16(),
            });
        }

        let bytes = response.bytes().await?;
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent).await?;
        }
        fs::write(dest, &bytes).await?;
        Ok(())
    }
}
