//! Build orchestration for one (extension, target) pair
//!
//! A build acquires the source (unless a pre-built artifact was supplied),
//! pins runtimes, runs the descriptor's build strategy, reads the artifact's
//! manifest and passes it through the freshness, license and dependency
//! gates. Validated artifacts are copied to the artifact directory as
//! `<id>[@<target>].vsix`.

use crate::archive::read_manifest;
use crate::collaborators::Collaborators;
use crate::error::{PipelineError, Result};
use crate::gates::{check_dependencies, check_freshness, check_license, Freshness};
use crate::package_manager::{install_dependencies, PackageManager};
use crate::packager::PackageRequest;
use crate::process::CommandSpec;
use crate::runtime::RuntimePinner;
use semver::Version;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info, warn};
use vsxpub_core::types::{
    BuildEnvironment, BuildResult, BuildStrategy, ExtensionDescriptor, ExtensionId,
    PublishContext, TargetBuild,
};
use vsxpub_core::{Catalogue, Settings};

/// Artifact file extension
pub const ARTIFACT_EXTENSION: &str = "vsix";

/// Tools the build steps shell out to
const REQUIRED_TOOLS: &[&str] = &["git", "npm", "npx"];

/// Deterministic artifact file name: `<id>[@<target>].vsix`
pub fn artifact_name(id: &ExtensionId, target: Option<&str>) -> String {
    match target {
        Some(target) => format!("{}@{}.{}", id, target, ARTIFACT_EXTENSION),
        None => format!("{}.{}", id, ARTIFACT_EXTENSION),
    }
}

/// Builds and validates artifacts
pub struct BuildOrchestrator<'a> {
    settings: &'a Settings,
    catalogue: &'a Catalogue,
    collaborators: &'a Collaborators,
    pinner: RuntimePinner,
}

impl<'a> BuildOrchestrator<'a> {
    pub fn new(
        settings: &'a Settings,
        catalogue: &'a Catalogue,
        collaborators: &'a Collaborators,
    ) -> Self {
        Self {
            settings,
            catalogue,
            collaborators,
            pinner: RuntimePinner::new(collaborators.runner.clone()),
        }
    }

    /// Idempotent prerequisite setup
    ///
    /// Only the artifact directory is required; tool configuration problems
    /// are logged and left to surface in the build itself.
    pub async fn prepare(&self) -> Result<()> {
        fs::create_dir_all(&self.settings.artifacts_dir).await?;

        for tool in REQUIRED_TOOLS {
            if which::which(tool).is_err() {
                warn!("{} not found on PATH", tool);
            }
        }

        let setup = [
            CommandSpec::new("npm").args(["config", "set", "script-shell", "/bin/bash"]),
            CommandSpec::new("git").args(["config", "--global", "advice.detachedHead", "false"]),
        ];
        for spec in setup {
            if let Err(e) = self.collaborators.runner.run(&spec.quiet()).await {
                warn!("Prerequisite setup step failed: {}", e);
            }
        }

        Ok(())
    }

    /// Produce a validated artifact, or `None` when the registry is already current
    pub async fn build(
        &self,
        id: &ExtensionId,
        descriptor: &ExtensionDescriptor,
        context: &mut PublishContext,
        build: &TargetBuild,
    ) -> Result<Option<BuildResult>> {
        self.prepare().await?;

        let mut env = BuildEnvironment::for_build(id, context, build);
        let prebuilt = build.file.clone();

        let mut python_restore = None;
        let extension_dir = match &prebuilt {
            Some(file) => {
                debug!("{}: using supplied artifact {:?}", id, file);
                None
            }
            None => {
                let dir = self.acquire_source(id, descriptor, context, &env).await?;
                self.pinner.pin_node(&dir, &mut env).await;
                let (_, restore) = self
                    .pinner
                    .pin_python(descriptor.python_version.as_deref(), &env)
                    .await;
                python_restore = restore;
                Some(dir)
            }
        };

        let result = self
            .build_and_validate(id, descriptor, context, build, prebuilt, extension_dir, &env)
            .await;

        if let Some(restore) = python_restore {
            self.pinner.restore_python(restore).await;
        }

        result
    }

    async fn acquire_source(
        &self,
        id: &ExtensionId,
        descriptor: &ExtensionDescriptor,
        context: &mut PublishContext,
        env: &BuildEnvironment,
    ) -> Result<PathBuf> {
        let repository = context
            .repository
            .clone()
            .ok_or_else(|| PipelineError::MissingSource { id: id.to_string() })?;
        let git_ref = context
            .git_ref
            .clone()
            .unwrap_or_else(|| descriptor.resolved_ref());

        let checkout = self.settings.work_dir.join("sources").join(id.to_string());
        self.collaborators
            .sources
            .fetch_source(&repository, &git_ref, &checkout, env)
            .await?;
        context.source_dir = Some(checkout.clone());

        Ok(match &descriptor.location {
            Some(location) => checkout.join(location),
            None => checkout,
        })
    }

    #[allow(clippy::too_many_arguments)]
    async fn build_and_validate(
        &self,
        id: &ExtensionId,
        descriptor: &ExtensionDescriptor,
        context: &mut PublishContext,
        build: &TargetBuild,
        prebuilt: Option<PathBuf>,
        extension_dir: Option<PathBuf>,
        env: &BuildEnvironment,
    ) -> Result<Option<BuildResult>> {
        let id_str = id.to_string();
        let label = build.label();

        let artifact = match (prebuilt, &extension_dir) {
            (Some(file), _) => file,
            (None, Some(dir)) => match descriptor.strategy() {
                BuildStrategy::Custom { commands } => {
                    self.build_custom(id, descriptor, build, &commands, dir, env).await?
                }
                BuildStrategy::Standard { prepublish } => {
                    self.build_standard(id, descriptor, build, prepublish.as_deref(), dir, env)
                        .await?
                }
                BuildStrategy::Prebuilt => {
                    return Err(PipelineError::ArtifactNotFound {
                        id: id_str,
                        target: label.to_string(),
                        pattern: "downloads".to_string(),
                    })
                }
            },
            (None, None) => return Err(PipelineError::MissingSource { id: id_str }),
        };

        let manifest = read_manifest(self.collaborators.archive.as_ref(), &artifact).await?;
        let raw_version = manifest
            .version
            .clone()
            .ok_or_else(|| PipelineError::MissingVersion {
                id: id_str.clone(),
                target: label.to_string(),
            })?;
        let version = Version::parse(raw_version.trim()).map_err(|_| {
            PipelineError::InvalidVersion {
                id: id_str.clone(),
                version: raw_version.clone(),
            }
        })?;
        context.version = Some(version.clone());
        info!("{} ({}): built version {}", id, label, version);

        let freshness = check_freshness(
            &id_str,
            context.registry_version.as_ref(),
            &version,
            context.force,
        )?;
        if freshness == Freshness::AlreadyCurrent {
            return Ok(None);
        }

        check_license(
            &id_str,
            &manifest,
            &artifact,
            extension_dir.as_deref(),
            self.collaborators.license.as_ref(),
        )
        .await?;

        check_dependencies(
            &id_str,
            &manifest.dependencies,
            self.settings,
            self.catalogue,
            self.collaborators.registry.as_ref(),
        )
        .await?;

        self.finalize(id, build, &artifact).await.map(Some)
    }

    async fn build_custom(
        &self,
        id: &ExtensionId,
        descriptor: &ExtensionDescriptor,
        build: &TargetBuild,
        commands: &[String],
        dir: &Path,
        env: &BuildEnvironment,
    ) -> Result<PathBuf> {
        for command in commands {
            info!("{}: running `{}`", id, command);
            let spec = CommandSpec::shell(command).cwd(dir).with_env(env);
            self.collaborators.runner.run(&spec).await?;
        }

        if let Some(file) = &descriptor.extension_file {
            return existing_artifact(id, build, dir.join(file));
        }

        let pattern = match &build.target {
            Some(target) => format!("**/*{}*.{}", target, ARTIFACT_EXTENSION),
            None => format!("**/*.{}", ARTIFACT_EXTENSION),
        };
        find_artifact(dir, &pattern)?.ok_or_else(|| PipelineError::ArtifactNotFound {
            id: id.to_string(),
            target: build.label().to_string(),
            pattern,
        })
    }

    async fn build_standard(
        &self,
        id: &ExtensionId,
        descriptor: &ExtensionDescriptor,
        build: &TargetBuild,
        prepublish: Option<&str>,
        dir: &Path,
        env: &BuildEnvironment,
    ) -> Result<PathBuf> {
        let package_manager = PackageManager::detect(dir);
        install_dependencies(
            self.collaborators.runner.as_ref(),
            &id.to_string(),
            dir,
            package_manager,
            env,
        )
        .await?;

        if let Some(prepublish) = prepublish {
            info!("{}: running prepublish `{}`", id, prepublish);
            let spec = CommandSpec::shell(prepublish).cwd(dir).with_env(env);
            self.collaborators.runner.run(&spec).await?;
        }

        if let Some(file) = &descriptor.extension_file {
            return existing_artifact(id, build, dir.join(file));
        }

        let output = dir.join(artifact_name(id, build.target.as_deref()));
        self.collaborators
            .packager
            .package(PackageRequest {
                source_dir: dir,
                output: &output,
                target: build.target.as_deref(),
                package_manager,
                env,
            })
            .await?;

        existing_artifact(id, build, output)
    }

    async fn finalize(
        &self,
        id: &ExtensionId,
        build: &TargetBuild,
        artifact: &Path,
    ) -> Result<BuildResult> {
        let dest = self
            .settings
            .artifacts_dir
            .join(artifact_name(id, build.target.as_deref()));

        if dest != artifact {
            fs::copy(artifact, &dest).await?;
        }
        info!("{} ({}): artifact ready at {:?}", id, build.label(), dest);

        Ok(BuildResult {
            artifact: dest,
            target: build.target.clone(),
        })
    }
}

fn existing_artifact(id: &ExtensionId, build: &TargetBuild, path: PathBuf) -> Result<PathBuf> {
    if path.is_file() {
        Ok(path)
    } else {
        Err(PipelineError::ArtifactNotFound {
            id: id.to_string(),
            target: build.label().to_string(),
            pattern: path.display().to_string(),
        })
    }
}

/// First match of `pattern` under `dir`, ignoring `node_modules`
fn find_artifact(dir: &Path, pattern: &str) -> Result<Option<PathBuf>> {
    let full = format!(
        "{}/{}",
        glob::Pattern::escape(&dir.to_string_lossy()),
        pattern
    );

    let mut matches: Vec<PathBuf> = glob::glob(&full)?
        .filter_map(|entry| entry.ok())
        .filter(|path| {
            !path
                .strip_prefix(dir)
                .unwrap_or(path)
                .components()
                .any(|c| c.as_os_str() == "node_modules")
        })
        .collect();
    matches.sort();

    Ok(matches.into_iter().next())
}
