//! Packaging of a built extension into an artifact

use crate::error::Result;
use crate::package_manager::PackageManager;
use crate::process::{CommandSpec, ProcessRunner};
use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;
use vsxpub_core::types::BuildEnvironment;

/// One packaging call
#[derive(Debug, Clone, Copy)]
pub struct PackageRequest<'a> {
    /// Extension directory holding `package.json`
    pub source_dir: &'a Path,
    /// Artifact file to write
    pub output: &'a Path,
    pub target: Option<&'a str>,
    pub package_manager: PackageManager,
    pub env: &'a BuildEnvironment,
}

/// Turns an extension directory into a packaged artifact
#[async_trait]
pub trait Packager: Send + Sync {
    async fn package(&self, request: PackageRequest<'_>) -> Result<()>;
}

/// `Packager` that runs `vsce package` through `npx`
pub struct VscePackager {
    runner: Arc<dyn ProcessRunner>,
}

impl VscePackager {
    pub fn new(runner: Arc<dyn ProcessRunner>) -> Self {
        Self { runner }
    }

    /// Command line for a request
    pub fn command(request: &PackageRequest<'_>) -> CommandSpec {
        let mut spec = CommandSpec::new("npx")
            .args(["--yes", "@vscode/vsce", "package", "--out"])
            .path_arg(request.output);

        if let Some(target) = request.target {
            spec = spec.arg("--target").arg(target);
        }

        spec.arg(request.package_manager.vsce_flag())
            .cwd(request.source_dir)
            .with_env(request.env)
    }
}

#[async_trait]
impl Packager for VscePackager {
    async fn package(&self, request: PackageRequest<'_>) -> Result<()> {
        self.runner.run(&Self::command(&request)).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vsce_command_with_target_and_yarn() {
        let env = BuildEnvironment::default();
        let request = PackageRequest {
            source_dir: Path::new("/src/ext"),
            output: Path::new("/src/ext/out.vsix"),
            target: Some("linux-x64"),
            package_manager: PackageManager::Yarn,
            env: &env,
        };

        let spec = VscePackager::command(&request);

        assert_eq!(
            spec.display(),
            "npx --yes @vscode/vsce package --out /src/ext/out.vsix --target linux-x64 --yarn"
        );
        assert_eq!(spec.cwd.as_deref(), Some(Path::new("/src/ext")));
    }

    #[test]
    fn test_vsce_command_universal_npm() {
        let env = BuildEnvironment::default();
        let request = PackageRequest {
            source_dir: Path::new("/src"),
            output: Path::new("/src/out.vsix"),
            target: None,
            package_manager: PackageManager::Npm,
            env: &env,
        };

        assert!(VscePackager::command(&request)
            .display()
            .ends_with("--out /src/out.vsix --no-yarn"));
    }
}
