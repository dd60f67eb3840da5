//! Package manager detection and dependency install
//!
//! Install runs under a one-shot recovery policy: when it fails, the legacy
//! `vscode` module setup is migrated in `package.json` and install is retried.

use crate::error::{PipelineError, Result};
use crate::process::{CommandSpec, ProcessRunner};
use serde_json::Value;
use std::fmt;
use std::path::Path;
use tokio::fs;
use tracing::{debug, info};
use vsxpub_core::retry::{retry_with_recovery, RecoveryError, RecoveryPolicy};
use vsxpub_core::types::BuildEnvironment;

/// Name of the install recovery transform
pub const LEGACY_VSCODE_MODULE: &str = "legacy-vscode-module";

const PACKAGE_JSON: &str = "package.json";
const YARN_LOCK: &str = "yarn.lock";

/// Which tool installs dependencies and is handed to the packager
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PackageManager {
    #[default]
    Npm,
    Yarn,
}

impl PackageManager {
    /// A `yarn.lock` selects yarn, anything else npm
    pub fn detect(dir: &Path) -> Self {
        if dir.join(YARN_LOCK).is_file() {
            PackageManager::Yarn
        } else {
            PackageManager::Npm
        }
    }

    /// Flag passed to `vsce package`
    pub fn vsce_flag(self) -> &'static str {
        match self {
            PackageManager::Npm => "--no-yarn",
            PackageManager::Yarn => "--yarn",
        }
    }

    pub fn install_command(self) -> CommandSpec {
        match self {
            PackageManager::Npm => CommandSpec::new("npm").arg("install"),
            PackageManager::Yarn => CommandSpec::new("yarn").arg("install"),
        }
    }
}

impl fmt::Display for PackageManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PackageManager::Npm => write!(f, "npm"),
            PackageManager::Yarn => write!(f, "yarn"),
        }
    }
}

/// Install dependencies, migrating a legacy manifest and retrying once on failure
pub async fn install_dependencies(
    runner: &dyn ProcessRunner,
    id: &str,
    dir: &Path,
    package_manager: PackageManager,
    env: &BuildEnvironment,
) -> Result<()> {
    let spec = package_manager.install_command().cwd(dir).with_env(env);
    let spec = &spec;
    info!("Installing dependencies with {}", package_manager);

    let result = retry_with_recovery(
        &RecoveryPolicy::default(),
        LEGACY_VSCODE_MODULE,
        move || async move { runner.run(spec).await.map(|_| ()) },
        move || async move { migrate_legacy_manifest(dir).await },
    )
    .await;

    result.map_err(|e| match e {
        RecoveryError::NotRecoverable(e) => e,
        RecoveryError::RecoveryFailed { transform, source } => PipelineError::RecoveryFailed {
            id: id.to_string(),
            transform,
            source: Box::new(source),
        },
        RecoveryError::RetryFailed {
            transform,
            first_error,
            source,
            ..
        } => PipelineError::InstallRetryFailed {
            id: id.to_string(),
            transform,
            first_error,
            source: Box::new(source),
        },
    })
}

/// Rewrite the legacy `vscode` module setup in `dir/package.json`
///
/// Returns whether the manifest changed.
pub async fn migrate_legacy_manifest(dir: &Path) -> Result<bool> {
    let path = dir.join(PACKAGE_JSON);
    if !fs::try_exists(&path).await? {
        return Ok(false);
    }

    let mut manifest: Value = serde_json::from_str(&fs::read_to_string(&path).await?)?;
    if !migrate_manifest(&mut manifest) {
        debug!("{:?} has no legacy vscode module setup", path);
        return Ok(false);
    }

    let mut content = serde_json::to_string_pretty(&manifest)?;
    content.push('\n');
    fs::write(&path, content).await?;
    info!("Migrated legacy vscode module setup in {:?}", path);
    Ok(true)
}

/// In-memory part of the migration
fn migrate_manifest(manifest: &mut Value) -> bool {
    let Some(root) = manifest.as_object_mut() else {
        return false;
    };
    let mut changed = false;

    if let Some(scripts) = root.get_mut("scripts").and_then(Value::as_object_mut) {
        let legacy_hook = scripts
            .get("postinstall")
            .and_then(Value::as_str)
            .is_some_and(|hook| hook.contains("vscode/bin/install"));
        if legacy_hook {
            scripts.remove("postinstall");
            changed = true;
        }
    }

    let engine = root
        .get("engines")
        .and_then(|e| e.get("vscode"))
        .and_then(Value::as_str)
        .unwrap_or("*")
        .to_string();

    for section in ["dependencies", "devDependencies"] {
        if let Some(deps) = root.get_mut(section).and_then(Value::as_object_mut) {
            if deps.remove("vscode").is_some() {
                deps.insert("@types/vscode".to_string(), Value::String(engine.clone()));
                changed = true;
            }
        }
    }

    changed
}
