//! Best-effort runtime version pinning
//!
//! Node is selected with nvm when the extension ships an `.nvmrc`; Python is
//! selected with pyenv when the descriptor asks for a version. Nothing here
//! fails a build: every step reports a `PinOutcome` and moves on.

use crate::process::{CommandSpec, ProcessRunner};
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, warn};
use vsxpub_core::types::BuildEnvironment;

/// Node version file looked for in the extension directory
pub const NVMRC_FILE: &str = ".nvmrc";

const NVM_INSTALL_AND_WHICH: &str = r#"export NVM_DIR="${NVM_DIR:-$HOME/.nvm}"; [ -s "$NVM_DIR/nvm.sh" ] && . "$NVM_DIR/nvm.sh"; nvm install >&2 && nvm which"#;

/// What a pinning step did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PinOutcome {
    /// Version selected
    Applied(String),
    /// Nothing requested
    NotApplicable,
    /// Selection failed and was ignored
    FailedIgnored(String),
}

impl PinOutcome {
    fn log(&self, runtime: &str) {
        match self {
            PinOutcome::Applied(version) => info!("Using {} {}", runtime, version),
            PinOutcome::NotApplicable => debug!("No {} version requested", runtime),
            PinOutcome::FailedIgnored(reason) => {
                warn!("Could not select {} version, continuing: {}", runtime, reason)
            }
        }
    }
}

impl fmt::Display for PinOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PinOutcome::Applied(version) => write!(f, "applied {}", version),
            PinOutcome::NotApplicable => write!(f, "not applicable"),
            PinOutcome::FailedIgnored(reason) => write!(f, "failed (ignored): {}", reason),
        }
    }
}

/// Global Python selection to put back after a build
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PythonRestore {
    previous: Vec<String>,
}

/// Selects runtime versions for a build
pub struct RuntimePinner {
    runner: Arc<dyn ProcessRunner>,
}

impl RuntimePinner {
    pub fn new(runner: Arc<dyn ProcessRunner>) -> Self {
        Self { runner }
    }

    /// Install the `.nvmrc` version and put its `bin` first on the build's `PATH`
    pub async fn pin_node(&self, extension_dir: &Path, env: &mut BuildEnvironment) -> PinOutcome {
        let nvmrc = extension_dir.join(NVMRC_FILE);
        if !nvmrc.is_file() {
            let outcome = PinOutcome::NotApplicable;
            outcome.log("node");
            return outcome;
        }

        let spec = CommandSpec::new("bash")
            .arg("-lc")
            .arg(NVM_INSTALL_AND_WHICH)
            .cwd(extension_dir)
            .with_env(env);

        let outcome = match self.runner.run(&spec).await {
            Ok(output) => {
                let node = output
                    .stdout
                    .lines()
                    .last()
                    .unwrap_or_default()
                    .trim()
                    .to_string();
                match Path::new(&node).parent() {
                    Some(bin) if !node.is_empty() => {
                        let inherited = env
                            .get("PATH")
                            .map(str::to_string)
                            .or_else(|| std::env::var("PATH").ok());
                        let path = match inherited {
                            Some(path) if !path.is_empty() => {
                                format!("{}:{}", bin.display(), path)
                            }
                            _ => bin.display().to_string(),
                        };
                        env.set("PATH", path);
                        PinOutcome::Applied(node)
                    }
                    _ => PinOutcome::FailedIgnored("nvm did not report a node binary".to_string()),
                }
            }
            Err(e) => PinOutcome::FailedIgnored(e.to_string()),
        };

        outcome.log("node");
        outcome
    }

    /// Install and select a Python version globally, remembering the previous one
    pub async fn pin_python(
        &self,
        version: Option<&str>,
        env: &BuildEnvironment,
    ) -> (PinOutcome, Option<PythonRestore>) {
        let Some(version) = version else {
            let outcome = PinOutcome::NotApplicable;
            outcome.log("python");
            return (outcome, None);
        };

        let previous = match self
            .runner
            .run(&CommandSpec::new("pyenv").arg("global").with_env(env).quiet())
            .await
        {
            Ok(output) => output
                .stdout
                .split_whitespace()
                .map(str::to_string)
                .collect::<Vec<_>>(),
            Err(e) => {
                let outcome = PinOutcome::FailedIgnored(e.to_string());
                outcome.log("python");
                return (outcome, None);
            }
        };

        let install = CommandSpec::new("pyenv")
            .args(["install", "-s", version])
            .with_env(env);
        let select = CommandSpec::new("pyenv")
            .args(["global", version])
            .with_env(env);

        let outcome = match self.runner.run(&install).await {
            Ok(_) => match self.runner.run(&select).await {
                Ok(_) => PinOutcome::Applied(version.to_string()),
                Err(e) => PinOutcome::FailedIgnored(e.to_string()),
            },
            Err(e) => PinOutcome::FailedIgnored(e.to_string()),
        };
        outcome.log("python");

        let restore = match outcome {
            PinOutcome::Applied(_) if !previous.is_empty() => Some(PythonRestore { previous }),
            _ => None,
        };
        (outcome, restore)
    }

    /// Put back the Python selection recorded by `pin_python`
    pub async fn restore_python(&self, restore: PythonRestore) -> PinOutcome {
        let spec = CommandSpec::new("pyenv")
            .arg("global")
            .args(restore.previous.iter().cloned());

        let outcome = match self.runner.run(&spec).await {
            Ok(_) => PinOutcome::Applied(restore.previous.join(" ")),
            Err(e) => PinOutcome::FailedIgnored(e.to_string()),
        };
        outcome.log("python (restore)");
        outcome
    }
}
