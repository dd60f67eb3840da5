//! Process execution
//!
//! Every external tool (git, npm, yarn, vsce, nvm, pyenv) is invoked
//! through the `ProcessRunner` trait so the pipeline can be exercised without
//! spawning anything. The environment of each command is passed explicitly;
//! nothing in the pipeline mutates the process-wide environment.

use crate::error::{PipelineError, Result};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, trace};
use vsxpub_core::types::BuildEnvironment;

/// Lines of stderr kept in a `CommandFailed` error
const STDERR_TAIL_LINES: usize = 20;

/// A command to run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: Option<PathBuf>,
    pub env: BTreeMap<String, String>,
    /// Log output at trace level instead of debug
    pub quiet: bool,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            ..Default::default()
        }
    }

    /// Run a command line through `bash -c`
    pub fn shell(line: impl Into<String>) -> Self {
        Self::new("bash").arg("-c").arg(line)
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn path_arg(self, path: &Path) -> Self {
        self.arg(path.to_string_lossy())
    }

    pub fn cwd(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cwd = Some(dir.into());
        self
    }

    pub fn var(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    /// Apply a build's environment
    pub fn with_env(mut self, env: &BuildEnvironment) -> Self {
        self.env
            .extend(env.vars().iter().map(|(k, v)| (k.clone(), v.clone())));
        self
    }

    pub fn quiet(mut self) -> Self {
        self.quiet = true;
        self
    }

    /// Printable form used in logs and errors
    pub fn display(&self) -> String {
        if self.args.is_empty() {
            self.program.clone()
        } else {
            format!("{} {}", self.program, self.args.join(" "))
        }
    }
}

/// Captured output of a successful command
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
}

/// Executes external commands
#[async_trait]
pub trait ProcessRunner: Send + Sync {
    /// Run to completion; a non-zero exit is an error
    async fn run(&self, spec: &CommandSpec) -> Result<CommandOutput>;
}

/// `ProcessRunner` backed by `tokio::process`
#[derive(Debug, Clone, Default)]
pub struct TokioProcessRunner;

impl TokioProcessRunner {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ProcessRunner for TokioProcessRunner {
    async fn run(&self, spec: &CommandSpec) -> Result<CommandOutput> {
        let command = spec.display();
        debug!("Running: {}", command);

        let mut cmd = Command::new(&spec.program);
        cmd.args(&spec.args);
        cmd.envs(&spec.env);
        if let Some(cwd) = &spec.cwd {
            cmd.current_dir(cwd);
        }
        cmd.stdin(Stdio::null());
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());

        let output = cmd.output().await.map_err(|source| PipelineError::Spawn {
            command: command.clone(),
            source,
        })?;

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();

        for line in stdout.lines().chain(stderr.lines()) {
            if spec.quiet {
                trace!("{}: {}", spec.program, line);
            } else {
                debug!("{}: {}", spec.program, line);
            }
        }

        if !output.status.success() {
            return Err(PipelineError::CommandFailed {
                command,
                code: output.status.code(),
                stderr: tail(&stderr, STDERR_TAIL_LINES),
            });
        }

        Ok(CommandOutput { stdout, stderr })
    }
}

/// Last `n` lines of `text`
fn tail(text: &str, n: usize) -> String {
    let lines: Vec<&str> = text.trim_end().lines().collect();
    let start = lines.len().saturating_sub(n);
    lines[start..].join("\n")
}
