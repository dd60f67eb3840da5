//! Target matrix expansion
//!
//! Decides which builds an extension needs and runs them one after another.
//! A failing target is recorded and the remaining targets still run.

use crate::error::PipelineError;
use crate::orchestrator::BuildOrchestrator;
use std::fmt;
use tracing::{debug, error, info};
use vsxpub_core::types::{
    BuildResult, ExtensionDescriptor, ExtensionId, PublishContext, TargetBuild, UNIVERSAL_TARGET,
};

/// Builds to perform for a descriptor
///
/// Downloaded files win (a `universal` asset is one universal build), then
/// declared targets, then a single universal build. Declared targets never
/// carry a file.
pub fn expand(descriptor: &ExtensionDescriptor, context: &PublishContext) -> Vec<TargetBuild> {
    if let Some(files) = &context.files {
        return files
            .iter()
            .filter_map(|(target, file)| {
                if target == UNIVERSAL_TARGET {
                    return Some(TargetBuild {
                        file: Some(file.clone()),
                        ..TargetBuild::universal()
                    });
                }
                if !descriptor.allows_target(target) {
                    debug!("Skipping downloaded {} artifact: target not enabled", target);
                    return None;
                }
                let env = descriptor
                    .target
                    .as_ref()
                    .and_then(|targets| targets.get(target))
                    .map(|spec| spec.env())
                    .unwrap_or_default();
                Some(TargetBuild {
                    target: Some(target.clone()),
                    env,
                    file: Some(file.clone()),
                })
            })
            .collect();
    }

    let declared = descriptor.enabled_targets();
    if !declared.is_empty() {
        return declared
            .into_iter()
            .map(|(target, env)| TargetBuild {
                target: Some(target),
                env,
                file: None,
            })
            .collect();
    }

    vec![TargetBuild::universal()]
}

/// How one target ended
#[derive(Debug)]
pub enum TargetOutcome {
    /// Artifact built and validated
    Built(BuildResult),
    /// Registry already current; nothing to publish
    Skipped,
    /// Failure that means the registry already has it
    AlreadyPublished(String),
    Failed(PipelineError),
}

/// Outcome of one target build
#[derive(Debug)]
pub struct TargetReport {
    pub target: Option<String>,
    pub outcome: TargetOutcome,
}

impl TargetReport {
    pub fn label(&self) -> &str {
        self.target.as_deref().unwrap_or(UNIVERSAL_TARGET)
    }

    pub fn is_failure(&self) -> bool {
        matches!(self.outcome, TargetOutcome::Failed(_))
    }

    pub fn artifact(&self) -> Option<&BuildResult> {
        match &self.outcome {
            TargetOutcome::Built(result) => Some(result),
            _ => None,
        }
    }
}

impl fmt::Display for TargetOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TargetOutcome::Built(result) => write!(f, "built {}", result.artifact.display()),
            TargetOutcome::Skipped => write!(f, "up to date"),
            TargetOutcome::AlreadyPublished(message) => write!(f, "already published: {}", message),
            TargetOutcome::Failed(e) => write!(f, "failed: {}", e),
        }
    }
}

/// Build every target of an extension, isolating failures per target
pub async fn build_matrix(
    orchestrator: &BuildOrchestrator<'_>,
    id: &ExtensionId,
    descriptor: &ExtensionDescriptor,
    context: &PublishContext,
) -> Vec<TargetReport> {
    let builds = expand(descriptor, context);
    info!("{}: {} build(s) planned", id, builds.len());

    let mut reports = Vec::with_capacity(builds.len());
    for build in builds {
        let label = build.label().to_string();
        let mut target_context = context.clone();

        let outcome = match orchestrator
            .build(id, descriptor, &mut target_context, &build)
            .await
        {
            Ok(Some(result)) => TargetOutcome::Built(result),
            Ok(None) => TargetOutcome::Skipped,
            Err(e) if e.is_benign() => {
                info!(extension = %id, target = %label, "{}", e);
                TargetOutcome::AlreadyPublished(e.to_string())
            }
            Err(e) => {
                error!(extension = %id, target = %label, "Build failed: {}", e);
                TargetOutcome::Failed(e)
            }
        };

        reports.push(TargetReport {
            target: build.target,
            outcome,
        });
    }

    reports
}
