//! Top-level driver
//!
//! Walks the selected catalogue entries in order. Each extension is resolved,
//! built for every target and, unless publishing is skipped, handed to the
//! publish gate. Failures are recorded per extension and never stop the run;
//! the summary decides the exit status afterwards.

use crate::collaborators::Collaborators;
use crate::context::resolve_context;
use crate::error::{PipelineError, Result};
use crate::matrix::{build_matrix, TargetReport};
use crate::orchestrator::BuildOrchestrator;
use crate::publish::{credential, PublishGate, PublishReport};
use tokio::fs;
use tracing::{error, info, warn};
use vsxpub_core::types::{BuildResult, ExtensionDescriptor, ExtensionId};
use vsxpub_core::{Catalogue, Settings};

/// Result of processing one extension
#[derive(Debug)]
pub struct ExtensionOutcome {
    pub id: String,
    pub targets: Vec<TargetReport>,
    pub publish: Option<PublishReport>,
    /// Failure before any target was attempted
    pub error: Option<PipelineError>,
}

impl ExtensionOutcome {
    fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            targets: Vec::new(),
            publish: None,
            error: None,
        }
    }

    pub fn failed(&self) -> bool {
        self.error.as_ref().is_some_and(|e| !e.is_benign())
            || self.targets.iter().any(TargetReport::is_failure)
            || self.publish.as_ref().is_some_and(PublishReport::has_failures)
    }

    pub fn artifacts(&self) -> Vec<BuildResult> {
        self.targets
            .iter()
            .filter_map(|t| t.artifact().cloned())
            .collect()
    }
}

/// Aggregate of a run
#[derive(Debug, Default)]
pub struct RunSummary {
    pub outcomes: Vec<ExtensionOutcome>,
}

impl RunSummary {
    pub fn failed(&self) -> bool {
        self.outcomes.iter().any(ExtensionOutcome::failed)
    }

    pub fn failed_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.failed()).count()
    }

    pub fn exit_code(&self) -> i32 {
        if self.failed() {
            1
        } else {
            0
        }
    }
}

/// Runs the catalogue through build and publish
pub struct Driver {
    settings: Settings,
    catalogue: Catalogue,
    collaborators: Collaborators,
}

impl Driver {
    pub fn new(settings: Settings, catalogue: Catalogue, collaborators: Collaborators) -> Self {
        Self {
            settings,
            catalogue,
            collaborators,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Process the extensions named in `filter`, or all of them when empty
    ///
    /// Returns `Err` only for run-wide problems: an unknown id in the filter,
    /// a missing or refused credential while publishing, or an unusable
    /// artifact directory. Extensions after a refused credential are not
    /// attempted.
    pub async fn run(&self, filter: &[String]) -> Result<RunSummary> {
        let selected = self.catalogue.select(filter)?;

        if !self.settings.skip_publish {
            credential(&self.settings)?;
        }

        self.reset_artifacts_dir().await?;

        let orchestrator =
            BuildOrchestrator::new(&self.settings, &self.catalogue, &self.collaborators);
        let mut summary = RunSummary::default();

        for (id, descriptor) in selected {
            info!("Processing {}", id);
            let mut outcome = self.process(&orchestrator, id, descriptor).await;
            if let Some(fatal) = outcome.error.take_if(|e| e.is_fatal()) {
                error!(extension = %id, "Aborting run: {}", fatal);
                return Err(fatal);
            }
            if outcome.failed() {
                warn!("{} finished with errors", id);
            }
            summary.outcomes.push(outcome);
        }

        info!(
            "Processed {} extension(s), {} failed",
            summary.outcomes.len(),
            summary.failed_count()
        );
        Ok(summary)
    }

    async fn process(
        &self,
        orchestrator: &BuildOrchestrator<'_>,
        id: &str,
        descriptor: &ExtensionDescriptor,
    ) -> ExtensionOutcome {
        let mut outcome = ExtensionOutcome::new(id);

        let extension_id = match ExtensionId::parse(id) {
            Ok(parsed) => parsed,
            Err(e) => {
                error!(extension = %id, "{}", e);
                outcome.error = Some(e.into());
                return outcome;
            }
        };

        let context = match resolve_context(
            &extension_id,
            descriptor,
            &self.settings,
            self.collaborators.registry.as_ref(),
            self.collaborators.sources.as_ref(),
        )
        .await
        {
            Ok(context) => context,
            Err(e) => {
                error!(extension = %id, "Cannot resolve: {}", e);
                outcome.error = Some(e);
                return outcome;
            }
        };

        outcome.targets = build_matrix(orchestrator, &extension_id, descriptor, &context).await;

        let artifacts = outcome.artifacts();
        if self.settings.skip_publish {
            info!("{}: {} artifact(s) built, publishing skipped", id, artifacts.len());
            return outcome;
        }
        if artifacts.is_empty() {
            return outcome;
        }

        let gate = PublishGate::new(
            &self.settings,
            self.collaborators.archive.as_ref(),
            self.collaborators.registry.as_ref(),
        );
        match gate.publish(&extension_id, &artifacts).await {
            Ok(report) => outcome.publish = Some(report),
            Err(e) => {
                error!(extension = %id, "Publish failed: {}", e);
                outcome.error = Some(e);
            }
        }

        outcome
    }

    async fn reset_artifacts_dir(&self) -> Result<()> {
        let dir = &self.settings.artifacts_dir;
        if fs::try_exists(dir).await? {
            fs::remove_dir_all(dir).await?;
        }
        fs::create_dir_all(dir).await?;
        Ok(())
    }
}
