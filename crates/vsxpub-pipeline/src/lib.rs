//! # vsxpub-pipeline
//!
//! Build and publish orchestration for vsxpub:
//! - Collaborator traits with process-backed and HTTP-backed implementations
//! - Target matrix expansion with per-target failure isolation
//! - Build orchestration: source acquisition, runtime pinning, custom and
//!   standard builds, manifest resolution, validation gates, finalization
//! - Publish gate with identity verification
//! - Top-level driver producing a run summary

pub mod archive;
pub mod collaborators;
pub mod context;
pub mod driver;
pub mod error;
pub mod gates;
pub mod license;
pub mod matrix;
pub mod orchestrator;
pub mod package_manager;
pub mod packager;
pub mod process;
pub mod publish;
pub mod registry;
pub mod runtime;
pub mod source;

pub use collaborators::Collaborators;
pub use driver::{Driver, ExtensionOutcome, RunSummary};
pub use error::{PipelineError, Result};
pub use matrix::{expand, TargetOutcome, TargetReport};
pub use orchestrator::BuildOrchestrator;
pub use publish::{PublishGate, PublishReport};
