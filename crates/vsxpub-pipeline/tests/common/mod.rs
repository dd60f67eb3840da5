//! Common test utilities for vsxpub-pipeline
//!
//! - Mock collaborators that record their calls
//! - Artifact and catalogue fixtures
//! - wiremock helpers for the registry HTTP API
//! - A harness wiring mocks, settings and a catalogue together

#![allow(dead_code)]
#![allow(unused_imports)]

pub mod builders;
pub mod fixtures;
pub mod mock_server;
pub mod mocks;

pub use builders::*;
pub use fixtures::*;
pub use mock_server::*;
pub use mocks::*;
