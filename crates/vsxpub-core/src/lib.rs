//! # vsxpub-core
//!
//! Core library for vsxpub providing:
//! - Extension catalogue parsing (extensions.json / extensions.yaml)
//! - Type definitions for descriptors, targets, publish context and manifests
//! - Run settings
//! - Bounded retry-with-recovery

pub mod config;
pub mod error;
pub mod retry;
pub mod types;

pub use config::{Catalogue, Settings};
pub use error::{Error, Result};
