//! CLI command implementations
//!
//! Each command returns the process exit code.

pub mod plan;
pub mod run;
pub mod validate;

use anyhow::{Context, Result};
use camino::Utf8Path;
use vsxpub_core::Catalogue;

/// Load the catalogue named on the command line
pub(crate) fn load_catalogue(path: &Utf8Path) -> Result<Catalogue> {
    Catalogue::load(path).with_context(|| format!("Failed to load catalogue {}", path))
}
