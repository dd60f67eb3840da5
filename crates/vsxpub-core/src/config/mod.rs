//! Catalogue loading and run settings

mod catalogue;
mod settings;

pub use catalogue::{Catalogue, CatalogueReport, DEFAULT_CATALOGUE_FILE};
pub use settings::{Settings, DEFAULT_ARTIFACTS_DIR, DEFAULT_REGISTRY_URL, DEFAULT_UNPUBLISHABLE};
