//! Error types for vsxpub-core

use thiserror::Error;

/// Result type alias using vsxpub-core's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error types for vsxpub
#[derive(Error, Debug)]
pub enum Error {
    /// Catalogue file not found
    #[error("Extension catalogue not found: {path}")]
    CatalogueNotFound { path: String },

    /// Catalogue file has an extension we cannot parse
    #[error("Unsupported catalogue format: {path} (expected .json, .yaml or .yml)")]
    UnsupportedFormat { path: String },

    /// YAML parsing error
    #[error("YAML parsing error: {0}")]
    YamlParse(#[from] serde_yaml_ng::Error),

    /// JSON parsing error
    #[error("JSON parsing error: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Extension id is not of the form `namespace.name`
    #[error("Invalid extension id '{id}': expected <namespace>.<name>")]
    InvalidExtensionId { id: String },

    /// Unknown extension requested
    #[error("Unknown extension: {extension}")]
    UnknownExtension { extension: String },
}

impl Error {
    /// Create a catalogue not found error
    pub fn catalogue_not_found(path: impl Into<String>) -> Self {
        Self::CatalogueNotFound { path: path.into() }
    }

    /// Create an invalid extension id error
    pub fn invalid_extension_id(id: impl Into<String>) -> Self {
        Self::InvalidExtensionId { id: id.into() }
    }

    /// Create an unknown extension error
    pub fn unknown_extension(extension: impl Into<String>) -> Self {
        Self::UnknownExtension {
            extension: extension.into(),
        }
    }
}
