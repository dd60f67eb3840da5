//! Extension catalogue loading and validation

use crate::error::{Error, Result};
use crate::types::{is_known_target, ExtensionDescriptor, ExtensionId};
use camino::{Utf8Path, Utf8PathBuf};
use std::collections::BTreeMap;
use std::fs;

/// Default catalogue file name
pub const DEFAULT_CATALOGUE_FILE: &str = "extensions.json";

/// The set of known extensions, keyed by `namespace.name`
#[derive(Debug, Clone, Default)]
pub struct Catalogue {
    /// Descriptors in id order
    pub extensions: BTreeMap<String, ExtensionDescriptor>,

    /// File the catalogue was loaded from
    pub path: Option<Utf8PathBuf>,
}

/// Findings from `Catalogue::validate`
#[derive(Debug, Clone, Default)]
pub struct CatalogueReport {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl CatalogueReport {
    /// True when there are no errors (warnings are allowed)
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

impl Catalogue {
    /// Load a catalogue, picking the parser from the file extension
    pub fn load(path: &Utf8Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::catalogue_not_found(path.as_str())
            } else {
                Error::Io(e)
            }
        })?;

        let mut catalogue = match path.extension() {
            Some("json") => Self::from_json(&content)?,
            Some("yaml") | Some("yml") => Self::from_yaml(&content)?,
            _ => {
                return Err(Error::UnsupportedFormat {
                    path: path.to_string(),
                })
            }
        };
        catalogue.path = Some(path.to_owned());

        tracing::debug!("Loaded {} extensions from {}", catalogue.len(), path);
        Ok(catalogue)
    }

    /// Parse a JSON catalogue
    pub fn from_json(content: &str) -> Result<Self> {
        let extensions: BTreeMap<String, ExtensionDescriptor> = serde_json::from_str(content)?;
        Ok(Self {
            extensions,
            path: None,
        })
    }

    /// Parse a YAML catalogue
    pub fn from_yaml(content: &str) -> Result<Self> {
        let extensions: BTreeMap<String, ExtensionDescriptor> = serde_yaml_ng::from_str(content)?;
        Ok(Self {
            extensions,
            path: None,
        })
    }

    pub fn len(&self) -> usize {
        self.extensions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.extensions.is_empty()
    }

    /// Whether an extension id is part of the catalogue (case-insensitive)
    pub fn contains(&self, id: &str) -> bool {
        self.extensions
            .keys()
            .any(|known| known.eq_ignore_ascii_case(id))
    }

    pub fn get(&self, id: &str) -> Option<&ExtensionDescriptor> {
        self.extensions.get(id)
    }

    /// Select the entries to process
    ///
    /// An empty filter selects the whole catalogue. Unknown ids are an error so
    /// that typos do not silently turn into a no-op run.
    pub fn select(&self, filter: &[String]) -> Result<Vec<(&str, &ExtensionDescriptor)>> {
        if filter.is_empty() {
            return Ok(self
                .extensions
                .iter()
                .map(|(id, descriptor)| (id.as_str(), descriptor))
                .collect());
        }

        filter
            .iter()
            .map(|wanted| {
                self.extensions
                    .get_key_value(wanted.as_str())
                    .map(|(id, descriptor)| (id.as_str(), descriptor))
                    .ok_or_else(|| Error::unknown_extension(wanted.as_str()))
            })
            .collect()
    }

    /// Check every entry for problems that would make its build fail early
    pub fn validate(&self) -> CatalogueReport {
        let mut report = CatalogueReport::default();

        for (id, descriptor) in &self.extensions {
            if ExtensionId::parse(id).is_err() {
                report
                    .errors
                    .push(format!("{}: id must be <namespace>.<name>", id));
            }

            let has_downloads = descriptor.downloads.as_ref().is_some_and(|d| !d.is_empty());
            if descriptor.repository.is_none() && !has_downloads {
                report
                    .errors
                    .push(format!("{}: needs a repository or downloads", id));
            }

            if descriptor.custom.as_ref().is_some_and(|c| c.is_empty()) {
                report
                    .errors
                    .push(format!("{}: custom build commands must not be empty", id));
            }

            for target in descriptor.target.iter().flat_map(|t| t.keys()) {
                if !is_known_target(target) {
                    report
                        .warnings
                        .push(format!("{}: unknown target '{}'", id, target));
                }
            }

            if descriptor.custom.is_some() && descriptor.prepublish.is_some() {
                report.warnings.push(format!(
                    "{}: prepublish is ignored when custom commands are set",
                    id
                ));
            }
        }

        report
    }
}
