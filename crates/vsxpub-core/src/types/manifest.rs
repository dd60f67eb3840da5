//! Packaged-extension manifest types
//!
//! An artifact can carry two manifests: the binary package manifest
//! (`extension/package.json`) and the legacy XML manifest
//! (`extension.vsixmanifest`). Both are read-only views derived from the
//! artifact; `Manifest` merges them, preferring the binary manifest.

use serde::Deserialize;
use serde_json::Value;

/// The fields of `extension/package.json` the pipeline cares about
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageManifest {
    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub publisher: Option<String>,

    #[serde(default)]
    pub version: Option<String>,

    /// SPDX string, `{ "type": ... }` object, or absent
    #[serde(default)]
    pub license: Option<Value>,

    #[serde(default)]
    pub extension_dependencies: Vec<String>,
}

impl PackageManifest {
    /// Whether the manifest declares a non-empty license
    pub fn has_license(&self) -> bool {
        match &self.license {
            None | Some(Value::Null) => false,
            Some(Value::String(s)) => !s.trim().is_empty(),
            Some(_) => true,
        }
    }
}

/// Identity and license data from the legacy XML manifest
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct XmlManifest {
    pub publisher: Option<String>,
    pub id: Option<String>,
    pub version: Option<String>,
    pub license: Option<String>,
}

/// Merged manifest view of a packaged artifact
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Manifest {
    pub version: Option<String>,
    pub publisher: Option<String>,
    pub name: Option<String>,
    pub has_license: bool,
    pub dependencies: Vec<String>,
}

impl Manifest {
    /// Merge the two manifest forms; either may be missing
    pub fn merge(package: Option<PackageManifest>, xml: Option<XmlManifest>) -> Self {
        let package = package.unwrap_or_default();
        let xml = xml.unwrap_or_default();

        let xml_license = xml
            .license
            .as_deref()
            .is_some_and(|l| !l.trim().is_empty());

        Self {
            has_license: package.has_license() || xml_license,
            version: package.version.or(xml.version),
            publisher: package.publisher.or(xml.publisher),
            name: package.name.or(xml.id),
            dependencies: package.extension_dependencies,
        }
    }
}
