//! Artifact and catalogue fixtures

#![allow(dead_code)]

use serde_json::{json, Map, Value};
use std::collections::BTreeMap;

/// Catalogue with one standard-build extension
pub const SINGLE_EXTENSION_CATALOGUE: &str = r#"{
    "redhat.java": {
        "repository": "https://github.com/redhat-developer/vscode-java",
        "version": "1.22.0"
    }
}"#;

/// Catalogue with three declared targets
pub const MULTI_TARGET_CATALOGUE: &str = r#"{
    "redhat.java": {
        "repository": "https://github.com/redhat-developer/vscode-java",
        "version": "1.22.0",
        "target": {
            "linux-x64": true,
            "darwin-arm64": { "env": { "JDK_ARCH": "aarch64" } },
            "win32-x64": true
        }
    }
}"#;

/// Builder for JSON-encoded artifacts understood by `MockArchive`
#[derive(Debug, Clone)]
pub struct ArtifactBuilder {
    package: Map<String, Value>,
    xml: Option<String>,
    extra: BTreeMap<String, String>,
    include_package: bool,
}

impl ArtifactBuilder {
    pub fn new(publisher: &str, name: &str, version: &str) -> Self {
        let mut package = Map::new();
        package.insert("publisher".to_string(), json!(publisher));
        package.insert("name".to_string(), json!(name));
        package.insert("version".to_string(), json!(version));
        package.insert("license".to_string(), json!("EPL-2.0"));
        Self {
            package,
            xml: None,
            extra: BTreeMap::new(),
            include_package: true,
        }
    }

    pub fn without_license(mut self) -> Self {
        self.package.remove("license");
        self
    }

    pub fn without_version(mut self) -> Self {
        self.package.remove("version");
        self
    }

    pub fn depends_on(mut self, dependencies: &[&str]) -> Self {
        self.package
            .insert("extensionDependencies".to_string(), json!(dependencies));
        self
    }

    /// Ship only the legacy XML manifest
    pub fn xml_only(
        mut self,
        publisher: &str,
        id: &str,
        version: &str,
        license: Option<&str>,
    ) -> Self {
        self.include_package = false;
        self.xml = Some(xml_manifest(publisher, id, version, license));
        self
    }

    /// Additional archive entry
    pub fn with_entry(mut self, entry: &str, content: &str) -> Self {
        self.extra.insert(entry.to_string(), content.to_string());
        self
    }

    pub fn build(&self) -> String {
        let mut entries = self.extra.clone();
        if self.include_package {
            entries.insert(
                "extension/package.json".to_string(),
                Value::Object(self.package.clone()).to_string(),
            );
        }
        if let Some(xml) = &self.xml {
            entries.insert("extension.vsixmanifest".to_string(), xml.clone());
        }
        serde_json::to_string(&entries).unwrap()
    }
}

/// Artifact for `redhat.java` at `version`
pub fn java_artifact(version: &str) -> ArtifactBuilder {
    ArtifactBuilder::new("redhat", "java", version)
}

pub fn xml_manifest(publisher: &str, id: &str, version: &str, license: Option<&str>) -> String {
    let license = license
        .map(|l| format!("<License>{}</License>", l))
        .unwrap_or_default();
    format!(
        r#"<?xml version="1.0" encoding="utf-8"?>
<PackageManifest Version="2.0.0">
  <Metadata>
    <Identity Language="en-US" Id="{}" Version="{}" Publisher="{}"/>
    {}
  </Metadata>
</PackageManifest>"#,
        id, version, publisher, license
    )
}
